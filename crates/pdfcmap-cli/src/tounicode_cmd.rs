use std::io::Write;
use std::path::Path;

use pdfcmap_core::LoadOptions;

use crate::cli::OutputFormat;
use crate::shared::{open_cmap, print_json};

pub fn run(file: &Path, format: &OutputFormat, options: &LoadOptions) -> Result<(), i32> {
    let cmap = open_cmap(file, false, options)?;
    let bytes = cmap.to_bytes();

    match format {
        OutputFormat::Text => std::io::stdout().write_all(&bytes).map_err(|e| {
            eprintln!("Error: failed to write output: {e}");
            1
        }),
        OutputFormat::Json => print_json(&serde_json::json!({
            "name": cmap.name(),
            "entries": cmap.code_to_unicode_len(),
            "cmap": String::from_utf8_lossy(&bytes),
        })),
    }
}

use std::path::Path;

use pdfcmap_core::LoadOptions;

use crate::cli::OutputFormat;
use crate::shared::{open_cmap, print_json, print_summary, summary_json};

pub fn run(
    file: &Path,
    simple: bool,
    format: &OutputFormat,
    options: &LoadOptions,
) -> Result<(), i32> {
    let cmap = open_cmap(file, simple, options)?;

    match format {
        OutputFormat::Text => {
            print_summary(&cmap);
            Ok(())
        }
        OutputFormat::Json => print_json(&summary_json(&cmap)),
    }
}

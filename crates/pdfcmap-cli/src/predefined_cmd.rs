use std::path::Path;

use pdfcmap_core::LoadOptions;
use pdfcmap_parse::{DirAssetStore, PredefinedLoader};

use crate::cli::OutputFormat;
use crate::shared::{print_json, print_summary, summary_json};

pub fn run(
    name: &str,
    assets: &Path,
    format: &OutputFormat,
    options: &LoadOptions,
) -> Result<(), i32> {
    if !assets.is_dir() {
        eprintln!("Error: assets directory not found: {}", assets.display());
        return Err(1);
    }

    let loader = PredefinedLoader::with_options(DirAssetStore::new(assets), options.clone());
    if !loader.is_predefined(name) {
        eprintln!("Error: predefined CMap not found: {name}");
        return Err(1);
    }

    let cmap = loader.load(name).map_err(|e| {
        eprintln!("Error: failed to load CMap {name}: {e}");
        1
    })?;

    match format {
        OutputFormat::Text => {
            print_summary(&cmap);
            Ok(())
        }
        OutputFormat::Json => print_json(&summary_json(&cmap)),
    }
}

use std::path::Path;

use pdfcmap_core::{BitWidth, CharCode, LoadOptions};
use pdfcmap_parse::{CMap, DirAssetStore, PredefinedLoader};

use crate::cli::OutputFormat;
use crate::shared::{bit_width, open_cmap, parse_hex_bytes, print_json, read_cmap_file};

/// Display form of a decoded code: 2 hex digits for simple fonts, at least 4 otherwise.
fn code_str(code: CharCode, width: BitWidth) -> String {
    match width {
        BitWidth::Simple => format!("{code:02x}"),
        BitWidth::Cid => format!("{code:04x}"),
    }
}

fn load(
    file: &Path,
    simple: bool,
    assets: Option<&Path>,
    options: &LoadOptions,
) -> Result<CMap, i32> {
    let Some(dir) = assets else {
        return open_cmap(file, simple, options);
    };
    let data = read_cmap_file(file)?;
    let loader = PredefinedLoader::with_options(DirAssetStore::new(dir), options.clone());
    loader.load_embedded(&data, bit_width(simple)).map_err(|e| {
        eprintln!("Error: failed to load CMap: {e}");
        1
    })
}

pub fn run(
    file: &Path,
    hex: &str,
    simple: bool,
    assets: Option<&Path>,
    format: &OutputFormat,
    options: &LoadOptions,
) -> Result<(), i32> {
    let data = parse_hex_bytes(hex).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    let cmap = load(file, simple, assets, options)?;

    let (codes, fully_matched) = cmap.bytes_to_charcodes(&data);
    let decoded = cmap.charcodes_to_unicode(&codes, fully_matched);
    let cids: Vec<Option<u32>> = codes.iter().map(|&c| cmap.charcode_to_cid(c)).collect();

    match format {
        OutputFormat::Text => {
            let code_list: Vec<String> = codes
                .iter()
                .map(|&c| code_str(c, cmap.bit_width()))
                .collect();
            let cid_list: Vec<String> = cids
                .iter()
                .map(|cid| cid.map_or_else(|| "-".to_string(), |c| c.to_string()))
                .collect();
            println!("Codes: {}", code_list.join(" "));
            println!("CIDs: {}", cid_list.join(" "));
            println!("Text: {}", decoded.text);
            println!("Missing: {}", decoded.missing);
            println!("Fully matched: {}", decoded.fully_matched);
            Ok(())
        }
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&decoded).map_err(|e| {
                eprintln!("Error: failed to serialize JSON: {e}");
                1
            })?;
            value["codes"] = serde_json::json!(
                codes
                    .iter()
                    .map(|&c| code_str(c, cmap.bit_width()))
                    .collect::<Vec<_>>()
            );
            value["cids"] = serde_json::json!(cids);
            print_json(&value)
        }
    }
}

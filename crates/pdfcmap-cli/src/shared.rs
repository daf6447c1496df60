use std::path::Path;

use pdfcmap_core::{BitWidth, Codespace, LoadOptions};
use pdfcmap_parse::CMap;

/// Read a CMap file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing
/// or unreadable.
pub fn read_cmap_file(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })
}

/// Read and parse a CMap file without resolving `usecmap`.
pub fn open_cmap(file: &Path, simple: bool, options: &LoadOptions) -> Result<CMap, i32> {
    let data = read_cmap_file(file)?;
    CMap::from_bytes_with_options(&data, bit_width(simple), options).map_err(|e| {
        eprintln!("Error: failed to parse CMap: {e}");
        1
    })
}

pub fn bit_width(simple: bool) -> BitWidth {
    if simple { BitWidth::Simple } else { BitWidth::Cid }
}

/// Parse a hex byte string such as `0041 8140` or `<00418140>`.
///
/// Whitespace and one pair of enclosing angle brackets are ignored.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = inner
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if let Some(&bad) = digits.iter().find(|b| !b.is_ascii_hexdigit()) {
        return Err(format!(
            "invalid hex digit {:?} in {input:?}",
            char::from(bad)
        ));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {input:?}"));
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
        .collect())
}

/// Value of an ASCII hex digit already checked with `is_ascii_hexdigit`.
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Format a code as hex padded to its byte length.
pub fn hex_code(code: u32, num_bytes: usize) -> String {
    format!("{code:0width$x}", width = num_bytes * 2)
}

/// Format a codespace as `<low> <high>`.
pub fn codespace_str(cs: &Codespace) -> String {
    let n = usize::from(cs.num_bytes());
    format!("<{}> <{}>", hex_code(cs.low(), n), hex_code(cs.high(), n))
}

/// Print a human-readable summary of `cmap` to stdout.
pub fn print_summary(cmap: &CMap) {
    println!("Name: {}", cmap.name());
    if let Some(t) = cmap.cmap_type() {
        println!("Type: {}", t.value());
    }
    println!("Bits: {}", cmap.bit_width().bits());
    if !cmap.version().is_empty() {
        println!("Version: {}", cmap.version());
    }
    println!(
        "Writing mode: {}",
        if cmap.writing_mode() == 1 { "vertical" } else { "horizontal" }
    );
    if let Some(base) = cmap.usecmap() {
        println!("Usecmap: {base}");
    }
    println!("System info: {}", cmap.system_info());
    println!("Codespaces: {}", cmap.codespaces().len());
    for cs in cmap.codespaces() {
        println!("  {}", codespace_str(cs));
    }
    println!("CID mappings: {}", cmap.code_to_cid_len());
    println!("Unicode mappings: {}", cmap.code_to_unicode_len());
}

/// JSON summary of `cmap`.
pub fn summary_json(cmap: &CMap) -> serde_json::Value {
    let codespaces: Vec<serde_json::Value> = cmap
        .codespaces()
        .iter()
        .map(|cs| {
            let n = usize::from(cs.num_bytes());
            serde_json::json!({
                "bytes": n,
                "low": hex_code(cs.low(), n),
                "high": hex_code(cs.high(), n),
            })
        })
        .collect();

    serde_json::json!({
        "name": cmap.name(),
        "type": cmap.cmap_type().map(|t| t.value()),
        "bits": cmap.bit_width().bits(),
        "version": cmap.version(),
        "writing_mode": cmap.writing_mode(),
        "usecmap": cmap.usecmap(),
        "system_info": cmap.system_info(),
        "codespaces": codespaces,
        "cid_mappings": cmap.code_to_cid_len(),
        "unicode_mappings": cmap.code_to_unicode_len(),
    })
}

/// Print pretty JSON to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), i32> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error: failed to serialize JSON: {e}");
        1
    })?;
    println!("{text}");
    Ok(())
}

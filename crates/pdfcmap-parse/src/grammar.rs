//! CMap grammar interpreter.
//!
//! Walks the operator stream produced by [`tokenize`] and populates a
//! [`CMapBuilder`]. Because the tokenizer attaches every operand seen since
//! the previous keyword, the entries of a `begincidrange ... endcidrange`
//! block arrive as the operands of the closing `endcidrange` operator.
//!
//! Any malformed entry aborts the whole buffer; no partially populated
//! builder is ever returned.

use pdfcmap_core::{
    BitWidth, CMapError, CMapType, CharCode, Cid, CidSystemInfo, Codespace, LoadOptions,
    code_from_bytes,
};
use tracing::{debug, trace, warn};

use crate::builder::CMapBuilder;
use crate::error::ParseError;
use crate::tokenizer::{Operand, tokenize};

/// Parse CMap text into a builder.
///
/// `usecmap` references are recorded but not resolved; see
/// [`PredefinedLoader`](crate::PredefinedLoader) for resolution.
///
/// # Errors
///
/// - [`CMapError::Syntax`] if the text cannot be tokenized.
/// - [`CMapError::InvalidOperand`] for entries with the wrong arity or
///   operand types, code literals outside 1..=4 bytes, or inverted ranges.
/// - [`CMapError::ResourceLimitExceeded`] if `options` limits are exceeded.
pub fn parse(
    data: &[u8],
    bit_width: BitWidth,
    options: &LoadOptions,
) -> Result<CMapBuilder, CMapError> {
    if let Some(max) = options.max_input_bytes {
        if data.len() > max {
            return Err(CMapError::limit("max_input_bytes", max, data.len()));
        }
    }

    let mut builder = CMapBuilder::with_options(bit_width, options);
    interpret(data, &mut builder, options)?;
    trace!(
        name = %builder.name(),
        codespaces = builder.codespaces().len(),
        cids = builder.cid_mapping_count(),
        unicode = builder.unicode_mapping_count(),
        usecmap = ?builder.usecmap(),
        "parsed CMap"
    );
    Ok(builder)
}

/// Interpreter state for the procedural `/CIDSystemInfo N dict dup begin ... end def` form.
#[derive(Debug, Default)]
enum SystemInfoDict {
    #[default]
    Closed,
    /// `dict` seen, waiting for `begin`.
    Pending,
    /// Inside `begin ... end`, collecting entries.
    Open(CidSystemInfo),
}

fn interpret(
    data: &[u8],
    builder: &mut CMapBuilder,
    options: &LoadOptions,
) -> Result<(), ParseError> {
    let ops = tokenize(data)?;

    let mut found_resource: Option<String> = None;
    let mut sysinfo = SystemInfoDict::Closed;

    for op in ops {
        let operands = op.operands;
        match op.name.as_str() {
            "findresource" => {
                // `/Base /CMap findresource usecmap`
                found_resource = match operands.as_slice() {
                    [.., Operand::Name(name), Operand::Name(category)] if category == "CMap" => {
                        Some(name.clone())
                    }
                    _ => None,
                };
            }
            "usecmap" => {
                let base = match operands.last() {
                    Some(Operand::Name(name)) => name.clone(),
                    Some(other) => {
                        return Err(ParseError::Operand(format!(
                            "usecmap expects a name, got {}",
                            other.kind()
                        )));
                    }
                    None => found_resource.take().ok_or_else(|| {
                        ParseError::Operand("usecmap without a base CMap name".to_string())
                    })?,
                };
                trace!(base = %base, "usecmap");
                builder.set_usecmap(base);
            }
            "endcodespacerange" => read_codespaces(&operands, builder)?,
            "endcidrange" => read_cid_ranges(&operands, builder, options)?,
            "endcidchar" => read_cid_chars(&operands, builder)?,
            "endbfchar" => read_bf_chars(&operands, builder)?,
            "endbfrange" => read_bf_ranges(&operands, builder, options)?,
            "endnotdefrange" | "endnotdefchar" => {
                trace!(section = %op.name, entries = operands.len(), "ignored notdef section");
            }
            "dict" => {
                if matches!(operands.first(), Some(Operand::Name(key)) if key == "CIDSystemInfo") {
                    sysinfo = SystemInfoDict::Pending;
                }
            }
            "begin" => {
                if matches!(sysinfo, SystemInfoDict::Pending) {
                    sysinfo = SystemInfoDict::Open(CidSystemInfo::default());
                }
            }
            "end" => {
                if let SystemInfoDict::Open(info) = std::mem::take(&mut sysinfo) {
                    builder.set_system_info(info);
                }
            }
            "def" => match &mut sysinfo {
                SystemInfoDict::Open(info) => read_system_info_entry(&operands, info)?,
                _ => read_def(&operands, builder)?,
            },
            _ => {}
        }
    }

    Ok(())
}

// ---- Metadata ----

fn read_def(operands: &[Operand], builder: &mut CMapBuilder) -> Result<(), ParseError> {
    let [.., Operand::Name(key), value] = operands else {
        return Ok(());
    };
    match (key.as_str(), value) {
        ("CMapName", Operand::Name(name)) => {
            builder.set_name(name.clone());
        }
        ("CMapType", Operand::Integer(t)) => {
            builder.set_cmap_type(CMapType::from_value(*t));
        }
        ("CMapVersion", Operand::Integer(v)) => {
            builder.set_version(v.to_string());
        }
        ("CMapVersion", Operand::Real(v)) => {
            builder.set_version(v.to_string());
        }
        ("CMapVersion", Operand::LiteralString(s) | Operand::HexString(s)) => {
            builder.set_version(String::from_utf8_lossy(s).into_owned());
        }
        ("WMode", Operand::Integer(mode @ (0 | 1))) => {
            builder.set_writing_mode(*mode as u8);
        }
        ("CIDSystemInfo", Operand::Dictionary(entries)) => {
            let mut info = CidSystemInfo::default();
            for (k, v) in entries {
                set_system_info_field(&mut info, k, v)?;
            }
            builder.set_system_info(info);
        }
        // Some producers wrap the dictionary in a one-element array.
        ("CIDSystemInfo", Operand::Array(items)) if items.len() == 1 => {
            return read_def(&[Operand::Name(key.clone()), items[0].clone()], builder);
        }
        ("CMapName" | "CMapType" | "CMapVersion" | "WMode" | "CIDSystemInfo", other) => {
            return Err(ParseError::Operand(format!(
                "/{key} has unexpected {} value",
                other.kind()
            )));
        }
        _ => {}
    }
    Ok(())
}

fn read_system_info_entry(
    operands: &[Operand],
    info: &mut CidSystemInfo,
) -> Result<(), ParseError> {
    match operands {
        [.., Operand::Name(key), value] => set_system_info_field(info, key, value),
        _ => Ok(()),
    }
}

fn set_system_info_field(
    info: &mut CidSystemInfo,
    key: &str,
    value: &Operand,
) -> Result<(), ParseError> {
    match (key, value) {
        ("Registry", Operand::LiteralString(s) | Operand::HexString(s)) => {
            info.registry = String::from_utf8_lossy(s).into_owned();
        }
        ("Ordering", Operand::LiteralString(s) | Operand::HexString(s)) => {
            info.ordering = String::from_utf8_lossy(s).into_owned();
        }
        ("Supplement", Operand::Integer(n)) => {
            info.supplement = u32::try_from(*n).map_err(|_| {
                ParseError::Operand(format!("negative CIDSystemInfo supplement {n}"))
            })?;
        }
        ("Registry" | "Ordering" | "Supplement", other) => {
            return Err(ParseError::Operand(format!(
                "CIDSystemInfo /{key} has unexpected {} value",
                other.kind()
            )));
        }
        _ => {}
    }
    Ok(())
}

// ---- Mapping sections ----

/// A code literal and the number of bytes it was written with.
fn hex_code(operand: &Operand, section: &str) -> Result<(CharCode, usize), ParseError> {
    let Operand::HexString(bytes) = operand else {
        return Err(ParseError::Operand(format!(
            "{section}: expected hex code, got {}",
            operand.kind()
        )));
    };
    let code = code_from_bytes(bytes).ok_or_else(|| {
        ParseError::Operand(format!(
            "{section}: code literal must be 1 to 4 bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok((code, bytes.len()))
}

fn code_range(
    low: &Operand,
    high: &Operand,
    section: &str,
    options: &LoadOptions,
) -> Result<(CharCode, CharCode), ParseError> {
    let (low, _) = hex_code(low, section)?;
    let (high, _) = hex_code(high, section)?;
    if low > high {
        return Err(ParseError::Operand(format!(
            "{section}: range low {low:#x} exceeds high {high:#x}"
        )));
    }
    let len = u64::from(high - low) + 1;
    if len > u64::from(options.max_range_len) {
        return Err(CMapError::limit(
            "max_range_len",
            options.max_range_len as usize,
            usize::try_from(len).unwrap_or(usize::MAX),
        )
        .into());
    }
    Ok((low, high))
}

fn cid_operand(operand: &Operand, section: &str) -> Result<Cid, ParseError> {
    match operand {
        Operand::Integer(n) => Cid::try_from(*n)
            .map_err(|_| ParseError::Operand(format!("{section}: CID {n} out of range"))),
        other => Err(ParseError::Operand(format!(
            "{section}: expected integer CID, got {}",
            other.kind()
        ))),
    }
}

fn check_arity(operands: &[Operand], arity: usize, section: &str) -> Result<(), ParseError> {
    if operands.len() % arity != 0 {
        return Err(ParseError::Operand(format!(
            "{section}: {} operands is not a multiple of {arity}",
            operands.len()
        )));
    }
    Ok(())
}

fn read_codespaces(operands: &[Operand], builder: &mut CMapBuilder) -> Result<(), ParseError> {
    const SECTION: &str = "codespacerange";
    check_arity(operands, 2, SECTION)?;
    for pair in operands.chunks_exact(2) {
        let (low, low_len) = hex_code(&pair[0], SECTION)?;
        let (high, high_len) = hex_code(&pair[1], SECTION)?;
        if low_len != high_len {
            return Err(ParseError::Operand(format!(
                "{SECTION}: low is {low_len} byte(s) but high is {high_len}"
            )));
        }
        // Widths are at most 4, checked by hex_code.
        builder.add_codespace(Codespace::new(low_len as u8, low, high)?);
    }
    trace!(entries = operands.len() / 2, "codespacerange");
    Ok(())
}

fn read_cid_ranges(
    operands: &[Operand],
    builder: &mut CMapBuilder,
    options: &LoadOptions,
) -> Result<(), ParseError> {
    const SECTION: &str = "cidrange";
    check_arity(operands, 3, SECTION)?;
    for entry in operands.chunks_exact(3) {
        let (low, high) = code_range(&entry[0], &entry[1], SECTION, options)?;
        let start = cid_operand(&entry[2], SECTION)?;
        if start.checked_add(high - low).is_none() {
            return Err(ParseError::Operand(format!(
                "{SECTION}: CID {start} + {} overflows",
                high - low
            )));
        }
        for code in low..=high {
            builder.insert_cid(code, start + (code - low))?;
        }
    }
    trace!(entries = operands.len() / 3, "cidrange");
    Ok(())
}

fn read_cid_chars(operands: &[Operand], builder: &mut CMapBuilder) -> Result<(), ParseError> {
    const SECTION: &str = "cidchar";
    check_arity(operands, 2, SECTION)?;
    for pair in operands.chunks_exact(2) {
        let (code, _) = hex_code(&pair[0], SECTION)?;
        let cid = cid_operand(&pair[1], SECTION)?;
        builder.insert_cid(code, cid)?;
    }
    trace!(entries = operands.len() / 2, "cidchar");
    Ok(())
}

/// Decode a bf destination (UTF-16BE; a single byte is one code unit).
///
/// Returns `None` for empty or malformed UTF-16.
fn decode_destination(bytes: &[u8]) -> Option<Vec<char>> {
    match bytes.len() {
        0 => None,
        1 => Some(vec![char::from(bytes[0])]),
        n if n % 2 != 0 => None,
        _ => {
            let units = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units).collect::<Result<Vec<_>, _>>().ok()
        }
    }
}

/// First scalar of a destination, logging when a multi-scalar string is truncated.
fn destination_scalar(bytes: &[u8], code: CharCode, section: &str) -> Option<char> {
    let Some(chars) = decode_destination(bytes) else {
        warn!(
            code = format_args!("{code:#06x}"),
            "{section}: undecodable destination skipped"
        );
        return None;
    };
    if chars.len() > 1 {
        debug!(
            code = format_args!("{code:#06x}"),
            scalars = chars.len(),
            "{section}: multi-scalar destination truncated to first scalar"
        );
    }
    chars.first().copied()
}

fn read_bf_chars(operands: &[Operand], builder: &mut CMapBuilder) -> Result<(), ParseError> {
    const SECTION: &str = "bfchar";
    check_arity(operands, 2, SECTION)?;
    for pair in operands.chunks_exact(2) {
        let (code, _) = hex_code(&pair[0], SECTION)?;
        match &pair[1] {
            Operand::HexString(dst) => {
                if let Some(ch) = destination_scalar(dst, code, SECTION) {
                    builder.insert_unicode(code, ch)?;
                }
            }
            Operand::Name(glyph) => {
                warn!(
                    code = format_args!("{code:#06x}"),
                    glyph = %glyph,
                    "bfchar: glyph name destination skipped"
                );
            }
            other => {
                return Err(ParseError::Operand(format!(
                    "{SECTION}: expected hex destination, got {}",
                    other.kind()
                )));
            }
        }
    }
    trace!(entries = operands.len() / 2, "bfchar");
    Ok(())
}

fn read_bf_ranges(
    operands: &[Operand],
    builder: &mut CMapBuilder,
    options: &LoadOptions,
) -> Result<(), ParseError> {
    const SECTION: &str = "bfrange";
    check_arity(operands, 3, SECTION)?;
    for entry in operands.chunks_exact(3) {
        let (low, high) = code_range(&entry[0], &entry[1], SECTION, options)?;
        match &entry[2] {
            Operand::HexString(dst) => {
                let Some(first) = destination_scalar(dst, low, SECTION) else {
                    continue;
                };
                let base = u32::from(first);
                for code in low..=high {
                    let value = base.saturating_add(code - low);
                    match char::from_u32(value) {
                        Some(ch) => builder.insert_unicode(code, ch)?,
                        None => debug!(
                            code = format_args!("{code:#06x}"),
                            value = format_args!("{value:#x}"),
                            "bfrange: non-scalar destination skipped"
                        ),
                    }
                }
            }
            Operand::Array(items) => {
                for (code, item) in (low..=high).zip(items) {
                    let Operand::HexString(dst) = item else {
                        return Err(ParseError::Operand(format!(
                            "{SECTION}: expected hex destination in array, got {}",
                            item.kind()
                        )));
                    };
                    if let Some(ch) = destination_scalar(dst, code, SECTION) {
                        builder.insert_unicode(code, ch)?;
                    }
                }
            }
            other => {
                return Err(ParseError::Operand(format!(
                    "{SECTION}: expected hex or array destination, got {}",
                    other.kind()
                )));
            }
        }
    }
    trace!(entries = operands.len() / 3, "bfrange");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_cid(data: &str) -> Result<CMapBuilder, CMapError> {
        parse(data.as_bytes(), BitWidth::Cid, &LoadOptions::default())
    }

    const JAPAN_HEADER: &str = "\
%!PS-Adobe-3.0 Resource-CMap
%%DocumentNeededResources: ProcSet (CIDInit)
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo 3 dict dup begin
  /Registry (Adobe) def
  /Ordering (Japan1) def
  /Supplement 6 def
end def
/CMapName /Test-H def
/CMapVersion 10.001 def
/CMapType 1 def
/WMode 0 def
";

    // ---- Metadata ----

    #[test]
    fn procedural_system_info_and_metadata() {
        let data = format!("{JAPAN_HEADER}1 begincodespacerange\n<00> <80>\nendcodespacerange\nendcmap\n");
        let cmap = parse_cid(&data).unwrap().build();
        assert_eq!(cmap.name(), "Test-H");
        assert_eq!(cmap.version(), "10.001");
        assert_eq!(cmap.cmap_type(), Some(CMapType::Cid));
        assert_eq!(cmap.writing_mode(), 0);
        assert_eq!(cmap.system_info().to_string(), "Adobe-Japan1-006");
    }

    #[test]
    fn dictionary_system_info() {
        let cmap = parse_cid(
            "/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def /CMapType 2 def /WMode 1 def",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.system_info(), &CidSystemInfo::identity_ucs());
        assert_eq!(cmap.cmap_type(), Some(CMapType::ToUnicode));
        assert_eq!(cmap.writing_mode(), 1);
    }

    #[test]
    fn hex_string_metadata_values() {
        let cmap = parse_cid(
            "/CIDSystemInfo << /Registry <41646F6265> /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapVersion <31302e303031> def\n\
             1 begincodespacerange <0000> <FFFF> endcodespacerange\n\
             1 beginbfchar <0001> <0041> endbfchar",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.system_info(), &CidSystemInfo::identity_ucs());
        assert_eq!(cmap.version(), "10.001");
        assert_eq!(cmap.charcode_to_unicode_opt(1), Some('A'));
    }

    #[test]
    fn procedural_system_info_hex_strings() {
        let cmap = parse_cid(
            "/CIDSystemInfo 3 dict dup begin\n\
               /Registry <41646f6265> def\n\
               /Ordering <4a6170616e31> def\n\
               /Supplement 2 def\n\
             end def\n\
             1 begincodespacerange <00> <ff> endcodespacerange",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.system_info().to_string(), "Adobe-Japan1-002");
    }

    #[test]
    fn bad_metadata_type_is_invalid_operand() {
        let err = parse_cid("/CMapType (two) def").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
        let err = parse_cid("/CIDSystemInfo << /Supplement (x) >> def").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn unrelated_defs_are_ignored() {
        let builder = parse_cid("/Foo 12 def /Bar [1 2] def").unwrap();
        assert_eq!(builder.name(), "");
    }

    // ---- usecmap ----

    #[test]
    fn usecmap_plain_name() {
        let builder = parse_cid("/UniJIS-UCS2-H usecmap").unwrap();
        assert_eq!(builder.usecmap(), Some("UniJIS-UCS2-H"));
    }

    #[test]
    fn usecmap_via_findresource() {
        let builder = parse_cid("/Base-H /CMap findresource usecmap").unwrap();
        assert_eq!(builder.usecmap(), Some("Base-H"));
    }

    #[test]
    fn usecmap_without_name_is_invalid() {
        let err = parse_cid("usecmap").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    // ---- Codespaces ----

    #[test]
    fn codespace_widths_from_literals() {
        let cmap = parse_cid(
            "3 begincodespacerange\n<00> <80>\n<8140> <9ffc>\n<a0> <df>\nendcodespacerange",
        )
        .unwrap()
        .build();
        let spaces: Vec<(u8, CharCode, CharCode)> = cmap
            .codespaces()
            .iter()
            .map(|cs| (cs.num_bytes(), cs.low(), cs.high()))
            .collect();
        assert_eq!(
            spaces,
            vec![(1, 0x00, 0x80), (1, 0xA0, 0xDF), (2, 0x8140, 0x9FFC)]
        );
    }

    #[test]
    fn codespace_mismatched_widths_rejected() {
        let err = parse_cid("1 begincodespacerange <00> <FFFF> endcodespacerange").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn codespace_odd_operand_count_rejected() {
        let err = parse_cid("1 begincodespacerange <00> endcodespacerange").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn code_literal_wider_than_four_bytes_rejected() {
        let err =
            parse_cid("1 begincodespacerange <0000000000> <FFFFFFFFFF> endcodespacerange")
                .unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    // ---- CID sections ----

    #[test]
    fn cid_range_and_char() {
        let cmap = parse_cid(
            "1 begincidrange\n<8140> <817e> 633\nendcidrange\n\
             1 begincidchar\n<20> 1\nendcidchar",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.charcode_to_cid(0x8140), Some(633));
        assert_eq!(cmap.charcode_to_cid(0x817E), Some(633 + 0x3E));
        assert_eq!(cmap.charcode_to_cid(0x20), Some(1));
        assert_eq!(cmap.charcode_to_cid(0x817F), None);
    }

    #[test]
    fn cid_range_inverted_rejected() {
        let err = parse_cid("1 begincidrange <0010> <0001> 5 endcidrange").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn cid_range_wrong_type_rejected() {
        let err = parse_cid("1 begincidrange <0000> <0001> <05> endcidrange").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
        let err = parse_cid("1 begincidchar <0000> -1 endcidchar").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn cid_range_length_limit() {
        let opts = LoadOptions {
            max_range_len: 16,
            ..LoadOptions::default()
        };
        let err = parse(
            b"1 begincidrange <0000> <00ff> 0 endcidrange",
            BitWidth::Cid,
            &opts,
        )
        .unwrap_err();
        assert_eq!(err, CMapError::limit("max_range_len", 16, 256));
    }

    #[test]
    fn mapping_count_limit() {
        let opts = LoadOptions {
            max_mappings: 10,
            ..LoadOptions::default()
        };
        let err = parse(
            b"1 begincidrange <0000> <00ff> 0 endcidrange",
            BitWidth::Cid,
            &opts,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CMapError::ResourceLimitExceeded { ref limit_name, .. } if limit_name == "max_mappings"
        ));
    }

    #[test]
    fn input_size_limit_checked_before_lexing() {
        let opts = LoadOptions {
            max_input_bytes: Some(4),
            ..LoadOptions::default()
        };
        let err = parse(b"<zz> garbage", BitWidth::Cid, &opts).unwrap_err();
        assert_eq!(err, CMapError::limit("max_input_bytes", 4, 12));
    }

    // ---- bf sections ----

    #[test]
    fn bf_char_utf16_destinations() {
        let cmap = parse_cid(
            "3 beginbfchar\n<0003> <0020>\n<0004> <d83dde00>\n<0005> <41>\nendbfchar",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.charcode_to_unicode_opt(3), Some(' '));
        assert_eq!(cmap.charcode_to_unicode_opt(4), Some('\u{1F600}'));
        assert_eq!(cmap.charcode_to_unicode_opt(5), Some('A'));
    }

    #[test]
    fn bf_char_ligature_keeps_first_scalar() {
        let cmap = parse_cid("1 beginbfchar <0010> <00660069> endbfchar")
            .unwrap()
            .build();
        assert_eq!(cmap.charcode_to_unicode_opt(0x10), Some('f'));
    }

    #[test]
    fn bf_char_bad_destinations_skipped() {
        let cmap = parse_cid(
            "3 beginbfchar\n<01> <d800>\n<02> /space\n<03> <0041>\nendbfchar",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.charcode_to_unicode_opt(1), None);
        assert_eq!(cmap.charcode_to_unicode_opt(2), None);
        assert_eq!(cmap.charcode_to_unicode_opt(3), Some('A'));
    }

    #[test]
    fn bf_range_consecutive_scalars() {
        let cmap = parse_cid("1 beginbfrange <0020> <0022> <0041> endbfrange")
            .unwrap()
            .build();
        assert_eq!(cmap.charcode_to_unicode_opt(0x20), Some('A'));
        assert_eq!(cmap.charcode_to_unicode_opt(0x21), Some('B'));
        assert_eq!(cmap.charcode_to_unicode_opt(0x22), Some('C'));
        assert_eq!(cmap.code_to_unicode_len(), 3);
    }

    #[test]
    fn bf_range_skips_surrogates() {
        let cmap = parse_cid("1 beginbfrange <00> <02> <d7ff> endbfrange")
            .unwrap()
            .build();
        assert_eq!(cmap.charcode_to_unicode_opt(0), Some('\u{D7FF}'));
        assert_eq!(cmap.charcode_to_unicode_opt(1), None);
        assert_eq!(cmap.charcode_to_unicode_opt(2), None);
    }

    #[test]
    fn bf_range_array_form() {
        let cmap = parse_cid(
            "2 beginbfrange\n<005f> <0061> [<00660066> <00660069>]\n<0070> <0070> [<0078> <0079>]\nendbfrange",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.charcode_to_unicode_opt(0x5F), Some('f'));
        assert_eq!(cmap.charcode_to_unicode_opt(0x60), Some('f'));
        // Fewer elements than codes leaves the rest unmapped.
        assert_eq!(cmap.charcode_to_unicode_opt(0x61), None);
        // Extra elements are ignored.
        assert_eq!(cmap.charcode_to_unicode_opt(0x70), Some('x'));
        assert_eq!(cmap.charcode_to_unicode_opt(0x71), None);
    }

    #[test]
    fn bf_range_wrong_arity_rejected() {
        let err = parse_cid("1 beginbfrange <00> <02> endbfrange").unwrap_err();
        assert!(matches!(err, CMapError::InvalidOperand(_)));
    }

    #[test]
    fn notdef_sections_ignored() {
        let cmap = parse_cid(
            "1 beginnotdefrange <00> <1f> 1 endnotdefrange\n1 beginnotdefchar <20> 1 endnotdefchar",
        )
        .unwrap()
        .build();
        assert_eq!(cmap.code_to_cid_len(), 0);
    }

    // ---- Lexing errors ----

    #[test]
    fn syntax_error_surfaces_as_cmap_syntax() {
        let err = parse_cid("1 beginbfchar <00zz> <0041> endbfchar").unwrap_err();
        assert!(matches!(err, CMapError::Syntax(_)));
    }
}

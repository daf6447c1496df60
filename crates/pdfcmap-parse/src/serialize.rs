//! ToUnicode CMap serializer.
//!
//! Regenerates CMap text from a [`CMap`]'s code→Unicode table. Contiguous
//! codes whose scalars are also contiguous are compacted into `bfrange`
//! entries; everything else becomes a `bfchar` entry.

use std::fmt::Write as _;

use pdfcmap_core::CharCode;
use tracing::trace;

use crate::cmap::CMap;

/// Maximum number of entries in one `bfchar` or `bfrange` block.
pub const MAX_BF_ENTRIES: usize = 100;

const HEADER: &str = "\
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange";

const TRAILER: &str = "\
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// A maximal run of codes `first..=last` mapping to consecutive scalars from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    first: CharCode,
    last: CharCode,
    start: char,
}

/// Serialize the code→Unicode table of `cmap` as a ToUnicode CMap.
///
/// Output is the fixed identity header, all `bfchar` blocks, all `bfrange`
/// blocks and the fixed trailer, one item per line with a trailing newline.
pub fn to_unicode_bytes(cmap: &CMap) -> Vec<u8> {
    let runs = compact(cmap);
    let (chars, ranges): (Vec<Run>, Vec<Run>) =
        runs.into_iter().partition(|r| r.first == r.last);
    trace!(
        cmap = %cmap.name(),
        bfchar = chars.len(),
        bfrange = ranges.len(),
        "serializing ToUnicode CMap"
    );

    let entries = chars.len() + ranges.len();
    let mut out = String::with_capacity(HEADER.len() + TRAILER.len() + 32 * entries);
    out.push_str(HEADER);
    out.push('\n');

    for block in chars.chunks(MAX_BF_ENTRIES) {
        let _ = writeln!(out, "{} beginbfchar", block.len());
        for run in block {
            let _ = writeln!(out, "<{}> <{}>", hex_code(run.first), hex_utf16(run.start));
        }
        out.push_str("endbfchar\n");
    }
    for block in ranges.chunks(MAX_BF_ENTRIES) {
        let _ = writeln!(out, "{} beginbfrange", block.len());
        for run in block {
            let _ = writeln!(
                out,
                "<{}><{}> <{}>",
                hex_code(run.first),
                hex_code(run.last),
                hex_utf16(run.start)
            );
        }
        out.push_str("endbfrange\n");
    }

    out.push_str(TRAILER);
    out.push('\n');
    out.into_bytes()
}

/// Group sorted codes into runs where both code and scalar advance by one.
///
/// A run never crosses a low-byte boundary (`..ff` to `..00`): its source
/// codes differ only in the last byte.
fn compact(cmap: &CMap) -> Vec<Run> {
    let table = cmap.code_to_unicode();
    let mut entries: Vec<(CharCode, char)> = table.iter().map(|(&c, &u)| (c, u)).collect();
    entries.sort_unstable_by_key(|&(code, _)| code);

    let mut runs: Vec<Run> = Vec::new();
    for (code, ch) in entries {
        if let Some(run) = runs.last_mut() {
            let run_len = run.last - run.first;
            let extends_code = (run.last & 0xFF) != 0xFF && run.last + 1 == code;
            let extends_scalar = u32::from(run.start)
                .checked_add(run_len + 1)
                .is_some_and(|next| next == u32::from(ch));
            if extends_code && extends_scalar {
                run.last = code;
                continue;
            }
        }
        runs.push(Run {
            first: code,
            last: code,
            start: ch,
        });
    }
    runs
}

/// Lowercase hex code padded to 4, 6 or 8 digits.
fn hex_code(code: CharCode) -> String {
    match code {
        0..=0xFFFF => format!("{code:04x}"),
        0x1_0000..=0xFF_FFFF => format!("{code:06x}"),
        _ => format!("{code:08x}"),
    }
}

/// Lowercase UTF-16BE hex of `ch`.
fn hex_utf16(ch: char) -> String {
    let mut units = [0u16; 2];
    ch.encode_utf16(&mut units)
        .iter()
        .map(|unit| format!("{unit:04x}"))
        .collect()
}

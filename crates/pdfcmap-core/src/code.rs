//! Character codes and codespace ranges.
//!
//! A character code is the numeric value of 1–4 consecutive bytes read
//! big-endian from an encoded string. A [`Codespace`] says which codes of a
//! given byte length are valid, which is how variable-length encodings
//! (e.g. Shift-JIS style CJK CMaps) are disambiguated.

use crate::error::CMapError;

/// A raw character code decoded from 1 to [`MAX_CODE_LEN`] bytes.
pub type CharCode = u32;

/// A character identifier in a CID-keyed font's character collection.
pub type Cid = u32;

/// Maximum number of bytes that make up a single character code.
pub const MAX_CODE_LEN: usize = 4;

/// Replacement for codes that have no Unicode mapping (U+FFFD).
pub const MISSING_CODE_RUNE: char = '\u{FFFD}';

/// Largest code representable in `num_bytes` bytes.
fn max_code(num_bytes: u8) -> CharCode {
    if usize::from(num_bytes) >= MAX_CODE_LEN {
        CharCode::MAX
    } else {
        (1 << (8 * u32::from(num_bytes))) - 1
    }
}

/// Build a big-endian character code from `bytes`.
///
/// Returns `None` for an empty slice or one longer than [`MAX_CODE_LEN`].
pub fn code_from_bytes(bytes: &[u8]) -> Option<CharCode> {
    if bytes.is_empty() || bytes.len() > MAX_CODE_LEN {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0, |code, &b| (code << 8) | CharCode::from(b)),
    )
}

/// A single codespace range: codes of exactly `num_bytes` bytes in `low..=high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCodespace"))]
pub struct Codespace {
    num_bytes: u8,
    low: CharCode,
    high: CharCode,
}

/// Unchecked wire form of [`Codespace`]; deserialization goes through [`Codespace::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCodespace {
    num_bytes: u8,
    low: CharCode,
    high: CharCode,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCodespace> for Codespace {
    type Error = CMapError;

    fn try_from(raw: RawCodespace) -> Result<Self, CMapError> {
        Codespace::new(raw.num_bytes, raw.low, raw.high)
    }
}

impl Codespace {
    /// Create a codespace range.
    ///
    /// # Errors
    ///
    /// Returns [`CMapError::InvalidOperand`] if `num_bytes` is not in `1..=4`,
    /// if `low > high`, or if `high` does not fit in `num_bytes` bytes.
    pub fn new(num_bytes: u8, low: CharCode, high: CharCode) -> Result<Self, CMapError> {
        if num_bytes == 0 || usize::from(num_bytes) > MAX_CODE_LEN {
            return Err(CMapError::InvalidOperand(format!(
                "codespace byte length {num_bytes} outside 1..={MAX_CODE_LEN}"
            )));
        }
        if low > high {
            return Err(CMapError::InvalidOperand(format!(
                "codespace low {low:#x} exceeds high {high:#x}"
            )));
        }
        if high > max_code(num_bytes) {
            return Err(CMapError::InvalidOperand(format!(
                "codespace high {high:#x} does not fit in {num_bytes} byte(s)"
            )));
        }
        Ok(Self {
            num_bytes,
            low,
            high,
        })
    }

    /// Byte length of codes in this range.
    pub fn num_bytes(&self) -> u8 {
        self.num_bytes
    }

    /// Inclusive lower bound.
    pub fn low(&self) -> CharCode {
        self.low
    }

    /// Inclusive upper bound.
    pub fn high(&self) -> CharCode {
        self.high
    }

    /// Returns `true` if `code`, read from exactly `num_bytes` bytes, lies in this range.
    pub fn contains(&self, code: CharCode, num_bytes: usize) -> bool {
        usize::from(self.num_bytes) == num_bytes && self.low <= code && code <= self.high
    }
}

/// Code width class of a CMap.
///
/// Simple fonts use one byte per code and never consult codespaces;
/// CID fonts decode through the codespace matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitWidth {
    /// 8-bit codes (simple fonts).
    Simple,
    /// Multi-byte codes resolved through codespaces (CID fonts).
    #[default]
    Cid,
}

impl BitWidth {
    /// Number of bits: 8 for simple fonts, 16 for CID fonts.
    pub fn bits(&self) -> u8 {
        match self {
            BitWidth::Simple => 8,
            BitWidth::Cid => 16,
        }
    }
}

/// Value of the `/CMapType` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CMapType {
    /// Type 1: character code to CID.
    Cid,
    /// Type 2: character code to Unicode (ToUnicode CMaps).
    ToUnicode,
    /// Any other declared type.
    Other(i64),
}

impl CMapType {
    /// Interpret a `/CMapType` integer.
    pub fn from_value(value: i64) -> Self {
        match value {
            1 => CMapType::Cid,
            2 => CMapType::ToUnicode,
            other => CMapType::Other(other),
        }
    }

    /// The integer written in CMap files.
    pub fn value(&self) -> i64 {
        match self {
            CMapType::Cid => 1,
            CMapType::ToUnicode => 2,
            CMapType::Other(v) => *v,
        }
    }
}

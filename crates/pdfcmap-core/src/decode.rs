/// Result of decoding an encoded byte string to Unicode text.
///
/// Unmapped codes are replaced by [`MISSING_CODE_RUNE`](crate::MISSING_CODE_RUNE)
/// in `text` and counted in `missing`. If trailing bytes matched no codespace,
/// `fully_matched` is `false` and `text` covers only the decoded prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedText {
    /// Decoded text, with replacement characters for unmapped codes.
    pub text: String,
    /// Number of codes that had no Unicode mapping.
    pub missing: usize,
    /// Whether every input byte was consumed by a codespace match.
    pub fully_matched: bool,
}

impl DecodedText {
    /// Returns `true` if all bytes matched and every code had a mapping.
    pub fn is_clean(&self) -> bool {
        self.fully_matched && self.missing == 0
    }
}

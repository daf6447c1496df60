//! Frozen CMap tables and the codespace matcher.
//!
//! A [`CMap`] maps raw character codes to CIDs and to Unicode scalars, with
//! derived inverse tables for the reverse lookups. Instances are produced by
//! [`CMapBuilder::build`] and never change afterwards, so they can be shared
//! across threads behind an `Arc` without locking.

use std::collections::HashMap;
use std::fmt;

use pdfcmap_core::{
    BitWidth, CMapError, CMapType, CharCode, Cid, CidSystemInfo, Codespace, DecodedText,
    LoadOptions, MAX_CODE_LEN, MISSING_CODE_RUNE,
};
use tracing::debug;

use crate::builder::CMapBuilder;
use crate::grammar;
use crate::serialize;

/// Name of the identity ToUnicode CMap produced by [`CMap::new_to_unicode`].
pub const IDENTITY_UCS_NAME: &str = "Adobe-Identity-UCS";

/// An immutable character code mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CMap {
    pub(crate) name: String,
    pub(crate) bit_width: BitWidth,
    pub(crate) cmap_type: Option<CMapType>,
    pub(crate) version: String,
    pub(crate) writing_mode: u8,
    pub(crate) usecmap: Option<String>,
    pub(crate) system_info: CidSystemInfo,
    pub(crate) codespaces: Vec<Codespace>,
    pub(crate) code_to_cid: HashMap<CharCode, Cid>,
    pub(crate) cid_to_code: HashMap<Cid, CharCode>,
    pub(crate) code_to_unicode: HashMap<CharCode, char>,
    pub(crate) unicode_to_code: HashMap<char, CharCode>,
}

/// Reject a parsed CMap that could never resolve a byte sequence.
pub(crate) fn ensure_usable(builder: &CMapBuilder) -> Result<(), CMapError> {
    if builder.codespaces().is_empty() && builder.usecmap().is_none() {
        debug!(name = %builder.name(), "CMap has no codespaces and no usecmap");
        return Err(CMapError::UnusableCMap(builder.name().to_string()));
    }
    Ok(())
}

impl CMap {
    /// Parse a CMap stream for a CID font (multi-byte codes).
    ///
    /// A `usecmap` reference is recorded but not resolved; use
    /// [`PredefinedLoader::load_embedded`](crate::PredefinedLoader::load_embedded)
    /// to inherit from the base CMap.
    ///
    /// # Errors
    ///
    /// Returns [`CMapError::UnusableCMap`] if the stream has neither
    /// codespaces nor a `usecmap`, or any error from [`grammar::parse`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, CMapError> {
        Self::from_bytes_with_options(data, BitWidth::Cid, &LoadOptions::default())
    }

    /// Parse a CMap stream for a simple font (one byte per code).
    pub fn from_bytes_simple(data: &[u8]) -> Result<Self, CMapError> {
        Self::from_bytes_with_options(data, BitWidth::Simple, &LoadOptions::default())
    }

    /// Parse a CMap stream with explicit code width and resource limits.
    pub fn from_bytes_with_options(
        data: &[u8],
        bit_width: BitWidth,
        options: &LoadOptions,
    ) -> Result<Self, CMapError> {
        let builder = grammar::parse(data, bit_width, options)?;
        ensure_usable(&builder)?;
        Ok(builder.build())
    }

    /// Build the identity ToUnicode CMap for `code_to_unicode`.
    ///
    /// The result is named `Adobe-Identity-UCS`, has type 2, 16-bit codes,
    /// system info Adobe-UCS-0 and a single `<0000> <FFFF>` codespace.
    pub fn new_to_unicode(code_to_unicode: HashMap<CharCode, char>) -> Self {
        let mut builder = CMapBuilder::new(BitWidth::Cid);
        builder
            .set_name(IDENTITY_UCS_NAME)
            .set_cmap_type(CMapType::ToUnicode)
            .set_system_info(CidSystemInfo::identity_ucs());
        if let Ok(codespace) = Codespace::new(2, 0x0000, 0xFFFF) {
            builder.add_codespace(codespace);
        }
        for (code, ch) in code_to_unicode {
            // The builder has no mapping limit, so this cannot fail.
            let _ = builder.insert_unicode(code, ch);
        }
        builder.build()
    }

    // ---- Metadata ----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bit_width(&self) -> BitWidth {
        self.bit_width
    }

    /// Declared `/CMapType`, if any.
    pub fn cmap_type(&self) -> Option<CMapType> {
        self.cmap_type
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Writing mode: 0 horizontal, 1 vertical.
    pub fn writing_mode(&self) -> u8 {
        self.writing_mode
    }

    /// Name of the base CMap declared with `usecmap`.
    pub fn usecmap(&self) -> Option<&str> {
        self.usecmap.as_deref()
    }

    pub fn system_info(&self) -> &CidSystemInfo {
        &self.system_info
    }

    /// Codespaces sorted by low bound.
    pub fn codespaces(&self) -> &[Codespace] {
        &self.codespaces
    }

    pub fn code_to_cid(&self) -> &HashMap<CharCode, Cid> {
        &self.code_to_cid
    }

    pub fn code_to_unicode(&self) -> &HashMap<CharCode, char> {
        &self.code_to_unicode
    }

    pub fn code_to_cid_len(&self) -> usize {
        self.code_to_cid.len()
    }

    pub fn code_to_unicode_len(&self) -> usize {
        self.code_to_unicode.len()
    }

    // ---- Lookups ----

    pub fn charcode_to_cid(&self, code: CharCode) -> Option<Cid> {
        self.code_to_cid.get(&code).copied()
    }

    /// Smallest code mapping to `cid`.
    pub fn cid_to_charcode(&self, cid: Cid) -> Option<CharCode> {
        self.cid_to_code.get(&cid).copied()
    }

    pub fn charcode_to_unicode_opt(&self, code: CharCode) -> Option<char> {
        self.code_to_unicode.get(&code).copied()
    }

    /// Smallest code mapping to `ch`.
    pub fn rune_to_charcode(&self, ch: char) -> Option<CharCode> {
        self.unicode_to_code.get(&ch).copied()
    }

    /// Convert one code to Unicode.
    ///
    /// Unmapped codes yield [`MISSING_CODE_RUNE`] and `false`.
    pub fn charcode_to_unicode(&self, code: CharCode) -> (char, bool) {
        match self.charcode_to_unicode_opt(code) {
            Some(ch) => (ch, true),
            None => (MISSING_CODE_RUNE, false),
        }
    }

    // ---- Matching ----

    /// Split `data` into character codes.
    ///
    /// Simple-width CMaps treat every byte as a code. Otherwise each code is
    /// the shortest prefix (1 to 4 bytes) that lies in a codespace of exactly
    /// that length. On the first position where no prefix matches, returns
    /// the codes decoded so far and `false`.
    pub fn bytes_to_charcodes(&self, data: &[u8]) -> (Vec<CharCode>, bool) {
        if self.bit_width == BitWidth::Simple {
            return (data.iter().map(|&b| CharCode::from(b)).collect(), true);
        }

        let mut codes = Vec::with_capacity(data.len());
        let mut pos = 0;
        while pos < data.len() {
            match self.match_code(&data[pos..]) {
                Some((code, len)) => {
                    codes.push(code);
                    pos += len;
                }
                None => {
                    debug!(
                        cmap = %self.name,
                        offset = pos,
                        bytes = ?&data[pos..data.len().min(pos + MAX_CODE_LEN)],
                        "no codespace matches"
                    );
                    return (codes, false);
                }
            }
        }
        (codes, true)
    }

    /// Match the code at the start of `data`, returning it with its byte length.
    fn match_code(&self, data: &[u8]) -> Option<(CharCode, usize)> {
        let mut code: CharCode = 0;
        for (i, &b) in data.iter().take(MAX_CODE_LEN).enumerate() {
            code = (code << 8) | CharCode::from(b);
            let len = i + 1;
            if self.in_codespace(code, len) {
                return Some((code, len));
            }
        }
        None
    }

    fn in_codespace(&self, code: CharCode, num_bytes: usize) -> bool {
        self.codespaces.iter().any(|cs| cs.contains(code, num_bytes))
    }

    /// Decode an encoded byte string to Unicode text.
    ///
    /// Unmapped codes become [`MISSING_CODE_RUNE`] and are counted in
    /// [`DecodedText::missing`].
    pub fn charcode_bytes_to_unicode(&self, data: &[u8]) -> DecodedText {
        let (codes, fully_matched) = self.bytes_to_charcodes(data);
        self.charcodes_to_unicode(&codes, fully_matched)
    }

    /// Map codes already produced by [`bytes_to_charcodes`](Self::bytes_to_charcodes)
    /// to Unicode text, carrying its `fully_matched` flag through.
    pub fn charcodes_to_unicode(&self, codes: &[CharCode], fully_matched: bool) -> DecodedText {
        let mut text = String::with_capacity(codes.len());
        let mut missing = 0;
        for &code in codes {
            let (ch, found) = self.charcode_to_unicode(code);
            if !found {
                missing += 1;
            }
            text.push(ch);
        }

        if missing > 0 {
            debug!(cmap = %self.name, missing, "codes without Unicode mapping");
        }

        DecodedText {
            text,
            missing,
            fully_matched,
        }
    }

    /// Serialize `code_to_unicode` as a ToUnicode CMap stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize::to_unicode_bytes(self)
    }
}

impl fmt::Display for CMap {
    /// One-line summary, e.g.
    /// `CMAP{"Adobe-Identity-UCS" nbits:16 type:2 systemInfo:Adobe-UCS-000 codespaces:1 codeToUnicode:3}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CMAP{{{:?} nbits:{} type:{}",
            self.name,
            self.bit_width.bits(),
            self.cmap_type.map_or(0, |t| t.value())
        )?;
        if !self.version.is_empty() {
            write!(f, " version:{}", self.version)?;
        }
        if let Some(base) = &self.usecmap {
            write!(f, " usecmap:{base:?}")?;
        }
        write!(f, " systemInfo:{}", self.system_info)?;
        if !self.codespaces.is_empty() {
            write!(f, " codespaces:{}", self.codespaces.len())?;
        }
        if !self.code_to_unicode.is_empty() {
            write!(f, " codeToUnicode:{}", self.code_to_unicode.len())?;
        }
        f.write_str("}")
    }
}

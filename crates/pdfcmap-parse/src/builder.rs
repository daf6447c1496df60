//! Mutable CMap form used while parsing and merging.
//!
//! [`CMapBuilder`] collects codespaces and forward mappings. Once every
//! section has been read and any base CMap merged in, [`CMapBuilder::build`]
//! derives the inverse tables and freezes the result into a [`CMap`].

use std::collections::HashMap;

use pdfcmap_core::{
    BitWidth, CMapError, CMapType, CharCode, Cid, CidSystemInfo, Codespace, LoadOptions,
};
use tracing::trace;

use crate::cmap::CMap;

/// A CMap under construction.
#[derive(Debug, Clone, Default)]
pub struct CMapBuilder {
    name: String,
    bit_width: BitWidth,
    cmap_type: Option<CMapType>,
    version: String,
    writing_mode: u8,
    usecmap: Option<String>,
    system_info: CidSystemInfo,
    codespaces: Vec<Codespace>,
    code_to_cid: HashMap<CharCode, Cid>,
    code_to_unicode: HashMap<CharCode, char>,
    max_mappings: Option<usize>,
}

impl CMapBuilder {
    /// Create an empty builder for the given code width, without mapping limits.
    pub fn new(bit_width: BitWidth) -> Self {
        Self {
            bit_width,
            ..Self::default()
        }
    }

    /// Create an empty builder that enforces `options.max_mappings`.
    pub fn with_options(bit_width: BitWidth, options: &LoadOptions) -> Self {
        Self {
            bit_width,
            max_mappings: Some(options.max_mappings),
            ..Self::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_cmap_type(&mut self, cmap_type: CMapType) -> &mut Self {
        self.cmap_type = Some(cmap_type);
        self
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// Set the writing mode: 0 horizontal, 1 vertical.
    pub fn set_writing_mode(&mut self, writing_mode: u8) -> &mut Self {
        self.writing_mode = writing_mode;
        self
    }

    /// Record the name of the base CMap this one inherits from.
    pub fn set_usecmap(&mut self, name: impl Into<String>) -> &mut Self {
        self.usecmap = Some(name.into());
        self
    }

    pub fn set_system_info(&mut self, system_info: CidSystemInfo) -> &mut Self {
        self.system_info = system_info;
        self
    }

    pub fn add_codespace(&mut self, codespace: Codespace) -> &mut Self {
        self.codespaces.push(codespace);
        self
    }

    /// Map `code` to `cid`, replacing any earlier mapping for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CMapError::ResourceLimitExceeded`] if the table would grow
    /// past the configured `max_mappings`.
    pub fn insert_cid(&mut self, code: CharCode, cid: Cid) -> Result<(), CMapError> {
        check_growth(&self.code_to_cid, code, self.max_mappings)?;
        self.code_to_cid.insert(code, cid);
        Ok(())
    }

    /// Map `code` to the Unicode scalar `ch`, replacing any earlier mapping for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CMapError::ResourceLimitExceeded`] if the table would grow
    /// past the configured `max_mappings`.
    pub fn insert_unicode(&mut self, code: CharCode, ch: char) -> Result<(), CMapError> {
        check_growth(&self.code_to_unicode, code, self.max_mappings)?;
        self.code_to_unicode.insert(code, ch);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bit_width(&self) -> BitWidth {
        self.bit_width
    }

    pub fn usecmap(&self) -> Option<&str> {
        self.usecmap.as_deref()
    }

    pub fn codespaces(&self) -> &[Codespace] {
        &self.codespaces
    }

    /// Number of code→CID entries collected so far.
    pub fn cid_mapping_count(&self) -> usize {
        self.code_to_cid.len()
    }

    /// Number of code→Unicode entries collected so far.
    pub fn unicode_mapping_count(&self) -> usize {
        self.code_to_unicode.len()
    }

    /// Inherit from a base CMap.
    ///
    /// Base code→CID entries are copied only where this CMap has no entry for
    /// the code. All base codespaces are appended; duplicates are harmless
    /// because matching is a membership test.
    pub fn merge_base(&mut self, base: &CMap) -> &mut Self {
        let before = self.code_to_cid.len();
        for (&code, &cid) in base.code_to_cid() {
            self.code_to_cid.entry(code).or_insert(cid);
        }
        self.codespaces.extend_from_slice(base.codespaces());
        trace!(
            child = %self.name,
            base = %base.name(),
            inherited = self.code_to_cid.len() - before,
            "merged base CMap"
        );
        self
    }

    /// Freeze into an immutable [`CMap`].
    ///
    /// Derives `cid → code` and `unicode → code`, keeping the numerically
    /// smallest code when several map to the same value, then sorts the
    /// codespaces by their low bound.
    pub fn build(self) -> CMap {
        let cid_to_code = invert(&self.code_to_cid);
        let unicode_to_code = invert(&self.code_to_unicode);

        let mut codespaces = self.codespaces;
        codespaces.sort_by_key(|cs| cs.low());

        CMap {
            name: self.name,
            bit_width: self.bit_width,
            cmap_type: self.cmap_type,
            version: self.version,
            writing_mode: self.writing_mode,
            usecmap: self.usecmap,
            system_info: self.system_info,
            codespaces,
            code_to_cid: self.code_to_cid,
            cid_to_code,
            code_to_unicode: self.code_to_unicode,
            unicode_to_code,
        }
    }
}

fn check_growth<V>(
    table: &HashMap<CharCode, V>,
    code: CharCode,
    max_mappings: Option<usize>,
) -> Result<(), CMapError> {
    if let Some(max) = max_mappings {
        if table.len() >= max && !table.contains_key(&code) {
            return Err(CMapError::limit("max_mappings", max, table.len() + 1));
        }
    }
    Ok(())
}

/// Invert `forward`, resolving collisions to the smallest source code.
fn invert<V>(forward: &HashMap<CharCode, V>) -> HashMap<V, CharCode>
where
    V: Copy + Eq + std::hash::Hash,
{
    let mut inverse: HashMap<V, CharCode> = HashMap::with_capacity(forward.len());
    for (&code, &value) in forward {
        inverse
            .entry(value)
            .and_modify(|existing| {
                if code < *existing {
                    *existing = code;
                }
            })
            .or_insert(code);
    }
    inverse
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codespace(num_bytes: u8, low: CharCode, high: CharCode) -> Codespace {
        Codespace::new(num_bytes, low, high).unwrap()
    }

    // --- Inverse tables ---

    #[test]
    fn inverse_cid_keeps_smallest_code() {
        let mut b = CMapBuilder::new(BitWidth::Cid);
        b.insert_cid(0x30, 7).unwrap();
        b.insert_cid(0x10, 7).unwrap();
        b.insert_cid(0x20, 7).unwrap();
        b.insert_cid(0x40, 8).unwrap();
        let cmap = b.build();
        assert_eq!(cmap.cid_to_charcode(7), Some(0x10));
        assert_eq!(cmap.cid_to_charcode(8), Some(0x40));
    }

    #[test]
    fn inverse_unicode_independent_of_insertion_order() {
        let codes = [0x99, 0x05, 0x42, 0x07];
        let mut forward = CMapBuilder::new(BitWidth::Cid);
        for code in codes {
            forward.insert_unicode(code, 'x').unwrap();
        }
        let mut backward = CMapBuilder::new(BitWidth::Cid);
        for code in codes.iter().rev() {
            backward.insert_unicode(*code, 'x').unwrap();
        }
        assert_eq!(forward.build().rune_to_charcode('x'), Some(0x05));
        assert_eq!(backward.build().rune_to_charcode('x'), Some(0x05));
    }

    #[test]
    fn later_insert_replaces_earlier() {
        let mut b = CMapBuilder::new(BitWidth::Cid);
        b.insert_unicode(0x41, 'A').unwrap();
        b.insert_unicode(0x41, 'B').unwrap();
        let cmap = b.build();
        assert_eq!(cmap.charcode_to_unicode_opt(0x41), Some('B'));
        assert_eq!(cmap.rune_to_charcode('A'), None);
    }

    // --- Codespaces ---

    #[test]
    fn build_sorts_codespaces_by_low() {
        let mut b = CMapBuilder::new(BitWidth::Cid);
        b.add_codespace(codespace(2, 0x8140, 0x9FFC))
            .add_codespace(codespace(1, 0x00, 0x80))
            .add_codespace(codespace(1, 0xA0, 0xDF));
        let lows: Vec<CharCode> = b.build().codespaces().iter().map(|cs| cs.low()).collect();
        assert_eq!(lows, vec![0x00, 0xA0, 0x8140]);
    }

    // --- Merge ---

    #[test]
    fn merge_base_child_wins_and_codespaces_append() {
        let mut base = CMapBuilder::new(BitWidth::Cid);
        base.set_name("Base");
        base.add_codespace(codespace(2, 0x0000, 0xFFFF));
        base.insert_cid(0x0001, 100).unwrap();
        base.insert_cid(0x0002, 200).unwrap();
        let base = base.build();

        let mut child = CMapBuilder::new(BitWidth::Cid);
        child.set_name("Child").set_usecmap("Base");
        child.add_codespace(codespace(2, 0x0000, 0xFFFF));
        child.insert_cid(0x0001, 1).unwrap();
        child.merge_base(&base);
        let cmap = child.build();

        assert_eq!(cmap.charcode_to_cid(0x0001), Some(1));
        assert_eq!(cmap.charcode_to_cid(0x0002), Some(200));
        assert_eq!(cmap.codespaces().len(), 2);
        assert_eq!(cmap.usecmap(), Some("Base"));
    }

    // --- Limits ---

    #[test]
    fn max_mappings_enforced_on_new_keys_only() {
        let opts = LoadOptions {
            max_mappings: 2,
            ..LoadOptions::default()
        };
        let mut b = CMapBuilder::with_options(BitWidth::Cid, &opts);
        b.insert_cid(1, 1).unwrap();
        b.insert_cid(2, 2).unwrap();
        // Overwriting an existing key does not grow the table.
        b.insert_cid(2, 3).unwrap();
        let err = b.insert_cid(3, 3).unwrap_err();
        assert_eq!(err, CMapError::limit("max_mappings", 2, 3));
    }

    #[test]
    fn unlimited_builder_has_no_cap() {
        let mut b = CMapBuilder::new(BitWidth::Cid);
        for code in 0..5000 {
            b.insert_cid(code, code).unwrap();
        }
        assert_eq!(b.cid_mapping_count(), 5000);
    }

    #[test]
    fn metadata_carries_into_cmap() {
        let mut b = CMapBuilder::new(BitWidth::Simple);
        b.set_name("Test-H")
            .set_cmap_type(CMapType::Cid)
            .set_version("10.001")
            .set_writing_mode(1)
            .set_system_info(CidSystemInfo::new("Adobe", "Japan1", 6));
        let cmap = b.build();
        assert_eq!(cmap.name(), "Test-H");
        assert_eq!(cmap.bit_width(), BitWidth::Simple);
        assert_eq!(cmap.cmap_type(), Some(CMapType::Cid));
        assert_eq!(cmap.version(), "10.001");
        assert_eq!(cmap.writing_mode(), 1);
        assert_eq!(cmap.system_info().to_string(), "Adobe-Japan1-006");
        assert_eq!(cmap.usecmap(), None);
    }
}

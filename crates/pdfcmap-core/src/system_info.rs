use std::fmt;

/// CID system information from a `/CIDSystemInfo` dictionary.
///
/// Identifies the character collection a CID-keyed CMap addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CidSystemInfo {
    /// Registry (e.g., "Adobe").
    pub registry: String,
    /// Ordering (e.g., "Japan1", "GB1", "CNS1", "Korea1", "UCS").
    pub ordering: String,
    /// Supplement number.
    pub supplement: u32,
}

impl CidSystemInfo {
    pub fn new(registry: impl Into<String>, ordering: impl Into<String>, supplement: u32) -> Self {
        Self {
            registry: registry.into(),
            ordering: ordering.into(),
            supplement,
        }
    }

    /// The Adobe-UCS-0 collection used by identity ToUnicode CMaps.
    pub fn identity_ucs() -> Self {
        Self::new("Adobe", "UCS", 0)
    }

    /// Check if this is an Adobe CJK system.
    pub fn is_adobe_cjk(&self) -> bool {
        self.registry == "Adobe"
            && matches!(self.ordering.as_str(), "Japan1" | "GB1" | "CNS1" | "Korea1")
    }
}

impl fmt::Display for CidSystemInfo {
    /// Formats as `Registry-Ordering-NNN`, e.g. `Adobe-Japan2-000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:03}",
            self.registry, self.ordering, self.supplement
        )
    }
}

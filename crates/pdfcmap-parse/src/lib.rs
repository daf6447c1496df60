//! pdfcmap-parse: CMap grammar interpreter, tables and serializer.
//!
//! This crate reads CMap-format text (embedded ToUnicode streams and
//! predefined CID CMaps), freezes it into an immutable [`CMap`], decodes
//! encoded byte strings through its codespaces, and writes ToUnicode CMaps
//! back out. It depends on pdfcmap-core for shared value types.

pub mod builder;
pub mod cmap;
pub mod error;
pub mod grammar;
pub mod predefined;
pub mod serialize;
pub mod tokenizer;

pub use builder::CMapBuilder;
pub use cmap::{CMap, IDENTITY_UCS_NAME};
pub use error::ParseError;
pub use pdfcmap_core;
pub use predefined::{AssetStore, CMapCache, DirAssetStore, MemoryAssetStore, PredefinedLoader};
pub use serialize::to_unicode_bytes;

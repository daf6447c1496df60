//! pdfcmap-core: Backend-independent value types for the CMap engine.
//!
//! This crate provides the foundational types ([`CharCode`], [`Codespace`],
//! [`CidSystemInfo`], [`CMapError`], [`LoadOptions`]) shared by the parser,
//! the predefined loader and the command-line tool. Apart from optional
//! `serde` support it has no external dependencies.

pub mod code;
pub mod decode;
pub mod error;
pub mod system_info;

pub use code::{
    BitWidth, CMapType, CharCode, Cid, Codespace, MAX_CODE_LEN, MISSING_CODE_RUNE,
    code_from_bytes,
};
pub use decode::DecodedText;
pub use error::{CMapError, LoadOptions};
pub use system_info::CidSystemInfo;

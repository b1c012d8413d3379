//! Binary `.hbk` container access.
//!
//! - [`ContainerReader`] maps the file and indexes its named entities
//! - [`HelpBookArchive`] unpacks the TOC entity and exposes the file-storage zip

pub mod archive;
pub mod cursor;
pub mod reader;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use archive::{FILE_STORAGE_ENTITY, FileStorage, HelpBookArchive, TOC_ENTITY};
pub use cursor::ByteCursor;
pub use reader::ContainerReader;

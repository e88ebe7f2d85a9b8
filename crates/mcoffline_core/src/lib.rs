pub mod converter;
pub mod error;
pub mod identity;
pub mod index;
pub mod properties;
pub mod record;
pub mod remap;
pub mod transcode;

pub use converter::{
    CategoryReport, ConversionSummary, ConvertConfig, ConvertedList, Converter,
};
pub use error::{CoreError, CoreErrorCode};
pub use identity::{offline_uuid, offline_uuid_string};
pub use index::IdentityIndex;
pub use record::IdentityRecord;
pub use remap::{
    LinkMode, RemapOptions, RemapReport, RemappedFile, offline_path, remap_directory,
};

/// Suffix appended to every converted file and directory.
pub const OFFLINE_SUFFIX: &str = ".offline";

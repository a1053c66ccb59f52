mod format;
mod metadata;

pub use self::format::Format;
pub use self::metadata::ExtractedMetadata;

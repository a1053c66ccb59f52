use serde::Serialize;
use sift_catalog::UploadStatus;
use sift_catalog::models::AcquisitionMetadata;
use sift_extract::Format;
use std::path::PathBuf;

/// A file that is ready to upload (or known not to need it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Relative path from the session folder root
    pub path: PathBuf,
    /// `v0-sha384-<hex>` of the file as stored (before decompression)
    pub content_hash: String,
    /// Size of the decompressed content in bytes
    pub size: u64,
    pub format: Format,
    /// Extension of the decompressed content (`.csv`, `.txt`), or empty
    pub content_ext: String,
    pub header: AcquisitionMetadata,
    pub upload_status: UploadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let record = FileRecord {
            path: PathBuf::from("ex12345/physio.txt.gz"),
            content_hash: "v0-sha384-00".to_string(),
            size: 42,
            format: Format::Physiological,
            content_ext: ".txt".to_string(),
            header: AcquisitionMetadata::default(),
            upload_status: UploadStatus::Mismatch,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["path"], "ex12345/physio.txt.gz");
        assert_eq!(json["format"], "physiological");
        assert_eq!(json["header"]["SeriesInstanceUID"], "");
        assert_eq!(json["upload_status"], "server-and-file-header-mismatch");
    }
}

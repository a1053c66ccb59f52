use crate::models::{Acquisition, AcquisitionMetadata};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Where a file with a given content hash was uploaded before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorUpload {
    pub uid: Option<String>,
    pub label: Option<String>,
    pub session_uid: Option<String>,
}

/// Result of checking a file against what the archive already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    /// No file with this content has been uploaded.
    NeedsUpload,
    /// The same content is already attached to the acquisition this file
    /// resolves to.
    PreviouslyUploaded,
    /// The same content was uploaded, but to a different acquisition than
    /// this file now resolves to.
    #[serde(rename = "server-and-file-header-mismatch")]
    Mismatch,
}
impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsUpload => "needs-upload",
            Self::PreviouslyUploaded => "previously-uploaded",
            Self::Mismatch => "server-and-file-header-mismatch",
        }
    }
}
impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Content hash to prior upload, for deduplication.
#[derive(Debug, Clone, Default)]
pub struct UploadIndex {
    uploads: HashMap<String, PriorUpload>,
}
impl UploadIndex {
    /// When the same content is attached to several acquisitions, the one
    /// listed last wins.
    pub fn from_acquisitions<'a>(acquisitions: impl IntoIterator<Item = &'a Acquisition>) -> Self {
        let mut uploads = HashMap::new();
        for acquisition in acquisitions {
            for hash in &acquisition.file_hashes {
                let prior = PriorUpload {
                    uid: acquisition.uid.clone(),
                    label: acquisition.label.clone(),
                    session_uid: acquisition.session.uid.clone(),
                };
                uploads.insert(hash.clone(), prior);
            }
        }
        Self { uploads }
    }

    pub fn get(&self, hash: &str) -> Option<&PriorUpload> {
        self.uploads.get(hash)
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    /// Classify a file by its content hash and the header it resolved to.
    pub fn status(&self, hash: &str, header: &AcquisitionMetadata) -> UploadStatus {
        let Some(prior) = self.get(hash) else {
            return UploadStatus::NeedsUpload;
        };
        let same = prior.uid.as_deref() == Some(header.series_instance_uid.as_str())
            && prior.label.as_deref() == Some(header.series_description.as_str())
            && prior.session_uid.as_deref() == Some(header.study_instance_uid.as_str());
        match same {
            true => UploadStatus::PreviouslyUploaded,
            false => UploadStatus::Mismatch,
        }
    }
}

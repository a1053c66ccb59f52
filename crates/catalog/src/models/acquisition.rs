use super::Session;

/// A previously uploaded acquisition, as listed by the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub uid: Option<String>,
    pub label: Option<String>,
    pub session: Session,
    /// Content hashes of the files attached to this acquisition.
    pub file_hashes: Vec<String>,
}

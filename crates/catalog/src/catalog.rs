use crate::models::{Acquisition, Session};
use sift_extract::SubjectCode;
use std::collections::{HashMap, HashSet};

/// Known sessions, grouped by normalized subject code.
///
/// Built once per batch from the archive's acquisition listing. Sessions keep
/// the order the archive listed them in, and each session appears once no
/// matter how many acquisitions it has.
#[derive(Debug, Clone, Default)]
pub struct SessionCatalog {
    subjects: HashMap<SubjectCode, Vec<Session>>,
}
impl SessionCatalog {
    pub fn from_acquisitions<'a>(acquisitions: impl IntoIterator<Item = &'a Acquisition>) -> Self {
        let mut seen = HashSet::new();
        let mut subjects: HashMap<SubjectCode, Vec<Session>> = HashMap::new();
        for acquisition in acquisitions {
            let session = &acquisition.session;
            if let Some(uid) = &session.uid
                && !seen.insert(uid.clone())
            {
                continue;
            }
            let subject = match SubjectCode::normalize(&session.subject_code) {
                Ok(subject) => subject,
                Err(err) => {
                    tracing::warn!(session = %session.describe(), %err, "skipping session with unusable subject code");
                    continue;
                },
            };
            subjects.entry(subject).or_default().push(session.clone());
        }
        Self { subjects }
    }

    /// Sessions of `subject`, in catalog order.
    pub fn sessions(&self, subject: &SubjectCode) -> &[Session] {
        self.subjects.get(subject).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&SubjectCode, &[Session])> {
        self.subjects.iter().map(|(subject, sessions)| (subject, sessions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.subjects.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

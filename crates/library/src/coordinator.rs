//! Primary/secondary coordination within one batch.
//!
//! A participant table family is parsed once, through its primary `.csv`;
//! the other family members wait for that result and reuse it. A [`Run`]
//! is built from the full file listing before anything is dispatched:
//!
//! 1. every primary gets a pending slot, so a secondary can tell "not done
//!    yet" apart from "doesn't exist";
//! 2. [`Run::sort`] moves primaries to the front, so that however few files
//!    are processed at once, a secondary is never waiting on a primary stuck
//!    behind it in the queue.
//!
//! Slots are `watch` channels: the primary is the only writer, and any
//! number of secondaries can wait for the value to settle.
//!
//! Family membership is decided on the content path, so `x.csv.gz` is the
//! primary that `x.log` and `x.psydat.bz2` wait for.

use crate::ingest::error::{ErrorKind, Result};
use exn::ResultExt;
use sift_compress::Compression;
use sift_extract::ExtractedMetadata;
use sift_extract::family::{self, Member};
use sift_storage::FileInfo;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// What a primary settles with.
pub type PrimaryOutcome = std::result::Result<ExtractedMetadata, ErrorKind>;

/// How a file takes part in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Processed on its own.
    Independent,
    /// Extracts metadata and publishes it for its family.
    Primary,
    /// Waits for the primary at `primary` and reuses its metadata.
    Secondary { primary: PathBuf },
}

/// Per-batch coordination state.
///
/// Nothing outlives the batch: a new listing means a new `Run`.
#[derive(Debug, Default)]
pub struct Run {
    family_mode: bool,
    slots: HashMap<PathBuf, watch::Sender<Option<PrimaryOutcome>>>,
}

impl Run {
    /// Register every primary in `paths`.
    ///
    /// Folders without a single `.psydat` file are not family folders; the
    /// run is then a pass-through and every file is independent.
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(content_path).collect();
        if !paths.iter().any(family::is_indicator) {
            return Self::default();
        }
        let slots: HashMap<_, _> = paths
            .into_iter()
            .filter(|path| family::member(path) == Some(Member::Primary))
            .map(|path| (path, watch::Sender::new(None)))
            .collect();
        tracing::debug!(primaries = slots.len(), "participant table families detected");
        Self {
            family_mode: true,
            slots,
        }
    }

    pub fn is_family_mode(&self) -> bool {
        self.family_mode
    }

    pub fn role(&self, path: &Path) -> Role {
        if !self.family_mode {
            return Role::Independent;
        }
        match family::member(content_path(path)) {
            Some(Member::Primary) => Role::Primary,
            Some(Member::Secondary { primary }) => Role::Secondary { primary },
            None => Role::Independent,
        }
    }

    /// Order files for dispatch: primaries first, everything else after, in
    /// listing order.
    pub fn sort(&self, files: &mut [FileInfo]) {
        files.sort_by_key(|file| match self.role(&file.path) {
            Role::Primary => 0,
            _ => 1,
        });
    }

    /// Settle the primary at `primary`.
    ///
    /// Only the first call has any effect; returns whether this call was it.
    pub fn publish(&self, primary: &Path, outcome: PrimaryOutcome) -> bool {
        let Some(slot) = self.slots.get(&content_path(primary)) else {
            return false;
        };
        let mut outcome = Some(outcome);
        slot.send_if_modified(|value| match value {
            Some(_) => false,
            None => {
                *value = outcome.take();
                true
            },
        })
    }

    /// Wait for the primary at `primary` (a content path, as given by
    /// [`Role::Secondary`]) to settle and take a copy of its metadata.
    ///
    /// # Errors
    /// - [`MissingPrimary`](ErrorKind::MissingPrimary) if the primary is not
    ///   part of this run.
    /// - [`PrimaryFailed`](ErrorKind::PrimaryFailed) wrapping the primary's
    ///   own error.
    pub async fn await_primary(&self, secondary: &Path, primary: &Path) -> Result<ExtractedMetadata> {
        let missing = || ErrorKind::MissingPrimary {
            secondary: secondary.to_path_buf(),
            primary: primary.to_path_buf(),
        };
        let Some(slot) = self.slots.get(primary) else {
            exn::bail!(missing());
        };
        let mut receiver = slot.subscribe();
        let outcome = receiver.wait_for(Option::is_some).await.or_raise(missing)?.clone();
        match outcome {
            Some(Ok(metadata)) => Ok(metadata),
            Some(Err(cause)) => exn::bail!(ErrorKind::PrimaryFailed {
                primary: primary.to_path_buf(),
                cause: Box::new(cause),
            }),
            None => exn::bail!(missing()),
        }
    }
}

fn content_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    Compression::from_path(path).content_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_extract::error::ErrorKind as ExtractErrorKind;
    use sift_extract::{Format, SubjectCode};
    use std::sync::Arc;
    use time::macros::datetime;

    const FAMILY: [&str; 5] = [
        "00012345-1_emoreg.csv",
        "00012345-1_emoreg.psydat",
        "00012345-1_emoreg.log",
        "00012345-1_emoreg.xlsx",
        "00012345-1_emoregblocks.csv",
    ];

    fn run(paths: &[&str]) -> Run {
        Run::new(paths.iter().map(Path::new))
    }

    fn metadata() -> ExtractedMetadata {
        ExtractedMetadata {
            subject: SubjectCode::normalize("00012345-1").unwrap(),
            timestamp: datetime!(2015-01-02 12:03 UTC),
            format: Format::ParticipantTable,
            visit: Some(1),
        }
    }

    #[test]
    fn test_pass_through_without_psydat() {
        let run = run(&["00012345-1_emoreg.csv", "00012345-1_emoreg.log"]);
        assert!(!run.is_family_mode());
        assert_eq!(run.role(Path::new("00012345-1_emoreg.log")), Role::Independent);
        assert_eq!(run.role(Path::new("00012345-1_emoreg.csv")), Role::Independent);
    }

    #[test]
    fn test_roles() {
        let run = run(&FAMILY);
        assert!(run.is_family_mode());
        assert_eq!(run.role(Path::new("00012345-1_emoreg.csv")), Role::Primary);
        assert_eq!(
            run.role(Path::new("00012345-1_emoregblocks.csv")),
            Role::Secondary {
                primary: PathBuf::from("00012345-1_emoreg.csv")
            }
        );
        assert_eq!(run.role(Path::new("ex12345/physio.txt")), Role::Independent);
    }

    #[test]
    fn test_compressed_files_join_their_family() {
        let run = run(&[
            "00012345-1_emoreg.csv.gz",
            "00012345-1_emoreg.psydat.bz2",
            "00012345-1_emoreg.log",
        ]);
        assert!(run.is_family_mode());
        assert_eq!(run.role(Path::new("00012345-1_emoreg.csv.gz")), Role::Primary);
        assert_eq!(
            run.role(Path::new("00012345-1_emoreg.psydat.bz2")),
            Role::Secondary {
                primary: PathBuf::from("00012345-1_emoreg.csv")
            }
        );
        assert!(run.publish(Path::new("00012345-1_emoreg.csv.gz"), Ok(metadata())));
    }

    #[tokio::test]
    async fn test_secondary_waits_for_compressed_primary() {
        let run = run(&["00012345-1_emoreg.csv.gz", "00012345-1_emoreg.psydat"]);
        run.publish(Path::new("00012345-1_emoreg.csv.gz"), Ok(metadata()));
        let Role::Secondary { primary } = run.role(Path::new("00012345-1_emoreg.psydat")) else {
            panic!("psydat should be a secondary");
        };
        let shared = run.await_primary(Path::new("00012345-1_emoreg.psydat"), &primary).await.unwrap();
        assert_eq!(shared, metadata());
    }

    #[test]
    fn test_primaries_sorted_first() {
        let mut files = vec![
            FileInfo::new("b.log", 1),
            FileInfo::new("physio.txt", 1),
            FileInfo::new("b.csv", 1),
            FileInfo::new("a.psydat", 1),
            FileInfo::new("a.csv", 1),
        ];
        let run = Run::new(files.iter().map(|file| file.path.as_path()));
        run.sort(&mut files);
        let order: Vec<_> = files.iter().map(|file| file.path.to_str().unwrap()).collect();
        assert_eq!(order, ["b.csv", "a.csv", "b.log", "physio.txt", "a.psydat"]);
    }

    #[test]
    fn test_publish_once() {
        let run = run(&FAMILY);
        let primary = Path::new("00012345-1_emoreg.csv");
        assert!(run.publish(primary, Ok(metadata())));
        assert!(!run.publish(primary, Err(ErrorKind::Extract(ExtractErrorKind::HeaderOnly))));
        assert!(!run.publish(Path::new("unknown.csv"), Ok(metadata())));
    }

    #[tokio::test]
    async fn test_missing_primary() {
        let run = run(&FAMILY);
        let err = run
            .await_primary(Path::new("00012345-2_other.log"), Path::new("00012345-2_other.csv"))
            .await
            .unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::MissingPrimary {
                secondary: PathBuf::from("00012345-2_other.log"),
                primary: PathBuf::from("00012345-2_other.csv"),
            }
        );
    }

    #[tokio::test]
    async fn test_secondaries_wait_for_primary() {
        let run = Arc::new(run(&FAMILY));
        let primary = Path::new("00012345-1_emoreg.csv");
        let waiting: Vec<_> = FAMILY[2..]
            .iter()
            .map(|secondary| {
                let run = Arc::clone(&run);
                let secondary = PathBuf::from(secondary);
                tokio::spawn(async move { run.await_primary(&secondary, primary).await.map_err(|err| (*err).clone()) })
            })
            .collect();
        tokio::task::yield_now().await;
        run.publish(primary, Ok(metadata()));
        for handle in waiting {
            assert_eq!(handle.await.unwrap().unwrap(), metadata());
        }
    }

    #[tokio::test]
    async fn test_primary_failure_is_shared() {
        let run = run(&FAMILY);
        let primary = Path::new("00012345-1_emoreg.csv");
        run.publish(primary, Err(ErrorKind::Extract(ExtractErrorKind::HeaderOnly)));
        let err = run.await_primary(Path::new("00012345-1_emoreg.log"), primary).await.unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::PrimaryFailed {
                primary: PathBuf::from("00012345-1_emoreg.csv"),
                cause: Box::new(ErrorKind::Extract(ExtractErrorKind::HeaderOnly)),
            }
        );
    }
}

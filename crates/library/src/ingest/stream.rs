use crate::Context;
use crate::coordinator::Run;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::ingest::error::{Error, ErrorKind};
use crate::ingest::file::ingest_file_inner;
use crate::record::FileRecord;
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use sift_storage::BackendHandle;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A file that could not be turned into a record.
#[derive(Debug)]
pub struct FileError {
    /// Relative path from the session folder root (empty if the listing
    /// couldn't say which file it was).
    pub path: PathBuf,
    pub error: Error,
}
impl FileError {
    pub fn kind(&self) -> &ErrorKind {
        &self.error
    }
}
impl Display for FileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.path.display(), self.kind())
    }
}

/// The result of processing one file.
pub type Outcome = Result<FileRecord, FileError>;

/// How far through the batch we are. `done` only ever goes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: u64,
    pub total: u64,
}
impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.done, self.total)
    }
}

/// Progress events emitted by [`ingest`] as it works through a folder.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    total file count.
/// 3. [`Processed`](Self::Processed): once per file, successful or not.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// If the folder can't be read at all the stream yields a single error after
/// [`Started`](Self::Started) and ends.
#[derive(Debug)]
pub enum IngestEvent {
    Started,
    /// The folder has been listed; the total count is now known.
    DiscoveryComplete(u64),
    Processed { outcome: Outcome, progress: Progress },
    Complete,
}

/// Streams [`IngestEvent`]s for every file under `prefix` in `backend`.
///
/// The folder is listed in full first, so that participant table families
/// can be [coordinated](crate::coordinator) before anything is dispatched.
/// Entries the listing fails on are reported straight away as failed files.
/// Files are then processed concurrently, up to `ctx.concurrency` at a time,
/// with more promoted as in-flight ones complete.
///
/// Dropping the stream abandons the batch: files still in flight are
/// cancelled and nothing they would have produced is observed.
pub fn ingest<'a>(
    backend: &'a BackendHandle,
    ctx: &'a Context,
    prefix: Option<&'a Path>,
) -> impl Stream<Item = LibraryResult<IngestEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(IngestEvent::Started);

        if let Err(err) = backend.verify().await.or_raise(|| LibraryErrorKind::RootUnavailable) {
            yield Err(err);
            return;
        }

        let mut files = Vec::new();
        let mut failures = Vec::new();
        let mut listing = backend.list_stream(prefix);
        while let Some(result) = listing.next().await {
            match result {
                Ok(file) => files.push(file),
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    failures.push(FileError { path, error: ErrorKind::listing(err) });
                },
            }
        }
        drop(listing);

        let run = Run::new(files.iter().map(|file| file.path.as_path()));
        run.sort(&mut files);
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        let total = u64::try_from(files.len() + failures.len()).unwrap_or(0);
        tracing::info!(backend = backend.name(), total, families = run.is_family_mode(), "discovered files");
        yield Ok(IngestEvent::DiscoveryComplete(total));

        let mut done = 0;
        for failure in failures {
            done += 1;
            yield Ok(IngestEvent::Processed { outcome: Err(failure), progress: Progress { done, total } });
        }

        let run = &run;
        let mut pending = files.into_iter().map(|file| async move {
            let path = file.path.clone();
            ingest_file_inner(backend, ctx, run, file).await.map_err(|error| FileError { path, error })
        });
        let mut processing = FuturesUnordered::new();
        processing.extend(pending.by_ref().take(ctx.concurrency.max(1)));
        while let Some(outcome) = processing.next().await {
            done += 1;
            if let Err(failure) = &outcome {
                tracing::debug!(path = %failure.path.display(), error = %failure.kind(), "file failed");
            }
            yield Ok(IngestEvent::Processed { outcome, progress: Progress { done, total } });
            // FIFO, so primaries (sorted to the front) are always in flight
            // before the secondaries waiting on them.
            if let Some(next) = pending.next() {
                processing.push(next);
            }
        }

        yield Ok(IngestEvent::Complete);
    })
}

/// Everything a batch produced.
#[derive(Debug)]
pub struct BatchReport {
    pub records: Vec<FileRecord>,
    pub errors: Vec<FileError>,
    pub elapsed: Duration,
}
impl BatchReport {
    /// Total number of files, successful or not.
    pub fn total(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    /// Human-readable summary lines.
    pub fn summary(&self) -> Vec<String> {
        let seconds = self.elapsed.as_millis() as f64 / 1000.0;
        let mut lines = vec![format!("Processed {} files in {seconds} seconds", self.total())];
        if !self.errors.is_empty() {
            lines.push(format!("There have been {} errors out of {} files", self.errors.len(), self.total()));
        }
        lines
    }

    /// Errors worth showing to somebody, leaving out the
    /// [skippable](ErrorKind::is_skippable) ones.
    pub fn reportable_errors(&self) -> impl Iterator<Item = &FileError> {
        self.errors.iter().filter(|error| !error.kind().is_skippable())
    }
}

/// Runs [`ingest`] to completion, calling `on_progress` after every file.
///
/// # Errors
/// Fails only if the batch couldn't start; per-file failures end up in
/// [`BatchReport::errors`].
pub async fn run_batch(
    backend: &BackendHandle,
    ctx: &Context,
    prefix: Option<&Path>,
    mut on_progress: impl FnMut(Progress, &Outcome),
) -> LibraryResult<BatchReport> {
    let started = Instant::now();
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut events = std::pin::pin!(ingest(backend, ctx, prefix));
    while let Some(event) = events.next().await {
        if let IngestEvent::Processed { outcome, progress } = event? {
            on_progress(progress, &outcome);
            match outcome {
                Ok(record) => records.push(record),
                Err(error) => errors.push(error),
            }
        }
    }
    Ok(BatchReport {
        records,
        errors,
        elapsed: started.elapsed(),
    })
}

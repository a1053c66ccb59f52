//! Turning a session folder into upload records.
//!
//! [`ingest_file`] runs one file through the pipeline:
//!
//! 1. read the bytes and hash them (`v0-sha384-<hex>`),
//! 2. decompress if the extension says so,
//! 3. classify the content and extract subject and timestamp (or, for
//!    secondaries, wait for the family's primary to do so),
//! 4. match a session and derive the acquisition header (imaging files carry
//!    their own header),
//! 5. check the hash against what the archive already has.
//!
//! [`ingest`] does this for a whole folder, streaming [`IngestEvent`]s, and
//! [`run_batch`] collects that stream into a [`BatchReport`].

pub mod error;
mod file;
mod stream;

pub use self::file::{content_hash, ingest_file};
pub use self::stream::{BatchReport, FileError, IngestEvent, Outcome, Progress, ingest, run_batch};

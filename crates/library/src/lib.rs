//! Batch ingestion of a research-session folder.
//!
//! Every file in the folder is hashed, identified, matched to one of the
//! archive's imaging sessions and given the acquisition header it should be
//! uploaded with. See [`ingest`] for the per-file pipeline and the batch
//! stream, and [`coordinator`] for how participant table families share one
//! parse.

mod context;
pub mod coordinator;
pub mod error;
mod header;
pub mod ingest;
mod record;

pub use crate::context::{Context, DEFAULT_CONCURRENCY};
pub use crate::header::{HeaderParser, NoHeaders};
pub use crate::record::FileRecord;

//! Imaging header parsing.
//!
//! Imaging files are binary and their header format is somebody else's
//! problem: the pipeline only needs the handful of acquisition tags that
//! [`AcquisitionMetadata::from_tags`](sift_catalog::models::AcquisitionMetadata::from_tags)
//! picks out.

use std::collections::HashMap;

/// Turns the bytes of an imaging file into a map of header tag name to value
/// (`"SeriesInstanceUID" => "1.2.840..."`).
pub trait HeaderParser: Send + Sync {
    /// Parse the (decompressed) file. The error is a human-readable reason.
    fn parse(&self, bytes: &[u8]) -> Result<HashMap<String, String>, String>;
}

/// Parser used when none has been configured: every imaging file has an
/// empty header, so its record only carries the content hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeaders;

impl HeaderParser for NoHeaders {
    fn parse(&self, _bytes: &[u8]) -> Result<HashMap<String, String>, String> {
        Ok(HashMap::new())
    }
}

impl<F> HeaderParser for F
where
    F: Fn(&[u8]) -> Result<HashMap<String, String>, String> + Send + Sync,
{
    fn parse(&self, bytes: &[u8]) -> Result<HashMap<String, String>, String> {
        self(bytes)
    }
}

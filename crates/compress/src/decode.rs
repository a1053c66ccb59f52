use crate::Compression;
use crate::error::{ErrorKind, Result};
use bzip2::read::BzDecoder;
use exn::ResultExt;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::instrument;

impl Compression {
    /// Decompress a whole file in memory. Uncompressed input is copied as is.
    #[instrument(skip(input), fields(format = ?self, input_size = input.len(), output_size))]
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        match self {
            Compression::None => output.extend_from_slice(input),
            Compression::Bzip2 => {
                BzDecoder::new(input).read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
            },
            Compression::Gzip => {
                GzDecoder::new(input).read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
            },
        }
        tracing::Span::current().record("output_size", output.len());
        Ok(output)
    }
}

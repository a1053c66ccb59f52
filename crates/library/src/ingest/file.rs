use crate::Context;
use crate::coordinator::{Role, Run};
use crate::ingest::error::{ErrorKind, Result};
use crate::record::FileRecord;
use sha2::{Digest, Sha384};
use sift_catalog::models::AcquisitionMetadata;
use sift_compress::Compression;
use sift_extract::error::ErrorKind as ExtractErrorKind;
use sift_extract::{ExtractedMetadata, Format, Preview};
use sift_storage::{BackendHandle, FileInfo};
use tracing::instrument;

const HASH_PREFIX: &str = "v0-sha384-";

/// Hash of a file's bytes, as the archive records it.
///
/// # Examples
///
/// ```
/// use sift_library::ingest::content_hash;
///
/// assert!(content_hash(b"").starts_with("v0-sha384-38b060a751ac9638"));
/// ```
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{HASH_PREFIX}{:x}", Sha384::digest(bytes))
}

/// The file as read from storage.
struct Loaded {
    hash: String,
    content: Vec<u8>,
}

/// What the file turned out to be.
enum Identity {
    /// A text format, still to be matched to a session.
    Text(ExtractedMetadata),
    /// An imaging file, with the header it already carries.
    Imaging(AcquisitionMetadata),
}

/// Runs a single file through the pipeline on its own.
///
/// Participant table families are only resolved within a batch; here every
/// file is [independent](Role::Independent).
pub async fn ingest_file(backend: &BackendHandle, ctx: &Context, file: FileInfo) -> Result<FileRecord> {
    ingest_file_inner(backend, ctx, &Run::default(), file).await
}

#[instrument(skip_all, fields(path = %file.path.display()))]
pub(crate) async fn ingest_file_inner(
    backend: &BackendHandle,
    ctx: &Context,
    run: &Run,
    file: FileInfo,
) -> Result<FileRecord> {
    let (loaded, identity) = match run.role(&file.path) {
        Role::Independent => identify(backend, ctx, &file).await?,
        Role::Primary => {
            let identified = identify(backend, ctx, &file).await;
            let outcome = match &identified {
                Ok((_, Identity::Text(metadata))) => Ok(metadata.clone()),
                // Nothing for the secondaries to reuse.
                Ok((_, Identity::Imaging(_))) => Err(ErrorKind::Extract(ExtractErrorKind::UnrecognizedFormat)),
                Err(err) => Err((**err).clone()),
            };
            run.publish(&file.path, outcome);
            identified?
        },
        Role::Secondary { primary } => {
            let loaded = load(backend, &file).await?;
            let metadata = run.await_primary(&file.path, &primary).await?;
            (loaded, Identity::Text(metadata))
        },
    };

    let (format, header) = match identity {
        Identity::Imaging(header) => (Format::Imaging, header),
        Identity::Text(metadata) => {
            let session = ctx.matcher().find(&metadata.subject, metadata.timestamp).map_err(ErrorKind::catalog)?;
            let header = AcquisitionMetadata::derive(session, metadata.timestamp).map_err(ErrorKind::catalog)?;
            (metadata.format, header)
        },
    };
    let upload_status = ctx.snapshot.uploads.status(&loaded.hash, &header);
    tracing::debug!(%format, status = %upload_status, "processed file");
    Ok(FileRecord {
        content_ext: file.content_ext(),
        path: file.path,
        content_hash: loaded.hash,
        size: loaded.content.len() as u64,
        format,
        header,
        upload_status,
    })
}

async fn load(backend: &BackendHandle, file: &FileInfo) -> Result<Loaded> {
    let bytes = backend.read(&file.path).await.map_err(ErrorKind::storage)?;
    let hash = content_hash(&bytes);
    let content = match file.compression {
        Compression::None => bytes,
        compression => compression.decompress(&bytes).map_err(ErrorKind::decompression)?,
    };
    Ok(Loaded { hash, content })
}

async fn identify(backend: &BackendHandle, ctx: &Context, file: &FileInfo) -> Result<(Loaded, Identity)> {
    let loaded = load(backend, file).await?;
    let preview = Preview::new(&loaded.content);
    let identity = match sift_extract::classify_preview(&preview).map_err(ErrorKind::extract)? {
        Format::Imaging => {
            let tags = ctx.header_parser.parse(&loaded.content).map_err(ErrorKind::Header)?;
            Identity::Imaging(AcquisitionMetadata::from_tags(&tags))
        },
        _ => {
            let metadata =
                sift_extract::extract_preview(&preview, &file.content_path(), &ctx.zone).map_err(ErrorKind::extract)?;
            Identity::Text(metadata)
        },
    };
    Ok((loaded, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_catalog::models::Acquisition;
    use sift_catalog::source::StaticSource;
    use sift_catalog::{Snapshot, UploadStatus};
    use sift_compress::error::ErrorKind as CompressionErrorKind;
    use sift_storage::backend::MockBackend;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Arc;

    type Parsed = std::result::Result<HashMap<String, String>, String>;

    const PHYSIO: &[u8] = b"% Start time: 2015-01-02 12:03:04.567890\n0.1\t0.2\n";

    async fn context(listing: &str) -> Context {
        let source = StaticSource::from_json(listing).unwrap();
        Context::new(Snapshot::fetch(&source).await.unwrap())
    }

    fn catalog(hashes: &[String]) -> String {
        let files: Vec<_> = hashes.iter().map(|hash| format!(r#"{{"hash": "{hash}"}}"#)).collect();
        format!(
            r#"{{"acquisitions": [{{"_source": {{
                "uid": "behavioral_and_physiological:1.2.3", "label": "Behavioral and Physiological",
                "session": {{"uid": "1.2.3", "timestamp": "2015-01-02T17:00:00Z", "subject": {{"code": "ex12345"}}}},
                "files": [{}]
            }}}}]}}"#,
            files.join(",")
        )
    }

    fn backend(files: Vec<(&str, Vec<u8>)>) -> BackendHandle {
        Arc::new(MockBackend::with_files(files))
    }

    #[test]
    fn test_content_hash() {
        let hash = content_hash(b"abc");
        assert_eq!(hash.len(), HASH_PREFIX.len() + 96);
        assert!(hash.starts_with("v0-sha384-cb00753f45a35e8b"));
    }

    #[tokio::test]
    async fn test_physio_needs_upload() {
        let ctx = context(&catalog(&[])).await;
        let backend = backend(vec![("ex12345/physio.txt", PHYSIO.to_vec())]);
        let record = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt", PHYSIO.len() as u64))
            .await
            .unwrap();
        assert_eq!(record.format, Format::Physiological);
        assert_eq!(record.content_ext, ".txt");
        assert_eq!(record.size, PHYSIO.len() as u64);
        assert_eq!(record.header.series_instance_uid, "behavioral_and_physiological:1.2.3");
        assert_eq!(record.header.acquisition_time, "120304");
        assert_eq!(record.upload_status, UploadStatus::NeedsUpload);
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn test_compressed_file_is_hashed_before_decompression() {
        let compressed = gzip(PHYSIO);
        let ctx = context(&catalog(&[content_hash(&compressed)])).await;
        let backend = backend(vec![("ex12345/physio.txt.gz", compressed.clone())]);
        let record = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt.gz", compressed.len() as u64))
            .await
            .unwrap();
        assert_eq!(record.content_hash, content_hash(&compressed));
        assert_eq!(record.content_ext, ".txt");
        assert_eq!(record.size, PHYSIO.len() as u64);
        assert_eq!(record.upload_status, UploadStatus::PreviouslyUploaded);
    }

    #[tokio::test]
    async fn test_corrupt_compressed_file() {
        let ctx = context(&catalog(&[])).await;
        let backend = backend(vec![("ex12345/physio.txt.gz", PHYSIO.to_vec())]);
        let err = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt.gz", PHYSIO.len() as u64))
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Decompression(CompressionErrorKind::InvalidData));
    }

    #[tokio::test]
    async fn test_same_content_elsewhere_is_a_mismatch() {
        // The same bytes were uploaded to an acquisition other than the one
        // this file resolves to.
        let mut ctx = context(&catalog(&[])).await;
        let backend = backend(vec![("ex12345/physio.txt", PHYSIO.to_vec())]);
        ctx.snapshot = Snapshot::from_acquisitions(&[Acquisition {
            uid: Some("somewhere-else".to_string()),
            label: Some("Behavioral and Physiological".to_string()),
            session: ctx.snapshot.sessions.sessions(&"12345".parse().unwrap())[0].clone(),
            file_hashes: vec![content_hash(PHYSIO)],
        }]);
        let record = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt", 1)).await.unwrap();
        assert_eq!(record.upload_status, UploadStatus::Mismatch);
    }

    #[tokio::test]
    async fn test_imaging_uses_header_parser() {
        let header: HashMap<String, String> = [
            ("SeriesInstanceUID", "1.2.840.1"),
            ("SeriesDescription", "T1"),
            ("StudyInstanceUID", "1.2.3"),
        ]
        .into_iter()
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .collect();
        let parser = move |_: &[u8]| -> Parsed { Ok(header.clone()) };
        let ctx = context(&catalog(&[])).await.with_header_parser(parser);
        let backend = backend(vec![("dicom/IM0001", b"\x00\x00DICM\x01".to_vec())]);
        let record = ingest_file(&backend, &ctx, FileInfo::new("dicom/IM0001", 6)).await.unwrap();
        assert_eq!(record.format, Format::Imaging);
        assert_eq!(record.content_ext, "");
        assert_eq!(record.header.series_instance_uid, "1.2.840.1");
        assert_eq!(record.upload_status, UploadStatus::NeedsUpload);
    }

    #[tokio::test]
    async fn test_header_parser_failure() {
        let parser = |_: &[u8]| -> Parsed { Err("not DICOM".to_string()) };
        let ctx = context(&catalog(&[])).await.with_header_parser(parser);
        let backend = backend(vec![("IM0001", b"\x00\x01".to_vec())]);
        let err = ingest_file(&backend, &ctx, FileInfo::new("IM0001", 2)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Header("not DICOM".to_string()));
    }

    #[tokio::test]
    async fn test_unmatched_subject() {
        let ctx = context(&catalog(&[])).await;
        let backend = backend(vec![("ex54321/physio.txt", PHYSIO.to_vec())]);
        let err = ingest_file(&backend, &ctx, FileInfo::new("ex54321/physio.txt", 1)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Catalog(_)));
        assert!((*err).to_string().starts_with("subject 54321 has no sessions (none on 2015-01-02)"));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let ctx = context(&catalog(&[])).await;
        let backend = backend(vec![("ex12345/physio.txt", Vec::new())]);
        let err = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt", 0)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Extract(ExtractErrorKind::EmptyFile));
    }

    #[tokio::test]
    async fn test_unreadable_file() {
        let ctx = context(&catalog(&[])).await;
        let mock = MockBackend::with_files([("ex12345/physio.txt", PHYSIO.to_vec())]).with_unreadable("ex12345/physio.txt");
        let backend: BackendHandle = Arc::new(mock);
        let err = ingest_file(&backend, &ctx, FileInfo::new("ex12345/physio.txt", 1)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
    }
}

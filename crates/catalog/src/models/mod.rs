mod acquisition;
mod metadata;
mod session;
mod wire;

pub use self::acquisition::Acquisition;
pub use self::metadata::{AcquisitionMetadata, SERIES_DESCRIPTION, SERIES_UID_PREFIX};
pub use self::session::Session;
pub(crate) use self::wire::SearchResponse;

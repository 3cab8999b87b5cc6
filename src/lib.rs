pub mod header;
pub mod records;
pub mod text;
pub mod document;
pub mod classify;
pub mod rebuild;
pub mod batch;

pub use header::{Header, HEADER_SIZE, MAGIC};
pub use records::{InstanceRecord, VehicleSpawnRecord};
pub use document::{FormatError, IplFile};
pub use classify::{classify, classify_with, Classification, RESERVED_FIELDS};
pub use text::TextParseError;
pub use rebuild::{rebuild_from_text, rebuild_preserving_original, write_atomic, RebuildError};
pub use batch::{BatchEvent, BatchSummary, CancelToken};

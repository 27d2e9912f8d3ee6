// Data Models
pub mod archive_entry;
pub mod operation;
pub mod snapshot;

pub use archive_entry::ArchiveEntry;
pub use operation::{ActionKind, AddOptions, ArchiveSummary, CompressionLevel, ExtractOptions};
pub use snapshot::{EntryHandle, NodeHandle, Snapshot};

// System Layer
pub mod archive;
pub mod engine;
pub mod local_engine;

pub use archive::{detect_archive_format, ArchiveFormat};
pub use engine::{ActionOutput, ArchiveEngine, EngineEvent};
pub use local_engine::LocalEngine;

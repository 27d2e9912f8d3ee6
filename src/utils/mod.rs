// Utilities
pub mod error;
pub mod formatter;
pub mod mime;
pub mod path_display;

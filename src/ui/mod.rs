// UI Layer
pub mod components;
pub mod layout;
pub mod theme;

// Re-export layout types for convenience
pub use layout::{LayoutAreas, LayoutManager, LayoutMode, MIN_HEIGHT, MIN_WIDTH};
pub use theme::Theme;

// Re-export components
pub use components::{
    CommandBar, CommandItem, ConfirmPurpose, Dialog, DialogKind, DirTree, FileList,
    InputPurpose, PasswordPurpose, StatusBar, WarningScreen,
};

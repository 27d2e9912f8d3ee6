// UI Components
pub mod command_bar;
pub mod dialog;
pub mod dir_tree;
pub mod file_list;
pub mod status_bar;
pub mod text_input;
pub mod warning;

// Re-export components for convenience
pub use command_bar::{CommandBar, CommandItem};
pub use dialog::{ConfirmPurpose, Dialog, DialogKind, InputPurpose, PasswordPurpose};
pub use dir_tree::DirTree;
pub use file_list::FileList;
pub use status_bar::StatusBar;
pub use text_input::TextInput;
pub use warning::WarningScreen;

// Core Layer - 스냅샷 투영, 탐색, 작업 디스패치, 키 액션
pub mod actions;
pub mod dispatcher;
pub mod navigation;
pub mod projection;

pub use actions::{find_action, Action};
pub use dispatcher::{Command, DispatchContext, Dispatcher, FollowUp};
pub use navigation::{Navigator, Reconciliation, ViewMode};
pub use projection::{list_directory, list_flat, ListingRow, RowView};

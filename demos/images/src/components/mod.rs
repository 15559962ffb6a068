pub mod action_log_bar;
pub mod header;
pub mod images_list;

// Re-export core Component trait
pub use flux_dispatch::Component;

pub use action_log_bar::ActionLogBar;
pub use header::{Header, APP_TITLE};
pub use images_list::{ImagesList, ImagesListProps, ListCommand, EMPTY_PLACEHOLDER};

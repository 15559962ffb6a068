//! MRW.lol image list client built on flux-dispatch
//!
//! Data flows one way:
//! 1. the view mounts and calls [`ImageActions::load_images`]
//! 2. `ImagesLoad` is dispatched, then the fetch runs as a task
//! 3. the runtime dispatches `ImagesDidLoad` or `ImagesDidFail`
//! 4. [`ImagesListStore`] replaces its list and notifies listeners
//! 5. the view re-reads the store and redraws

pub mod action;
pub mod actions;
pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod context;
pub mod image;
pub mod store;

pub use action::ImageAction;
pub use actions::ImageActions;
pub use api::{FetchError, HttpImageSource, ImageSource, IMAGES_PATH};
pub use app::App;
pub use context::AppContext;
pub use image::Image;
pub use store::{ImagesListStore, ImagesState};

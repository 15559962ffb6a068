//! Image actions
//!
//! Names follow the `Subject` + `Verb` convention so the derive puts the
//! intent and both results in the `images` category.

use flux_dispatch::ActionSummary;

use crate::api::FetchError;
use crate::image::Image;

/// Everything that can flow through the image dispatcher
#[derive(flux_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum ImageAction {
    /// Intent: the image list fetch started
    ImagesLoad,

    /// Result: the server returned the image list
    ImagesDidLoad(Vec<Image>),

    /// Result: the fetch failed
    ImagesDidFail(FetchError),
}

/// Keep log lines short: image lists can be long
impl ActionSummary for ImageAction {
    fn summary(&self) -> String {
        match self {
            ImageAction::ImagesDidLoad(images) => {
                format!("ImagesDidLoad({} images)", images.len())
            }
            ImageAction::ImagesDidFail(e) => format!("ImagesDidFail({})", e),
            _ => format!("{:?}", self),
        }
    }
}

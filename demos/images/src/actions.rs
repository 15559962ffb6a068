//! Action creators for images

use std::sync::Arc;

use flux_dispatch::{ActionContext, DispatchError, TaskKey};

use crate::action::ImageAction;
use crate::api::ImageSource;

/// Turns "load the images" into actions
///
/// Each call stands alone: overlapping loads are neither merged nor
/// cancelled, and their results are dispatched in completion order.
pub struct ImageActions<S> {
    ctx: ActionContext<ImageAction>,
    source: Arc<S>,
}

impl<S> Clone for ImageActions<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            source: self.source.clone(),
        }
    }
}

impl<S: ImageSource> ImageActions<S> {
    pub fn new(ctx: ActionContext<ImageAction>, source: S) -> Self {
        Self::with_shared_source(ctx, Arc::new(source))
    }

    pub fn with_shared_source(ctx: ActionContext<ImageAction>, source: Arc<S>) -> Self {
        Self { ctx, source }
    }

    /// Dispatch `ImagesLoad`, then fetch in the background
    ///
    /// `ImagesLoad` has been delivered to every store by the time this
    /// returns. The fetch outcome arrives later as `ImagesDidLoad` or
    /// `ImagesDidFail`. Fails without starting a fetch if called from
    /// inside a dispatch.
    pub fn load_images(&self) -> Result<TaskKey, DispatchError> {
        self.ctx.dispatch(ImageAction::ImagesLoad)?;

        let source = self.source.clone();
        let key = self.ctx.spawn_anonymous("images", async move {
            match source.fetch_images().await {
                Ok(images) => {
                    tracing::debug!(count = images.len(), "Images fetched");
                    ImageAction::ImagesDidLoad(images)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Image fetch failed");
                    ImageAction::ImagesDidFail(e)
                }
            }
        });
        Ok(key)
    }
}

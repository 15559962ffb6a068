//! Image loading end to end: action creator, store and view over a stub source

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use flux_dispatch::testing::TestHarness;
use flux_dispatch::{
    assert_dispatched, assert_not_dispatched, count_dispatched, DispatchError, Subscription,
};

use mrw_images::{AppContext, FetchError, Image, ImageAction, ImageSource};

#[derive(Clone)]
struct StubSource {
    result: Result<Vec<Image>, FetchError>,
    delay: Duration,
}

impl StubSource {
    fn ok(images: Vec<Image>) -> Self {
        Self {
            result: Ok(images),
            delay: Duration::ZERO,
        }
    }

    fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl ImageSource for StubSource {
    fn fetch_images(&self) -> impl Future<Output = Result<Vec<Image>, FetchError>> + Send {
        let result = self.result.clone();
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

/// Always answers with two images
struct TwoImagesSource;

impl ImageSource for TwoImagesSource {
    fn fetch_images(&self) -> impl Future<Output = Result<Vec<Image>, FetchError>> + Send {
        async { Ok(vec![Image::new("first"), Image::new("second")]) }
    }
}

fn change_counter(ctx: &AppContext<impl ImageSource>) -> (Rc<Cell<usize>>, Subscription) {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let sub = ctx.images.subscribe(move || seen.set(seen.get() + 1));
    (count, sub)
}

#[tokio::test]
async fn test_load_dispatches_intent_then_result() {
    let mut harness = TestHarness::<ImageAction>::new();
    let ctx = AppContext::new(harness.runtime(), StubSource::ok(vec![Image::new("abc")]));
    let (changes, _sub) = change_counter(&ctx);

    ctx.actions.load_images().unwrap();

    // The intent is delivered before anything is awaited
    assert_eq!(harness.dispatched(), vec![ImageAction::ImagesLoad]);
    assert!(ctx.images.get_images().is_empty());
    assert_eq!(changes.get(), 0);

    harness.settle().await;

    assert_eq!(
        harness.dispatched(),
        vec![
            ImageAction::ImagesLoad,
            ImageAction::ImagesDidLoad(vec![Image::new("abc")]),
        ]
    );
    assert_eq!(&*ctx.images.get_images(), &[Image::new("abc")]);
    assert_eq!(changes.get(), 1);
}

#[tokio::test]
async fn test_failed_load_leaves_store_alone() {
    let mut harness = TestHarness::<ImageAction>::new();
    let ctx = AppContext::new(harness.runtime(), StubSource::failing(FetchError::Status(500)));
    let (changes, _sub) = change_counter(&ctx);

    ctx.actions.load_images().unwrap();
    harness.settle().await;

    let dispatched = harness.dispatched();
    assert_eq!(
        dispatched,
        vec![
            ImageAction::ImagesLoad,
            ImageAction::ImagesDidFail(FetchError::Status(500)),
        ]
    );
    assert_not_dispatched!(dispatched, ImageAction::ImagesDidLoad(_));
    assert!(ctx.images.get_images().is_empty());
    assert_eq!(changes.get(), 0);
}

#[tokio::test]
async fn test_failure_keeps_previous_images() {
    let mut harness = TestHarness::<ImageAction>::new();
    let ctx = AppContext::new(harness.runtime(), TwoImagesSource);

    ctx.actions.load_images().unwrap();
    harness.settle().await;
    assert_eq!(ctx.images.get_images().len(), 2);

    harness
        .dispatcher()
        .dispatch(ImageAction::ImagesDidFail(FetchError::Transport("reset".into())))
        .unwrap();
    assert_eq!(ctx.images.get_images().len(), 2);
}

#[tokio::test]
async fn test_overlapping_loads_are_not_merged() {
    let mut harness = TestHarness::<ImageAction>::new();
    let ctx = AppContext::new(
        harness.runtime(),
        StubSource::ok(vec![Image::new("abc")]).delayed(Duration::from_millis(20)),
    );
    let (changes, _sub) = change_counter(&ctx);

    let first = ctx.actions.load_images().unwrap();
    let second = ctx.actions.load_images().unwrap();
    assert_ne!(first, second);

    harness.settle().await;

    let dispatched = harness.dispatched();
    assert_eq!(count_dispatched!(dispatched, ImageAction::ImagesLoad), 2);
    assert_eq!(count_dispatched!(dispatched, ImageAction::ImagesDidLoad(_)), 2);
    assert_eq!(changes.get(), 2);
}

#[tokio::test]
async fn test_load_from_inside_dispatch_is_rejected() {
    let mut harness = TestHarness::<ImageAction>::new();
    let ctx = AppContext::new(harness.runtime(), StubSource::ok(Vec::new()));

    let actions = ctx.actions.clone();
    let nested = Rc::new(Cell::new(None));
    let result = nested.clone();
    let _sub = ctx
        .images
        .subscribe(move || result.set(Some(actions.load_images().map(|_| ()))));

    harness
        .dispatcher()
        .dispatch(ImageAction::ImagesDidLoad(vec![Image::new("x")]))
        .unwrap();

    assert!(matches!(
        nested.take(),
        Some(Err(DispatchError::Reentrant { .. }))
    ));
    assert_not_dispatched!(harness.dispatched(), ImageAction::ImagesLoad);
    assert!(harness.runtime().is_idle());
}

mod view {
    use super::*;
    use mrw_images::components::ImagesList;

    #[tokio::test]
    async fn test_mount_subscribes_and_loads() {
        let mut harness = TestHarness::<ImageAction>::new();
        let ctx = AppContext::new(harness.runtime(), StubSource::ok(vec![Image::new("abc")]));
        let mut list = ImagesList::new();

        list.mount(&ctx).unwrap();
        assert!(list.is_mounted());
        assert_eq!(ctx.images.listener_count(), 1);
        assert_dispatched!(harness.dispatched(), ImageAction::ImagesLoad);
        assert!(list.images().is_empty());

        harness.settle().await;

        assert_eq!(&*list.images(), &[Image::new("abc")]);
        assert_eq!(list.refresh_count(), 1);
        assert!(list.take_dirty());
    }

    #[tokio::test]
    async fn test_mount_twice_is_noop() {
        let mut harness = TestHarness::<ImageAction>::new();
        let ctx = AppContext::new(harness.runtime(), StubSource::ok(Vec::new()));
        let mut list = ImagesList::new();

        list.mount(&ctx).unwrap();
        list.mount(&ctx).unwrap();
        harness.settle().await;

        assert_eq!(ctx.images.listener_count(), 1);
        assert_eq!(
            count_dispatched!(harness.dispatched(), ImageAction::ImagesLoad),
            1
        );
    }

    #[tokio::test]
    async fn test_mount_reads_existing_images() {
        let mut harness = TestHarness::<ImageAction>::new();
        let ctx = AppContext::new(harness.runtime(), StubSource::failing(FetchError::Status(503)));
        harness
            .dispatcher()
            .dispatch(ImageAction::ImagesDidLoad(vec![Image::new("cached")]))
            .unwrap();

        let mut list = ImagesList::new();
        list.mount(&ctx).unwrap();
        assert_eq!(&*list.images(), &[Image::new("cached")]);

        harness.settle().await;
        assert_eq!(&*list.images(), &[Image::new("cached")]);
        assert_eq!(list.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_unmount_stops_refreshes() {
        let mut harness = TestHarness::<ImageAction>::new();
        let ctx = AppContext::new(
            harness.runtime(),
            StubSource::ok(vec![Image::new("late")]).delayed(Duration::from_millis(10)),
        );
        let mut list = ImagesList::new();

        list.mount(&ctx).unwrap();
        list.unmount();
        assert!(!list.is_mounted());
        assert_eq!(ctx.images.listener_count(), 0);

        // The store still takes the late result
        harness.settle().await;
        assert_eq!(&*ctx.images.get_images(), &[Image::new("late")]);
        assert!(list.images().is_empty());
        assert_eq!(list.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_mounted_view_unsubscribes() {
        let mut harness = TestHarness::<ImageAction>::new();
        let ctx = AppContext::new(harness.runtime(), StubSource::ok(Vec::new()));

        let mut list = ImagesList::new();
        list.mount(&ctx).unwrap();
        assert_eq!(ctx.images.listener_count(), 1);

        drop(list);
        assert_eq!(ctx.images.listener_count(), 0);
        harness.settle().await;
    }
}

//! The images list store

use std::rc::{Rc, Weak};

use flux_dispatch::{DispatchToken, Dispatcher, ListenerId, ReduceStore, Subscription};

use crate::action::ImageAction;
use crate::image::Image;

/// State slice owned by [`ImagesListStore`]
#[derive(Debug, Clone)]
pub struct ImagesState {
    /// Replaced wholesale, never edited in place
    pub images: Rc<[Image]>,
}

impl Default for ImagesState {
    fn default() -> Self {
        Self {
            images: Rc::from(Vec::new()),
        }
    }
}

/// Only a successful load touches the list. The intent and the failure
/// leave it as it was and notify nobody.
pub fn reducer(state: &mut ImagesState, action: &ImageAction) -> bool {
    match action {
        ImageAction::ImagesDidLoad(images) => {
            state.images = Rc::from(images.as_slice());
            true
        }
        ImageAction::ImagesLoad | ImageAction::ImagesDidFail(_) => false,
    }
}

/// Holds the list of images last returned by the server
///
/// Cheap to clone; all clones share one store and one dispatcher
/// registration.
#[derive(Debug, Clone)]
pub struct ImagesListStore {
    inner: Rc<ReduceStore<ImagesState, ImageAction>>,
}

impl ImagesListStore {
    /// Create the store and register it with `dispatcher`
    pub fn new(dispatcher: &Rc<Dispatcher<ImageAction>>) -> Self {
        Self {
            inner: ReduceStore::register(dispatcher, ImagesState::default(), reducer),
        }
    }

    /// The current image list, as a shared snapshot
    pub fn get_images(&self) -> Rc<[Image]> {
        self.inner.select(|state| state.images.clone())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut() + 'static,
    {
        self.inner.subscribe(listener)
    }

    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        self.inner.add_change_listener(listener)
    }

    /// Unknown ids are ignored
    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.inner.remove_change_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }

    pub fn dispatch_token(&self) -> DispatchToken {
        self.inner.dispatch_token()
    }

    /// A handle that does not keep the store alive
    ///
    /// Listeners registered on the store should capture this instead of
    /// a clone.
    pub fn downgrade(&self) -> WeakImagesListStore {
        WeakImagesListStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeakImagesListStore {
    inner: Weak<ReduceStore<ImagesState, ImageAction>>,
}

impl WeakImagesListStore {
    pub fn upgrade(&self) -> Option<ImagesListStore> {
        self.inner.upgrade().map(|inner| ImagesListStore { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use std::cell::Cell;

    fn setup() -> (Rc<Dispatcher<ImageAction>>, ImagesListStore) {
        let dispatcher = Rc::new(Dispatcher::new());
        let store = ImagesListStore::new(&dispatcher);
        (dispatcher, store)
    }

    fn counter(store: &ImagesListStore) -> (Rc<Cell<usize>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        (count, store.subscribe(move || seen.set(seen.get() + 1)))
    }

    #[test]
    fn test_starts_empty() {
        let (_dispatcher, store) = setup();
        assert!(store.get_images().is_empty());
    }

    #[test]
    fn test_did_load_replaces_list_and_notifies_once() {
        let (dispatcher, store) = setup();
        let (first, _a) = counter(&store);
        let (second, _b) = counter(&store);

        let images = vec![Image::new("1"), Image::new("2")];
        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(images.clone()))
            .unwrap();

        assert_eq!(&*store.get_images(), images.as_slice());
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);

        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(vec![Image::new("3")]))
            .unwrap();
        assert_eq!(&*store.get_images(), &[Image::new("3")]);
    }

    #[test]
    fn test_load_and_fail_leave_list_alone() {
        let (dispatcher, store) = setup();
        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(vec![Image::new("keep")]))
            .unwrap();
        let (count, _sub) = counter(&store);

        dispatcher.dispatch(ImageAction::ImagesLoad).unwrap();
        dispatcher
            .dispatch(ImageAction::ImagesDidFail(FetchError::Status(500)))
            .unwrap();

        assert_eq!(&*store.get_images(), &[Image::new("keep")]);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let (dispatcher, store) = setup();
        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(vec![Image::new("old")]))
            .unwrap();
        let snapshot = store.get_images();

        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(vec![]))
            .unwrap();

        assert_eq!(&*snapshot, &[Image::new("old")]);
        assert!(store.get_images().is_empty());
    }

    #[test]
    fn test_remove_unknown_listener_is_noop() {
        let (dispatcher, store) = setup();
        let (count, _sub) = counter(&store);

        let id = store.add_change_listener(|| {});
        assert!(store.remove_change_listener(id));
        assert!(!store.remove_change_listener(id));
        assert_eq!(store.listener_count(), 1);

        dispatcher
            .dispatch(ImageAction::ImagesDidLoad(vec![]))
            .unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_weak_handle_does_not_keep_store_alive() {
        let (dispatcher, store) = setup();
        let weak = store.downgrade();
        assert!(weak.upgrade().is_some());

        drop(store);
        assert!(weak.upgrade().is_none());
        assert!(dispatcher.is_empty());
    }
}

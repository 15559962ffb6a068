//! Render snapshot tests using RenderHarness

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use flux_dispatch::testing::*;
use flux_dispatch::{ActionLog, ActionLogConfig, Runtime};
use mrw_images::components::{
    ActionLogBar, Component, Header, ImagesList, ImagesListProps, APP_TITLE, EMPTY_PLACEHOLDER,
};
use mrw_images::{
    App, AppContext, FetchError, HttpImageSource, Image, ImageAction, ImageSource,
};

fn props() -> ImagesListProps {
    ImagesListProps { is_focused: true }
}

#[test]
fn test_render_empty_list_shows_placeholder() {
    let mut render = RenderHarness::new(60, 10);
    let mut list = ImagesList::new();

    let output = render.render_to_string_plain(|frame| {
        list.render(frame, frame.area(), props());
    });

    assert!(output.contains(EMPTY_PLACEHOLDER));
    assert!(output.contains("Images (0)"));
}

struct FixedSource(Vec<Image>);

impl ImageSource for FixedSource {
    fn fetch_images(&self) -> impl Future<Output = Result<Vec<Image>, FetchError>> + Send {
        let images = self.0.clone();
        async move { Ok(images) }
    }
}

fn sample_images() -> Vec<Image> {
    let taken = Utc.with_ymd_and_hms(2017, 3, 14, 9, 30, 0).unwrap();
    vec![
        Image::new("58c7a1f0").with_filename("cat.png"),
        Image {
            url: "/uploads/dog.jpg".into(),
            timestamp: Some(taken),
            ..Image::new("58c7a1f1")
        },
    ]
}

#[tokio::test]
async fn test_render_loaded_images() {
    let mut runtime = Runtime::<ImageAction>::new();
    let ctx = AppContext::new(&runtime, FixedSource(sample_images()));
    let mut app = App::new(ctx);
    let mut render = RenderHarness::new(70, 12);

    app.mount().unwrap();
    let output = render.render_to_string_plain(|frame| app.render(frame, frame.area()));
    assert!(output.contains(EMPTY_PLACEHOLDER));

    runtime.settle().await;
    assert!(app.take_dirty());

    let output = render.render_to_string_plain(|frame| app.render(frame, frame.area()));
    assert!(output.contains(APP_TITLE));
    assert!(output.contains("Images (2)"), "{output}");
    assert!(output.contains("58c7a1f0"));
    assert!(output.contains("cat.png"));
    assert!(output.contains("/uploads/dog.jpg"));
    assert!(output.contains("2017-03-14"));
    assert!(!output.contains(EMPTY_PLACEHOLDER));
}

#[tokio::test]
async fn test_render_highlights_selection() {
    let mut runtime = Runtime::<ImageAction>::new();
    let ctx = AppContext::new(&runtime, FixedSource(sample_images()));
    let mut app = App::new(ctx);
    app.mount().unwrap();
    runtime.settle().await;

    app.handle_event(&key_event("j"));
    app.handle_event(&key_event("j"));

    let mut render = RenderHarness::new(70, 12);
    let output = render.render_to_string_plain(|frame| app.render(frame, frame.area()));
    let selected = output
        .lines()
        .find(|line| line.contains("> "))
        .unwrap_or_default();
    assert!(selected.contains("58c7a1f1"), "{output}");
}

#[test]
fn test_header_shows_title_and_hints() {
    let mut render = RenderHarness::new(50, 2);
    let mut header = Header;

    let output = render.render_to_string_plain(|frame| {
        header.render(frame, frame.area(), ());
    });

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0].trim(), APP_TITLE);
    assert!(lines[1].contains("reload"));
    assert!(lines[1].contains("quit"));
}

#[test]
fn test_action_log_bar_newest_first() {
    let mut log = ActionLog::new(ActionLogConfig::default());
    log.log(&ImageAction::ImagesLoad);
    log.log(&ImageAction::ImagesDidFail(FetchError::Status(500)));
    log.update_last_callbacks(2);

    let mut render = RenderHarness::new(70, ActionLogBar::HEIGHT);
    let mut bar = ActionLogBar;
    let output = render.render_to_string_plain(|frame| {
        bar.render(frame, frame.area(), &log);
    });

    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].contains("actions"));
    assert!(lines[1].contains("ImagesDidFail(Image server returned status 500) -> 2"));
    assert!(lines[2].contains("ImagesLoad"));
}

#[test]
fn test_app_shows_action_log_when_enabled() {
    let runtime = Runtime::<ImageAction>::new();
    let log = Rc::new(RefCell::new(ActionLog::default()));
    log.borrow_mut().log(&ImageAction::ImagesLoad);

    let ctx = AppContext::new(&runtime, HttpImageSource::new("http://localhost:3300"))
        .with_action_log(log);
    let mut app = App::new(ctx);

    let mut render = RenderHarness::new(70, 16);
    let output = render.render_to_string_plain(|frame| app.render(frame, frame.area()));

    assert!(output.contains(" actions "));
    assert!(output.contains("ImagesLoad"));
    assert!(output.contains(EMPTY_PLACEHOLDER));
}

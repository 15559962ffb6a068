//! Tests for #[derive(Action)]

use flux_dispatch::{Action, ActionCategory};

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
enum TestAction {
    ImagesLoad,
    ImagesDidLoad(Vec<String>),
    ImagesDidFail { reason: String },
    ImageListSelectNext,
    #[action(category = "app")]
    Quit,
    #[action(skip_category)]
    SettingsReload,
}

#[test]
fn test_names() {
    assert_eq!(TestAction::ImagesLoad.name(), "ImagesLoad");
    assert_eq!(TestAction::ImagesDidLoad(vec![]).name(), "ImagesDidLoad");
    assert_eq!(
        TestAction::ImagesDidFail {
            reason: "boom".into()
        }
        .name(),
        "ImagesDidFail"
    );
}

#[test]
fn test_intent_and_results_share_a_category() {
    assert_eq!(TestAction::ImagesLoad.category(), Some("images"));
    assert_eq!(TestAction::ImagesDidLoad(vec![]).category(), Some("images"));
    assert!(TestAction::ImagesDidFail {
        reason: String::new()
    }
    .is_images());
}

#[test]
fn test_multi_word_category() {
    let action = TestAction::ImageListSelectNext;
    assert_eq!(action.category(), Some("image_list"));
    assert_eq!(action.category_enum(), TestActionCategory::ImageList);
    assert!(action.is_image_list());
}

#[test]
fn test_explicit_and_skipped_categories() {
    assert_eq!(TestAction::Quit.category(), Some("app"));
    assert!(TestAction::Quit.is_app());
    assert_eq!(TestAction::SettingsReload.category(), None);
    assert_eq!(
        TestAction::SettingsReload.category_enum(),
        TestActionCategory::Uncategorized
    );
}

#[test]
fn test_category_enum_listing() {
    let names: Vec<_> = TestActionCategory::all()
        .iter()
        .map(TestActionCategory::name)
        .collect();
    assert_eq!(names, vec!["app", "image_list", "images", "uncategorized"]);
}

#[test]
fn test_category_trait() {
    fn category_of<A: ActionCategory>(action: &A) -> Option<&'static str> {
        action.category()
    }

    assert_eq!(category_of(&TestAction::ImagesLoad), Some("images"));
    assert_eq!(category_of(&TestAction::SettingsReload), None);
}

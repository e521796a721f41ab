use proptest::prelude::*;

use crate::core::formatters::process_formatting_tags;

const KINDS: [&str; 8] = ["b", "i", "dice", "damage", "condition", "skill", "spell", "creature"];

proptest! {
    #[test]
    fn prop_tag_free_text_is_unchanged(text in "[^{}]{0,200}") {
        prop_assert_eq!(process_formatting_tags(&text), text);
    }

    #[test]
    fn prop_known_tags_leave_no_markers(
        kind in proptest::sample::select(&KINDS[..]),
        body in "[a-zA-Z0-9 ]{1,20}",
        prefix in "[a-z ]{0,20}",
    ) {
        let input = format!("{prefix}{{@{kind} {body}}} tail");
        let html = process_formatting_tags(&input);

        prop_assert!(!html.contains("{@"), "output still contains an unprocessed tag: {}", html);
        prop_assert!(html.ends_with(" tail"));
        prop_assert!(html.starts_with(&prefix));
    }

    #[test]
    fn prop_rendering_is_stable(kind in proptest::sample::select(&KINDS[..]), body in "[a-z]{1,12}") {
        let once = process_formatting_tags(&format!("{{@{kind} {body}}}"));
        prop_assert_eq!(process_formatting_tags(&once), once.clone());
    }
}

use proptest::prelude::*;

use cri::content::path::validate_node_name;
use cri::datatype::SanitizedString;
use cri::utils::to_node_name;

proptest! {
    #[test]
    fn sanitized_text_is_trimmed_and_collapsed(raw in ".{0,200}") {
        let value = SanitizedString::new(&raw);
        let text = value.as_str();

        prop_assert_eq!(text.trim(), text);
        prop_assert!(!text.contains("  "));
        prop_assert!(!text.contains('\n'));
        prop_assert!(!text.contains('\t'));
    }

    #[test]
    fn sanitizing_is_idempotent(raw in "[a-z <>/\n\t]{0,120}") {
        let once = SanitizedString::new(&raw);
        let twice = SanitizedString::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn markup_never_survives(words in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let raw = words
            .iter()
            .map(|word| format!("<span class=\"x\">{word}</span>"))
            .collect::<Vec<_>>()
            .join("<br/>");
        let value = SanitizedString::new(&raw);
        prop_assert_eq!(value.as_str(), words.join(" "));
    }

    #[test]
    fn node_names_are_valid(raw in ".{0,64}") {
        if let Some(name) = to_node_name(&raw) {
            prop_assert!(validate_node_name(&name).is_ok());
            prop_assert!(!name.starts_with('-'));
            prop_assert!(!name.ends_with('-'));
        }
    }
}

//! Topic/owner extraction from document display names.
//!
//! Review documents follow the naming convention `"<Topic> - [<Owner>]"`.
//! Names that do not follow it still produce a usable pair.

use crate::document::UNKNOWN;

/// Separator between the topic and the owner segment.
pub const SEPARATOR: &str = " - ";

/// Split a display name into `(topic, owner)`.
///
/// With at least two `" - "` segments the first is the topic and the last
/// is the owner, with `[`/`]` removed. Otherwise the whole trimmed name is
/// the topic and the owner is `"Unknown"`. Total over all strings.
#[must_use]
pub fn parse_display_name(name: &str) -> (String, String) {
    let segments: Vec<&str> = name.split(SEPARATOR).collect();

    match segments.as_slice() {
        [first, .., last] => {
            let topic = first.trim().to_string();
            let owner = last.trim().replace(['[', ']'], "");
            (topic, owner)
        }
        _ => (name.trim().to_string(), UNKNOWN.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_topic_and_bracketed_owner() {
        let (topic, owner) = parse_display_name("System Design - [Jane Doe]");
        assert_eq!(topic, "System Design");
        assert_eq!(owner, "Jane Doe");
    }

    #[test]
    fn name_without_separator_has_unknown_owner() {
        let (topic, owner) = parse_display_name("UntitledDoc");
        assert_eq!(topic, "UntitledDoc");
        assert_eq!(owner, "Unknown");
    }

    #[test]
    fn middle_segments_are_ignored() {
        let (topic, owner) = parse_display_name("Payments - v2 draft - [Priya]");
        assert_eq!(topic, "Payments");
        assert_eq!(owner, "Priya");
    }

    #[test]
    fn owner_without_brackets_is_kept_verbatim() {
        let (topic, owner) = parse_display_name("  Q4 API Spec -  Rahul ");
        assert_eq!(topic, "Q4 API Spec");
        assert_eq!(owner, "Rahul");
    }

    #[test]
    fn hyphen_without_spaces_is_not_a_separator() {
        let (topic, owner) = parse_display_name("Auth-Migration-[Anu]");
        assert_eq!(topic, "Auth-Migration-[Anu]");
        assert_eq!(owner, "Unknown");
    }

    #[test]
    fn empty_name_degrades_gracefully() {
        assert_eq!(
            parse_display_name(""),
            (String::new(), "Unknown".to_string())
        );
        assert_eq!(
            parse_display_name(" - "),
            (String::new(), String::new())
        );
    }

    proptest! {
        #[test]
        fn parser_is_total_and_deterministic(name in ".*") {
            let first = parse_display_name(&name);
            let second = parse_display_name(&name);
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.1.contains('[') && !first.1.contains(']'));
        }

        #[test]
        fn names_without_separator_keep_whole_topic(name in "[A-Za-z0-9 _\\[\\]]{0,40}") {
            prop_assume!(!name.contains(SEPARATOR));
            let (topic, owner) = parse_display_name(&name);
            prop_assert_eq!(topic, name.trim().to_string());
            prop_assert_eq!(owner, "Unknown");
        }
    }
}

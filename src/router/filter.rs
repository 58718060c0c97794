use std::collections::HashSet;

use super::store::DestinationEntry;

/// Select the URLs to dispatch to, in entry order
///
/// With no filter (or an empty one) every URL is selected. Otherwise an entry
/// qualifies when any of its tags matches any filter tag, ignoring case;
/// untagged entries never match a non-empty filter.
pub fn select(entries: &[DestinationEntry], filter: Option<&[String]>) -> Vec<String> {
    let wanted: HashSet<String> = match filter {
        Some(tags) if !tags.is_empty() => tags.iter().map(|tag| tag.to_lowercase()).collect(),
        _ => return entries.iter().map(|entry| entry.url.clone()).collect(),
    };

    entries
        .iter()
        .filter(|entry| {
            entry
                .tags
                .iter()
                .any(|tag| wanted.contains(&tag.to_lowercase()))
        })
        .map(|entry| entry.url.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<DestinationEntry> {
        vec![
            DestinationEntry::new("a://1", ["Ops", "dev"]),
            DestinationEntry::untagged("a://2"),
            DestinationEntry::new("a://3", ["dev"]),
            DestinationEntry::new("a://4", ["OPS"]),
        ]
    }

    #[test]
    fn test_no_filter_selects_all_in_order() {
        let all = vec!["a://1", "a://2", "a://3", "a://4"];
        assert_eq!(select(&entries(), None), all);
        assert_eq!(select(&entries(), Some(&[])), all);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_existential() {
        let filter = vec!["ops".to_string()];
        assert_eq!(select(&entries(), Some(&filter)), vec!["a://1", "a://4"]);

        let filter = vec!["DEV".to_string(), "nobody".to_string()];
        assert_eq!(select(&entries(), Some(&filter)), vec!["a://1", "a://3"]);
    }

    #[test]
    fn test_untagged_entry_never_matches_blank_tag() {
        let filter = vec!["".to_string()];
        assert!(select(&entries(), Some(&filter)).is_empty());
    }
}

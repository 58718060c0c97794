use serde::Deserialize;
use std::collections::BTreeMap;

use crate::router::DestinationEntry;

/// Shape of one configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub urls: Option<UrlsSection>,
    #[serde(default)]
    pub fallback: Option<FallbackSection>,
}

/// `urls` accepts a list of records or a map of tag to URL(s)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlsSection {
    List(Vec<UrlRecord>),
    ByTag(BTreeMap<String, OneOrMany>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlRecord {
    Bare(String),
    Tagged {
        url: String,
        #[serde(default)]
        tags: TagList,
    },
}

/// Tags written as a list or as one comma/whitespace separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl Default for TagList {
    fn default() -> Self {
        TagList::List(Vec::new())
    }
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(tags) => tags.into_iter().map(|tag| tag.trim().to_string()).collect(),
            TagList::Joined(joined) => split_list(&joined),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(url) => vec![url],
            OneOrMany::Many(urls) => urls,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackSection {
    #[serde(default)]
    pub tags: TagList,
}

/// Destinations and fallback tags gathered from every source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub entries: Vec<DestinationEntry>,
    pub fallback_tags: Vec<String>,
}

impl FileConfig {
    /// Flatten into store entries
    ///
    /// Map-form sections are walked in tag order; a URL listed under several
    /// tags becomes a single entry carrying all of them.
    pub fn into_entries(self) -> Vec<DestinationEntry> {
        match self.urls {
            None => Vec::new(),
            Some(UrlsSection::List(records)) => records
                .into_iter()
                .map(|record| match record {
                    UrlRecord::Bare(url) => DestinationEntry::untagged(url.trim()),
                    UrlRecord::Tagged { url, tags } => {
                        DestinationEntry::new(url.trim(), tags.into_vec())
                    }
                })
                .collect(),
            Some(UrlsSection::ByTag(by_tag)) => {
                let mut entries: Vec<DestinationEntry> = Vec::new();
                for (tag, urls) in by_tag {
                    let tag = tag.trim().to_string();
                    for url in urls.into_vec() {
                        let url = url.trim();
                        match entries.iter_mut().find(|entry| entry.url == url) {
                            Some(entry) => {
                                if !entry.tags.contains(&tag) {
                                    entry.tags.push(tag.clone());
                                }
                            }
                            None => entries.push(DestinationEntry::new(url, [tag.clone()])),
                        }
                    }
                }
                entries
            }
        }
    }
}

/// Split on commas and whitespace, dropping empty pieces
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b  c,,d"), vec!["a", "b", "c", "d"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_list_form_entries() {
        let config: FileConfig = serde_json::from_value(serde_json::json!({
            "urls": [
                "json://hooks.example.com",
                { "url": "ntfy://alerts", "tags": "ops, oncall" },
                { "url": "discord://1/t", "tags": ["team"] },
                { "url": "tgram://bot/42" }
            ]
        }))
        .unwrap();

        let entries = config.into_entries();
        assert_eq!(entries.len(), 4);
        assert!(entries[0].tags.is_empty());
        assert_eq!(entries[1].tags, vec!["ops", "oncall"]);
        assert_eq!(entries[2].tags, vec!["team"]);
        assert!(entries[3].tags.is_empty());
    }

    #[test]
    fn test_map_form_merges_shared_urls() {
        let config: FileConfig = serde_json::from_value(serde_json::json!({
            "urls": {
                "team": ["ntfy://shared", "discord://1/t"],
                "ops": "ntfy://shared"
            }
        }))
        .unwrap();

        let entries = config.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "ntfy://shared");
        assert_eq!(entries[0].tags, vec!["ops", "team"]);
        assert_eq!(entries[1].url, "discord://1/t");
        assert_eq!(entries[1].tags, vec!["team"]);
    }

    #[test]
    fn test_missing_sections_default() {
        let config: FileConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(config.fallback.is_none());
        assert!(config.into_entries().is_empty());
    }
}

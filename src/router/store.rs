use serde::{Deserialize, Serialize};

/// Destination URL with the tags used for audience filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationEntry {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DestinationEntry {
    pub fn new<I, S>(url: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn untagged(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tags: Vec::new(),
        }
    }
}

impl From<&str> for DestinationEntry {
    fn from(url: &str) -> Self {
        Self::untagged(url)
    }
}

impl From<String> for DestinationEntry {
    fn from(url: String) -> Self {
        Self::untagged(url)
    }
}

/// Append-only, insertion-ordered destination list
#[derive(Debug, Clone, Default)]
pub struct DestinationStore {
    entries: Vec<DestinationEntry>,
}

impl DestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DestinationEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DestinationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<DestinationEntry> for DestinationStore {
    fn extend<T: IntoIterator<Item = DestinationEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_insertion_order() {
        let mut store = DestinationStore::new();
        store.push(DestinationEntry::new("b://2", ["x"]));
        store.push("a://1".into());
        store.extend([DestinationEntry::untagged("c://3")]);

        let urls: Vec<&str> = store.entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["b://2", "a://1", "c://3"]);
        assert_eq!(store.len(), 3);
        assert!(store.entries()[1].tags.is_empty());
    }
}

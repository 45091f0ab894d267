use html::ParsedDocument;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub url: String,
    pub document: Arc<ParsedDocument>,
}

/// Bounded URL -> document store.
///
/// Eviction is FIFO by insertion order; reads never refresh an entry. Keys
/// are expected to be normalized by the caller.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, CachedDocument>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, url: &str) -> Option<&CachedDocument> {
        self.entries.get(url)
    }

    /// Insert `document` under `url`. An existing entry is kept as is.
    pub fn put(&mut self, url: &str, document: Arc<ParsedDocument>) {
        if self.capacity == 0 || self.entries.contains_key(url) {
            return;
        }
        while self.order.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            log::debug!(target: "navigation.cache", "evicted {oldest}");
        }
        self.order.push_back(url.to_string());
        self.entries.insert(
            url.to_string(),
            CachedDocument {
                url: url.to_string(),
                document,
            },
        );
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    /// Cached URLs, oldest insertion first.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str) -> Arc<ParsedDocument> {
        Arc::new(ParsedDocument::parse(url, "<title>t</title><main></main>"))
    }

    fn url(i: usize) -> String {
        format!("https://site/p{i}")
    }

    #[test]
    fn eviction_ignores_reads() {
        let mut cache = PageCache::new(10);
        for i in 0..10 {
            cache.put(&url(i), doc(&url(i)));
        }
        // Reading the oldest entry does not protect it.
        assert!(cache.get(&url(0)).is_some());
        cache.put(&url(10), doc(&url(10)));

        assert_eq!(cache.len(), 10);
        assert!(!cache.contains(&url(0)));
        for i in 1..=10 {
            assert!(cache.contains(&url(i)), "missing {}", url(i));
        }
    }

    #[test]
    fn put_on_existing_key_keeps_entry_and_slot() {
        let mut cache = PageCache::new(2);
        let first = doc("https://site/a");
        cache.put("https://site/a", first.clone());
        cache.put("https://site/b", doc("https://site/b"));
        cache.put("https://site/a", doc("https://site/a-again"));

        let hit = cache.get("https://site/a").unwrap();
        assert!(Arc::ptr_eq(&hit.document, &first));

        cache.put("https://site/c", doc("https://site/c"));
        assert!(!cache.contains("https://site/a"));
        assert_eq!(cache.urls().collect::<Vec<_>>(), ["https://site/b", "https://site/c"]);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache = PageCache::new(0);
        cache.put("https://site/a", doc("https://site/a"));
        assert!(cache.is_empty());
        assert!(cache.get("https://site/a").is_none());
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = PageCache::new(3);
        cache.put("https://site/a", doc("https://site/a"));
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.urls().count(), 0);
    }
}

//! Navigation History
//!
//! [`Location`] splits a requested URL into a normalized path and its query;
//! [`History`] is the back/forward stack the router pushes onto.

use std::collections::BTreeMap;
use std::fmt;

/// A parsed URL inside the storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    /// Parse `raw`, dropping the fragment and any trailing slash
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.split('#').next().unwrap_or("");
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, query),
            None => (raw, ""),
        };

        Self {
            path: normalize_path(path),
            query: parse_query(query),
        }
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Copy with `key` set to `value`
    pub fn with_query(&self, key: &str, value: &str) -> Self {
        let mut location = self.clone();
        location.query.insert(key.to_string(), value.to_string());
        location
    }

    /// Path and query as a link target
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn decode_component(value: &str) -> String {
    let value = value.replace('+', " ");
    urlencoding::decode(&value)
        .map(|v| v.into_owned())
        .unwrap_or(value)
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Back/forward stack of visited locations
pub trait History: Send + Sync {
    /// Add an entry after the current one, dropping forward entries
    fn push(&mut self, href: &str);

    /// Overwrite the current entry
    fn replace(&mut self, href: &str);

    fn current(&self) -> Option<&str>;

    /// Step back, returning the new current entry
    fn back(&mut self) -> Option<String>;

    /// Step forward, returning the new current entry
    fn forward(&mut self) -> Option<String>;

    /// Move to an entry the user reached outside the router (popstate)
    fn sync(&mut self, href: &str);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// History kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl History for MemoryHistory {
    fn push(&mut self, href: &str) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(href.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, href: &str) {
        match self.entries.get_mut(self.cursor) {
            Some(entry) => *entry = href.to_string(),
            None => self.push(href),
        }
    }

    fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    fn back(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.current().map(str::to_string)
    }

    fn forward(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current().map(str::to_string)
    }

    fn sync(&mut self, href: &str) {
        if self.current() == Some(href) {
            return;
        }
        if self.cursor > 0 && self.entries[self.cursor - 1] == href {
            self.cursor -= 1;
        } else if self.entries.get(self.cursor + 1).map(String::as_str) == Some(href) {
            self.cursor += 1;
        } else {
            self.replace(href);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        let location = Location::parse("/search/?q=boho+kette&category=ketten#top");
        assert_eq!(location.path, "/search");
        assert_eq!(location.query("q"), Some("boho kette"));
        assert_eq!(location.query("category"), Some("ketten"));
        assert_eq!(location.query("missing"), None);

        assert_eq!(Location::parse("").path, "/");
        assert_eq!(Location::parse("cart").path, "/cart");
        assert_eq!(Location::parse("/?x=").query("x"), None);
    }

    #[test]
    fn test_href_round_trip() {
        let location = Location::parse("/search?q=gr%C3%BCn%20%26%20gold");
        assert_eq!(location.query("q"), Some("grün & gold"));
        assert_eq!(Location::parse(&location.href()), location);

        let tabbed = Location::parse("/product/2").with_query("tab", "reviews");
        assert_eq!(tabbed.href(), "/product/2?tab=reviews");
    }

    #[test]
    fn test_memory_history() {
        let mut history = MemoryHistory::new();
        assert!(history.back().is_none());

        history.push("/");
        history.push("/products");
        history.push("/cart");
        assert_eq!(history.back().as_deref(), Some("/products"));
        assert_eq!(history.back().as_deref(), Some("/"));
        assert!(history.back().is_none());
        assert_eq!(history.forward().as_deref(), Some("/products"));

        history.push("/login");
        assert_eq!(history.entries(), ["/", "/products", "/login"]);
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_sync_moves_cursor() {
        let mut history = MemoryHistory::new();
        history.push("/");
        history.push("/products");

        history.sync("/");
        assert_eq!(history.current(), Some("/"));
        history.sync("/products");
        assert_eq!(history.current(), Some("/products"));
        history.sync("/about");
        assert_eq!(history.entries(), ["/", "/about"]);
    }
}

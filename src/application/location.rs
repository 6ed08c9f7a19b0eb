//! Client-side URL state: a path plus ordered query pairs.

use std::fmt;

use url::form_urlencoded;

/// A navigable in-app URL such as `/posts?search=rust&page=2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    params: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Parse `path?query`; a fragment, if any, is dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or_default();
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let params = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self {
            path: path.to_string(),
            params,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every `key` entry with a single one, keeping the first
    /// occurrence's position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.params[index].1 = value;
                let mut seen = 0usize;
                self.params.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.params.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }

    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.params {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = self.query_string();
        if query.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}?{query}", self.path)
        }
    }
}

/// List-view state derived from a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub search: String,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
        }
    }
}

impl QueryState {
    /// Missing, unparseable or zero `page` means page 1.
    #[must_use]
    pub fn from_location(location: &Location) -> Self {
        let page = location
            .get("page")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        let search = location.get("search").unwrap_or_default().to_string();
        Self { page, search }
    }

    /// Same search at another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            search: self.search.clone(),
        }
    }

    /// New search always starts over at page 1.
    #[must_use]
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        let search = search.into();
        let page = if search == self.search { self.page } else { 1 };
        Self { page, search }
    }

    /// The non-page parameters to carry into pagination links.
    #[must_use]
    pub fn carried_params(&self) -> Vec<(String, String)> {
        if self.search.is_empty() {
            Vec::new()
        } else {
            vec![("search".to_string(), self.search.clone())]
        }
    }
}

/// Where URL changes are pushed; the history stack of the client.
pub trait Navigator {
    fn location(&self) -> Location;

    fn push(&mut self, target: &str);
}

/// Navigator that keeps its history in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<Location>,
}

impl MemoryHistory {
    pub fn new(start: &str) -> Self {
        Self {
            entries: vec![Location::parse(start)],
        }
    }

    /// Every location pushed after the starting one.
    #[must_use]
    pub fn pushed(&self) -> Vec<String> {
        self.entries.iter().skip(1).map(ToString::to_string).collect()
    }
}

impl Navigator for MemoryHistory {
    fn location(&self) -> Location {
        self.entries.last().cloned().unwrap_or_default()
    }

    fn push(&mut self, target: &str) {
        self.entries.push(Location::parse(target));
    }
}

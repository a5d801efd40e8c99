//! Case-insensitive HTTP header map.
//!
//! Names are matched ignoring ASCII case but keep the spelling they were
//! first inserted with. `insert` replaces (last write wins), `append`
//! accumulates values for headers such as `Set-Cookie`.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Sets `name` to a single value, replacing anything stored before.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = vec![value],
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Adds another value for `name`, keeping existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Returns the most recent value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.entries[idx].1.last())
            .map(|v| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.position(name)
            .map(|idx| self.entries[idx].1.iter().map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order, one pair per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values.iter().map(move |v| (name.as_str(), v.as_str()))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

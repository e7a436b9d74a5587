#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;

/// Query parameters as an ordered multimap: key -> values in the order given.
#[derive(Debug, Clone, Default)]
pub struct QueryValues {
    entries: Vec<(String, Vec<String>)>,
    index: FxHashMap<String, usize>,
}

impl QueryValues {
    pub fn new() -> Self { Self::default() }

    /// Parse an `application/x-www-form-urlencoded` query string. A leading `?` is allowed.
    pub fn parse(query: &str) -> Self {
        let q = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1.push(value.into()),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value.into()]));
            }
        }
    }

    /// Replace all values for `key`.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = values,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, values));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (k, v) in iter { out.append(k, v); }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_groups_repeated_keys_in_order() {
        let q = QueryValues::parse("?tags=a&page_size=10&tags=b&labels%5Benv%5D=prod&q=hello+world&flag");
        assert_eq!(q.len(), 5);
        assert_eq!(q.get("tags"), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(q.get("labels[env]"), Some(&["prod".to_string()][..]));
        assert_eq!(q.get("q"), Some(&["hello world".to_string()][..]));
        assert_eq!(q.get("flag"), Some(&[String::new()][..]));
        let keys: Vec<_> = q.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["tags", "page_size", "labels[env]", "q", "flag"]);
    }

    #[test]
    fn insert_replaces() {
        let mut q: QueryValues = [("a", "1"), ("a", "2")].into_iter().collect();
        q.insert("a", vec!["3".into()]);
        assert_eq!(q.get("a"), Some(&["3".to_string()][..]));
        assert!(q.get("b").is_none());
    }
}

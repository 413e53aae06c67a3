//! Path parameters and query strings
//!
//! [`RouteParams`] holds the values captured by a pattern's `:name`
//! placeholders, [`QueryParams`] the pairs of the location's real query string.

use std::borrow::Cow;
use std::collections::HashMap;

/// Percent-decode a URI component, keeping the raw text when it does not
/// decode to valid UTF-8
pub(crate) fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_string(),
    }
}

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use spa_navigator::RouteParams;
///
/// // Pattern: /products/:id
/// // Path:    /products/42
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "42".to_string());
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get_as::<u32>("id"), Some(42));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it
    ///
    /// Returns `None` if the parameter is missing or does not parse.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter, replacing an earlier value under the same name
    pub fn insert(&mut self, key: String, value: String) {
        self.params.insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from the location's query string
///
/// Repeated keys keep every value in order; [`QueryParams::get`] answers with
/// the last one, so `?page=1&page=2` reads as page 2.
///
/// # Example
///
/// ```
/// use spa_navigator::QueryParams;
///
/// let query = QueryParams::from_query_string("q=rust%20router&tag=a&tag=b");
///
/// assert_eq!(query.get("q"), Some("rust router"));
/// assert_eq!(query.get("tag"), Some("b"));
/// assert_eq!(query.get_all("tag").map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without its leading `?`
    ///
    /// A key without `=` gets an empty value; pairs with an empty key are
    /// ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();

        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                continue;
            }
            params.insert(decode_component(key), decode_component(value));
        }

        params
    }

    /// Get the last value given for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.last().map(String::as_str)
    }

    /// Get every value given for a key, in order of appearance
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// Get a value parsed as `T`
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for a key
    pub fn insert(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Encode back into a query string (without the leading `?`)
    ///
    /// Keys are emitted in sorted order so the result is stable.
    pub fn to_query_string(&self) -> String {
        let mut keys: Vec<&String> = self.params.keys().collect();
        keys.sort();

        keys.into_iter()
            .flat_map(|key| {
                self.params[key].iter().map(move |value| {
                    format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

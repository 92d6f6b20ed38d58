// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merge layer: an insertion-ordered, last-writer-wins key/value store.
//!
//! A [`ConfigStore`] lives for exactly one resolution run. Sources feed it with
//! [`ConfigStore::put`] in precedence order and a final [`ConfigStore::eval`]
//! turns the raw values into a [`ResolvedConfig`].

use crate::domain::expression::ExpressionEvaluator;
use crate::domain::resolved::ResolvedConfig;
use crate::domain::Result;
use crate::ports::Environment;
use std::collections::HashMap;

/// Key holding the application name used to locate local developer overrides.
pub const APP_NAME_KEY: &str = "app.name";

/// Alternate spelling of [`APP_NAME_KEY`], consulted when the dotted key is absent.
pub const APP_NAME_ALT_KEY: &str = "appName";

/// Key whose value lists further files to load.
pub const INDIRECT_LOCATION_KEY: &str = "load.properties";

/// Fallback for [`INDIRECT_LOCATION_KEY`].
pub const INDIRECT_LOCATION_OVERRIDE_KEY: &str = "load.properties.override";

/// Ordered key/value store with overwrite semantics.
///
/// A replaced key keeps the position of its first insertion, so diagnostics list
/// keys in the order sources first mentioned them.
///
/// # Examples
///
/// ```
/// use layercfg::domain::ConfigStore;
///
/// let mut store = ConfigStore::new();
/// store.put("db.host", "localhost");
/// store.put("db.host", "db.internal");
///
/// assert_eq!(store.size(), 1);
/// assert_eq!(store.get("db.host"), Some("db.internal"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value. The later write always wins.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Number of distinct keys.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been put yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current raw (unevaluated) value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    /// Returns `true` if `key` has been put.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in first-insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The application name, used to find local developer override files.
    pub fn app_name(&self) -> Option<&str> {
        self.get(APP_NAME_KEY).or_else(|| self.get(APP_NAME_ALT_KEY))
    }

    /// The raw list of additional files to load, if configured.
    ///
    /// Split it with [`ConfigStore::split_paths`]; each path still needs
    /// expression evaluation before use.
    pub fn indirect_location(&self) -> Option<&str> {
        self.get(INDIRECT_LOCATION_KEY)
            .or_else(|| self.get(INDIRECT_LOCATION_OVERRIDE_KEY))
    }

    /// Splits a path list on any run of whitespace, commas or semicolons.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::ConfigStore;
    ///
    /// let paths = ConfigStore::split_paths(" a.yaml,b.properties ;\tc.yml ");
    /// assert_eq!(paths, vec!["a.yaml", "b.properties", "c.yml"]);
    /// ```
    pub fn split_paths(location: &str) -> Vec<&str> {
        location
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Evaluates a single string against the current contents and `env`.
    ///
    /// Used for paths named by configuration, which may contain expressions.
    /// `context` names the value in error messages.
    pub fn expand(&self, context: &str, raw: &str, env: &dyn Environment) -> Result<String> {
        ExpressionEvaluator::new(self, env).evaluate(context, raw)
    }

    /// Runs the expression evaluator over every stored value.
    ///
    /// Fails on the first expression cycle or unterminated marker; unresolved
    /// references are kept verbatim and reported by [`ResolvedConfig::unresolved`].
    pub fn eval(&self, env: &dyn Environment) -> Result<ResolvedConfig> {
        let mut evaluator = ExpressionEvaluator::new(self, env);
        let mut values = Vec::with_capacity(self.entries.len());
        for (key, _) in &self.entries {
            if let Some(value) = evaluator.resolve_key(key)? {
                values.push((key.clone(), value));
            }
        }
        Ok(ResolvedConfig::new(values, evaluator.into_unresolved()))
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = ConfigStore::new();
        for (key, value) in iter {
            store.put(key, value);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapEnvironment;

    #[test]
    fn test_put_and_get() {
        let mut store = ConfigStore::new();
        store.put("key", "value");
        assert_eq!(store.get("key"), Some("value"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_later_put_wins() {
        let mut store = ConfigStore::new();
        store.put("key", "first");
        store.put("key", "second");
        assert_eq!(store.get("key"), Some("second"));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_overwrite_keeps_first_position() {
        let mut store = ConfigStore::new();
        store.put("a", "1");
        store.put("b", "2");
        store.put("a", "3");

        let entries: Vec<_> = store.entries().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_size_counts_distinct_keys() {
        let mut store = ConfigStore::new();
        assert!(store.is_empty());
        store.put("a", "1");
        store.put("b", "2");
        store.put("b", "3");
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_app_name_prefers_dotted_key() {
        let mut store = ConfigStore::new();
        assert_eq!(store.app_name(), None);

        store.put("appName", "legacy");
        assert_eq!(store.app_name(), Some("legacy"));

        store.put("app.name", "orders");
        assert_eq!(store.app_name(), Some("orders"));
    }

    #[test]
    fn test_indirect_location_fallback() {
        let mut store = ConfigStore::new();
        assert_eq!(store.indirect_location(), None);

        store.put("load.properties.override", "b.properties");
        assert_eq!(store.indirect_location(), Some("b.properties"));

        store.put("load.properties", "a.properties");
        assert_eq!(store.indirect_location(), Some("a.properties"));
    }

    #[test]
    fn test_split_paths_mixed_delimiters() {
        assert_eq!(
            ConfigStore::split_paths("one.yaml;;two.properties,\n three.yml"),
            vec!["one.yaml", "two.properties", "three.yml"]
        );
        assert!(ConfigStore::split_paths("  , ; ").is_empty());
    }

    #[test]
    fn test_eval_resolves_every_key() {
        let store: ConfigStore = [("host", "localhost"), ("url", "http://${host}:8080")]
            .into_iter()
            .collect();
        let resolved = store.eval(&MapEnvironment::new()).unwrap();

        assert_eq!(resolved.get("host"), Some("localhost"));
        assert_eq!(resolved.get("url"), Some("http://localhost:8080"));
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_expand_uses_store_and_env() {
        let store: ConfigStore = [("dir", "/opt/app")].into_iter().collect();
        let env = MapEnvironment::new().with_var("PROFILE", "prod");

        let path = store
            .expand("load.properties", "${dir}/${PROFILE}.properties", &env)
            .unwrap();
        assert_eq!(path, "/opt/app/prod.properties");
    }
}

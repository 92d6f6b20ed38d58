// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${name}` / `${name:default}` expansion.
//!
//! A reference resolves, in order, to:
//!
//! 1. the store's value for `name`, itself fully expanded,
//! 2. the environment variable `name`,
//! 3. the expanded `default`, when one is given.
//!
//! Anything else stays in the output verbatim and is recorded as an
//! [`UnresolvedReference`] so callers can validate it. Replacement text is
//! never re-scanned.
//!
//! Expansion runs on an explicit stack of frames, one per value or default
//! being expanded, so long reference chains do not grow the call stack.

use crate::domain::resolved::UnresolvedReference;
use crate::domain::store::ConfigStore;
use crate::domain::{ConfigError, Result};
use crate::ports::Environment;
use std::collections::HashMap;

const OPEN: &str = "${";
const CLOSE: u8 = b'}';
const DEFAULT_SEPARATOR: char = ':';

/// One string being expanded.
struct Frame {
    /// Store key whose value this is; `None` for defaults and ad-hoc strings.
    key: Option<String>,
    /// Names the value in errors and unresolved reports.
    owner: String,
    raw: String,
    pos: usize,
    out: String,
    /// Unresolved references in `out`, including those inherited from substitutions.
    refs: Vec<String>,
    /// Closing brace of the marker a child frame is expanding.
    pending: Option<usize>,
}

impl Frame {
    fn new(key: Option<&str>, owner: &str, raw: &str) -> Self {
        Self {
            key: key.map(str::to_string),
            owner: owner.to_string(),
            raw: raw.to_string(),
            pos: 0,
            out: String::with_capacity(raw.len()),
            refs: Vec::new(),
            pending: None,
        }
    }

    fn note(&mut self, reference: String) {
        if !self.refs.contains(&reference) {
            self.refs.push(reference);
        }
    }

    fn absorb(&mut self, child: Frame) {
        self.out.push_str(&child.out);
        for reference in child.refs {
            self.note(reference);
        }
        if let Some(close) = self.pending.take() {
            self.pos = close + 1;
        }
    }
}

enum Step {
    Done,
    Descend(Frame),
}

/// Expands expressions against one store and environment.
///
/// Resolved keys are memoised for the lifetime of the evaluator, and the keys
/// currently being expanded form the cycle guard.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::MapEnvironment;
/// use layercfg::domain::{ConfigStore, ExpressionEvaluator};
///
/// let store: ConfigStore = [("host", "localhost")].into_iter().collect();
/// let env = MapEnvironment::new();
/// let mut evaluator = ExpressionEvaluator::new(&store, &env);
///
/// let url = evaluator.evaluate("url", "http://${host}:${port:8080}").unwrap();
/// assert_eq!(url, "http://localhost:8080");
/// ```
pub struct ExpressionEvaluator<'a> {
    store: &'a ConfigStore,
    env: &'a dyn Environment,
    /// Expanded value and its unresolved references, per key.
    resolved: HashMap<String, (String, Vec<String>)>,
    in_progress: Vec<String>,
    unresolved: Vec<UnresolvedReference>,
}

impl<'a> ExpressionEvaluator<'a> {
    /// Creates an evaluator over `store`, falling back to `env`.
    pub fn new(store: &'a ConfigStore, env: &'a dyn Environment) -> Self {
        Self {
            store,
            env,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Expands an arbitrary string. `context` names it in errors and in the
    /// unresolved-reference report.
    pub fn evaluate(&mut self, context: &str, raw: &str) -> Result<String> {
        self.run(Frame::new(None, context, raw))
    }

    /// Fully expands the stored value of `key`.
    ///
    /// Returns `Ok(None)` when the store has no such key.
    pub fn resolve_key(&mut self, key: &str) -> Result<Option<String>> {
        if let Some((value, _)) = self.resolved.get(key) {
            return Ok(Some(value.clone()));
        }
        let store = self.store;
        let Some(raw) = store.get(key) else {
            return Ok(None);
        };
        self.run(Frame::new(Some(key), key, raw)).map(Some)
    }

    /// References that could not be resolved so far.
    ///
    /// A reference is reported for the key whose value holds the marker and for
    /// every key that substitutes that value.
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    pub(crate) fn into_unresolved(self) -> Vec<UnresolvedReference> {
        self.unresolved
    }

    fn run(&mut self, root: Frame) -> Result<String> {
        let base = self.in_progress.len();
        if let Some(key) = &root.key {
            self.in_progress.push(key.clone());
        }

        let mut parents: Vec<Frame> = Vec::new();
        let mut current = root;
        loop {
            match self.advance(&mut current) {
                Err(e) => {
                    self.in_progress.truncate(base);
                    return Err(e);
                }
                Ok(Step::Descend(child)) => parents.push(std::mem::replace(&mut current, child)),
                Ok(Step::Done) => {
                    self.complete(&current, parents.is_empty());
                    match parents.pop() {
                        Some(mut parent) => {
                            parent.absorb(current);
                            current = parent;
                        }
                        None => return Ok(current.out),
                    }
                }
            }
        }
    }

    /// Scans `frame` until it is finished or needs a child expanded first.
    fn advance(&mut self, frame: &mut Frame) -> Result<Step> {
        let store = self.store;
        loop {
            let rest = &frame.raw[frame.pos..];
            let Some(offset) = rest.find(OPEN) else {
                frame.out.push_str(rest);
                frame.pos = frame.raw.len();
                return Ok(Step::Done);
            };

            let start = frame.pos + offset;
            let body_start = start + OPEN.len();
            let Some(close) = find_close(&frame.raw[body_start..]).map(|o| body_start + o) else {
                return Err(ConfigError::UnterminatedExpression {
                    key: frame.owner.clone(),
                    value: frame.raw.clone(),
                });
            };

            frame.out.push_str(&frame.raw[frame.pos..start]);
            let body = frame.raw[body_start..close].to_string();
            let (name, default) = match body.split_once(DEFAULT_SEPARATOR) {
                Some((name, default)) => (name, Some(default)),
                None => (body.as_str(), None),
            };

            if let Some((value, refs)) = self.resolved.get(name) {
                frame.out.push_str(value);
                for reference in refs {
                    frame.note(reference.clone());
                }
                frame.pos = close + 1;
                continue;
            }

            if let Some(raw) = store.get(name) {
                if let Some(pos) = self.in_progress.iter().position(|k| k == name) {
                    let mut chain = self.in_progress[pos..].to_vec();
                    chain.push(name.to_string());
                    return Err(ConfigError::ExpressionCycle { chain });
                }
                self.in_progress.push(name.to_string());
                frame.pending = Some(close);
                return Ok(Step::Descend(Frame::new(Some(name), name, raw)));
            }

            if let Some(value) = self.env.var(name) {
                frame.out.push_str(&value);
                frame.pos = close + 1;
                continue;
            }

            if let Some(default) = default {
                frame.pending = Some(close);
                return Ok(Step::Descend(Frame::new(None, &frame.owner, default)));
            }

            frame.out.push_str(&frame.raw[start..=close]);
            frame.note(name.to_string());
            frame.pos = close + 1;
        }
    }

    fn complete(&mut self, frame: &Frame, is_root: bool) {
        match &frame.key {
            Some(key) => {
                self.in_progress.pop();
                for reference in &frame.refs {
                    self.record_unresolved(key, reference);
                }
                self.resolved
                    .insert(key.clone(), (frame.out.clone(), frame.refs.clone()));
            }
            // Defaults hand their references to the enclosing frame.
            None if is_root => {
                for reference in &frame.refs {
                    self.record_unresolved(&frame.owner, reference);
                }
            }
            None => {}
        }
    }

    fn record_unresolved(&mut self, owner: &str, name: &str) {
        let exists = self
            .unresolved
            .iter()
            .any(|u| u.key == owner && u.reference == name);
        if !exists {
            tracing::debug!("Unresolved reference '{}' in '{}'", name, owner);
            self.unresolved.push(UnresolvedReference {
                key: owner.to_string(),
                reference: name.to_string(),
            });
        }
    }
}

/// Offset of the `}` closing a marker whose body starts at `body[0]`,
/// counting nested `${` openings.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            depth += 1;
            i += 2;
            continue;
        }
        if bytes[i] == CLOSE {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapEnvironment;

    fn store(pairs: &[(&str, &str)]) -> ConfigStore {
        pairs.iter().copied().collect()
    }

    fn eval(store: &ConfigStore, env: &MapEnvironment, raw: &str) -> Result<String> {
        ExpressionEvaluator::new(store, env).evaluate("test", raw)
    }

    #[test]
    fn test_plain_value_unchanged() {
        let env = MapEnvironment::new();
        let result = eval(&ConfigStore::new(), &env, "just text, $ and } too").unwrap();
        assert_eq!(result, "just text, $ and } too");
    }

    #[test]
    fn test_store_reference() {
        let s = store(&[("name", "orders")]);
        let env = MapEnvironment::new();
        assert_eq!(eval(&s, &env, "svc-${name}-v1").unwrap(), "svc-orders-v1");
    }

    #[test]
    fn test_store_wins_over_env() {
        let s = store(&[("HOME", "/from/store")]);
        let env = MapEnvironment::new().with_var("HOME", "/from/env");
        assert_eq!(eval(&s, &env, "${HOME}").unwrap(), "/from/store");
    }

    #[test]
    fn test_env_fallback() {
        let env = MapEnvironment::new().with_var("USER_DIR", "/home/dev");
        assert_eq!(
            eval(&ConfigStore::new(), &env, "${USER_DIR}/app").unwrap(),
            "/home/dev/app"
        );
    }

    #[test]
    fn test_env_wins_over_default() {
        let env = MapEnvironment::new().with_var("PORT", "9090");
        assert_eq!(eval(&ConfigStore::new(), &env, "${PORT:8080}").unwrap(), "9090");
    }

    #[test]
    fn test_default_used_when_missing() {
        let env = MapEnvironment::new();
        assert_eq!(
            eval(&ConfigStore::new(), &env, "${missing:fallback}").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_empty_default() {
        let env = MapEnvironment::new();
        assert_eq!(eval(&ConfigStore::new(), &env, "[${missing:}]").unwrap(), "[]");
    }

    #[test]
    fn test_default_keeps_later_colons() {
        let env = MapEnvironment::new();
        assert_eq!(
            eval(&ConfigStore::new(), &env, "${url:http://localhost:80}").unwrap(),
            "http://localhost:80"
        );
    }

    #[test]
    fn test_nested_default_reference() {
        let s = store(&[("fallback.host", "backup")]);
        let env = MapEnvironment::new();
        assert_eq!(
            eval(&s, &env, "${primary.host:${fallback.host}}").unwrap(),
            "backup"
        );
    }

    #[test]
    fn test_nested_default_of_default() {
        let env = MapEnvironment::new();
        assert_eq!(eval(&ConfigStore::new(), &env, "${a:${b:deep}}").unwrap(), "deep");
    }

    #[test]
    fn test_missing_left_verbatim() {
        let env = MapEnvironment::new();
        let store = ConfigStore::new();
        let mut evaluator = ExpressionEvaluator::new(&store, &env);
        let result = evaluator.evaluate("db.url", "jdbc:${missing}/db").unwrap();

        assert_eq!(result, "jdbc:${missing}/db");
        assert_eq!(evaluator.unresolved().len(), 1);
        assert_eq!(evaluator.unresolved()[0].key, "db.url");
        assert_eq!(evaluator.unresolved()[0].reference, "missing");
    }

    #[test]
    fn test_unresolved_inside_default_stays_verbatim() {
        let env = MapEnvironment::new();
        assert_eq!(
            eval(&ConfigStore::new(), &env, "${a:${b}}").unwrap(),
            "${b}"
        );
    }

    #[test]
    fn test_chained_indirection() {
        let s = store(&[("a", "${b}"), ("b", "${c}"), ("c", "end")]);
        let env = MapEnvironment::new();
        let mut evaluator = ExpressionEvaluator::new(&s, &env);
        assert_eq!(evaluator.resolve_key("a").unwrap().as_deref(), Some("end"));
    }

    #[test]
    fn test_multiple_markers() {
        let s = store(&[("host", "h"), ("port", "1")]);
        let env = MapEnvironment::new();
        assert_eq!(eval(&s, &env, "${host}:${port}/${host}").unwrap(), "h:1/h");
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let env = MapEnvironment::new().with_var("RAW", "${not.expanded}");
        assert_eq!(
            eval(&ConfigStore::new(), &env, "${RAW}").unwrap(),
            "${not.expanded}"
        );
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let s = store(&[("A", "${A}")]);
        let env = MapEnvironment::new();
        let err = ExpressionEvaluator::new(&s, &env)
            .resolve_key("A")
            .unwrap_err();

        match err {
            ConfigError::ExpressionCycle { chain } => assert_eq!(chain, vec!["A", "A"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_transitive_cycle_reports_chain() {
        let s = store(&[("start", "${a}"), ("a", "x-${b}"), ("b", "${c:${a}}")]);
        let env = MapEnvironment::new();
        let err = ExpressionEvaluator::new(&s, &env)
            .resolve_key("start")
            .unwrap_err();

        assert_eq!(err.to_string(), "Expression cycle detected: a -> b -> a");
    }

    #[test]
    fn test_self_reference_with_default_is_still_cycle() {
        let s = store(&[("A", "${A:fallback}")]);
        let env = MapEnvironment::new();
        let result = ExpressionEvaluator::new(&s, &env).resolve_key("A");
        assert!(matches!(result, Err(ConfigError::ExpressionCycle { .. })));
    }

    #[test]
    fn test_unterminated_marker() {
        let env = MapEnvironment::new();
        let err = eval(&ConfigStore::new(), &env, "prefix ${open").unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedExpression { .. }));
    }

    #[test]
    fn test_unterminated_nested_marker() {
        let env = MapEnvironment::new();
        let err = eval(&ConfigStore::new(), &env, "${a:${b}").unwrap_err();
        assert!(matches!(err, ConfigError::UnterminatedExpression { .. }));
    }

    #[test]
    fn test_resolve_missing_key() {
        let env = MapEnvironment::new();
        let store = ConfigStore::new();
        let mut evaluator = ExpressionEvaluator::new(&store, &env);
        assert_eq!(evaluator.resolve_key("nope").unwrap(), None);
    }

    #[test]
    fn test_non_ascii_around_marker() {
        let s = store(&[("city", "Zürich")]);
        let env = MapEnvironment::new();
        assert_eq!(eval(&s, &env, "→ ${city} ←").unwrap(), "→ Zürich ←");
    }

    #[test]
    fn test_long_chain_resolves() {
        let mut s = ConfigStore::new();
        for i in 0..5000 {
            s.put(format!("k{}", i), format!("${{k{}}}", i + 1));
        }
        s.put("k5000", "end");
        let env = MapEnvironment::new();
        let mut evaluator = ExpressionEvaluator::new(&s, &env);

        assert_eq!(evaluator.resolve_key("k0").unwrap().as_deref(), Some("end"));
        assert_eq!(evaluator.resolve_key("k2500").unwrap().as_deref(), Some("end"));
    }

    #[test]
    fn test_long_cycle_reports_full_chain() {
        let mut s = ConfigStore::new();
        for i in 0..3000 {
            s.put(format!("k{}", i), format!("${{k{}}}", (i + 1) % 3000));
        }
        let env = MapEnvironment::new();
        let err = ExpressionEvaluator::new(&s, &env)
            .resolve_key("k0")
            .unwrap_err();

        match err {
            ConfigError::ExpressionCycle { chain } => {
                assert_eq!(chain.len(), 3001);
                assert_eq!(chain.first().map(String::as_str), Some("k0"));
                assert_eq!(chain.last().map(String::as_str), Some("k0"));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_reported_for_referencing_keys() {
        let s = store(&[("a", "${b}"), ("b", "x-${missing}"), ("c", "${a}")]);
        let env = MapEnvironment::new();
        let mut evaluator = ExpressionEvaluator::new(&s, &env);
        for key in ["a", "b", "c"] {
            assert_eq!(evaluator.resolve_key(key).unwrap().as_deref(), Some("x-${missing}"));
        }

        let reported: Vec<(&str, &str)> = evaluator
            .unresolved()
            .iter()
            .map(|u| (u.key.as_str(), u.reference.as_str()))
            .collect();
        assert_eq!(reported, vec![("b", "missing"), ("a", "missing"), ("c", "missing")]);
    }

    #[test]
    fn test_unresolved_in_default_reported_for_owner() {
        let s = store(&[("url", "${host:${fallback}}")]);
        let env = MapEnvironment::new();
        let mut evaluator = ExpressionEvaluator::new(&s, &env);
        evaluator.resolve_key("url").unwrap();

        assert_eq!(evaluator.unresolved().len(), 1);
        assert_eq!(evaluator.unresolved()[0].key, "url");
        assert_eq!(evaluator.unresolved()[0].reference, "fallback");
    }

    #[test]
    fn test_evaluator_usable_after_cycle() {
        let s = store(&[("a", "${b}"), ("b", "${a}"), ("ok", "fine")]);
        let env = MapEnvironment::new();
        let mut evaluator = ExpressionEvaluator::new(&s, &env);

        assert!(evaluator.resolve_key("a").is_err());
        assert_eq!(evaluator.resolve_key("ok").unwrap().as_deref(), Some("fine"));
    }

    #[test]
    fn test_find_close_depth() {
        assert_eq!(find_close("a}"), Some(1));
        assert_eq!(find_close("a:${b}}"), Some(6));
        assert_eq!(find_close("a:${b}"), None);
    }
}

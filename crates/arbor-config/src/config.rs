//! The [`Config`] facade: an owned tree plus resolver settings.

use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigResult;
use crate::node::{MergeOutcome, Node, Scope};
use crate::provider::MacroHandler;
use crate::resolve::{LenientSink, LookupOptions, Resolver, ResolverOptions, StrictSink, WarningSink};
use crate::secret::{self, ShowMode};
use crate::value::Value;

/// A configuration tree ready for lookups.
///
/// Values are stored raw: secrets stay tagged and macros unexpanded. Reads
/// through [`Config::lookup`], [`Config::data`] and
/// [`Config::resolved_data`] render secrets according to a [`ShowMode`].
#[derive(Clone)]
pub struct Config {
    root: Node,
    options: ResolverOptions,
    sink: Arc<dyn WarningSink>,
    handler: Option<Arc<dyn MacroHandler>>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("keys", &self.root.len())
            .field("options", &self.options)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Node::new())
    }
}

impl From<Node> for Config {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl Config {
    /// Wrap a tree with default, lenient settings.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self {
            root,
            options: ResolverOptions::default(),
            sink: Arc::new(LenientSink),
            handler: None,
        }
    }

    /// A config made entirely of secrets: every primitive leaf is tagged.
    #[must_use]
    pub fn from_secrets(mut secrets: Node) -> Self {
        secret::tag_node(&mut secrets);
        Self::new(secrets)
    }

    /// Merge a secrets tree underneath the current tree.
    ///
    /// Secret leaves are tagged first. Keys already present in the main
    /// tree win.
    #[must_use]
    pub fn with_secrets(mut self, mut secrets: Node) -> Self {
        secret::tag_node(&mut secrets);
        let outcome = self.root.merge(&secrets);
        if !outcome.skipped.is_empty() {
            debug!(skipped = ?outcome.skipped, "Secret keys shadowed by main config");
        }
        self.root = outcome.merged;
        self
    }

    /// Merge `other` underneath the current tree, keeping existing values.
    pub fn include(&mut self, other: &Node) -> MergeOutcome {
        let outcome = self.root.merge(other);
        self.root = outcome.merged.clone();
        outcome
    }

    /// Replace the resolver options.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Route macro issues to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fail on the first macro issue.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_sink(Arc::new(StrictSink))
    }

    /// Resolve otherwise unknown macro names through `handler`.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn MacroHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// The raw tree.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the raw tree.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// A resolver over the tree with this config's settings.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        let resolver = Resolver::new(&self.root)
            .with_options(self.options)
            .with_sink(Arc::clone(&self.sink));
        match &self.handler {
            Some(handler) => resolver.with_handler(Arc::clone(handler)),
            None => resolver,
        }
    }

    /// Look up `path` from the root, expand it and render its secrets.
    ///
    /// # Errors
    ///
    /// Returns the error raised in strict mode or by a fail-fast handler.
    pub fn lookup(&self, path: &str, options: &LookupOptions) -> ConfigResult<Option<Value>> {
        self.lookup_in(path, &Scope::root(), options)
    }

    /// Look up `path` relative to `scope`.
    ///
    /// # Errors
    ///
    /// Returns the error raised in strict mode or by a fail-fast handler.
    pub fn lookup_in(
        &self,
        path: &str,
        scope: &Scope,
        options: &LookupOptions,
    ) -> ConfigResult<Option<Value>> {
        Ok(self
            .resolver()
            .lookup(path, scope, options)?
            .map(|found| secret::render(&found.value, options.show)))
    }

    /// The tree with secrets rendered, macros left as written.
    #[must_use]
    pub fn data(&self, show: ShowMode) -> Node {
        secret::render_node(&self.root, show)
    }

    /// The tree with every string leaf expanded in its own scope, then
    /// rendered.
    ///
    /// # Errors
    ///
    /// Returns the error raised in strict mode or by a fail-fast handler.
    pub fn resolved_data(&self, show: ShowMode) -> ConfigResult<Node> {
        let resolver = self.resolver();
        let expanded = expand_node(&resolver, &self.root, &Scope::root())?;
        Ok(secret::render_node(&expanded, show))
    }

    /// See [`Node::merge`].
    #[must_use]
    pub fn merge(&self, other: &Node) -> MergeOutcome {
        self.root.merge(other)
    }

    /// See [`Node::sorted`].
    #[must_use]
    pub fn sorted(&self, reverse: bool) -> Node {
        self.root.sorted(reverse)
    }
}

fn expand_node(resolver: &Resolver<'_>, node: &Node, scope: &Scope) -> ConfigResult<Node> {
    let mut out = Node::new();
    for (key, value) in node.iter() {
        let value = match value {
            Value::Node(child) => Value::Node(expand_node(resolver, child, &scope.child(key))?),
            other => expand_value(resolver, other, scope)?,
        };
        out.set(key, value);
    }
    Ok(out)
}

/// Strings expand in `scope`; list items share the scope of their list.
fn expand_value(resolver: &Resolver<'_>, value: &Value, scope: &Scope) -> ConfigResult<Value> {
    Ok(match value {
        Value::String(text) => Value::String(resolver.expand(text, scope)?),
        Value::Node(node) => Value::Node(expand_node(resolver, node, scope)?),
        Value::List(items) => Value::List(
            items
                .iter()
                .map(|item| expand_value(resolver, item, scope))
                .collect::<ConfigResult<_>>()?,
        ),
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ConfigError;
    use crate::testing::tree;

    #[test]
    fn test_secrets_rendered_by_show_mode() {
        let config = Config::from_secrets(tree(json!({"ccc": "value"})));

        let shown = config
            .lookup("ccc", &LookupOptions::new().with_show(ShowMode::Plaintext))
            .unwrap();
        assert_eq!(shown, Some(Value::from("value")));

        let hidden = config.lookup("ccc", &LookupOptions::new()).unwrap();
        assert_eq!(hidden, Some(Value::from("********")));
    }

    #[test]
    fn test_with_secrets_main_wins() {
        let config = Config::new(tree(json!({"user": "app", "password": "override"})))
            .with_secrets(tree(json!({"password": "pw", "port": 5432})));

        let plain = LookupOptions::new().with_show(ShowMode::Plaintext);
        assert_eq!(
            config.lookup("password", &plain).unwrap(),
            Some(Value::from("override"))
        );
        assert_eq!(config.lookup("port", &plain).unwrap(), Some(Value::Integer(5432)));
        assert_eq!(
            config.lookup("port", &LookupOptions::new()).unwrap(),
            Some(Value::from("********"))
        );
    }

    #[test]
    fn test_secret_inside_macro_is_obfuscated() {
        let config = Config::new(tree(json!({"dsn": "postgres://app:${password}@db"})))
            .with_secrets(tree(json!({"password": "hunter2"})));

        let hidden = config.lookup("dsn", &LookupOptions::new()).unwrap().unwrap();
        assert_eq!(hidden, Value::from("postgres://app:********@db"));

        let shown = config
            .lookup("dsn", &LookupOptions::new().with_show(ShowMode::Plaintext))
            .unwrap()
            .unwrap();
        assert_eq!(shown, Value::from("postgres://app:hunter2@db"));
    }

    #[test]
    fn test_include_first_wins() {
        let mut config = Config::new(tree(json!({"x": 2, "y": 3})));
        let outcome = config.include(&tree(json!({"x": 1, "z": 4})));

        assert_eq!(outcome.added, vec!["z"]);
        assert_eq!(outcome.skipped, vec!["x"]);
        assert_eq!(config.root().get("x"), Some(&Value::Integer(2)));
        assert_eq!(config.root().get("z"), Some(&Value::Integer(4)));
    }

    #[test]
    fn test_data_and_resolved_data() {
        let config = Config::new(tree(json!({
            "host": "db",
            "svc": {"url": "http://${host}:${port}", "port": 80, "tags": ["${host}", {"k": "${port}"}]},
        })))
        .with_secrets(tree(json!({"token": "t0k"})));

        let raw = config.data(ShowMode::Obfuscated);
        assert_eq!(
            raw.child("svc").unwrap().get("url"),
            Some(&Value::from("http://${host}:${port}"))
        );
        assert_eq!(raw.get("token"), Some(&Value::from("********")));

        let resolved = config.resolved_data(ShowMode::Plaintext).unwrap();
        let svc = resolved.child("svc").unwrap();
        assert_eq!(svc.get("url"), Some(&Value::from("http://db:80")));
        let tags = svc.get("tags").unwrap().as_list().unwrap();
        assert_eq!(tags[0], Value::from("db"));
        assert_eq!(tags[1].as_node().unwrap().get("k"), Some(&Value::from("80")));
        assert_eq!(resolved.get("token"), Some(&Value::from("t0k")));
    }

    #[test]
    fn test_strict_config_fails_on_missing_macro() {
        let config = Config::new(tree(json!({"s": "${nope}"}))).strict();
        assert!(matches!(
            config.lookup("s", &LookupOptions::new()),
            Err(ConfigError::MacroMissing { .. })
        ));
        assert!(config.resolved_data(ShowMode::Obfuscated).is_err());
    }

    #[test]
    fn test_lookup_in_scope() {
        let config = Config::new(tree(json!({"A": {"A1": "123", "B": {}}})));
        let value = config
            .lookup_in("A1", &Scope::from_keys(["A", "B"]), &LookupOptions::new())
            .unwrap();
        assert_eq!(value, Some(Value::from("123")));
    }

    #[test]
    fn test_not_found_is_none() {
        let config = Config::new(tree(json!({"a": 1})));
        assert_eq!(config.lookup("b", &LookupOptions::new()).unwrap(), None);
    }

    #[test]
    fn test_resolved_data_expands_nodes_nested_in_list_items() {
        let config = Config::new(tree(json!({
            "host": "h",
            "svc": {"port": 80, "items": [{"deep": {"u": "${host}:${port}", "deeper": {"v": "${host}"}}}]},
        })))
        .strict();

        let resolved = config.resolved_data(ShowMode::Plaintext).unwrap();
        let items = resolved.child("svc").unwrap().get("items").unwrap().as_list().unwrap();
        let deep = items[0].as_node().unwrap().child("deep").unwrap();
        assert_eq!(deep.get("u"), Some(&Value::from("h:80")));
        assert_eq!(deep.child("deeper").unwrap().get("v"), Some(&Value::from("h")));
    }

    #[test]
    fn test_lookup_in_missing_scope_inherits() {
        let config = Config::new(tree(json!({"A": {"A1": "123"}})));
        let value = config
            .lookup_in("A1", &Scope::from_keys(["A", "nope", "x"]), &LookupOptions::new())
            .unwrap();
        assert_eq!(value, Some(Value::from("123")));
    }
}

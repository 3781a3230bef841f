//! Scoped lookup with upward inheritance and macro expansion.
//!
//! A lookup walks a path from a starting scope as far as the tree allows.
//! When the walk stops short, the unresolved tail is retried from the
//! parent of the scope where it stopped, and so on up to the root. A value
//! defined near an ancestor is therefore visible from every descendant
//! unless a nearer definition shadows it.
//!
//! String results are then macro-expanded (see [`expand`](self::expand)).

mod expand;
mod sink;

pub use sink::{LenientSink, MacroIssue, NoopSink, StrictSink, WarningSink};

use std::sync::Arc;

use crate::error::ConfigResult;
use crate::node::{Node, Scope};
use crate::path::{self, Component};
use crate::provider::MacroHandler;
use crate::secret::ShowMode;
use crate::value::Value;
use expand::Expansion;

/// Per-lookup switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Only inherit when exactly one trailing component is unresolved.
    pub simple: bool,
    /// Never retry against ancestor scopes.
    pub no_inherit: bool,
    /// How secrets are rendered by callers that render (the [`Config`]
    /// facade). The resolver itself always returns raw values.
    ///
    /// [`Config`]: crate::Config
    pub show: ShowMode,
}

impl LookupOptions {
    /// Default options: full inheritance, secrets obfuscated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict inheritance to a single unresolved trailing component.
    #[must_use]
    pub fn simple(mut self) -> Self {
        self.simple = true;
        self
    }

    /// Disable inheritance.
    #[must_use]
    pub fn no_inherit(mut self) -> Self {
        self.no_inherit = true;
        self
    }

    /// Set the secret rendering mode.
    #[must_use]
    pub fn with_show(mut self, show: ShowMode) -> Self {
        self.show = show;
        self
    }
}

/// Which scope a string's macros are resolved in when the string itself
/// was found by inheritance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpandScope {
    /// The scope that physically holds the string. A value reads the same
    /// wherever it is inherited into.
    #[default]
    Defining,
    /// The descendant scope the lookup started from, so inherited
    /// templates pick up the requester's local overrides.
    Requesting,
}

/// Resolver-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Scope used to expand inherited strings.
    pub expand_in: ExpandScope,
}

/// A located value before expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a> {
    /// The stored value.
    pub value: &'a Value,
    /// Scope the final path component was resolved against. For inherited
    /// hits this is the descendant scope, not the ancestor that matched.
    pub context: Scope,
    /// Scope of the node that holds the value.
    pub defined_in: Scope,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The value, strings macro-expanded, secrets still tagged.
    pub value: Value,
    /// See [`Found::context`].
    pub context: Scope,
    /// See [`Found::defined_in`].
    pub defined_in: Scope,
}

/// Lookup and expansion over a borrowed tree.
#[derive(Clone)]
pub struct Resolver<'a> {
    root: &'a Node,
    options: ResolverOptions,
    sink: Arc<dyn WarningSink>,
    handler: Option<Arc<dyn MacroHandler>>,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("options", &self.options)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Resolver<'a> {
    /// A lenient resolver with no custom macro handler.
    #[must_use]
    pub fn new(root: &'a Node) -> Self {
        Self {
            root,
            options: ResolverOptions::default(),
            sink: Arc::new(LenientSink),
            handler: None,
        }
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

    /// Consult `handler` for macro names the tree cannot resolve.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn MacroHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// The tree being resolved.
    #[must_use]
    pub fn root(&self) -> &'a Node {
        self.root
    }

    /// Resolver settings.
    #[must_use]
    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Look up `path` from `context` and expand the result.
    ///
    /// `Ok(None)` means not found. Errors only come from a strict sink or a
    /// fail-fast macro handler.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the warning sink or macro handler.
    pub fn lookup(
        &self,
        path: &str,
        context: &Scope,
        options: &LookupOptions,
    ) -> ConfigResult<Option<Resolved>> {
        let mut state = Expansion::default();
        let resolved = self.lookup_tracked(path, context, options, &mut state)?;
        Ok(resolved.map(|mut resolved| {
            if let Value::String(text) = &resolved.value {
                resolved.value = Value::String(state.restore(text));
            }
            resolved
        }))
    }

    /// Expand the macros in `text` as if it were stored at `scope`.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the warning sink or macro handler.
    pub fn expand(&self, text: &str, scope: &Scope) -> ConfigResult<String> {
        let mut state = Expansion::default();
        let expanded = expand::expand(self, text, scope, &LookupOptions::default(), &mut state)?;
        Ok(state.restore(&expanded))
    }

    /// Locate `path` from `context` without expanding anything.
    #[must_use]
    pub fn find(&self, path: &str, context: &Scope, options: &LookupOptions) -> Option<Found<'a>> {
        let mut scope = context.clone();
        let mut names = Vec::new();
        for component in path::parse(path) {
            match component {
                Component::Root => scope = Scope::root(),
                Component::Parent => scope = scope.parent().unwrap_or_default(),
                Component::Name(name) => names.push(name),
            }
        }
        if names.is_empty() {
            return None;
        }
        self.find_names(&names, scope, options)
    }

    fn find_names(&self, names: &[String], scope: Scope, options: &LookupOptions) -> Option<Found<'a>> {
        let (mut current, mut node) = match self.root.at(&scope) {
            Some(node) => (scope, node),
            None if options.no_inherit => return None,
            None => self.nearest_existing(&scope),
        };
        let mut remaining = names;

        while let Some((first, rest)) = remaining.split_first() {
            match node.get(first) {
                Some(value) if rest.is_empty() => {
                    return Some(Found {
                        value,
                        context: current.clone(),
                        defined_in: current,
                    });
                },
                Some(Value::Node(child)) => {
                    node = child;
                    current = current.child(first);
                    remaining = rest;
                },
                _ => break,
            }
        }

        if options.no_inherit || (options.simple && remaining.len() != 1) {
            return None;
        }

        let parent = current.parent()?;
        let inherited = self.find_names(remaining, parent, options)?;
        Some(Found {
            value: inherited.value,
            context: current,
            defined_in: inherited.defined_in,
        })
    }

    /// The deepest ancestor of `scope` present in the tree. Scopes that do
    /// not exist (nodes nested in list items, caller-supplied paths) inherit
    /// from there.
    fn nearest_existing(&self, scope: &Scope) -> (Scope, &'a Node) {
        scope
            .ancestors()
            .find_map(|ancestor| self.root.at(&ancestor).map(|node| (ancestor, node)))
            .unwrap_or_else(|| (Scope::root(), self.root))
    }

    pub(crate) fn lookup_tracked(
        &self,
        path: &str,
        context: &Scope,
        options: &LookupOptions,
        state: &mut Expansion,
    ) -> ConfigResult<Option<Resolved>> {
        let Some(found) = self.find(path, context, options) else {
            return Ok(None);
        };

        let value = match found.value {
            Value::String(text) => {
                let scope = match self.options.expand_in {
                    ExpandScope::Defining => &found.defined_in,
                    ExpandScope::Requesting => &found.context,
                };
                Value::String(expand::expand(self, text, scope, options, state)?)
            },
            other => other.clone(),
        };

        Ok(Some(Resolved {
            value,
            context: found.context,
            defined_in: found.defined_in,
        }))
    }

    pub(crate) fn report(&self, issue: &MacroIssue) -> ConfigResult<()> {
        self.sink.report(issue)
    }

    pub(crate) fn handler(&self) -> Option<&Arc<dyn MacroHandler>> {
        self.handler.as_ref()
    }
}

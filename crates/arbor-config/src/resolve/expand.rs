//! `${name}` macro expansion.
//!
//! The first remaining `${name}` in the string is resolved, every
//! occurrence of that exact token is substituted, and scanning starts over.
//! Names that cannot be substituted (missing, or already being expanded)
//! have their delimiters swapped for private-use characters so the scan
//! moves past them; the outermost caller undoes the swap. Unresolvable
//! macros therefore survive as literal `${name}` text, and expanding a
//! result a second time changes nothing.
//!
//! Expansion works on raw values: secret markers are substituted as-is and
//! only rendered by the caller.

use std::sync::LazyLock;

use regex::Regex;

use super::{LookupOptions, MacroIssue, Resolver};
use crate::error::ConfigResult;
use crate::node::Scope;
use crate::secret::{self, ShowMode};
use crate::value::Value;

static MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]+)\}").expect("invalid regex"));

const HIDDEN_OPEN: char = '\u{E000}';
const HIDDEN_CLOSE: char = '\u{E001}';

/// State shared by one top-level expansion and every nested lookup it
/// triggers.
///
/// `in_progress` holds the macro names currently being resolved by
/// enclosing expansions. `hidden` records every name whose token was
/// hidden, so only those are turned back into `${name}` at the end.
#[derive(Debug, Default)]
pub(crate) struct Expansion {
    in_progress: Vec<String>,
    hidden: Vec<String>,
}

impl Expansion {
    /// Undo every `hide` made during this expansion.
    pub(crate) fn restore(&self, text: &str) -> String {
        self.hidden.iter().fold(text.to_owned(), |out, name| {
            out.replace(&hidden_token(name), &format!("${{{name}}}"))
        })
    }

    fn hide(&mut self, text: &str, name: &str) -> String {
        if !self.hidden.iter().any(|n| n == name) {
            self.hidden.push(name.to_owned());
        }
        text.replace(&format!("${{{name}}}"), &hidden_token(name))
    }

    fn hide_all(&mut self, text: &str) -> String {
        let mut out = text.to_owned();
        while let Some(name) = first_macro(&out) {
            out = self.hide(&out, &name);
        }
        out
    }
}

/// Expand `text` as stored at `scope`.
///
/// The result keeps unresolvable tokens hidden; the outermost caller
/// restores them with [`Expansion::restore`]. A nested value that could
/// not be fully expanded in its own scope is therefore never re-resolved
/// in the scope of the string it is substituted into.
pub(super) fn expand(
    resolver: &Resolver<'_>,
    text: &str,
    scope: &Scope,
    options: &LookupOptions,
    state: &mut Expansion,
) -> ConfigResult<String> {
    let depth = state.in_progress.len();
    let result = scan(resolver, text, scope, options, state);
    state.in_progress.truncate(depth);
    result
}

fn scan(
    resolver: &Resolver<'_>,
    text: &str,
    scope: &Scope,
    options: &LookupOptions,
    state: &mut Expansion,
) -> ConfigResult<String> {
    let mut out = text.to_owned();

    while let Some(name) = first_macro(&out) {
        let token = format!("${{{name}}}");

        if state.in_progress.contains(&name) {
            resolver.report(&issue(IssueKind::Circular, &name, text))?;
            out = state.hide(&out, &name);
            continue;
        }

        state.in_progress.push(name.clone());
        let resolved = resolve_name(resolver, &name, scope, options, state);
        state.in_progress.pop();

        match resolved? {
            None => {
                resolver.report(&issue(IssueKind::Missing, &name, text))?;
                out = state.hide(&out, &name);
            },
            Some(value) if !value.is_primitive() => {
                resolver.report(&issue(IssueKind::NonPrimitive, &name, text))?;
                return Ok(state.hide_all(&out));
            },
            Some(value) => {
                let replacement = value.to_string();
                out = out.replace(&token, &replacement);
                if replacement.contains(&token) {
                    resolver.report(&issue(IssueKind::Circular, &name, text))?;
                    out = state.hide(&out, &name);
                }
            },
        }
    }

    Ok(out)
}

/// Resolve one macro name: the tree first (absolute names from the root,
/// others from `scope` with inheritance), then the custom handler.
fn resolve_name(
    resolver: &Resolver<'_>,
    name: &str,
    scope: &Scope,
    options: &LookupOptions,
    state: &mut Expansion,
) -> ConfigResult<Option<Value>> {
    let nested = LookupOptions {
        no_inherit: false,
        ..*options
    };
    if let Some(resolved) = resolver.lookup_tracked(name, scope, &nested, state)? {
        return Ok(Some(resolved.value));
    }

    match resolver.handler() {
        Some(handler) => handler.resolve(name, scope, resolver),
        None => Ok(None),
    }
}

fn first_macro(text: &str) -> Option<String> {
    MACRO
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
}

fn hidden_token(name: &str) -> String {
    format!("{HIDDEN_OPEN}{name}{HIDDEN_CLOSE}")
}

enum IssueKind {
    Missing,
    Circular,
    NonPrimitive,
}

/// Build an issue whose text is safe to log.
fn issue(kind: IssueKind, name: &str, text: &str) -> MacroIssue {
    let name = name.to_owned();
    let text = secret::render_str(text, ShowMode::Obfuscated).to_string();
    match kind {
        IssueKind::Missing => MacroIssue::Missing { name, text },
        IssueKind::Circular => MacroIssue::Circular { name, text },
        IssueKind::NonPrimitive => MacroIssue::NonPrimitive { name, text },
    }
}

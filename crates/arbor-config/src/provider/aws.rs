//! `${aws-secret:[store/]key}` macros.

use tracing::{debug, trace, warn};

use super::cache::{SecretCache, SecretCacheKey};
use super::client::{AwsCliSecretStore, SecretStoreClient};
use super::{Environment, MacroHandler, ProcessEnvironment};
use crate::error::{ConfigError, ConfigResult};
use crate::node::Scope;
use crate::resolve::{LookupOptions, Resolver};
use crate::secret::{self, ShowMode};
use crate::value::Value;

/// Macro name prefix handled by [`AwsSecretHandler`].
pub const AWS_SECRET_PREFIX: &str = "aws-secret:";

/// Where the handler finds its ambient settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSecretOptions {
    /// Config key naming the default store, looked up from the macro's
    /// scope with inheritance.
    pub identity_key: String,
    /// Environment variable naming the default store when the tree does
    /// not define one.
    pub identity_env: String,
    /// Environment variable naming the credential profile.
    pub profile_env: String,
    /// Fail the lookup when the store is unreachable instead of treating
    /// the secret as missing.
    pub fail_fast: bool,
}

impl Default for AwsSecretOptions {
    fn default() -> Self {
        Self {
            identity_key: "IDENTITY".to_owned(),
            identity_env: "IDENTITY".to_owned(),
            profile_env: "AWS_PROFILE".to_owned(),
            fail_fast: false,
        }
    }
}

/// Resolves `aws-secret:` macros against a secret store.
///
/// `aws-secret:store/key` reads `key` from bundle `store`; the store may
/// itself contain `/`, only the last one separates the key. With no store
/// (`aws-secret:key`) the store is the identity value visible from the
/// macro's scope, or the identity environment variable.
///
/// Values are tagged as secrets and memoized per store, key and active
/// profile.
#[derive(Debug, Clone)]
pub struct AwsSecretHandler<C = AwsCliSecretStore, E = ProcessEnvironment> {
    client: C,
    env: E,
    cache: SecretCache,
    options: AwsSecretOptions,
}

impl AwsSecretHandler {
    /// Handler over the `aws` CLI and the process environment.
    #[must_use]
    pub fn aws_cli() -> Self {
        Self::new(AwsCliSecretStore::new(), ProcessEnvironment)
    }
}

impl<C: SecretStoreClient, E: Environment> AwsSecretHandler<C, E> {
    /// Handler over `client`, reading ambient settings from `env`.
    #[must_use]
    pub fn new(client: C, env: E) -> Self {
        Self {
            client,
            env,
            cache: SecretCache::new(),
            options: AwsSecretOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: AwsSecretOptions) -> Self {
        self.options = options;
        self
    }

    /// Share `cache` with other handlers.
    #[must_use]
    pub fn with_cache(mut self, cache: SecretCache) -> Self {
        self.cache = cache;
        self
    }

    /// Fail lookups on store errors.
    #[must_use]
    pub fn fail_fast(mut self) -> Self {
        self.options.fail_fast = true;
        self
    }

    /// The memoization cache.
    #[must_use]
    pub fn cache(&self) -> &SecretCache {
        &self.cache
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &AwsSecretOptions {
        &self.options
    }

    fn identity(&self, scope: &Scope, resolver: &Resolver<'_>) -> ConfigResult<Option<String>> {
        let options = LookupOptions::default();
        if let Some(found) = resolver.find(&self.options.identity_key, scope, &options) {
            let value = match found.value {
                // An identity defined through another secret macro would
                // recurse back into this handler.
                Value::String(text) if !text.contains(AWS_SECRET_PREFIX) => {
                    Value::String(resolver.expand(text, &found.defined_in)?)
                },
                other => other.clone(),
            };
            if value.is_primitive() {
                let identity = secret::render(&value, ShowMode::Plaintext).to_string();
                if !identity.is_empty() {
                    return Ok(Some(identity));
                }
            }
        }
        Ok(self.env.get(&self.options.identity_env))
    }

    fn fetch(&self, store: &str, key: &str, profile: Option<&str>) -> ConfigResult<Option<Value>> {
        let bundle = match self.client.fetch(store, profile) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(store, error = %e, "Secret store unavailable");
                if self.options.fail_fast {
                    return Err(ConfigError::SecretStoreUnavailable {
                        store: store.to_owned(),
                        message: e.to_string(),
                    });
                }
                return Ok(None);
            },
        };

        let Some(raw) = bundle.get(key) else {
            debug!(store, key, "Key not present in secret bundle");
            return Ok(None);
        };

        let value = match raw {
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Integer(i),
                (None, Some(f)) => Value::Float(f),
                (None, None) => return Ok(None),
            },
            _ => {
                warn!(store, key, "Secret is not a primitive value");
                return Ok(None);
            },
        };
        Ok(Some(secret::encode(&value)))
    }
}

impl<C: SecretStoreClient, E: Environment> MacroHandler for AwsSecretHandler<C, E> {
    fn resolve(
        &self,
        name: &str,
        scope: &Scope,
        resolver: &Resolver<'_>,
    ) -> ConfigResult<Option<Value>> {
        let Some(specifier) = name.strip_prefix(AWS_SECRET_PREFIX) else {
            return Ok(None);
        };

        let (store, key) = match specifier.rsplit_once('/') {
            Some((store, key)) => (Some(store).filter(|s| !s.is_empty()), key),
            None => (None, specifier),
        };
        if key.is_empty() {
            return Ok(None);
        }

        let store = match store {
            Some(store) => store.to_owned(),
            None => match self.identity(scope, resolver)? {
                Some(identity) => identity,
                None => {
                    warn!(
                        key,
                        identity_key = %self.options.identity_key,
                        "No secret store named for secret and no identity configured"
                    );
                    return Ok(None);
                },
            },
        };

        let profile = self.env.get(&self.options.profile_env);
        let cache_key = SecretCacheKey::new(&store, key, profile.as_deref());
        if let Some(value) = self.cache.get(&cache_key) {
            trace!(store = %store, key, "Secret cache hit");
            return Ok(Some(value));
        }

        debug!(store = %store, key, profile = ?profile, "Secret cache miss");
        let value = self.fetch(&store, key, profile.as_deref())?;
        if let Some(value) = &value {
            self.cache.insert(cache_key, value.clone());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::provider::StaticEnvironment;
    use crate::testing::{MockSecretStore, tree};

    fn handler(store: &MockSecretStore, env: StaticEnvironment) -> AwsSecretHandler<MockSecretStore, StaticEnvironment> {
        AwsSecretHandler::new(store.clone(), env)
    }

    fn lookup_with(
        root: &crate::node::Node,
        handler: AwsSecretHandler<MockSecretStore, StaticEnvironment>,
        path: &str,
    ) -> ConfigResult<Option<Value>> {
        Resolver::new(root)
            .with_handler(Arc::new(handler))
            .lookup(path, &Scope::root(), &LookupOptions::default())
            .map(|found| found.map(|r| r.value))
    }

    #[test]
    fn test_explicit_store_is_fetched_and_tagged() {
        let store = MockSecretStore::new().with_secret("app/prod", "password", json!("pw"));
        let root = tree(json!({"dsn": "user:${aws-secret:app/prod/password}@db"}));

        let value = lookup_with(&root, handler(&store, StaticEnvironment::new()), "dsn")
            .unwrap()
            .unwrap();

        let text = value.as_str().unwrap();
        assert!(secret::contains_secret(text));
        assert_eq!(
            secret::render_str(text, ShowMode::Plaintext),
            Value::from("user:pw@db")
        );
        assert_eq!(
            secret::render_str(text, ShowMode::Obfuscated),
            Value::from("user:********@db")
        );
        assert_eq!(store.calls_for("app/prod"), 1);
    }

    #[test]
    fn test_store_from_inherited_identity() {
        let store = MockSecretStore::new().with_secret("C4AppConfigFoo", "port", json!(5432));
        let root = tree(json!({
            "IDENTITY": "C4AppConfigFoo",
            "svc": {"port": "${aws-secret:port}"},
        }));

        let value = lookup_with(&root, handler(&store, StaticEnvironment::new()), "svc/port")
            .unwrap()
            .unwrap();

        assert_eq!(
            secret::render(&value, ShowMode::Plaintext),
            Value::Integer(5432)
        );
    }

    #[test]
    fn test_store_from_environment_fallback() {
        let store = MockSecretStore::new().with_secret("from-env", "k", json!("v"));
        let root = tree(json!({"s": "${aws-secret:k}"}));
        let env = StaticEnvironment::new().with_var("IDENTITY", "from-env");

        let value = lookup_with(&root, handler(&store, env), "s").unwrap().unwrap();
        assert_eq!(secret::render(&value, ShowMode::Plaintext), Value::from("v"));
    }

    #[test]
    fn test_no_identity_is_missing() {
        let store = MockSecretStore::new();
        let root = tree(json!({"s": "${aws-secret:k}"}));

        let value = lookup_with(&root, handler(&store, StaticEnvironment::new()), "s")
            .unwrap()
            .unwrap();
        assert_eq!(value, Value::from("${aws-secret:k}"));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_repeated_lookups_fetch_once() {
        let store = MockSecretStore::new().with_secret("s", "k", json!("v"));
        let root = tree(json!({"a": "${aws-secret:s/k}", "b": "x-${aws-secret:s/k}"}));
        let resolver = Resolver::new(&root).with_handler(Arc::new(handler(&store, StaticEnvironment::new())));

        for path in ["a", "b", "a"] {
            resolver
                .lookup(path, &Scope::root(), &LookupOptions::default())
                .unwrap()
                .unwrap();
        }
        assert_eq!(store.calls_for("s"), 1);
    }

    #[test]
    fn test_profile_change_refetches() {
        let store = MockSecretStore::new().with_secret("s", "k", json!("v"));
        let root = tree(json!({"a": "${aws-secret:s/k}"}));
        let cache = SecretCache::new();

        for profile in ["dev", "prod", "dev"] {
            let env = StaticEnvironment::new().with_var("AWS_PROFILE", profile);
            let handler = handler(&store, env).with_cache(cache.clone());
            lookup_with(&root, handler, "a").unwrap().unwrap();
        }

        assert_eq!(store.calls_for("s"), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            store.calls(),
            vec![
                ("s".to_owned(), Some("dev".to_owned())),
                ("s".to_owned(), Some("prod".to_owned())),
            ]
        );
    }

    #[test]
    fn test_store_failure_is_lenient_by_default() {
        let store = MockSecretStore::new().with_failure("down");
        let root = tree(json!({"a": "${aws-secret:down/k}"}));

        let value = lookup_with(&root, handler(&store, StaticEnvironment::new()), "a")
            .unwrap()
            .unwrap();
        assert_eq!(value, Value::from("${aws-secret:down/k}"));
    }

    #[test]
    fn test_store_failure_fail_fast() {
        let store = MockSecretStore::new().with_failure("down");
        let root = tree(json!({"a": "${aws-secret:down/k}"}));

        let err = lookup_with(
            &root,
            handler(&store, StaticEnvironment::new()).fail_fast(),
            "a",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SecretStoreUnavailable { ref store, .. } if store == "down"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let store = MockSecretStore::new().with_failure("down");
        let root = tree(json!({"a": "${aws-secret:down/k}"}));
        let resolver = Resolver::new(&root).with_handler(Arc::new(handler(&store, StaticEnvironment::new())));

        for _ in 0..2 {
            resolver
                .lookup("a", &Scope::root(), &LookupOptions::default())
                .unwrap();
        }
        assert_eq!(store.calls_for("down"), 2);
    }

    #[test]
    fn test_non_primitive_secret_is_missing() {
        let store = MockSecretStore::new().with_secret("s", "nested", json!({"a": 1}));
        let root = tree(json!({"a": "${aws-secret:s/nested}"}));

        let value = lookup_with(&root, handler(&store, StaticEnvironment::new()), "a")
            .unwrap()
            .unwrap();
        assert_eq!(value, Value::from("${aws-secret:s/nested}"));
    }

    #[test]
    fn test_other_names_ignored() {
        let store = MockSecretStore::new();
        let root = tree(json!({}));
        let handler = handler(&store, StaticEnvironment::new());
        let resolver = Resolver::new(&root);

        assert!(
            handler
                .resolve("plain", &Scope::root(), &resolver)
                .unwrap()
                .is_none()
        );
        assert!(
            handler
                .resolve("aws-secret:store/", &Scope::root(), &resolver)
                .unwrap()
                .is_none()
        );
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_default_options() {
        let options = AwsSecretOptions::default();
        assert_eq!(options.identity_key, "IDENTITY");
        assert_eq!(options.profile_env, "AWS_PROFILE");
        assert!(!options.fail_fast);
    }
}

//! Directive registry: name lookup plus URL pattern matching.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::handlers;
use crate::{TagContext, TagError};

/// A directive implementation registered under a fixed name.
///
/// Handlers are shared across concurrent renders, so implementations must
/// be `Send + Sync` and keep any mutable state internal.
pub trait TagHandler: Send + Sync {
    /// Registered directive name (`youtube`, `wikipedia`, ...).
    fn name(&self) -> &'static str;

    /// Pattern matched against bare URLs for unified embeds.
    ///
    /// `None` means this handler never participates in URL dispatch.
    fn url_pattern(&self) -> Option<&Regex> {
        None
    }

    /// Render the directive's argument string to an HTML fragment.
    ///
    /// # Errors
    ///
    /// [`TagError::InvalidArgument`] when the argument string is rejected,
    /// [`TagError::Upstream`] when an outbound request fails.
    fn render(&self, args: &str, ctx: &TagContext) -> Result<String, TagError>;
}

/// Two handlers were registered under the same name.
#[derive(Debug, thiserror::Error)]
#[error("directive '{0}' is already registered")]
pub struct DuplicateTag(pub String);

/// Builder collecting handlers before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: Vec<Box<dyn TagHandler>>,
    names: HashMap<&'static str, usize>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler.
    ///
    /// Registration order is significant: when several URL patterns match
    /// the same bare URL, the first-registered handler wins.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateTag`] if the name is already taken.
    pub fn register(mut self, handler: impl TagHandler + 'static) -> Result<Self, DuplicateTag> {
        let name = handler.name();
        if self.names.contains_key(name) {
            return Err(DuplicateTag(name.to_owned()));
        }
        self.names.insert(name, self.handlers.len());
        self.handlers.push(Box::new(handler));
        Ok(self)
    }

    /// Freeze into an immutable registry.
    #[must_use]
    pub fn build(self) -> TagRegistry {
        TagRegistry {
            handlers: self.handlers,
            names: self.names,
        }
    }
}

/// Immutable set of directive handlers, built once at startup.
pub struct TagRegistry {
    handlers: Vec<Box<dyn TagHandler>>,
    names: HashMap<&'static str, usize>,
}

impl TagRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with the standard handler set.
    ///
    /// Network-backed handlers share one pooled HTTP agent with the default
    /// timeout.
    #[must_use]
    pub fn with_builtins() -> Self {
        let agent = crate::create_agent(crate::http::DEFAULT_TIMEOUT);
        let builder = RegistryBuilder::new();
        // Builtin names are distinct, so registration cannot fail.
        builder
            .register(handlers::YoutubeTag::new())
            .and_then(|b| b.register(handlers::JsfiddleTag::new()))
            .and_then(|b| b.register(handlers::NexttechTag::new()))
            .and_then(|b| b.register(handlers::TwitterTimelineTag::new()))
            .and_then(|b| b.register(handlers::WikipediaTag::new(agent)))
            .map(RegistryBuilder::build)
            .unwrap_or_else(|_| unreachable!("builtin directive names are unique"))
    }

    /// Look up a handler by its registered name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn TagHandler> {
        self.names.get(name).map(|&i| &*self.handlers[i])
    }

    /// Find the first-registered handler whose URL pattern matches.
    #[must_use]
    pub fn match_url(&self, url: &str) -> Option<&dyn TagHandler> {
        self.handlers
            .iter()
            .find(|h| h.url_pattern().is_some_and(|p| p.is_match(url)))
            .map(AsRef::as_ref)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|h| h.name())
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;

    struct FakeTag {
        name: &'static str,
        pattern: Option<Regex>,
    }

    impl TagHandler for FakeTag {
        fn name(&self) -> &'static str {
            self.name
        }

        fn url_pattern(&self) -> Option<&Regex> {
            self.pattern.as_ref()
        }

        fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
            Ok(format!("<div data-tag=\"{}\">{args}</div>", self.name))
        }
    }

    static EXAMPLE_URL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^https://example\.com/").expect("static pattern"));

    fn fake(name: &'static str, with_pattern: bool) -> FakeTag {
        FakeTag {
            name,
            pattern: with_pattern.then(|| EXAMPLE_URL.clone()),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = TagRegistry::builder()
            .register(fake("alpha", false))
            .unwrap()
            .build();
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = TagRegistry::builder()
            .register(fake("alpha", false))
            .unwrap()
            .register(fake("alpha", false));
        assert!(result.is_err());
    }

    #[test]
    fn test_url_dispatch_first_registered_wins() {
        let registry = TagRegistry::builder()
            .register(fake("first", true))
            .unwrap()
            .register(fake("second", true))
            .unwrap()
            .build();
        let handler = registry.match_url("https://example.com/x").unwrap();
        assert_eq!(handler.name(), "first");
    }

    #[test]
    fn test_url_dispatch_skips_patternless_handlers() {
        let registry = TagRegistry::builder()
            .register(fake("plain", false))
            .unwrap()
            .register(fake("matching", true))
            .unwrap()
            .build();
        let handler = registry.match_url("https://example.com/x").unwrap();
        assert_eq!(handler.name(), "matching");
    }

    #[test]
    fn test_builtins_register_cleanly() {
        let registry = TagRegistry::with_builtins();
        let names: Vec<_> = registry.names().collect();
        assert!(names.contains(&"youtube"));
        assert!(names.contains(&"wikipedia"));
    }
}

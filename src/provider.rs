//! Service providers and application bootstrap
//!
//! A provider groups related bindings. Bootstrapping runs each provider's
//! `register` hook, which binds services, and its `boot` hook, which may
//! resolve them.
//!
//! # Example
//!
//! ```rust
//! use service_container::{Bootstrap, Container, Result, ServiceProvider};
//!
//! struct ConsoleLogger;
//! struct LoggingProvider;
//!
//! impl ServiceProvider for LoggingProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container.singleton_fn("Logger", |_| Ok(ConsoleLogger));
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::new();
//! Bootstrap::new().provider(LoggingProvider).run(&container).unwrap();
//! assert!(container.is_shared("Logger"));
//! ```

use crate::{Container, DiError, Identifier, Result};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// A unit of service registration.
pub trait ServiceProvider: Send + Sync + 'static {
    /// Bind this provider's services.
    fn register(&self, container: &Container) -> Result<()>;

    /// Run after registration; may resolve services.
    fn boot(&self, container: &Container) -> Result<()> {
        let _ = container;
        Ok(())
    }
}

/// Type-erased provider as stored in the container.
///
/// Providers bound with [`Container::bind_provider`] resolve to this type.
#[derive(Clone)]
pub struct ProviderHandle(Arc<dyn ServiceProvider>);

impl ProviderHandle {
    /// Wrap a provider.
    pub fn new(provider: impl ServiceProvider) -> Self {
        Self(Arc::new(provider))
    }

    #[inline]
    fn provider(&self) -> &dyn ServiceProvider {
        &*self.0
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderHandle").finish_non_exhaustive()
    }
}

/// Order in which provider hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootOrder {
    /// `register` then `boot` for each provider in turn
    #[default]
    Interleaved,
    /// `register` on every provider, then `boot` on every provider
    Batched,
}

enum Entry {
    Typed(ProviderHandle),
    Named(Identifier),
}

/// Builder that runs a list of providers against a container.
#[derive(Default)]
pub struct Bootstrap {
    order: BootOrder,
    entries: Vec<Entry>,
}

impl Bootstrap {
    /// Empty bootstrap with interleaved ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook order.
    pub fn order(mut self, order: BootOrder) -> Self {
        self.order = order;
        self
    }

    /// Add a provider value.
    pub fn provider(mut self, provider: impl ServiceProvider) -> Self {
        self.entries.push(Entry::Typed(ProviderHandle::new(provider)));
        self
    }

    /// Add a provider to be resolved from the container by identifier.
    pub fn provider_named(mut self, identifier: impl Into<Identifier>) -> Self {
        self.entries.push(Entry::Named(identifier.into()));
        self
    }

    /// Number of providers added.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no provider was added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every provider's hooks.
    ///
    /// Named providers are resolved before any hook runs, so a name that
    /// does not resolve to a provider leaves the container untouched.
    pub fn run(self, container: &Container) -> Result<()> {
        let providers = self
            .entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Typed(handle) => Ok(handle),
                Entry::Named(id) => resolve_provider(container, &id),
            })
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "logging")]
        debug!(
            target: "service_container",
            providers = providers.len(),
            order = ?self.order,
            "Bootstrapping service providers"
        );

        match self.order {
            BootOrder::Interleaved => {
                for handle in &providers {
                    handle.provider().register(container)?;
                    handle.provider().boot(container)?;
                }
            }
            BootOrder::Batched => {
                for handle in &providers {
                    handle.provider().register(container)?;
                }
                for handle in &providers {
                    handle.provider().boot(container)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("order", &self.order)
            .field("providers", &self.entries.len())
            .finish()
    }
}

fn resolve_provider(container: &Container, identifier: &Identifier) -> Result<ProviderHandle> {
    let not_a_provider = || DiError::NotAServiceProvider {
        provider: identifier.clone(),
    };

    // Only a failure to build the named provider itself is remapped; errors
    // from its own dependencies pass through
    let instance = container.resolve(identifier).map_err(|err| match err {
        DiError::TargetNotFound { identifier: ref missing }
        | DiError::NotInstantiable { identifier: ref missing }
            if missing == identifier =>
        {
            not_a_provider()
        }
        other => other,
    })?;

    instance
        .downcast::<ProviderHandle>()
        .map(|handle| (*handle).clone())
        .map_err(|_| not_a_provider())
}

impl Container {
    /// Register a provider as a shared binding so bootstrap can name it.
    pub fn bind_provider(&self, identifier: impl Into<Identifier>, provider: impl ServiceProvider) {
        let handle = ProviderHandle::new(provider);
        self.singleton_fn(identifier, move |_| Ok(handle.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ServiceProvider for Recording {
        fn register(&self, _: &Container) -> Result<()> {
            self.log.lock().unwrap().push(format!("register {}", self.name));
            Ok(())
        }

        fn boot(&self, _: &Container) -> Result<()> {
            self.log.lock().unwrap().push(format!("boot {}", self.name));
            Ok(())
        }
    }

    struct Mail(#[allow(dead_code)] crate::Instance);

    impl ServiceProvider for Mail {
        fn register(&self, _: &Container) -> Result<()> {
            Ok(())
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recording {
        Recording {
            name,
            log: Arc::clone(log),
        }
    }

    #[test]
    fn test_interleaved_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        Bootstrap::new()
            .provider(recording("a", &log))
            .provider(recording("b", &log))
            .run(&Container::new())
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["register a", "boot a", "register b", "boot b"]
        );
    }

    #[test]
    fn test_batched_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        Bootstrap::new()
            .order(BootOrder::Batched)
            .provider(recording("a", &log))
            .provider(recording("b", &log))
            .run(&Container::new())
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["register a", "register b", "boot a", "boot b"]
        );
    }

    #[test]
    fn test_named_provider_is_resolved() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new();
        container.bind_provider("providers.recording", recording("named", &log));

        Bootstrap::new()
            .provider_named("providers.recording")
            .run(&container)
            .unwrap();

        assert_eq!(*log.lock().unwrap(), ["register named", "boot named"]);
    }

    #[test]
    fn test_non_provider_fails_before_any_hook() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = Container::new();
        container.bind_fn("not_a_provider", |_| Ok(42u32), false);

        let err = Bootstrap::new()
            .provider(recording("a", &log))
            .provider_named("not_a_provider")
            .run(&container)
            .unwrap_err();

        assert_eq!(
            err,
            DiError::NotAServiceProvider {
                provider: Identifier::from("not_a_provider"),
            }
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_provider_dependency_is_not_masked() {
        let container = Container::new();
        container.bind_type("providers.mail", "MailProvider", false).unwrap();
        container.register_descriptor(crate::TypeDescriptor::concrete(
            "MailProvider",
            vec![crate::Parameter::class("transport", "Transport")],
            |args| Ok(ProviderHandle::new(Mail(args.next_instance()?))),
        ));

        let err = Bootstrap::new()
            .provider_named("providers.mail")
            .run(&container)
            .unwrap_err();

        assert_eq!(
            err,
            DiError::TargetNotFound {
                identifier: Identifier::from("Transport"),
            }
        );
    }

    #[test]
    fn test_unknown_provider_name() {
        let err = Bootstrap::new()
            .provider_named("Missing")
            .run(&Container::new())
            .unwrap_err();

        assert!(matches!(err, DiError::NotAServiceProvider { .. }));
    }
}

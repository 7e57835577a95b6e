//! Service container and resolution engine
//!
//! The `Container` stores bindings, caches shared instances and builds
//! object graphs by recursively resolving constructor parameters.

use crate::factory::{Factory, FunctionFactory};
use crate::introspect::{Autowire, ParamType, Parameter, TypeDescriptor, TypeIntrospector, TypeRegistry};
use crate::stack::{self, BuildGuard};
use crate::storage::{Binding, BindingStorage, InstanceCache};
use crate::{DiError, Identifier, Injectable, Instance, Result};
use once_cell::sync::Lazy;
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

static CONTAINER_ID: Lazy<Identifier> = Lazy::new(Identifier::of::<Container>);

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// Identifier of the container type itself.
#[inline]
pub(crate) fn container_identifier() -> &'static Identifier {
    &CONTAINER_ID
}

/// Name used for construction functions built outside of a binding
const ANONYMOUS_FUNCTION: &str = "{closure}";

/// Dependency injection container.
///
/// Cloning is cheap and yields a handle to the same container.
///
/// # Examples
///
/// ```rust
/// use service_container::Container;
/// use std::sync::Arc;
///
/// struct ConsoleLogger;
///
/// let container = Container::new();
/// container.singleton_fn("Logger", |_| Ok(ConsoleLogger));
///
/// let a = container.resolve("Logger").unwrap();
/// let b = container.resolve("Logger").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert!(a.downcast::<ConsoleLogger>().is_ok());
/// ```
#[derive(Clone)]
pub struct Container {
    /// Identifier → binding
    bindings: Arc<BindingStorage>,
    /// Shared instances, checked before any binding lookup
    instances: Arc<InstanceCache>,
    /// Built-in introspection table
    types: TypeRegistry,
    /// External introspection facility, consulted after `types`
    introspector: Option<Arc<dyn TypeIntrospector>>,
}

impl Container {
    /// Create an empty container.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "service_container", "Creating new service container");

        Self {
            bindings: Arc::new(BindingStorage::new()),
            instances: Arc::new(InstanceCache::new()),
            types: TypeRegistry::new(),
            introspector: None,
        }
    }

    /// Create a container with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many services will be registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: Arc::new(BindingStorage::with_capacity(capacity)),
            instances: Arc::new(InstanceCache::with_capacity(capacity)),
            types: TypeRegistry::new(),
            introspector: None,
        }
    }

    /// Create a container that falls back to an external introspection
    /// facility for types missing from its own registry.
    pub fn with_introspector(introspector: impl TypeIntrospector + 'static) -> Self {
        Self {
            introspector: Some(Arc::new(introspector)),
            ..Self::new()
        }
    }

    /// The process-wide container.
    ///
    /// Created on first access and never torn down. Prefer passing a
    /// `Container` explicitly; this exists for applications that need a
    /// single global registry.
    #[inline]
    pub fn global() -> &'static Container {
        &GLOBAL
    }

    /// Build-stack owner key for this container (shared by its clones).
    #[inline]
    fn owner(&self) -> usize {
        Arc::as_ptr(&self.bindings) as usize
    }

    // =========================================================================
    // Type Registration
    // =========================================================================

    /// Register an [`Autowire`] type so it can be built by name.
    #[inline]
    pub fn register_type<T: Autowire>(&self) {
        self.types.register_type::<T>();
    }

    /// Register a hand-written type descriptor.
    #[inline]
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) {
        self.types.register(descriptor);
    }

    /// Register an interface or abstract type name.
    #[inline]
    pub fn register_abstract(&self, name: impl Into<Identifier>) {
        self.types.register_abstract(name);
    }

    /// The container's own introspection table.
    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn describe(&self, name: &Identifier) -> Option<TypeDescriptor> {
        self.types
            .describe(name)
            .or_else(|| self.introspector.as_ref()?.describe(name))
    }

    // =========================================================================
    // Binding Registration
    // =========================================================================

    /// Register a binding.
    ///
    /// Without a factory the identifier is bound to itself. A type-name
    /// factory naming another identifier is resolved through the registry,
    /// so bindings can chain. Re-binding overwrites the previous binding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use service_container::{Container, Factory};
    ///
    /// let container = Container::new();
    /// container.bind("Cache", Some(Factory::type_name("RedisCache")), false).unwrap();
    /// container.bind("RedisCache", None, true).unwrap();
    ///
    /// assert!(container.is_bound("Cache"));
    /// assert!(!container.is_shared("Cache"));
    /// assert!(container.is_shared("RedisCache"));
    /// ```
    pub fn bind(
        &self,
        identifier: impl Into<Identifier>,
        factory: Option<Factory>,
        shared: bool,
    ) -> Result<()> {
        let identifier = identifier.into();
        let concrete = factory.unwrap_or_else(|| Factory::TypeName(identifier.clone()));
        concrete.validate(&identifier)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "service_container",
            service = identifier.as_str(),
            factory = ?concrete,
            shared,
            "Registering binding"
        );

        self.bindings.insert(
            identifier,
            Binding {
                concrete,
                shared,
                implicit: false,
            },
        );
        Ok(())
    }

    /// Register a shared binding (`bind(identifier, factory, true)`).
    #[inline]
    pub fn singleton(&self, identifier: impl Into<Identifier>, factory: Option<Factory>) -> Result<()> {
        self.bind(identifier, factory, true)
    }

    /// Bind a construction function.
    #[inline]
    pub fn bind_fn<T: Injectable, F>(&self, identifier: impl Into<Identifier>, f: F, shared: bool)
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.insert_function(identifier.into(), FunctionFactory::new(f), shared);
    }

    /// Bind a shared construction function.
    #[inline]
    pub fn singleton_fn<T: Injectable, F>(&self, identifier: impl Into<Identifier>, f: F)
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.bind_fn(identifier, f, true);
    }

    /// Bind an identifier to a type name.
    #[inline]
    pub fn bind_type(
        &self,
        identifier: impl Into<Identifier>,
        type_name: impl Into<Identifier>,
        shared: bool,
    ) -> Result<()> {
        self.bind(identifier, Some(Factory::TypeName(type_name.into())), shared)
    }

    /// Bind a shared identifier to a type name.
    #[inline]
    pub fn singleton_type(
        &self,
        identifier: impl Into<Identifier>,
        type_name: impl Into<Identifier>,
    ) -> Result<()> {
        self.bind_type(identifier, type_name, true)
    }

    /// Bind an identifier to the type of the same name, not shared.
    #[inline]
    pub fn bind_self(&self, identifier: impl Into<Identifier>) -> Result<()> {
        self.bind(identifier, None, false)
    }

    /// Bind from an untyped value.
    ///
    /// See [`Factory::from_dynamic`] for the accepted values; anything else
    /// fails with [`DiError::InvalidArgumentKind`].
    ///
    /// ```rust
    /// use service_container::{Container, DiError};
    ///
    /// let container = Container::new();
    /// assert!(container.bind_dynamic("Mailer", "SmtpMailer", false).is_ok());
    ///
    /// let err = container.bind_dynamic("X", 42, false).unwrap_err();
    /// assert!(matches!(err, DiError::InvalidArgumentKind { .. }));
    /// ```
    pub fn bind_dynamic<V: Any + Send>(
        &self,
        identifier: impl Into<Identifier>,
        value: V,
        shared: bool,
    ) -> Result<()> {
        let identifier = identifier.into();
        let factory = Factory::from_dynamic(&identifier, value)?;
        self.bind(identifier, Some(factory), shared)
    }

    fn insert_function(&self, identifier: Identifier, factory: FunctionFactory, shared: bool) {
        #[cfg(feature = "logging")]
        debug!(
            target: "service_container",
            service = identifier.as_str(),
            shared,
            "Registering construction function"
        );

        self.bindings.insert(
            identifier,
            Binding {
                concrete: Factory::Function(factory),
                shared,
                implicit: false,
            },
        );
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Resolve an identifier to an instance.
    ///
    /// Shared bindings are built once and cached; every other resolution
    /// builds a new object graph. Unbound identifiers are built as types of
    /// the same name.
    pub fn resolve(&self, identifier: impl Into<Identifier>) -> Result<Instance> {
        self.resolve_id(&identifier.into())
    }

    /// Alias for `resolve`.
    #[inline]
    pub fn get(&self, identifier: impl Into<Identifier>) -> Result<Instance> {
        self.resolve(identifier)
    }

    /// Resolve, returning None on any failure.
    #[inline]
    pub fn try_resolve(&self, identifier: impl Into<Identifier>) -> Option<Instance> {
        self.resolve(identifier).ok()
    }

    /// Resolve and downcast to `T`.
    pub fn resolve_as<T: Injectable>(&self, identifier: impl Into<Identifier>) -> Result<Arc<T>> {
        let identifier = identifier.into();
        self.resolve_id(&identifier)?
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>(&identifier))
    }

    /// Resolve the Rust type `T` by its type name.
    #[inline]
    pub fn make<T: Injectable>(&self) -> Result<Arc<T>> {
        self.resolve_as::<T>(Identifier::of::<T>())
    }

    fn resolve_id(&self, identifier: &Identifier) -> Result<Instance> {
        if let Some(instance) = self.instances.get(identifier) {
            #[cfg(feature = "logging")]
            trace!(
                target: "service_container",
                service = identifier.as_str(),
                "Service resolved from instance cache"
            );
            return Ok(instance);
        }

        stack::check(self.owner(), identifier)?;

        if self.bindings.insert_if_absent(
            identifier.clone(),
            Binding {
                concrete: Factory::TypeName(identifier.clone()),
                shared: false,
                implicit: true,
            },
        ) {
            #[cfg(feature = "logging")]
            debug!(
                target: "service_container",
                service = identifier.as_str(),
                "Registering implicit self-binding"
            );
        }

        let concrete = self
            .bindings
            .get(identifier)
            .map(|b| b.concrete)
            .unwrap_or_else(|| Factory::TypeName(identifier.clone()));

        let built = {
            let _frame = BuildGuard::push(self.owner(), identifier);
            match &concrete {
                Factory::Function(f) => self.call_function(identifier, f),
                Factory::TypeName(target) if target == identifier => self.build_type(target),
                Factory::TypeName(target) => self.resolve_id(target),
            }
        };

        let object = built?;

        if self.bindings.is_shared(identifier) {
            return Ok(self.instances.get_or_insert(identifier.clone(), object));
        }
        Ok(object)
    }

    // =========================================================================
    // Build Methods
    // =========================================================================

    /// Construct one object from a factory, bypassing bindings and the cache.
    ///
    /// A type name is auto-wired directly; a function is invoked after its
    /// signature has been checked.
    pub fn build(&self, factory: &Factory) -> Result<Instance> {
        match factory {
            Factory::Function(f) => self.call_function(&Identifier::from(ANONYMOUS_FUNCTION), f),
            Factory::TypeName(name) => self.build_type(name),
        }
    }

    fn call_function(&self, target: &Identifier, f: &FunctionFactory) -> Result<Instance> {
        if f.declares_container() {
            return Err(DiError::self_injection(target));
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "service_container",
            service = target.as_str(),
            "Invoking construction function"
        );

        f.invoke(&self.resolver())
    }

    fn build_type(&self, name: &Identifier) -> Result<Instance> {
        let descriptor = self.describe(name).ok_or_else(|| DiError::not_found(name))?;

        if descriptor.is_abstract() && !self.bindings.contains_explicit(name) {
            return Err(DiError::unbound_abstract(name));
        }
        if !descriptor.is_instantiable() {
            return Err(DiError::not_instantiable(name));
        }

        #[cfg(feature = "logging")]
        trace!(
            target: "service_container",
            service = name.as_str(),
            parameters = descriptor.parameters().len(),
            "Building type"
        );

        let arguments = self.resolve_parameters(name, descriptor.parameters())?;
        descriptor.instantiate(arguments)
    }

    /// Resolve constructor parameters in declaration order.
    fn resolve_parameters(
        &self,
        target: &Identifier,
        parameters: &[Parameter],
    ) -> Result<Vec<(Parameter, Instance)>> {
        parameters
            .iter()
            .map(|param| match param.ty() {
                ParamType::Untyped | ParamType::Builtin(_) => {
                    Err(DiError::unresolvable(param.name(), target))
                }
                ty if ty.is_container() => Err(DiError::self_injection(target)),
                ParamType::Class(dependency) => {
                    self.resolve_id(dependency).map(|value| (param.clone(), value))
                }
            })
            .collect()
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// True if the identifier has a binding or a cached instance.
    #[inline]
    pub fn has(&self, identifier: impl Into<Identifier>) -> bool {
        let identifier = identifier.into();
        self.bindings.contains(&identifier) || self.instances.contains(&identifier)
    }

    /// True if the identifier has a binding.
    #[inline]
    pub fn is_bound(&self, identifier: impl Into<Identifier>) -> bool {
        self.bindings.contains(&identifier.into())
    }

    /// True if the identifier has a shared binding.
    #[inline]
    pub fn is_shared(&self, identifier: impl Into<Identifier>) -> bool {
        self.bindings.is_shared(&identifier.into())
    }

    /// Number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.len() == 0
    }

    /// All bound identifiers, sorted.
    pub fn bound_identifiers(&self) -> Vec<Identifier> {
        self.bindings.identifiers()
    }

    /// Identifiers currently being built by this container on the calling
    /// thread, outermost first. Empty outside of a resolution.
    pub fn build_stack(&self) -> Vec<Identifier> {
        stack::path(self.owner())
    }

    /// A resolve-only view of this container.
    #[inline]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver { container: self }
    }

    // =========================================================================
    // Batch Registration
    // =========================================================================

    /// Register several bindings at once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use service_container::Container;
    ///
    /// struct Database;
    /// struct Cache;
    ///
    /// let container = Container::new();
    /// container.batch(|batch| {
    ///     batch.singleton_fn("db", |_| Ok(Database));
    ///     batch.bind_fn("cache", |_| Ok(Cache), false);
    /// });
    ///
    /// assert!(container.is_bound("db"));
    /// assert!(container.is_bound("cache"));
    /// ```
    #[inline]
    pub fn batch<F>(&self, f: F)
    where
        F: FnOnce(BatchRegistrar<'_>),
    {
        #[cfg(feature = "logging")]
        let start_count = self.bindings.len();

        f(BatchRegistrar { container: self });

        #[cfg(feature = "logging")]
        debug!(
            target: "service_container",
            bindings_registered = self.bindings.len().saturating_sub(start_count),
            "Batch registration completed"
        );
    }
}

/// Batch registrar for closure-based bulk registration.
#[repr(transparent)]
pub struct BatchRegistrar<'a> {
    container: &'a Container,
}

impl<'a> BatchRegistrar<'a> {
    /// Bind a construction function
    #[inline]
    pub fn bind_fn<T: Injectable, F>(&self, identifier: impl Into<Identifier>, f: F, shared: bool)
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.container.bind_fn(identifier, f, shared);
    }

    /// Bind a shared construction function
    #[inline]
    pub fn singleton_fn<T: Injectable, F>(&self, identifier: impl Into<Identifier>, f: F)
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.container.singleton_fn(identifier, f);
    }

    /// Bind a type name
    #[inline]
    pub fn bind_type(
        &self,
        identifier: impl Into<Identifier>,
        type_name: impl Into<Identifier>,
        shared: bool,
    ) -> Result<()> {
        self.container.bind_type(identifier, type_name, shared)
    }

    /// Register an [`Autowire`] type
    #[inline]
    pub fn register_type<T: Autowire>(&self) {
        self.container.register_type::<T>();
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolve-only view of a container, handed to construction functions.
///
/// It can resolve dependencies but cannot register or alter bindings.
#[derive(Clone, Copy)]
pub struct Resolver<'c> {
    container: &'c Container,
}

impl<'c> Resolver<'c> {
    /// Resolve an identifier.
    #[inline]
    pub fn resolve(&self, identifier: impl Into<Identifier>) -> Result<Instance> {
        self.container.resolve(identifier)
    }

    /// Alias for `resolve`.
    #[inline]
    pub fn get(&self, identifier: impl Into<Identifier>) -> Result<Instance> {
        self.container.resolve(identifier)
    }

    /// Resolve and downcast to `T`.
    #[inline]
    pub fn resolve_as<T: Injectable>(&self, identifier: impl Into<Identifier>) -> Result<Arc<T>> {
        self.container.resolve_as::<T>(identifier)
    }

    /// Resolve the Rust type `T` by its type name.
    #[inline]
    pub fn make<T: Injectable>(&self) -> Result<Arc<T>> {
        self.container.make::<T>()
    }

    /// True if the identifier has a binding or a cached instance.
    #[inline]
    pub fn has(&self, identifier: impl Into<Identifier>) -> bool {
        self.container.has(identifier)
    }

    #[inline]
    pub(crate) fn container(&self) -> &'c Container {
        self.container
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.len())
            .field("instances", &self.instances.len())
            .field("types", &self.types.len())
            .field("has_introspector", &self.introspector.is_some())
            .finish()
    }
}

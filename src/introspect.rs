//! Type introspection for constructor auto-wiring
//!
//! Rust has no runtime reflection, so the container learns how to construct
//! a type from a registration table. Each [`TypeDescriptor`] answers the
//! questions auto-wiring needs:
//!
//! - is the type abstract (an interface) or concrete?
//! - can it be instantiated at all?
//! - which parameters does its constructor declare, in which order, and of
//!   which type?
//!
//! Descriptors are written by hand, produced from an [`Autowire`]
//! implementation, or generated by `#[derive(Autowire)]`.
//!
//! # Example
//!
//! ```rust
//! use service_container::{Arguments, Autowire, Container, Parameter, Result};
//! use std::sync::Arc;
//!
//! struct Repository;
//!
//! impl Autowire for Repository {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![]
//!     }
//!
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(Repository)
//!     }
//! }
//!
//! struct Service {
//!     repo: Arc<Repository>,
//! }
//!
//! impl Autowire for Service {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![Parameter::of::<Repository>("repo")]
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self> {
//!         Ok(Service { repo: args.take()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_type::<Repository>();
//! container.register_type::<Service>();
//!
//! let service = container.make::<Service>().unwrap();
//! ```

use crate::{DiError, Identifier, Injectable, Instance, Result};
use ahash::RandomState;
use dashmap::DashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Parameters
// =============================================================================

/// Declared type of a constructor or factory parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// No declared type
    Untyped,
    /// A primitive/builtin type such as `i32` or `String`; never resolvable
    Builtin(String),
    /// A resolvable type or interface
    Class(Identifier),
}

impl ParamType {
    /// Builtin parameter type.
    #[inline]
    pub fn builtin(name: impl Into<String>) -> Self {
        ParamType::Builtin(name.into())
    }

    /// Resolvable parameter type.
    #[inline]
    pub fn class(name: impl Into<Identifier>) -> Self {
        ParamType::Class(name.into())
    }

    /// True if this names the container type itself.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, ParamType::Class(id) if id == crate::container::container_identifier())
    }
}

/// A named constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    ty: ParamType,
}

impl Parameter {
    /// Create a parameter with an explicit type.
    #[inline]
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Parameter of Rust type `T`, identified by `Identifier::of::<T>()`.
    #[inline]
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Class(Identifier::of::<T>()))
    }

    /// Parameter whose type is a registered name.
    #[inline]
    pub fn class(name: impl Into<String>, ty: impl Into<Identifier>) -> Self {
        Self::new(name, ParamType::class(ty))
    }

    /// Parameter of a builtin type.
    #[inline]
    pub fn builtin(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, ParamType::builtin(ty))
    }

    /// Parameter without a declared type.
    #[inline]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Untyped)
    }

    /// Parameter name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[inline]
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    target: Identifier,
    values: std::vec::IntoIter<(Parameter, Instance)>,
    index: usize,
}

impl Arguments {
    pub(crate) fn new(target: Identifier, values: Vec<(Parameter, Instance)>) -> Self {
        Self {
            target,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// The type being constructed.
    #[inline]
    pub fn target(&self) -> &Identifier {
        &self.target
    }

    /// Number of arguments not yet taken.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Take the next argument without downcasting it.
    pub fn next_instance(&mut self) -> Result<Instance> {
        let index = self.index;
        self.index += 1;
        self.values
            .next()
            .map(|(_, instance)| instance)
            .ok_or_else(|| DiError::MissingArgument {
                target: self.target.clone(),
                index,
            })
    }

    /// Take the next argument as `Arc<T>`.
    pub fn take<T: Injectable>(&mut self) -> Result<Arc<T>> {
        let index = self.index;
        self.index += 1;
        let (param, instance) = self.values.next().ok_or_else(|| DiError::MissingArgument {
            target: self.target.clone(),
            index,
        })?;

        instance.downcast::<T>().map_err(|_| {
            let declared = match param.ty() {
                ParamType::Class(id) => id.clone(),
                _ => self.target.clone(),
            };
            DiError::type_mismatch::<T>(&declared)
        })
    }

    /// Take the next argument and clone the value out of its `Arc`.
    ///
    /// Useful for services stored as `Arc<dyn Trait>` values.
    pub fn take_cloned<T: Injectable + Clone>(&mut self) -> Result<T> {
        self.take::<T>().map(|arc| (*arc).clone())
    }

    /// Report that parameter `name` cannot be supplied.
    ///
    /// Generated constructors use this for fields of builtin type; the
    /// resolution engine rejects such parameters before construction.
    pub fn unresolvable(&mut self, name: &str) -> Result<Infallible> {
        Err(DiError::unresolvable(name, &self.target))
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("target", &self.target)
            .field("remaining", &self.values.len())
            .finish()
    }
}

// =============================================================================
// Type Descriptors
// =============================================================================

/// Whether a type can be built directly or only through a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeKind {
    /// A concrete type
    #[default]
    Concrete,
    /// An interface or abstract type
    Abstract,
}

/// Type-erased constructor
type Instantiator = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;

/// Structural description of a constructible type.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Identifier,
    kind: TypeKind,
    public: bool,
    parameters: Arc<[Parameter]>,
    instantiator: Option<Instantiator>,
}

impl TypeDescriptor {
    /// A concrete type with the given constructor.
    pub fn concrete<T: Injectable, F>(
        name: impl Into<Identifier>,
        parameters: Vec<Parameter>,
        constructor: F,
    ) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            public: true,
            parameters: Arc::from(parameters),
            instantiator: Some(Arc::new(move |mut args: Arguments| {
                constructor(&mut args).map(|v| Arc::new(v) as Instance)
            })),
        }
    }

    /// An interface or abstract type. It has no constructor.
    pub fn abstract_type(name: impl Into<Identifier>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Abstract,
            public: false,
            parameters: Arc::from(Vec::new()),
            instantiator: None,
        }
    }

    /// Descriptor of an [`Autowire`] type, named `Identifier::of::<T>()`.
    pub fn of<T: Autowire>() -> Self {
        Self::concrete(Identifier::of::<T>(), T::parameters(), T::construct)
    }

    /// Same type under another name.
    pub fn named(mut self, name: impl Into<Identifier>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark the constructor as not publicly callable.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Type name.
    #[inline]
    pub fn name(&self) -> &Identifier {
        &self.name
    }

    /// Concrete or abstract.
    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// True for interfaces and abstract types.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// True if the container may construct this type.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.public && self.instantiator.is_some()
    }

    /// Constructor parameters in declaration order.
    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Type names of the resolvable parameters.
    pub fn dependency_names(&self) -> Vec<&Identifier> {
        self.parameters
            .iter()
            .filter_map(|p| match p.ty() {
                ParamType::Class(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Run the constructor with resolved arguments.
    pub(crate) fn instantiate(&self, args: Vec<(Parameter, Instance)>) -> Result<Instance> {
        let instantiator = self
            .instantiator
            .as_ref()
            .ok_or_else(|| DiError::not_instantiable(&self.name))?;
        instantiator(Arguments::new(self.name.clone(), args))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("instantiable", &self.is_instantiable())
            .field("parameters", &self.parameters)
            .finish()
    }
}

// =============================================================================
// Autowire Trait
// =============================================================================

/// A type that declares its constructor parameters.
///
/// This is the registration-table counterpart of constructor reflection:
/// `parameters` lists what the constructor needs, `construct` receives the
/// resolved values in the same order.
pub trait Autowire: Injectable + Sized {
    /// Constructor parameters in declaration order.
    fn parameters() -> Vec<Parameter>;

    /// Build an instance from resolved arguments.
    fn construct(args: &mut Arguments) -> Result<Self>;
}

// =============================================================================
// Introspection Facility
// =============================================================================

/// Capability that describes types by name.
pub trait TypeIntrospector: Send + Sync {
    /// Describe the type named `name`, or `None` if it is unknown.
    fn describe(&self, name: &Identifier) -> Option<TypeDescriptor>;
}

impl<F> TypeIntrospector for F
where
    F: Fn(&Identifier) -> Option<TypeDescriptor> + Send + Sync,
{
    fn describe(&self, name: &Identifier) -> Option<TypeDescriptor> {
        self(name)
    }
}

/// Registration table of type descriptors.
///
/// Cloning shares the same table.
#[derive(Clone)]
pub struct TypeRegistry {
    types: Arc<DashMap<Identifier, TypeDescriptor, RandomState>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            types: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Add or replace a descriptor.
    #[inline]
    pub fn register(&self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Register an [`Autowire`] type under `Identifier::of::<T>()`.
    #[inline]
    pub fn register_type<T: Autowire>(&self) {
        self.register(TypeDescriptor::of::<T>());
    }

    /// Register an interface or abstract type name.
    #[inline]
    pub fn register_abstract(&self, name: impl Into<Identifier>) {
        self.register(TypeDescriptor::abstract_type(name));
    }

    /// True if a descriptor exists for `name`.
    #[inline]
    pub fn contains(&self, name: &Identifier) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no type is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeIntrospector for TypeRegistry {
    fn describe(&self, name: &Identifier) -> Option<TypeDescriptor> {
        self.types.get(name).map(|d| d.value().clone())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Container;

    struct Config {
        debug: bool,
    }

    impl Autowire for Config {
        fn parameters() -> Vec<Parameter> {
            vec![]
        }

        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Config { debug: true })
        }
    }

    struct Database {
        config: Arc<Config>,
    }

    impl Autowire for Database {
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::of::<Config>("config")]
        }

        fn construct(args: &mut Arguments) -> Result<Self> {
            Ok(Database {
                config: args.take()?,
            })
        }
    }

    fn config_instance() -> Instance {
        Arc::new(Config { debug: false })
    }

    #[test]
    fn test_descriptor_of_autowire_type() {
        let descriptor = TypeDescriptor::of::<Database>();

        assert_eq!(descriptor.name(), &Identifier::of::<Database>());
        assert!(descriptor.is_instantiable());
        assert_eq!(
            descriptor.dependency_names(),
            vec![&Identifier::of::<Config>()]
        );
    }

    #[test]
    fn test_instantiate_passes_arguments_in_order() {
        let descriptor = TypeDescriptor::of::<Database>();
        let param = Parameter::of::<Config>("config");

        let instance = descriptor
            .instantiate(vec![(param, config_instance())])
            .unwrap();
        let db = instance.downcast::<Database>().unwrap();
        assert!(!db.config.debug);
    }

    #[test]
    fn test_take_reports_missing_argument() {
        let descriptor = TypeDescriptor::of::<Database>();
        let err = descriptor.instantiate(vec![]).err().unwrap();

        assert_eq!(
            err,
            DiError::MissingArgument {
                target: Identifier::of::<Database>(),
                index: 0,
            }
        );
    }

    #[test]
    fn test_take_reports_type_mismatch() {
        let mut args = Arguments::new(
            Identifier::from("Target"),
            vec![(Parameter::class("dep", "Dep"), config_instance())],
        );

        let err = args.take::<Database>().err().unwrap();
        assert!(matches!(err, DiError::TypeMismatch { identifier, .. } if identifier == "Dep"));
    }

    #[test]
    fn test_abstract_and_private_types_are_not_instantiable() {
        let iface = TypeDescriptor::abstract_type("Logger");
        let private = TypeDescriptor::of::<Config>().private();

        assert!(iface.is_abstract());
        assert!(!iface.is_instantiable());
        assert!(!private.is_abstract());
        assert!(!private.is_instantiable());
    }

    #[test]
    fn test_container_parameter_is_detected() {
        assert!(Parameter::of::<Container>("c").ty().is_container());
        assert!(!Parameter::of::<Config>("c").ty().is_container());
        assert!(!ParamType::Untyped.is_container());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = TypeRegistry::new();
        registry.register_type::<Config>();
        registry.register_abstract("Cache");

        assert_eq!(registry.len(), 2);
        assert!(registry.describe(&Identifier::of::<Config>()).is_some());
        assert!(registry
            .describe(&Identifier::from("Cache"))
            .is_some_and(|d| d.is_abstract()));
        assert!(registry.describe(&Identifier::from("Missing")).is_none());
    }

    #[test]
    fn test_closure_introspector() {
        let introspector = |name: &Identifier| {
            (name == "Clock").then(|| TypeDescriptor::concrete(name.clone(), vec![], |_| Ok(0u64)))
        };

        assert!(introspector.describe(&Identifier::from("Clock")).is_some());
        assert!(introspector.describe(&Identifier::from("Other")).is_none());
    }
}

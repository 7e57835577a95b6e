//! Factory types describing how a binding is constructed
//!
//! A binding's recipe is either a construction function or the name of a
//! type to auto-wire. The two cases are kept in one enum, [`Factory`], and
//! resolved by pattern matching.

use crate::introspect::ParamType;
use crate::{Container, DiError, Identifier, Injectable, Instance, Resolver, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased construction function
type FactoryFn = Arc<dyn Fn(&Resolver<'_>) -> Result<Instance> + Send + Sync>;

#[inline]
fn erase<F>(f: F) -> FactoryFn
where
    F: Fn(&Resolver<'_>) -> Result<Instance> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Construction recipe for a binding.
#[derive(Clone)]
pub enum Factory {
    /// A caller-supplied construction function
    Function(FunctionFactory),
    /// A type name; built directly when it names the bound identifier itself,
    /// otherwise resolved through the registry
    TypeName(Identifier),
}

impl Factory {
    /// Wrap a construction function (see [`FunctionFactory::new`]).
    #[inline]
    pub fn function<T: Injectable, F>(f: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Factory::Function(FunctionFactory::new(f))
    }

    /// Name a type to build or resolve.
    #[inline]
    pub fn type_name(name: impl Into<Identifier>) -> Self {
        Factory::TypeName(name.into())
    }

    /// Convert an untyped value into a factory.
    ///
    /// Accepts a `Factory`, a `FunctionFactory`, an `Identifier`, a `String`
    /// or a `&'static str`. Anything else is rejected with
    /// [`DiError::InvalidArgumentKind`] naming the value's type.
    pub fn from_dynamic<V: Any + Send>(identifier: &Identifier, value: V) -> Result<Self> {
        let found = std::any::type_name::<V>();
        let value: Box<dyn Any + Send> = Box::new(value);

        let value = match value.downcast::<Factory>() {
            Ok(factory) => return Ok(*factory),
            Err(other) => other,
        };
        let value = match value.downcast::<FunctionFactory>() {
            Ok(f) => return Ok(Factory::Function(*f)),
            Err(other) => other,
        };
        let value = match value.downcast::<Identifier>() {
            Ok(name) => return Ok(Factory::TypeName(*name)),
            Err(other) => other,
        };
        let value = match value.downcast::<String>() {
            Ok(name) => return Ok(Factory::TypeName((*name).into())),
            Err(other) => other,
        };
        match value.downcast::<&'static str>() {
            Ok(name) => Ok(Factory::TypeName((*name).into())),
            Err(_) => Err(DiError::invalid_argument(identifier, found)),
        }
    }

    /// Check that the recipe can ever produce something.
    ///
    /// Only type names can be malformed: the empty name never names a type.
    pub(crate) fn validate(&self, identifier: &Identifier) -> Result<()> {
        match self {
            Factory::TypeName(name) if name.is_empty() => {
                Err(DiError::invalid_argument(identifier, "an empty type name"))
            }
            _ => Ok(()),
        }
    }
}

impl From<FunctionFactory> for Factory {
    fn from(f: FunctionFactory) -> Self {
        Factory::Function(f)
    }
}

impl From<Identifier> for Factory {
    fn from(name: Identifier) -> Self {
        Factory::TypeName(name)
    }
}

impl From<&str> for Factory {
    fn from(name: &str) -> Self {
        Factory::TypeName(name.into())
    }
}

impl From<String> for Factory {
    fn from(name: String) -> Self {
        Factory::TypeName(name.into())
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Function(func) => f.debug_tuple("Function").field(func).finish(),
            Factory::TypeName(name) => f.debug_tuple("TypeName").field(name).finish(),
        }
    }
}

// =============================================================================
// Function Factory
// =============================================================================

/// A construction function together with its declared parameter types.
///
/// The declared signature stands in for runtime inspection of the
/// function: the container checks it before invoking and refuses functions
/// that ask for the container itself.
#[derive(Clone)]
pub struct FunctionFactory {
    signature: Arc<[ParamType]>,
    call: FactoryFn,
}

impl FunctionFactory {
    /// A function that receives a [`Resolver`] for its own dependencies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use service_container::{Container, FunctionFactory};
    ///
    /// struct Clock;
    /// struct Scheduler { clock: std::sync::Arc<Clock> }
    ///
    /// let factory = FunctionFactory::new(|r| {
    ///     Ok(Scheduler { clock: r.make::<Clock>()? })
    /// });
    /// assert_eq!(factory.signature().len(), 1);
    /// ```
    pub fn new<T: Injectable, F>(f: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            signature: Arc::from(vec![ParamType::Untyped]),
            call: erase(move |resolver| f(resolver).map(|v| Arc::new(v) as Instance)),
        }
    }

    /// A function that takes no arguments.
    pub fn from_fn<T: Injectable, F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            signature: Arc::from(Vec::new()),
            call: erase(move |_| Ok(Arc::new(f()) as Instance)),
        }
    }

    /// A function that declares the container itself as its parameter.
    ///
    /// Such functions are representable but never invoked: building them
    /// fails with [`DiError::SelfInjectionForbidden`].
    pub fn with_container<T: Injectable, F>(f: F) -> Self
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            signature: Arc::from(vec![ParamType::Class(Identifier::of::<Container>())]),
            call: erase(move |resolver| f(resolver.container()).map(|v| Arc::new(v) as Instance)),
        }
    }

    /// A function with an explicit signature that returns an erased instance.
    pub fn raw<F>(signature: Vec<ParamType>, f: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            signature: Arc::from(signature),
            call: erase(f),
        }
    }

    /// Declared parameter types, in order.
    #[inline]
    pub fn signature(&self) -> &[ParamType] {
        &self.signature
    }

    /// True if any declared parameter is the container type.
    #[inline]
    pub fn declares_container(&self) -> bool {
        self.signature.iter().any(ParamType::is_container)
    }

    /// Invoke the function.
    #[inline]
    pub(crate) fn invoke(&self, resolver: &Resolver<'_>) -> Result<Instance> {
        (self.call)(resolver)
    }
}

impl fmt::Debug for FunctionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionFactory")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestService {
        id: u32,
    }

    #[test]
    fn test_signatures() {
        let plain = FunctionFactory::from_fn(|| TestService { id: 1 });
        let with_resolver = FunctionFactory::new(|_| Ok(TestService { id: 2 }));
        let with_container = FunctionFactory::with_container(|_| Ok(TestService { id: 3 }));

        assert!(plain.signature().is_empty());
        assert_eq!(with_resolver.signature(), &[ParamType::Untyped]);
        assert!(!with_resolver.declares_container());
        assert!(with_container.declares_container());
    }

    #[test]
    fn test_from_dynamic_accepts_names_and_functions() {
        let id = Identifier::from("svc");

        assert!(matches!(
            Factory::from_dynamic(&id, "Concrete"),
            Ok(Factory::TypeName(name)) if name == "Concrete"
        ));
        assert!(matches!(
            Factory::from_dynamic(&id, String::from("Concrete")),
            Ok(Factory::TypeName(_))
        ));
        assert!(matches!(
            Factory::from_dynamic(&id, FunctionFactory::from_fn(|| TestService { id: 0 })),
            Ok(Factory::Function(_))
        ));
    }

    #[test]
    fn test_from_dynamic_rejects_other_values() {
        let id = Identifier::from("X");
        let err = Factory::from_dynamic(&id, 42_i32).unwrap_err();

        assert_eq!(
            err,
            DiError::InvalidArgumentKind {
                identifier: id,
                found: "i32".into(),
            }
        );
    }

    #[test]
    fn test_empty_type_name_is_invalid() {
        let id = Identifier::from("X");
        assert!(Factory::type_name("").validate(&id).is_err());
        assert!(Factory::type_name("Y").validate(&id).is_ok());
    }

    #[test]
    fn test_factory_invocation_boxes_the_value() {
        let container = Container::new();
        let factory = FunctionFactory::from_fn(|| TestService { id: 7 });

        let instance = factory.invoke(&container.resolver()).unwrap();
        let service = instance.downcast::<TestService>().unwrap();
        assert_eq!(service.id, 7);
    }
}

//! Identifiers and resolved instances
//!
//! An [`Identifier`] names anything the container can resolve: a type name,
//! an interface name or an arbitrary string key.

use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A resolved object.
///
/// Instances are type-erased; use `Arc::downcast` or the typed helpers on
/// [`Container`](crate::Container) to get the concrete type back.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Marker trait for types that can be stored in the container.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
pub trait Injectable: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Injectable for T {}

/// Key naming a resolvable service.
///
/// Cloning is cheap (the name is reference counted).
///
/// # Examples
///
/// ```rust
/// use service_container::Identifier;
///
/// struct Mailer;
///
/// let by_name = Identifier::from("mailer");
/// let by_type = Identifier::of::<Mailer>();
///
/// assert_eq!(by_name.as_str(), "mailer");
/// assert!(by_type.as_str().ends_with("Mailer"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Create an identifier from any string.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Identifier of a Rust type, derived from `std::any::type_name`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Arc::from(std::any::type_name::<T>()))
    }

    /// The identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identifier, which never names a type.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&&*self.0).finish()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    #[inline]
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identifier {
    #[inline]
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&String> for Identifier {
    #[inline]
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<&Identifier> for Identifier {
    #[inline]
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

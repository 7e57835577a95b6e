//! Error types for service resolution

use crate::Identifier;
use thiserror::Error;

/// Errors that can occur while binding or resolving services.
///
/// Every variant aborts the resolution call that produced it; the container
/// never retries and never returns a partially built graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// A binding's factory is neither a construction function nor a type name
    #[error("Invalid factory for [{identifier}]: expected a construction function or a type name, got {found}")]
    InvalidArgumentKind {
        identifier: Identifier,
        found: String,
    },

    /// The identifier was requested while already on the active build path
    #[error("Circular dependency [{identifier}] while resolving {path}")]
    CircularDependency {
        identifier: Identifier,
        path: String,
    },

    /// No type with this name is known to the introspection facility
    #[error("Target type [{identifier}] does not exist")]
    TargetNotFound { identifier: Identifier },

    /// An interface or abstract type has no binding
    #[error("Abstract or interface [{identifier}] is not bound")]
    UnboundAbstractType { identifier: Identifier },

    /// The type exists but cannot be constructed
    #[error("Target type [{identifier}] is not instantiable")]
    NotInstantiable { identifier: Identifier },

    /// A constructor parameter has no resolvable declared type
    #[error("Cannot resolve parameter ${parameter} of [{target}]")]
    UnresolvableParameter {
        parameter: String,
        target: Identifier,
    },

    /// A factory or constructor declares the container itself as a dependency
    #[error("Injecting the container into services is forbidden (requested by [{target}])")]
    SelfInjectionForbidden { target: Identifier },

    /// The resolved instance is not of the requested Rust type
    #[error("Service [{identifier}] is not a {expected}")]
    TypeMismatch {
        identifier: Identifier,
        expected: &'static str,
    },

    /// A factory or instantiator reported its own failure
    #[error("Failed to create service [{identifier}]: {reason}")]
    CreationFailed {
        identifier: Identifier,
        reason: String,
    },

    /// An instantiator consumed more arguments than its constructor declares
    #[error("Constructor of [{target}] has no argument at position {index}")]
    MissingArgument { target: Identifier, index: usize },

    /// A named bootstrap provider does not implement the provider capability
    #[error("[{provider}] must implement ServiceProvider")]
    NotAServiceProvider { provider: Identifier },
}

impl DiError {
    /// Create an InvalidArgumentKind error
    #[inline]
    pub fn invalid_argument(identifier: &Identifier, found: impl Into<String>) -> Self {
        Self::InvalidArgumentKind {
            identifier: identifier.clone(),
            found: found.into(),
        }
    }

    /// Create a CircularDependency error
    #[inline]
    pub fn circular(identifier: &Identifier, path: impl Into<String>) -> Self {
        Self::CircularDependency {
            identifier: identifier.clone(),
            path: path.into(),
        }
    }

    /// Create a TargetNotFound error
    #[inline]
    pub fn not_found(identifier: &Identifier) -> Self {
        Self::TargetNotFound {
            identifier: identifier.clone(),
        }
    }

    /// Create an UnboundAbstractType error
    #[inline]
    pub fn unbound_abstract(identifier: &Identifier) -> Self {
        Self::UnboundAbstractType {
            identifier: identifier.clone(),
        }
    }

    /// Create a NotInstantiable error
    #[inline]
    pub fn not_instantiable(identifier: &Identifier) -> Self {
        Self::NotInstantiable {
            identifier: identifier.clone(),
        }
    }

    /// Create an UnresolvableParameter error
    #[inline]
    pub fn unresolvable(parameter: impl Into<String>, target: &Identifier) -> Self {
        Self::UnresolvableParameter {
            parameter: parameter.into(),
            target: target.clone(),
        }
    }

    /// Create a SelfInjectionForbidden error
    #[inline]
    pub fn self_injection(target: &Identifier) -> Self {
        Self::SelfInjectionForbidden {
            target: target.clone(),
        }
    }

    /// Create a TypeMismatch error for type T
    #[inline]
    pub fn type_mismatch<T: ?Sized + 'static>(identifier: &Identifier) -> Self {
        Self::TypeMismatch {
            identifier: identifier.clone(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(identifier: &Identifier, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            identifier: identifier.clone(),
            reason: reason.into(),
        }
    }

    /// True for the errors raised by cycle detection.
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, DiError>;

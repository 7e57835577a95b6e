//! # Service Container - Auto-wiring Dependency Injection for Rust
//!
//! A string-keyed service container that registers construction rules
//! ("bindings"), resolves identifiers into instances, caches shared
//! instances and builds object graphs by resolving constructor parameters.
//!
//! ## Features
//!
//! - **Bindings** - Bind an identifier to a construction function or a type name
//! - **Shared instances** - Shared bindings are built once and cached
//! - **Auto-wiring** - Unbound types are built from their declared constructor parameters
//! - **Cycle detection** - Circular dependencies fail with the offending path
//! - **Lock-free** - Uses `DashMap` for concurrent access without blocking
//! - **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use service_container::Container;
//! use std::sync::Arc;
//!
//! struct ConsoleLogger;
//!
//! let container = Container::new();
//! container.singleton_fn("Logger", |_| Ok(ConsoleLogger));
//!
//! let first = container.resolve("Logger").unwrap();
//! let second = container.resolve("Logger").unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```
//!
//! ## Auto-wiring
//!
//! ```rust
//! use service_container::{Arguments, Autowire, Container, Parameter, Result};
//! use std::sync::Arc;
//!
//! struct Repository;
//!
//! impl Autowire for Repository {
//!     fn parameters() -> Vec<Parameter> { vec![] }
//!     fn construct(_: &mut Arguments) -> Result<Self> { Ok(Repository) }
//! }
//!
//! struct Service { repo: Arc<Repository> }
//!
//! impl Autowire for Service {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![Parameter::of::<Repository>("repo")]
//!     }
//!     fn construct(args: &mut Arguments) -> Result<Self> {
//!         Ok(Service { repo: args.take()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_type::<Repository>();
//! container.register_type::<Service>();
//!
//! // Neither type is bound: both are built from their descriptors.
//! let service = container.make::<Service>().unwrap();
//! ```
//!
//! ## Interfaces
//!
//! ```rust
//! use service_container::{Container, DiError, TypeDescriptor};
//!
//! struct ConsoleLogger;
//!
//! let container = Container::new();
//! container.register_abstract("Logger");
//! container.register_descriptor(TypeDescriptor::concrete("ConsoleLogger", vec![], |_| Ok(ConsoleLogger)));
//!
//! assert!(matches!(
//!     container.resolve("Logger"),
//!     Err(DiError::UnboundAbstractType { .. })
//! ));
//!
//! container.bind_type("Logger", "ConsoleLogger", false).unwrap();
//! let logger = container.resolve_as::<ConsoleLogger>("Logger").unwrap();
//! ```

extern crate self as service_container;

mod container;
mod error;
mod factory;
mod identifier;
mod introspect;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod stack;
mod storage;

pub use container::*;
pub use error::*;
pub use factory::*;
pub use identifier::*;
pub use introspect::*;
pub use provider::*;

#[cfg(feature = "derive")]
pub use service_container_derive::Autowire;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Arguments, Autowire, BootOrder, Bootstrap, Container, DiError, Factory, FunctionFactory,
        Identifier, Injectable, Instance, Parameter, Resolver, Result, ServiceProvider,
        TypeDescriptor,
    };
    pub use std::sync::Arc;
}

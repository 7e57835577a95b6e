#![no_main]

//! Fuzz target for binding and resolution
//!
//! Builds random graphs of aliases, functions and auto-wired types over a
//! small set of identifiers (so cycles are common) and resolves them.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use service_container::{Container, DiError, Factory, Identifier, Parameter, TypeDescriptor};
use std::sync::Arc;

const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", ""];

fn name(index: u8) -> &'static str {
    NAMES[index as usize % NAMES.len()]
}

/// Operations to perform on the container
#[derive(Debug, Arbitrary)]
enum ContainerOp {
    /// Register a concrete type whose constructor needs the given types
    RegisterType { target: u8, deps: Vec<u8> },
    RegisterAbstract(u8),
    RegisterPrivate(u8),
    BindSelf { target: u8, shared: bool },
    BindAlias { target: u8, to: u8, shared: bool },
    BindValue { target: u8, value: u32, shared: bool },
    BindFailing(u8),
    BindDynamicInt(u8, i64),
    Resolve(u8),
    Build(u8),
    Has(u8),
    IsShared(u8),
}

fn descriptor(target: &'static str, deps: &[u8]) -> TypeDescriptor {
    let parameters = deps
        .iter()
        .take(4)
        .enumerate()
        .map(|(i, dep)| Parameter::class(format!("p{i}"), name(*dep)))
        .collect();
    TypeDescriptor::concrete(target, parameters, |args| {
        let mut count = 0usize;
        while args.remaining() > 0 {
            args.next_instance()?;
            count += 1;
        }
        Ok(count)
    })
}

fuzz_target!(|ops: Vec<ContainerOp>| {
    let container = Container::new();

    for op in ops {
        match op {
            ContainerOp::RegisterType { target, deps } => {
                container.register_descriptor(descriptor(name(target), &deps));
            }
            ContainerOp::RegisterAbstract(target) => {
                container.register_abstract(name(target));
            }
            ContainerOp::RegisterPrivate(target) => {
                container.register_descriptor(descriptor(name(target), &[]).private());
            }
            ContainerOp::BindSelf { target, shared } => {
                let result = container.bind(name(target), None, shared);
                assert_eq!(result.is_err(), name(target).is_empty());
            }
            ContainerOp::BindAlias { target, to, shared } => {
                let result = container.bind(name(target), Some(Factory::type_name(name(to))), shared);
                assert_eq!(result.is_err(), name(to).is_empty());
            }
            ContainerOp::BindValue {
                target,
                value,
                shared,
            } => {
                container.bind_fn(name(target), move |_| Ok(value), shared);
            }
            ContainerOp::BindFailing(target) => {
                container.bind_fn(
                    name(target),
                    |r| -> service_container::Result<u32> {
                        Err(DiError::creation_failed(&Identifier::from("failing"), format!("{r:?}")))
                    },
                    false,
                );
            }
            ContainerOp::BindDynamicInt(target, value) => {
                let err = container.bind_dynamic(name(target), value, false).unwrap_err();
                assert!(matches!(err, DiError::InvalidArgumentKind { .. }));
            }
            ContainerOp::Resolve(target) => {
                let id = name(target);
                let first = container.resolve(id);
                if let Ok(first) = first {
                    if container.is_shared(id) {
                        let second = container.resolve(id).unwrap();
                        assert!(Arc::ptr_eq(&first, &second));
                    }
                }
            }
            ContainerOp::Build(target) => {
                let _ = container.build(&Factory::type_name(name(target)));
            }
            ContainerOp::Has(target) => {
                let id = name(target);
                if container.is_bound(id) {
                    assert!(container.has(id));
                }
            }
            ContainerOp::IsShared(target) => {
                let id = name(target);
                if container.is_shared(id) {
                    assert!(container.is_bound(id));
                }
            }
        }

        // Every call unwinds its frames, successful or not
        assert!(container.build_stack().is_empty());
    }
});

//! Build stack used for circular-dependency detection
//!
//! The stack holds the identifiers currently under resolution on this
//! thread, tagged with the container that is resolving them. Frames are
//! pushed by [`BuildGuard::push`] and popped when the guard drops, which
//! covers early returns through `?` as well as panics unwinding through a
//! factory.

use crate::{DiError, Identifier, Result};
use std::cell::RefCell;

#[cfg(feature = "logging")]
use tracing::trace;

struct Frame {
    owner: usize,
    identifier: Identifier,
}

thread_local! {
    static BUILD_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Fail with `CircularDependency` if `identifier` is already being built by
/// container `owner` on this thread.
pub(crate) fn check(owner: usize, identifier: &Identifier) -> Result<()> {
    BUILD_STACK.with(|stack| {
        let stack = stack.borrow();
        let on_path = stack
            .iter()
            .any(|f| f.owner == owner && f.identifier == *identifier);

        if !on_path {
            return Ok(());
        }

        let path = stack
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| f.identifier.as_str())
            .chain(std::iter::once(identifier.as_str()))
            .collect::<Vec<_>>()
            .join(" -> ");

        #[cfg(feature = "logging")]
        trace!(
            target: "service_container",
            service = identifier.as_str(),
            path = path.as_str(),
            "Circular dependency detected"
        );

        Err(DiError::circular(identifier, path))
    })
}

/// Identifiers being built by container `owner` on this thread, outermost first.
pub(crate) fn path(owner: usize) -> Vec<Identifier> {
    BUILD_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| f.identifier.clone())
            .collect()
    })
}

/// Scoped build-stack frame.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub(crate) struct BuildGuard {
    /// Stack length before the push
    depth: usize,
}

impl BuildGuard {
    /// Push `identifier` for container `owner`.
    pub(crate) fn push(owner: usize, identifier: &Identifier) -> Self {
        BUILD_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push(Frame {
                owner,
                identifier: identifier.clone(),
            });
            Self { depth }
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown
        let _ = BUILD_STACK.try_with(|stack| {
            if let Ok(mut stack) = stack.try_borrow_mut() {
                stack.truncate(self.depth);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pops_on_drop() {
        let a = Identifier::from("A");
        {
            let _guard = BuildGuard::push(1, &a);
            assert_eq!(path(1), vec![a.clone()]);
            assert!(check(1, &a).is_err());
        }
        assert!(path(1).is_empty());
        assert!(check(1, &a).is_ok());
    }

    #[test]
    fn test_cycle_error_reports_path() {
        let a = Identifier::from("A");
        let b = Identifier::from("B");

        let _ga = BuildGuard::push(2, &a);
        let _gb = BuildGuard::push(2, &b);

        let err = check(2, &a).unwrap_err();
        assert_eq!(err, DiError::circular(&a, "A -> B -> A"));
    }

    #[test]
    fn test_frames_are_isolated_per_owner() {
        let a = Identifier::from("A");

        let _guard = BuildGuard::push(3, &a);
        assert!(check(3, &a).is_err());
        assert!(check(4, &a).is_ok());
        assert!(path(4).is_empty());
    }

    #[test]
    fn test_frames_are_isolated_per_thread() {
        let a = Identifier::from("A");
        let _guard = BuildGuard::push(5, &a);

        let handle = std::thread::spawn(move || check(5, &Identifier::from("A")).is_ok());
        assert!(handle.join().unwrap());
    }
}

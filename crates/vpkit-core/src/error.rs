#![forbid(unsafe_code)]

//! Error taxonomy for container construction and dependency resolution.
//!
//! Both variants indicate wiring mistakes, not runtime conditions: they are
//! surfaced loudly at the `try_get`/`resolve` call site and never retried.
//! A half-configured reactive graph is worse than a visible failure, so there
//! is no silent fallback to a default instance anywhere in the container.

use thiserror::Error;

/// Errors produced by [`Context`](crate::Context) service lookup and
/// [`DependencyRegistry`](crate::DependencyRegistry) resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A service's construction transitively re-entered its own construction.
    ///
    /// `cycle` is the readable construction path, e.g.
    /// `"app::ControlService -> app::StatusService -> app::ControlService"`.
    #[error("service construction cycle: {cycle}")]
    CyclicConstruction {
        /// The construction path that closed the cycle.
        cycle: String,
    },

    /// A dependency key has neither a fallback factory nor an override.
    ///
    /// Production keys recover by providing a fallback; test code must
    /// install an override before the first resolve.
    #[error("unregistered dependency `{name}`: no fallback factory and no override installed")]
    UnregisteredDependency {
        /// Type name of the unresolvable dependency.
        name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_construction_display_includes_path() {
        let err = ContextError::CyclicConstruction {
            cycle: "A -> B -> A".to_string(),
        };
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn unregistered_dependency_display_includes_name() {
        let err = ContextError::UnregisteredDependency { name: "MediaHandle" };
        assert!(err.to_string().contains("MediaHandle"));
        assert!(err.to_string().contains("override"));
    }
}

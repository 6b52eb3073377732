//! Delegate construction strategies.
//!
//! A strategy turns an already classified member descriptor into a delegate.
//! The factory rejects unsupported members before a strategy is consulted,
//! so strategy methods cannot fail. Both strategies produce delegates that
//! are observably identical: same values, same errors, same side effects.
//!
//! Strategies are only reachable through [`DelegateFactory`](crate::DelegateFactory),
//! so every delegate passes its classification checks first:
//!
//! ```compile_fail
//! use reflectforge::strategy::{for_kind, StrategyKind};
//!
//! let _ = for_kind(StrategyKind::Fallback);
//! ```
//!
//! ```compile_fail
//! use reflectforge::DelegateStrategy;
//! ```

mod checks;
#[cfg(feature = "jit")]
mod compiled;
mod late_bound;

use std::fmt;
use std::sync::Arc;

use reflectforge_core::{ConstructorInfo, FieldInfo, MethodInfo, PropertyInfo, TypeDef};

use crate::capability::dynamic_code_generation;
use crate::delegate::{DefaultConstructor, Getter, MethodCall, ObjectConstructor, Setter};

#[cfg(feature = "jit")]
pub(crate) use compiled::CompiledStrategy;
pub(crate) use late_bound::LateBoundStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Generates machine code per member.
    Compiling,
    /// Resolves members by name on every call.
    Fallback,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Compiling => f.write_str("compiling"),
            StrategyKind::Fallback => f.write_str("fallback"),
        }
    }
}

/// Builds delegates for members the factory has accepted.
///
/// Callers guarantee the preconditions noted on each method.
pub(crate) trait DelegateStrategy: Send + Sync + fmt::Debug {
    fn kind(&self) -> StrategyKind;

    fn field_getter(&self, field: &FieldInfo) -> Getter;

    /// `property` has a getter and does not return by reference.
    fn property_getter(&self, property: &PropertyInfo) -> Getter;

    /// `field` is not read-only.
    fn field_setter(&self, field: &FieldInfo) -> Setter;

    /// `property` has a setter.
    fn property_setter(&self, property: &PropertyInfo) -> Setter;

    fn method_call(&self, method: &MethodInfo) -> MethodCall;

    /// The declaring type is not abstract.
    fn parameterized_constructor(&self, ctor: &ConstructorInfo) -> ObjectConstructor;

    /// Runs `ctor` with no arguments, or allocates an all-defaults instance
    /// of `ty` when `ctor` is `None`.
    fn default_constructor(
        &self,
        ty: &Arc<TypeDef>,
        ctor: Option<&ConstructorInfo>,
    ) -> DefaultConstructor;
}

static LATE_BOUND: LateBoundStrategy = LateBoundStrategy;
#[cfg(feature = "jit")]
static COMPILED: CompiledStrategy = CompiledStrategy;

/// Returns the singleton for `kind`.
///
/// Without the `jit` feature, `Compiling` maps to the fallback strategy.
pub(crate) fn for_kind(kind: StrategyKind) -> &'static dyn DelegateStrategy {
    match kind {
        #[cfg(feature = "jit")]
        StrategyKind::Compiling => &COMPILED,
        #[cfg(not(feature = "jit"))]
        StrategyKind::Compiling => &LATE_BOUND,
        StrategyKind::Fallback => &LATE_BOUND,
    }
}

/// Strategies usable in this process. Always includes `Fallback`.
pub fn available() -> Vec<StrategyKind> {
    if dynamic_code_generation() {
        vec![StrategyKind::Compiling, StrategyKind::Fallback]
    } else {
        vec![StrategyKind::Fallback]
    }
}

//! The accessor factory.
//!
//! Classifies members and rejects the ones no strategy can serve, then hands
//! accepted members to the active strategy. Every construction-time error is
//! raised here, so the choice of strategy never changes which members are
//! supported.

#[cfg(test)]
mod tests;

use std::sync::{Arc, OnceLock};

use reflectforge_config::{AccessorConfig, StrategyPolicy};
use reflectforge_core::error::Result;
use reflectforge_core::{
    AccessorError, ConstructorInfo, FieldInfo, Member, MethodInfo, PropertyInfo, TypeDef,
    TypeKind, Visibility,
};
use tracing::{debug, trace, warn};

use crate::capability::dynamic_code_generation;
use crate::delegate::{DefaultConstructor, Getter, MethodCall, ObjectConstructor, Setter};
use crate::strategy::{self, DelegateStrategy, StrategyKind};

static INSTANCE: OnceLock<DelegateFactory> = OnceLock::new();

/// Creates typed accessors for runtime members.
#[derive(Debug, Clone, Copy)]
pub struct DelegateFactory {
    strategy: &'static dyn DelegateStrategy,
    non_public_default_constructor: bool,
}

impl DelegateFactory {
    /// The process-wide factory, built on first use from the default
    /// configuration.
    ///
    /// Uses the compiling strategy when runtime code generation is available
    /// and the fallback strategy otherwise. The choice never changes
    /// afterwards.
    pub fn instance() -> &'static DelegateFactory {
        INSTANCE.get_or_init(|| Self::from_config(&AccessorConfig::default()))
    }

    pub fn from_config(config: &AccessorConfig) -> Self {
        let kind = match config.strategy {
            StrategyPolicy::Auto if dynamic_code_generation() => StrategyKind::Compiling,
            StrategyPolicy::Auto | StrategyPolicy::Fallback => StrategyKind::Fallback,
        };
        debug!(event = "strategy_selected", strategy = %kind, policy = ?config.strategy);
        Self {
            strategy: strategy::for_kind(kind),
            non_public_default_constructor: config.non_public_default_constructor,
        }
    }

    /// A factory using `kind`. Asking for `Compiling` on a host without code
    /// generation yields the fallback strategy.
    pub fn with_strategy(kind: StrategyKind) -> Self {
        let kind = match kind {
            StrategyKind::Compiling if !dynamic_code_generation() => {
                warn!(event = "strategy_unavailable", requested = %kind);
                StrategyKind::Fallback
            }
            kind => kind,
        };
        debug!(event = "strategy_selected", strategy = %kind);
        Self {
            strategy: strategy::for_kind(kind),
            non_public_default_constructor: AccessorConfig::default().non_public_default_constructor,
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Getter for a field or property.
    pub fn create_get(&self, member: &Member) -> Result<Getter> {
        match member {
            Member::Field(field) => self.create_field_get(field),
            Member::Property(property) => self.create_property_get(property),
            _ => Err(AccessorError::unsupported_kind("getter", member)),
        }
    }

    pub fn create_field_get(&self, field: &FieldInfo) -> Result<Getter> {
        trace!(event = "create_getter", member = %field, strategy = %self.strategy_kind());
        Ok(self.strategy.field_getter(field))
    }

    pub fn create_property_get(&self, property: &PropertyInfo) -> Result<Getter> {
        let def = property.def();
        if def.by_ref {
            return Err(AccessorError::UnsupportedReturnShape {
                member: property.name().to_string(),
                declaring_type: property.declaring_type().name().to_string(),
            });
        }
        if !def.is_readable() {
            return Err(AccessorError::NotReadable {
                member: property.name().to_string(),
                declaring_type: property.declaring_type().name().to_string(),
            });
        }
        trace!(event = "create_getter", member = %property, strategy = %self.strategy_kind());
        Ok(self.strategy.property_getter(property))
    }

    /// Setter for a field or property.
    pub fn create_set(&self, member: &Member) -> Result<Setter> {
        match member {
            Member::Field(field) => self.create_field_set(field),
            Member::Property(property) => self.create_property_set(property),
            _ => Err(AccessorError::unsupported_kind("setter", member)),
        }
    }

    pub fn create_field_set(&self, field: &FieldInfo) -> Result<Setter> {
        if field.is_readonly() {
            return Err(AccessorError::NotWritable {
                member: field.name().to_string(),
                declaring_type: field.declaring_type().name().to_string(),
            });
        }
        trace!(event = "create_setter", member = %field, strategy = %self.strategy_kind());
        Ok(self.strategy.field_setter(field))
    }

    pub fn create_property_set(&self, property: &PropertyInfo) -> Result<Setter> {
        if !property.def().is_writable() {
            return Err(AccessorError::NotWritable {
                member: property.name().to_string(),
                declaring_type: property.declaring_type().name().to_string(),
            });
        }
        trace!(event = "create_setter", member = %property, strategy = %self.strategy_kind());
        Ok(self.strategy.property_setter(property))
    }

    pub fn create_method_call(&self, method: &MethodInfo) -> Result<MethodCall> {
        trace!(event = "create_method_call", member = %method, strategy = %self.strategy_kind());
        Ok(self.strategy.method_call(method))
    }

    pub fn create_parameterized_constructor(
        &self,
        ctor: &ConstructorInfo,
    ) -> Result<ObjectConstructor> {
        let ty = ctor.declaring_type();
        if ty.kind() == TypeKind::Abstract {
            return Err(AccessorError::ConstructionUnavailable {
                declaring_type: ty.name().to_string(),
                reason: "type is abstract",
            });
        }
        trace!(event = "create_constructor", member = %ctor, strategy = %self.strategy_kind());
        Ok(self.strategy.parameterized_constructor(ctor))
    }

    /// Parameterless construction of `ty`.
    ///
    /// Runs the zero-argument constructor if one is declared and visible;
    /// otherwise value types get an all-defaults instance and classes fail.
    pub fn create_default_constructor(
        &self,
        ty: &Arc<TypeDef>,
    ) -> Result<DefaultConstructor> {
        if ty.kind() == TypeKind::Abstract {
            return Err(AccessorError::ConstructionUnavailable {
                declaring_type: ty.name().to_string(),
                reason: "type is abstract",
            });
        }
        let ctor = ty.constructor(0).filter(|ctor| {
            self.non_public_default_constructor || ctor.def().visibility == Visibility::Public
        });
        if ctor.is_none() && ty.kind() == TypeKind::Class {
            return Err(AccessorError::ConstructionUnavailable {
                declaring_type: ty.name().to_string(),
                reason: "no parameterless constructor",
            });
        }
        trace!(event = "create_constructor", member = ty.name(), strategy = %self.strategy_kind());
        Ok(self.strategy.default_constructor(ty, ctor.as_ref()))
    }
}

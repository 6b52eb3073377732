//! ReflectForge - typed accessors for runtime-described members.
//!
//! [`DelegateFactory`] turns member descriptors (fields, properties, methods,
//! constructors of a [`TypeDef`]) into callable delegates. Two strategies
//! build them:
//!
//! - **Compiling**: generates native code per member with Cranelift and binds
//!   everything else once.
//! - **Fallback**: resolves the member by name on every call.
//!
//! Which one is used depends on whether the process can generate code at
//! runtime ([`dynamic_code_generation`]). The two are interchangeable: same
//! results, same errors, same side effects.
//!
//! # Examples
//!
//! ```
//! use reflectforge::{DelegateFactory, DynamicObject, DynamicValue, FieldDef, TypeBuilder, ValueType};
//!
//! let ty = TypeBuilder::value_type("Point")
//!     .field(FieldDef::new("x", ValueType::I64))
//!     .build()
//!     .unwrap();
//!
//! let factory = DelegateFactory::instance();
//! let member = ty.member("x").unwrap();
//! let get = factory.create_get(&member).unwrap();
//! let set = factory.create_set(&member).unwrap();
//!
//! let mut p = DynamicObject::new(&ty);
//! set.set(&mut p, 7i64.into()).unwrap();
//! assert_eq!(get.get(&p).unwrap(), DynamicValue::I64(7));
//! ```

mod capability;
pub mod delegate;
mod factory;
#[cfg(feature = "jit")]
pub mod jit;
pub mod strategy;

pub use capability::{dynamic_code_generation, Capability};
pub use delegate::{DefaultConstructor, Getter, MethodCall, ObjectConstructor, Setter};
pub use factory::DelegateFactory;
pub use strategy::StrategyKind;

pub use reflectforge_config::{AccessorConfig, ConfigError, StrategyPolicy};
pub use reflectforge_core::{
    AccessorError, CallError, ConstructorDef, ConstructorInfo, DefinitionError, DynamicObject,
    DynamicValue, Expr, FieldDef, FieldInfo, Member, MemberError, MemberKind, MethodDef,
    MethodInfo, PropertyDef, PropertyInfo, TypeBuilder, TypeDef, TypeKind, ValueType, Visibility,
};

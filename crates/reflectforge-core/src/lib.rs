//! ReflectForge Core - runtime type model for the accessor layer
//!
//! This crate provides what the accessor factory reflects over:
//! - Erased values (`DynamicValue`) and declared types (`ValueType`)
//! - Runtime type definitions and their builder
//! - Member descriptors (fields, properties, methods, constructors)
//! - Instances with a flat slot layout for compiled access
//! - Expression trees for computed properties
//! - The construction/call error taxonomy

pub mod descriptor;
pub mod error;
pub mod expr;
pub mod member;
pub mod object;
pub mod value;

pub use descriptor::{
    ConstructorBody, ConstructorDef, FieldDef, FieldStorage, MethodBody, MethodDef, NativeGetter,
    NativeSetter, PropertyDef, PropertyGetter, TypeBuilder, TypeDef, TypeKind, Visibility,
};
pub use error::{AccessorError, CallError, DefinitionError, MemberError};
pub use expr::Expr;
pub use member::{ConstructorInfo, FieldInfo, Member, MemberKind, MethodInfo, PropertyInfo};
pub use object::DynamicObject;
pub use value::{DynamicValue, ValueType};

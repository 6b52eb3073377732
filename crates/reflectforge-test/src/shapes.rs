//! Construction edge cases: an abstract type and a class whose only
//! parameterless constructor is non-public.

use std::sync::Arc;

use reflectforge_core::{ConstructorDef, FieldDef, MethodDef, TypeBuilder, TypeDef, ValueType};

use crate::int_field;

/// Abstract `Shape` with a one-argument constructor that must never run.
pub fn shape_type() -> Arc<TypeDef> {
    TypeBuilder::abstract_type("Shape")
        .field(FieldDef::new("sides", ValueType::I64))
        .method(MethodDef::new("area", vec![], ValueType::I64, |_, _| {
            Ok(0i64.into())
        }))
        .constructor(ConstructorDef::new(vec![ValueType::I64], |obj, args| {
            obj.set_field("sides", args[0].clone())?;
            Ok(())
        }))
        .build()
        .expect("Shape fixture is valid")
}

/// `Counter` starts at 1 when built through its non-public parameterless
/// constructor, and at 0 when allocated with defaults.
pub fn counter_type() -> Arc<TypeDef> {
    TypeBuilder::class("Counter")
        .field(FieldDef::new("count", ValueType::I64))
        .method(MethodDef::new("increment", vec![], ValueType::I64, |obj, _| {
            let count = int_field(obj, "count")? + 1;
            obj.set_field("count", count.into())?;
            Ok(count.into())
        }))
        .method(MethodDef::new("explode", vec![], ValueType::Unit, |_, _| {
            panic!("counter exploded")
        }))
        .constructor(
            ConstructorDef::new(vec![], |obj, _| {
                obj.set_field("count", 1i64.into())?;
                Ok(())
            })
            .non_public(),
        )
        .build()
        .expect("Counter fixture is valid")
}

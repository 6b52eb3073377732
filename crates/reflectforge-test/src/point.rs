//! `Point` value type fixture.
//!
//! Field declaration order (indices used by computed properties):
//!
//! | # | name | type |
//! |---|---|---|
//! | 0 | x | i64 |
//! | 1 | y | i64 |
//! | 2 | weight | f64 |
//! | 3 | visible | bool |
//! | 4 | label | string |
//! | 5 | tags | list |

use std::sync::Arc;

use reflectforge_core::{
    DynamicObject, DynamicValue, Expr, FieldDef, MethodDef, PropertyDef, TypeBuilder, TypeDef,
    ValueType,
};

use crate::{bool_field, int_field, str_field};

pub const X: usize = 0;
pub const Y: usize = 1;
pub const VISIBLE: usize = 3;

/// Builds a fresh `Point` definition. Each call is a distinct type.
pub fn point_type() -> Arc<TypeDef> {
    let x = || Expr::field(X);
    let y = || Expr::field(Y);

    TypeBuilder::value_type("Point")
        .field(FieldDef::new("x", ValueType::I64))
        .field(FieldDef::new("y", ValueType::I64))
        .field(FieldDef::new("weight", ValueType::F64))
        .field(FieldDef::new("visible", ValueType::Bool))
        .field(FieldDef::new("label", ValueType::String))
        .field(FieldDef::new("tags", ValueType::List))
        .property(PropertyDef::computed("sum", ValueType::I64, x() + y()))
        .property(PropertyDef::computed(
            "manhattan",
            ValueType::I64,
            Expr::abs(x()) + Expr::abs(y()),
        ))
        .property(PropertyDef::computed(
            "is_origin",
            ValueType::Bool,
            Expr::and(Expr::eq(x(), Expr::int(0)), Expr::eq(y(), Expr::int(0))),
        ))
        .property(PropertyDef::computed(
            "hidden",
            ValueType::Bool,
            !Expr::field(VISIBLE),
        ))
        .property(PropertyDef::computed(
            "spread",
            ValueType::I64,
            Expr::if_then_else(
                Expr::ge(x(), y()),
                x() - y(),
                Expr::max(y() - x(), Expr::int(0)),
            ),
        ))
        .property(PropertyDef::computed(
            "clamped_x",
            ValueType::I64,
            Expr::min(Expr::max(x(), Expr::int(-100)), Expr::int(100)),
        ))
        .property(
            PropertyDef::new("display", ValueType::String).with_getter(|obj| {
                let label = str_field(obj, "label")?;
                let x = int_field(obj, "x")?;
                let y = int_field(obj, "y")?;
                Ok(format!("{label}({x}, {y})").into())
            }),
        )
        .property(
            PropertyDef::new("position", ValueType::I64)
                .with_getter(|obj| Ok(int_field(obj, "x")?.into()))
                .with_setter(|obj, value| {
                    obj.set_field("x", value)?;
                    Ok(())
                }),
        )
        .property(
            PropertyDef::new("reset_to", ValueType::I64).with_setter(|obj, value| {
                obj.set_field("x", value.clone())?;
                obj.set_field("y", value)?;
                Ok(())
            }),
        )
        .property(
            PropertyDef::new("x_ref", ValueType::I64)
                .with_getter(|obj| Ok(int_field(obj, "x")?.into()))
                .by_ref(),
        )
        .method(MethodDef::new(
            "translate",
            vec![ValueType::I64, ValueType::I64],
            ValueType::Unit,
            |obj, args| {
                let dx = args[0].as_i64().unwrap_or(0);
                let dy = args[1].as_i64().unwrap_or(0);
                let x = int_field(obj, "x")?;
                let y = int_field(obj, "y")?;
                obj.set_field("x", x.wrapping_add(dx).into())?;
                obj.set_field("y", y.wrapping_add(dy).into())?;
                Ok(DynamicValue::Bool(true))
            },
        ))
        .method(MethodDef::new(
            "dot",
            vec![ValueType::I64, ValueType::I64],
            ValueType::I64,
            |obj, args| {
                let ox = args[0].as_i64().unwrap_or(0);
                let oy = args[1].as_i64().unwrap_or(0);
                let x = int_field(obj, "x")?;
                let y = int_field(obj, "y")?;
                Ok((x * ox + y * oy).into())
            },
        ))
        .method(MethodDef::new(
            "is_shown",
            vec![],
            ValueType::Bool,
            |obj, _| Ok(bool_field(obj, "visible")?.into()),
        ))
        .build()
        .expect("Point fixture is valid")
}

/// A `Point` instance with the given coordinates and all else default.
pub fn point(ty: &Arc<TypeDef>, x: i64, y: i64) -> DynamicObject {
    let mut obj = DynamicObject::new(ty);
    obj.set_field("x", x.into()).expect("x is i64");
    obj.set_field("y", y.into()).expect("y is i64");
    obj
}

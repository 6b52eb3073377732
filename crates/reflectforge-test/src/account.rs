//! `Account` class fixture.
//!
//! Has no parameterless constructor, a read-only `id`, a non-public
//! `balance`, and member bodies that fail with [`FixtureError`].

use std::sync::Arc;

use reflectforge_core::{
    ConstructorDef, DynamicObject, DynamicValue, FieldDef, MethodDef, PropertyDef, TypeBuilder,
    TypeDef, ValueType,
};

use crate::{bool_field, int_field, str_field, FixtureError};

pub fn account_type() -> Arc<TypeDef> {
    TypeBuilder::class("Account")
        .field(FieldDef::new("id", ValueType::I64).readonly())
        .field(FieldDef::new("owner", ValueType::String))
        .field(FieldDef::new("balance", ValueType::I64).non_public())
        .field(FieldDef::new("open", ValueType::Bool))
        .property(
            PropertyDef::new("funds", ValueType::I64)
                .with_getter(|obj| Ok(int_field(obj, "balance")?.into()))
                .with_setter(|obj, value| {
                    let amount = value.as_i64().unwrap_or(0);
                    if amount < 0 {
                        return Err(FixtureError::NegativeBalance(amount).into());
                    }
                    obj.set_field("balance", value)?;
                    Ok(())
                }),
        )
        .method(MethodDef::new(
            "deposit",
            vec![ValueType::I64],
            ValueType::I64,
            |obj, args| {
                ensure_open(obj)?;
                let balance = int_field(obj, "balance")? + args[0].as_i64().unwrap_or(0);
                obj.set_field("balance", balance.into())?;
                Ok(balance.into())
            },
        ))
        .method(MethodDef::new(
            "withdraw",
            vec![ValueType::I64],
            ValueType::I64,
            |obj, args| {
                ensure_open(obj)?;
                let requested = args[0].as_i64().unwrap_or(0);
                let balance = int_field(obj, "balance")?;
                if requested > balance {
                    return Err(FixtureError::InsufficientFunds { balance, requested }.into());
                }
                obj.set_field("balance", (balance - requested).into())?;
                Ok((balance - requested).into())
            },
        ))
        .method(MethodDef::new(
            "describe",
            vec![],
            ValueType::String,
            |obj, _| {
                let owner = str_field(obj, "owner")?;
                let balance = int_field(obj, "balance")?;
                Ok(format!("#{} {owner}: {balance}", int_field(obj, "id")?).into())
            },
        ))
        .method(MethodDef::new("close", vec![], ValueType::Unit, |obj, _| {
            obj.set_field("open", false.into())?;
            Ok(DynamicValue::I64(-1))
        }))
        .method(
            MethodDef::new("audit", vec![ValueType::Any], ValueType::Any, |_, args| {
                Ok(args[0].clone())
            })
            .non_public(),
        )
        .constructor(ConstructorDef::new(vec![ValueType::String], |obj, args| {
            obj.set_field("owner", args[0].clone())?;
            obj.set_field("open", true.into())?;
            Ok(())
        }))
        .constructor(ConstructorDef::new(
            vec![ValueType::String, ValueType::I64],
            |obj, args| {
                let initial = args[1].as_i64().unwrap_or(0);
                if initial < 0 {
                    return Err(FixtureError::NegativeBalance(initial).into());
                }
                obj.set_field("owner", args[0].clone())?;
                obj.set_field("balance", args[1].clone())?;
                obj.set_field("open", true.into())?;
                Ok(())
            },
        ))
        .constructor(
            ConstructorDef::new(
                vec![ValueType::I64, ValueType::String, ValueType::I64],
                |obj, args| {
                    obj.set_field("id", args[0].clone())?;
                    obj.set_field("owner", args[1].clone())?;
                    obj.set_field("balance", args[2].clone())?;
                    obj.set_field("open", true.into())?;
                    Ok(())
                },
            )
            .non_public(),
        )
        .build()
        .expect("Account fixture is valid")
}

/// An open `Account` built without going through the accessor layer.
pub fn account(ty: &Arc<TypeDef>, id: i64, owner: &str, balance: i64) -> DynamicObject {
    let mut obj = DynamicObject::new(ty);
    obj.set_field("id", id.into()).expect("id is i64");
    obj.set_field("owner", owner.into()).expect("owner is string");
    obj.set_field("balance", balance.into()).expect("balance is i64");
    obj.set_field("open", true.into()).expect("open is bool");
    obj
}

fn ensure_open(obj: &DynamicObject) -> Result<(), reflectforge_core::MemberError> {
    if bool_field(obj, "open")? {
        Ok(())
    } else {
        Err(FixtureError::Closed.into())
    }
}

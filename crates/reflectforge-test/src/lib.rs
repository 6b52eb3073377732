//! Shared test fixtures for ReflectForge crates.
//!
//! Runtime type definitions covering every member shape the accessor
//! factory handles:
//!
//! - [`point`] - value type with scalar, boxed, computed and native members
//! - [`account`] - class with read-only and non-public members, fallible bodies
//! - [`shapes`] - abstract type and a class with a non-public default constructor
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! reflectforge-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use reflectforge_test::point::{point, point_type};
//! use reflectforge_test::FixtureError;
//! ```

pub mod account;
pub mod point;
pub mod shapes;

use reflectforge_core::{DynamicObject, MemberError};
use thiserror::Error;

pub use account::{account, account_type};
pub use point::{point, point_type};
pub use shapes::{counter_type, shape_type};

/// Errors raised by fixture member bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    #[error("balance cannot be negative: {0}")]
    NegativeBalance(i64),

    #[error("account is closed")]
    Closed,

    #[error("field {0} is missing or has the wrong type")]
    BadField(&'static str),
}

/// Reads an `i64` field inside a member body.
pub fn int_field(obj: &DynamicObject, name: &'static str) -> Result<i64, MemberError> {
    obj.field(name)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| FixtureError::BadField(name).into())
}

/// Reads a `bool` field inside a member body.
pub fn bool_field(obj: &DynamicObject, name: &'static str) -> Result<bool, MemberError> {
    obj.field(name)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| FixtureError::BadField(name).into())
}

/// Reads a string field inside a member body. Unset strings read as empty.
pub fn str_field(obj: &DynamicObject, name: &'static str) -> Result<String, MemberError> {
    match obj.field(name) {
        Some(v) if v.is_none() => Ok(String::new()),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FixtureError::BadField(name).into()),
        None => Err(FixtureError::BadField(name).into()),
    }
}

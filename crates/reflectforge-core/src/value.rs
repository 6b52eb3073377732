//! Erased values and declared value types.

use std::fmt;
use std::sync::Arc;

use crate::object::DynamicObject;

/// Declared type of a field, property, parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I64,
    F64,
    Bool,
    String,
    List,
    Object,
    // Accepts any value, including None.
    Any,
    // Only valid as a return type; the call yields `DynamicValue::None`.
    Unit,
}

impl ValueType {
    /// Returns true for types stored inline in an object's slot buffer.
    pub fn is_scalar(self) -> bool {
        matches!(self, ValueType::I64 | ValueType::F64 | ValueType::Bool)
    }

    /// Returns true if a value of this type can be `None`.
    pub fn is_nullable(self) -> bool {
        !self.is_scalar()
    }

    /// Checks whether `value` may be stored in a member of this type.
    ///
    /// No implicit conversions: an `I64` is not accepted where an `F64` is
    /// declared. `None` is only accepted by nullable types.
    pub fn accepts(self, value: &DynamicValue) -> bool {
        match (self, value) {
            (ValueType::Any, _) => true,
            (ValueType::Unit, DynamicValue::None) => true,
            (ty, DynamicValue::None) => ty.is_nullable() && ty != ValueType::Unit,
            (ValueType::I64, DynamicValue::I64(_)) => true,
            (ValueType::F64, DynamicValue::F64(_)) => true,
            (ValueType::Bool, DynamicValue::Bool(_)) => true,
            (ValueType::String, DynamicValue::String(_)) => true,
            (ValueType::List, DynamicValue::List(_)) => true,
            (ValueType::Object, DynamicValue::Object(_)) => true,
            _ => false,
        }
    }

    /// The value a freshly allocated member of this type holds.
    pub fn default_value(self) -> DynamicValue {
        match self {
            ValueType::I64 => DynamicValue::I64(0),
            ValueType::F64 => DynamicValue::F64(0.0),
            ValueType::Bool => DynamicValue::Bool(false),
            _ => DynamicValue::None,
        }
    }

    /// Encodes a scalar value into its raw slot representation.
    ///
    /// Returns `None` for non-scalar types or values this type does not accept.
    pub fn encode(self, value: &DynamicValue) -> Option<i64> {
        match (self, value) {
            (ValueType::I64, DynamicValue::I64(v)) => Some(*v),
            (ValueType::F64, DynamicValue::F64(v)) => Some(v.to_bits() as i64),
            (ValueType::Bool, DynamicValue::Bool(v)) => Some(*v as i64),
            _ => None,
        }
    }

    /// Decodes a raw slot (or computed integer) into a value of this type.
    ///
    /// Any non-zero raw value decodes to `true` for `Bool`. Non-scalar types
    /// decode to `None`.
    pub fn decode(self, raw: i64) -> DynamicValue {
        match self {
            ValueType::I64 => DynamicValue::I64(raw),
            ValueType::F64 => DynamicValue::F64(f64::from_bits(raw as u64)),
            ValueType::Bool => DynamicValue::Bool(raw != 0),
            _ => DynamicValue::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::I64 => "i64",
            ValueType::F64 => "f64",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Object => "object",
            ValueType::Any => "any",
            ValueType::Unit => "unit",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of statically unknown type crossing the accessor boundary.
#[derive(Debug, Clone)]
pub enum DynamicValue {
    /// Absent value (null reference).
    None,
    /// 64-bit signed integer.
    I64(i64),
    /// 64-bit floating point.
    F64(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(Arc<str>),
    /// List of values.
    List(Vec<DynamicValue>),
    /// Nested instance of a runtime type.
    Object(Box<DynamicObject>),
}

impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynamicValue::None, DynamicValue::None) => true,
            (DynamicValue::I64(a), DynamicValue::I64(b)) => a == b,
            // Bitwise so that NaN round-trips compare equal.
            (DynamicValue::F64(a), DynamicValue::F64(b)) => a.to_bits() == b.to_bits(),
            (DynamicValue::Bool(a), DynamicValue::Bool(b)) => a == b,
            (DynamicValue::String(a), DynamicValue::String(b)) => a == b,
            (DynamicValue::List(a), DynamicValue::List(b)) => a == b,
            (DynamicValue::Object(a), DynamicValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl DynamicValue {
    /// Returns true if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, DynamicValue::None)
    }

    /// Name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DynamicValue::None => "none",
            DynamicValue::I64(_) => "i64",
            DynamicValue::F64(_) => "f64",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::String(_) => "string",
            DynamicValue::List(_) => "list",
            DynamicValue::Object(_) => "object",
        }
    }

    /// Attempts to extract an i64 value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a list.
    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to extract a nested object.
    pub fn as_object(&self) -> Option<&DynamicObject> {
        match self {
            DynamicValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        DynamicValue::I64(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::F64(v)
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::String(v.into())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::String(v.into())
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        DynamicValue::List(v)
    }
}

impl From<DynamicObject> for DynamicValue {
    fn from(v: DynamicObject) -> Self {
        DynamicValue::Object(Box::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_is_strict() {
        assert!(ValueType::I64.accepts(&DynamicValue::I64(1)));
        assert!(!ValueType::F64.accepts(&DynamicValue::I64(1)));
        assert!(!ValueType::I64.accepts(&DynamicValue::F64(1.0)));
        assert!(!ValueType::Bool.accepts(&DynamicValue::I64(1)));
        assert!(ValueType::Any.accepts(&DynamicValue::Bool(true)));
    }

    #[test]
    fn test_none_only_for_nullable_types() {
        assert!(!ValueType::I64.accepts(&DynamicValue::None));
        assert!(!ValueType::Bool.accepts(&DynamicValue::None));
        assert!(ValueType::String.accepts(&DynamicValue::None));
        assert!(ValueType::List.accepts(&DynamicValue::None));
        assert!(ValueType::Unit.accepts(&DynamicValue::None));
        assert!(!ValueType::Unit.accepts(&DynamicValue::I64(0)));
    }

    #[test]
    fn test_scalar_encoding() {
        let raw = ValueType::F64.encode(&DynamicValue::F64(-2.5)).unwrap();
        assert_eq!(ValueType::F64.decode(raw), DynamicValue::F64(-2.5));
        assert_eq!(ValueType::Bool.encode(&DynamicValue::Bool(true)), Some(1));
        assert_eq!(ValueType::Bool.decode(7), DynamicValue::Bool(true));
        assert_eq!(ValueType::I64.encode(&DynamicValue::Bool(true)), None);
        assert_eq!(ValueType::String.encode(&"x".into()), None);
    }

    #[test]
    fn test_nan_equality() {
        assert_eq!(DynamicValue::F64(f64::NAN), DynamicValue::F64(f64::NAN));
        assert_ne!(DynamicValue::F64(0.0), DynamicValue::F64(-0.0));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ValueType::I64.default_value(), DynamicValue::I64(0));
        assert_eq!(ValueType::F64.default_value(), DynamicValue::F64(0.0));
        assert_eq!(ValueType::Bool.default_value(), DynamicValue::Bool(false));
        assert!(ValueType::String.default_value().is_none());
    }
}

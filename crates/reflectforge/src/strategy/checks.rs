//! Call-time checks shared by every strategy.

use std::fmt;
use std::sync::Arc;

use reflectforge_core::{CallError, DynamicObject, DynamicValue, MemberError, TypeDef, ValueType};

pub(crate) fn instance(expected: &Arc<TypeDef>, instance: &DynamicObject) -> Result<(), CallError> {
    if instance.is_instance_of(expected) {
        Ok(())
    } else {
        Err(CallError::InstanceType {
            expected: expected.name().to_string(),
            found: instance.type_name().to_string(),
        })
    }
}

pub(crate) fn value_type_error(
    member: &dyn fmt::Display,
    expected: ValueType,
    value: &DynamicValue,
) -> CallError {
    CallError::ValueType {
        member: member.to_string(),
        expected,
        found: value.kind_name(),
    }
}

pub(crate) fn value(
    member: &dyn fmt::Display,
    expected: ValueType,
    value: &DynamicValue,
) -> Result<(), CallError> {
    if expected.accepts(value) {
        Ok(())
    } else {
        Err(value_type_error(member, expected, value))
    }
}

/// Checks the argument count, then each argument in order.
pub(crate) fn arguments(
    member: &dyn fmt::Display,
    params: &[ValueType],
    args: &[DynamicValue],
) -> Result<(), CallError> {
    if params.len() != args.len() {
        return Err(CallError::ArgumentCount {
            member: member.to_string(),
            expected: params.len(),
            found: args.len(),
        });
    }
    for (param, arg) in params.iter().zip(args) {
        value(member, *param, arg)?;
    }
    Ok(())
}

/// Normalizes a method body's result. Unit methods always yield `None`.
pub(crate) fn method_result(
    return_type: ValueType,
    result: Result<DynamicValue, MemberError>,
) -> Result<DynamicValue, CallError> {
    let value = result.map_err(CallError::Member)?;
    if return_type == ValueType::Unit {
        Ok(DynamicValue::None)
    } else {
        Ok(value)
    }
}

/// Error for a member that vanished from the instance's type between
/// construction and call. Only reachable through a mismatched instance.
pub(crate) fn missing(expected: &Arc<TypeDef>, instance: &DynamicObject) -> CallError {
    CallError::InstanceType {
        expected: expected.name().to_string(),
        found: instance.type_name().to_string(),
    }
}

/// Error for a property used through an accessor it does not declare.
pub(crate) fn missing_accessor(member: &dyn fmt::Display, accessor: &'static str) -> CallError {
    CallError::MissingAccessor {
        member: member.to_string(),
        accessor,
    }
}

//! Error types for ReflectForge

use thiserror::Error;

use crate::member::Member;
use crate::value::ValueType;

/// Error raised by the code behind a member (property body, method, constructor).
///
/// Passed through accessors untouched so callers can downcast it.
pub type MemberError = Box<dyn std::error::Error + Send + Sync>;

/// Accessor construction failure.
///
/// Raised before any delegate is handed out, never from a delegate call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessorError {
    /// The member is not of a kind the requested operation supports.
    #[error("Could not create {operation} for {kind} {declaring_type}.{member}")]
    UnsupportedMemberKind {
        operation: &'static str,
        kind: &'static str,
        member: String,
        declaring_type: String,
    },

    /// The member's value cannot be returned by value.
    #[error(
        "Could not create getter for {declaring_type}.{member}. By-reference return values are not supported"
    )]
    UnsupportedReturnShape {
        member: String,
        declaring_type: String,
    },

    /// No construction path exists for the type.
    #[error("Could not create constructor for {declaring_type}: {reason}")]
    ConstructionUnavailable {
        declaring_type: String,
        reason: &'static str,
    },

    /// Property has no getter.
    #[error("Property {declaring_type}.{member} is not readable")]
    NotReadable {
        member: String,
        declaring_type: String,
    },

    /// Field is read-only or property has no setter.
    #[error("Member {declaring_type}.{member} is not writable")]
    NotWritable {
        member: String,
        declaring_type: String,
    },
}

impl AccessorError {
    pub fn unsupported_kind(operation: &'static str, member: &Member) -> Self {
        AccessorError::UnsupportedMemberKind {
            operation,
            kind: member.kind().name(),
            member: member.name().to_string(),
            declaring_type: member.declaring_type().name().to_string(),
        }
    }
}

/// Failure of a single accessor call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The instance is not of the member's declaring type.
    #[error("Expected instance of {expected}, got {found}")]
    InstanceType { expected: String, found: String },

    /// A value or argument is not accepted by the declared type.
    #[error("{member} expects {expected}, got {found}")]
    ValueType {
        member: String,
        expected: ValueType,
        found: &'static str,
    },

    /// Wrong number of arguments for a method or constructor.
    #[error("{member} takes {expected} argument(s), got {found}")]
    ArgumentCount {
        member: String,
        expected: usize,
        found: usize,
    },

    /// The property lacks the accessor the delegate was built for.
    #[error("{member} has no {accessor}")]
    MissingAccessor {
        member: String,
        accessor: &'static str,
    },

    /// Error raised by the member itself.
    #[error("{0}")]
    Member(MemberError),
}

impl CallError {
    /// Returns the member's own error, if that is what failed.
    pub fn member_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CallError::Member(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Invalid runtime type definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Type {type_name} declares member {member} more than once")]
    DuplicateMember { type_name: String, member: String },

    #[error("Type {type_name} declares more than one constructor taking {arity} argument(s)")]
    DuplicateConstructor { type_name: String, arity: usize },

    #[error("Computed property {type_name}.{property} refers to unknown field #{field}")]
    UnknownField {
        type_name: String,
        property: String,
        field: usize,
    },

    #[error("Computed property {type_name}.{property} reads field {field} of type {field_type}; only i64 and bool fields can be computed over")]
    NonIntegerField {
        type_name: String,
        property: String,
        field: String,
        field_type: ValueType,
    },

    #[error("Computed property {type_name}.{property} must be i64 or bool, not {value_type}")]
    ComputedType {
        type_name: String,
        property: String,
        value_type: ValueType,
    },
}

/// Result type alias for accessor construction.
pub type Result<T> = std::result::Result<T, AccessorError>;

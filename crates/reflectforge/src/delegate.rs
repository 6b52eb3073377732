//! Callable accessors handed out by the factory.
//!
//! Every delegate is cheap to clone, thread-safe, and checks its inputs on
//! each call. Errors raised by the member itself come back as
//! [`CallError::Member`] with the original error inside.

use std::fmt;
use std::sync::Arc;

use reflectforge_core::{CallError, DynamicObject, DynamicValue};

macro_rules! delegate {
    (
        $(#[$doc:meta])*
        $name:ident, $method:ident ( $($arg:ident : $ty:ty),* ) -> $ret:ty
    ) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            member: Arc<str>,
            f: Arc<dyn Fn($($ty),*) -> Result<$ret, CallError> + Send + Sync>,
        }

        impl $name {
            pub(crate) fn new<F>(member: impl fmt::Display, f: F) -> Self
            where
                F: Fn($($ty),*) -> Result<$ret, CallError> + Send + Sync + 'static,
            {
                Self {
                    member: member.to_string().into(),
                    f: Arc::new(f),
                }
            }

            #[inline]
            pub fn $method(&self, $($arg: $ty),*) -> Result<$ret, CallError> {
                (self.f)($($arg),*)
            }

            /// The member this delegate was created for.
            pub fn member(&self) -> &str {
                &self.member
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.member)
            }
        }
    };
}

delegate!(
    /// Reads a field or property from an instance.
    Getter, get(instance: &DynamicObject) -> DynamicValue
);

delegate!(
    /// Writes a field or property on an instance.
    Setter, set(instance: &mut DynamicObject, value: DynamicValue) -> ()
);

delegate!(
    /// Invokes a method. Methods returning unit yield `DynamicValue::None`.
    MethodCall, call(instance: &mut DynamicObject, args: &[DynamicValue]) -> DynamicValue
);

delegate!(
    /// Runs a constructor with arguments.
    ObjectConstructor, construct(args: &[DynamicValue]) -> DynamicObject
);

delegate!(
    /// Creates an instance without arguments.
    DefaultConstructor, construct() -> DynamicObject
);

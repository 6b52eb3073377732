//! Member descriptors handed to the accessor layer.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{ConstructorDef, FieldDef, MethodDef, PropertyDef, TypeDef, Visibility};
use crate::value::ValueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
}

impl MemberKind {
    pub fn name(self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! member_info {
    ($(#[$doc:meta])* $info:ident, $def:ident, $list:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $info {
            declaring_type: Arc<TypeDef>,
            index: usize,
        }

        impl $info {
            pub(crate) fn new(declaring_type: Arc<TypeDef>, index: usize) -> Self {
                debug_assert!(index < declaring_type.$list().len());
                Self {
                    declaring_type,
                    index,
                }
            }

            pub fn declaring_type(&self) -> &Arc<TypeDef> {
                &self.declaring_type
            }

            /// Position of the member in its declaring type's list.
            pub fn index(&self) -> usize {
                self.index
            }

            pub fn def(&self) -> &$def {
                &self.declaring_type.$list()[self.index]
            }
        }

        impl fmt::Debug for $info {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($info), self)
            }
        }
    };
}

member_info!(
    /// Descriptor of a field.
    FieldInfo, FieldDef, fields
);
member_info!(
    /// Descriptor of a property.
    PropertyInfo, PropertyDef, properties
);
member_info!(
    /// Descriptor of a method.
    MethodInfo, MethodDef, methods
);
member_info!(
    /// Descriptor of a constructor.
    ConstructorInfo, ConstructorDef, constructor_defs
);

impl FieldInfo {
    pub fn name(&self) -> &str {
        &self.def().name
    }

    pub fn value_type(&self) -> ValueType {
        self.def().value_type
    }

    pub fn is_readonly(&self) -> bool {
        self.def().readonly
    }
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.def().name
    }

    pub fn value_type(&self) -> ValueType {
        self.def().value_type
    }
}

impl MethodInfo {
    pub fn name(&self) -> &str {
        &self.def().name
    }

    pub fn return_type(&self) -> ValueType {
        self.def().return_type
    }
}

impl ConstructorInfo {
    /// Constructors are named after their declaring type.
    pub fn name(&self) -> &str {
        self.declaring_type.name()
    }

    pub fn arity(&self) -> usize {
        self.def().arity()
    }
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.name(), self.name())
    }
}

impl fmt::Display for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.name(), self.name())
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_type.name(), self.name())?;
        write_params(f, &self.def().params)?;
        f.write_str(")")
    }
}

impl fmt::Display for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::new(", self.declaring_type.name())?;
        write_params(f, &self.def().params)?;
        f.write_str(")")
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[ValueType]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{param}")?;
    }
    Ok(())
}

/// A reference to one member of a runtime type.
#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldInfo),
    Property(PropertyInfo),
    Method(MethodInfo),
    Constructor(ConstructorInfo),
}

impl Member {
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Field(_) => MemberKind::Field,
            Member::Property(_) => MemberKind::Property,
            Member::Method(_) => MemberKind::Method,
            Member::Constructor(_) => MemberKind::Constructor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Field(m) => m.name(),
            Member::Property(m) => m.name(),
            Member::Method(m) => m.name(),
            Member::Constructor(m) => m.name(),
        }
    }

    pub fn declaring_type(&self) -> &Arc<TypeDef> {
        match self {
            Member::Field(m) => m.declaring_type(),
            Member::Property(m) => m.declaring_type(),
            Member::Method(m) => m.declaring_type(),
            Member::Constructor(m) => m.declaring_type(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Member::Field(m) => m.def().visibility,
            Member::Property(m) => m.def().visibility,
            Member::Method(m) => m.def().visibility,
            Member::Constructor(m) => m.def().visibility,
        }
    }

    /// Declared value type: field/property type, method return type,
    /// or `Object` for constructors.
    pub fn value_type(&self) -> ValueType {
        match self {
            Member::Field(m) => m.value_type(),
            Member::Property(m) => m.value_type(),
            Member::Method(m) => m.return_type(),
            Member::Constructor(_) => ValueType::Object,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field(m) => fmt::Display::fmt(m, f),
            Member::Property(m) => fmt::Display::fmt(m, f),
            Member::Method(m) => fmt::Display::fmt(m, f),
            Member::Constructor(m) => fmt::Display::fmt(m, f),
        }
    }
}

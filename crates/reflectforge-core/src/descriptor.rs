//! Runtime type definitions.
//!
//! A [`TypeDef`] is the introspection side of the accessor layer: it lists a
//! type's fields, properties, methods and constructors and hands out
//! [`Member`] descriptors for them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{DefinitionError, MemberError};
use crate::expr::Expr;
use crate::member::{ConstructorInfo, FieldInfo, Member, MethodInfo, PropertyInfo};
use crate::object::DynamicObject;
use crate::value::{DynamicValue, ValueType};

pub type NativeGetter =
    Arc<dyn Fn(&DynamicObject) -> Result<DynamicValue, MemberError> + Send + Sync>;
pub type NativeSetter =
    Arc<dyn Fn(&mut DynamicObject, DynamicValue) -> Result<(), MemberError> + Send + Sync>;
pub type MethodBody =
    Arc<dyn Fn(&mut DynamicObject, &[DynamicValue]) -> Result<DynamicValue, MemberError> + Send + Sync>;
/// Initializes a freshly allocated instance from constructor arguments.
pub type ConstructorBody =
    Arc<dyn Fn(&mut DynamicObject, &[DynamicValue]) -> Result<(), MemberError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Reference type; default construction needs a zero-argument constructor.
    Class,
    /// Value type; always default-constructible.
    Struct,
    /// Cannot be instantiated.
    Abstract,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

/// Where a field's value lives inside a [`DynamicObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStorage {
    /// Index into the flat `i64` slot buffer.
    Slot(usize),
    /// Index into the boxed value buffer.
    Value(usize),
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub value_type: ValueType,
    pub visibility: Visibility,
    pub readonly: bool,
    storage: FieldStorage,
}

impl FieldDef {
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            visibility: Visibility::Public,
            readonly: false,
            storage: FieldStorage::Value(0),
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    /// Storage location, assigned when the owning type is built.
    pub fn storage(&self) -> FieldStorage {
        self.storage
    }
}

#[derive(Clone)]
pub enum PropertyGetter {
    /// Derived from integer fields; eligible for compilation.
    Computed(Expr),
    Native(NativeGetter),
}

impl fmt::Debug for PropertyGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyGetter::Computed(expr) => f.debug_tuple("Computed").field(expr).finish(),
            PropertyGetter::Native(_) => f.write_str("Native(..)"),
        }
    }
}

#[derive(Clone)]
pub struct PropertyDef {
    pub name: Arc<str>,
    pub value_type: ValueType,
    pub visibility: Visibility,
    /// The getter returns a reference into the instance rather than a value.
    pub by_ref: bool,
    pub getter: Option<PropertyGetter>,
    pub setter: Option<NativeSetter>,
}

impl PropertyDef {
    /// A property without accessors; add them with [`with_getter`](Self::with_getter)
    /// and [`with_setter`](Self::with_setter).
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            visibility: Visibility::Public,
            by_ref: false,
            getter: None,
            setter: None,
        }
    }

    /// A read-only property computed from integer fields.
    pub fn computed(name: impl Into<Arc<str>>, value_type: ValueType, expr: Expr) -> Self {
        Self {
            getter: Some(PropertyGetter::Computed(expr)),
            ..Self::new(name, value_type)
        }
    }

    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&DynamicObject) -> Result<DynamicValue, MemberError> + Send + Sync + 'static,
    {
        self.getter = Some(PropertyGetter::Native(Arc::new(getter)));
        self
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut DynamicObject, DynamicValue) -> Result<(), MemberError> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Marks the getter as returning by reference.
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("by_ref", &self.by_ref)
            .field("getter", &self.getter)
            .field("writable", &self.setter.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct MethodDef {
    pub name: Arc<str>,
    pub params: Vec<ValueType>,
    pub return_type: ValueType,
    pub visibility: Visibility,
    pub body: MethodBody,
}

impl MethodDef {
    pub fn new<F>(
        name: impl Into<Arc<str>>,
        params: Vec<ValueType>,
        return_type: ValueType,
        body: F,
    ) -> Self
    where
        F: Fn(&mut DynamicObject, &[DynamicValue]) -> Result<DynamicValue, MemberError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            body: Arc::new(body),
        }
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish()
    }
}

#[derive(Clone)]
pub struct ConstructorDef {
    pub params: Vec<ValueType>,
    pub visibility: Visibility,
    pub body: ConstructorBody,
}

impl ConstructorDef {
    pub fn new<F>(params: Vec<ValueType>, body: F) -> Self
    where
        F: Fn(&mut DynamicObject, &[DynamicValue]) -> Result<(), MemberError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            params,
            visibility: Visibility::Public,
            body: Arc::new(body),
        }
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Describes a runtime type. Built with [`TypeBuilder`] and shared as `Arc<TypeDef>`.
///
/// Type identity is pointer identity of the `Arc`: two separately built
/// definitions with the same name are different types.
#[derive(Debug)]
pub struct TypeDef {
    name: Arc<str>,
    kind: TypeKind,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
    slot_count: usize,
    value_count: usize,
}

impl TypeDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    pub fn constructor_defs(&self) -> &[ConstructorDef] {
        &self.constructors
    }

    /// Number of `i64` slots an instance carries.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of boxed values an instance carries.
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name.as_ref() == name)
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name.as_ref() == name)
    }

    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.name.as_ref() == name)
    }

    pub fn constructor_index(&self, arity: usize) -> Option<usize> {
        self.constructors.iter().position(|c| c.arity() == arity)
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.as_ref() == name)
    }

    pub fn property_def(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name.as_ref() == name)
    }

    pub fn method_def(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name.as_ref() == name)
    }

    pub fn constructor_def(&self, arity: usize) -> Option<&ConstructorDef> {
        self.constructors.iter().find(|c| c.arity() == arity)
    }

    pub fn field(self: &Arc<Self>, name: &str) -> Option<FieldInfo> {
        let index = self.field_index(name)?;
        Some(FieldInfo::new(self.clone(), index))
    }

    pub fn property(self: &Arc<Self>, name: &str) -> Option<PropertyInfo> {
        let index = self.property_index(name)?;
        Some(PropertyInfo::new(self.clone(), index))
    }

    pub fn method(self: &Arc<Self>, name: &str) -> Option<MethodInfo> {
        let index = self.method_index(name)?;
        Some(MethodInfo::new(self.clone(), index))
    }

    /// Constructor taking exactly `arity` arguments.
    pub fn constructor(self: &Arc<Self>, arity: usize) -> Option<ConstructorInfo> {
        let index = self.constructor_index(arity)?;
        Some(ConstructorInfo::new(self.clone(), index))
    }

    /// Looks up a field, property or method by name, in that order.
    pub fn member(self: &Arc<Self>, name: &str) -> Option<Member> {
        self.field(name)
            .map(Member::Field)
            .or_else(|| self.property(name).map(Member::Property))
            .or_else(|| self.method(name).map(Member::Method))
    }

    /// All members in declaration order: fields, properties, methods, constructors.
    pub fn members(self: &Arc<Self>) -> Vec<Member> {
        let fields = (0..self.fields.len()).map(|i| Member::Field(FieldInfo::new(self.clone(), i)));
        let properties = (0..self.properties.len())
            .map(|i| Member::Property(PropertyInfo::new(self.clone(), i)));
        let methods =
            (0..self.methods.len()).map(|i| Member::Method(MethodInfo::new(self.clone(), i)));
        let constructors = (0..self.constructors.len())
            .map(|i| Member::Constructor(ConstructorInfo::new(self.clone(), i)));
        fields
            .chain(properties)
            .chain(methods)
            .chain(constructors)
            .collect()
    }
}

/// Builder for [`TypeDef`].
#[derive(Debug)]
pub struct TypeBuilder {
    name: Arc<str>,
    kind: TypeKind,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn class(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn value_type(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn abstract_type(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, TypeKind::Abstract)
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDef) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Validates the definition and assigns field storage.
    pub fn build(self) -> Result<Arc<TypeDef>, DefinitionError> {
        let TypeBuilder {
            name,
            kind,
            mut fields,
            properties,
            methods,
            constructors,
        } = self;

        let mut names = HashSet::new();
        let member_names = fields
            .iter()
            .map(|f| &f.name)
            .chain(properties.iter().map(|p| &p.name))
            .chain(methods.iter().map(|m| &m.name));
        for member in member_names {
            if !names.insert(member.clone()) {
                return Err(DefinitionError::DuplicateMember {
                    type_name: name.to_string(),
                    member: member.to_string(),
                });
            }
        }

        let mut arities = HashSet::new();
        for ctor in &constructors {
            if !arities.insert(ctor.arity()) {
                return Err(DefinitionError::DuplicateConstructor {
                    type_name: name.to_string(),
                    arity: ctor.arity(),
                });
            }
        }

        for property in &properties {
            if let Some(PropertyGetter::Computed(expr)) = &property.getter {
                check_computed(&name, property, expr, &fields)?;
            }
        }

        let mut slot_count = 0;
        let mut value_count = 0;
        for field in &mut fields {
            field.storage = if field.value_type.is_scalar() {
                slot_count += 1;
                FieldStorage::Slot(slot_count - 1)
            } else {
                value_count += 1;
                FieldStorage::Value(value_count - 1)
            };
        }

        Ok(Arc::new(TypeDef {
            name,
            kind,
            fields,
            properties,
            methods,
            constructors,
            slot_count,
            value_count,
        }))
    }
}

fn check_computed(
    type_name: &str,
    property: &PropertyDef,
    expr: &Expr,
    fields: &[FieldDef],
) -> Result<(), DefinitionError> {
    if !matches!(property.value_type, ValueType::I64 | ValueType::Bool) {
        return Err(DefinitionError::ComputedType {
            type_name: type_name.to_string(),
            property: property.name.to_string(),
            value_type: property.value_type,
        });
    }
    let mut result = Ok(());
    expr.visit_fields(&mut |idx| {
        if result.is_err() {
            return;
        }
        result = match fields.get(idx) {
            None => Err(DefinitionError::UnknownField {
                type_name: type_name.to_string(),
                property: property.name.to_string(),
                field: idx,
            }),
            Some(f) if !matches!(f.value_type, ValueType::I64 | ValueType::Bool) => {
                Err(DefinitionError::NonIntegerField {
                    type_name: type_name.to_string(),
                    property: property.name.to_string(),
                    field: f.name.to_string(),
                    field_type: f.value_type,
                })
            }
            Some(_) => Ok(()),
        };
    });
    result
}

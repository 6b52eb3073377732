//! Instances of runtime types.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{FieldDef, FieldStorage, TypeDef};
use crate::error::CallError;
use crate::value::DynamicValue;

/// An instance of a [`TypeDef`].
///
/// Scalar fields (`i64`, `f64`, `bool`) live in a flat `i64` slot buffer, one
/// slot per field, so compiled accessors can address them by offset. All
/// other fields live in a parallel buffer of boxed values.
#[derive(Clone)]
pub struct DynamicObject {
    type_def: Arc<TypeDef>,
    slots: Box<[i64]>,
    values: Box<[DynamicValue]>,
}

impl DynamicObject {
    /// Allocates an instance with every field at its type default.
    ///
    /// Runs no constructor.
    pub fn new(type_def: &Arc<TypeDef>) -> Self {
        let mut slots = vec![0i64; type_def.slot_count()].into_boxed_slice();
        let mut values = vec![DynamicValue::None; type_def.value_count()].into_boxed_slice();
        for field in type_def.fields() {
            let default = field.value_type.default_value();
            match field.storage() {
                FieldStorage::Slot(i) => {
                    slots[i] = field.value_type.encode(&default).unwrap_or(0);
                }
                FieldStorage::Value(i) => values[i] = default,
            }
        }
        Self {
            type_def: type_def.clone(),
            slots,
            values,
        }
    }

    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.type_def
    }

    pub fn type_name(&self) -> &str {
        self.type_def.name()
    }

    /// Returns true if this object was created from exactly `type_def`.
    pub fn is_instance_of(&self, type_def: &Arc<TypeDef>) -> bool {
        Arc::ptr_eq(&self.type_def, type_def)
    }

    /// Reads a field by name.
    pub fn field(&self, name: &str) -> Option<DynamicValue> {
        let field = self.type_def.field_def(name)?;
        Some(self.read(field))
    }

    /// Writes a field by name, checking the value against the declared type.
    ///
    /// Ignores `readonly`; that flag only restricts accessors.
    pub fn set_field(&mut self, name: &str, value: DynamicValue) -> Result<(), CallError> {
        let type_def = self.type_def.clone();
        let Some(field) = type_def.field_def(name) else {
            return Err(CallError::InstanceType {
                expected: format!("type with field {name}"),
                found: type_def.name().to_string(),
            });
        };
        if !field.value_type.accepts(&value) {
            return Err(CallError::ValueType {
                member: format!("{}.{}", type_def.name(), name),
                expected: field.value_type,
                found: value.kind_name(),
            });
        }
        self.write(field, value);
        Ok(())
    }

    /// Reads a field of this object's type.
    pub fn read(&self, field: &FieldDef) -> DynamicValue {
        match field.storage() {
            FieldStorage::Slot(i) => field.value_type.decode(self.slots[i]),
            FieldStorage::Value(i) => self.values[i].clone(),
        }
    }

    /// Writes a field of this object's type. The value must already be
    /// accepted by the field's declared type.
    pub fn write(&mut self, field: &FieldDef, value: DynamicValue) {
        match field.storage() {
            FieldStorage::Slot(i) => {
                if let Some(raw) = field.value_type.encode(&value) {
                    self.slots[i] = raw;
                }
            }
            FieldStorage::Value(i) => self.values[i] = value,
        }
    }

    /// Raw slot contents of the field at declaration index `field_idx`.
    ///
    /// Returns `None` for unknown indices and non-scalar fields.
    pub fn raw_field(&self, field_idx: usize) -> Option<i64> {
        match self.type_def.fields().get(field_idx)?.storage() {
            FieldStorage::Slot(i) => Some(self.slots[i]),
            FieldStorage::Value(_) => None,
        }
    }

    /// Boxed value at `index` in the value buffer.
    pub fn value_at(&self, index: usize) -> Option<&DynamicValue> {
        self.values.get(index)
    }

    /// Replaces the boxed value at `index`. Returns false if out of range.
    pub fn set_value_at(&mut self, index: usize, value: DynamicValue) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Base pointer of the slot buffer, valid for `type_def().slot_count()` reads.
    pub fn slots_ptr(&self) -> *const i64 {
        self.slots.as_ptr()
    }

    /// Mutable base pointer of the slot buffer.
    pub fn slots_mut_ptr(&mut self) -> *mut i64 {
        self.slots.as_mut_ptr()
    }
}

impl PartialEq for DynamicObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.type_def, &other.type_def)
            && self.slots == other.slots
            && self.values == other.values
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_def.name());
        for field in self.type_def.fields() {
            s.field(&field.name, &self.read(field));
        }
        s.finish()
    }
}

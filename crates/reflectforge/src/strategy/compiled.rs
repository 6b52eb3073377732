//! Compiling strategy: resolves everything once and generates native code for
//! scalar field access and computed properties.
//!
//! Slot access is only sound because every delegate checks the instance's
//! type by identity first: an instance of the declaring type always carries a
//! slot buffer of `slot_count()` entries.

use std::fmt;
use std::sync::Arc;

use reflectforge_core::{
    CallError, ConstructorInfo, DynamicObject, DynamicValue, FieldInfo, FieldStorage, MethodInfo,
    PropertyGetter, PropertyInfo, TypeDef,
};
use tracing::{debug, warn};

use super::{checks, DelegateStrategy, StrategyKind, LATE_BOUND};
use crate::delegate::{DefaultConstructor, Getter, MethodCall, ObjectConstructor, Setter};
use crate::jit::{self, JitError};

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CompiledStrategy;

impl CompiledStrategy {
    fn jit_failed(member: &dyn fmt::Display, op: &'static str, error: &JitError) {
        warn!(event = "jit_fallback", member = %member, op, error = %error);
    }
}

impl DelegateStrategy for CompiledStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Compiling
    }

    fn field_getter(&self, field: &FieldInfo) -> Getter {
        let ty = field.declaring_type().clone();
        let value_type = field.value_type();
        match field.def().storage() {
            FieldStorage::Slot(slot) => match jit::compile_load(slot) {
                Ok(load) => {
                    debug!(event = "jit_compile", member = %field, op = "get", slot);
                    Getter::new(field, move |obj| {
                        checks::instance(&ty, obj)?;
                        // SAFETY: obj is an instance of ty, whose slot buffer covers `slot`.
                        let raw = unsafe { load.call_load(obj.slots_ptr()) };
                        Ok(value_type.decode(raw))
                    })
                }
                Err(e) => {
                    Self::jit_failed(field, "get", &e);
                    LATE_BOUND.field_getter(field)
                }
            },
            FieldStorage::Value(index) => Getter::new(field, move |obj| {
                checks::instance(&ty, obj)?;
                Ok(obj.value_at(index).cloned().unwrap_or(DynamicValue::None))
            }),
        }
    }

    fn property_getter(&self, property: &PropertyInfo) -> Getter {
        let ty = property.declaring_type().clone();
        let value_type = property.value_type();
        match &property.def().getter {
            Some(PropertyGetter::Computed(expr)) => {
                let slots = slot_map(&ty);
                match jit::compile_expr(expr, &slots) {
                    Ok(compiled) => {
                        debug!(event = "jit_compile", member = %property, op = "get");
                        Getter::new(property, move |obj| {
                            checks::instance(&ty, obj)?;
                            // SAFETY: obj is an instance of ty; the expression only
                            // reads slots of ty's scalar fields.
                            let raw = unsafe { compiled.call_load(obj.slots_ptr()) };
                            Ok(value_type.decode(raw))
                        })
                    }
                    Err(e) => {
                        Self::jit_failed(property, "get", &e);
                        LATE_BOUND.property_getter(property)
                    }
                }
            }
            Some(PropertyGetter::Native(get)) => {
                let get = get.clone();
                Getter::new(property, move |obj| {
                    checks::instance(&ty, obj)?;
                    get(obj).map_err(CallError::Member)
                })
            }
            None => LATE_BOUND.property_getter(property),
        }
    }

    fn field_setter(&self, field: &FieldInfo) -> Setter {
        let label = field.to_string();
        let ty = field.declaring_type().clone();
        let value_type = field.value_type();
        match field.def().storage() {
            FieldStorage::Slot(slot) => match jit::compile_store(slot) {
                Ok(store) => {
                    debug!(event = "jit_compile", member = %field, op = "set", slot);
                    Setter::new(field, move |obj, value| {
                        checks::instance(&ty, obj)?;
                        let raw = value_type
                            .encode(&value)
                            .ok_or_else(|| checks::value_type_error(&label, value_type, &value))?;
                        // SAFETY: obj is an instance of ty and is borrowed mutably.
                        unsafe { store.call_store(obj.slots_mut_ptr(), raw) };
                        Ok(())
                    })
                }
                Err(e) => {
                    Self::jit_failed(field, "set", &e);
                    LATE_BOUND.field_setter(field)
                }
            },
            FieldStorage::Value(index) => Setter::new(field, move |obj, value| {
                checks::instance(&ty, obj)?;
                checks::value(&label, value_type, &value)?;
                obj.set_value_at(index, value);
                Ok(())
            }),
        }
    }

    fn property_setter(&self, property: &PropertyInfo) -> Setter {
        let Some(set) = property.def().setter.clone() else {
            return LATE_BOUND.property_setter(property);
        };
        let label = property.to_string();
        let ty = property.declaring_type().clone();
        let value_type = property.value_type();
        Setter::new(property, move |obj, value| {
            checks::instance(&ty, obj)?;
            checks::value(&label, value_type, &value)?;
            set(obj, value).map_err(CallError::Member)
        })
    }

    fn method_call(&self, method: &MethodInfo) -> MethodCall {
        let label = method.to_string();
        let ty = method.declaring_type().clone();
        let def = method.def();
        let params = def.params.clone();
        let return_type = def.return_type;
        let body = def.body.clone();
        MethodCall::new(method, move |obj, args| {
            checks::instance(&ty, obj)?;
            checks::arguments(&label, &params, args)?;
            checks::method_result(return_type, body(obj, args))
        })
    }

    fn parameterized_constructor(&self, ctor: &ConstructorInfo) -> ObjectConstructor {
        let label = ctor.to_string();
        let ty = ctor.declaring_type().clone();
        let params = ctor.def().params.clone();
        let body = ctor.def().body.clone();
        ObjectConstructor::new(ctor, move |args| {
            checks::arguments(&label, &params, args)?;
            let mut obj = DynamicObject::new(&ty);
            body(&mut obj, args).map_err(CallError::Member)?;
            Ok(obj)
        })
    }

    fn default_constructor(
        &self,
        ty: &Arc<TypeDef>,
        ctor: Option<&ConstructorInfo>,
    ) -> DefaultConstructor {
        let ty = ty.clone();
        match ctor {
            Some(ctor) => {
                let body = ctor.def().body.clone();
                DefaultConstructor::new(ctor, move || {
                    let mut obj = DynamicObject::new(&ty);
                    body(&mut obj, &[]).map_err(CallError::Member)?;
                    Ok(obj)
                })
            }
            None => {
                let label = format!("{}::default", ty.name());
                DefaultConstructor::new(label, move || Ok(DynamicObject::new(&ty)))
            }
        }
    }
}

/// Slot of each field by declaration index; `None` for boxed fields.
fn slot_map(ty: &TypeDef) -> Vec<Option<usize>> {
    ty.fields()
        .iter()
        .map(|field| match field.storage() {
            FieldStorage::Slot(slot) => Some(slot),
            FieldStorage::Value(_) => None,
        })
        .collect()
}

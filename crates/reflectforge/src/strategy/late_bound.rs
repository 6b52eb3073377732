//! Late-bound strategy: resolves the member through the instance's type
//! definition on every call.
//!
//! Delegates capture only the declaring type and the member's name (or
//! arity, for constructors). Nothing is precomputed.

use std::sync::Arc;

use reflectforge_core::{
    CallError, ConstructorInfo, DynamicObject, DynamicValue, FieldInfo, MethodInfo, PropertyGetter,
    PropertyInfo, TypeDef,
};

use super::{checks, DelegateStrategy, StrategyKind};
use crate::delegate::{DefaultConstructor, Getter, MethodCall, ObjectConstructor, Setter};

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LateBoundStrategy;

impl DelegateStrategy for LateBoundStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    fn field_getter(&self, field: &FieldInfo) -> Getter {
        let ty = field.declaring_type().clone();
        let name: Arc<str> = field.def().name.clone();
        Getter::new(field, move |obj| {
            checks::instance(&ty, obj)?;
            let def = obj
                .type_def()
                .field_def(&name)
                .ok_or_else(|| checks::missing(&ty, obj))?;
            Ok(obj.read(def))
        })
    }

    fn property_getter(&self, property: &PropertyInfo) -> Getter {
        let label = property.to_string();
        let ty = property.declaring_type().clone();
        let name: Arc<str> = property.def().name.clone();
        Getter::new(property, move |obj| {
            checks::instance(&ty, obj)?;
            let def = obj
                .type_def()
                .property_def(&name)
                .ok_or_else(|| checks::missing(&ty, obj))?;
            match &def.getter {
                Some(PropertyGetter::Computed(expr)) => Ok(def.value_type.decode(expr.eval(obj))),
                Some(PropertyGetter::Native(get)) => get(obj).map_err(CallError::Member),
                None => Err(checks::missing_accessor(&label, "getter")),
            }
        })
    }

    fn field_setter(&self, field: &FieldInfo) -> Setter {
        let label = field.to_string();
        let ty = field.declaring_type().clone();
        let name: Arc<str> = field.def().name.clone();
        Setter::new(field, move |obj, value| {
            checks::instance(&ty, obj)?;
            let type_def = obj.type_def().clone();
            let def = type_def
                .field_def(&name)
                .ok_or_else(|| checks::missing(&ty, obj))?;
            checks::value(&label, def.value_type, &value)?;
            obj.write(def, value);
            Ok(())
        })
    }

    fn property_setter(&self, property: &PropertyInfo) -> Setter {
        let label = property.to_string();
        let ty = property.declaring_type().clone();
        let name: Arc<str> = property.def().name.clone();
        Setter::new(property, move |obj, value| {
            checks::instance(&ty, obj)?;
            let type_def = obj.type_def().clone();
            let def = type_def
                .property_def(&name)
                .ok_or_else(|| checks::missing(&ty, obj))?;
            checks::value(&label, def.value_type, &value)?;
            let set = def
                .setter
                .as_ref()
                .ok_or_else(|| checks::missing_accessor(&label, "setter"))?;
            set(obj, value).map_err(CallError::Member)
        })
    }

    fn method_call(&self, method: &MethodInfo) -> MethodCall {
        let label = method.to_string();
        let ty = method.declaring_type().clone();
        let name: Arc<str> = method.def().name.clone();
        MethodCall::new(method, move |obj, args| {
            checks::instance(&ty, obj)?;
            let type_def = obj.type_def().clone();
            let def = type_def
                .method_def(&name)
                .ok_or_else(|| checks::missing(&ty, obj))?;
            checks::arguments(&label, &def.params, args)?;
            checks::method_result(def.return_type, (def.body)(obj, args))
        })
    }

    fn parameterized_constructor(&self, ctor: &ConstructorInfo) -> ObjectConstructor {
        let label = ctor.to_string();
        let ty = ctor.declaring_type().clone();
        let arity = ctor.arity();
        ObjectConstructor::new(ctor, move |args| construct(&ty, arity, &label, args))
    }

    fn default_constructor(
        &self,
        ty: &Arc<TypeDef>,
        ctor: Option<&ConstructorInfo>,
    ) -> DefaultConstructor {
        let ty = ty.clone();
        match ctor {
            Some(ctor) => {
                let label = ctor.to_string();
                DefaultConstructor::new(ctor, move || construct(&ty, 0, &label, &[]))
            }
            None => {
                let label = format!("{}::default", ty.name());
                DefaultConstructor::new(label, move || Ok(DynamicObject::new(&ty)))
            }
        }
    }
}

fn construct(
    ty: &Arc<TypeDef>,
    arity: usize,
    label: &str,
    args: &[DynamicValue],
) -> Result<DynamicObject, CallError> {
    let def = ty.constructor_def(arity).ok_or_else(|| CallError::ArgumentCount {
        member: label.to_string(),
        expected: arity,
        found: args.len(),
    })?;
    checks::arguments(&label, &def.params, args)?;
    let mut obj = DynamicObject::new(ty);
    (def.body)(&mut obj, args).map_err(CallError::Member)?;
    Ok(obj)
}

//! Tests for member classification and strategy selection.

use reflectforge_config::{AccessorConfig, StrategyPolicy};
use reflectforge_core::{AccessorError, DynamicValue, Member, MemberKind};
use reflectforge_test::{account_type, counter_type, point_type, shape_type};

use super::DelegateFactory;
use crate::capability::dynamic_code_generation;
use crate::strategy::{available, StrategyKind};

fn factories() -> Vec<DelegateFactory> {
    available()
        .into_iter()
        .map(DelegateFactory::with_strategy)
        .collect()
}

fn constructor_member(ty: &std::sync::Arc<reflectforge_core::TypeDef>) -> Member {
    ty.members()
        .into_iter()
        .find(|m| m.kind() == MemberKind::Constructor)
        .unwrap()
}

#[test]
fn test_instance_is_stable() {
    let a = DelegateFactory::instance();
    let b = DelegateFactory::instance();
    assert!(std::ptr::eq(a, b));
    let expected = if dynamic_code_generation() {
        StrategyKind::Compiling
    } else {
        StrategyKind::Fallback
    };
    assert_eq!(a.strategy_kind(), expected);
}

#[test]
fn test_fallback_policy() {
    let config = AccessorConfig::default().with_strategy(StrategyPolicy::Fallback);
    let factory = DelegateFactory::from_config(&config);
    assert_eq!(factory.strategy_kind(), StrategyKind::Fallback);
}

#[test]
fn test_with_strategy_respects_capability() {
    let factory = DelegateFactory::with_strategy(StrategyKind::Compiling);
    assert_eq!(
        factory.strategy_kind() == StrategyKind::Compiling,
        dynamic_code_generation()
    );
    let factory = DelegateFactory::with_strategy(StrategyKind::Fallback);
    assert_eq!(factory.strategy_kind(), StrategyKind::Fallback);
}

#[test]
fn test_get_rejects_methods_and_constructors() {
    let ty = point_type();
    let account = account_type();
    for factory in factories() {
        let err = factory
            .create_get(&ty.member("translate").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            AccessorError::UnsupportedMemberKind {
                operation: "getter",
                kind: "method",
                member: "translate".into(),
                declaring_type: "Point".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Could not create getter for method Point.translate"
        );

        let err = factory
            .create_get(&constructor_member(&account))
            .unwrap_err();
        assert!(matches!(
            err,
            AccessorError::UnsupportedMemberKind {
                kind: "constructor",
                ..
            }
        ));
    }
}

#[test]
fn test_set_rejects_methods_and_constructors() {
    let ty = account_type();
    for factory in factories() {
        let err = factory.create_set(&ty.member("deposit").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            AccessorError::UnsupportedMemberKind {
                operation: "setter",
                kind: "method",
                ..
            }
        ));
        let err = factory.create_set(&constructor_member(&ty)).unwrap_err();
        assert!(matches!(
            err,
            AccessorError::UnsupportedMemberKind {
                operation: "setter",
                kind: "constructor",
                ..
            }
        ));
    }
}

#[test]
fn test_by_ref_property_rejected_by_every_strategy() {
    let ty = point_type();
    let member = ty.member("x_ref").unwrap();
    for factory in factories() {
        let err = factory.create_get(&member).unwrap_err();
        assert_eq!(
            err,
            AccessorError::UnsupportedReturnShape {
                member: "x_ref".into(),
                declaring_type: "Point".into(),
            }
        );
        assert!(err.to_string().contains("Point.x_ref"));
    }
}

#[test]
fn test_unreadable_and_unwritable_members() {
    let point = point_type();
    let account = account_type();
    for factory in factories() {
        let err = factory
            .create_get(&point.member("reset_to").unwrap())
            .unwrap_err();
        assert!(matches!(err, AccessorError::NotReadable { .. }));

        let err = factory.create_set(&point.member("sum").unwrap()).unwrap_err();
        assert!(matches!(err, AccessorError::NotWritable { .. }));

        let err = factory.create_set(&account.member("id").unwrap()).unwrap_err();
        assert_eq!(
            err,
            AccessorError::NotWritable {
                member: "id".into(),
                declaring_type: "Account".into(),
            }
        );

        // Readable despite being read-only.
        assert!(factory.create_get(&account.member("id").unwrap()).is_ok());
    }
}

#[test]
fn test_abstract_type_cannot_be_constructed() {
    let ty = shape_type();
    for factory in factories() {
        let ctor = ty.constructor(1).unwrap();
        let err = factory.create_parameterized_constructor(&ctor).unwrap_err();
        assert_eq!(
            err,
            AccessorError::ConstructionUnavailable {
                declaring_type: "Shape".into(),
                reason: "type is abstract",
            }
        );
        assert!(factory.create_default_constructor(&ty).is_err());
    }
}

#[test]
fn test_class_without_parameterless_constructor() {
    let ty = account_type();
    for factory in factories() {
        let err = factory.create_default_constructor(&ty).unwrap_err();
        assert_eq!(
            err,
            AccessorError::ConstructionUnavailable {
                declaring_type: "Account".into(),
                reason: "no parameterless constructor",
            }
        );
    }
}

#[test]
fn test_non_public_default_constructor_visibility() {
    let ty = counter_type();
    for factory in factories() {
        let ctor = factory.create_default_constructor(&ty).unwrap();
        let obj = ctor.construct().unwrap();
        assert_eq!(obj.field("count"), Some(DynamicValue::I64(1)));
    }

    let config = AccessorConfig::default()
        .with_strategy(StrategyPolicy::Fallback)
        .with_non_public_default_constructor(false);
    let factory = DelegateFactory::from_config(&config);
    let err = factory.create_default_constructor(&ty).unwrap_err();
    assert!(matches!(err, AccessorError::ConstructionUnavailable { .. }));
}

#[test]
fn test_value_type_default_constructor_uses_defaults() {
    let ty = point_type();
    for factory in factories() {
        let obj = factory.create_default_constructor(&ty).unwrap().construct().unwrap();
        assert!(obj.is_instance_of(&ty));
        assert_eq!(obj.field("x"), Some(DynamicValue::I64(0)));
        assert_eq!(obj.field("weight"), Some(DynamicValue::F64(0.0)));
        assert_eq!(obj.field("label"), Some(DynamicValue::None));
    }
}

#[test]
fn test_delegates_name_their_member() {
    let ty = point_type();
    for factory in factories() {
        let get = factory.create_get(&ty.member("x").unwrap()).unwrap();
        assert_eq!(get.member(), "Point.x");
        let call = factory
            .create_method_call(&ty.method("dot").unwrap())
            .unwrap();
        assert_eq!(call.member(), "Point.dot(i64, i64)");
    }
}

#[test]
fn test_default_constructor_returns_independent_instances() {
    let counter = counter_type();
    let point = point_type();
    for factory in factories() {
        let ctor = factory.create_default_constructor(&counter).unwrap();
        let mut first = ctor.construct().unwrap();
        let second = ctor.construct().unwrap();
        first.set_field("count", DynamicValue::I64(50)).unwrap();
        assert_eq!(first.field("count"), Some(DynamicValue::I64(50)));
        assert_eq!(second.field("count"), Some(DynamicValue::I64(1)));

        let ctor = factory.create_default_constructor(&point).unwrap();
        let mut first = ctor.construct().unwrap();
        let second = ctor.construct().unwrap();
        first.set_field("x", DynamicValue::I64(9)).unwrap();
        first.set_field("label", DynamicValue::from("moved")).unwrap();
        assert_eq!(second.field("x"), Some(DynamicValue::I64(0)));
        assert_eq!(second.field("label"), Some(DynamicValue::None));
    }
}

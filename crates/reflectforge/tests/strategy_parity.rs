//! Every strategy available on this host must behave identically: same
//! values, same errors, same side effects.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};

use reflectforge::strategy::available;
use reflectforge::{CallError, DelegateFactory, DynamicObject, DynamicValue, StrategyKind};
use reflectforge_test::{account, account_type, counter_type, point, point_type, FixtureError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Runs `f` once per available strategy, asserts all outcomes render the
/// same, and returns the first.
fn agree<T: Debug>(f: impl Fn(&DelegateFactory) -> T) -> T {
    init_tracing();
    let mut outcomes: Vec<(String, T)> = available()
        .into_iter()
        .map(|kind| {
            let factory = DelegateFactory::with_strategy(kind);
            let outcome = f(&factory);
            (format!("{outcome:?}"), outcome)
        })
        .collect();
    for (rendered, _) in &outcomes[1..] {
        assert_eq!(rendered, &outcomes[0].0);
    }
    outcomes.swap_remove(0).1
}

fn member_error<T: Debug>(result: Result<T, CallError>) -> FixtureError {
    let err = result.unwrap_err();
    err.member_error()
        .and_then(|e| e.downcast_ref::<FixtureError>())
        .cloned()
        .unwrap_or_else(|| panic!("expected a fixture error, got {err:?}"))
}

#[test]
fn test_always_has_fallback() {
    assert!(available().contains(&StrategyKind::Fallback));
}

#[test]
fn test_scalar_field_round_trip() {
    let ty = point_type();
    let values = agree(|factory| {
        let mut p = point(&ty, 0, 0);
        let mut read = Vec::new();
        for (name, value) in [
            ("x", DynamicValue::I64(i64::MIN)),
            ("y", DynamicValue::I64(-42)),
            ("weight", DynamicValue::F64(-0.0)),
            ("visible", DynamicValue::Bool(true)),
        ] {
            let member = ty.member(name).unwrap();
            let set = factory.create_set(&member).unwrap();
            let get = factory.create_get(&member).unwrap();
            set.set(&mut p, value).unwrap();
            read.push(get.get(&p).unwrap());
        }
        (read, p)
    });
    assert_eq!(
        values.0,
        vec![
            DynamicValue::I64(i64::MIN),
            DynamicValue::I64(-42),
            DynamicValue::F64(-0.0),
            DynamicValue::Bool(true),
        ]
    );
    assert_eq!(values.1.field("y"), Some(DynamicValue::I64(-42)));
}

#[test]
fn test_nan_survives_slot_storage() {
    let ty = point_type();
    let bits = agree(|factory| {
        let member = ty.member("weight").unwrap();
        let mut p = point(&ty, 0, 0);
        factory
            .create_set(&member)
            .unwrap()
            .set(&mut p, DynamicValue::F64(f64::NAN))
            .unwrap();
        let value = factory.create_get(&member).unwrap().get(&p).unwrap();
        value.as_f64().map(f64::to_bits)
    });
    assert_eq!(bits, Some(f64::NAN.to_bits()));
}

#[test]
fn test_boxed_field_round_trip() {
    let ty = point_type();
    let read = agree(|factory| {
        let mut p = point(&ty, 1, 2);
        let label = ty.member("label").unwrap();
        let tags = ty.member("tags").unwrap();
        let before = factory.create_get(&label).unwrap().get(&p).unwrap();
        factory
            .create_set(&label)
            .unwrap()
            .set(&mut p, "home".into())
            .unwrap();
        factory
            .create_set(&tags)
            .unwrap()
            .set(&mut p, vec![DynamicValue::I64(1), "a".into()].into())
            .unwrap();
        (
            before,
            factory.create_get(&label).unwrap().get(&p).unwrap(),
            factory.create_get(&tags).unwrap().get(&p).unwrap(),
        )
    });
    assert_eq!(read.0, DynamicValue::None);
    assert_eq!(read.1, DynamicValue::from("home"));
    assert_eq!(
        read.2,
        DynamicValue::List(vec![DynamicValue::I64(1), "a".into()])
    );
}

#[test]
fn test_computed_properties() {
    let ty = point_type();
    let coords = [
        (0, 0),
        (3, -4),
        (-7, 2),
        (250, -250),
        (i64::MAX, 1),
        (i64::MIN, 0),
        (i64::MIN, i64::MAX),
    ];
    let names = ["sum", "manhattan", "is_origin", "hidden", "spread", "clamped_x"];
    let table = agree(|factory| {
        let getters: Vec<_> = names
            .iter()
            .map(|name| factory.create_get(&ty.member(name).unwrap()).unwrap())
            .collect();
        coords
            .iter()
            .map(|&(x, y)| {
                let p = point(&ty, x, y);
                getters
                    .iter()
                    .map(|g| g.get(&p).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    });

    assert_eq!(
        table[1],
        vec![
            DynamicValue::I64(-1),
            DynamicValue::I64(7),
            DynamicValue::Bool(false),
            DynamicValue::Bool(true),
            DynamicValue::I64(7),
            DynamicValue::I64(3),
        ]
    );
    assert_eq!(table[0][2], DynamicValue::Bool(true));
    assert_eq!(table[3][5], DynamicValue::I64(100));
    assert_eq!(table[4][0], DynamicValue::I64(i64::MIN));
    assert_eq!(table[5][5], DynamicValue::I64(-100));
}

#[test]
fn test_native_properties() {
    let ty = point_type();
    let out = agree(|factory| {
        let mut p = point(&ty, 3, 4);
        p.set_field("label", "P".into()).unwrap();
        let display = factory.create_get(&ty.member("display").unwrap()).unwrap();
        let position = ty.member("position").unwrap();
        let reset = factory.create_set(&ty.member("reset_to").unwrap()).unwrap();

        let shown = display.get(&p).unwrap();
        factory
            .create_set(&position)
            .unwrap()
            .set(&mut p, DynamicValue::I64(9))
            .unwrap();
        let moved = factory.create_get(&position).unwrap().get(&p).unwrap();
        reset.set(&mut p, DynamicValue::I64(-1)).unwrap();
        (shown, moved, display.get(&p).unwrap())
    });
    assert_eq!(out.0, DynamicValue::from("P(3, 4)"));
    assert_eq!(out.1, DynamicValue::I64(9));
    assert_eq!(out.2, DynamicValue::from("P(-1, -1)"));
}

#[test]
fn test_setter_rejects_wrong_value_type() {
    let ty = point_type();
    let errors = agree(|factory| {
        let mut p = point(&ty, 5, 5);
        let x = factory.create_set(&ty.member("x").unwrap()).unwrap();
        let label = factory.create_set(&ty.member("label").unwrap()).unwrap();
        let position = factory.create_set(&ty.member("position").unwrap()).unwrap();
        let errors = vec![
            x.set(&mut p, DynamicValue::F64(1.0)).unwrap_err().to_string(),
            x.set(&mut p, DynamicValue::None).unwrap_err().to_string(),
            label.set(&mut p, DynamicValue::I64(1)).unwrap_err().to_string(),
            position.set(&mut p, true.into()).unwrap_err().to_string(),
        ];
        label.set(&mut p, DynamicValue::None).unwrap();
        (errors, p)
    });
    assert_eq!(errors.0[0], "Point.x expects i64, got f64");
    assert_eq!(errors.0[3], "Point.position expects i64, got bool");
    // Failed writes leave the instance untouched.
    assert_eq!(errors.1.field("x"), Some(DynamicValue::I64(5)));
}

#[test]
fn test_wrong_instance_type() {
    let ty = point_type();
    let other_point = point_type();
    let accounts = account_type();
    let errors = agree(|factory| {
        let get = factory.create_get(&ty.member("x").unwrap()).unwrap();
        let sum = factory.create_get(&ty.member("sum").unwrap()).unwrap();
        let set = factory.create_set(&ty.member("y").unwrap()).unwrap();
        let call = factory
            .create_method_call(&ty.method("dot").unwrap())
            .unwrap();
        let mut stranger = point(&other_point, 1, 1);
        let mut acct = account(&accounts, 1, "ann", 10);
        [
            get.get(&stranger).unwrap_err(),
            sum.get(&acct).unwrap_err(),
            set.set(&mut acct, DynamicValue::I64(1)).unwrap_err(),
            call.call(&mut stranger, &[1i64.into(), 2i64.into()])
                .unwrap_err(),
        ]
        .map(|e| e.to_string())
    });
    assert_eq!(errors[0], "Expected instance of Point, got Point");
    assert_eq!(errors[1], "Expected instance of Point, got Account");
}

#[test]
fn test_method_calls() {
    let ty = point_type();
    let out = agree(|factory| {
        let mut p = point(&ty, 1, 2);
        let translate = factory
            .create_method_call(&ty.method("translate").unwrap())
            .unwrap();
        let dot = factory.create_method_call(&ty.method("dot").unwrap()).unwrap();
        let shown = factory
            .create_method_call(&ty.method("is_shown").unwrap())
            .unwrap();
        let unit = translate
            .call(&mut p, &[10i64.into(), (-1i64).into()])
            .unwrap();
        let product = dot.call(&mut p, &[2i64.into(), 3i64.into()]).unwrap();
        (unit, product, shown.call(&mut p, &[]).unwrap(), p)
    });
    // Unit methods yield None whatever the body returns.
    assert_eq!(out.0, DynamicValue::None);
    assert_eq!(out.1, DynamicValue::I64(25));
    assert_eq!(out.2, DynamicValue::Bool(false));
    assert_eq!(out.3.field("x"), Some(DynamicValue::I64(11)));
}

#[test]
fn test_method_argument_errors() {
    let ty = point_type();
    let errors = agree(|factory| {
        let mut p = point(&ty, 1, 2);
        let dot = factory.create_method_call(&ty.method("dot").unwrap()).unwrap();
        [
            dot.call(&mut p, &[1i64.into()]).unwrap_err(),
            dot.call(&mut p, &[1i64.into(), "2".into()]).unwrap_err(),
        ]
        .map(|e| e.to_string())
    });
    assert_eq!(errors[0], "Point.dot(i64, i64) takes 2 argument(s), got 1");
    assert_eq!(errors[1], "Point.dot(i64, i64) expects i64, got string");
}

#[test]
fn test_member_errors_pass_through() {
    let ty = account_type();
    let out = agree(|factory| {
        let mut acct = account(&ty, 7, "bea", 50);
        let withdraw = factory
            .create_method_call(&ty.method("withdraw").unwrap())
            .unwrap();
        let funds = factory.create_set(&ty.member("funds").unwrap()).unwrap();
        let close = factory
            .create_method_call(&ty.method("close").unwrap())
            .unwrap();

        let overdraw = member_error(withdraw.call(&mut acct, &[80i64.into()]));
        let negative = member_error(funds.set(&mut acct, (-5i64).into()));
        let left = withdraw.call(&mut acct, &[20i64.into()]).unwrap();
        let closed = close.call(&mut acct, &[]).unwrap();
        let after_close = member_error(withdraw.call(&mut acct, &[1i64.into()]));
        (overdraw, negative, left, closed, after_close, acct)
    });
    assert_eq!(
        out.0,
        FixtureError::InsufficientFunds {
            balance: 50,
            requested: 80
        }
    );
    assert_eq!(out.1, FixtureError::NegativeBalance(-5));
    assert_eq!(out.2, DynamicValue::I64(30));
    assert_eq!(out.3, DynamicValue::None);
    assert_eq!(out.4, FixtureError::Closed);
    assert_eq!(out.5.field("balance"), Some(DynamicValue::I64(30)));
}

#[test]
fn test_non_public_members_are_accessible() {
    let ty = account_type();
    let out = agree(|factory| {
        let mut acct = account(&ty, 1, "cy", 12);
        let balance = factory.create_get(&ty.member("balance").unwrap()).unwrap();
        let audit = factory
            .create_method_call(&ty.method("audit").unwrap())
            .unwrap();
        (
            balance.get(&acct).unwrap(),
            audit.call(&mut acct, &[DynamicValue::None]).unwrap(),
            audit.call(&mut acct, &[DynamicValue::List(vec![])]).unwrap(),
        )
    });
    assert_eq!(out.0, DynamicValue::I64(12));
    assert_eq!(out.1, DynamicValue::None);
    assert_eq!(out.2, DynamicValue::List(vec![]));
}

#[test]
fn test_parameterized_constructors() {
    let ty = account_type();
    let out = agree(|factory| {
        let by_owner = factory
            .create_parameterized_constructor(&ty.constructor(1).unwrap())
            .unwrap();
        let with_balance = factory
            .create_parameterized_constructor(&ty.constructor(2).unwrap())
            .unwrap();
        let full = factory
            .create_parameterized_constructor(&ty.constructor(3).unwrap())
            .unwrap();
        (
            by_owner.construct(&["dee".into()]).unwrap(),
            with_balance
                .construct(&["eve".into(), 40i64.into()])
                .unwrap(),
            full.construct(&[9i64.into(), "fay".into(), 1i64.into()])
                .unwrap(),
            member_error(with_balance.construct(&["gus".into(), (-1i64).into()])),
            by_owner.construct(&[]).unwrap_err().to_string(),
            by_owner.construct(&[1i64.into()]).unwrap_err().to_string(),
        )
    });
    assert!(out.0.is_instance_of(&ty));
    assert_eq!(out.0.field("owner"), Some(DynamicValue::from("dee")));
    assert_eq!(out.0.field("open"), Some(DynamicValue::Bool(true)));
    assert_eq!(out.1.field("balance"), Some(DynamicValue::I64(40)));
    assert_eq!(out.2.field("id"), Some(DynamicValue::I64(9)));
    assert_eq!(out.3, FixtureError::NegativeBalance(-1));
    assert_eq!(out.4, "Account::new(string) takes 1 argument(s), got 0");
    assert_eq!(out.5, "Account::new(string) expects string, got i64");
}

#[test]
fn test_default_constructors() {
    let counter = counter_type();
    let points = point_type();
    let out = agree(|factory| {
        let make_counter = factory.create_default_constructor(&counter).unwrap();
        let make_point = factory.create_default_constructor(&points).unwrap();
        let mut c = make_counter.construct().unwrap();
        let increment = factory
            .create_method_call(&counter.method("increment").unwrap())
            .unwrap();
        let next = increment.call(&mut c, &[]).unwrap();
        (next, make_point.construct().unwrap())
    });
    assert_eq!(out.0, DynamicValue::I64(2));
    assert_eq!(out.1, DynamicObject::new(&points));
}

#[test]
fn test_panics_unwind_through_delegates() {
    let ty = counter_type();
    for kind in available() {
        let factory = DelegateFactory::with_strategy(kind);
        let explode = factory
            .create_method_call(&ty.method("explode").unwrap())
            .unwrap();
        let mut c = DynamicObject::new(&ty);
        let caught = panic::catch_unwind(AssertUnwindSafe(|| explode.call(&mut c, &[])));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"counter exploded"));
    }
}

#[test]
fn test_delegates_are_shareable_across_threads() {
    let ty = point_type();
    let factory = DelegateFactory::instance();
    let sum = factory.create_get(&ty.member("sum").unwrap()).unwrap();
    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let sum = sum.clone();
            let ty = ty.clone();
            std::thread::spawn(move || sum.get(&point(&ty, i, i)).unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        (0..4i64).map(|i| DynamicValue::I64(2 * i)).collect::<Vec<_>>()
    );
}

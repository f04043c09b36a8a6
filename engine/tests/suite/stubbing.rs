//! Stub registration and dispatch resolution.

use mimic_engine::{
    any, eq, val, ArgValue, Behavior, DispatchPath, MockError, Mocker, VerificationBlock,
};

use super::{call, member, send};

#[test]
fn last_matching_stub_wins() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    // S1 first, S2 (broader) second: a call matching both resolves to S2.
    mocker
        .register_stub(
            api,
            member("getUserById", 1),
            vec![eq(42).into()],
            Behavior::returns("userA"),
            DispatchPath::Sync,
        )
        .unwrap();
    mocker
        .register_stub(
            api,
            member("getUserById", 1),
            vec![any().into()],
            Behavior::returns("userB"),
            DispatchPath::Sync,
        )
        .unwrap();

    assert_eq!(send(&mocker, api, "getUserById", 42).unwrap(), ArgValue::new("userB"));
    assert_eq!(send(&mocker, api, "getUserById", 7).unwrap(), ArgValue::new("userB"));
}

#[test]
fn narrow_override_after_broad_stub() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("getUserById", 1),
            vec![any().into()],
            Behavior::returns("userB"),
            DispatchPath::Sync,
        )
        .unwrap();
    mocker
        .register_stub(
            api,
            member("getUserById", 1),
            vec![eq(42).into()],
            Behavior::returns("userA"),
            DispatchPath::Sync,
        )
        .unwrap();

    assert_eq!(send(&mocker, api, "getUserById", 42).unwrap(), ArgValue::new("userA"));
    assert_eq!(send(&mocker, api, "getUserById", 7).unwrap(), ArgValue::new("userB"));
}

#[test]
fn unmocked_call_is_a_hard_failure_naming_the_call() {
    let mocker = Mocker::new();
    let db = mocker.create_unit("db");
    let err = send(&mocker, db, "saveUser", 42).unwrap_err();
    match &err {
        MockError::UnmockedCall { unit, member, args } => {
            assert_eq!(unit, "db");
            assert_eq!(member, "saveUser");
            assert_eq!(args, "(42)");
        }
        other => panic!("expected UnmockedCall, got {other}"),
    }
}

#[test]
fn computed_behavior_sees_the_argument_vector() {
    let mocker = Mocker::new();
    let math = mocker.create_unit("math");
    mocker
        .register_stub(
            math,
            member("double", 1),
            vec![any().into()],
            Behavior::computes(|args| {
                let n = args[0].as_json().as_i64().unwrap_or(0);
                Ok(ArgValue::new(n * 2))
            }),
            DispatchPath::Sync,
        )
        .unwrap();

    assert_eq!(send(&mocker, math, "double", 21).unwrap(), ArgValue::new(42));
}

#[test]
fn declared_failure_propagates_and_the_call_still_verifies() {
    let mocker = Mocker::new();
    let db = mocker.create_unit("db");
    mocker
        .register_stub(
            db,
            member("saveUser", 1),
            vec![any().into()],
            Behavior::raises("database is down"),
            DispatchPath::Sync,
        )
        .unwrap();

    let err = send(&mocker, db, "saveUser", 42).unwrap_err();
    match &err {
        MockError::Declared(failure) => assert_eq!(failure.message(), "database is down"),
        other => panic!("expected Declared, got {other}"),
    }

    // Existence verification tolerates calls whose behavior raised.
    let block = VerificationBlock::new().expect(call(db, "saveUser", vec![val(42)]));
    mocker.verify(&block).unwrap();
}

#[test]
fn mixed_bare_and_matcher_arguments_are_rejected_at_definition() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    let err = mocker
        .register_stub(
            api,
            member("link", 2),
            vec![val(1), any().into()],
            Behavior::returns(true),
            DispatchPath::Sync,
        )
        .unwrap_err();
    match &err {
        MockError::MixedArguments { member } => assert_eq!(member, "link/2"),
        other => panic!("expected MixedArguments, got {other}"),
    }
}

#[test]
fn constraint_arity_must_equal_member_arity() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    let err = mocker
        .register_stub(
            api,
            member("link", 2),
            vec![any().into()],
            Behavior::returns(true),
            DispatchPath::Sync,
        )
        .unwrap_err();
    assert!(matches!(err, MockError::ArityMismatch { expected: 2, given: 1, .. }));
}

//! The four verification modes against a live engine.

use mimic_engine::{
    any, val, Behavior, DispatchPath, MockError, Mocker, UnitId, VerificationBlock,
};

use super::{call, member, send};

/// One unit with a catch-all stub per named member, so dispatch never fails.
fn engine_with_calls(names: &[(&str, i64)]) -> (Mocker, UnitId) {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    for (name, _) in names {
        // Re-registering the same catch-all is harmless: last one wins.
        mocker
            .register_stub(
                api,
                member(name, 1),
                vec![any().into()],
                Behavior::returns(true),
                DispatchPath::Sync,
            )
            .unwrap();
    }
    for (name, arg) in names {
        send(&mocker, api, name, *arg).unwrap();
    }
    (mocker, api)
}

#[test]
fn exhaustive_ordered_accepts_the_exact_sequence() {
    let (mocker, api) = engine_with_calls(&[("open", 1), ("read", 2), ("close", 3)]);
    let block = VerificationBlock::new()
        .expect(call(api, "open", vec![val(1)]))
        .expect(call(api, "read", vec![val(2)]))
        .expect(call(api, "close", vec![val(3)]))
        .exhaustive()
        .in_order();
    mocker.verify(&block).unwrap();
}

#[test]
fn exhaustive_ordered_rejects_a_permutation() {
    let (mocker, api) = engine_with_calls(&[("open", 1), ("read", 2)]);
    let block = VerificationBlock::new()
        .expect(call(api, "read", vec![val(2)]))
        .expect(call(api, "open", vec![val(1)]))
        .exhaustive()
        .in_order();
    let err = mocker.verify(&block).unwrap_err();
    match &err {
        MockError::VerificationFailed(failure) => {
            assert!(!failure.unmatched_patterns().is_empty());
            assert!(!failure.leftover_invocations().is_empty());
        }
        other => panic!("expected VerificationFailed, got {other}"),
    }
}

#[test]
fn ordered_subsequence_tolerates_interleaved_calls() {
    let (mocker, api) = engine_with_calls(&[
        ("open", 1),
        ("poll", 0),
        ("read", 2),
        ("poll", 0),
        ("close", 3),
    ]);
    let block = VerificationBlock::new()
        .expect(call(api, "open", vec![val(1)]))
        .expect(call(api, "read", vec![val(2)]))
        .expect(call(api, "close", vec![val(3)]))
        .in_order();
    mocker.verify(&block).unwrap();
}

#[test]
fn exhaustive_unordered_accepts_any_permutation() {
    let (mocker, api) = engine_with_calls(&[("open", 1), ("read", 2), ("close", 3)]);
    let block = VerificationBlock::new()
        .expect(call(api, "close", vec![val(3)]))
        .expect(call(api, "open", vec![val(1)]))
        .expect(call(api, "read", vec![val(2)]))
        .exhaustive();
    mocker.verify(&block).unwrap();
}

#[test]
fn exhaustive_unordered_rejects_an_omitted_call() {
    let (mocker, api) = engine_with_calls(&[("open", 1), ("read", 2)]);
    let block = VerificationBlock::new()
        .expect(call(api, "open", vec![val(1)]))
        .exhaustive();
    let err = mocker.verify(&block).unwrap_err();
    match &err {
        MockError::VerificationFailed(failure) => {
            let rendered = failure.to_string();
            assert!(rendered.contains("recorded calls not accounted for:"));
            assert!(rendered.contains("read"));
        }
        other => panic!("expected VerificationFailed, got {other}"),
    }
}

#[test]
fn existence_check_ignores_unrelated_calls() {
    let (mocker, api) = engine_with_calls(&[("open", 1), ("poll", 0), ("read", 2)]);
    let block = VerificationBlock::new()
        .expect(call(api, "read", vec![val(2)]))
        .expect(call(api, "open", vec![val(1)]));
    mocker.verify(&block).unwrap();
}

#[test]
fn existence_check_names_the_missing_pattern() {
    let (mocker, api) = engine_with_calls(&[("open", 1)]);
    let block = VerificationBlock::new()
        .expect(call(api, "open", vec![val(1)]))
        .expect(call(api, "close", vec![val(9)]));
    let err = mocker.verify(&block).unwrap_err();
    match &err {
        MockError::VerificationFailed(failure) => {
            assert_eq!(failure.unmatched_patterns().len(), 1);
            assert!(failure.unmatched_patterns()[0].contains("close"));
            // Non-exhaustive modes report no leftovers.
            assert!(failure.leftover_invocations().is_empty());
        }
        other => panic!("expected VerificationFailed, got {other}"),
    }
}

#[test]
fn verification_is_scoped_to_the_referenced_units() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    let other = mocker.create_unit("other");
    for unit in [api, other] {
        mocker
            .register_stub(
                unit,
                member("ping", 1),
                vec![any().into()],
                Behavior::returns(true),
                DispatchPath::Sync,
            )
            .unwrap();
    }
    send(&mocker, api, "ping", 1).unwrap();
    send(&mocker, other, "ping", 2).unwrap();

    // Exhaustive over `api` only: the `other` call is out of scope.
    let block = VerificationBlock::new()
        .expect(call(api, "ping", vec![val(1)]))
        .exhaustive();
    mocker.verify(&block).unwrap();
}

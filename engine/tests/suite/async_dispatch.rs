//! The asynchronous dispatch path.

use mimic_engine::{
    any, val, ArgValue, Behavior, DispatchPath, MockError, Mocker, VerificationBlock,
};

use super::{call, member, send};

#[tokio::test]
async fn async_behavior_runs_in_the_caller_context() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("fetchUser", 1),
            vec![any().into()],
            Behavior::computes_async(|args| {
                Box::pin(async move {
                    // The body may suspend; the dispatcher simply awaits it.
                    tokio::task::yield_now().await;
                    let id = args[0].as_json().as_i64().unwrap_or(0);
                    Ok(ArgValue::new(format!("user-{id}")))
                })
            }),
            DispatchPath::Async,
        )
        .unwrap();

    let user = mocker
        .dispatch_async(api, member("fetchUser", 1), vec![ArgValue::new(42)])
        .await
        .unwrap();
    assert_eq!(user, ArgValue::new("user-42"));
}

#[tokio::test]
async fn non_suspending_behavior_is_fine_on_the_async_path() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("fetchUser", 1),
            vec![any().into()],
            Behavior::returns("cached"),
            DispatchPath::Async,
        )
        .unwrap();

    let user = mocker
        .dispatch_async(api, member("fetchUser", 1), vec![ArgValue::new(1)])
        .await
        .unwrap();
    assert_eq!(user, ArgValue::new("cached"));
}

#[tokio::test]
async fn async_dispatch_of_sync_member_is_a_path_mismatch() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("save", 1),
            vec![any().into()],
            Behavior::returns(true),
            DispatchPath::Sync,
        )
        .unwrap();

    let err = mocker
        .dispatch_async(api, member("save", 1), vec![ArgValue::new(1)])
        .await
        .unwrap_err();
    match &err {
        MockError::DispatchPathMismatch {
            member,
            registered,
            invoked,
        } => {
            assert_eq!(member, "save/1");
            assert_eq!(*registered, DispatchPath::Sync);
            assert_eq!(*invoked, DispatchPath::Async);
        }
        other => panic!("expected DispatchPathMismatch, got {other}"),
    }
}

#[tokio::test]
async fn declared_failure_propagates_through_the_async_path() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("fetchUser", 1),
            vec![any().into()],
            Behavior::computes_async(|_| {
                Box::pin(async { Err(mimic_engine::DeclaredFailure::new("timeout upstream")) })
            }),
            DispatchPath::Async,
        )
        .unwrap();

    let err = mocker
        .dispatch_async(api, member("fetchUser", 1), vec![ArgValue::new(1)])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "timeout upstream");
}

#[tokio::test]
async fn one_block_verifies_mixed_sync_and_async_calls() {
    let mocker = Mocker::new();
    let api = mocker.create_unit("api");
    mocker
        .register_stub(
            api,
            member("save", 1),
            vec![any().into()],
            Behavior::returns(true),
            DispatchPath::Sync,
        )
        .unwrap();
    mocker
        .register_stub(
            api,
            member("fetchUser", 1),
            vec![any().into()],
            Behavior::returns("user"),
            DispatchPath::Async,
        )
        .unwrap();

    send(&mocker, api, "save", 1).unwrap();
    mocker
        .dispatch_async(api, member("fetchUser", 1), vec![ArgValue::new(2)])
        .await
        .unwrap();

    let block = VerificationBlock::new()
        .expect(call(api, "save", vec![val(1)]).on_path(DispatchPath::Sync))
        .expect(call(api, "fetchUser", vec![val(2)]).on_path(DispatchPath::Async))
        .exhaustive()
        .in_order();
    mocker.verify(&block).unwrap();
}

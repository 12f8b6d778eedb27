//! Behaviour of `AsyncFn` as seen by code under test.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_fn_mock::prelude::*;
use futures::future::{pending, ready};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Collects what the code under test did, in order.
#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

#[tokio::test]
async fn test_call_result_is_a_future() {
    init_tracing();
    let fetch: AsyncFn<(), u32, ()> = AsyncFn::new();

    let doubled = fetch.call(()).map(|r| r.map(|n| n * 2));
    fetch.resolve(21).unwrap().await;

    assert_eq!(doubled.await, Ok(42));
}

#[tokio::test]
async fn test_nothing_settles_without_the_test() {
    let fetch: AsyncFn<(), u32, ()> = AsyncFn::new();
    let settled = Arc::new(AtomicBool::new(false));
    let settled_in_task = Arc::clone(&settled);

    let future = fetch.call(());
    tokio::spawn(async move {
        let _ = future.await;
        settled_in_task.store(true, Ordering::SeqCst);
    });

    flush_pending().await;
    flush_pending().await;
    assert!(!settled.load(Ordering::SeqCst));

    fetch.resolve(1).unwrap().await;
    assert!(settled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_resolve_settles_calls_in_invocation_order() {
    init_tracing();
    let load: AsyncFn<u32, char, ()> = AsyncFn::new();
    let log = Log::default();

    for id in 0..3 {
        let future = load.call(id);
        let log = log.clone();
        tokio::spawn(async move {
            if let Ok(c) = future.await {
                log.push(c.to_string());
            }
        });
    }

    load.resolve('a').unwrap().await;
    load.resolve('b').unwrap().await;
    load.resolve('c').unwrap().await;

    assert_eq!(log.entries(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_resolve_last_call_settles_most_recent_first() {
    let load: AsyncFn<&'static str, &'static str, ()> = AsyncFn::new();
    let first = load.call("first");
    let second = load.call("second");

    load.resolve_last_call("to second").unwrap().await;
    assert_eq!(load.pending_args(), vec!["first"]);

    load.resolve_last_call("to first").unwrap().await;
    assert_eq!(first.await, Ok("to first"));
    assert_eq!(second.await, Ok("to second"));
}

#[tokio::test]
async fn test_first_unresolved_skips_settled_calls() {
    let load: AsyncFn<u32, u32, ()> = AsyncFn::new();
    let a = load.call(1);
    let b = load.call(2);
    let c = load.call(3);

    load.resolve_last_call(30).unwrap().await;
    load.resolve_first_unresolved_call(10).unwrap().await;
    load.resolve_first_unresolved_call(20).unwrap().await;

    assert_eq!((a.await, b.await, c.await), (Ok(10), Ok(20), Ok(30)));
    assert!(!load.has_pending_calls());
}

#[tokio::test]
async fn test_settling_before_any_call_fails() {
    let load: AsyncFn<u32, u32, String> = AsyncFn::new();

    let err = load.resolve_last_call(1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Tried to resolve an AsyncFn call that has not been made yet."
    );

    let err = load.reject("nope".to_string()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Tried to reject an AsyncFn call that has not been made yet."
    );

    assert!(load.resolve_first_unresolved_call(1).unwrap_err().is_not_called_yet());
    assert!(load.resolve_specific(eq(1), 1).unwrap_err().is_not_called_yet());
}

#[tokio::test]
async fn test_settling_more_calls_than_made_fails() {
    let load: AsyncFn<u32, u32, ()> = AsyncFn::new();
    let _future = load.call(1);

    load.resolve(1).unwrap().await;
    assert!(load.resolve(2).unwrap_err().is_not_called_yet());
}

#[derive(Debug, Clone, Serialize)]
struct Request {
    #[serde(rename = "type")]
    kind: &'static str,
    page: u32,
}

#[tokio::test]
async fn test_resolve_specific_by_partial_arguments() {
    init_tracing();
    let send: AsyncFn<Request, u32, ()> = AsyncFn::new();

    let x = send.call(Request { kind: "x", page: 1 });
    let y = send.call(Request { kind: "y", page: 2 });

    let flush = send.resolve_specific(partial(json!({ "type": "y" })), 42).unwrap();
    assert_eq!(flush.settled_count(), 1);
    flush.await;

    assert_eq!(y.await, Ok(42));
    assert_eq!(send.pending_count(), 1);

    let mut x = x;
    assert!((&mut x).now_or_never().is_none());
    send.resolve(7).unwrap().await;
    assert_eq!(x.await, Ok(7));
}

#[tokio::test]
async fn test_resolve_specific_by_predicate() {
    let load: AsyncFn<(u32, String), &'static str, ()> = AsyncFn::new();
    let a = load.call((1, "users".to_string()));
    let b = load.call((2, "posts".to_string()));
    let c = load.call((3, "users".to_string()));

    load.resolve_specific(predicate(|(_, table): &(u32, String)| table == "users"), "row")
        .unwrap()
        .await;

    assert_eq!(a.await, Ok("row"));
    assert_eq!(c.await, Ok("row"));
    assert_eq!(load.pending_args(), vec![(2, "posts".to_string())]);
    drop(b);
}

#[tokio::test]
async fn test_combined_flush_runs_every_matched_continuation() {
    init_tracing();
    let send: AsyncFn<Request, u32, String> = AsyncFn::new();
    let log = Log::default();

    for (kind, page) in [("x", 1), ("y", 2), ("z", 3)] {
        let future = send.call(Request { kind, page });
        let log = log.clone();
        tokio::spawn(async move {
            match future.await {
                Ok(status) => log.push(format!("{kind}: {status}")),
                Err(e) => log.push(format!("{kind}: {e}")),
            }
        });
    }

    let flush = send
        .reject_specific(
            predicate(|r: &Request| matches!(r.kind, "x" | "z")),
            "offline".to_string(),
        )
        .unwrap();
    assert_eq!(flush.settled_count(), 2);
    flush.await;

    assert_eq!(log.entries(), vec!["x: offline", "z: offline"]);
    assert_eq!(send.pending_args().len(), 1);
    assert_eq!(send.pending_args()[0].kind, "y");
}

#[tokio::test]
async fn test_resolve_specific_without_match_reports_outstanding_calls() {
    let send: AsyncFn<Request, u32, ()> = AsyncFn::new();
    let _x = send.call(Request { kind: "x", page: 1 });

    let err = send
        .resolve_specific(partial(json!({ "type": "z" })), 1)
        .unwrap_err();

    assert!(err.is_no_matching_call());
    let message = err.to_string();
    assert!(message.contains(r#"contains {"type":"z"}"#));
    assert!(message.contains(r#"Call(0): Request { kind: "x", page: 1 }"#));
    assert_eq!(send.pending_count(), 1);
}

#[tokio::test]
async fn test_rejection_reaches_the_caller() {
    let save: AsyncFn<&'static str, (), String> = AsyncFn::new();
    let log = Log::default();

    let future = save.call("draft");
    let task_log = log.clone();
    tokio::spawn(async move {
        match future.await {
            Ok(()) => task_log.push("saved"),
            Err(e) => task_log.push(format!("failed: {e}")),
        }
    });

    save.reject("disk full".to_string()).unwrap().await;

    assert_eq!(log.entries(), vec!["failed: disk full"]);
}

#[tokio::test]
async fn test_flush_runs_every_chained_step() {
    let load: AsyncFn<(), u32, ()> = AsyncFn::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let steps_in_task = Arc::clone(&steps);

    let future = load.call(());
    tokio::spawn(async move {
        let value = future.await.unwrap_or_default();
        steps_in_task.fetch_add(1, Ordering::SeqCst);
        let value = ready(value + 1).await;
        steps_in_task.fetch_add(1, Ordering::SeqCst);
        let _ = ready(value + 1).await;
        steps_in_task.fetch_add(1, Ordering::SeqCst);
    });

    load.resolve(1).unwrap().await;

    assert_eq!(steps.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unsettled_inner_step_blocks_later_steps() {
    let load: AsyncFn<(), u32, ()> = AsyncFn::new();
    let log = Log::default();

    let future = load.call(());
    let task_log = log.clone();
    tokio::spawn(async move {
        let _ = future.await;
        task_log.push("first step");
        pending::<()>().await;
        task_log.push("second step");
    });

    load.resolve(1).unwrap().await;
    flush_pending().await;

    assert_eq!(log.entries(), vec!["first step"]);
}

#[tokio::test]
async fn test_continuation_waiting_on_another_mock() {
    let ask: AsyncFn<&'static str, bool, ()> = AsyncFn::new();
    let tell: AsyncFn<String, (), ()> = AsyncFn::new();

    let ask_fn = ask.as_fn();
    let tell_fn = tell.as_fn();
    tokio::spawn(async move {
        if ask_fn("Continue?").await == Ok(true) {
            let _ = tell_fn("continuing".to_string()).await;
        }
    });

    flush_pending().await;
    assert!(ask.was_called_with(&"Continue?"));
    assert!(!tell.was_called());

    ask.resolve(true).unwrap().await;
    assert_eq!(tell.pending_args(), vec!["continuing".to_string()]);
}

#[tokio::test]
async fn test_relayed_result_reaches_second_task() {
    let load: AsyncFn<(), u32, ()> = AsyncFn::new();
    let (relay_tx, relay_rx) = futures::channel::oneshot::channel();
    let done = Arc::new(AtomicBool::new(false));
    let done_in_task = Arc::clone(&done);

    let future = load.call(());
    tokio::spawn(async move {
        let _ = relay_tx.send(future.await);
    });
    tokio::spawn(async move {
        if relay_rx.await.is_ok() {
            done_in_task.store(true, Ordering::SeqCst);
        }
    });

    load.resolve(5).unwrap().await;

    assert!(done.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_fixed_behaviour_is_rejected() {
    let err = AsyncFn::<u32, u32, ()>::builder()
        .implementation(|n: u32| n + 1)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::MockImplementation("implementation")));

    let load: AsyncFn<u32, u32, ()> = AsyncFn::new();
    assert!(load.mock_return_value(1).is_err());
    assert!(load.mock_return_value_once(1).is_err());
    assert!(load.mock_implementation(|n: u32| n).is_err());
    assert!(load.mock_implementation_once(|n: u32| n).is_err());
}

#[tokio::test]
async fn test_history_outlives_settlement() {
    let load: AsyncFn<u32, u32, ()> = AsyncFn::builder().name("load").build().unwrap();
    let _a = load.call(1);
    let _b = load.call(2);

    load.resolve(10).unwrap().await;
    load.resolve(20).unwrap().await;

    assert_eq!(load.name(), "load");
    assert!(load.was_called_times(2));
    assert_eq!(load.history().count_matching(&satisfies(|n: &u32| *n > 1, "above one")), 1);
    assert_eq!(load.calls().iter().map(|c| c.args).collect::<Vec<_>>(), vec![1, 2]);
}

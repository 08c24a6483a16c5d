//! Drain loop tests: termination, batching and fail-fast behavior.

mod support;

use mfe_queue::QueueError;
use mfe_worker::{
    escalate, run_to_completion, DrainSummary, Drainer, Escalation, WorkerError, WorkerExit,
};
use support::{malformed_message, message, messages, success_calls, Call, CallLog, FakeNotifier, Faults, Harness, DONE, FAILED};

#[tokio::test]
async fn test_empty_queue_exits_after_one_fetch() {
    let harness = Harness::new(vec![], vec![0], Faults::default());

    let exit = run_to_completion(&harness.ctx).await;

    assert_eq!(exit, WorkerExit::Drained);
    assert_eq!(exit.code(), 0);
    assert_eq!(harness.calls(), vec![Call::Fetch, Call::Depth]);
}

#[tokio::test]
async fn test_nonzero_depth_triggers_refetch() {
    let harness = Harness::new(vec![vec![], vec![message(1)]], vec![2, 0], Faults::default());

    let summary = Drainer::new(&harness.ctx).run().await.expect("drains");

    let mut expected = vec![Call::Fetch, Call::Depth, Call::Fetch];
    expected.extend(success_calls(1));
    expected.extend([Call::Fetch, Call::Depth]);
    assert_eq!(harness.calls(), expected);

    assert_eq!(
        summary,
        DrainSummary {
            fetches: 3,
            jobs_processed: 1,
            retries: 1,
        }
    );
}

#[tokio::test]
async fn test_invisible_messages_keep_the_worker_polling() {
    let harness = Harness::new(vec![], vec![1, 1, 0], Faults::default());

    let summary = Drainer::new(&harness.ctx).run().await.expect("drains");

    assert_eq!(summary.fetches, 3);
    assert_eq!(summary.retries, 2);
    assert_eq!(harness.count(|c| *c == Call::Depth), 3);
}

#[tokio::test]
async fn test_every_job_across_batches_processed_once() {
    let batches = vec![messages(1..=10), messages(11..=20), messages(21..=25)];
    let harness = Harness::new(batches, vec![0], Faults::default());

    let exit = run_to_completion(&harness.ctx).await;

    assert_eq!(exit, WorkerExit::Drained);

    let expected: Vec<String> = (1..=25).map(|n| format!("m{}", n)).collect();
    assert_eq!(harness.notifications(DONE), expected);

    let deleted: Vec<Call> = harness
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::DeleteJob(_)))
        .collect();
    let expected_deletes: Vec<Call> = (1..=25).map(|n| Call::DeleteJob(format!("h{}", n))).collect();
    assert_eq!(deleted, expected_deletes);

    // Three full fetches plus the final empty one.
    assert_eq!(harness.count(|c| *c == Call::Fetch), 4);
    assert_eq!(harness.count(|c| *c == Call::Depth), 1);
}

#[tokio::test]
async fn test_failure_stops_remaining_jobs() {
    let faults = Faults {
        download: Some("v3".to_string()),
        ..Default::default()
    };
    let harness = Harness::new(vec![messages(1..=5), messages(6..=7)], vec![0], faults);

    let exit = run_to_completion(&harness.ctx).await;

    assert_eq!(exit, WorkerExit::Failed);
    assert_eq!(
        harness.notifications(DONE),
        vec!["m1".to_string(), "m2".to_string()]
    );
    assert_eq!(harness.notifications(FAILED), vec!["m3".to_string()]);

    let touched_later = harness.count(|c| match c {
        Call::UpdateMetadata { moment_id, .. } => {
            ["m4", "m5", "m6", "m7"].contains(&moment_id.as_str())
        }
        _ => false,
    });
    assert_eq!(touched_later, 0);
    assert_eq!(harness.count(|c| *c == Call::Fetch), 1);
}

#[tokio::test]
async fn test_malformed_message_is_removed_after_earlier_jobs() {
    let batch = vec![message(1), malformed_message("h-bad"), message(3)];
    let harness = Harness::new(vec![batch], vec![0], Faults::default());

    let exit = run_to_completion(&harness.ctx).await;

    assert_eq!(exit, WorkerExit::Failed);

    let mut expected = vec![Call::Fetch];
    expected.extend(success_calls(1));
    expected.extend([
        Call::DeleteJob("h-bad".to_string()),
        Call::Notify {
            topic: FAILED.to_string(),
            message: String::new(),
        },
    ]);
    assert_eq!(harness.calls(), expected);
}

#[tokio::test]
async fn test_malformed_message_escalates_as_queue_error() {
    let harness = Harness::new(vec![vec![malformed_message("h-bad")]], vec![0], Faults::default());

    let escalation = Drainer::new(&harness.ctx)
        .run()
        .await
        .expect_err("malformed body fails the run");

    assert!(escalation.moment_id.is_none());
    assert!(matches!(
        escalation.error,
        WorkerError::Queue(QueueError::MalformedMessage { .. })
    ));
    assert_eq!(harness.count(|c| *c == Call::DeleteJob("h-bad".to_string())), 1);
}

#[tokio::test]
async fn test_fetch_failure_escalates_without_moment() {
    let faults = Faults {
        fetch: true,
        ..Default::default()
    };
    let harness = Harness::new(vec![], vec![], faults);

    let exit = run_to_completion(&harness.ctx).await;

    assert_eq!(exit, WorkerExit::Failed);
    assert_eq!(harness.notifications(FAILED), vec![String::new()]);
    assert_eq!(harness.count(|c| *c == Call::Depth), 0);
}

#[tokio::test]
async fn test_depth_failure_escalates() {
    let faults = Faults {
        depth: true,
        ..Default::default()
    };
    let harness = Harness::new(vec![], vec![], faults);

    let escalation = Drainer::new(&harness.ctx)
        .run()
        .await
        .expect_err("depth lookup fails");

    assert!(escalation.moment_id.is_none());
    assert!(escalation.step.is_none());
    assert!(matches!(
        escalation.error,
        WorkerError::Queue(QueueError::AttributesFailed(_))
    ));
}

#[tokio::test]
async fn test_startup_escalation_sends_empty_message() {
    let log: CallLog = Default::default();
    let notifier = FakeNotifier::new(log.clone(), Faults::default());
    let escalation = Escalation::without_job(WorkerError::config_error("creds.json missing"));

    let exit = escalate(&notifier, FAILED, &escalation).await;

    assert_eq!(exit, WorkerExit::Failed);
    assert_eq!(
        log.lock().unwrap().clone(),
        vec![Call::Notify {
            topic: FAILED.to_string(),
            message: String::new(),
        }]
    );
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use oj_core::FakeClock;
use oj_storage::JobStore;

use super::*;
use crate::rule::{CronRule, HeartbeatRule, SessionTarget, Target, WakeMode, WebhookRule};

fn target() -> Target {
    Target {
        kind: "slack".to_string(),
        chat_id: "C1".to_string(),
        thread_id: None,
        requester_id: "U1".to_string(),
        session_key: "S1".to_string(),
        requires_approval: false,
        metadata: HashMap::new(),
    }
}

struct RecordingSink {
    saved: StdMutex<Vec<ProactiveConfig>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self { saved: StdMutex::new(Vec::new()) }
    }
}

impl ConfigSink for RecordingSink {
    fn persist(&self, config: &ProactiveConfig) -> std::io::Result<()> {
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

fn harness(config: ProactiveConfig) -> (ProactiveRuntime<FakeClock>, Arc<JobStore<FakeClock>>, FakeClock) {
    let clock = FakeClock::new();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JobStore::load(dir.path().join("state.json"), clock.clone()));
    let sink = Arc::new(RecordingSink::new());
    let runtime = ProactiveRuntime::new(config, store.clone(), clock.clone(), sink);
    (runtime, store, clock)
}

#[test]
fn heartbeat_enqueues_once_and_dedupes_while_active() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 300,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    runtime.tick();
    assert_eq!(store.job_count(), 1);

    runtime.tick();
    assert_eq!(store.job_count(), 1, "second tick before interval elapses should not enqueue again");
}

#[test]
fn heartbeat_waits_for_interval_before_firing_again() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 60,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, clock) = harness(config);

    runtime.tick();
    let job = store.get_job(&store.list_proactive_runs(None, 1)[0].id).unwrap();
    store.complete_job(&job.id, Some("done".to_string())).unwrap();

    clock.advance(Duration::from_secs(30));
    runtime.tick();
    assert_eq!(store.job_count(), 1, "interval has not elapsed yet");

    clock.advance(Duration::from_secs(31));
    runtime.tick();
    assert_eq!(store.job_count(), 2, "interval elapsed, should fire again");
}

#[test]
fn cron_fires_at_most_once_per_matching_minute() {
    let mut config = ProactiveConfig::default();
    config.cron_rules.push(CronRule {
        id: "c1".to_string(),
        cron: Some("*/1 * * * *".to_string()),
        at: None,
        every_seconds: None,
        timezone: None,
        session_target: SessionTarget::Isolated,
        wake_mode: WakeMode::Now,
        prompt: "tick".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    runtime.tick();
    runtime.tick();
    runtime.tick();
    assert_eq!(store.job_count(), 1, "same minute should not refire");
}

#[test]
fn cron_with_next_heartbeat_wake_mode_defers_until_a_heartbeat_fires() {
    let mut config = ProactiveConfig::default();
    config.cron_rules.push(CronRule {
        id: "c1".to_string(),
        cron: Some("*/1 * * * *".to_string()),
        at: None,
        every_seconds: None,
        timezone: None,
        session_target: SessionTarget::Main,
        wake_mode: WakeMode::NextHeartbeat,
        prompt: "digest".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    runtime.tick();
    assert_eq!(store.job_count(), 0, "cron matched but no heartbeat fired yet, so it should wait");
}

#[test]
fn cron_with_next_heartbeat_wake_mode_fires_once_a_heartbeat_runs_same_tick() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 300,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    config.cron_rules.push(CronRule {
        id: "c1".to_string(),
        cron: Some("*/1 * * * *".to_string()),
        at: None,
        every_seconds: None,
        timezone: None,
        session_target: SessionTarget::Main,
        wake_mode: WakeMode::NextHeartbeat,
        prompt: "digest".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    runtime.tick();
    assert_eq!(store.job_count(), 2, "heartbeat fired this tick, so the pending cron wake should resolve too");
}

#[test]
fn webhook_with_wrong_secret_is_rejected() {
    let mut config = ProactiveConfig::default();
    config.webhooks.push(WebhookRule {
        id: "w1".to_string(),
        secret: "0123456789abcdef".to_string(),
        prompt: "incoming".to_string(),
        include_payload_in_prompt: false,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    let result = runtime.handle_webhook("w1", Some("wrong-secret-value"), &serde_json::json!({}));
    assert!(result.is_err());
    assert_eq!(store.job_count(), 0);
}

#[test]
fn webhook_with_missing_secret_header_is_rejected() {
    let mut config = ProactiveConfig::default();
    config.webhooks.push(WebhookRule {
        id: "w1".to_string(),
        secret: "0123456789abcdef".to_string(),
        prompt: "incoming".to_string(),
        include_payload_in_prompt: false,
        target: target(),
    });
    let (runtime, _store, _clock) = harness(config);

    let result = runtime.handle_webhook("w1", None, &serde_json::json!({}));
    assert!(result.is_err());
}

#[test]
fn webhook_with_correct_secret_enqueues_and_tags_delivery_none() {
    let mut config = ProactiveConfig::default();
    config.webhooks.push(WebhookRule {
        id: "w1".to_string(),
        secret: "0123456789abcdef".to_string(),
        prompt: "incoming".to_string(),
        include_payload_in_prompt: true,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    let outcome = runtime.handle_webhook("w1", Some("0123456789abcdef"), &serde_json::json!({"hello": "world"})).unwrap();
    assert_eq!(outcome.status, EnqueueStatus::Enqueued);
    let job = store.get_job(&outcome.job_id.unwrap()).unwrap();
    assert_eq!(job.metadata.get("proactiveDeliveryMode").map(String::as_str), Some("none"));
    assert!(job.prompt.contains("hello"));
}

#[test]
fn unknown_webhook_id_is_not_found() {
    let (runtime, _store, _clock) = harness(ProactiveConfig::default());
    let result = runtime.handle_webhook("missing", Some("anything"), &serde_json::json!({}));
    assert!(result.is_err());
}

#[test]
fn manual_trigger_bypasses_schedule_but_honors_dedupe() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 86_400,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, _clock) = harness(config);

    let first = runtime.trigger_heartbeat_now("hb1").unwrap();
    assert_eq!(first.status, EnqueueStatus::Enqueued);
    assert_eq!(store.job_count(), 1);

    let second = runtime.trigger_heartbeat_now("hb1").unwrap();
    assert_eq!(second.status, EnqueueStatus::DuplicateActiveJob, "an active run should still dedupe a manual retrigger");
}

#[test]
fn manual_trigger_of_unknown_rule_errors() {
    let (runtime, _store, _clock) = harness(ProactiveConfig::default());
    assert!(runtime.trigger_heartbeat_now("nope").is_err());
    assert!(runtime.trigger_cron_now("nope").is_err());
}

#[test]
fn backoff_blocks_retry_immediately_after_a_failure_then_releases_after_delay() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 10,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, clock) = harness(config);

    runtime.tick();
    let job_id = store.list_proactive_runs(None, 1)[0].id;
    store.fail_job(&job_id, "boom".to_string()).unwrap();

    clock.advance(Duration::from_secs(11));
    runtime.tick();
    assert_eq!(store.job_count(), 1, "first backoff delay (30s) has not elapsed");

    clock.advance(Duration::from_secs(30));
    runtime.tick();
    assert_eq!(store.job_count(), 2, "backoff delay elapsed, retry should fire");
}

#[test]
fn successful_run_resets_backoff_streak() {
    let mut config = ProactiveConfig::default();
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 10,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, clock) = harness(config);

    runtime.tick();
    let job_id = store.list_proactive_runs(None, 1)[0].id;
    store.complete_job(&job_id, Some("ok".to_string())).unwrap();

    clock.advance(Duration::from_secs(11));
    runtime.tick();
    assert_eq!(store.job_count(), 2, "a completed run carries no backoff");
}

#[test]
fn cron_at_schedule_fires_once_and_removes_itself() {
    let clock = FakeClock::new();
    let fire_at = clock.now_utc();
    let mut config = ProactiveConfig::default();
    config.cron_rules.push(CronRule {
        id: "once".to_string(),
        cron: None,
        at: Some(fire_at),
        every_seconds: None,
        timezone: None,
        session_target: SessionTarget::Isolated,
        wake_mode: WakeMode::Now,
        prompt: "one shot".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JobStore::load(dir.path().join("state.json"), clock.clone()));
    let sink: Arc<dyn ConfigSink> = Arc::new(RecordingSink::new());
    let runtime = ProactiveRuntime::new(config, store.clone(), clock.clone(), sink);

    runtime.tick();
    assert_eq!(store.job_count(), 1);
    assert!(runtime.config().cron_rules.is_empty(), "one-shot rule should remove itself after firing");

    runtime.tick();
    assert_eq!(store.job_count(), 1, "rule is gone, should not fire twice");
}

#[test]
fn upsert_and_delete_heartbeat_round_trip_through_config() {
    let (runtime, _store, _clock) = harness(ProactiveConfig::default());
    runtime
        .upsert_heartbeat(HeartbeatRule {
            id: "hb1".to_string(),
            every_seconds: 60,
            prompt: "ping".to_string(),
            delivery: DeliveryMode::Announce,
            target: target(),
        })
        .unwrap();
    assert_eq!(runtime.config().heartbeat_rules.len(), 1);

    runtime.delete_heartbeat("hb1").unwrap();
    assert!(runtime.config().heartbeat_rules.is_empty());
}

#[test]
fn upsert_rejects_invalid_rule_without_mutating_config() {
    let (runtime, _store, _clock) = harness(ProactiveConfig::default());
    let result = runtime.upsert_heartbeat(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 0,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    assert!(result.is_err());
    assert!(runtime.config().heartbeat_rules.is_empty());
}

#[test]
fn disabled_runtime_does_nothing_on_tick() {
    let mut config = ProactiveConfig::default();
    config.enabled = false;
    config.heartbeat_rules.push(HeartbeatRule {
        id: "hb1".to_string(),
        every_seconds: 1,
        prompt: "ping".to_string(),
        delivery: DeliveryMode::Announce,
        target: target(),
    });
    let (runtime, store, clock) = harness(config);

    runtime.tick();
    clock.advance(Duration::from_secs(5));
    runtime.tick();
    assert_eq!(store.job_count(), 0);
}

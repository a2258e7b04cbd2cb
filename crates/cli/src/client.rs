// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the control API's gateway-token endpoint class (§6.3):
//! job submission/inspection, admin pause/resume, proactive rule
//! management, and the tool-invocation surface. Mirrors `oj-worker`'s
//! `ControlClient` shape but talks to the gateway routes instead of the
//! worker routes.

use std::collections::HashMap;
use std::time::Duration;

use oj_core::{AdminState, Job, JobEvent, JobId, JobKind};
use oj_proactive::{CronRule, HeartbeatRule, ProactiveConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(20);

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("control API returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobBody {
    pub kind: JobKind,
    pub prompt: String,
    pub channel: String,
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub requester_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    pub requires_approval: bool,
    pub metadata: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct JobBody {
    pub job: Job,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsBody {
    pub events: Vec<JobEvent>,
    pub next_cursor: usize,
    pub total: usize,
}

#[derive(Deserialize)]
pub struct AdminStateBody {
    #[serde(flatten)]
    pub admin: AdminState,
    pub metrics: Value,
    pub job_count: usize,
}

#[derive(Deserialize)]
pub struct ProactiveStateBody {
    pub enabled: bool,
    pub tick_ms: u64,
    pub heartbeat_rule_count: usize,
    pub cron_rule_count: usize,
    pub webhook_count: usize,
}

#[derive(Deserialize)]
pub struct RunsBody {
    pub runs: Vec<Job>,
}

#[derive(Deserialize)]
pub struct PendingDeliveriesBody {
    pub deliveries: Vec<Job>,
}

#[derive(Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

impl Client {
    pub fn new(base_url: String, token: String) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self { http, base_url, token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Api { status, body })
    }

    pub async fn create_job(&self, body: CreateJobBody) -> Result<Job, ClientError> {
        let resp = self.http.post(self.url("/v1/jobs")).bearer_auth(&self.token).json(&body).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json::<JobBody>().await?.job)
    }

    pub async fn get_job(&self, id: &JobId) -> Result<Job, ClientError> {
        let resp =
            self.http.get(self.url(&format!("/v1/jobs/{id}"))).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json::<JobBody>().await?.job)
    }

    pub async fn get_events(&self, id: &JobId, cursor: usize) -> Result<EventsBody, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/v1/jobs/{id}/events")))
            .bearer_auth(&self.token)
            .query(&[("cursor", cursor)])
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn approve_job(&self, id: &JobId) -> Result<Job, ClientError> {
        let resp =
            self.http.post(self.url(&format!("/v1/jobs/{id}/approve"))).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json::<JobBody>().await?.job)
    }

    pub async fn abort_job(&self, id: &JobId) -> Result<Job, ClientError> {
        let resp =
            self.http.post(self.url(&format!("/v1/jobs/{id}/abort"))).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json::<JobBody>().await?.job)
    }

    pub async fn admin_state(&self) -> Result<AdminStateBody, ClientError> {
        let resp = self.http.get(self.url("/v1/admin/state")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn admin_pause(&self, reason: Option<String>) -> Result<AdminState, ClientError> {
        let resp = self
            .http
            .post(self.url("/v1/admin/pause"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "reason": reason }))
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn admin_resume(&self) -> Result<AdminState, ClientError> {
        let resp = self.http.post(self.url("/v1/admin/resume")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn proactive_state(&self) -> Result<ProactiveStateBody, ClientError> {
        let resp = self.http.get(self.url("/v1/proactive/state")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn proactive_config(&self) -> Result<ProactiveConfig, ClientError> {
        let resp = self.http.get(self.url("/v1/proactive/config")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn proactive_runs(&self, trigger_key: Option<&str>, limit: usize) -> Result<RunsBody, ClientError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(key) = trigger_key {
            query.push(("triggerKey", key.to_string()));
        }
        let resp =
            self.http.get(self.url("/v1/proactive/runs")).bearer_auth(&self.token).query(&query).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn upsert_heartbeat_rule(&self, rule: &HeartbeatRule) -> Result<ProactiveConfig, ClientError> {
        let resp = self
            .http
            .post(self.url("/v1/proactive/rules/heartbeat"))
            .bearer_auth(&self.token)
            .json(rule)
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_heartbeat_rule(&self, id: &str) -> Result<ProactiveConfig, ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/v1/proactive/rules/heartbeat/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn upsert_cron_rule(&self, rule: &CronRule) -> Result<ProactiveConfig, ClientError> {
        let resp =
            self.http.post(self.url("/v1/proactive/rules/cron")).bearer_auth(&self.token).json(rule).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_cron_rule(&self, id: &str) -> Result<ProactiveConfig, ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/v1/proactive/rules/cron/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn pending_deliveries(&self) -> Result<PendingDeliveriesBody, ClientError> {
        let resp =
            self.http.get(self.url("/v1/proactive/deliveries/pending")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn ack_delivery(&self, id: &JobId, receipt: Option<String>) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/proactive/deliveries/{id}/ack")))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "receipt": receipt }))
            .send()
            .await?;
        Self::error_for_status(resp).await?;
        Ok(())
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ClientError> {
        let resp = self.http.get(self.url("/v1/tools")).bearer_auth(&self.token).send().await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn invoke_tool(&self, tool: &str, arguments: Value) -> Result<Value, ClientError> {
        let resp = self
            .http
            .post(self.url("/v1/tools/invoke"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "tool": tool, "arguments": arguments }))
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the worker-token endpoint class (§6.3) the claim loop
//! drives: claim, heartbeat, event, and the three terminal-report calls.

use std::time::Duration;

use oj_core::{Job, JobEvent, JobId};
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(20);

pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct ClaimBody<'a> {
    #[serde(rename = "workerId")]
    worker_id: &'a str,
}

#[derive(Deserialize)]
struct ClaimResponse {
    job: Option<Job>,
}

#[derive(Serialize)]
struct PostEventBody<'a> {
    event: &'a JobEvent,
}

#[derive(Deserialize)]
struct HeartbeatBody {
    #[serde(rename = "abortRequested")]
    abort_requested: bool,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct CompleteBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    result_text: Option<String>,
}

#[derive(Serialize)]
struct FailBody<'a> {
    error: &'a str,
}

#[derive(Serialize, Default)]
struct AbortedBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl ControlClient {
    pub fn new(base_url: String, token: String) -> Result<Self, WorkerError> {
        let http = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self { http, base_url, token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response, WorkerError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(WorkerError::Api { status, body })
    }

    pub async fn claim(&self, worker_id: &str) -> Result<Option<Job>, WorkerError> {
        let resp = self
            .http
            .post(self.url("/v1/workers/claim"))
            .bearer_auth(&self.token)
            .json(&ClaimBody { worker_id })
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        let body: ClaimResponse = resp.json().await?;
        Ok(body.job)
    }

    pub async fn post_event(&self, job_id: &JobId, event: &JobEvent) -> Result<(), WorkerError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/workers/{job_id}/events")))
            .bearer_auth(&self.token)
            .json(&PostEventBody { event })
            .send()
            .await?;
        Self::error_for_status(resp).await?;
        Ok(())
    }

    pub async fn heartbeat(&self, job_id: &JobId) -> Result<bool, WorkerError> {
        let resp = self
            .http
            .get(self.url(&format!("/v1/workers/{job_id}/heartbeat")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        let body: HeartbeatBody = resp.json().await?;
        Ok(body.abort_requested)
    }

    pub async fn complete(&self, job_id: &JobId, result_text: Option<String>) -> Result<Job, WorkerError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/workers/{job_id}/complete")))
            .bearer_auth(&self.token)
            .json(&CompleteBody { result_text })
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn fail(&self, job_id: &JobId, error: &str) -> Result<Job, WorkerError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/workers/{job_id}/fail")))
            .bearer_auth(&self.token)
            .json(&FailBody { error })
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn aborted(&self, job_id: &JobId, reason: Option<String>) -> Result<Job, WorkerError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/workers/{job_id}/aborted")))
            .bearer_auth(&self.token)
            .json(&AbortedBody { reason })
            .send()
            .await?;
        let resp = Self::error_for_status(resp).await?;
        Ok(resp.json().await?)
    }
}

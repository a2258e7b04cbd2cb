// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Long-lived agent child processes talked to over line-delimited JSON on
//! stdio: spawn, request/response multiplexing, event fan-out, and a pool
//! keyed by an opaque session key.

mod error;
mod pool;
mod process;
mod session;
mod wire;

pub use error::RpcError;
pub use pool::RpcSessionPool;
pub use process::{sanitize_session_dir_name, session_dir_for, SpawnConfig};
pub use session::{PromptEvent, PromptOutcome, RpcSession};

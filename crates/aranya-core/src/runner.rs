//! Stage Runner: executes one stage under the context's deadline and
//! cancellation token and records a trace of the call.
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::context::ExecutionContext;
use crate::error::HerbError;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub latency_ms: u64,
}

/// Stage output paired with its trace
#[derive(Debug, Clone)]
pub struct Traced<T> {
    pub value: T,
    pub trace: StageTrace,
}

pub async fn run_stage<S: Stage>(
    stage: &S,
    input: &S::Input,
    ctx: &ExecutionContext,
) -> Result<Traced<S::Output>, HerbError> {
    let start = Instant::now();
    let id = stage.id();
    let in_hash = hash_json(input);

    if ctx.cancel.is_cancelled() {
        return Err(HerbError::Cancelled(id.to_string()));
    }

    let guarded = async {
        match ctx.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, stage.run(input, ctx))
                .await
                .map_err(|_| HerbError::Timeout {
                    stage: id.to_string(),
                    limit_ms: limit.as_millis() as u64,
                })?,
            None => stage.run(input, ctx).await,
        }
    };

    let result = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(HerbError::Cancelled(id.to_string())),
        result = guarded => result,
    };

    let latency_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(value) => {
            let trace = StageTrace {
                id: id.to_string(),
                in_hash,
                out_hash: hash_json(&value),
                latency_ms,
            };
            tracing::debug!(stage = id, trace_id = %ctx.trace_id, latency_ms, "stage completed");
            Ok(Traced { value, trace })
        }
        Err(e) => {
            tracing::warn!(stage = id, trace_id = %ctx.trace_id, latency_ms, error = %e, "stage failed");
            Err(e)
        }
    }
}

fn hash_json<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    format!("blake3:{}", blake3::hash(&bytes))
}

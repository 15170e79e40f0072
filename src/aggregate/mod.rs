//! Concurrent fan-out to every upstream target and fan-in of their results.
//!
//! Each target gets its own task and its own timeout. Results land in a slot
//! indexed by the target's position, so completion order never leaks into the
//! output. The first failure ends the join: returning drops the `JoinSet`,
//! which aborts every call still in flight. The same happens when the
//! inbound request is cancelled and the handler future is dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::UpstreamError;
use crate::models::{Greetings, UpstreamMessage, UpstreamResult, UpstreamTarget};
use crate::upstream::Fetch;

/// Call every target concurrently and combine the extracted messages with
/// `merge` once all of them succeeded.
pub async fn aggregate<F, M, T>(
    fetcher: &Arc<F>,
    targets: &[UpstreamTarget],
    per_call_timeout: Duration,
    merge: M,
) -> Result<T, UpstreamError>
where
    F: Fetch,
    M: FnOnce(&[UpstreamTarget], Vec<String>) -> T,
{
    let start = Instant::now();
    let values = fan_out(fetcher, targets, per_call_timeout).await?;

    info!(
        targets = targets.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "All upstream calls succeeded"
    );

    Ok(merge(targets, values))
}

/// Dispatch one call per target and wait until every slot is filled or the
/// first call fails. The returned values are in target order.
pub async fn fan_out<F: Fetch>(
    fetcher: &Arc<F>,
    targets: &[UpstreamTarget],
    per_call_timeout: Duration,
) -> Result<Vec<String>, UpstreamError> {
    let mut calls: JoinSet<(usize, UpstreamResult)> = JoinSet::new();

    for (slot, target) in targets.iter().cloned().enumerate() {
        let fetcher = Arc::clone(fetcher);
        calls.spawn(async move {
            let result = call_one(fetcher.as_ref(), &target, per_call_timeout).await;
            (slot, result)
        });
    }

    let mut slots: Vec<Option<String>> = vec![None; targets.len()];

    while let Some(joined) = calls.join_next().await {
        let (slot, result) = joined.map_err(|e| UpstreamError::Aborted {
            target: pending_names(targets, &slots),
            reason: e.to_string(),
        })?;

        let value = result?;
        debug_assert!(slots[slot].is_none(), "slot {} filled twice", slot);
        slots[slot] = Some(value);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| UpstreamError::Aborted {
            target: "<unknown>".to_string(),
            reason: "join finished with unfilled slots".to_string(),
        })
}

/// Default merge: one field per target, keyed by target name, in target order.
pub fn merge(targets: &[UpstreamTarget], values: Vec<String>) -> Greetings {
    let map: IndexMap<String, String> = targets
        .iter()
        .map(|t| t.name.clone())
        .zip(values)
        .collect();
    Greetings(map)
}

async fn call_one<F: Fetch>(
    fetcher: &F,
    target: &UpstreamTarget,
    limit: Duration,
) -> UpstreamResult {
    let start = Instant::now();

    let body = tokio::time::timeout(limit, fetcher.fetch(target))
        .await
        .map_err(|_| UpstreamError::Timeout {
            target: target.name.clone(),
            after_ms: limit.as_millis(),
        })??;

    let message = UpstreamMessage::extract(&target.name, body)?;
    debug!(
        target = %target.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Upstream call settled"
    );
    Ok(message)
}

fn pending_names(targets: &[UpstreamTarget], slots: &[Option<String>]) -> String {
    targets
        .iter()
        .zip(slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(t, _)| t.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

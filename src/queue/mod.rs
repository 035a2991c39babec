// Work queue — signature blocks waiting to be reclustered.
//
// Blocks are popped lowest score first. A pop waits at most `timeout` for
// work to arrive; an expired wait means the queue is drained, which ends
// the reclustering run instead of polling forever.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::debug;

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Remove and return the lowest-scored block, waiting up to `timeout`.
    /// Returns `None` if nothing arrived in time.
    async fn pop_min(&self, timeout: Duration) -> Result<Option<String>>;
}

/// Outcome of one poll of the work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueuePoll {
    GotBlock(String),
    Drained,
}

/// Poll the queue once.
pub async fn next_block(queue: &dyn WorkQueue, timeout: Duration) -> Result<QueuePoll> {
    Ok(match queue.pop_min(timeout).await? {
        Some(block) => QueuePoll::GotBlock(block),
        None => QueuePoll::Drained,
    })
}

#[derive(Default)]
struct QueueState {
    ordered: BTreeSet<(i64, String)>,
    scores: HashMap<String, i64>,
}

/// In-process sorted-set queue. Pushing a block already queued updates its score.
#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, block: impl Into<String>, score: i64) {
        let block = block.into();
        {
            let mut state = self.state.lock().await;
            if let Some(old) = state.scores.insert(block.clone(), score) {
                state.ordered.remove(&(old, block.clone()));
            }
            state.ordered.insert((score, block));
        }
        self.notify.notify_one();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.ordered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn try_pop(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        let (_, block) = state.ordered.pop_first()?;
        state.scores.remove(&block);
        Some(block)
    }
}

#[async_trait]
impl WorkQueue for InMemoryQueue {
    async fn pop_min(&self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if let Some(block) = self.try_pop().await {
                debug!(block = %block, "Popped block from queue");
                return Ok(Some(block));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pops_lowest_score_first() {
        let queue = InMemoryQueue::new();
        queue.push("b", 2).await;
        queue.push("a", 5).await;
        queue.push("c", 1).await;

        let timeout = Duration::from_millis(10);
        assert_eq!(queue.pop_min(timeout).await.unwrap().as_deref(), Some("c"));
        assert_eq!(queue.pop_min(timeout).await.unwrap().as_deref(), Some("b"));
        assert_eq!(queue.pop_min(timeout).await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_push_updates_score() {
        let queue = InMemoryQueue::new();
        queue.push("a", 1).await;
        queue.push("b", 2).await;
        queue.push("a", 3).await;
        assert_eq!(queue.len().await, 2);

        let timeout = Duration::from_millis(10);
        assert_eq!(queue.pop_min(timeout).await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_empty_queue_reports_drained() {
        let queue = InMemoryQueue::new();
        let poll = next_block(&queue, Duration::from_millis(20)).await.unwrap();
        assert_eq!(poll, QueuePoll::Drained);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let queue = Arc::new(InMemoryQueue::new());
        let producer = Arc::clone(&queue);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.push("late", 0).await;
        });

        let poll = next_block(queue.as_ref(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(poll, QueuePoll::GotBlock("late".to_string()));
    }
}

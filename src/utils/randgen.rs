#![forbid(unsafe_code)]

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::utils::config::{MAX_COUNT, MIN_COUNT};
use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Each draw waits a simulated per-item processing delay in this interval.
const MIN_DELAY_MS   : u64 = 5;
const MAX_DELAY_MS   : u64 = 100;

// Outstanding draw tasks are aborted once the join exceeds this deadline.
const JOIN_TIMEOUT_MS: u64 = 10_000;

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// generate:
// ---------------------------------------------------------------------------
/** Produce count independent uniformly-distributed integers in the
 * inclusive range [from, to].  Every draw runs as its own task behind a
 * simulated variable delay; the call suspends only while waiting for all
 * tasks to finish.  The returned vector is in index order no matter which
 * task completes first.
 *
 * Preconditions are checked synchronously before any task is spawned:
 * count must lie in [MIN_COUNT, MAX_COUNT] and from must not exceed to.
 * A failed or timed-out task fails the whole batch; partial batches are
 * never returned.
 */
pub async fn generate(count: i32, from: i32, to: i32) -> Result<Vec<i32>, Errors> {
    // Fast synchronous validation, no generation work started yet.
    if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
        return Err(Errors::InvalidRange(
            format!("count must be between {} and {}, got {}.", MIN_COUNT, MAX_COUNT, count)));
    }
    if from > to {
        return Err(Errors::InvalidRange(
            format!("from ({}) must not be greater than to ({}).", from, to)));
    }

    // Fan out one task per index.  Each task draws from the thread-local
    // generator of whatever worker runs it, so no generator state is shared.
    let mut tasks: JoinSet<(usize, i32)> = JoinSet::new();
    for i in 0..count as usize {
        tasks.spawn(async move {
            let delay = rand::thread_rng().gen_range(MIN_DELAY_MS..=MAX_DELAY_MS);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            (i, rand::thread_rng().gen_range(from..=to))
        });
    }

    // Join all tasks, landing each value in its pre-sized slot so the
    // output order matches the request order.
    let mut slots = vec![0i32; count as usize];
    let joined = timeout(Duration::from_millis(JOIN_TIMEOUT_MS), async {
        while let Some(next) = tasks.join_next().await {
            match next {
                Ok((i, value)) => slots[i] = value,
                Err(e) => return Err(Errors::InternalFault(
                    format!("random draw task failed: {}", e))),
            }
        }
        Ok(())
    }).await;

    // Dropping the JoinSet on the error paths aborts any stragglers.
    match joined {
        Ok(Ok(())) => Ok(slots),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(Errors::InternalFault(
            format!("random generation timed out after {} ms.", JOIN_TIMEOUT_MS))),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::generate;
    use crate::utils::errors::Errors;

    #[tokio::test]
    async fn batch_has_count_values_in_range() {
        let values = generate(10, 10, 100).await.unwrap();
        assert_eq!(values.len(), 10);
        for v in values {
            assert!((10..=100).contains(&v));
        }
    }

    #[tokio::test]
    async fn single_value_batch() {
        let values = generate(1, 0, i32::MAX).await.unwrap();
        assert_eq!(values.len(), 1);
        assert!(values[0] >= 0);
    }

    #[tokio::test]
    async fn degenerate_range_is_constant() {
        let values = generate(5, 7, 7).await.unwrap();
        assert_eq!(values, vec![7; 5]);
    }

    #[tokio::test]
    async fn count_below_minimum_rejected() {
        match generate(0, 0, 10).await {
            Err(Errors::InvalidRange(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn count_above_maximum_rejected() {
        assert!(matches!(generate(1001, 0, 10).await, Err(Errors::InvalidRange(_))));
    }

    #[tokio::test]
    async fn inverted_range_rejected() {
        assert!(matches!(generate(3, 10, 5).await, Err(Errors::InvalidRange(_))));
    }

    #[tokio::test]
    async fn negative_range_supported() {
        let values = generate(8, -20, -10).await.unwrap();
        for v in values {
            assert!((-20..=-10).contains(&v));
        }
    }

    #[tokio::test]
    async fn batches_are_not_deterministic() {
        // Two draws over the full i32 range colliding on all ten slots is
        // vanishingly unlikely; a repeat means the generator is broken.
        let a = generate(10, 0, i32::MAX).await.unwrap();
        let b = generate(10, 0, i32::MAX).await.unwrap();
        assert_ne!(a, b);
    }
}

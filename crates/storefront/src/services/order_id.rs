//! Order id generation.
//!
//! Candidates are random `YARN-XXXXXXXX` codes checked against the order
//! store before use. The check and the later order write are not atomic:
//! two checkouts could both pass the check for the same candidate before
//! either writes. With 36^8 codes that is accepted rather than locked
//! against; a uniqueness constraint on the store's write path would be the
//! place to close it.
//!
//! Generation never blocks checkout on the backend:
//! - a failed lookup returns the current candidate unchecked
//! - 10 straight collisions fall back to a time/entropy code, also unchecked

use std::future::Future;

use chrono::Utc;
use tracing::{debug, instrument, warn};
use yarn_core::OrderId;

use crate::backend::{BackendError, DocumentStoreClient};

/// Candidates drawn before giving up on the checked path.
pub const MAX_ATTEMPTS: u32 = 10;

/// Answers "is this order id already taken?".
pub trait OrderLookup: Send + Sync {
    /// Error returned when the store cannot be queried.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether an order with `order_id` exists. Implementations should issue
    /// a single query limited to one result.
    fn order_id_exists(
        &self,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

impl OrderLookup for DocumentStoreClient {
    type Error = BackendError;

    async fn order_id_exists(&self, order_id: &OrderId) -> Result<bool, BackendError> {
        self.order_exists(order_id).await
    }
}

/// Generates collision-checked order ids.
#[derive(Clone)]
pub struct OrderIdGenerator<L> {
    lookup: L,
}

impl<L: OrderLookup> OrderIdGenerator<L> {
    /// Create a generator checking candidates against `lookup`.
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// The lookup this generator checks against.
    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Produce an order id. Always returns a format-valid id.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> OrderId {
        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = random_candidate();

            match self.lookup.order_id_exists(&candidate).await {
                Ok(false) => {
                    debug!(order_id = %candidate, attempt, "Order id accepted");
                    return candidate;
                }
                Ok(true) => {
                    debug!(order_id = %candidate, attempt, "Order id collision, retrying");
                }
                Err(e) => {
                    warn!(
                        order_id = %candidate,
                        attempt,
                        error = %e,
                        "Order id lookup failed, using candidate unchecked"
                    );
                    return candidate;
                }
            }
        }

        let fallback = entropy_fallback();
        warn!(
            order_id = %fallback,
            attempts = MAX_ATTEMPTS,
            "Order id retries exhausted, using unchecked entropy fallback"
        );
        fallback
    }
}

/// Draw a random candidate. Kept out of `generate` so the thread-local RNG
/// is never held across an await.
fn random_candidate() -> OrderId {
    OrderId::random(&mut rand::rng())
}

fn entropy_fallback() -> OrderId {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    OrderId::from_entropy(millis, rand::random())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("backend unavailable")]
    struct Unavailable;

    /// Answers from a script and records every candidate it was asked about.
    #[derive(Default)]
    struct ScriptedLookup {
        answers: Mutex<VecDeque<Result<bool, Unavailable>>>,
        asked: Mutex<Vec<OrderId>>,
    }

    impl ScriptedLookup {
        fn new(answers: impl IntoIterator<Item = Result<bool, Unavailable>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                asked: Mutex::default(),
            }
        }

        fn asked(&self) -> Vec<OrderId> {
            self.asked.lock().unwrap().clone()
        }
    }

    impl OrderLookup for ScriptedLookup {
        type Error = Unavailable;

        async fn order_id_exists(&self, order_id: &OrderId) -> Result<bool, Unavailable> {
            self.asked.lock().unwrap().push(order_id.clone());
            // An exhausted script keeps reporting collisions.
            self.answers.lock().unwrap().pop_front().unwrap_or(Ok(true))
        }
    }

    #[tokio::test]
    async fn test_first_candidate_free() {
        let generator = OrderIdGenerator::new(ScriptedLookup::new([Ok(false)]));
        let id = generator.generate().await;

        let asked = generator.lookup().asked();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked.first(), Some(&id));
        assert!(OrderId::is_valid(id.as_str()));
    }

    #[tokio::test]
    async fn test_collision_then_free_returns_second() {
        let generator = OrderIdGenerator::new(ScriptedLookup::new([Ok(true), Ok(false)]));
        let id = generator.generate().await;

        let asked = generator.lookup().asked();
        assert_eq!(asked.len(), 2);
        assert_eq!(asked.get(1), Some(&id));
    }

    #[tokio::test]
    async fn test_lookup_failure_returns_candidate_unchecked() {
        let generator = OrderIdGenerator::new(ScriptedLookup::new([Err(Unavailable)]));
        let id = generator.generate().await;

        let asked = generator.lookup().asked();
        assert_eq!(asked.len(), 1, "failed lookup must not be retried");
        assert_eq!(asked.first(), Some(&id));
        assert!(OrderId::is_valid(id.as_str()));
    }

    #[tokio::test]
    async fn test_failure_after_collision_returns_current_candidate() {
        let generator =
            OrderIdGenerator::new(ScriptedLookup::new([Ok(true), Err(Unavailable)]));
        let id = generator.generate().await;

        let asked = generator.lookup().asked();
        assert_eq!(asked.len(), 2);
        assert_eq!(asked.get(1), Some(&id));
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back() {
        let generator = OrderIdGenerator::new(ScriptedLookup::new([]));
        let id = generator.generate().await;

        let asked = generator.lookup().asked();
        assert_eq!(asked.len(), MAX_ATTEMPTS as usize);
        assert!(OrderId::is_valid(id.as_str()));
    }

    #[test]
    fn test_entropy_fallback_is_valid() {
        for _ in 0..100 {
            assert!(OrderId::is_valid(entropy_fallback().as_str()));
        }
    }
}

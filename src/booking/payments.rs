use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::domain::PaymentReference;

/// Handle returned by the processor when an intent is created. The client
/// secret goes back to the client application to complete the charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub reference: PaymentReference,
    pub client_secret: String,
}

/// Boundary to the external payment processor. Implementations own their
/// transport and must bound each call with the configured dependency timeout.
pub trait PaymentGateway: Send + Sync {
    fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: BTreeMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Payment-processor failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,
    #[error("payment amount {amount_minor} is below the {minimum_minor} minor-unit minimum")]
    BelowMinimumCharge { amount_minor: i64, minimum_minor: i64 },
    #[error("payment processor rejected the charge: {0}")]
    Rejected(String),
    #[error("payment processor unreachable: {0}")]
    Unreachable(String),
}

impl PaymentError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PaymentError::Unreachable(_))
    }
}

/// Run an external call under a time budget, retrying exactly once after
/// `backoff` when the first attempt fails transiently. The retry is skipped
/// when the budget cannot accommodate the backoff, so a slow first attempt
/// surfaces its error instead of doubling the stall. Exhaustion surfaces the
/// last error.
pub(crate) fn retry_once<T, E>(
    budget: Duration,
    backoff: Duration,
    is_transient: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let started = Instant::now();
    match op() {
        Ok(value) => Ok(value),
        Err(err) if is_transient(&err) && started.elapsed() + backoff < budget => {
            thread::sleep(backoff);
            op()
        }
        Err(err) => Err(err),
    }
}

/// Offline gateway that fabricates intent references locally. Used by the
/// demo binary and tests; a Stripe-backed implementation plugs in behind the
/// same trait in deployment.
#[derive(Default)]
pub struct SandboxGateway {
    sequence: AtomicU64,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentGateway for SandboxGateway {
    fn create_intent(
        &self,
        amount_minor: i64,
        _currency: &str,
        _metadata: BTreeMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount_minor <= 0 {
            return Err(PaymentError::NonPositiveAmount);
        }
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(PaymentIntent {
            reference: PaymentReference(format!("pi_sandbox_{id:08}")),
            client_secret: format!("pi_sandbox_{id:08}_secret"),
        })
    }
}

//! Delete legacy-shaped workloads and wait until they are really gone.
//!
//! Each attempt lists the kind in one namespace, deletes every object the
//! selector matches and re-reads them. The attempt converges once none of
//! them can be read back. Otherwise the loop sleeps with exponential backoff
//! and tries again until the policy's step budget runs out.

use crate::cancel::{cancellable, sleep};
use crate::error::{ErrorList, MigrationError, StepError};
use hwp_config::BackoffSettings;
use hwp_core::{DynamicObject, Kind, ObjectKey};
use hwp_store::ObjectStore;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Exponential backoff with multiplicative jitter.
///
/// `steps` is the number of attempts, so a policy sleeps `steps - 1` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub factor: f64,
    pub jitter: f64,
    pub steps: u32,
    pub cap: Duration,
}

impl BackoffPolicy {
    /// Deployments evict quickly: 5s, 10s, 20s, then give up.
    pub const DEPLOYMENT: BackoffPolicy = BackoffPolicy {
        initial: Duration::from_secs(5),
        factor: 2.0,
        jitter: 0.1,
        steps: 4,
        cap: Duration::from_secs(60),
    };

    /// Stateful pods terminate in order and take longer.
    pub const STATEFUL_SET: BackoffPolicy = BackoffPolicy {
        initial: Duration::from_secs(10),
        factor: 2.0,
        jitter: 0.1,
        steps: 6,
        cap: Duration::from_secs(120),
    };

    pub fn for_kind(kind: &Kind) -> Self {
        match kind {
            Kind::StatefulSet => Self::STATEFUL_SET,
            _ => Self::DEPLOYMENT,
        }
    }

    /// Replace the fields set in `settings`.
    pub fn with_overrides(mut self, settings: &BackoffSettings) -> Self {
        if let Some(ms) = settings.initial_ms {
            self.initial = Duration::from_millis(ms);
        }
        if let Some(factor) = settings.factor {
            self.factor = factor;
        }
        if let Some(jitter) = settings.jitter {
            self.jitter = jitter;
        }
        if let Some(steps) = settings.steps {
            self.steps = steps;
        }
        if let Some(ms) = settings.cap_ms {
            self.cap = Duration::from_millis(ms);
        }
        self
    }

    /// Delay after the `retry`-th failed attempt (zero based). `sample` is a
    /// uniform value in `[0, 1)` scaling the jitter.
    pub fn delay(&self, retry: u32, sample: f64) -> Duration {
        let scaled = self.initial.as_secs_f64() * self.factor.powi(retry.min(i32::MAX as u32) as i32);
        let base = Duration::try_from_secs_f64(scaled)
            .unwrap_or(self.cap)
            .min(self.cap);
        if self.jitter > 0.0 {
            base + base.mul_f64(self.jitter * sample.clamp(0.0, 1.0))
        } else {
            base
        }
    }

    fn next_delay(&self, retry: u32) -> Duration {
        self.delay(retry, fastrand::f64())
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::DEPLOYMENT
    }
}

/// Matches workloads whose `spec.selector.matchLabels` lacks `label_key`,
/// the shape they had before the label was introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySelector {
    pub label_key: String,
}

impl LegacySelector {
    pub fn new(label_key: impl Into<String>) -> Self {
        Self {
            label_key: label_key.into(),
        }
    }

    pub fn matches(&self, object: &DynamicObject) -> bool {
        object
            .field(&["spec", "selector", "matchLabels"])
            .and_then(|labels| labels.as_object())
            .is_none_or(|labels| !labels.contains_key(&self.label_key))
    }
}

/// Result of one delete-then-poll pass.
enum Attempt {
    Converged,
    Pending(usize),
    ListFailed(StepError),
}

struct Converger<'a> {
    store: &'a dyn ObjectStore,
    kind: &'a Kind,
    namespace: &'a str,
    selector: &'a LegacySelector,
    /// Latest failure per object, in order of first failure.
    errors: Vec<(ObjectKey, StepError)>,
}

impl Converger<'_> {
    fn record(&mut self, key: &ObjectKey, error: StepError) {
        match self.errors.iter_mut().find(|(seen, _)| seen == key) {
            Some(entry) => entry.1 = error,
            None => self.errors.push((key.clone(), error)),
        }
    }

    fn into_errors(self) -> ErrorList {
        let mut errors = ErrorList::new();
        for (_, error) in self.errors {
            errors.push(error);
        }
        errors
    }

    async fn attempt(&mut self) -> Attempt {
        let objects = match self.store.list(self.kind, Some(self.namespace)).await {
            Ok(objects) => objects,
            Err(source) => {
                debug!(
                    kind = %self.kind,
                    namespace = self.namespace,
                    error = %source,
                    category = %source.category(),
                    "Listing legacy workloads failed, retrying"
                );
                return Attempt::ListFailed(StepError::List {
                    kind: self.kind.clone(),
                    namespace: Some(self.namespace.to_string()),
                    source,
                });
            }
        };

        let keys: Vec<ObjectKey> = objects
            .iter()
            .filter(|object| self.selector.matches(object))
            .map(DynamicObject::key)
            .collect();
        if keys.is_empty() {
            return Attempt::Converged;
        }

        for key in &keys {
            match self.store.delete(key).await {
                Ok(()) => debug!(key = %key, "Deleted legacy workload"),
                Err(e) if e.is_not_found() => {}
                Err(source) => self.record(
                    key,
                    StepError::Delete {
                        key: key.clone(),
                        source,
                    },
                ),
            }
        }

        let mut pending = 0;
        for key in &keys {
            match self
                .store
                .get(&key.kind, key.namespace.as_deref(), &key.name)
                .await
            {
                Ok(None) => {}
                Err(e) if e.is_not_found() => {}
                Ok(Some(_)) => pending += 1,
                Err(source) => {
                    pending += 1;
                    self.record(
                        key,
                        StepError::Poll {
                            key: key.clone(),
                            source,
                        },
                    );
                }
            }
        }

        if pending == 0 {
            Attempt::Converged
        } else {
            Attempt::Pending(pending)
        }
    }
}

/// Delete every `kind` object in `namespace` that `selector` matches and
/// wait until all of them are gone.
///
/// Per-item failures met on the way are returned even on success, one per
/// object (the latest). Running out of attempts is a
/// [`MigrationError::Timeout`] carrying them instead.
pub async fn converge(
    store: &dyn ObjectStore,
    kind: &Kind,
    namespace: &str,
    selector: &LegacySelector,
    policy: &BackoffPolicy,
    cancel: &CancellationToken,
) -> Result<ErrorList, MigrationError> {
    let mut converger = Converger {
        store,
        kind,
        namespace,
        selector,
        errors: Vec::new(),
    };
    let steps = policy.steps.max(1);
    let mut last_list_error = None;

    for attempt in 1..=steps {
        match cancellable(cancel, converger.attempt()).await? {
            Attempt::Converged => {
                info!(kind = %kind, namespace, attempt, "Legacy workloads deleted");
                return Ok(converger.into_errors());
            }
            Attempt::Pending(remaining) => {
                debug!(kind = %kind, namespace, attempt, remaining, "Legacy workloads still present");
            }
            Attempt::ListFailed(e) => last_list_error = Some(e),
        }

        if attempt < steps {
            let delay = policy.next_delay(attempt - 1);
            debug!(kind = %kind, namespace, attempt, delay_ms = delay.as_millis() as u64, "Backing off");
            sleep(cancel, delay).await?;
        }
    }

    let mut errors = converger.into_errors();
    if let Some(e) = last_list_error {
        errors.push(e);
    }
    warn!(kind = %kind, namespace, attempts = steps, "Gave up waiting for legacy workloads");
    Err(MigrationError::Timeout {
        kind: kind.clone(),
        namespace: namespace.to_string(),
        attempts: steps,
        errors,
    })
}

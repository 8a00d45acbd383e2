//! Counter registry.
//!
//! Counters are keyed by name plus a label set. Label sets are flattened into
//! key-sorted vectors so the same labels given in any order identify the same
//! counter. Registration order is kept for deterministic exposition output.
//!
//! `CounterHandle::add` goes straight to the counter's `AtomicU64` and never
//! touches the registry lock. `Registry::increment` and `snapshot` take the
//! lock shared, so only registration ever waits on it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{HitcountError, Result};

/// Flattened label set, sorted by key.
pub type Labels = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MetricKey {
    name: String,
    labels: Labels,
}

#[derive(Debug)]
struct CounterCell {
    key: MetricKey,
    value: AtomicU64,
}

impl CounterCell {
    fn add(&self, delta: i64) -> Result<()> {
        if delta <= 0 {
            return Err(HitcountError::InvalidDelta(delta));
        }
        let delta = delta as u64;
        // CAS loop so a failed (overflowing) add leaves the value untouched.
        self.value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_add(delta))
            .map(|_| ())
            .map_err(|_| HitcountError::CounterOverflow(self.key.name.clone()))
    }
}

/// Cheap, cloneable handle to one registered counter.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    cell: Arc<CounterCell>,
}

impl CounterHandle {
    /// Increment by 1.
    pub fn inc(&self) -> Result<()> {
        self.cell.add(1)
    }

    /// Increment by `delta`. Fails with `InvalidDelta` when `delta <= 0`.
    pub fn add(&self, delta: i64) -> Result<()> {
        self.cell.add(delta)
    }

    /// Current value.
    pub fn value(&self) -> u64 {
        self.cell.value.load(Ordering::Relaxed)
    }

    /// Metric name as registered.
    pub fn name(&self) -> &str {
        &self.cell.key.name
    }

    /// Label set, sorted by key.
    pub fn labels(&self) -> &[(String, String)] {
        &self.cell.key.labels
    }
}

/// One `(name, labels, value)` entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    pub value: u64,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }
}

#[derive(Default)]
struct RegistryInner {
    index: HashMap<MetricKey, usize>,
    cells: Vec<Arc<CounterCell>>,
}

/// Registration-ordered set of counters.
///
/// One instance per process, shared behind an `Arc`. The first `snapshot`
/// seals the registry; registering afterwards fails with `LateRegistration`.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
    sealed: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unlabelled counter starting at 0.
    pub fn register(&self, name: &str) -> Result<CounterHandle> {
        self.register_with_labels(name, &[])
    }

    /// Register a counter with a fixed label set.
    pub fn register_with_labels(
        &self,
        name: &str,
        labels: &[(&str, &str)],
    ) -> Result<CounterHandle> {
        let mut flat: Labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        flat.sort();
        if let Some(w) = flat.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(HitcountError::DuplicateLabel {
                name: name.to_string(),
                key: w[0].0.clone(),
            });
        }
        let key = MetricKey {
            name: name.to_string(),
            labels: flat,
        };

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if self.sealed.load(Ordering::Acquire) {
            tracing::warn!(metric = %name, "registration rejected, registry sealed");
            return Err(HitcountError::LateRegistration(name.to_string()));
        }
        if inner.index.contains_key(&key) {
            return Err(HitcountError::DuplicateMetric(name.to_string()));
        }

        let cell = Arc::new(CounterCell {
            key: key.clone(),
            value: AtomicU64::new(0),
        });
        inner.cells.push(Arc::clone(&cell));
        let pos = inner.cells.len() - 1;
        inner.index.insert(key, pos);

        tracing::debug!(metric = %name, labels = labels.len(), "counter registered");
        Ok(CounterHandle { cell })
    }

    /// Increment `handle` by `delta`. Same contract as [`CounterHandle::add`],
    /// plus `UnknownMetric` when the handle came from another registry.
    pub fn increment(&self, handle: &CounterHandle, delta: i64) -> Result<()> {
        let owned = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            inner
                .index
                .get(&handle.cell.key)
                .and_then(|&pos| inner.cells.get(pos))
                .is_some_and(|c| Arc::ptr_eq(c, &handle.cell))
        };
        if !owned {
            return Err(HitcountError::UnknownMetric(handle.name().to_string()));
        }
        handle.add(delta)
    }

    /// Reject any further registration.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cells
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current value of every counter, in registration order. Seals the registry.
    ///
    /// Each value is read atomically; values of different counters may come
    /// from slightly different instants.
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.seal();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .cells
            .iter()
            .map(|c| MetricSample {
                name: c.key.name.clone(),
                labels: c.key.labels.clone(),
                value: c.value.load(Ordering::Relaxed),
            })
            .collect()
    }
}

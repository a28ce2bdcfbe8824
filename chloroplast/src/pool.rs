//! Shared energy-carrier pools.
//!
//! One [`PoolStore`] is created per session and handed to every screen by
//! clone; all clones observe and mutate the same balances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::gate::{GateRequirement, Refusal};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Errors from applying a delta to a pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The delta would take the balance below zero
    #[error("{pool} would underflow: balance {balance}, delta {delta}")]
    Underflow {
        pool: &'static str,
        balance: u64,
        delta: i64,
    },

    /// The delta would exceed the counter's range
    #[error("{pool} would overflow: balance {balance}, delta {delta}")]
    Overflow {
        pool: &'static str,
        balance: u64,
        delta: i64,
    },
}

/// The two shared energy carriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum PoolId {
    Atp,
    Nadph,
}

impl PoolId {
    pub const ALL: [PoolId; 2] = [PoolId::Atp, PoolId::Nadph];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolId::Atp => "ATP",
            PoolId::Nadph => "NADPH",
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named non-negative counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    name: &'static str,
    value: u64,
}

impl Pool {
    /// A new empty pool.
    pub fn new(name: &'static str) -> Self {
        Self { name, value: 0 }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Compute the balance after `delta` without mutating.
    pub fn checked(&self, delta: i64) -> Result<u64, PoolError> {
        if delta >= 0 {
            self.value.checked_add(delta.unsigned_abs()).ok_or(PoolError::Overflow {
                pool: self.name,
                balance: self.value,
                delta,
            })
        } else {
            self.value.checked_sub(delta.unsigned_abs()).ok_or(PoolError::Underflow {
                pool: self.name,
                balance: self.value,
                delta,
            })
        }
    }

    /// Apply `delta`; the balance is unchanged on error.
    pub fn apply(&mut self, delta: i64) -> Result<u64, PoolError> {
        self.value = self.checked(delta)?;
        Ok(self.value)
    }
}

/// Point-in-time balances of both carriers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PoolSnapshot {
    pub atp: u64,
    pub nadph: u64,
}

impl PoolSnapshot {
    pub fn get(&self, pool: PoolId) -> u64 {
        match pool {
            PoolId::Atp => self.atp,
            PoolId::Nadph => self.nadph,
        }
    }
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATP pool: {}  NADPH pool: {}", self.atp, self.nadph)
    }
}

#[derive(Clone)]
struct Balances {
    atp: Pool,
    nadph: Pool,
}

impl Balances {
    fn pool(&self, id: PoolId) -> &Pool {
        match id {
            PoolId::Atp => &self.atp,
            PoolId::Nadph => &self.nadph,
        }
    }

    fn pool_mut(&mut self, id: PoolId) -> &mut Pool {
        match id {
            PoolId::Atp => &mut self.atp,
            PoolId::Nadph => &mut self.nadph,
        }
    }

    fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            atp: self.atp.value(),
            nadph: self.nadph.value(),
        }
    }
}

/// Session-wide store of the carrier pools.
///
/// Cloning yields another handle to the same balances.
#[derive(Clone)]
pub struct PoolStore {
    balances: Arc<RwLock<Balances>>,
    changes: Arc<watch::Sender<PoolSnapshot>>,
}

impl PoolStore {
    /// Both pools start at zero.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(PoolSnapshot::default());
        Self {
            balances: Arc::new(RwLock::new(Balances {
                atp: Pool::new(PoolId::Atp.as_str()),
                nadph: Pool::new(PoolId::Nadph.as_str()),
            })),
            changes: Arc::new(changes),
        }
    }

    /// Current balance of one pool.
    pub async fn get(&self, pool: PoolId) -> u64 {
        self.balances.read().await.pool(pool).value()
    }

    /// Current balances of both pools.
    pub async fn snapshot(&self) -> PoolSnapshot {
        self.balances.read().await.snapshot()
    }

    /// Receive every balance change.
    pub fn subscribe(&self) -> watch::Receiver<PoolSnapshot> {
        self.changes.subscribe()
    }

    /// Apply `delta` to one pool and return the new balance.
    ///
    /// Rejected, with no change, if the result would be negative.
    pub async fn apply(&self, pool: PoolId, delta: i64) -> Result<u64, PoolError> {
        let mut balances = self.balances.write().await;
        match balances.pool_mut(pool).apply(delta) {
            Ok(value) => {
                debug!(pool = %pool, delta, value, "Pool updated");
                self.changes.send_replace(balances.snapshot());
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Pool update rejected");
                Err(e)
            }
        }
    }

    /// Check `requirement` and apply all `deltas` under one lock.
    ///
    /// Either every delta lands or none does.
    pub async fn transact(
        &self,
        requirement: &GateRequirement,
        deltas: &[(PoolId, i64)],
    ) -> Result<PoolSnapshot, Refusal> {
        let mut balances = self.balances.write().await;
        let before = balances.snapshot();

        if let Some(shortfall) = requirement.shortfall(&before) {
            return Err(shortfall);
        }

        // Stage on a copy so a failing delta leaves the live balances untouched.
        let mut staged = (*balances).clone();
        for &(pool, delta) in deltas {
            staged.pool_mut(pool).apply(delta).map_err(Refusal::from)?;
        }
        *balances = staged;

        let after = balances.snapshot();
        if after != before {
            self.changes.send_replace(after);
        }
        Ok(after)
    }
}

impl Default for PoolStore {
    fn default() -> Self {
        Self::new()
    }
}

//! Gated actions: minimum-balance requirements and the debits they guard.

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::pool::{PoolError, PoolId, PoolSnapshot, PoolStore};

/// Why an action did not happen. No state changed in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    /// A resource was below the gate threshold
    #[error("Insufficient {resource}: need {required}, have {available}")]
    Insufficient {
        resource: &'static str,
        required: u64,
        available: u64,
    },

    /// The action belongs to a different stage than the active one
    #[error("{action} is not available during {active}")]
    WrongStage {
        action: &'static str,
        active: &'static str,
    },

    /// A sequencer run is already in flight
    #[error("Sequence already running")]
    AlreadyRunning,

    /// A delta could not be applied
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Minimum balances required before an action may run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequirement {
    minimums: BTreeMap<PoolId, u64>,
}

impl GateRequirement {
    /// A gate that is always open.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require at least `minimum` in `pool`.
    pub fn at_least(mut self, pool: PoolId, minimum: u64) -> Self {
        self.minimums.insert(pool, minimum);
        self
    }

    pub fn minimum(&self, pool: PoolId) -> u64 {
        self.minimums.get(&pool).copied().unwrap_or(0)
    }

    pub fn is_met(&self, balances: &PoolSnapshot) -> bool {
        self.shortfall(balances).is_none()
    }

    /// The first unmet minimum, in pool order.
    pub fn shortfall(&self, balances: &PoolSnapshot) -> Option<Refusal> {
        self.minimums.iter().find_map(|(&pool, &required)| {
            let available = balances.get(pool);
            (available < required).then_some(Refusal::Insufficient {
                resource: pool.as_str(),
                required,
                available,
            })
        })
    }
}

/// A user-triggerable transition guarded by a [`GateRequirement`].
#[derive(Debug, Clone)]
pub struct GatedAction {
    label: &'static str,
    requirement: GateRequirement,
    deltas: Vec<(PoolId, i64)>,
}

impl GatedAction {
    /// An action with no gate and no cost.
    pub fn free(label: &'static str) -> Self {
        Self {
            label,
            requirement: GateRequirement::none(),
            deltas: Vec::new(),
        }
    }

    /// An action gated on, and debiting, exactly `costs`.
    pub fn debiting(label: &'static str, costs: &[(PoolId, u64)]) -> Self {
        let requirement = costs
            .iter()
            .fold(GateRequirement::none(), |gate, &(pool, cost)| gate.at_least(pool, cost));
        Self {
            label,
            requirement,
            deltas: costs
                .iter()
                .map(|&(pool, cost)| (pool, 0i64.saturating_sub_unsigned(cost)))
                .collect(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn requirement(&self) -> &GateRequirement {
        &self.requirement
    }

    /// Debits as positive amounts, for feedback text.
    pub fn costs(&self) -> impl Iterator<Item = (PoolId, u64)> + '_ {
        self.deltas
            .iter()
            .filter(|(_, d)| *d < 0)
            .map(|&(pool, d)| (pool, d.unsigned_abs()))
    }

    /// Evaluated against live balances on every call.
    pub async fn can_perform(&self, pools: &PoolStore) -> bool {
        self.requirement.is_met(&pools.snapshot().await)
    }

    /// Check the gate and apply every delta atomically.
    pub async fn perform(&self, pools: &PoolStore) -> Result<PoolSnapshot, Refusal> {
        match pools.transact(&self.requirement, &self.deltas).await {
            Ok(after) => {
                info!(action = self.label, atp = after.atp, nadph = after.nadph, "Gated action performed");
                Ok(after)
            }
            Err(refusal) => {
                warn!(action = self.label, reason = %refusal, "Gated action refused");
                Err(refusal)
            }
        }
    }

    /// "Consumed 1 ATP, 1 NADPH", or `None` for free actions.
    pub fn cost_summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .costs()
            .map(|(pool, amount)| format!("{} {}", amount, pool))
            .collect();
        (!parts.is_empty()).then(|| format!("Consumed {}", parts.join(", ")))
    }
}

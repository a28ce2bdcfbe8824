//! Calvin-cycle screen.
//!
//! Fixation → Reduction → Regeneration → Fixation, one user action per
//! transition. Reduction and regeneration are paid for from the shared pools.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::CalvinConfig;
use crate::feedback::FeedbackSlot;
use crate::gate::{GatedAction, Refusal};
use crate::pool::{PoolId, PoolStore};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Active stage of the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    #[default]
    Fixation,
    Reduction,
    Regeneration,
}

impl CycleStage {
    /// The only stage reachable from this one.
    pub fn next(&self) -> CycleStage {
        match self {
            CycleStage::Fixation => CycleStage::Reduction,
            CycleStage::Reduction => CycleStage::Regeneration,
            CycleStage::Regeneration => CycleStage::Fixation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStage::Fixation => "fixation",
            CycleStage::Reduction => "reduction",
            CycleStage::Regeneration => "regeneration",
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warning shown while the active stage's gate is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleWarning {
    /// Reduction lacks ATP or NADPH from the light reactions
    LightProductsInsufficient,
    /// Regeneration lacks ATP
    AtpInsufficient,
}

struct CycleState {
    stage: CycleStage,
    /// Sugar output in half-G3P units.
    sugar_halves: u64,
}

/// State of the Calvin-cycle screen.
pub struct CalvinCycle {
    pools: PoolStore,
    state: RwLock<CycleState>,
    fixation: GatedAction,
    reduction: GatedAction,
    regeneration: GatedAction,
    feedback: FeedbackSlot,
}

impl CalvinCycle {
    pub fn new(pools: PoolStore, config: CalvinConfig) -> Self {
        Self {
            pools,
            state: RwLock::new(CycleState {
                stage: CycleStage::Fixation,
                sugar_halves: 0,
            }),
            fixation: GatedAction::free("fixation"),
            reduction: GatedAction::debiting(
                "reduction",
                &[
                    (PoolId::Atp, config.reduction_atp),
                    (PoolId::Nadph, config.reduction_nadph),
                ],
            ),
            regeneration: GatedAction::debiting(
                "regeneration",
                &[(PoolId::Atp, config.regeneration_atp)],
            ),
            feedback: FeedbackSlot::new(config.feedback()),
        }
    }

    fn action(&self, stage: CycleStage) -> &GatedAction {
        match stage {
            CycleStage::Fixation => &self.fixation,
            CycleStage::Reduction => &self.reduction,
            CycleStage::Regeneration => &self.regeneration,
        }
    }

    pub async fn stage(&self) -> CycleStage {
        self.state.read().await.stage
    }

    /// G3P equivalents produced so far.
    pub async fn sugar_produced(&self) -> f64 {
        self.state.read().await.sugar_halves as f64 / 2.0
    }

    /// Whether the gate leaving `stage` is open against current pools.
    ///
    /// Says nothing about whether `stage` is active.
    pub async fn gate_open(&self, stage: CycleStage) -> bool {
        self.action(stage).can_perform(&self.pools).await
    }

    /// Whether the action for `stage` would succeed right now.
    pub async fn can_perform(&self, stage: CycleStage) -> bool {
        self.stage().await == stage && self.gate_open(stage).await
    }

    /// Warning for the active stage, if its gate is closed.
    pub async fn warning(&self) -> Option<CycleWarning> {
        match self.stage().await {
            CycleStage::Fixation => None,
            CycleStage::Reduction => (!self.gate_open(CycleStage::Reduction).await)
                .then_some(CycleWarning::LightProductsInsufficient),
            CycleStage::Regeneration => (!self.gate_open(CycleStage::Regeneration).await)
                .then_some(CycleWarning::AtpInsufficient),
        }
    }

    /// CO₂ + RuBP → 2 × 3-PGA. Always allowed from Fixation.
    pub async fn fixate(&self) -> Result<CycleStage, Refusal> {
        self.leave(CycleStage::Fixation).await
    }

    /// 3-PGA → G3P, paid in ATP and NADPH.
    pub async fn reduce(&self) -> Result<CycleStage, Refusal> {
        self.leave(CycleStage::Reduction).await
    }

    /// G3P → RuBP, paid in ATP.
    pub async fn regenerate(&self) -> Result<CycleStage, Refusal> {
        self.leave(CycleStage::Regeneration).await
    }

    /// Perform whichever action the active stage offers.
    pub async fn advance(&self) -> Result<CycleStage, Refusal> {
        let stage = self.stage().await;
        self.leave(stage).await
    }

    async fn leave(&self, from: CycleStage) -> Result<CycleStage, Refusal> {
        let mut state = self.state.write().await;
        if state.stage != from {
            return Err(Refusal::WrongStage {
                action: from.as_str(),
                active: state.stage.as_str(),
            });
        }

        let action = self.action(from);
        action.perform(&self.pools).await?;

        if from == CycleStage::Reduction {
            state.sugar_halves += 1;
        }
        state.stage = from.next();
        info!(from = %from, to = %state.stage, "Calvin cycle advanced");

        if let Some(summary) = action.cost_summary() {
            self.feedback.show(summary);
        }
        Ok(state.stage)
    }

    /// Transient cost notice.
    pub fn feedback(&self) -> Option<String> {
        self.feedback.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolSnapshot;
    use proptest::prelude::*;

    fn screen() -> (PoolStore, CalvinCycle) {
        let pools = PoolStore::new();
        let calvin = CalvinCycle::new(pools.clone(), CalvinConfig::default());
        (pools, calvin)
    }

    #[tokio::test]
    async fn test_fixation_is_free() {
        let (pools, calvin) = screen();
        assert_eq!(calvin.stage().await, CycleStage::Fixation);
        assert!(calvin.can_perform(CycleStage::Fixation).await);

        assert_eq!(calvin.fixate().await, Ok(CycleStage::Reduction));
        assert_eq!(pools.snapshot().await, PoolSnapshot::default());
        assert!(calvin.feedback().is_none());
    }

    #[tokio::test]
    async fn test_reduction_needs_both_carriers() {
        let (pools, calvin) = screen();
        calvin.fixate().await.unwrap();

        pools.apply(PoolId::Atp, 1).await.unwrap();
        assert_eq!(
            calvin.warning().await,
            Some(CycleWarning::LightProductsInsufficient)
        );
        assert!(matches!(
            calvin.reduce().await,
            Err(Refusal::Insufficient { resource: "NADPH", .. })
        ));
        assert_eq!(calvin.stage().await, CycleStage::Reduction);
        assert_eq!(pools.get(PoolId::Atp).await, 1);

        pools.apply(PoolId::Nadph, 1).await.unwrap();
        assert_eq!(calvin.warning().await, None);
        assert_eq!(calvin.reduce().await, Ok(CycleStage::Regeneration));
        assert_eq!(pools.snapshot().await, PoolSnapshot::default());
        assert_eq!(calvin.sugar_produced().await, 0.5);
        assert_eq!(calvin.feedback().as_deref(), Some("Consumed 1 ATP, 1 NADPH"));
        assert_eq!(calvin.warning().await, Some(CycleWarning::AtpInsufficient));
    }

    #[tokio::test]
    async fn test_actions_out_of_order_are_refused() {
        let (pools, calvin) = screen();
        pools.apply(PoolId::Atp, 5).await.unwrap();
        pools.apply(PoolId::Nadph, 5).await.unwrap();

        assert!(matches!(calvin.reduce().await, Err(Refusal::WrongStage { .. })));
        assert!(matches!(calvin.regenerate().await, Err(Refusal::WrongStage { .. })));
        assert_eq!(calvin.stage().await, CycleStage::Fixation);
        assert_eq!(pools.snapshot().await, PoolSnapshot { atp: 5, nadph: 5 });
    }

    #[tokio::test]
    async fn test_full_turn_returns_to_fixation() {
        let (pools, calvin) = screen();
        pools.apply(PoolId::Atp, 2).await.unwrap();
        pools.apply(PoolId::Nadph, 1).await.unwrap();

        assert_eq!(calvin.advance().await, Ok(CycleStage::Reduction));
        assert_eq!(calvin.advance().await, Ok(CycleStage::Regeneration));
        assert_eq!(calvin.advance().await, Ok(CycleStage::Fixation));
        assert_eq!(pools.snapshot().await, PoolSnapshot::default());
        assert_eq!(calvin.feedback().as_deref(), Some("Consumed 1 ATP"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Fix,
        Reduce,
        Regenerate,
        Advance,
        Credit(PoolId, u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Fix),
            Just(Op::Reduce),
            Just(Op::Regenerate),
            Just(Op::Advance),
            (prop_oneof![Just(PoolId::Atp), Just(PoolId::Nadph)], 0u8..3)
                .prop_map(|(pool, n)| Op::Credit(pool, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_stages_follow_the_cycle(ops in proptest::collection::vec(op(), 0..60)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            runtime.block_on(async {
                let (pools, calvin) = screen();
                for op in ops {
                    let before = calvin.stage().await;
                    let result = match op {
                        Op::Fix => calvin.fixate().await,
                        Op::Reduce => calvin.reduce().await,
                        Op::Regenerate => calvin.regenerate().await,
                        Op::Advance => calvin.advance().await,
                        Op::Credit(pool, n) => {
                            pools.apply(pool, n as i64).await.unwrap();
                            continue;
                        }
                    };
                    let after = calvin.stage().await;
                    match result {
                        Ok(stage) => {
                            prop_assert_eq!(stage, before.next());
                            prop_assert_eq!(after, before.next());
                        }
                        Err(_) => prop_assert_eq!(after, before),
                    }
                }
                Ok(())
            })?;
        }
    }
}

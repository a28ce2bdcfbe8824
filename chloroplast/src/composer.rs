//! ViewComposer - top-level screen selection and pool display.
//!
//! Owns the session's [`PoolStore`] and builds the active screen around a
//! clone of it. Switching screens discards the old screen's local state; the
//! pools persist, and an electron already in transit still lands.

use tokio::sync::watch;
use tracing::info;

use tutor::TutorContext;

use crate::config::LabConfig;
use crate::pool::{PoolSnapshot, PoolStore};
use crate::screens::{
    CalvinCycle, LightReactions, PathwayComparison, PrimaryReaction, ScreenId,
};

/// The screen currently mounted.
pub enum ActiveScreen {
    Overview(PrimaryReaction),
    LightReactions(LightReactions),
    CalvinCycle(CalvinCycle),
    Comparison(PathwayComparison),
}

impl ActiveScreen {
    fn build(id: ScreenId, pools: &PoolStore, config: &LabConfig) -> Self {
        match id {
            ScreenId::Overview => ActiveScreen::Overview(PrimaryReaction::new()),
            ScreenId::LightReactions => ActiveScreen::LightReactions(LightReactions::new(
                pools.clone(),
                config.light.clone(),
            )),
            ScreenId::CalvinCycle => {
                ActiveScreen::CalvinCycle(CalvinCycle::new(pools.clone(), config.calvin.clone()))
            }
            ScreenId::Comparison => ActiveScreen::Comparison(PathwayComparison::new()),
        }
    }

    pub fn id(&self) -> ScreenId {
        match self {
            ActiveScreen::Overview(_) => ScreenId::Overview,
            ActiveScreen::LightReactions(_) => ScreenId::LightReactions,
            ActiveScreen::CalvinCycle(_) => ScreenId::CalvinCycle,
            ActiveScreen::Comparison(_) => ScreenId::Comparison,
        }
    }
}

/// Screen selector, pool holder and tutor-panel toggle.
pub struct ViewComposer {
    config: LabConfig,
    pools: PoolStore,
    active: ActiveScreen,
    chat_visible: bool,
}

impl ViewComposer {
    /// Start on the overview with empty pools and the tutor panel hidden.
    pub fn new(config: LabConfig) -> Self {
        let pools = PoolStore::new();
        let active = ActiveScreen::build(ScreenId::Overview, &pools, &config);
        Self {
            config,
            pools,
            active,
            chat_visible: false,
        }
    }

    pub fn pools(&self) -> &PoolStore {
        &self.pools
    }

    /// Live totals for the header.
    pub async fn totals(&self) -> PoolSnapshot {
        self.pools.snapshot().await
    }

    pub fn watch_totals(&self) -> watch::Receiver<PoolSnapshot> {
        self.pools.subscribe()
    }

    pub fn active(&self) -> ScreenId {
        self.active.id()
    }

    pub fn screen(&self) -> &ActiveScreen {
        &self.active
    }

    pub fn screen_mut(&mut self) -> &mut ActiveScreen {
        &mut self.active
    }

    /// Navigate to `id`. Re-selecting the active screen keeps its state.
    pub fn select(&mut self, id: ScreenId) -> bool {
        if self.active.id() == id {
            return false;
        }
        info!(from = %self.active.id(), to = %id, "Screen selected");
        self.active = ActiveScreen::build(id, &self.pools, &self.config);
        true
    }

    /// Show or hide the tutor panel; returns the new visibility.
    pub fn toggle_chat(&mut self) -> bool {
        self.chat_visible = !self.chat_visible;
        self.chat_visible
    }

    pub fn is_chat_visible(&self) -> bool {
        self.chat_visible
    }

    /// Context tag for questions asked from the active screen.
    pub fn tutor_context(&self) -> TutorContext {
        self.active.id().into()
    }

    pub fn light(&self) -> Option<&LightReactions> {
        match &self.active {
            ActiveScreen::LightReactions(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn calvin(&self) -> Option<&CalvinCycle> {
        match &self.active {
            ActiveScreen::CalvinCycle(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn overview_mut(&mut self) -> Option<&mut PrimaryReaction> {
        match &mut self.active {
            ActiveScreen::Overview(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn comparison_mut(&mut self) -> Option<&mut PathwayComparison> {
        match &mut self.active {
            ActiveScreen::Comparison(screen) => Some(screen),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolId;
    use crate::screens::{CycleStage, ExcitationStage};

    #[tokio::test]
    async fn test_initial_view() {
        let composer = ViewComposer::new(LabConfig::default());
        assert_eq!(composer.active(), ScreenId::Overview);
        assert!(!composer.is_chat_visible());
        assert_eq!(composer.totals().await, PoolSnapshot::default());
        assert_eq!(composer.tutor_context().as_str(), "overview");
    }

    #[tokio::test]
    async fn test_pools_survive_navigation_but_screen_state_does_not() {
        let mut composer = ViewComposer::new(LabConfig::default());
        composer.pools().apply(PoolId::Atp, 2).await.unwrap();

        assert!(composer.select(ScreenId::CalvinCycle));
        composer.calvin().unwrap().fixate().await.unwrap();
        assert_eq!(composer.calvin().unwrap().stage().await, CycleStage::Reduction);

        // Same screen: nothing remounts.
        assert!(!composer.select(ScreenId::CalvinCycle));
        assert_eq!(composer.calvin().unwrap().stage().await, CycleStage::Reduction);

        composer.select(ScreenId::Comparison);
        composer.select(ScreenId::CalvinCycle);
        assert_eq!(composer.calvin().unwrap().stage().await, CycleStage::Fixation);
        assert_eq!(composer.totals().await.atp, 2);
    }

    #[test]
    fn test_chat_toggle_is_independent_of_navigation() {
        let mut composer = ViewComposer::new(LabConfig::default());
        assert!(composer.toggle_chat());
        composer.select(ScreenId::Comparison);
        assert!(composer.is_chat_visible());
        assert!(composer.tutor_context().is_comparison());
        assert!(!composer.toggle_chat());

        composer.select(ScreenId::Overview);
        assert_eq!(composer.overview_mut().unwrap().next(), ExcitationStage::Transfer);
        assert!(composer.comparison_mut().is_none());
    }
}

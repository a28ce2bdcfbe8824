//! Chloroplast - the photosynthesis lab's simulation core
//!
//! Shared state and scripted behaviour behind the lab screens:
//!
//! - **Pools**: ATP and NADPH counters shared by every screen
//! - **Sequencer**: absolute-offset step tables driving animated positions
//! - **Gates**: minimum-balance checks with all-or-nothing debits
//! - **Screens**: primary reaction, light reactions, Calvin cycle, C3/C4/CAM
//! - **Composer**: screen selection, pool totals, tutor panel visibility
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ViewComposer                          │
//! │                                                             │
//! │   ┌──────────┐  ┌────────────────┐  ┌──────────────┐        │
//! │   │ Overview │  │ LightReactions │  │ CalvinCycle  │  ...   │
//! │   └──────────┘  └───────┬────────┘  └──────┬───────┘        │
//! │                   Sequencer            GatedAction          │
//! │                         │                  │                │
//! │                   ┌─────▼──────────────────▼─────┐          │
//! │                   │          PoolStore           │          │
//! │                   └──────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod composer;
pub mod config;
pub mod feedback;
pub mod gate;
pub mod pool;
pub mod screens;
pub mod sequencer;

// Re-export main types
pub use composer::{ActiveScreen, ViewComposer};
pub use config::{ConfigError, LabConfig};
pub use gate::{GateRequirement, GatedAction, Refusal};
pub use pool::{PoolError, PoolId, PoolSnapshot, PoolStore};
pub use screens::ScreenId;
pub use sequencer::{RunHandle, SequenceStep, Sequencer, StepEffects};

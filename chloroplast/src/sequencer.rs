//! Scripted stage sequencing.
//!
//! A [`Sequencer`] walks a fixed step table. Each step carries a position, an
//! offset measured from the start of the run, and an optional effect handed
//! to the screen's [`StepEffects`].
//!
//! ```text
//! start() ──► t=0      position = steps[0].position, effect
//!             t=off₁   position = steps[1].position, effect
//!             ...
//!             t=offₙ   position = steps[n].position, effect ──► running = false
//! ```

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One row of a step table.
#[derive(Debug, Clone)]
pub struct SequenceStep<P, E> {
    /// Position published when the step is reached
    pub position: P,
    /// Offset from run start
    pub offset: Duration,
    /// Effect applied when the step is reached
    pub effect: Option<E>,
}

impl<P, E> SequenceStep<P, E> {
    pub fn at(position: P, offset_ms: u64) -> Self {
        Self {
            position,
            offset: Duration::from_millis(offset_ms),
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: E) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Applies step effects on behalf of a screen.
#[async_trait]
pub trait StepEffects<E>: Send + Sync {
    async fn apply(&self, effect: &E);
}

/// Handle to one run. Dropping it does not cancel the run.
pub struct RunHandle {
    task: Option<JoinHandle<()>>,
}

impl RunHandle {
    fn completed() -> Self {
        Self { task: None }
    }

    /// Wait for the run to reach its final step.
    pub async fn wait(self) {
        if let Some(task) = self.task {
            if let Err(e) = task.await {
                warn!(error = %e, "Sequencer run task failed");
            }
        }
    }
}

/// Clears the running flag however the run task ends.
struct RunGuard {
    running: Arc<AtomicBool>,
    completed_runs: Arc<AtomicU64>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.completed_runs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Drives a position through a step table, one run at a time.
pub struct Sequencer<P, E> {
    name: &'static str,
    steps: Arc<[SequenceStep<P, E>]>,
    effects: Arc<dyn StepEffects<E>>,
    running: Arc<AtomicBool>,
    completed_runs: Arc<AtomicU64>,
    position: Arc<watch::Sender<P>>,
}

impl<P, E> Sequencer<P, E>
where
    P: Copy + Debug + Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
{
    /// Create a sequencer resting at `initial`.
    ///
    /// Steps fire in table order; an offset earlier than its predecessor's
    /// fires immediately after it.
    pub fn new(
        name: &'static str,
        initial: P,
        steps: Vec<SequenceStep<P, E>>,
        effects: Arc<dyn StepEffects<E>>,
    ) -> Self {
        let (position, _) = watch::channel(initial);
        Self {
            name,
            steps: steps.into(),
            effects,
            running: Arc::new(AtomicBool::new(false)),
            completed_runs: Arc::new(AtomicU64::new(0)),
            position: Arc::new(position),
        }
    }

    /// Begin a run. Returns `None`, changing nothing, if one is in flight.
    ///
    /// An empty table completes immediately and leaves the flag clear.
    pub fn start(&self) -> Option<RunHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(sequence = self.name, "Start ignored: run in flight");
            return None;
        }

        let guard = RunGuard {
            running: Arc::clone(&self.running),
            completed_runs: Arc::clone(&self.completed_runs),
        };

        if self.steps.is_empty() {
            info!(sequence = self.name, "Empty sequence completed immediately");
            drop(guard);
            return Some(RunHandle::completed());
        }

        info!(sequence = self.name, steps = self.steps.len(), "Sequence started");

        let name = self.name;
        let steps = Arc::clone(&self.steps);
        let effects = Arc::clone(&self.effects);
        let position = Arc::clone(&self.position);
        let started_at = Instant::now();

        let task = tokio::spawn(async move {
            let _guard = guard;
            for (index, step) in steps.iter().enumerate() {
                tokio::time::sleep_until(started_at + step.offset).await;
                position.send_replace(step.position);
                debug!(sequence = name, index, position = ?step.position, "Step reached");
                if let Some(effect) = &step.effect {
                    effects.apply(effect).await;
                }
            }
            info!(sequence = name, "Sequence completed");
        });

        Some(RunHandle { task: Some(task) })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Position of the most recently reached step.
    pub fn position(&self) -> P {
        *self.position.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<P> {
        self.position.subscribe()
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u32, Duration)>>,
        origin: Mutex<Option<Instant>>,
    }

    #[async_trait]
    impl StepEffects<u32> for Recorder {
        async fn apply(&self, effect: &u32) {
            let origin = *self.origin.lock().unwrap();
            let elapsed = origin.map(|o| o.elapsed()).unwrap_or_default();
            self.seen.lock().unwrap().push((*effect, elapsed));
        }
    }

    fn table() -> Vec<SequenceStep<u8, u32>> {
        vec![
            SequenceStep::at(0, 0),
            SequenceStep::at(1, 100).with_effect(10),
            SequenceStep::at(2, 250).with_effect(20),
            SequenceStep::at(3, 400).with_effect(30),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_offsets_are_absolute() {
        let recorder = Arc::new(Recorder::default());
        *recorder.origin.lock().unwrap() = Some(Instant::now());
        let sequencer = Sequencer::new("test", 0u8, table(), recorder.clone());

        sequencer.start().unwrap().wait().await;

        let seen = recorder.seen.lock().unwrap().clone();
        let effects: Vec<u32> = seen.iter().map(|(e, _)| *e).collect();
        assert_eq!(effects, vec![10, 20, 30]);
        for ((_, elapsed), expected_ms) in seen.iter().zip([100u64, 250, 400]) {
            let expected = Duration::from_millis(expected_ms);
            assert!(*elapsed >= expected, "fired early: {:?} < {:?}", elapsed, expected);
            assert!(*elapsed < expected + Duration::from_millis(5), "drifted: {:?}", elapsed);
        }
        assert_eq!(sequencer.position(), 3);
        assert!(!sequencer.is_running());
        assert_eq!(sequencer.completed_runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intermediate_positions_are_observable() {
        let sequencer = Sequencer::new("test", 9u8, table(), Arc::new(Recorder::default()));
        let run = sequencer.start().unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sequencer.position(), 1);
        assert!(sequencer.is_running());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sequencer.position(), 2);

        run.wait().await;
        assert_eq!(sequencer.position(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_a_noop() {
        let recorder = Arc::new(Recorder::default());
        let sequencer = Sequencer::new("test", 0u8, table(), recorder.clone());

        let run = sequencer.start().unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(sequencer.start().is_none());
        assert_eq!(sequencer.position(), 1);

        run.wait().await;
        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
        assert_eq!(sequencer.completed_runs(), 1);

        // Startable again after completion.
        sequencer.start().unwrap().wait().await;
        assert_eq!(recorder.seen.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_table_completes_immediately() {
        let sequencer: Sequencer<u8, u32> =
            Sequencer::new("empty", 7, Vec::new(), Arc::new(Recorder::default()));

        let run = sequencer.start().unwrap();
        assert!(!sequencer.is_running());
        run.wait().await;

        assert_eq!(sequencer.position(), 7);
        assert_eq!(sequencer.completed_runs(), 1);
        assert!(sequencer.start().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_sequencers_overlap() {
        let a = Sequencer::new("a", 0u8, table(), Arc::new(Recorder::default()));
        let b = Sequencer::new("b", 0u8, table(), Arc::new(Recorder::default()));

        let run_a = a.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let run_b = b.start().unwrap();

        assert!(a.is_running() && b.is_running());
        run_a.wait().await;
        assert!(b.is_running());
        run_b.wait().await;
        assert!(!b.is_running());
    }
}

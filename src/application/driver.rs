// ============================================================
// Layer 2 — Training Driver
// ============================================================
// The iteration loop, written only against Layer 3 traits:
//
//   for iteration in start..=num_iterations:
//     stop if an interrupt was requested
//     learner.before_iteration(iteration)
//     learner.fit_epoch()                       ← one epoch
//     if iteration % gen_every_nth == 0        → generate sample
//     if iteration % save_model_every_nth == 0 → checkpoint
//
// Iteration 0 is divisible by everything, so a fresh run
// samples and checkpoints the untrained model once.
//
// Reference: Rust Book §13 (Iterators)

use anyhow::Result;
use std::{ops::RangeInclusive, time::Instant};

use crate::application::config::RunConfig;
use crate::domain::traits::{Checkpointer, FrameLearner, SampleSink, ShutdownSignal};
use crate::infra::metrics::{IterationMetrics, MetricsLogger};
use crate::ml::generator::Generator;

/// Which iterations run and what happens on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start_iteration:      usize,
    pub num_iterations:       usize,
    pub gen_every_nth:        usize,
    pub save_model_every_nth: usize,
}

impl Schedule {
    /// Cadences and range as configured, before any resume.
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self {
            start_iteration:      cfg.start_iteration,
            num_iterations:       cfg.num_iterations,
            gen_every_nth:        cfg.gen_every_nth,
            save_model_every_nth: cfg.save_model_every_nth,
        }
    }

    /// A persisted counter replaces the configured start. A counter
    /// of 0 counts as unset and keeps the configured start.
    pub fn resume_from(self, counter: Option<usize>) -> Self {
        match counter {
            Some(iteration) if iteration > 0 => Self { start_iteration: iteration, ..self },
            _ => self,
        }
    }

    /// Inclusive range of iterations this run will train.
    pub fn iterations(&self) -> RangeInclusive<usize> {
        self.start_iteration..=self.num_iterations
    }

    /// True on iterations that write a sample.
    pub fn should_generate(&self, iteration: usize) -> bool {
        iteration % self.gen_every_nth == 0
    }

    /// True on iterations that write a checkpoint.
    pub fn should_save(&self, iteration: usize) -> bool {
        iteration % self.save_model_every_nth == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Ran to num_iterations. None when the range was empty.
    Completed { last_iteration: Option<usize> },
    /// Stopped by a shutdown request before `next_iteration` began.
    Interrupted { next_iteration: usize },
}

/// Runs the iteration loop against any learner the checkpointer accepts.
pub struct TrainingDriver<'a, C: ?Sized> {
    pub schedule:     Schedule,
    pub generator:    &'a Generator,
    pub sink:         &'a dyn SampleSink,
    pub checkpointer: &'a C,
    pub shutdown:     &'a dyn ShutdownSignal,
    pub metrics:      Option<&'a MetricsLogger>,
}

impl<'a, C: ?Sized> TrainingDriver<'a, C> {
    /// Train every scheduled iteration unless a shutdown arrives first.
    pub fn run<L>(&self, learner: &mut L) -> Result<DriverOutcome>
    where
        L: FrameLearner,
        C: Checkpointer<L>,
    {
        let mut last_completed: Option<usize> = None;
        let mut last_saved:     Option<usize> = None;

        for iteration in self.schedule.iterations() {
            if self.shutdown.is_requested() {
                tracing::warn!("Shutdown requested before iteration {}", iteration);
                // keep the work done since the last checkpoint
                if let Some(done) = last_completed {
                    if last_saved != Some(done) {
                        self.checkpointer.save_checkpoint(&*learner, done)?;
                    }
                }
                return Ok(DriverOutcome::Interrupted { next_iteration: iteration });
            }

            tracing::info!("{}", "-".repeat(50));
            tracing::info!("Training iteration {}", iteration);

            learner.before_iteration(iteration);
            let started = Instant::now();
            let loss    = learner.fit_epoch()?;
            let seconds = started.elapsed().as_secs_f64();
            tracing::info!("Iteration {} loss={:.6} ({:.1}s)", iteration, loss, seconds);

            if let Some(metrics) = self.metrics {
                metrics.log(&IterationMetrics::new(iteration, loss, learner.learning_rate(), seconds))?;
            }

            if self.schedule.should_generate(iteration) {
                tracing::info!("Generating samples");
                self.generator.generate(&*learner, self.sink, iteration)?;
            } else {
                tracing::debug!("Not generating samples this iteration");
            }

            if self.schedule.should_save(iteration) {
                self.checkpointer.save_checkpoint(&*learner, iteration)?;
                last_saved = Some(iteration);
            } else {
                tracing::debug!("Not saving model this iteration");
            }

            last_completed = Some(iteration);
        }

        Ok(DriverOutcome::Completed { last_iteration: last_completed })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::{Cell, RefCell};

    use crate::domain::frame::Frame;

    #[derive(Default)]
    struct FakeLearner {
        fitted: Vec<usize>,
        current: usize,
        fail_on: Option<usize>,
    }

    impl FrameLearner for FakeLearner {
        fn before_iteration(&mut self, iteration: usize) {
            self.current = iteration;
        }

        fn fit_epoch(&mut self) -> Result<f64> {
            if self.fail_on == Some(self.current) {
                bail!("fit failed");
            }
            self.fitted.push(self.current);
            Ok(1.0 / (self.current + 1) as f64)
        }

        fn predict(&self, window: &[Frame]) -> Result<Vec<Frame>> {
            Ok(vec![window[window.len() - 1].clone()])
        }

        fn learning_rate(&self) -> f64 {
            1e-3
        }
    }

    #[derive(Default)]
    struct FakeCheckpoints {
        saved: RefCell<Vec<usize>>,
    }

    impl Checkpointer<FakeLearner> for FakeCheckpoints {
        fn save_checkpoint(&self, _learner: &FakeLearner, iteration: usize) -> Result<()> {
            self.saved.borrow_mut().push(iteration);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSink(RefCell<Vec<usize>>);

    impl SampleSink for FakeSink {
        fn write_sample(&self, iteration: usize, _frames: &[Vec<u8>]) -> Result<()> {
            self.0.borrow_mut().push(iteration);
            Ok(())
        }
    }

    /// Requests shutdown once `after` checks have passed.
    struct StopAfter {
        after:  usize,
        checks: Cell<usize>,
    }

    impl ShutdownSignal for StopAfter {
        fn is_requested(&self) -> bool {
            let n = self.checks.get();
            self.checks.set(n + 1);
            n >= self.after
        }
    }

    fn never() -> StopAfter {
        StopAfter { after: usize::MAX, checks: Cell::new(0) }
    }

    fn schedule(start: usize, end: usize, gen: usize, save: usize) -> Schedule {
        Schedule {
            start_iteration: start,
            num_iterations: end,
            gen_every_nth: gen,
            save_model_every_nth: save,
        }
    }

    fn generator() -> Generator {
        let frames = (0..10u8).map(|b| Frame::from_bytes(&[b])).collect();
        Generator::new(frames, 3, 2)
    }

    #[test]
    fn test_runs_inclusive_range_with_cadences() {
        let gen   = generator();
        let sink  = FakeSink::default();
        let ckpt  = FakeCheckpoints::default();
        let stop  = never();
        let driver = TrainingDriver {
            schedule: schedule(0, 6, 2, 3),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner::default();
        let outcome = driver.run(&mut learner).unwrap();

        assert_eq!(outcome, DriverOutcome::Completed { last_iteration: Some(6) });
        assert_eq!(learner.fitted, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(*sink.0.borrow(), vec![0, 2, 4, 6]);
        assert_eq!(*ckpt.saved.borrow(), vec![0, 3, 6]);
    }

    #[test]
    fn test_resume_counter_overrides_start() {
        let s = schedule(0, 10, 5, 5).resume_from(Some(7));
        assert_eq!(s.iterations(), 7..=10);
        let s = schedule(2, 10, 5, 5).resume_from(None);
        assert_eq!(s.start_iteration, 2);
    }

    #[test]
    fn test_zero_counter_keeps_configured_start() {
        let s = schedule(5, 10, 5, 5).resume_from(Some(0));
        assert_eq!(s.start_iteration, 5);
        let s = schedule(0, 10, 5, 5).resume_from(Some(0));
        assert_eq!(s.iterations(), 0..=10);
    }

    #[test]
    fn test_resumed_run_starts_at_counter() {
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = never();
        let driver = TrainingDriver {
            schedule: schedule(0, 5, 100, 100).resume_from(Some(4)),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner::default();
        driver.run(&mut learner).unwrap();
        assert_eq!(learner.fitted, vec![4, 5]);
    }

    #[test]
    fn test_empty_range_does_nothing() {
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = never();
        let driver = TrainingDriver {
            schedule: schedule(9, 5, 1, 1),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner::default();
        let outcome = driver.run(&mut learner).unwrap();
        assert_eq!(outcome, DriverOutcome::Completed { last_iteration: None });
        assert!(learner.fitted.is_empty());
    }

    #[test]
    fn test_interrupt_saves_last_completed_iteration() {
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = StopAfter { after: 3, checks: Cell::new(0) };
        let driver = TrainingDriver {
            schedule: schedule(1, 10, 100, 100),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner::default();
        let outcome = driver.run(&mut learner).unwrap();

        assert_eq!(outcome, DriverOutcome::Interrupted { next_iteration: 4 });
        assert_eq!(learner.fitted, vec![1, 2, 3]);
        assert_eq!(*ckpt.saved.borrow(), vec![3]);
    }

    #[test]
    fn test_interrupt_right_after_save_does_not_save_twice() {
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = StopAfter { after: 2, checks: Cell::new(0) };
        let driver = TrainingDriver {
            schedule: schedule(1, 10, 100, 2),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner::default();
        driver.run(&mut learner).unwrap();
        assert_eq!(*ckpt.saved.borrow(), vec![2]);
    }

    #[test]
    fn test_fit_failure_propagates() {
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = never();
        let driver = TrainingDriver {
            schedule: schedule(0, 5, 1, 1),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: None,
        };
        let mut learner = FakeLearner { fail_on: Some(2), ..Default::default() };
        assert!(driver.run(&mut learner).is_err());
        assert_eq!(*ckpt.saved.borrow(), vec![0, 1]);
    }

    #[test]
    fn test_metrics_rows_written() {
        let dir     = tempfile::tempdir().unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let gen  = generator();
        let sink = FakeSink::default();
        let ckpt = FakeCheckpoints::default();
        let stop = never();
        let driver = TrainingDriver {
            schedule: schedule(0, 2, 10, 10),
            generator: &gen, sink: &sink, checkpointer: &ckpt, shutdown: &stop, metrics: Some(&metrics),
        };
        driver.run(&mut FakeLearner::default()).unwrap();
        let text = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}

//! Run lifecycle controller.
//!
//! Owns the run state machine, the sequence store between runs, and the live
//! configuration. Emits events for presentation layers.

use crate::engine::step::{RunStateCell, SpeedSetting, StepEmitter};
use crate::engine::SortEngine;
use crate::error::SortVizError;
use crate::input;
use crate::model::{Algorithm, Pacing, RunConfig, RunState, RunSummary, SortEvent};
use crate::sequence::SequenceStore;
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by UI layers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiCommand {
    Start,
    TogglePause,
    Generate,
    Reset,
    SetSpeed(u8),
    SetSize(usize),
    SetValues(String),
    SelectAlgorithm(Algorithm),
    Quit,
}

/// `Idle -> Running <-> Paused -> Idle`. The shared cell is what the step emitter reads.
#[derive(Debug, Default)]
pub(crate) struct RunController {
    state: RunStateCell,
}

impl RunController {
    pub fn state(&self) -> RunState {
        self.state.load()
    }

    pub fn cell(&self) -> RunStateCell {
        self.state.clone()
    }

    pub fn begin(&mut self) -> Result<(), SortVizError> {
        match self.state() {
            RunState::Idle => {
                self.state.store(RunState::Running);
                Ok(())
            }
            from => Err(SortVizError::IllegalStateTransition {
                from,
                action: "start",
            }),
        }
    }

    pub fn toggle_pause(&mut self) -> Result<RunState, SortVizError> {
        let next = match self.state() {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Idle => {
                return Err(SortVizError::IllegalStateTransition {
                    from: RunState::Idle,
                    action: "pause",
                })
            }
        };
        self.state.store(next);
        Ok(next)
    }

    pub fn finish(&mut self) {
        self.state.store(RunState::Idle);
    }

    /// Reject configuration changes that would touch the sequence mid-run.
    pub fn ensure_idle(&self, action: &'static str) -> Result<(), SortVizError> {
        match self.state() {
            RunState::Idle => Ok(()),
            from => Err(SortVizError::IllegalStateTransition { from, action }),
        }
    }
}

/// Internal handle for a running sort task.
struct RunCtx {
    handle: Option<JoinHandle<Result<(SequenceStore, RunSummary)>>>,
    /// Snapshot to rebuild the store from if the task dies.
    fallback: Vec<f64>,
}

struct Session {
    controller: RunController,
    /// `None` while the store is lent to a running engine.
    store: Option<SequenceStore>,
    speed: SpeedSetting,
    algorithm: Algorithm,
    size: usize,
    pending_text: Option<String>,
    pacing: Pacing,
    seed: Option<u64>,
    event_tx: UnboundedSender<SortEvent>,
}

impl Session {
    fn new(cfg: RunConfig, event_tx: UnboundedSender<SortEvent>) -> Self {
        let mut session = Self {
            controller: RunController::default(),
            store: None,
            speed: SpeedSetting::new(cfg.speed),
            algorithm: cfg.algorithm,
            size: input::clamp_size(cfg.size),
            pending_text: None,
            pacing: cfg.pacing,
            seed: cfg.seed,
            event_tx,
        };
        let values = match cfg.values {
            Some(v) if !v.is_empty() && v.iter().all(|x| x.is_finite()) => v,
            _ => input::random_values(session.size, session.next_seed()),
        };
        session.install(values);
        session
    }

    fn send(&self, ev: SortEvent) {
        let _ = self.event_tx.send(ev);
    }

    fn info(&self, msg: impl Into<String>) {
        let _ = self.event_tx.send(SortEvent::Info(msg.into()));
    }

    fn ignored(&self, err: SortVizError) {
        tracing::debug!("ignored: {err}");
        self.info(format!("Ignored: {err}"));
    }

    fn next_seed(&mut self) -> Option<u64> {
        let s = self.seed;
        self.seed = s.map(|v| v.wrapping_add(1));
        s
    }

    /// Replace the store with `values`, falling back to a random array if rejected.
    fn install(&mut self, values: Vec<f64>) {
        let store = match SequenceStore::new(values) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("{e}; generating a random array instead");
                let fallback = input::random_values(self.size, self.next_seed());
                match SequenceStore::new(fallback) {
                    Ok(s) => s,
                    Err(_) => return,
                }
            }
        };
        self.send(SortEvent::Reset {
            snapshot: store.to_vec(),
        });
        self.store = Some(store);
    }

    fn start(&mut self) -> Option<RunCtx> {
        if let Err(e) = self.controller.begin() {
            self.ignored(e);
            return None;
        }
        let store = match self.store.take() {
            Some(s) if !s.is_empty() => s,
            other => {
                self.store = other;
                self.controller.finish();
                self.info("Nothing to sort");
                return None;
            }
        };
        let fallback = store.snapshot().map(<[f64]>::to_vec).unwrap_or_default();
        let emitter = StepEmitter::new(
            self.event_tx.clone(),
            self.speed.clone(),
            self.controller.cell(),
            self.pacing,
        );
        self.send(SortEvent::StateChanged(RunState::Running));
        self.send(SortEvent::RunStarted {
            algorithm: self.algorithm,
            len: store.len(),
        });
        tracing::info!(algorithm = %self.algorithm, len = store.len(), "run started");
        let engine = SortEngine::new(self.algorithm);
        let handle = tokio::spawn(async move { engine.run(store, emitter).await });
        Some(RunCtx {
            handle: Some(handle),
            fallback,
        })
    }

    fn complete(
        &mut self,
        fallback: Vec<f64>,
        join_res: Result<Result<(SequenceStore, RunSummary)>, tokio::task::JoinError>,
    ) {
        match join_res {
            Ok(Ok((store, summary))) => {
                self.store = Some(store);
                tracing::info!(
                    algorithm = %summary.algorithm,
                    elapsed = ?summary.elapsed,
                    "run finished"
                );
                self.send(SortEvent::RunFinished {
                    summary: Box::new(summary),
                });
            }
            Ok(Err(e)) => {
                self.info(format!("Run failed: {e:#}"));
                self.install(fallback);
            }
            Err(e) => {
                self.info(format!("Run join failed: {e}"));
                self.install(fallback);
            }
        }
        self.controller.finish();
        self.send(SortEvent::StateChanged(RunState::Idle));
    }

    /// Apply a configuration/control command. Returns a new run when one was started.
    fn handle(&mut self, cmd: UiCommand) -> Option<RunCtx> {
        match cmd {
            UiCommand::Start => return self.start(),
            UiCommand::TogglePause => match self.controller.toggle_pause() {
                Ok(state) => {
                    tracing::debug!(?state, "pause toggled");
                    self.send(SortEvent::StateChanged(state));
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::Generate => match self.controller.ensure_idle("generate") {
                Ok(()) => {
                    let seed = self.next_seed();
                    let values =
                        input::resolve_values(self.pending_text.as_deref(), self.size, seed);
                    self.install(values);
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::Reset => match self.controller.ensure_idle("reset") {
                Ok(()) => {
                    let restored = self.store.as_mut().map(|s| s.restore().map(|_| s.to_vec()));
                    match restored {
                        Some(Ok(snapshot)) => self.send(SortEvent::Reset { snapshot }),
                        _ => {
                            let seed = self.next_seed();
                            self.install(input::random_values(self.size, seed));
                        }
                    }
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::SetSpeed(v) => match self.speed.set(v) {
                Ok(value) => {
                    tracing::debug!(value, "speed changed");
                    self.send(SortEvent::Speed {
                        value,
                        delay_ms: self.speed.delay().as_millis() as u64,
                    });
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::SetSize(n) => match self.controller.ensure_idle("resize") {
                Ok(()) => {
                    self.size = input::clamp_size(n);
                    self.info(format!("Array size: {}", self.size));
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::SetValues(text) => {
                // Only read on the next generate, so it is safe mid-run.
                let text = text.trim().to_string();
                self.pending_text = if text.is_empty() { None } else { Some(text) };
            }
            UiCommand::SelectAlgorithm(a) => match self.controller.ensure_idle("select") {
                Ok(()) => {
                    self.algorithm = a;
                    self.info(format!("Algorithm: {a}"));
                }
                Err(e) => self.ignored(e),
            },
            UiCommand::Quit => {}
        }
        None
    }
}

/// Serve UI commands until quit, running at most one sort at a time.
pub(crate) async fn run_controller(
    cfg: RunConfig,
    start_on_launch: bool,
    event_tx: UnboundedSender<SortEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut session = Session::new(cfg, event_tx);
    session.send(SortEvent::Speed {
        value: session.speed.get(),
        delay_ms: session.speed.delay().as_millis() as u64,
    });
    let mut run_ctx = if start_on_launch {
        session.start()
    } else {
        None
    };

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => {
                        // Quitting tears down the process; the in-flight run goes with it.
                        if let Some(h) = run_ctx.as_mut().and_then(|ctx| ctx.handle.take()) {
                            h.abort();
                        }
                        break;
                    }
                    Some(cmd) => {
                        if let Some(ctx) = session.handle(cmd) {
                            run_ctx = Some(ctx);
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    if let Some(ctx) = run_ctx.take() {
                        session.complete(ctx.fallback, join_res);
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn cfg(values: &[f64], algorithm: Algorithm) -> RunConfig {
        RunConfig {
            algorithm,
            size: values.len(),
            values: Some(values.to_vec()),
            speed: 25,
            pacing: Pacing::Live,
            seed: Some(9),
        }
    }

    fn spawn(
        cfg: RunConfig,
    ) -> (
        mpsc::UnboundedSender<UiCommand>,
        mpsc::UnboundedReceiver<SortEvent>,
        JoinHandle<Result<()>>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(cfg, false, event_tx, cmd_rx));
        (cmd_tx, event_rx, handle)
    }

    async fn wait_finished(rx: &mut mpsc::UnboundedReceiver<SortEvent>) -> RunSummary {
        loop {
            match rx.recv().await {
                Some(SortEvent::RunFinished { summary }) => return *summary,
                Some(_) => {}
                None => panic!("controller stopped before the run finished"),
            }
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SortEvent>) -> Vec<SortEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn state_machine_transitions() {
        let mut c = RunController::default();
        assert!(c.toggle_pause().is_err());
        c.begin().unwrap();
        assert!(c.begin().is_err());
        assert_eq!(c.toggle_pause().unwrap(), RunState::Paused);
        assert!(c.begin().is_err());
        assert!(c.ensure_idle("generate").is_err());
        assert_eq!(c.toggle_pause().unwrap(), RunState::Running);
        c.finish();
        assert_eq!(c.state(), RunState::Idle);
        assert!(c.ensure_idle("generate").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_runs_once() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[5.0, 3.0, 8.0, 1.0], Algorithm::Bubble));
        cmd_tx.send(UiCommand::Start).unwrap();
        cmd_tx.send(UiCommand::Start).unwrap();

        let summary = wait_finished(&mut rx).await;
        assert_eq!(summary.output, vec![1.0, 3.0, 5.0, 8.0]);

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
        let rest = drain(&mut rx);
        assert!(!rest
            .iter()
            .any(|ev| matches!(ev, SortEvent::RunFinished { .. } | SortEvent::RunStarted { .. })));
        assert!(rest
            .iter()
            .any(|ev| matches!(ev, SortEvent::StateChanged(RunState::Idle))));
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_reported_as_ignored() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[2.0, 1.0], Algorithm::Quick));
        cmd_tx.send(UiCommand::Start).unwrap();
        cmd_tx.send(UiCommand::Start).unwrap();
        let mut started = 0;
        let mut ignored = 0;
        loop {
            match rx.recv().await.unwrap() {
                SortEvent::RunStarted { .. } => started += 1,
                SortEvent::Info(msg) if msg.starts_with("Ignored") => ignored += 1,
                SortEvent::RunFinished { .. } => break,
                _ => {}
            }
        }
        assert_eq!((started, ignored), (1, 1));
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn pause_suspends_without_changing_outcome() {
        let input = input::random_values(12, Some(4));

        let (cmd_tx, mut rx, handle) = spawn(cfg(&input, Algorithm::Quick));
        cmd_tx.send(UiCommand::Start).unwrap();
        let baseline = wait_finished(&mut rx).await;
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        let (cmd_tx, mut rx, handle) = spawn(cfg(&input, Algorithm::Quick));
        cmd_tx.send(UiCommand::Start).unwrap();
        let mut steps = 0;
        while steps < 5 {
            if let Some(SortEvent::Step { .. }) = rx.recv().await {
                steps += 1;
            }
        }
        cmd_tx.send(UiCommand::TogglePause).unwrap();
        // Let the in-flight step land, then confirm nothing else moves.
        tokio::time::sleep(Duration::from_secs(2)).await;
        let during = drain(&mut rx);
        assert!(during
            .iter()
            .any(|ev| matches!(ev, SortEvent::StateChanged(RunState::Paused))));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(drain(&mut rx).is_empty());

        cmd_tx.send(UiCommand::TogglePause).unwrap();
        let paused_run = wait_finished(&mut rx).await;
        assert_eq!(paused_run.output, baseline.output);
        assert_eq!(paused_run.counts, baseline.counts);
        assert!(paused_run.elapsed > baseline.elapsed);
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn instant_run_can_be_paused() {
        let input: Vec<f64> = (1..=120).rev().map(f64::from).collect();
        let mut config = cfg(&input, Algorithm::Bubble);
        config.pacing = Pacing::Instant;
        let (cmd_tx, mut rx, handle) = spawn(config);
        cmd_tx.send(UiCommand::Start).unwrap();
        cmd_tx.send(UiCommand::TogglePause).unwrap();

        loop {
            match rx.recv().await.unwrap() {
                SortEvent::StateChanged(RunState::Paused) => break,
                SortEvent::RunFinished { .. } => panic!("run finished before the pause landed"),
                _ => {}
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        drain(&mut rx);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());

        cmd_tx.send(UiCommand::TogglePause).unwrap();
        let summary = wait_finished(&mut rx).await;
        assert_eq!(summary.counts.compares, 120 * 119 / 2);
        assert_eq!(summary.output.first(), Some(&1.0));
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn configuration_is_locked_while_running_except_speed() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[4.0, 3.0, 2.0, 1.0], Algorithm::Selection));
        cmd_tx.send(UiCommand::Start).unwrap();
        cmd_tx.send(UiCommand::Generate).unwrap();
        cmd_tx.send(UiCommand::Reset).unwrap();
        cmd_tx.send(UiCommand::SetSize(50)).unwrap();
        cmd_tx
            .send(UiCommand::SelectAlgorithm(Algorithm::Merge))
            .unwrap();
        cmd_tx.send(UiCommand::SetSpeed(50)).unwrap();

        let mut ignored = 0;
        let mut speed_seen = false;
        let mut resets = 0;
        let summary = loop {
            match rx.recv().await.unwrap() {
                SortEvent::Info(msg) if msg.starts_with("Ignored") => ignored += 1,
                SortEvent::Speed { value: 50, delay_ms } => {
                    assert_eq!(delay_ms, 50);
                    speed_seen = true;
                }
                SortEvent::Reset { .. } => resets += 1,
                SortEvent::RunFinished { summary } => break summary,
                _ => {}
            }
        };
        assert_eq!(ignored, 4);
        assert!(speed_seen);
        assert_eq!(resets, 1, "only the initial array announcement");
        assert_eq!(summary.algorithm, Algorithm::Selection);
        assert_eq!(summary.output, vec![1.0, 2.0, 3.0, 4.0]);
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_original_after_runs() {
        let original = vec![9.0, 7.0, 8.0, 1.0, 4.0];
        let (cmd_tx, mut rx, handle) = spawn(cfg(&original, Algorithm::Merge));
        for _ in 0..2 {
            cmd_tx.send(UiCommand::Start).unwrap();
            wait_finished(&mut rx).await;
        }
        cmd_tx.send(UiCommand::Reset).unwrap();
        cmd_tx.send(UiCommand::Reset).unwrap();
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        let resets: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|ev| match ev {
                SortEvent::Reset { snapshot } => Some(snapshot),
                _ => None,
            })
            .collect();
        assert_eq!(resets, vec![original.clone(), original]);
    }

    #[tokio::test(start_paused = true)]
    async fn generate_uses_pending_text_or_random() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[1.0, 2.0], Algorithm::Bubble));
        cmd_tx.send(UiCommand::SetValues("3, 1, 2".into())).unwrap();
        cmd_tx.send(UiCommand::Generate).unwrap();
        cmd_tx.send(UiCommand::SetValues("nope".into())).unwrap();
        cmd_tx.send(UiCommand::SetSize(7)).unwrap();
        cmd_tx.send(UiCommand::Generate).unwrap();
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        let resets: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|ev| match ev {
                SortEvent::Reset { snapshot } => Some(snapshot),
                _ => None,
            })
            .collect();
        assert_eq!(resets.len(), 3);
        assert_eq!(resets[0], vec![1.0, 2.0]);
        assert_eq!(resets[1], vec![3.0, 1.0, 2.0]);
        assert_eq!(resets[2].len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_while_idle_is_ignored() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[1.0], Algorithm::Insertion));
        cmd_tx.send(UiCommand::TogglePause).unwrap();
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|ev| matches!(ev, SortEvent::StateChanged(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_run_marks_everything_sorted() {
        let (cmd_tx, mut rx, handle) = spawn(cfg(&[3.0, 1.0, 2.0], Algorithm::Insertion));
        cmd_tx.send(UiCommand::Start).unwrap();
        let mut last_op = None;
        loop {
            match rx.recv().await.unwrap() {
                SortEvent::Step { op, .. } => last_op = Some(op),
                SortEvent::RunFinished { .. } => break,
                _ => {}
            }
        }
        assert_eq!(last_op, Some(Operation::MarkSortedRange { lo: 0, hi: 2 }));
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }
}

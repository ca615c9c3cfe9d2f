use crate::input;
use crate::model::{Algorithm, Operation, OperationCounts, RunState, RunSummary, SortEvent};

/// What a single bar should look like, derived from the latest operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Plain,
    Compare,
    Swap,
    Write,
    Pivot,
    Sorted,
}

pub struct UiState {
    pub tab: usize,
    pub run_state: RunState,
    pub info: String,

    pub values: Vec<f64>,
    pub last_op: Option<Operation>,
    // Cumulative; only cleared when a new run starts or the array is replaced.
    pub sorted: Vec<bool>,
    pub step: u64,
    pub counts: OperationCounts,
    pub last_summary: Option<RunSummary>,

    pub algorithm: Algorithm,
    pub size: usize,
    pub speed: u8,
    pub delay_ms: u64,

    pub values_editing: bool,
    pub values_input: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            run_state: RunState::Idle,
            info: String::new(),
            values: Vec::new(),
            last_op: None,
            sorted: Vec::new(),
            step: 0,
            counts: OperationCounts::default(),
            last_summary: None,
            algorithm: Algorithm::default(),
            size: input::DEFAULT_SIZE,
            speed: crate::engine::step::DEFAULT_SPEED,
            delay_ms: 0,
            values_editing: false,
            values_input: String::new(),
        }
    }
}

impl UiState {
    pub fn is_idle(&self) -> bool {
        self.run_state == RunState::Idle
    }

    fn clear_progress(&mut self) {
        self.last_op = None;
        self.sorted = vec![false; self.values.len()];
        self.step = 0;
        self.counts = OperationCounts::default();
    }

    pub fn highlight(&self, idx: usize) -> Highlight {
        let transient = match self.last_op {
            Some(Operation::Compare { i, j }) if idx == i || idx == j => Some(Highlight::Compare),
            Some(Operation::Swap { i, j }) if idx == i || idx == j => Some(Highlight::Swap),
            Some(Operation::Overwrite { i, .. }) if idx == i => Some(Highlight::Write),
            Some(Operation::MarkPivot { i }) if idx == i => Some(Highlight::Pivot),
            _ => None,
        };
        match transient {
            Some(h) => h,
            None if self.sorted.get(idx).copied().unwrap_or(false) => Highlight::Sorted,
            None => Highlight::Plain,
        }
    }
}

/// Fold one core event into the UI state.
pub fn apply_event(state: &mut UiState, ev: SortEvent) {
    match ev {
        SortEvent::RunStarted { algorithm, len } => {
            state.algorithm = algorithm;
            state.clear_progress();
            state.info = format!("Sorting {len} values with {algorithm} sort");
        }
        SortEvent::Step { op, snapshot } => {
            state.values = snapshot;
            if state.sorted.len() != state.values.len() {
                state.sorted.resize(state.values.len(), false);
            }
            if let Operation::MarkSortedRange { lo, hi } = op {
                for s in state.sorted.iter_mut().take(hi + 1).skip(lo) {
                    *s = true;
                }
            }
            state.step += 1;
            state.counts.record(&op);
            state.last_op = Some(op);
        }
        SortEvent::RunFinished { summary } => {
            state.last_op = None;
            state.info = format!(
                "Done: {} compares, {} swaps, {} writes",
                summary.counts.compares, summary.counts.swaps, summary.counts.overwrites
            );
            state.last_summary = Some(*summary);
        }
        SortEvent::Reset { snapshot } => {
            state.size = snapshot.len();
            state.values = snapshot;
            state.clear_progress();
            state.last_summary = None;
        }
        SortEvent::StateChanged(run_state) => {
            state.run_state = run_state;
            match run_state {
                RunState::Paused => state.info = "Paused".into(),
                RunState::Running => state.info = "Running".into(),
                RunState::Idle => {}
            }
        }
        SortEvent::Speed { value, delay_ms } => {
            state.speed = value;
            state.delay_ms = delay_ms;
        }
        SortEvent::Info(msg) => state.info = msg,
    }
}

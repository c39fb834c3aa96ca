//! Execution Strategy
//!
//! Runs B independent trials either on the calling thread or on a dedicated
//! rayon pool of a fixed size. The pool is built for one run and dropped when
//! the run ends, whether it succeeded or not.
//!
//! ## Random streams
//!
//! No generator is ever shared between trials running concurrently:
//!
//! - [`StreamDerivation::PerTrial`]: each trial seeds its own generator from
//!   `(master_seed, trial)`. Replicates are identical in every mode and for
//!   every worker count.
//! - [`StreamDerivation::PerWorker`]: trials are split into one contiguous
//!   chunk per worker and each worker draws from its own jumped stream.
//!   Replicates match sequential mode in distribution only.
//!
//! ## Failure model
//!
//! Fail-fast. The first failing trial stops every worker, and its error is
//! returned. A panic inside a trial becomes `WorkerFailure`. A partial replicate
//! set is never returned.

use crate::aggregate::NanPolicy;
use crate::dataset::Dataset;
use crate::error::{BootstrapError, StatisticError};
use crate::replicates::ReplicateSet;
use crate::resampler::{draw_indices_into, trial_rng, worker_rng, StreamRng};
use crate::statistic::Statistic;
use rayon::prelude::*;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Index sets at most this long are attached to `DegenerateInput` errors
pub const MAX_REPORTED_INDICES: usize = 64;

/// How trials are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// All trials on the calling thread
    Sequential,
    /// Trials distributed over a pool of exactly `workers` threads
    Parallel {
        /// Pool size
        workers: usize,
    },
}

impl ExecutionMode {
    /// Parallel mode with one worker per available core
    pub fn parallel_all_cores() -> Self {
        ExecutionMode::Parallel {
            workers: available_workers(),
        }
    }

    /// Map a worker count to a mode: 0 = all cores, 1 = sequential
    pub fn from_workers(workers: usize) -> Self {
        match workers {
            0 => Self::parallel_all_cores(),
            1 => ExecutionMode::Sequential,
            n => ExecutionMode::Parallel { workers: n },
        }
    }

    /// Number of threads trials run on
    pub fn workers(&self) -> usize {
        match self {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel { workers } => *workers,
        }
    }
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::parallel_all_cores()
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel { workers } => write!(f, "parallel({workers})"),
        }
    }
}

/// Number of logical CPUs, at least 1
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// How random streams are assigned to trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamDerivation {
    /// One counter-seeded generator per trial
    #[default]
    PerTrial,
    /// One jumped generator per worker, trials chunked contiguously
    PerWorker,
}

impl std::str::FromStr for StreamDerivation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-trial" | "trial" => Ok(StreamDerivation::PerTrial),
            "per-worker" | "worker" => Ok(StreamDerivation::PerWorker),
            other => Err(format!("Unknown stream derivation: {}", other)),
        }
    }
}

impl std::fmt::Display for StreamDerivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamDerivation::PerTrial => write!(f, "per-trial"),
            StreamDerivation::PerWorker => write!(f, "per-worker"),
        }
    }
}

/// Everything about a run except the data and the statistic
#[derive(Debug, Clone)]
pub struct TrialPlan {
    /// Master seed all streams derive from
    pub seed: u64,
    /// Sequential or parallel
    pub mode: ExecutionMode,
    /// Stream assignment
    pub streams: StreamDerivation,
    /// Handling of degenerate and non-finite replicates
    pub nan_policy: NanPolicy,
    /// Set to `true` from another thread to stop the run
    pub cancel: Option<Arc<AtomicBool>>,
    /// Incremented once per completed trial, for progress display
    pub progress: Option<Arc<AtomicUsize>>,
}

impl Default for TrialPlan {
    fn default() -> Self {
        Self {
            seed: crate::DEFAULT_SEED,
            mode: ExecutionMode::default(),
            streams: StreamDerivation::default(),
            nan_policy: NanPolicy::default(),
            cancel: None,
            progress: None,
        }
    }
}

impl TrialPlan {
    /// Sequential plan with the given seed
    pub fn sequential(seed: u64) -> Self {
        Self {
            seed,
            mode: ExecutionMode::Sequential,
            ..Self::default()
        }
    }

    /// Parallel plan with the given seed and pool size
    pub fn parallel(seed: u64, workers: usize) -> Self {
        Self {
            seed,
            mode: ExecutionMode::Parallel { workers },
            ..Self::default()
        }
    }
}

/// Draw `iterations` bootstrap resamples of `dataset` and evaluate `statistic`
/// on each.
///
/// The dataset is shared by reference with every worker; each worker only
/// owns a reusable index buffer.
///
/// # Errors
///
/// - `InvalidSize` for an empty dataset, fewer than 2 iterations, or 0 workers
/// - `DegenerateInput` when a resample is degenerate under `NanPolicy::FailFast`
/// - `Statistic` for any other statistic error
/// - `WorkerFailure` when a trial panics
/// - `Cancelled` when the plan's cancel flag is raised
pub fn run_bootstrap<S>(
    dataset: &Dataset,
    statistic: &S,
    iterations: usize,
    plan: &TrialPlan,
) -> Result<ReplicateSet, BootstrapError>
where
    S: Statistic + ?Sized,
{
    if dataset.is_empty() {
        return Err(BootstrapError::InvalidSize {
            what: "dataset rows",
            got: 0,
            min: 1,
        });
    }

    let n = dataset.n_rows();
    tracing::debug!(
        rows = n,
        iterations,
        mode = %plan.mode,
        streams = %plan.streams,
        statistic = statistic.name(),
        "starting bootstrap run"
    );

    let values = execute(
        iterations,
        plan,
        || vec![0usize; n],
        |trial, rng, indices| {
            draw_indices_into(rng, indices);
            evaluate_trial(dataset, statistic, indices, trial, plan)
        },
    )?;

    Ok(ReplicateSet::new(values))
}

/// Evaluate one resample and apply the NaN policy
fn evaluate_trial<S>(
    dataset: &Dataset,
    statistic: &S,
    indices: &[usize],
    trial: usize,
    plan: &TrialPlan,
) -> Result<f64, BootstrapError>
where
    S: Statistic + ?Sized,
{
    let reason = match statistic.evaluate(&dataset.resample(indices)) {
        Ok(value) if value.is_finite() => return Ok(value),
        Ok(value) => format!("statistic returned {value}"),
        Err(StatisticError::Degenerate(reason)) => reason,
        Err(other) => return Err(BootstrapError::Statistic(other)),
    };

    match plan.nan_policy {
        NanPolicy::Exclude => Ok(f64::NAN),
        NanPolicy::FailFast => Err(BootstrapError::DegenerateInput {
            trial: Some(trial),
            seed: plan.seed,
            reason,
            indices: (indices.len() <= MAX_REPORTED_INDICES).then(|| indices.to_vec()),
        }),
    }
}

/// Shared bookkeeping for one run
struct RunState<'a> {
    plan: &'a TrialPlan,
    stop: AtomicBool,
    first_error: Mutex<Option<BootstrapError>>,
    completed: AtomicUsize,
}

impl<'a> RunState<'a> {
    fn new(plan: &'a TrialPlan) -> Self {
        Self {
            plan,
            stop: AtomicBool::new(false),
            first_error: Mutex::new(None),
            completed: AtomicUsize::new(0),
        }
    }

    fn cancelled(&self) -> bool {
        self.plan
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.cancelled()
    }

    /// Record an error; only the first one is kept
    fn fail(&self, err: BootstrapError) {
        let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Run one trial, catching panics. `None` means the run is stopping.
    fn run_trial<T, F>(
        &self,
        worker: usize,
        trial: usize,
        rng: &mut StreamRng,
        scratch: &mut T,
        body: &F,
    ) -> Option<f64>
    where
        F: Fn(usize, &mut StreamRng, &mut T) -> Result<f64, BootstrapError>,
    {
        if self.should_stop() {
            return None;
        }

        match catch_unwind(AssertUnwindSafe(|| body(trial, rng, scratch))) {
            Ok(Ok(value)) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                if let Some(progress) = &self.plan.progress {
                    progress.fetch_add(1, Ordering::Relaxed);
                }
                Some(value)
            }
            Ok(Err(err)) => {
                self.fail(err);
                None
            }
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                self.fail(BootstrapError::WorkerFailure {
                    worker,
                    trial,
                    message,
                });
                None
            }
        }
    }

    /// Run a contiguous range of trials on one worker
    fn run_chunk<T, M, F>(
        &self,
        worker: usize,
        trials: Range<usize>,
        make_scratch: &M,
        body: &F,
    ) -> Option<Vec<f64>>
    where
        M: Fn() -> T,
        F: Fn(usize, &mut StreamRng, &mut T) -> Result<f64, BootstrapError>,
    {
        let mut scratch = make_scratch();
        let mut out = Vec::with_capacity(trials.len());

        match self.plan.streams {
            StreamDerivation::PerTrial => {
                for trial in trials {
                    let mut rng = trial_rng(self.plan.seed, trial);
                    out.push(self.run_trial(worker, trial, &mut rng, &mut scratch, body)?);
                }
            }
            StreamDerivation::PerWorker => {
                let mut rng = worker_rng(self.plan.seed, worker);
                for trial in trials {
                    out.push(self.run_trial(worker, trial, &mut rng, &mut scratch, body)?);
                }
            }
        }

        Some(out)
    }

    fn finish(self, values: Option<Vec<f64>>, iterations: usize) -> Result<Vec<f64>, BootstrapError> {
        if let Some(err) = self
            .first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(err);
        }

        match values {
            Some(values) if values.len() == iterations => Ok(values),
            _ => Err(BootstrapError::Cancelled {
                completed: self.completed.load(Ordering::Relaxed),
            }),
        }
    }
}

/// Split `total` trials into `workers` contiguous, near-equal ranges
pub(crate) fn chunk_ranges(total: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = total / workers;
    let extra = total % workers;

    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn build_pool(workers: usize) -> Result<rayon::ThreadPool, BootstrapError> {
    tracing::debug!(workers, "building worker pool");
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("bootci-worker-{i}"))
        .build()
        .map_err(|e| BootstrapError::WorkerPool(e.to_string()))
}

/// Run `iterations` trials according to `plan`.
///
/// `make_scratch` builds per-worker scratch state (e.g. an index buffer);
/// `body(trial, rng, scratch)` produces one replicate. Replicates are returned
/// in trial order.
pub(crate) fn execute<T, M, F>(
    iterations: usize,
    plan: &TrialPlan,
    make_scratch: M,
    body: F,
) -> Result<Vec<f64>, BootstrapError>
where
    T: Send,
    M: Fn() -> T + Sync,
    F: Fn(usize, &mut StreamRng, &mut T) -> Result<f64, BootstrapError> + Sync,
{
    if iterations < crate::aggregate::MIN_REPLICATES {
        return Err(BootstrapError::InvalidSize {
            what: "iterations",
            got: iterations,
            min: crate::aggregate::MIN_REPLICATES,
        });
    }

    let state = RunState::new(plan);

    let values = match plan.mode {
        ExecutionMode::Sequential => state.run_chunk(0, 0..iterations, &make_scratch, &body),
        ExecutionMode::Parallel { workers } => {
            if workers == 0 {
                return Err(BootstrapError::InvalidSize {
                    what: "workers",
                    got: 0,
                    min: 1,
                });
            }
            let pool = build_pool(workers)?;
            let state = &state;
            let make_scratch = &make_scratch;
            let body = &body;

            pool.install(|| match plan.streams {
                StreamDerivation::PerTrial => (0..iterations)
                    .into_par_iter()
                    .map_init(make_scratch, |scratch, trial| {
                        let worker = rayon::current_thread_index().unwrap_or(0);
                        let mut rng = trial_rng(plan.seed, trial);
                        state.run_trial(worker, trial, &mut rng, scratch, body)
                    })
                    .collect::<Option<Vec<f64>>>(),
                StreamDerivation::PerWorker => chunk_ranges(iterations, workers)
                    .into_par_iter()
                    .enumerate()
                    .map(|(worker, trials)| state.run_chunk(worker, trials, make_scratch, body))
                    .collect::<Option<Vec<Vec<f64>>>>()
                    .map(|chunks| chunks.into_iter().flatten().collect()),
            })
        }
    };

    state.finish(values, iterations)
}

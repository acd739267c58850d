//! # Effect Runner
//!
//! Runs an environment-parameterized, fallible async computation whenever its dependency
//! list changes, and reports progress through [`Lifecycle`] callbacks:
//!
//! ```text
//!            deps changed                     completes
//! Idle ───────────────────▶ Running ───────────────────▶ Succeeded | Failed
//!   ▲                         │  ▲                               │
//!   │       cancel()          │  │     deps changed again        │
//!   └─────────────────────────┘  └───────────────────────────────┘
//! ```
//!
//! Per run the callbacks fire in a fixed order: `before` synchronously inside
//! [`EffectRunner::run`], then exactly one of `error`/`success`, then `settle`.
//!
//! Every run gets its own [`CancellationToken`]. Re-arming cancels the previous token, and a
//! cancelled run drops its future and fires no further callbacks, so a slow stale response
//! can never overwrite a fresher one. The liveness check and the completion callbacks run
//! under the same gate as re-arming, so a run that is superseded mid-completion either
//! settles before the next `before` or not at all.
//!
//! ## Example
//!
//! ```rust
//! use effect_framework::remote_data::{RemoteData, RemoteDataCell};
//! use effect_framework::runner::{EffectRunner, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cell: RemoteDataCell<String, usize> = RemoteDataCell::new();
//!     let mut runner = EffectRunner::new();
//!
//!     let outcome = runner.run(vec!["hound"], 21usize, |env| async move { Ok(env * 2) }, cell.lifecycle());
//!     assert!(cell.get().is_pending());
//!     outcome.wait().await;
//!     assert_eq!(cell.get(), RemoteData::Success(42));
//!
//!     // same dependencies: nothing happens
//!     let outcome = runner.run(vec!["hound"], 0usize, |_| async { Ok(0) }, cell.lifecycle());
//!     assert!(matches!(outcome, RunOutcome::Skipped));
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type BeforeFn = Box<dyn FnOnce() + Send>;
type ErrorFn<E> = Box<dyn FnOnce(E) + Send>;
type SuccessFn<A> = Box<dyn FnOnce(A) + Send>;

/// Callbacks for one run. Any of them may be left unset.
pub struct Lifecycle<E, A> {
    before: Option<BeforeFn>,
    error: Option<ErrorFn<E>>,
    success: Option<SuccessFn<A>>,
    settle: Option<BeforeFn>,
}

impl<E, A> Default for Lifecycle<E, A> {
    fn default() -> Self {
        Self {
            before: None,
            error: None,
            success: None,
            settle: None,
        }
    }
}

impl<E, A> Lifecycle<E, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.before = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(E) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(A) + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Runs after `error` or `success`, whichever fired.
    pub fn on_settle(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.settle = Some(Box::new(f));
        self
    }

    /// Maps each transition to an action and hands it to `dispatch`, reducer style.
    pub fn dispatching<Act, D>(
        dispatch: D,
        before: Act,
        on_error: impl FnOnce(E) -> Act + Send + 'static,
        on_success: impl FnOnce(A) -> Act + Send + 'static,
    ) -> Self
    where
        Act: Send + 'static,
        D: Fn(Act) + Send + Sync + 'static,
    {
        let dispatch = Arc::new(dispatch);
        let on_before_dispatch = Arc::clone(&dispatch);
        let on_error_dispatch = Arc::clone(&dispatch);
        Self::new()
            .on_before(move || on_before_dispatch(before))
            .on_error(move |e| on_error_dispatch(on_error(e)))
            .on_success(move |a| dispatch(on_success(a)))
    }

    /// Fires the `before` callback, at most once.
    pub fn before(&mut self) {
        if let Some(f) = self.before.take() {
            f();
        }
    }

    /// Fires `error` or `success` for `result`, then `settle`.
    pub fn complete(mut self, result: Result<A, E>) {
        match result {
            Ok(a) => {
                if let Some(f) = self.success.take() {
                    f(a);
                }
            }
            Err(e) => {
                if let Some(f) = self.error.take() {
                    f(e);
                }
            }
        }
        if let Some(f) = self.settle.take() {
            f();
        }
    }
}

/// A spawned run.
#[derive(Debug)]
pub struct EffectHandle {
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl EffectHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the run has either reported its result or been cancelled.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            warn!(generation = self.generation, error = %e, "Effect task did not finish cleanly");
        }
    }
}

/// What [`EffectRunner::run`] did.
#[derive(Debug)]
pub enum RunOutcome {
    Started(EffectHandle),
    /// The dependencies matched the previous run.
    Skipped,
}

impl RunOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped)
    }

    pub fn handle(self) -> Option<EffectHandle> {
        match self {
            RunOutcome::Started(handle) => Some(handle),
            RunOutcome::Skipped => None,
        }
    }

    /// Waits for a started run; returns immediately when skipped.
    pub async fn wait(self) {
        if let RunOutcome::Started(handle) = self {
            handle.wait().await;
        }
    }
}

type DepsEq<D> = Box<dyn Fn(&D, &D) -> bool + Send + Sync>;

/// Re-runs an effect when its dependencies change. One runner per call site.
///
/// Dropping the runner cancels whatever run is in flight.
pub struct EffectRunner<D> {
    last_deps: Option<D>,
    eq: DepsEq<D>,
    token: Option<CancellationToken>,
    generation: u64,
    gate: Arc<Mutex<()>>,
}

impl<D: PartialEq + 'static> EffectRunner<D> {
    pub fn new() -> Self {
        Self::with_eq(|a: &D, b: &D| a == b)
    }
}

impl<D: PartialEq + 'static> Default for EffectRunner<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> EffectRunner<D> {
    /// A runner comparing dependency lists with `eq` instead of `PartialEq`.
    pub fn with_eq(eq: impl Fn(&D, &D) -> bool + Send + Sync + 'static) -> Self {
        Self {
            last_deps: None,
            eq: Box::new(eq),
            token: None,
            generation: 0,
            gate: Arc::default(),
        }
    }
}

impl<D> EffectRunner<D> {
    /// Starts `effect(env)` unless `deps` equals the dependencies of the previous run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<Env, E, A, F, Fut>(
        &mut self,
        deps: D,
        env: Env,
        effect: F,
        mut lifecycle: Lifecycle<E, A>,
    ) -> RunOutcome
    where
        F: FnOnce(Env) -> Fut,
        Fut: Future<Output = Result<A, E>> + Send + 'static,
        E: Send + 'static,
        A: Send + 'static,
    {
        if let Some(last) = &self.last_deps {
            if (self.eq)(last, &deps) {
                debug!(generation = self.generation, "Dependencies unchanged, skipping run");
                return RunOutcome::Skipped;
            }
        }

        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = self.token.take() {
            previous.cancel();
        }
        self.last_deps = Some(deps);
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.token = Some(token.clone());

        debug!(generation, "Starting run");
        lifecycle.before();
        drop(gate);

        let future = effect(env);
        let run_token = token.clone();
        let run_gate = Arc::clone(&self.gate);
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = run_token.cancelled() => {
                    debug!(generation, "Run superseded before completion");
                }
                result = future => settle(&run_gate, &run_token, generation, lifecycle, result),
            }
        });

        RunOutcome::Started(EffectHandle {
            generation,
            token,
            task,
        })
    }

    /// Invalidates the current run and forgets the last dependencies, as on unmount.
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.last_deps = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn settle<E, A>(
    gate: &Mutex<()>,
    token: &CancellationToken,
    generation: u64,
    lifecycle: Lifecycle<E, A>,
    result: Result<A, E>,
) {
    let _gate = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if token.is_cancelled() {
        debug!(generation, "Ignoring stale completion");
    } else {
        lifecycle.complete(result);
    }
}

impl<D> Drop for EffectRunner<D> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

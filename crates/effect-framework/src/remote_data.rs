//! # RemoteData
//!
//! The state of one asynchronous request as seen by whoever displays it:
//!
//! ```text
//! Initial ──▶ Pending ──▶ Success(A)
//!                │
//!                └──────▶ Failure(E)
//! ```
//!
//! A value never moves on its own. Transitions come from the callbacks an
//! [`EffectRunner`](crate::runner::EffectRunner) fires, usually through
//! [`RemoteDataCell::lifecycle`].

use crate::runner::Lifecycle;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteData<E, A> {
    /// Nothing requested yet.
    Initial,
    /// A request is in flight.
    Pending,
    /// The last request failed.
    Failure(E),
    /// The last request succeeded.
    Success(A),
}

impl<E, A> Default for RemoteData<E, A> {
    fn default() -> Self {
        RemoteData::Initial
    }
}

impl<E, A> RemoteData<E, A> {
    /// Exhaustive case analysis.
    pub fn fold<R>(
        &self,
        on_initial: impl FnOnce() -> R,
        on_pending: impl FnOnce() -> R,
        on_failure: impl FnOnce(&E) -> R,
        on_success: impl FnOnce(&A) -> R,
    ) -> R {
        match self {
            RemoteData::Initial => on_initial(),
            RemoteData::Pending => on_pending(),
            RemoteData::Failure(e) => on_failure(e),
            RemoteData::Success(a) => on_success(a),
        }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> RemoteData<E, B> {
        match self {
            RemoteData::Initial => RemoteData::Initial,
            RemoteData::Pending => RemoteData::Pending,
            RemoteData::Failure(e) => RemoteData::Failure(e),
            RemoteData::Success(a) => RemoteData::Success(f(a)),
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> RemoteData<F, A> {
        match self {
            RemoteData::Initial => RemoteData::Initial,
            RemoteData::Pending => RemoteData::Pending,
            RemoteData::Failure(e) => RemoteData::Failure(f(e)),
            RemoteData::Success(a) => RemoteData::Success(a),
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, RemoteData::Initial)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RemoteData::Pending)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RemoteData::Failure(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RemoteData::Success(_))
    }

    pub fn as_success(&self) -> Option<&A> {
        match self {
            RemoteData::Success(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_failure(&self) -> Option<&E> {
        match self {
            RemoteData::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl<E, A> From<Result<A, E>> for RemoteData<E, A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(a) => RemoteData::Success(a),
            Err(e) => RemoteData::Failure(e),
        }
    }
}

/// Shared, clonable `RemoteData` slot owned by a view.
#[derive(Debug)]
pub struct RemoteDataCell<E, A> {
    inner: Arc<Mutex<RemoteData<E, A>>>,
}

impl<E, A> Clone for RemoteDataCell<E, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, A> Default for RemoteDataCell<E, A> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RemoteData::Initial)),
        }
    }
}

impl<E, A> RemoteDataCell<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: RemoteData<E, A>) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn with<R>(&self, f: impl FnOnce(&RemoteData<E, A>) -> R) -> R {
        f(&self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Callbacks that move this cell through `Pending` to `Failure`/`Success`.
    pub fn lifecycle(&self) -> Lifecycle<E, A> {
        let pending = self.clone();
        let failure = self.clone();
        let success = self.clone();
        Lifecycle::new()
            .on_before(move || pending.set(RemoteData::Pending))
            .on_error(move |e| failure.set(RemoteData::Failure(e)))
            .on_success(move |a| success.set(RemoteData::Success(a)))
    }
}

impl<E: Clone, A: Clone> RemoteDataCell<E, A> {
    pub fn get(&self) -> RemoteData<E, A> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_initial() {
        let rd: RemoteData<String, u32> = RemoteData::default();
        assert!(rd.is_initial());
    }

    #[test]
    fn fold_visits_exactly_one_branch() {
        let render = |rd: &RemoteData<String, u32>| {
            rd.fold(
                || "welcome".to_string(),
                || "loading".to_string(),
                |e| format!("error: {e}"),
                |n| format!("got {n}"),
            )
        };
        assert_eq!(render(&RemoteData::Initial), "welcome");
        assert_eq!(render(&RemoteData::Pending), "loading");
        assert_eq!(render(&RemoteData::Failure("boom".into())), "error: boom");
        assert_eq!(render(&RemoteData::Success(3)), "got 3");
    }

    #[test]
    fn map_and_map_err_touch_only_their_side() {
        let ok: RemoteData<String, u32> = RemoteData::Success(2);
        assert_eq!(ok.map(|n| n * 10), RemoteData::Success(20));

        let err: RemoteData<String, u32> = RemoteData::Failure("x".into());
        assert_eq!(err.clone().map(|n| n * 10), RemoteData::Failure("x".into()));
        assert_eq!(err.map_err(|e| e.len()), RemoteData::<usize, u32>::Failure(1));

        let pending: RemoteData<String, u32> = RemoteData::Pending;
        assert!(pending.map(|n| n + 1).is_pending());
    }

    #[test]
    fn from_result() {
        let rd: RemoteData<&str, u32> = Ok(1).into();
        assert_eq!(rd.as_success(), Some(&1));
        let rd: RemoteData<&str, u32> = Err("no").into();
        assert_eq!(rd.as_failure(), Some(&"no"));
    }

    #[test]
    fn cell_lifecycle_drives_transitions() {
        let cell: RemoteDataCell<String, u32> = RemoteDataCell::new();
        let mut lifecycle = cell.lifecycle();

        lifecycle.before();
        assert!(cell.get().is_pending());

        lifecycle.complete(Ok(5));
        assert_eq!(cell.get(), RemoteData::Success(5));
    }
}

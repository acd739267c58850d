use crate::clients::BreedService;
use crate::model::Breed;
use effect_framework::{EffectRunner, RemoteData, RemoteDataCell, RunOutcome};
use std::fmt::Write;
use std::sync::Arc;

/// The breed list: fetches once per mount and renders whatever state it is in.
pub struct BreedsView<S: BreedService> {
    service: Arc<S>,
    state: RemoteDataCell<S::Error, Vec<Breed>>,
    runner: EffectRunner<()>,
    describe: fn(&S::Error) -> String,
}

impl<S> BreedsView<S>
where
    S: BreedService + 'static,
    S::Error: Clone,
{
    /// `describe` turns a failure into the line shown to the user.
    pub fn new(service: Arc<S>, describe: fn(&S::Error) -> String) -> Self {
        Self {
            service,
            state: RemoteDataCell::new(),
            runner: EffectRunner::new(),
            describe,
        }
    }

    /// Starts the fetch. The dependency list is empty, so later calls are skipped.
    pub fn load(&mut self) -> RunOutcome {
        self.runner.run(
            (),
            Arc::clone(&self.service),
            |service| async move { service.get_breeds().await },
            self.state.lifecycle(),
        )
    }

    /// Drops the current run, if any, and fetches again.
    pub fn reload(&mut self) -> RunOutcome {
        self.runner.cancel();
        self.load()
    }

    pub fn state(&self) -> RemoteData<S::Error, Vec<Breed>> {
        self.state.get()
    }

    pub fn render(&self) -> String {
        let body = self.state.with(|state| {
            state.fold(
                || "Welcome".to_string(),
                || "Loading...".to_string(),
                |e| (self.describe)(e),
                |breeds| render_breeds(breeds),
            )
        });
        format!("Breeds\n{body}")
    }
}

fn render_breeds(breeds: &[Breed]) -> String {
    let mut out = String::new();
    for breed in breeds {
        let _ = writeln!(out, "- {}", breed.name);
        for sub in &breed.sub_breeds {
            let _ = writeln!(out, "  - {sub}");
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBreeds {
        result: Result<Vec<Breed>, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BreedService for FixedBreeds {
        type Error = String;

        async fn get_breeds(&self) -> Result<Vec<Breed>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn view(result: Result<Vec<Breed>, String>) -> (BreedsView<FixedBreeds>, Arc<FixedBreeds>) {
        let service = Arc::new(FixedBreeds {
            result,
            calls: AtomicUsize::new(0),
        });
        (BreedsView::new(service.clone(), |e| format!("Oops: {e}")), service)
    }

    #[tokio::test]
    async fn renders_each_state() {
        let (mut view, _) = view(Ok(vec![
            Breed::new("hound").with_sub_breeds(["afghan", "basset"]),
            Breed::new("pug"),
        ]));
        assert_eq!(view.render(), "Breeds\nWelcome");

        let outcome = view.load();
        assert_eq!(view.render(), "Breeds\nLoading...");

        outcome.wait().await;
        assert_eq!(
            view.render(),
            "Breeds\n- hound\n  - afghan\n  - basset\n- pug"
        );
    }

    #[tokio::test]
    async fn renders_failures_through_describe() {
        let (mut view, _) = view(Err("offline".to_string()));
        view.load().wait().await;
        assert_eq!(view.render(), "Breeds\nOops: offline");
        assert!(view.state().is_failure());
    }

    #[tokio::test]
    async fn loads_once_per_mount() {
        let (mut view, service) = view(Ok(vec![]));
        view.load().wait().await;
        assert!(view.load().is_skipped());
        view.reload().wait().await;
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }
}

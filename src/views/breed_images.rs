use crate::clients::BreedImageService;
use crate::model::{Breed, Image};
use effect_framework::{EffectRunner, RemoteData, RemoteDataCell, RunOutcome};
use std::sync::Arc;

/// Pictures of the selected breed. Selecting another breed supersedes the pending fetch.
pub struct BreedImagesView<S: BreedImageService> {
    service: Arc<S>,
    selected: Option<String>,
    state: RemoteDataCell<S::Error, Vec<Image>>,
    runner: EffectRunner<String>,
    describe: fn(&S::Error) -> String,
}

impl<S> BreedImagesView<S>
where
    S: BreedImageService + 'static,
    S::Error: Clone,
{
    pub fn new(service: Arc<S>, describe: fn(&S::Error) -> String) -> Self {
        Self {
            service,
            selected: None,
            state: RemoteDataCell::new(),
            runner: EffectRunner::new(),
            describe,
        }
    }

    /// Fetches images for `breed` unless it is already the selected one.
    pub fn select(&mut self, breed: &Breed) -> RunOutcome {
        let outcome = self.runner.run(
            breed.name.clone(),
            (Arc::clone(&self.service), breed.clone()),
            |(service, breed)| async move { service.get_breed_images(&breed).await },
            self.state.lifecycle(),
        );
        self.selected = Some(breed.name.clone());
        outcome
    }

    pub fn state(&self) -> RemoteData<S::Error, Vec<Image>> {
        self.state.get()
    }

    pub fn render(&self) -> String {
        let title = match &self.selected {
            Some(name) => format!("Images: {name}"),
            None => "Images".to_string(),
        };
        let body = self.state.with(|state| {
            state.fold(
                || "Welcome".to_string(),
                || "Loading...".to_string(),
                |e| (self.describe)(e),
                |images| {
                    images
                        .iter()
                        .map(|image| image.url.as_str())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )
        });
        format!("{title}\n{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Answers each breed through a gate the test opens.
    #[derive(Default)]
    struct GatedImages {
        gates: Mutex<HashMap<String, oneshot::Receiver<Vec<String>>>>,
    }

    impl GatedImages {
        fn gate(&self, breed: &str) -> oneshot::Sender<Vec<String>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(breed.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl BreedImageService for GatedImages {
        type Error = String;

        async fn get_breed_images(&self, breed: &Breed) -> Result<Vec<Image>, String> {
            let gate = self.gates.lock().unwrap().remove(&breed.name);
            let urls = match gate {
                Some(rx) => rx.await.map_err(|_| "gate dropped".to_string())?,
                None => return Err(format!("no gate for {}", breed.name)),
            };
            Ok(urls.into_iter().map(|url| Image { url }).collect())
        }
    }

    #[tokio::test]
    async fn latest_selection_wins() {
        let service = Arc::new(GatedImages::default());
        let open_hound = service.gate("hound");
        let open_pug = service.gate("pug");
        let mut view = BreedImagesView::new(service, |e: &String| e.clone());

        let hound = view.select(&Breed::new("hound")).handle().unwrap();
        let pug = view.select(&Breed::new("pug")).handle().unwrap();

        open_pug.send(vec!["pug.jpg".to_string()]).unwrap();
        pug.wait().await;
        let _ = open_hound.send(vec!["hound.jpg".to_string()]);
        hound.wait().await;

        assert_eq!(view.render(), "Images: pug\npug.jpg");
    }

    #[tokio::test]
    async fn reselecting_the_same_breed_is_a_no_op() {
        let service = Arc::new(GatedImages::default());
        let open = service.gate("akita");
        let mut view = BreedImagesView::new(service, |e: &String| e.clone());

        let first = view.select(&Breed::new("akita"));
        assert!(view.select(&Breed::new("akita")).is_skipped());
        open.send(vec!["a.jpg".to_string()]).unwrap();
        first.wait().await;

        assert_eq!(view.state().as_success().map(Vec::len), Some(1));
    }
}

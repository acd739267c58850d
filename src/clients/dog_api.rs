use crate::clients::breed_service::{BreedImageService, BreedService};
use crate::model::{decode_breed_list, decode_image_list, Breed, Dog, Image};
use async_trait::async_trait;
use effect_framework::http::{get_json, send_json};
use effect_framework::{
    CacheService, HttpClient, HttpJsonError, JsonCodec, KeyNamespace, KeyValueStore,
};
use std::sync::Arc;
use urlencoding::encode;
use tracing::instrument;

pub type SharedStore = Arc<dyn KeyValueStore>;

const BREEDS: KeyNamespace = KeyNamespace::new("breeds");
const BREED_IMAGES: KeyNamespace = KeyNamespace::new("breedImages");
const DOGS: KeyNamespace = KeyNamespace::new("dogs");
const DOG: KeyNamespace = KeyNamespace::new("dog");

/// Whether the [`BreedService`]/[`BreedImageService`] impls go through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    ReadThrough,
    Bypass,
}

/// Client for the dog APIs, with cache-aside variants of every read.
#[derive(Clone)]
pub struct DogApi {
    http: Arc<dyn HttpClient>,
    cache: CacheService<SharedStore>,
    base_url: String,
    dogs_base_url: String,
    policy: CachePolicy,
}

impl DogApi {
    pub fn new(
        http: Arc<dyn HttpClient>,
        cache: CacheService<SharedStore>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            cache,
            dogs_base_url: base_url.clone(),
            base_url,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_dogs_base_url(mut self, dogs_base_url: impl Into<String>) -> Self {
        self.dogs_base_url = dogs_base_url.into();
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn cache(&self) -> &CacheService<SharedStore> {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn fetch_breeds(&self) -> Result<Vec<Breed>, HttpJsonError> {
        let url = format!("{}/breeds/list/all", self.base_url);
        send_json(&self.http, &url, decode_breed_list).await
    }

    pub async fn fetch_breeds_cached(&self) -> Result<Vec<Breed>, HttpJsonError> {
        self.cache
            .get_with_cache(&BREEDS.key(), &JsonCodec::new(), || self.fetch_breeds())
            .await
    }

    #[instrument(skip(self, breed), fields(breed = %breed.name))]
    pub async fn fetch_breed_images(&self, breed: &Breed) -> Result<Vec<Image>, HttpJsonError> {
        let url = format!("{}/breed/{}/images", self.base_url, encode(&breed.name));
        send_json(&self.http, &url, decode_image_list).await
    }

    pub async fn fetch_breed_images_cached(
        &self,
        breed: &Breed,
    ) -> Result<Vec<Image>, HttpJsonError> {
        self.cache
            .get_with_cache(
                &BREED_IMAGES.scoped(&breed.name),
                &JsonCodec::new(),
                || self.fetch_breed_images(breed),
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_dogs(&self) -> Result<Vec<Dog>, HttpJsonError> {
        get_json(&self.http, &format!("{}/dogs", self.dogs_base_url)).await
    }

    pub async fn fetch_dogs_cached(&self) -> Result<Vec<Dog>, HttpJsonError> {
        self.cache
            .get_with_cache(&DOGS.key(), &JsonCodec::new(), || self.fetch_dogs())
            .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_dog(&self, id: &str) -> Result<Dog, HttpJsonError> {
        let url = format!("{}/dogs/{}", self.dogs_base_url, encode(id));
        get_json(&self.http, &url).await
    }

    pub async fn fetch_dog_cached(&self, id: &str) -> Result<Dog, HttpJsonError> {
        self.cache
            .get_with_cache(&DOG.scoped(id), &JsonCodec::new(), || self.fetch_dog(id))
            .await
    }
}

#[async_trait]
impl BreedService for DogApi {
    type Error = HttpJsonError;

    async fn get_breeds(&self) -> Result<Vec<Breed>, HttpJsonError> {
        match self.policy {
            CachePolicy::ReadThrough => self.fetch_breeds_cached().await,
            CachePolicy::Bypass => self.fetch_breeds().await,
        }
    }
}

#[async_trait]
impl BreedImageService for DogApi {
    type Error = HttpJsonError;

    async fn get_breed_images(&self, breed: &Breed) -> Result<Vec<Image>, HttpJsonError> {
        match self.policy {
            CachePolicy::ReadThrough => self.fetch_breed_images_cached(breed).await,
            CachePolicy::Bypass => self.fetch_breed_images(breed).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effect_framework::mock::MockHttpClient;
    use effect_framework::MemoryStore;
    use serde_json::json;

    const BASE: &str = "http://api.test";

    fn api(mock: &MockHttpClient, store: &MemoryStore) -> DogApi {
        let shared: SharedStore = Arc::new(store.clone());
        DogApi::new(mock.client(), CacheService::new(shared), BASE)
    }

    #[tokio::test]
    async fn breed_images_are_cached_per_breed() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/breed/hound/images")
            .return_json(200, json!({"message": ["h1.jpg"]}));
        mock.expect_get("http://api.test/breed/akita/images")
            .return_json(200, json!({"message": ["a1.jpg", "a2.jpg"]}));
        let store = MemoryStore::new();
        let api = api(&mock, &store);

        let hound = Breed::new("hound");
        let akita = Breed::new("akita");
        assert_eq!(api.get_breed_images(&hound).await.unwrap().len(), 1);
        assert_eq!(api.get_breed_images(&akita).await.unwrap().len(), 2);
        assert_eq!(api.get_breed_images(&hound).await.unwrap()[0].url, "h1.jpg");

        assert_eq!(
            store.get_item("breedImages-hound").as_deref(),
            Some(r#"[{"url":"h1.jpg"}]"#)
        );
        assert!(store.get_item("breedImages-akita").is_some());
        assert_eq!(mock.request_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn path_segments_are_percent_encoded() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/breed/hound%2Fafghan/images")
            .return_json(200, json!({"message": []}));
        mock.expect_get("http://api.test/dogs/a%20b")
            .return_json(200, json!({"id": "a b", "name": "Rex", "breed": {"id": "1", "name": "pug"}}));
        let api = api(&mock, &MemoryStore::new());

        api.fetch_breed_images(&Breed::new("hound/afghan")).await.unwrap();
        assert_eq!(api.fetch_dog("a b").await.unwrap().name, "Rex");
        mock.verify();
    }

    #[tokio::test]
    async fn bypass_policy_always_hits_the_network() {
        let mut mock = MockHttpClient::new();
        for _ in 0..2 {
            mock.expect_get("http://api.test/breeds/list/all")
                .return_json(200, json!({"message": {"akita": []}}));
        }
        let store = MemoryStore::new();
        let api = api(&mock, &store).with_policy(CachePolicy::Bypass);

        api.get_breeds().await.unwrap();
        api.get_breeds().await.unwrap();

        assert_eq!(store.size(), 0);
        mock.verify();
    }

    #[tokio::test]
    async fn dogs_use_their_own_base_url_and_keys() {
        let dog = json!({"id": "7", "name": "Rex", "breed": {"id": "b1", "name": "akita"}});
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://dogs.test/dogs")
            .return_json(200, json!([dog.clone()]));
        mock.expect_get("http://dogs.test/dogs/7")
            .return_json(200, dog);
        let store = MemoryStore::new();
        let api = api(&mock, &store).with_dogs_base_url("http://dogs.test");

        let dogs = api.fetch_dogs_cached().await.unwrap();
        assert_eq!(dogs[0].breed.name, "akita");
        let rex = api.fetch_dog_cached("7").await.unwrap();
        assert_eq!(rex.name, "Rex");

        // served from the store this time
        assert_eq!(api.fetch_dog_cached("7").await.unwrap(), rex);
        assert!(store.get_item("dogs").is_some());
        assert!(store.get_item("dog-7").is_some());
        mock.verify();
    }

    #[tokio::test]
    async fn status_errors_surface_unchanged() {
        let mut mock = MockHttpClient::new();
        mock.expect_get("http://api.test/dogs/404")
            .return_json(404, json!({"status": "error"}));
        let api = api(&mock, &MemoryStore::new());

        let err = api.fetch_dog_cached("404").await.unwrap_err();
        assert!(matches!(err, HttpJsonError::ResponseStatus(ref e) if e.status == 404));
    }
}

use crate::clients::{CachePolicy, DogApi, SharedStore};
use crate::config::AppConfig;
use crate::error::AppError;
use effect_framework::{CacheService, FileStore, HttpClient, ReqwestHttpClient};
use std::sync::Arc;
use tracing::info;

/// Everything a command or view needs, wired once at startup.
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::from_args(cli.config)?;
/// let env = AppEnv::from_config(config, CachePolicy::ReadThrough)?;
///
/// let breeds = env.api.get_breeds().await?;
/// ```
#[derive(Clone)]
pub struct AppEnv {
    pub config: AppConfig,
    pub api: DogApi,
    store: SharedStore,
}

impl AppEnv {
    /// Production wiring: `reqwest` transport and the on-disk store.
    pub fn from_config(config: AppConfig, policy: CachePolicy) -> Result<Self, AppError> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(config.request_timeout)?);
        let store: SharedStore = Arc::new(FileStore::open(&config.storage_path)?);
        info!(
            base_url = %config.base_url,
            storage = %config.storage_path.display(),
            "Environment ready"
        );
        Self::with_parts(config, http, store, policy)
    }

    /// Wiring with caller-supplied transport and storage.
    pub fn with_parts(
        config: AppConfig,
        http: Arc<dyn HttpClient>,
        store: SharedStore,
        policy: CachePolicy,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let cache = CacheService::new(store.clone()).with_prefix(config.key_prefix.clone())?;
        let api = DogApi::new(http, cache, config.base_url.clone())
            .with_dogs_base_url(config.dogs_base_url.clone())
            .with_policy(policy);
        Ok(Self { config, api, store })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

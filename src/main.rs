//! # Breed Browser
//!
//! Command-line front end for the Dog CEO breed API.
//!
//! ```bash
//! RUST_LOG=info breed-browser breeds
//! breed-browser images hound
//! breed-browser --no-cache dog 42
//! breed-browser cache clear
//! ```

use breed_browser::clients::{CachePolicy, DogApi};
use breed_browser::config::{AppConfig, ConfigArgs};
use breed_browser::error::{user_message, AppError};
use breed_browser::model::{Breed, Dog};
use breed_browser::runtime::{setup_tracing, AppEnv};
use breed_browser::views::{BreedImagesView, BreedsView};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[derive(Debug, Parser)]
#[command(name = "breed-browser", version, about = "Browse dog breeds and their pictures")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Always hit the network and leave the cache untouched
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every breed with its sub-breeds
    Breeds,
    /// Show image URLs for one breed
    Images { breed: String },
    /// List dogs from the dogs endpoint
    Dogs,
    /// Show one dog by id
    Dog { id: String },
    /// Inspect or reset the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Remove every cached entry
    Clear,
    /// Print the number of cached entries
    Size,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let cli = Cli::parse();
    let policy = if cli.no_cache {
        CachePolicy::Bypass
    } else {
        CachePolicy::ReadThrough
    };

    let config = AppConfig::from_args(cli.config).map_err(|e| e.to_string())?;
    let env = AppEnv::from_config(config, policy).map_err(|e| e.to_string())?;
    info!(?policy, "Starting breed browser");

    run(&env, cli.command).await.map_err(|e| {
        error!(error = %e, "Command failed");
        e.to_string()
    })
}

async fn run(env: &AppEnv, command: Command) -> Result<(), AppError> {
    let api = Arc::new(env.api.clone());
    match command {
        Command::Breeds => {
            let mut view = BreedsView::new(api, user_message);
            view.load()
                .wait()
                .instrument(tracing::info_span!("breeds"))
                .await;
            println!("{}", view.render());
            into_result(view.state().as_failure())
        }
        Command::Images { breed } => {
            let mut view = BreedImagesView::new(api, user_message);
            view.select(&Breed::new(breed))
                .wait()
                .instrument(tracing::info_span!("breed_images"))
                .await;
            println!("{}", view.render());
            into_result(view.state().as_failure())
        }
        Command::Dogs => {
            for dog in dogs(&api).await? {
                print_dog(&dog);
            }
            Ok(())
        }
        Command::Dog { id } => {
            print_dog(&dog(&api, &id).await?);
            Ok(())
        }
        Command::Cache { action } => {
            let cache = api.cache();
            match action {
                CacheAction::Clear => {
                    cache.clear();
                    println!("Cache cleared");
                }
                CacheAction::Size => println!("{}", cache.size()),
            }
            Ok(())
        }
    }
}

async fn dogs(api: &DogApi) -> Result<Vec<Dog>, AppError> {
    let dogs = match api.policy() {
        CachePolicy::ReadThrough => api.fetch_dogs_cached().await?,
        CachePolicy::Bypass => api.fetch_dogs().await?,
    };
    Ok(dogs)
}

async fn dog(api: &DogApi, id: &str) -> Result<Dog, AppError> {
    let dog = match api.policy() {
        CachePolicy::ReadThrough => api.fetch_dog_cached(id).await?,
        CachePolicy::Bypass => api.fetch_dog(id).await?,
    };
    Ok(dog)
}

fn print_dog(dog: &Dog) {
    println!("{} ({}) - {}", dog.name, dog.id, dog.breed.name);
}

/// A rendered failure still ends the process with an error.
fn into_result(failure: Option<&effect_framework::HttpJsonError>) -> Result<(), AppError> {
    match failure {
        Some(e) => Err(AppError::Request(e.clone())),
        None => Ok(()),
    }
}

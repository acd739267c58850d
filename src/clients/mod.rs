//! # Domain Clients
//!
//! [`DogApi`] talks to the breeds and dogs APIs through an injected
//! [`HttpClient`](effect_framework::HttpClient) and puts a read-through cache in front of
//! every read. Stored keys:
//!
//! | Read | Endpoint | Key |
//! |------|----------|-----|
//! | breeds | `{base}/breeds/list/all` | `breeds` |
//! | breed images | `{base}/breed/{name}/images` | `breedImages-{name}` |
//! | dogs | `{dogs_base}/dogs` | `dogs` |
//! | dog | `{dogs_base}/dogs/{id}` | `dog-{id}` |
//!
//! Views depend on the [`BreedService`] and [`BreedImageService`] traits rather than on
//! `DogApi`, so tests can substitute their own sources.

pub mod breed_service;
pub mod dog_api;

pub use breed_service::{BreedImageService, BreedService};
pub use dog_api::{CachePolicy, DogApi, SharedStore};

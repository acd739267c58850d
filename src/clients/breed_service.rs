use crate::model::{Breed, Image};
use async_trait::async_trait;

/// Source of the breed list. The error type is left to the implementation.
#[async_trait]
pub trait BreedService: Send + Sync {
    type Error: Send + 'static;

    async fn get_breeds(&self) -> Result<Vec<Breed>, Self::Error>;
}

/// Source of pictures for one breed.
#[async_trait]
pub trait BreedImageService: Send + Sync {
    type Error: Send + 'static;

    async fn get_breed_images(&self, breed: &Breed) -> Result<Vec<Image>, Self::Error>;
}

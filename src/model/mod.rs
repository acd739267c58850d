//! Plain data carried between the API, the cache and the views.

pub mod breed;
pub mod dog;
pub mod image;

pub use breed::*;
pub use dog::*;
pub use image::*;

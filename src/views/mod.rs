//! # Views
//!
//! Terminal counterparts of UI components. A view owns a
//! [`RemoteDataCell`](effect_framework::RemoteDataCell) and an
//! [`EffectRunner`](effect_framework::EffectRunner); loading re-arms the runner, and
//! [`render`](BreedsView::render) folds the current state into text:
//!
//! | State | Rendered as |
//! |-------|-------------|
//! | `Initial` | `Welcome` |
//! | `Pending` | `Loading...` |
//! | `Failure(e)` | the view's `describe(e)` |
//! | `Success(items)` | one line per item |

pub mod breed_images;
pub mod breeds;

pub use breed_images::BreedImagesView;
pub use breeds::BreedsView;

//! Storage module for downloaded artifacts
//!
//! Every photo becomes `<dir>/<normalized-id>.png`, optionally accompanied by
//! `<dir>/<normalized-id>.caption`. The presence of the image file is the only
//! record that a photo was already harvested; there is no manifest. Images are
//! streamed into `<normalized-id>.png.part` and renamed once complete, so an
//! interrupted download never looks finished.

mod artifacts;

pub use artifacts::{
    normalize_identity, ArtifactStore, CAPTION_EXTENSION, IMAGE_EXTENSION, PARTIAL_EXTENSION,
};

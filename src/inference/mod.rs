//! Adapters over the external inference pipelines.
//!
//! [`TextModel`] and [`ImageModel`] expose the same `run` shape through
//! [`InferenceAdapter`]. They never return an error: backend failures come back as
//! [`Outcome::Failure`] so the caller can log them like any other result.

pub mod config;
pub mod detection;
pub mod summarization;

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::models::{Detection, ModelDescriptor, Summary};

pub use config::{InferenceConfig, ModelLoadError};
pub use detection::DetrDetector;
pub use summarization::BartSummarizer;

/// Result of a single adapter run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure(_) => None,
        }
    }
}

impl<T> From<anyhow::Result<T>> for Outcome<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(payload) => Outcome::Success(payload),
            Err(e) => Outcome::Failure(format!("{:#}", e)),
        }
    }
}

impl<T: Serialize> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(payload) => match serde_json::to_string(payload) {
                Ok(json) => f.write_str(&json),
                Err(e) => write!(f, "Error: failed to render result: {}", e),
            },
            Outcome::Failure(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Capability boundary for text summarization backends
pub trait Summarize {
    fn summarize(&self, text: &str) -> anyhow::Result<Vec<Summary>>;
}

/// Capability boundary for object detection backends
pub trait DetectObjects {
    fn detect_objects(&self, image_path: &Path) -> anyhow::Result<Vec<Detection>>;
}

/// Uniform `run` over one modality
pub trait InferenceAdapter {
    type Input: ?Sized;
    type Output: Serialize;

    fn descriptor(&self) -> &ModelDescriptor;

    fn run(&self, input: &Self::Input) -> Outcome<Self::Output>;
}

/// Summarization adapter
pub struct TextModel<S> {
    backend: S,
}

impl<S: Summarize> TextModel<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

impl<S: Summarize> InferenceAdapter for TextModel<S> {
    type Input = str;
    type Output = Vec<Summary>;

    fn descriptor(&self) -> &ModelDescriptor {
        &ModelDescriptor::TEXT
    }

    fn run(&self, text: &str) -> Outcome<Vec<Summary>> {
        log::debug!("Running text model on {} chars", text.len());
        let outcome = Outcome::from(self.backend.summarize(text));
        if let Outcome::Failure(reason) = &outcome {
            log::warn!("Text model failed: {}", reason);
        }
        outcome
    }
}

/// Object detection adapter
pub struct ImageModel<D> {
    backend: D,
}

impl<D: DetectObjects> ImageModel<D> {
    pub fn new(backend: D) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &D {
        &self.backend
    }
}

impl<D: DetectObjects> InferenceAdapter for ImageModel<D> {
    type Input = Path;
    type Output = Vec<Detection>;

    fn descriptor(&self) -> &ModelDescriptor {
        &ModelDescriptor::IMAGE
    }

    fn run(&self, image_path: &Path) -> Outcome<Vec<Detection>> {
        log::debug!("Running image model on {}", image_path.display());
        let outcome = Outcome::from(self.backend.detect_objects(image_path));
        if let Outcome::Failure(reason) = &outcome {
            log::warn!("Image model failed: {}", reason);
        }
        outcome
    }
}

#![deny(missing_docs)]
//! # Glance Vision-Language Inference
//!
//! Schema-driven single-shot inference against a compiled on-device
//! vision-language model bundle.
//!
//! The crate loads a model bundle, discovers its declared input/output
//! schema, resolves the output key, and runs exactly one synchronous
//! inference per call: image plus prompt in, one formatted display
//! string out.

/// Inference runtime backends.
pub mod backend;

/// Model bundle discovery and loading.
pub mod bundle;

/// Error types for loading and inference.
pub mod error;

/// Typed feature values exchanged with the model.
pub mod feature;

/// The model handle trait and conventional input keys.
pub mod model;

/// The single-shot inference runner.
pub mod runner;

/// Declared input/output schema types.
pub mod schema;

/// The display-thread hand-off.
pub mod sink;

pub use crate::bundle::{LoadedModel, Manifest, ModelBundle, BUNDLE_EXTENSION};
pub use crate::error::{ModelError, RunnerError};
pub use crate::feature::{FeatureBundle, FeatureValue, InferenceResult};
pub use crate::model::{InferenceModel, IMAGE_INPUT_KEY, PROMPT_INPUT_KEY};
pub use crate::runner::SingleShotRunner;
pub use crate::schema::{FeatureDesc, FeatureKind, Schema};
pub use crate::sink::{DisplaySink, TitleSink};

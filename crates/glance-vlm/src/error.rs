use std::path::PathBuf;

use glance_image::ImageError;

/// Errors produced while loading a model bundle or running an inference.
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// The bundle directory does not exist.
    #[error("Model bundle not found: {0}")]
    BundleNotFound(PathBuf),

    /// The bundle path does not carry the expected extension.
    #[error("Not a model bundle (expected a `.glance` directory): {0}")]
    InvalidBundleExtension(PathBuf),

    /// The bundle manifest could not be read.
    #[error("Failed to read bundle manifest: {0}")]
    ManifestRead(#[from] std::io::Error),

    /// The bundle manifest could not be parsed.
    #[error("Failed to parse bundle manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// The declared schema contains no outputs.
    #[error("Model schema declares no outputs")]
    NoDeclaredOutputs,

    /// The manifest pins an output name that the schema does not declare.
    #[error("Primary output `{0}` is not a declared output")]
    UnknownPrimaryOutput(String),

    /// The manifest names a backend this crate does not know.
    #[error("Unknown model backend `{0}`")]
    UnknownBackend(String),

    /// The manifest names a backend compiled out of this build.
    #[error("Model backend `{0}` is not compiled into this build")]
    BackendUnavailable(String),

    /// A backend artifact named by the manifest is missing on disk.
    #[error("Missing model artifact: {0}")]
    MissingArtifact(PathBuf),

    /// A feature does not match the declared schema.
    #[error("Feature `{name}` does not match the declared schema: {reason}")]
    FeatureMismatch {
        /// The offending feature name.
        name: String,
        /// Why the feature was rejected.
        reason: String,
    },

    /// The underlying runtime failed to execute the model.
    #[error("Inference runtime error: {0}")]
    Runtime(String),

    /// An error raised by ONNX Runtime.
    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    /// An error raised by the tokenizer.
    #[cfg(feature = "onnx")]
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] tokenizers::Error),
}

/// Errors produced by the single-shot inference runner.
#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    /// The source image could not be converted to the model-native buffer.
    #[error("Pixel buffer conversion failed: {0}")]
    Conversion(#[from] ImageError),

    /// The model rejected the inputs or failed at runtime.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The inference result did not contain the resolved output key.
    #[error("No feature found for output key `{0}`")]
    MissingOutput(String),
}

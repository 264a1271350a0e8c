//! Inference runtime backends.
//!
//! Backends own the runtime session for a compiled model bundle and are
//! selected by the bundle manifest's `backend` id. A bundle naming a
//! backend compiled out of this build fails to load with
//! [`crate::ModelError::BackendUnavailable`].

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxModel;

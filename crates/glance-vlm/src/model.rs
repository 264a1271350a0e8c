use crate::error::ModelError;
use crate::feature::{FeatureBundle, InferenceResult};
use crate::schema::Schema;

/// Default name of the image-typed model input, fixed by convention.
pub const IMAGE_INPUT_KEY: &str = "images";

/// Default name of the text-typed prompt input, fixed by convention.
pub const PROMPT_INPUT_KEY: &str = "prompt";

/// A loaded, immutable, reusable handle to a compiled inference artifact.
///
/// The handle is write-once read-many: it is created by the bundle loader
/// and safely shared for the lifetime of the process. One `predict` call
/// runs one synchronous inference on the calling thread.
pub trait InferenceModel: Send + Sync {
    /// The declared input/output schema of the model.
    fn schema(&self) -> &Schema;

    /// Run one synchronous inference over the given feature bundle.
    ///
    /// Implementations validate the bundle against the declared schema
    /// before running and block until a result set is available or an
    /// error occurs. No retry, no partial output.
    fn predict(&self, inputs: &FeatureBundle) -> Result<InferenceResult, ModelError>;
}

//! ONNX Runtime backend.

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use tokenizers::Tokenizer;

use crate::bundle::ModelBundle;
use crate::error::ModelError;
use crate::feature::{FeatureBundle, FeatureValue, InferenceResult};
use crate::model::InferenceModel;
use crate::schema::{FeatureKind, Schema};

/// A model handle backed by a single ONNX Runtime session.
///
/// The bundle's image input is fed as a `[1, H, W, 4]` BGRA u8 tensor and
/// the prompt as a `[1, N]` i64 token-id tensor produced by the bundle's
/// tokenizer. Text-typed outputs are decoded from i64 token ids through
/// the same tokenizer.
pub struct OnnxModel {
    session: Session,
    tokenizer: Tokenizer,
    schema: Schema,
}

impl OnnxModel {
    /// Load the session and tokenizer named by the bundle manifest.
    pub(crate) fn load(bundle: &ModelBundle) -> Result<Self, ModelError> {
        let manifest = bundle.manifest();

        let model_path = bundle.artifact_path(&manifest.artifacts.model);
        if !model_path.exists() {
            return Err(ModelError::MissingArtifact(model_path));
        }
        let tokenizer_path = bundle.artifact_path(&manifest.artifacts.tokenizer);
        if !tokenizer_path.exists() {
            return Err(ModelError::MissingArtifact(tokenizer_path));
        }

        log::info!("Loading compiled model graph from {}", model_path.display());
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)?;

        // the compiled graph must expose every declared feature by name
        for desc in &manifest.schema.inputs {
            if !session.inputs.iter().any(|input| input.name == desc.name) {
                return Err(ModelError::FeatureMismatch {
                    name: desc.name.clone(),
                    reason: "not an input of the compiled graph".to_string(),
                });
            }
        }
        for desc in &manifest.schema.outputs {
            if !session.outputs.iter().any(|output| output.name == desc.name) {
                return Err(ModelError::FeatureMismatch {
                    name: desc.name.clone(),
                    reason: "not an output of the compiled graph".to_string(),
                });
            }
        }

        let tokenizer = Tokenizer::from_file(&tokenizer_path)?;

        Ok(Self {
            session,
            tokenizer,
            schema: manifest.schema.clone(),
        })
    }
}

impl InferenceModel for OnnxModel {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn predict(&self, inputs: &FeatureBundle) -> Result<InferenceResult, ModelError> {
        self.schema.validate_inputs(inputs)?;

        let mut image = None;
        let mut prompt = None;
        for (name, value) in inputs.iter() {
            match value {
                FeatureValue::Image(buffer) => {
                    let shape = [1usize, buffer.height(), buffer.width(), 4];
                    let tensor =
                        ort::value::Tensor::from_array((shape, buffer.as_slice().to_vec()))?;
                    image = Some((name, tensor));
                }
                FeatureValue::Text(text) => {
                    let encoding = self.tokenizer.encode(text.as_str(), true)?;
                    let ids = encoding
                        .get_ids()
                        .iter()
                        .map(|&id| id as i64)
                        .collect::<Vec<_>>();
                    let shape = [1usize, ids.len()];
                    prompt = Some((name, ort::value::Tensor::from_array((shape, ids))?));
                }
                FeatureValue::MultiArray(_) => {
                    return Err(ModelError::Runtime(format!(
                        "multi-array input `{name}` is not supported by the onnx backend"
                    )));
                }
            }
        }

        let (Some((image_name, image_tensor)), Some((prompt_name, prompt_tensor))) =
            (image, prompt)
        else {
            return Err(ModelError::Runtime(
                "the onnx backend requires one image and one prompt input".to_string(),
            ));
        };

        let outputs = self.session.run(ort::inputs![
            image_name => image_tensor,
            prompt_name => prompt_tensor,
        ]?)?;

        let mut result = InferenceResult::new();
        for desc in &self.schema.outputs {
            let value = match desc.kind {
                FeatureKind::Text => {
                    let (_, ids) = outputs[desc.name.as_str()].try_extract_raw_tensor::<i64>()?;
                    let ids = ids.iter().map(|&id| id as u32).collect::<Vec<_>>();
                    FeatureValue::Text(self.tokenizer.decode(&ids, true)?)
                }
                FeatureKind::MultiArray => {
                    let (_, values) =
                        outputs[desc.name.as_str()].try_extract_raw_tensor::<f32>()?;
                    FeatureValue::MultiArray(values.to_vec())
                }
                FeatureKind::Image => {
                    return Err(ModelError::Runtime(format!(
                        "image-typed output `{}` is not supported by the onnx backend",
                        desc.name
                    )));
                }
            };
            result.insert(desc.name.clone(), value);
        }

        Ok(result)
    }
}

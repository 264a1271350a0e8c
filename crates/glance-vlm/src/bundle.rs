use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ModelError;
use crate::model::{InferenceModel, IMAGE_INPUT_KEY, PROMPT_INPUT_KEY};
use crate::schema::Schema;

/// Expected extension of a compiled model bundle directory.
pub const BUNDLE_EXTENSION: &str = "glance";

/// Name of the manifest file inside a bundle.
pub const MANIFEST_FILE: &str = "manifest.json";

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_tokenizer_file() -> String {
    "tokenizer.json".to_string()
}

fn default_image_key() -> String {
    IMAGE_INPUT_KEY.to_string()
}

fn default_prompt_key() -> String {
    PROMPT_INPUT_KEY.to_string()
}

/// Backend artifact file names within a bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifacts {
    /// Compiled model graph file name.
    #[serde(default = "default_model_file")]
    pub model: String,
    /// Tokenizer definition file name.
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer: String,
}

impl Default for Artifacts {
    fn default() -> Self {
        Self {
            model: default_model_file(),
            tokenizer: default_tokenizer_file(),
        }
    }
}

/// On-disk manifest of a compiled model bundle.
///
/// The manifest carries the model's own schema declaration; declaration
/// order is preserved and drives output-key selection.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Backend id that executes this bundle (e.g. `onnx`).
    pub backend: String,
    /// Declared input/output schema, in declaration order.
    #[serde(flatten)]
    pub schema: Schema,
    /// Explicit output selection; falls back to the first declared output.
    #[serde(default)]
    pub primary_output: Option<String>,
    /// Name of the image-typed input; `images` by convention.
    #[serde(default = "default_image_key")]
    pub image_input: String,
    /// Name of the text-typed prompt input; `prompt` by convention.
    #[serde(default = "default_prompt_key")]
    pub prompt_input: String,
    /// Backend artifact file names within the bundle.
    #[serde(default)]
    pub artifacts: Artifacts,
}

/// A loaded model plus the keys resolved from its schema.
pub struct LoadedModel {
    /// The model handle; write-once, reusable for the process lifetime.
    pub model: Box<dyn InferenceModel>,
    /// The resolved output key.
    pub output_key: String,
    /// Name of the image input.
    pub image_key: String,
    /// Name of the prompt input.
    pub prompt_key: String,
}

/// A compiled model bundle directory discovered on disk.
///
/// Opening a bundle parses its manifest and resolves the output key;
/// [`ModelBundle::load`] then constructs the backend and produces the
/// process-lifetime [`LoadedModel`]. All failures here are load-time
/// failures surfaced as errors at the entry boundary; the library never
/// aborts the process.
pub struct ModelBundle {
    path: PathBuf,
    manifest: Manifest,
    output_key: String,
}

impl ModelBundle {
    /// Open a bundle directory and parse its manifest.
    ///
    /// # Errors
    ///
    /// Missing directory, wrong extension, unreadable or unparsable
    /// manifest, a schema with zero declared outputs, and a
    /// `primary_output` naming an undeclared output are all load
    /// failures. No retry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::BundleNotFound(path.to_path_buf()));
        }
        if path
            .extension()
            .map_or(true, |ext| ext != BUNDLE_EXTENSION)
        {
            return Err(ModelError::InvalidBundleExtension(path.to_path_buf()));
        }

        let manifest_raw = fs::read_to_string(path.join(MANIFEST_FILE))?;
        let manifest: Manifest = serde_json::from_str(&manifest_raw)?;

        if manifest.schema.outputs.is_empty() {
            return Err(ModelError::NoDeclaredOutputs);
        }

        let output_key = match &manifest.primary_output {
            Some(name) => manifest
                .schema
                .output(name)
                .ok_or_else(|| ModelError::UnknownPrimaryOutput(name.clone()))?
                .name
                .clone(),
            None => manifest
                .schema
                .first_output()
                .ok_or(ModelError::NoDeclaredOutputs)?
                .name
                .clone(),
        };

        log::info!(
            "Model inputs: {:?}",
            manifest
                .schema
                .inputs
                .iter()
                .map(|desc| format!("{}: {:?}", desc.name, desc.kind))
                .collect::<Vec<_>>()
        );
        log::info!(
            "Model outputs: {:?}",
            manifest
                .schema
                .outputs
                .iter()
                .map(|desc| format!("{}: {:?}", desc.name, desc.kind))
                .collect::<Vec<_>>()
        );
        log::info!("Resolved output key: {output_key}");

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
            output_key,
        })
    }

    /// The bundle directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed bundle manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The declared input/output schema.
    pub fn schema(&self) -> &Schema {
        &self.manifest.schema
    }

    /// The resolved output key.
    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Absolute path of an artifact file within the bundle.
    pub(crate) fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Construct the backend and produce the process-lifetime model handle.
    ///
    /// # Errors
    ///
    /// An unknown backend id, a backend compiled out of this build, or a
    /// backend that fails to load its artifacts is a load failure.
    pub fn load(self) -> Result<LoadedModel, ModelError> {
        let model: Box<dyn InferenceModel> = match self.manifest.backend.as_str() {
            #[cfg(feature = "onnx")]
            "onnx" => Box::new(crate::backend::OnnxModel::load(&self)?),
            #[cfg(not(feature = "onnx"))]
            "onnx" => {
                return Err(ModelError::BackendUnavailable("onnx".to_string()));
            }
            other => return Err(ModelError::UnknownBackend(other.to_string())),
        };

        Ok(LoadedModel {
            model,
            output_key: self.output_key,
            image_key: self.manifest.image_input,
            prompt_key: self.manifest.prompt_input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "backend": "onnx",
        "inputs": [
            {"name": "images", "kind": "image"},
            {"name": "prompt", "kind": "text"}
        ],
        "outputs": [
            {"name": "answer", "kind": "text"},
            {"name": "logits", "kind": "multi_array"}
        ]
    }"#;

    fn write_bundle(dir: &Path, manifest: &str) -> PathBuf {
        let bundle_path = dir.join("model.glance");
        fs::create_dir(&bundle_path).unwrap();
        fs::write(bundle_path.join(MANIFEST_FILE), manifest).unwrap();
        bundle_path
    }

    #[test]
    fn open_missing_bundle() {
        let result = ModelBundle::open("/nonexistent/model.glance");
        assert!(matches!(result, Err(ModelError::BundleNotFound(_))));
    }

    #[test]
    fn open_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelBundle::open(dir.path());
        assert!(matches!(result, Err(ModelError::InvalidBundleExtension(_))));
    }

    #[test]
    fn open_unparsable_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), "not json");
        let result = ModelBundle::open(&bundle_path);
        assert!(matches!(result, Err(ModelError::ManifestParse(_))));
    }

    #[test]
    fn open_resolves_first_declared_output() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), MANIFEST);

        let bundle = ModelBundle::open(&bundle_path).unwrap();
        assert_eq!(bundle.output_key(), "answer");
        assert_eq!(bundle.manifest().image_input, "images");
        assert_eq!(bundle.manifest().prompt_input, "prompt");
        assert_eq!(bundle.manifest().artifacts.model, "model.onnx");
    }

    #[test]
    fn open_respects_reversed_declaration_order() {
        let manifest = r#"{
            "backend": "onnx",
            "inputs": [
                {"name": "images", "kind": "image"},
                {"name": "prompt", "kind": "text"}
            ],
            "outputs": [
                {"name": "logits", "kind": "multi_array"},
                {"name": "answer", "kind": "text"}
            ]
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), manifest);

        let bundle = ModelBundle::open(&bundle_path).unwrap();
        assert_eq!(bundle.output_key(), "logits");
    }

    #[test]
    fn open_respects_primary_output() {
        let manifest = r#"{
            "backend": "onnx",
            "inputs": [{"name": "images", "kind": "image"}],
            "outputs": [
                {"name": "logits", "kind": "multi_array"},
                {"name": "answer", "kind": "text"}
            ],
            "primary_output": "answer"
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), manifest);

        let bundle = ModelBundle::open(&bundle_path).unwrap();
        assert_eq!(bundle.output_key(), "answer");
    }

    #[test]
    fn open_rejects_unknown_primary_output() {
        let manifest = r#"{
            "backend": "onnx",
            "inputs": [{"name": "images", "kind": "image"}],
            "outputs": [{"name": "answer", "kind": "text"}],
            "primary_output": "caption"
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), manifest);

        let result = ModelBundle::open(&bundle_path);
        assert!(
            matches!(result, Err(ModelError::UnknownPrimaryOutput(name)) if name == "caption")
        );
    }

    #[test]
    fn open_rejects_empty_outputs() {
        let manifest = r#"{
            "backend": "onnx",
            "inputs": [{"name": "images", "kind": "image"}],
            "outputs": []
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), manifest);

        let result = ModelBundle::open(&bundle_path);
        assert!(matches!(result, Err(ModelError::NoDeclaredOutputs)));
    }

    #[test]
    fn load_rejects_unknown_backend() {
        let manifest = r#"{
            "backend": "vulkan",
            "inputs": [{"name": "images", "kind": "image"}],
            "outputs": [{"name": "answer", "kind": "text"}]
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), manifest);

        let result = ModelBundle::open(&bundle_path).unwrap().load();
        assert!(matches!(result, Err(ModelError::UnknownBackend(name)) if name == "vulkan"));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn load_reports_unavailable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = write_bundle(dir.path(), MANIFEST);

        let result = ModelBundle::open(&bundle_path).unwrap().load();
        assert!(matches!(result, Err(ModelError::BackendUnavailable(name)) if name == "onnx"));
    }
}

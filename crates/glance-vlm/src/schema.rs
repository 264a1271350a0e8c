use serde::Deserialize;

use crate::error::ModelError;
use crate::feature::{FeatureBundle, FeatureValue};

/// The declared kind of a named model feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// A 32-bit BGRA pixel buffer.
    Image,
    /// A UTF-8 text value.
    Text,
    /// A flat array of 32-bit floats.
    MultiArray,
}

/// A single named feature declared by the model schema.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureDesc {
    /// Declared feature name.
    pub name: String,
    /// Declared value kind.
    pub kind: FeatureKind,
    /// Declared shape, when the model pins one (`[height, width]` for images).
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
}

/// The declared input/output schema of a compiled model.
///
/// Read once at load time and immutable thereafter. Declaration order in
/// the bundle manifest is preserved, so "first declared output" is
/// deterministic on every platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    /// Declared inputs, in declaration order.
    pub inputs: Vec<FeatureDesc>,
    /// Declared outputs, in declaration order.
    pub outputs: Vec<FeatureDesc>,
}

impl Schema {
    /// Look up a declared input by name.
    pub fn input(&self, name: &str) -> Option<&FeatureDesc> {
        self.inputs.iter().find(|desc| desc.name == name)
    }

    /// Look up a declared output by name.
    pub fn output(&self, name: &str) -> Option<&FeatureDesc> {
        self.outputs.iter().find(|desc| desc.name == name)
    }

    /// The first declared output, if any.
    pub fn first_output(&self) -> Option<&FeatureDesc> {
        self.outputs.first()
    }

    /// Validate a feature bundle against the declared inputs.
    ///
    /// Every declared input must be present with the declared kind, image
    /// features must match the declared `[height, width]` shape when one
    /// is pinned, and the bundle must not carry undeclared names.
    pub fn validate_inputs(&self, bundle: &FeatureBundle) -> Result<(), ModelError> {
        for desc in &self.inputs {
            let value = bundle
                .get(&desc.name)
                .ok_or_else(|| ModelError::FeatureMismatch {
                    name: desc.name.clone(),
                    reason: "missing from the feature bundle".to_string(),
                })?;

            if value.kind() != desc.kind {
                return Err(ModelError::FeatureMismatch {
                    name: desc.name.clone(),
                    reason: format!("expected {:?}, got {:?}", desc.kind, value.kind()),
                });
            }

            if let (FeatureValue::Image(buffer), Some(shape)) = (value, &desc.shape) {
                if shape.len() != 2 || shape[0] != buffer.height() || shape[1] != buffer.width() {
                    return Err(ModelError::FeatureMismatch {
                        name: desc.name.clone(),
                        reason: format!(
                            "declared image shape {:?}, got [{}, {}]",
                            shape,
                            buffer.height(),
                            buffer.width()
                        ),
                    });
                }
            }
        }

        for name in bundle.names() {
            if self.input(name).is_none() {
                return Err(ModelError::FeatureMismatch {
                    name: name.to_string(),
                    reason: "not a declared input".to_string(),
                });
            }
        }

        Ok(())
    }
}

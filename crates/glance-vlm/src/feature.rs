use glance_image::PixelBuffer;

use crate::schema::FeatureKind;

/// A typed feature value passed to or returned from the model.
#[derive(Debug, Clone)]
pub enum FeatureValue {
    /// A model-native BGRA pixel buffer.
    Image(PixelBuffer),
    /// A UTF-8 text value.
    Text(String),
    /// A flat array of 32-bit floats.
    MultiArray(Vec<f32>),
}

impl FeatureValue {
    /// The declared kind this value satisfies.
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Image(_) => FeatureKind::Image,
            FeatureValue::Text(_) => FeatureKind::Text,
            FeatureValue::MultiArray(_) => FeatureKind::MultiArray,
        }
    }
}

/// The named set of typed inputs for one inference call.
///
/// Built fresh per call and discarded once the call returns. Insertion
/// order is preserved.
#[derive(Debug, Default)]
pub struct FeatureBundle {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named feature, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Iterate over the feature names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over the named features in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of features in the bundle.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The named set of typed outputs returned by one inference call.
#[derive(Debug, Default)]
pub struct InferenceResult {
    entries: Vec<(String, FeatureValue)>,
}

impl InferenceResult {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named output feature.
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.entries.push((name.into(), value));
    }

    /// Look up an output feature by name.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Iterate over the output names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

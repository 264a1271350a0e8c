use glance_image::{bgra_from_rgb8, bgra_from_rgba8, Image, PixelBuffer};

use crate::bundle::LoadedModel;
use crate::error::RunnerError;
use crate::feature::{FeatureBundle, FeatureValue};
use crate::sink::DisplaySink;

/// Runs exactly one inference for one image and one prompt.
///
/// The runner owns the Model Handle and the keys resolved at load time.
/// Each call converts the source bitmap to the model-native pixel buffer,
/// assembles a fresh feature bundle, invokes the model synchronously on
/// the calling thread, extracts the output key, and publishes the
/// formatted string through the given sink. A call either fully succeeds
/// (string published) or fully fails (error logged, nothing published).
pub struct SingleShotRunner {
    loaded: LoadedModel,
}

impl SingleShotRunner {
    /// Create a runner around a loaded model.
    pub fn new(loaded: LoadedModel) -> Self {
        Self { loaded }
    }

    /// The output key resolved at load time.
    pub fn output_key(&self) -> &str {
        &self.loaded.output_key
    }

    /// Run one inference over an opaque RGB8 bitmap.
    ///
    /// # Arguments
    ///
    /// * `image` - The decoded source bitmap, fed at its native resolution.
    /// * `prompt` - The question to ask about the image.
    /// * `sink` - Where the formatted result string is published.
    ///
    /// # Returns
    ///
    /// The formatted result string, also handed to the sink.
    pub fn run(
        &self,
        image: &Image<u8, 3>,
        prompt: &str,
        sink: &dyn DisplaySink,
    ) -> Result<String, RunnerError> {
        self.publish(self.infer_rgb8(image, prompt), sink)
    }

    /// Run one inference over an RGBA8 bitmap, premultiplying alpha.
    pub fn run_rgba(
        &self,
        image: &Image<u8, 4>,
        prompt: &str,
        sink: &dyn DisplaySink,
    ) -> Result<String, RunnerError> {
        self.publish(self.infer_rgba8(image, prompt), sink)
    }

    fn infer_rgb8(&self, image: &Image<u8, 3>, prompt: &str) -> Result<String, RunnerError> {
        let mut buffer = PixelBuffer::new(image.size())?;
        bgra_from_rgb8(image, &mut buffer)?;
        self.infer(buffer, prompt)
    }

    fn infer_rgba8(&self, image: &Image<u8, 4>, prompt: &str) -> Result<String, RunnerError> {
        let mut buffer = PixelBuffer::new(image.size())?;
        bgra_from_rgba8(image, &mut buffer)?;
        self.infer(buffer, prompt)
    }

    fn publish(
        &self,
        result: Result<String, RunnerError>,
        sink: &dyn DisplaySink,
    ) -> Result<String, RunnerError> {
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                log::error!("inference call aborted: {e}");
                return Err(e);
            }
        };

        log::info!("Prediction: {text}");
        sink.publish(text.clone());
        Ok(text)
    }

    fn infer(&self, buffer: PixelBuffer, prompt: &str) -> Result<String, RunnerError> {
        let mut inputs = FeatureBundle::new();
        inputs.insert(
            self.loaded.image_key.as_str(),
            FeatureValue::Image(buffer),
        );
        inputs.insert(
            self.loaded.prompt_key.as_str(),
            FeatureValue::Text(prompt.to_string()),
        );

        let outputs = self.loaded.model.predict(&inputs)?;

        let feature = outputs
            .get(&self.loaded.output_key)
            .ok_or_else(|| RunnerError::MissingOutput(self.loaded.output_key.clone()))?;

        Ok(format_feature(feature))
    }
}

/// Convert an output feature to a human-readable display string.
///
/// Text values are used as-is, numeric arrays get a default textual
/// rendering, and anything else falls back to a generic stringification.
fn format_feature(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Text(text) => text.clone(),
        FeatureValue::MultiArray(values) => format!("{values:?}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::feature::InferenceResult;
    use crate::model::{InferenceModel, IMAGE_INPUT_KEY, PROMPT_INPUT_KEY};
    use crate::schema::{FeatureDesc, FeatureKind, Schema};
    use crate::sink::TitleSink;
    use glance_image::ImageSize;

    struct StubModel {
        schema: Schema,
        outputs: Vec<(String, FeatureValue)>,
    }

    impl StubModel {
        fn returning(outputs: Vec<(String, FeatureValue)>) -> Self {
            Self {
                schema: Schema {
                    inputs: vec![
                        FeatureDesc {
                            name: IMAGE_INPUT_KEY.to_string(),
                            kind: FeatureKind::Image,
                            shape: None,
                        },
                        FeatureDesc {
                            name: PROMPT_INPUT_KEY.to_string(),
                            kind: FeatureKind::Text,
                            shape: None,
                        },
                    ],
                    outputs: vec![FeatureDesc {
                        name: "answer".to_string(),
                        kind: FeatureKind::Text,
                        shape: None,
                    }],
                },
                outputs,
            }
        }
    }

    impl InferenceModel for StubModel {
        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn predict(&self, inputs: &FeatureBundle) -> Result<InferenceResult, ModelError> {
            self.schema.validate_inputs(inputs)?;

            let mut result = InferenceResult::new();
            for (name, value) in &self.outputs {
                result.insert(name.clone(), value.clone());
            }
            Ok(result)
        }
    }

    fn runner(model: StubModel) -> SingleShotRunner {
        SingleShotRunner::new(LoadedModel {
            model: Box::new(model),
            output_key: "answer".to_string(),
            image_key: IMAGE_INPUT_KEY.to_string(),
            prompt_key: PROMPT_INPUT_KEY.to_string(),
        })
    }

    fn test_image(width: usize, height: usize) -> Image<u8, 3> {
        Image::from_size_val(ImageSize { width, height }, 127u8).unwrap()
    }

    #[test]
    fn publishes_text_output() {
        let runner = runner(StubModel::returning(vec![(
            "answer".to_string(),
            FeatureValue::Text("Yes, there is enough space.".to_string()),
        )]));
        let (sink, titles) = TitleSink::channel();

        let text = runner
            .run(&test_image(640, 480), "is there enough space?", &sink)
            .unwrap();

        assert_eq!(text, "Yes, there is enough space.");
        assert_eq!(titles.try_recv().unwrap(), "Yes, there is enough space.");
    }

    #[test]
    fn renders_multi_array_output() {
        let runner = runner(StubModel::returning(vec![(
            "answer".to_string(),
            FeatureValue::MultiArray(vec![0.5, 1.0]),
        )]));
        let (sink, _titles) = TitleSink::channel();

        let text = runner.run(&test_image(2, 2), "logits?", &sink).unwrap();
        assert_eq!(text, "[0.5, 1.0]");
    }

    #[test]
    fn missing_output_key_publishes_nothing() {
        let runner = runner(StubModel::returning(vec![]));
        let (sink, titles) = TitleSink::channel();

        let result = runner.run(&test_image(4, 4), "anything", &sink);
        assert!(
            matches!(result, Err(RunnerError::MissingOutput(key)) if key == "answer")
        );
        assert!(titles.try_recv().is_err());
    }

    #[test]
    fn zero_sized_image_is_a_conversion_error() {
        let runner = runner(StubModel::returning(vec![]));
        let (sink, titles) = TitleSink::channel();

        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 0,
                height: 4,
            },
            vec![],
        )
        .unwrap();

        let result = runner.run(&image, "anything", &sink);
        assert!(matches!(result, Err(RunnerError::Conversion(_))));
        assert!(titles.try_recv().is_err());
    }

    #[test]
    fn rgba_source_runs_through_premultiply() {
        let runner = runner(StubModel::returning(vec![(
            "answer".to_string(),
            FeatureValue::Text("ok".to_string()),
        )]));
        let (sink, titles) = TitleSink::channel();

        let image = Image::<u8, 4>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            255u8,
        )
        .unwrap();

        let text = runner.run_rgba(&image, "anything", &sink).unwrap();
        assert_eq!(text, "ok");
        assert_eq!(titles.try_recv().unwrap(), "ok");
    }
}

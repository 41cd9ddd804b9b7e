use image::imageops::FilterType;
use log::{debug, info};
use shared::{PredictionResponse, UserInputs};
use std::sync::Arc;

use crate::inference::config::{ConfigError, PipelineConfig};
use crate::inference::features::{AgeScaler, InvalidAgeError, build_features};
use crate::inference::model::{Classifier, InferenceError, invoke};
use crate::inference::preprocess::{DecodeError, preprocess};
use crate::knowledge::KnowledgeBase;
use crate::ranking::build_response;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    InvalidAge(#[from] InvalidAgeError),
    #[error("Model not initialized")]
    ModelUnavailable,
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Image + patient attributes in, ranked and annotated diagnoses out.
///
/// The classifier is optional: a process whose model failed to load still
/// serves requests, answering each with `ModelUnavailable`.
#[derive(Clone)]
pub struct Pipeline {
    classifier: Option<Arc<dyn Classifier>>,
    knowledge: Arc<KnowledgeBase>,
    scaler: AgeScaler,
    filter: FilterType,
}

impl Pipeline {
    pub fn new(
        classifier: Option<Arc<dyn Classifier>>,
        knowledge: Arc<KnowledgeBase>,
        config: &PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier,
            knowledge,
            scaler: config.age_scaler,
            filter: config.resize_filter()?,
        })
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn predict(
        &self,
        image: &[u8],
        user_inputs: UserInputs,
    ) -> Result<PredictionResponse, PipelineError> {
        let classifier = self
            .classifier
            .as_deref()
            .ok_or(PipelineError::ModelUnavailable)?;

        let image_tensor = preprocess(image, self.filter)?;
        let features = build_features(&user_inputs, &self.scaler)?;
        debug!(
            "Image shape: {:?}, mean intensity {:.3}",
            image_tensor.shape(),
            image_tensor.as_array().mean().unwrap_or_default()
        );
        debug!(
            "User inputs shape: {:?}, values {:?}",
            features.shape(),
            features.as_array().row(0).to_vec()
        );

        let scores = invoke(classifier, &image_tensor, &features)?;
        debug!("Class scores: {:?}", scores);

        let response = build_response(&scores, &self.knowledge, user_inputs);
        info!(
            "Generated {} predictions, top: {}",
            response.predictions.len(),
            response
                .predictions
                .first()
                .map(|p| p.diagnosis.as_str())
                .unwrap_or("none")
        );
        Ok(response)
    }
}

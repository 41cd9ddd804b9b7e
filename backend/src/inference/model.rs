use shared::NUM_DIAGNOSES;

use super::features::FeatureVector;
use super::preprocess::ImageTensor;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Model lock poisoned by a previous failure")]
    LockPoisoned,
    #[error("Expected {expected} class scores, model returned {actual}")]
    OutputShape { expected: usize, actual: usize },
    #[error("Model returned a non-finite score at index {0}")]
    NonFinite(usize),
    #[error("Model returned a score outside [0, 1] at index {0}")]
    OutOfRange(usize),
}

/// A loaded model that scores one image together with its patient features.
///
/// Implementations must be callable from several request workers at once;
/// backends that are not re-entrant serialize calls internally.
pub trait Classifier: Send + Sync {
    fn infer(
        &self,
        image: &ImageTensor,
        features: &FeatureVector,
    ) -> Result<Vec<f32>, InferenceError>;
}

/// Runs the classifier and checks that it produced one probability in
/// `[0, 1]` per diagnosis code.
pub fn invoke(
    classifier: &dyn Classifier,
    image: &ImageTensor,
    features: &FeatureVector,
) -> Result<Vec<f32>, InferenceError> {
    let scores = classifier.infer(image, features)?;
    if scores.len() != NUM_DIAGNOSES {
        return Err(InferenceError::OutputShape {
            expected: NUM_DIAGNOSES,
            actual: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|score| !score.is_finite()) {
        return Err(InferenceError::NonFinite(index));
    }
    if let Some(index) = scores
        .iter()
        .position(|score| !(0.0..=1.0).contains(score))
    {
        return Err(InferenceError::OutOfRange(index));
    }
    Ok(scores)
}

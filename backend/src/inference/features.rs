use ndarray::{Array2, array};
use serde::{Deserialize, Serialize};
use shared::{BodySite, CategoryCode, Sex, UserInputs};

/// Width of the tabular model input: age, sex, body site and one zero pad.
pub const FEATURE_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
#[error("Invalid age '{value}': expected a non-negative number")]
pub struct InvalidAgeError {
    pub value: String,
}

/// Standardizes age with statistics captured from the training set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgeScaler {
    pub mean: f32,
    pub std: f32,
}

impl Default for AgeScaler {
    fn default() -> Self {
        Self {
            mean: 51.86,
            std: 16.97,
        }
    }
}

impl AgeScaler {
    pub fn transform(&self, age: f32) -> f32 {
        (age - self.mean) / self.std
    }
}

/// Batched `(1, 4)` patient feature row.
#[derive(Debug, Clone)]
pub struct FeatureVector(Array2<f32>);

impl FeatureVector {
    pub fn new(scaled_age: f32, sex_code: u8, site_code: u8) -> Self {
        Self(array![[scaled_age, sex_code as f32, site_code as f32, 0.0]])
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }
}

pub fn parse_age(raw: &str) -> Result<f32, InvalidAgeError> {
    match raw.trim().parse::<f32>() {
        Ok(age) if age.is_finite() && age >= 0.0 => Ok(age),
        _ => Err(InvalidAgeError {
            value: raw.to_string(),
        }),
    }
}

pub fn build_features(
    inputs: &UserInputs,
    scaler: &AgeScaler,
) -> Result<FeatureVector, InvalidAgeError> {
    let age = parse_age(&inputs.age)?;
    Ok(FeatureVector::new(
        scaler.transform(age),
        Sex::encode(&inputs.sex),
        BodySite::encode(&inputs.localization),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(age: &str, sex: &str, localization: &str) -> UserInputs {
        UserInputs {
            age: age.into(),
            sex: sex.into(),
            localization: localization.into(),
        }
    }

    #[test]
    fn builds_scaled_row_with_zero_pad() {
        let scaler = AgeScaler {
            mean: 40.0,
            std: 10.0,
        };
        let features = build_features(&inputs("45", "Female", "Back"), &scaler).unwrap();
        assert_eq!(features.shape(), &[1, FEATURE_LEN]);
        let row: Vec<f32> = features.as_array().iter().copied().collect();
        assert_eq!(row, vec![0.5, 1.0, 3.0, 0.0]);
    }

    #[test]
    fn age_depends_on_input_not_constant() {
        let scaler = AgeScaler::default();
        let young = build_features(&inputs("20", "male", "face"), &scaler).unwrap();
        let old = build_features(&inputs("80", "male", "face"), &scaler).unwrap();
        assert!(young.as_array()[[0, 0]] < 0.0);
        assert!(old.as_array()[[0, 0]] > 0.0);
    }

    #[test]
    fn unknown_categories_default_to_zero() {
        let features =
            build_features(&inputs("30", "other", "left_knee"), &AgeScaler::default()).unwrap();
        assert_eq!(features.as_array()[[0, 1]], 0.0);
        assert_eq!(features.as_array()[[0, 2]], 0.0);
    }

    #[test]
    fn accepts_fractional_and_padded_age() {
        assert_eq!(parse_age(" 42.5 ").unwrap(), 42.5);
        assert_eq!(parse_age("0").unwrap(), 0.0);
    }

    #[test]
    fn rejects_unparseable_age() {
        for raw in ["", "forty", "NaN", "inf", "-3"] {
            let err = parse_age(raw).unwrap_err();
            assert_eq!(err.value, raw);
        }
        assert!(build_features(&inputs("abc", "male", "back"), &AgeScaler::default()).is_err());
    }
}

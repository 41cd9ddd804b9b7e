use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

/// Label vocabulary of the classifier. Declaration order is the order of the
/// model's output vector and must only change together with the model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
    Display, AsRefStr, EnumCount,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiagnosisCode {
    Akiec,
    Bcc,
    Bkl,
    Df,
    Nv,
    Vasc,
    Mel,
}

/// Length of the classifier's probability vector.
pub const NUM_DIAGNOSES: usize = <DiagnosisCode as EnumCount>::COUNT;

impl DiagnosisCode {
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Sex {
    #[default]
    Male = 0,
    Female = 1,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr,
    EnumCount,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum BodySite {
    #[default]
    Scalp = 0,
    Ear = 1,
    Face = 2,
    Back = 3,
    Trunk = 4,
    Chest = 5,
    UpperExtremity = 6,
    Abdomen = 7,
    LowerExtremity = 8,
    Genital = 9,
    Neck = 10,
    Hand = 11,
    Foot = 12,
    Acral = 13,
}

/// Total over every input string: anything outside the vocabulary falls back
/// to the first category.
pub trait CategoryCode: FromStr + Default + Copy {
    fn code(self) -> u8;

    fn encode(raw: &str) -> u8 {
        Self::from_str(raw.trim()).unwrap_or_default().code()
    }
}

impl CategoryCode for Sex {
    fn code(self) -> u8 {
        self as u8
    }
}

impl CategoryCode for BodySite {
    fn code(self) -> u8 {
        self as u8
    }
}

/// Clinical risk band. Variants are declared in ascending order of severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub enum RiskLevel {
    #[serde(rename = "Low")]
    #[strum(serialize = "Low")]
    Low,
    #[serde(rename = "Low to Medium")]
    #[strum(serialize = "Low to Medium")]
    LowToMedium,
    #[serde(rename = "Medium")]
    #[strum(serialize = "Medium")]
    Medium,
    #[serde(rename = "Medium to High")]
    #[strum(serialize = "Medium to High")]
    MediumToHigh,
    #[serde(rename = "High")]
    #[strum(serialize = "High")]
    High,
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub diagnosis: String,
    pub probability: f32,
    pub risk_level: RiskLevel,
    pub description: String,
    pub treatments: Vec<String>,
}

/// Patient attributes exactly as the caller supplied them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserInputs {
    pub age: String,
    pub sex: String,
    pub localization: String,
}

impl Default for UserInputs {
    fn default() -> Self {
        Self {
            age: "30".into(),
            sex: "male".into(),
            localization: "back".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub predictions: Vec<Prediction>,
    pub user_inputs: UserInputs,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_order_matches_model_output() {
        let codes: Vec<String> = DiagnosisCode::iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, ["akiec", "bcc", "bkl", "df", "nv", "vasc", "mel"]);
        assert_eq!(DiagnosisCode::COUNT, 7);
        assert_eq!(DiagnosisCode::from_index(6), Some(DiagnosisCode::Mel));
        assert_eq!(DiagnosisCode::from_index(7), None);
        assert_eq!(DiagnosisCode::from_index(5), Some(DiagnosisCode::Vasc));
    }

    #[test]
    fn sex_encoding_ignores_case() {
        for raw in ["Male", "male", "MALE"] {
            assert_eq!(Sex::encode(raw), 0);
        }
        assert_eq!(Sex::encode("Female"), 1);
        assert_eq!(Sex::encode(" female "), 1);
        assert_eq!(Sex::encode("unknown"), 0);
        assert_eq!(Sex::encode(""), 0);
    }

    #[test]
    fn body_site_encoding_covers_vocabulary() {
        assert_eq!(BodySite::COUNT, 14);
        for (expected, site) in BodySite::iter().enumerate() {
            assert_eq!(BodySite::encode(site.as_ref()) as usize, expected);
        }
        assert_eq!(BodySite::encode("Back"), 3);
        assert_eq!(BodySite::encode("UPPER_EXTREMITY"), 6);
        assert_eq!(BodySite::encode("acral"), 13);
        assert_eq!(BodySite::encode("elbow"), 0);
    }

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::LowToMedium);
        assert!(RiskLevel::Medium < RiskLevel::MediumToHigh);
        assert!(RiskLevel::High < RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::VeryHigh.to_string(), "Very High");
    }

    #[test]
    fn response_uses_camel_case_fields() {
        let response = PredictionResponse {
            predictions: vec![Prediction {
                diagnosis: "Melanoma".into(),
                probability: 0.7,
                risk_level: RiskLevel::VeryHigh,
                description: "d".into(),
                treatments: vec!["Surgery".into()],
            }],
            user_inputs: UserInputs::default(),
            recommendations: vec![],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["predictions"][0]["riskLevel"], "Very High");
        assert_eq!(value["userInputs"]["localization"], "back");
        assert!(value.get("recommendations").is_some());
    }
}

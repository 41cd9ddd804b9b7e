use lazy_static::lazy_static;
use shared::{DiagnosisCode, RiskLevel};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionInfo {
    pub name: &'static str,
    pub risk_level: RiskLevel,
    pub description: &'static str,
    pub treatments: &'static [&'static str],
}

/// Read-only clinical metadata keyed by diagnosis code.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    conditions: HashMap<DiagnosisCode, ConditionInfo>,
}

lazy_static! {
    static ref CLINICAL: Arc<KnowledgeBase> = Arc::new(KnowledgeBase::new(clinical_entries()));
}

impl KnowledgeBase {
    pub fn new(entries: impl IntoIterator<Item = (DiagnosisCode, ConditionInfo)>) -> Self {
        Self {
            conditions: entries.into_iter().collect(),
        }
    }

    /// The shipped table covering every diagnosis code the classifier emits.
    pub fn clinical() -> Arc<KnowledgeBase> {
        CLINICAL.clone()
    }

    pub fn get(&self, code: DiagnosisCode) -> Option<&ConditionInfo> {
        self.conditions.get(&code)
    }
}

fn clinical_entries() -> Vec<(DiagnosisCode, ConditionInfo)> {
    vec![
        (
            DiagnosisCode::Akiec,
            ConditionInfo {
                name: "Actinic Keratoses & Intraepithelial Carcinoma",
                risk_level: RiskLevel::MediumToHigh,
                description: "Precancerous lesions arising from prolonged UV exposure. Can progress to intraepithelial carcinoma/Bowen's disease, where atypical cells invade the epidermis.",
                treatments: &[
                    "Topical treatments (Fluorouracil, imiquimod, diclofenac)",
                    "Photodynamic therapy (PDT)",
                    "Surgical excision",
                    "Cryotherapy",
                    "Curettage and electrodesiccation",
                ],
            },
        ),
        (
            DiagnosisCode::Bcc,
            ConditionInfo {
                name: "Basal Cell Carcinoma",
                risk_level: RiskLevel::High,
                description: "The most common type of skin cancer that causes lumps, bumps or lesions on the epidermis. Appears in sun-exposed areas. Types include nodular, superficial spreading, sclerosing, and pigmented.",
                treatments: &[
                    "Electrodessication and curettage",
                    "Surgery",
                    "Cryotherapy",
                    "Chemotherapy",
                    "Photodynamic therapy",
                    "Laser therapy",
                ],
            },
        ),
        (
            DiagnosisCode::Bkl,
            ConditionInfo {
                name: "Benign Keratosis-like Lesions",
                risk_level: RiskLevel::Low,
                description: "Common, harmless skin growths appearing as small, dark or light brown patches or bumps. Includes solar lentigines, seborrheic keratoses, and lichen-planus like keratoses.",
                treatments: &[
                    "Electrodesiccation and curettage",
                    "Cryosurgery",
                    "Topical 5-Fluorouracil",
                    "Laser resurfacing",
                    "Dermabrasion",
                    "Observation (if asymptomatic)",
                ],
            },
        ),
        (
            DiagnosisCode::Df,
            ConditionInfo {
                name: "Dermatofibroma",
                risk_level: RiskLevel::Low,
                description: "Common benign fibrous nodule usually found on the legs. Size varies from 0.5-1.5 cm diameter. Shows characteristic dimpling when pinched. Can appear pink to light brown in white skin, and dark brown to black in dark skin.",
                treatments: &[
                    "Surgical removal (if symptomatic)",
                    "Cryotherapy",
                    "Shave biopsy",
                    "Laser treatments",
                    "Observation (most cases)",
                ],
            },
        ),
        (
            DiagnosisCode::Nv,
            ConditionInfo {
                name: "Melanocytic Nevi",
                risk_level: RiskLevel::LowToMedium,
                description: "Common benign skin lesions (moles) due to local proliferation of pigment cells (melanocytes). Can be present at birth (congenital) or appear later (acquired). Contains melanin pigment.",
                treatments: &[
                    "Excision biopsy (for suspicious moles)",
                    "Shave biopsy",
                    "Electrosurgical destruction",
                    "Laser treatment",
                    "Regular monitoring",
                ],
            },
        ),
        (
            DiagnosisCode::Vasc,
            ConditionInfo {
                name: "Vascular Lesions",
                risk_level: RiskLevel::LowToMedium,
                description: "Abnormal growths of blood vessels in the skin. Includes angiomas (cherry hemangiomas), angiokeratomas, pyogenic granulomas, and hemorrhage conditions.",
                treatments: &[
                    "Observation for benign angiomas",
                    "Surgical excision",
                    "Cryotherapy",
                    "Laser therapy",
                    "Treatment of underlying cause for hemorrhage",
                ],
            },
        ),
        (
            DiagnosisCode::Mel,
            ConditionInfo {
                name: "Melanoma",
                risk_level: RiskLevel::VeryHigh,
                description: "The most dangerous type of skin cancer that begins in melanocytes (pigment-making cells). Can develop in eyes, mouth, genitals, and anal area. Early detection is crucial for successful treatment.",
                treatments: &[
                    "Surgery to remove cancerous lesion",
                    "Chemotherapy",
                    "Targeted therapy",
                    "Immunotherapy (biologic therapy)",
                    "Regular monitoring post-treatment",
                ],
            },
        ),
    ]
}

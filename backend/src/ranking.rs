use log::warn;
use shared::{DiagnosisCode, Prediction, PredictionResponse, UserInputs};
use std::cmp::Ordering;

use crate::knowledge::KnowledgeBase;

pub const TOP_K: usize = 3;

pub const RECOMMENDATIONS: [&str; 3] = [
    "Consult with a healthcare professional for proper diagnosis",
    "Regular skin examinations are recommended",
    "Document any changes in skin lesions",
];

/// Highest `k` scores, descending. Equal scores keep vocabulary order.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(DiagnosisCode, f32)> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable, so ties stay in index order
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
    });
    order
        .into_iter()
        .filter_map(|index| DiagnosisCode::from_index(index).map(|code| (code, scores[index])))
        .take(k)
        .collect()
}

pub fn enrich(ranked: &[(DiagnosisCode, f32)], knowledge: &KnowledgeBase) -> Vec<Prediction> {
    ranked
        .iter()
        .filter_map(|&(code, probability)| {
            let Some(info) = knowledge.get(code) else {
                warn!("No clinical entry for diagnosis code {}, skipping", code);
                return None;
            };
            Some(Prediction {
                diagnosis: info.name.to_string(),
                probability,
                risk_level: info.risk_level,
                description: info.description.to_string(),
                treatments: info.treatments.iter().map(|t| t.to_string()).collect(),
            })
        })
        .collect()
}

pub fn build_response(
    scores: &[f32],
    knowledge: &KnowledgeBase,
    user_inputs: UserInputs,
) -> PredictionResponse {
    PredictionResponse {
        predictions: enrich(&top_k(scores, TOP_K), knowledge),
        user_inputs,
        recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
    }
}

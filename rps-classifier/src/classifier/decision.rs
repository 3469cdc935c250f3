//! Turn a model score vector into a labelled prediction

use serde::{Serialize, Serializer};

use super::labels::{LabelSet, UNKNOWN_LABEL};
use super::ClassifyError;

/// Result of classifying one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Class name, or `"unknown"` when confidence is below the threshold
    pub label: String,
    /// Score of the winning class
    #[serde(serialize_with = "serialize_widened")]
    pub confidence: f32,
    /// Winning output index (reported even when the label is unknown)
    #[serde(skip)]
    pub class_index: usize,
}

impl Prediction {
    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }
}

fn serialize_widened<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(f64::from(*value))
}

/// Index and value of the highest score
///
/// Ties go to the lowest index. NaN never wins; an all-NaN vector yields `None`.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .fold(None, |best, (index, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((index, score)),
        })
}

/// Pick the best class and apply the confidence threshold
///
/// A confidence exactly equal to the threshold keeps the class label.
pub fn decide(
    scores: &[f32],
    labels: &LabelSet,
    threshold: f32,
) -> Result<Prediction, ClassifyError> {
    let (class_index, confidence) = argmax(scores).ok_or(ClassifyError::EmptyOutput)?;

    let class_label = labels
        .get(class_index)
        .ok_or(ClassifyError::LabelOutOfRange {
            index: class_index,
            labels: labels.names().len(),
        })?;

    let label = if confidence < threshold {
        UNKNOWN_LABEL
    } else {
        class_label
    };

    Ok(Prediction {
        label: label.to_string(),
        confidence,
        class_index,
    })
}

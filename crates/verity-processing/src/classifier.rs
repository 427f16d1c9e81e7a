use verity_core::models::LabelSet;
use verity_core::PipelineError;

use crate::codec::ImageTensor;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Model not loaded")]
    Unavailable,

    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl From<ClassifierError> for PipelineError {
    fn from(err: ClassifierError) -> Self {
        PipelineError::ModelUnavailable(err.to_string())
    }
}

/// Scores an image tensor against the configured label set.
///
/// Implementations are shared across request tasks and called from blocking
/// threads, so they must be `Send + Sync`.
pub trait Classifier: Send + Sync {
    /// One score per label, in label-set index order.
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>, ClassifierError>;

    /// Whether a model is loaded and `predict` can succeed.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Stand-in used when no model could be loaded at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClassifier;

impl Classifier for UnavailableClassifier {
    fn predict(&self, _tensor: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        Err(ClassifierError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Winning label of a score vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub index: usize,
    pub label: String,
    /// Winning score clamped to `[0, 1]`
    pub confidence: f64,
}

/// Argmax over `scores`; the lowest index wins ties.
///
/// Scores beyond the label set are ignored. A vector shorter than the label
/// set, or containing NaN, is an inference failure.
pub fn select_label(scores: &[f32], labels: &LabelSet) -> Result<ScoredLabel, ClassifierError> {
    if labels.is_empty() || scores.len() < labels.len() {
        return Err(ClassifierError::Inference(format!(
            "expected {} scores, got {}",
            labels.len(),
            scores.len()
        )));
    }

    let scores = &scores[..labels.len()];
    if scores.iter().any(|s| s.is_nan()) {
        return Err(ClassifierError::Inference(
            "model produced NaN scores".to_string(),
        ));
    }

    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }

    let label = labels
        .get(best)
        .ok_or_else(|| ClassifierError::Inference(format!("no label at index {}", best)))?;

    Ok(ScoredLabel {
        index: best,
        label: label.to_string(),
        confidence: f64::from(scores[best]).clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelSet {
        LabelSet::new(["fake", "not_currency", "real"])
    }

    #[test]
    fn test_select_label_argmax() {
        let scored = select_label(&[0.1, 0.2, 0.7], &labels()).unwrap();
        assert_eq!(scored.index, 2);
        assert_eq!(scored.label, "real");
        assert!((scored.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_select_label_ties_pick_lowest_index() {
        let scored = select_label(&[0.4, 0.4, 0.2], &labels()).unwrap();
        assert_eq!(scored.label, "fake");
    }

    #[test]
    fn test_select_label_clamps_confidence() {
        let scored = select_label(&[-3.0, 7.5, 1.0], &labels()).unwrap();
        assert_eq!(scored.label, "not_currency");
        assert_eq!(scored.confidence, 1.0);
    }

    #[test]
    fn test_select_label_rejects_short_vector() {
        assert!(matches!(
            select_label(&[0.9, 0.1], &labels()),
            Err(ClassifierError::Inference(_))
        ));
        assert!(select_label(&[], &labels()).is_err());
    }

    #[test]
    fn test_select_label_rejects_nan() {
        assert!(select_label(&[0.1, f32::NAN, 0.2], &labels()).is_err());
    }

    #[test]
    fn test_unavailable_classifier() {
        let classifier = UnavailableClassifier;
        assert!(!classifier.is_available());
        let tensor = ImageTensor {
            shape: [1, 1, 1, 3],
            data: vec![0.0; 3],
        };
        assert_eq!(
            classifier.predict(&tensor),
            Err(ClassifierError::Unavailable)
        );

        let err: PipelineError = ClassifierError::Unavailable.into();
        assert_eq!(err.reason(), "Model not loaded");
    }
}

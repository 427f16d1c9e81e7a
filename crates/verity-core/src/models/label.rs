use serde::Serialize;

pub const REAL_MESSAGE: &str = "This is a Real PKR Currency Note.";
pub const FAKE_MESSAGE: &str = "This is a Fake PKR Currency Note.";
pub const NOT_CURRENCY_MESSAGE: &str =
    "This is not a currency image. Please upload a valid PKR note.";
pub const UNCLASSIFIED_MESSAGE: &str = "Unable to classify the image.";

/// Human-readable outcome for a predicted label.
///
/// Labels outside the known outcomes map to [`UNCLASSIFIED_MESSAGE`].
pub fn outcome_message(label: &str) -> &'static str {
    match label {
        "real" => REAL_MESSAGE,
        "fake" => FAKE_MESSAGE,
        "not_currency" => NOT_CURRENCY_MESSAGE,
        _ => UNCLASSIFIED_MESSAGE,
    }
}

/// Closed set of class labels, in the index order of the classifier output.
///
/// Loaded once from configuration at startup and never extended afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at a score-vector index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

use serde::Deserialize;

use super::question::RecordId;

const EVALUATED: &str = "Evaluated";

/// One graded (or pending) attempt of the logged-in student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub student_exam_id: RecordId,
    #[serde(default)]
    pub exam_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub obtained_marks: Option<f64>,
    #[serde(default)]
    pub total_marks: Option<f64>,
}

impl ResultSummary {
    /// Marks are only published once the attempt is evaluated.
    pub fn is_evaluated(&self) -> bool {
        self.status.eq_ignore_ascii_case(EVALUATED)
    }

    pub fn score(&self) -> Option<(f64, f64)> {
        if !self.is_evaluated() {
            return None;
        }
        Some((self.obtained_marks?, self.total_marks?))
    }

    /// Percentage of the total, `None` while pending or when the total is zero.
    pub fn percentage(&self) -> Option<f64> {
        let (obtained, total) = self.score()?;
        (total > 0.0).then(|| obtained / total * 100.0)
    }

    /// Reference shown next to the exam name, zero-padded to six digits.
    pub fn reference(&self) -> String {
        format!("REF-ID {:0>6}", self.student_exam_id.to_string())
    }
}

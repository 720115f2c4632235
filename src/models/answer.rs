use super::question::OptionLabel;

/// The student's current answer to one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub selected: Option<OptionLabel>,
    pub text: String,
    pub code: String,
    /// Output of the last code run.
    pub output: String,
}

impl Answer {
    /// An answer is empty when no option is selected and both text and code
    /// are blank. Execution output alone does not count as an answer.
    pub fn is_empty(&self) -> bool {
        self.selected.is_none() && self.text.trim().is_empty() && self.code.trim().is_empty()
    }

    /// Overwrites the fields present in `patch`. Returns whether anything
    /// changed.
    pub fn apply(&mut self, patch: &AnswerPatch) -> bool {
        let mut changed = false;

        if let Some(label) = patch.selected {
            if self.selected != Some(label) {
                self.selected = Some(label);
                changed = true;
            }
        }

        changed |= replace(&mut self.text, patch.text.as_deref());
        changed |= replace(&mut self.code, patch.code.as_deref());
        changed |= replace(&mut self.output, patch.output.as_deref());

        changed
    }
}

fn replace(field: &mut String, value: Option<&str>) -> bool {
    match value {
        Some(value) if field != value => {
            field.clear();
            field.push_str(value);
            true
        }
        _ => false,
    }
}

/// Partial update for an [`Answer`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerPatch {
    pub selected: Option<OptionLabel>,
    pub text: Option<String>,
    pub code: Option<String>,
    pub output: Option<String>,
}

impl AnswerPatch {
    pub fn select(label: OptionLabel) -> Self {
        Self {
            selected: Some(label),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer() {
        let mut answer = Answer::default();
        assert!(answer.is_empty());

        answer.text = "   \n".to_string();
        assert!(answer.is_empty());

        answer.output = "compiled".to_string();
        assert!(answer.is_empty());

        answer.code = "int main() {}".to_string();
        assert!(!answer.is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut answer = Answer::default();
        let patch = AnswerPatch::text("first draft");

        assert!(answer.apply(&patch));
        let after_first = answer.clone();

        assert!(!answer.apply(&patch));
        assert_eq!(answer, after_first);
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut answer = Answer {
            code: "print(1)".to_string(),
            output: "1".to_string(),
            ..Answer::default()
        };

        assert!(answer.apply(&AnswerPatch::select(OptionLabel::B)));
        assert_eq!(answer.selected, Some(OptionLabel::B));
        assert_eq!(answer.code, "print(1)");
        assert_eq!(answer.output, "1");
    }
}

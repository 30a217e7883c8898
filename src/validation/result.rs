use crate::error::ParameterValidationError;
use std::collections::BTreeMap;

/// Accumulates field-level problems across validation steps so that one
/// failure reports every issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<String, Vec<String>>,
    suggestions: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Suggestions are de-duplicated, first occurrence kept.
    pub fn add_suggestion(&mut self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
    }

    /// Non-fatal degradations, such as a dropped filter.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// `Err` carrying every accumulated problem, `Ok` when there are none.
    pub fn into_result(self) -> Result<(), ParameterValidationError> {
        if self.has_errors() {
            Err(ParameterValidationError {
                errors: self.errors,
                suggestions: self.suggestions,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_per_field() {
        let mut result = ValidationResult::new();
        assert!(!result.has_errors());
        result.add_error("sort", "unknown field 'foo'");
        result.add_error("sort", "unknown field 'bar'");
        result.add_error("pagination", "pageSize too large");
        result.add_suggestion("Sortable fields: id, name");
        result.add_suggestion("Sortable fields: id, name");
        result.add_warning("filter on 'x' dropped");

        assert!(result.has_errors());
        assert_eq!(result.warnings().len(), 1);
        let err = result.into_result().unwrap_err();
        assert_eq!(err.field_count(), 2);
        assert_eq!(err.errors["sort"].len(), 2);
        assert_eq!(err.suggestions.len(), 1);
    }

    #[test]
    fn test_warnings_alone_are_ok() {
        let mut result = ValidationResult::new();
        result.add_warning("search dropped");
        assert!(result.into_result().is_ok());
    }
}

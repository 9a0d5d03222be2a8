//! Validation error collection shared by the form and view layers

use std::collections::HashMap;
use thiserror::Error;

/// Field-keyed validation errors, the shape form redisplay consumes
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_accumulate() {
        let mut errors = ValidationErrors::new();
        errors.add("username", "is required");
        errors.add("username", "is too short");
        errors.add_base("something went wrong");

        assert!(!errors.is_empty());
        assert!(errors.has_error("username"));
        assert_eq!(errors.get("username").unwrap().len(), 2);
        assert_eq!(errors.full_messages().len(), 3);
    }

    #[test]
    fn test_merge_combines_field_and_base_errors() {
        let mut target = ValidationErrors::new();
        target.add("name", "is required");

        let mut other = ValidationErrors::new();
        other.add("name", "is too long");
        other.add_base("invalid submission");

        target.merge(other);
        assert_eq!(target.get("name").unwrap().len(), 2);
        assert_eq!(target.base_errors, vec!["invalid submission"]);
    }
}

//! Field registry: named inputs with their constraints, and local validation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WizardConfig;

/// Fields the author fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Category,
    Title,
    Description,
    Minutes,
    Ingredients,
    Steps,
    Method,
    ExternalVideoUrl,
    Images,
}

impl FieldName {
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Category => "Category",
            FieldName::Title => "Title",
            FieldName::Description => "Description",
            FieldName::Minutes => "Total time",
            FieldName::Ingredients => "Ingredients",
            FieldName::Steps => "Steps",
            FieldName::Method => "Method",
            FieldName::ExternalVideoUrl => "Video link",
            FieldName::Images => "Images",
        }
    }
}

/// Constraint set bound to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: FieldName,
    /// Whether this field must be filled before leaving its step
    pub required: bool,
    /// Maximum length in characters, per entry for list fields
    pub max_length: Option<usize>,
}

/// Why a field failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    TooLong { max: usize, index: Option<usize> },
    NotPositive,
    InvalidUrl,
    ImageRequired,
}

/// A local, field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldName,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: FieldName, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Required => match self.field {
                FieldName::Category => write!(f, "Please choose a category"),
                FieldName::Method => write!(f, "Please choose a cooking method"),
                FieldName::Ingredients => write!(f, "Add at least one ingredient"),
                FieldName::Steps => write!(f, "Add at least one step"),
                other => write!(f, "{} is required", other.label()),
            },
            FieldErrorKind::TooLong {
                max,
                index: Some(i),
            } => write!(
                f,
                "{} #{} must be at most {} characters",
                self.field.label(),
                i + 1,
                max
            ),
            FieldErrorKind::TooLong { max, index: None } => {
                write!(f, "{} must be at most {} characters", self.field.label(), max)
            }
            FieldErrorKind::NotPositive => {
                write!(f, "{} must be at least 1 minute", self.field.label())
            }
            FieldErrorKind::InvalidUrl => {
                write!(f, "{} must start with http:// or https://", self.field.label())
            }
            FieldErrorKind::ImageRequired => write!(f, "You must upload an image"),
        }
    }
}

impl std::error::Error for FieldError {}

/// All field specs for one wizard, derived from config
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    specs: Vec<FieldSpec>,
}

impl FieldRegistry {
    pub fn from_config(config: &WizardConfig) -> Self {
        let spec = |name, required, max_length| FieldSpec {
            name,
            required,
            max_length,
        };
        Self {
            specs: vec![
                spec(FieldName::Category, true, None),
                spec(FieldName::Title, true, Some(config.title_max_length)),
                spec(
                    FieldName::Description,
                    true,
                    Some(config.description_max_length),
                ),
                spec(FieldName::Minutes, true, None),
                spec(
                    FieldName::Ingredients,
                    true,
                    Some(config.ingredient_max_length),
                ),
                spec(FieldName::Steps, true, Some(config.step_max_length)),
                spec(FieldName::Method, true, None),
                spec(FieldName::ExternalVideoUrl, false, None),
                spec(FieldName::Images, config.require_image, None),
            ],
        }
    }

    pub fn spec(&self, name: FieldName) -> Option<&FieldSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn is_required(&self, name: FieldName) -> bool {
        self.spec(name).map(|s| s.required).unwrap_or(false)
    }

    fn max_length(&self, name: FieldName) -> Option<usize> {
        self.spec(name).and_then(|s| s.max_length)
    }

    /// Validate a single-line or free-text value
    pub fn check_text(&self, name: FieldName, value: &str) -> Result<(), FieldError> {
        if value.trim().is_empty() {
            if self.is_required(name) {
                return Err(FieldError::new(name, FieldErrorKind::Required));
            }
            return Ok(());
        }
        if let Some(max) = self.max_length(name) {
            if value.chars().count() > max {
                return Err(FieldError::new(
                    name,
                    FieldErrorKind::TooLong { max, index: None },
                ));
            }
        }
        Ok(())
    }

    /// Validate a list field: at least one non-empty entry when required, and
    /// each entry within the per-entry limit
    pub fn check_list(&self, name: FieldName, entries: &[String]) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.is_required(name) && entries.iter().all(|e| e.trim().is_empty()) {
            errors.push(FieldError::new(name, FieldErrorKind::Required));
        }
        if let Some(max) = self.max_length(name) {
            for (i, entry) in entries.iter().enumerate() {
                if entry.chars().count() > max {
                    errors.push(FieldError::new(
                        name,
                        FieldErrorKind::TooLong {
                            max,
                            index: Some(i),
                        },
                    ));
                }
            }
        }
        errors
    }

    /// Validate that a choice has been made
    pub fn check_choice<T>(&self, name: FieldName, value: Option<&T>) -> Result<(), FieldError> {
        if value.is_none() && self.is_required(name) {
            return Err(FieldError::new(name, FieldErrorKind::Required));
        }
        Ok(())
    }

    pub fn check_minutes(&self, minutes: u32) -> Result<(), FieldError> {
        if minutes == 0 && self.is_required(FieldName::Minutes) {
            return Err(FieldError::new(
                FieldName::Minutes,
                FieldErrorKind::NotPositive,
            ));
        }
        Ok(())
    }

    pub fn check_url(&self, name: FieldName, value: Option<&str>) -> Result<(), FieldError> {
        match value.map(str::trim) {
            None | Some("") => {
                if self.is_required(name) {
                    Err(FieldError::new(name, FieldErrorKind::Required))
                } else {
                    Ok(())
                }
            }
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
            Some(_) => Err(FieldError::new(name, FieldErrorKind::InvalidUrl)),
        }
    }

    /// Image requirement checked at submission
    pub fn check_images(&self, filled: usize) -> Result<(), FieldError> {
        if filled == 0 && self.is_required(FieldName::Images) {
            return Err(FieldError::new(
                FieldName::Images,
                FieldErrorKind::ImageRequired,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FieldRegistry {
        FieldRegistry::from_config(&WizardConfig::default())
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = registry().check_text(FieldName::Title, "   ").unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Required);
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_max_length_counts_chars() {
        let registry = registry();
        let ok = "é".repeat(100);
        assert!(registry.check_text(FieldName::Title, &ok).is_ok());
        let too_long = "é".repeat(101);
        let err = registry.check_text(FieldName::Title, &too_long).unwrap_err();
        assert_eq!(
            err.kind,
            FieldErrorKind::TooLong {
                max: 100,
                index: None
            }
        );
    }

    #[test]
    fn test_list_requires_one_non_empty_entry() {
        let registry = registry();
        let errors = registry.check_list(FieldName::Ingredients, &["".to_string(), " ".to_string()]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Add at least one ingredient");

        let errors = registry.check_list(FieldName::Ingredients, &["".to_string(), "salt".to_string()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_list_entry_too_long_reports_position() {
        let registry = registry();
        let entries = vec!["flour".to_string(), "x".repeat(151)];
        let errors = registry.check_list(FieldName::Ingredients, &entries);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Ingredients #2 must be at most 150 characters"
        );
    }

    #[test]
    fn test_optional_url() {
        let registry = registry();
        assert!(registry.check_url(FieldName::ExternalVideoUrl, None).is_ok());
        assert!(registry
            .check_url(FieldName::ExternalVideoUrl, Some("https://video.example/x"))
            .is_ok());
        let err = registry
            .check_url(FieldName::ExternalVideoUrl, Some("ftp://video"))
            .unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::InvalidUrl);
    }

    #[test]
    fn test_image_requirement_follows_config() {
        assert_eq!(
            registry().check_images(0).unwrap_err().to_string(),
            "You must upload an image"
        );

        let relaxed = FieldRegistry::from_config(&WizardConfig {
            require_image: false,
            ..WizardConfig::default()
        });
        assert!(relaxed.check_images(0).is_ok());
    }

    #[test]
    fn test_minutes_must_be_positive() {
        assert!(registry().check_minutes(0).is_err());
        assert!(registry().check_minutes(45).is_ok());
    }
}

//! Engine configuration loaded from JSON.

use crate::kanban::domain::{ColumnTemplate, MAX_COLUMN_NAME_LEN};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors returned while loading a [`KanbanConfig`].
#[derive(Debug, Error)]
pub enum KanbanConfigError {
    /// The document is not valid JSON or does not match the config shape.
    #[error("invalid kanban configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The default column template is empty.
    #[error("default column template must contain at least one column")]
    NoDefaultColumns,

    /// A default column has a blank name.
    #[error("default column names must not be empty")]
    EmptyColumnName,

    /// A default column name is longer than a stored column name may be.
    #[error("default column '{0}' exceeds {MAX_COLUMN_NAME_LEN} characters")]
    ColumnNameTooLong(String),

    /// Two default columns share a status.
    #[error("default columns bind status '{0}' more than once")]
    DuplicateStatus(String),

    /// The task code prefix is blank.
    #[error("task code prefix must not be empty")]
    EmptyCodePrefix,

    /// The pool size is zero.
    #[error("max_connections must be at least 1")]
    InvalidPoolSize,
}

/// Configuration for the Kanban engine.
///
/// # Examples
///
/// ```
/// use kanban_engine::kanban::config::KanbanConfig;
///
/// let config = KanbanConfig::from_json_str(r#"{"task_code_prefix": "OPS"}"#)
///     .expect("valid configuration");
/// assert_eq!(config.task_code_prefix, "OPS");
/// assert_eq!(config.default_columns.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KanbanConfig {
    /// Columns seeded onto every new board, left to right.
    pub default_columns: Vec<ColumnTemplate>,
    /// Prefix of generated task codes (`<prefix>-<n>`).
    pub task_code_prefix: String,
    /// Maximum number of pooled database connections.
    pub max_connections: u32,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            default_columns: ColumnTemplate::default_set(),
            task_code_prefix: "TASK".to_owned(),
            max_connections: 10,
        }
    }
}

impl KanbanConfig {
    /// Parses and validates a JSON configuration document. Absent fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanConfigError`] when the document cannot be parsed or
    /// fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, KanbanConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), KanbanConfigError> {
        if self.default_columns.is_empty() {
            return Err(KanbanConfigError::NoDefaultColumns);
        }
        let mut seen = HashSet::new();
        for template in &self.default_columns {
            if template.name.trim().is_empty() {
                return Err(KanbanConfigError::EmptyColumnName);
            }
            if template.name.trim().chars().count() > MAX_COLUMN_NAME_LEN {
                return Err(KanbanConfigError::ColumnNameTooLong(template.name.clone()));
            }
            if !seen.insert(&template.status) {
                return Err(KanbanConfigError::DuplicateStatus(
                    template.status.as_str().to_owned(),
                ));
            }
        }
        if self.task_code_prefix.trim().is_empty() {
            return Err(KanbanConfigError::EmptyCodePrefix);
        }
        if self.max_connections == 0 {
            return Err(KanbanConfigError::InvalidPoolSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KanbanConfig, KanbanConfigError};
    use rstest::rstest;

    #[rstest]
    fn empty_document_yields_defaults() {
        let config = KanbanConfig::from_json_str("{}").expect("defaults are valid");
        assert_eq!(config, KanbanConfig::default());
    }

    #[rstest]
    fn custom_columns_are_loaded_in_order() {
        let json = r##"{
            "default_columns": [
                {"name": "Backlog", "status": "backlog"},
                {"name": "Shipped", "status": "shipped", "color": "#198754"}
            ]
        }"##;
        let config = KanbanConfig::from_json_str(json).expect("valid configuration");
        let statuses: Vec<&str> = config
            .default_columns
            .iter()
            .map(|template| template.status.as_str())
            .collect();
        assert_eq!(statuses, vec!["backlog", "shipped"]);
    }

    const DUPLICATE_STATUS: &str = r#"{"default_columns": [
        {"name": "A", "status": "todo"},
        {"name": "B", "status": "todo"}
    ]}"#;

    #[rstest]
    #[case(r#"{"default_columns": []}"#)]
    #[case(r#"{"task_code_prefix": "  "}"#)]
    #[case(r#"{"max_connections": 0}"#)]
    #[case(DUPLICATE_STATUS)]
    #[case(r#"{"default_columns": [{"name": "A", "status": "not valid!"}]}"#)]
    fn invalid_documents_are_rejected(#[case] json: &str) {
        assert!(KanbanConfig::from_json_str(json).is_err());
    }

    #[rstest]
    fn duplicate_status_names_the_status() {
        let err = KanbanConfig::from_json_str(DUPLICATE_STATUS).expect_err("duplicate status");
        assert!(matches!(err, KanbanConfigError::DuplicateStatus(status) if status == "todo"));
    }

    #[rstest]
    fn template_names_must_fit_a_column() {
        let name = "n".repeat(101);
        let json = format!(r#"{{"default_columns": [{{"name": "{name}", "status": "todo"}}]}}"#);
        let err = KanbanConfig::from_json_str(&json).expect_err("overlong template name");
        assert!(matches!(err, KanbanConfigError::ColumnNameTooLong(rejected) if rejected == name));
    }
}

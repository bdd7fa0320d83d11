//! Input validation utilities for the service layer.

use crate::error::{Error, Result};

/// Maximum workspace name length.
pub const MAX_WORKSPACE_NAME_LENGTH: usize = 50;
/// Maximum task title length.
pub const MAX_TASK_TITLE_LENGTH: usize = 100;
/// Maximum task/workspace description length.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
/// Maximum number of tags on a single task or workspace.
pub const MAX_TAGS: usize = 20;
/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 40;

/// Validates workspace name format and constraints
///
/// # Returns
/// * `Ok(())` if the name is valid
/// * `Err(Error)` with descriptive message if invalid
pub fn validate_workspace_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::Validation(
            "Workspace name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_WORKSPACE_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Workspace name must be at most {} characters",
            MAX_WORKSPACE_NAME_LENGTH
        )));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(Error::Validation(
            "Workspace name cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates task title format and constraints
pub fn validate_task_title(title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::Validation("Task title cannot be empty".to_string()));
    }

    if title.len() > MAX_TASK_TITLE_LENGTH {
        return Err(Error::Validation(format!(
            "Task title must be at most {} characters",
            MAX_TASK_TITLE_LENGTH
        )));
    }

    if title.chars().any(|c| c.is_control()) {
        return Err(Error::Validation(
            "Task title cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates an optional description's length
pub fn validate_description(description: &Option<String>) -> Result<()> {
    if let Some(description) = description {
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
    }
    Ok(())
}

/// Validates a tag list: bounded count, non-empty entries, bounded length
pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(Error::Validation(format!(
            "At most {} tags are allowed",
            MAX_TAGS
        )));
    }
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Tags cannot be empty".to_string()));
        }
        if trimmed.len() > MAX_TAG_LENGTH {
            return Err(Error::Validation(format!(
                "Tag '{}' exceeds {} characters",
                trimmed, MAX_TAG_LENGTH
            )));
        }
    }
    Ok(())
}

/// Validates a pomodoro estimate (cycles or minutes) when present
pub fn validate_estimate(value: Option<i32>, field_name: &str) -> Result<()> {
    if let Some(value) = value {
        if value < 0 {
            return Err(Error::Validation(format!(
                "{} cannot be negative",
                field_name
            )));
        }
    }
    Ok(())
}

/// Sanitizes string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_workspace_name_valid() {
        assert!(validate_workspace_name("My Workspace").is_ok());
        assert!(validate_workspace_name("Team-Project_2026").is_ok());
    }

    #[test]
    fn test_validate_workspace_name_invalid() {
        assert!(validate_workspace_name("").is_err());
        assert!(validate_workspace_name("   ").is_err());
        assert!(validate_workspace_name(&"a".repeat(51)).is_err());
        assert!(validate_workspace_name("name\nwith newline").is_err());
    }

    #[test]
    fn test_validate_task_title() {
        assert!(validate_task_title("Write the report").is_ok());
        assert!(validate_task_title("").is_err());
        assert!(validate_task_title("  ").is_err());
        assert!(validate_task_title(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(&None).is_ok());
        assert!(validate_description(&Some("short".to_string())).is_ok());
        assert!(validate_description(&Some("d".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_tags() {
        assert!(validate_tags(&[]).is_ok());
        assert!(validate_tags(&["work".to_string(), "urgent".to_string()]).is_ok());
        assert!(validate_tags(&["".to_string()]).is_err());
        assert!(validate_tags(&["t".repeat(41)]).is_err());
        let too_many: Vec<String> = (0..21).map(|i| format!("tag{}", i)).collect();
        assert!(validate_tags(&too_many).is_err());
    }

    #[test]
    fn test_validate_estimate() {
        assert!(validate_estimate(None, "cycles").is_ok());
        assert!(validate_estimate(Some(4), "cycles").is_ok());
        assert!(validate_estimate(Some(-1), "cycles").is_err());
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  hello world  "), "hello world");
        assert_eq!(sanitize_string("\ttest\n"), "test");
        assert_eq!(sanitize_string("   "), "");
    }
}

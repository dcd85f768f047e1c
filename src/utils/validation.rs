use crate::utils::error::{Result, SyncError};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();

    if path_str.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path_str.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path_str.contains('\0') {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path_str.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_distinct_paths(field_a: &str, a: &Path, field_b: &str, b: &Path) -> Result<()> {
    if a == b {
        return Err(SyncError::ConfigValidationError {
            field: format!("{}/{}", field_a, field_b),
            message: format!("both point to {}", a.display()),
        });
    }
    Ok(())
}

use crate::errors::ApiError;

/// Validates a route parameter to prevent path traversal attacks
pub fn validate_path_component(component: &str) -> Result<(), ApiError> {
    if component.is_empty() {
        return Err(ApiError::NotFound);
    }

    // Check for path traversal attempts
    if component.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(ApiError::InvalidPath(
            "Path contains '..' (path traversal attempt)".to_string()
        ));
    }

    // Check for null bytes
    if component.contains('\0') {
        return Err(ApiError::InvalidPath(
            "Path contains null byte".to_string()
        ));
    }

    // Check for absolute paths; root-disk paths are sent without their leading slash
    if component.starts_with('/') || component.starts_with('\\') {
        return Err(ApiError::InvalidPath(
            "Absolute paths are not allowed".to_string()
        ));
    }

    Ok(())
}

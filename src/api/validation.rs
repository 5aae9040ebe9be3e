use super::ApiError;

pub fn validate_nik(nik: &str) -> Result<&str, ApiError> {
    let trimmed = nik.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("NIK cannot be empty"));
    }

    if trimmed.len() > 32 {
        return Err(ApiError::validation("NIK must be 32 characters or less"));
    }

    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ApiError::validation(
            "NIK can only contain letters, digits, and hyphens",
        ));
    }

    Ok(trimmed)
}

pub fn validate_request_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid request ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

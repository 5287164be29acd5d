use super::ApiError;

pub fn validate_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Quantities added to a cart start at one and have no upper bound.
pub fn validate_add_quantity(quantity: i32) -> Result<i32, ApiError> {
    if quantity < 1 {
        return Err(ApiError::validation(format!(
            "Invalid quantity: {quantity}. Quantity must be at least 1"
        )));
    }
    Ok(quantity)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    const MAX_QUERY_LEN: usize = 100;

    let trimmed = query.trim();
    if trimmed.chars().count() > MAX_QUERY_LEN {
        return Err(ApiError::validation(format!(
            "Search query must be {MAX_QUERY_LEN} characters or less"
        )));
    }
    Ok(trimmed)
}

pub fn validate_upload_filename(filename: Option<&str>) -> Result<&str, ApiError> {
    match filename.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ApiError::validation(
            "The 'filename' query parameter is required",
        )),
    }
}

use std::fmt;

/// The fetch retry budget was exhausted.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub attempts: u32,
    pub last_error: String,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API request failed after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl std::error::Error for FetchError {}

/// The API document did not have the expected envelope.
#[derive(Debug, Clone)]
pub struct ShapeError {
    pub detail: String,
    pub preview: String,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected API response shape ({}): {} ...",
            self.detail, self.preview
        )
    }
}

impl std::error::Error for ShapeError {}

/// A single data row failed validation.
#[derive(Debug, Clone)]
pub struct RowError {
    pub index: usize,
    pub field: &'static str,
    pub detail: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid API row {}: field `{}` {}",
            self.index, self.field, self.detail
        )
    }
}

impl std::error::Error for RowError {}

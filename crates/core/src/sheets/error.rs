use std::fmt;

/// Non-success response from the Sheets or OAuth endpoints.
#[derive(Debug, Clone)]
pub struct SheetsApiError {
    pub stage: &'static str,
    pub status: u16,
    pub body: String,
}

impl fmt::Display for SheetsApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Google Sheets error (stage={}, status={}): {}",
            self.stage, self.status, self.body
        )
    }
}

impl std::error::Error for SheetsApiError {}

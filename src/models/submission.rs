/// A validated contact form submission. Lives for one request only.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// HTML-safe copies of the submission fields, for the HTML email body only.
#[derive(Debug, Clone, PartialEq)]
pub struct EscapedSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Escaped, with newlines turned into `<br/>`.
    pub message: String,
}

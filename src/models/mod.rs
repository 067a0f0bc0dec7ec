pub mod submission;

pub use submission::{EscapedSubmission, Submission};

use thiserror::Error;

/// Errors raised while shaping and paginating message text.
///
/// Naming and size selection never fail with an error; they return sentinel
/// values (`""` / `None`) that callers branch on instead.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("text shaping failed: {0}")]
    Shaping(String),

    #[error("invalid character range {start}..{end} for block starting at line {line}")]
    InvalidRange {
        start: usize,
        end: usize,
        line: usize,
    },
}

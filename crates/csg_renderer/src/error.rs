use thiserror::Error;

/// Errors that can end a render pass.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render cancelled after {completed} of {total} buckets")]
    Cancelled { completed: usize, total: usize },

    #[error("Invalid render configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

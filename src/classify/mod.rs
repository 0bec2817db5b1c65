pub mod batch;
pub mod client;
pub mod merge;
pub mod parser;
pub mod prompt;
pub mod types;

pub use batch::*;
pub use client::*;
pub use merge::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("cannot reach the classification service at {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("service reply carried no content")]
    EmptyReply,

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

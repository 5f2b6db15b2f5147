use std::net::SocketAddr;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
pub enum RoiError {
    #[error("invalid listen address {value:?}: {reason}")]
    Address { value: String, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoiError {
    pub fn exit_status(&self) -> u8 {
        match self {
            RoiError::Address { .. } => 2,
            RoiError::Bind { .. } | RoiError::Serve(_) | RoiError::Json(_) => 1,
        }
    }
}

impl From<&RoiError> for ExitCode {
    fn from(err: &RoiError) -> Self {
        ExitCode::from(err.exit_status())
    }
}

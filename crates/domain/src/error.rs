/// Shared error type used across all ToolBridge crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("config: {0}")]
    Config(String),

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("tool '{name}' not found; available: {available:?}")]
    ToolNotFound { name: String, available: Vec<String> },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_lists_available() {
        let err = Error::ToolNotFound {
            name: "send_email".into(),
            available: vec!["search".into(), "fetch".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("send_email"));
        assert!(msg.contains("search"));
        assert!(msg.contains("fetch"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

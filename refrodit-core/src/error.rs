use thiserror::Error;

/// Failure of a single fetch against a remote feed.
///
/// Every variant is terminal for the attempt that produced it. The display
/// string is what ends up on screen, so keep it short.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: DNS, connect, TLS, body read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server error: {status}")]
    Status { status: u16, body: String },

    /// 2xx response whose body is empty or does not match the expected shape.
    #[error("empty or malformed response")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        FetchError::Status { status, body: truncate_body(body) }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Network(err) => err.status().map(|s| s.as_u16()),
            FetchError::Decode(_) => None,
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code() {
        let err = FetchError::status(503, "unavailable");
        assert_eq!(err.to_string(), "server error: 503");
        assert_eq!(err.status_code(), Some(503));
    }

    #[test]
    fn decode_error_has_fixed_message() {
        let source = serde_json::from_str::<Vec<u8>>("").unwrap_err();
        let err = FetchError::Decode(source);
        assert_eq!(err.to_string(), "empty or malformed response");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        match FetchError::status(500, &body) {
            FetchError::Status { body, .. } => {
                assert_eq!(body.len(), 203);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "ş".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }
}

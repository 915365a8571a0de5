use thiserror::Error;

/// Failure of a single backend round trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, timeout)
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// Non-success HTTP status without a readable `{success: ...}` envelope
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The backend answered `success: false`
    #[error("{endpoint} rejected the request: {}", message.as_deref().unwrap_or("no reason given"))]
    Rejected {
        endpoint: String,
        message: Option<String>,
    },

    /// A success envelope whose payload could not be decoded
    #[error("Malformed response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
}

impl GatewayError {
    /// True when the request could not complete, as opposed to the backend
    /// answering and reporting a failure.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport { .. } | GatewayError::Status { .. }
        )
    }

    /// Message supplied by the backend itself, if any
    pub fn collaborator_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } => message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty()),
            _ => None,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            GatewayError::Transport { endpoint, .. }
            | GatewayError::Status { endpoint, .. }
            | GatewayError::Rejected { endpoint, .. }
            | GatewayError::Decode { endpoint, .. } => endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_status_are_network_failures() {
        let transport = GatewayError::Transport {
            endpoint: "/publish_tests".to_string(),
            message: "connection refused".to_string(),
        };
        let status = GatewayError::Status {
            endpoint: "/publish_tests".to_string(),
            status: 502,
        };
        assert!(transport.is_network());
        assert!(status.is_network());
    }

    #[test]
    fn rejection_is_not_a_network_failure() {
        let rejected = GatewayError::Rejected {
            endpoint: "/fetch_story".to_string(),
            message: Some("Story not found".to_string()),
        };
        assert!(!rejected.is_network());
        assert_eq!(rejected.collaborator_message(), Some("Story not found"));
    }

    #[test]
    fn blank_rejection_message_is_ignored() {
        let rejected = GatewayError::Rejected {
            endpoint: "/generate_tests".to_string(),
            message: Some("   ".to_string()),
        };
        assert_eq!(rejected.collaborator_message(), None);
        assert!(rejected.to_string().contains("/generate_tests"));
    }
}

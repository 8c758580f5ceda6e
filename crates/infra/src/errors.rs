//! Conversions from external infrastructure errors into domain errors.

use recap_domain::RecapError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RecapError);

impl From<InfraError> for RecapError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RecapError> for InfraError {
    fn from(value: RecapError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RecapError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return InfraError(RecapError::Network("HTTP request timed out".into()));
        }

        if value.is_connect() {
            return InfraError(RecapError::Network("HTTP connection failure".into()));
        }

        if let Some(status) = value.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            let mapped = match code {
                401 | 403 => RecapError::Auth(message),
                404 => RecapError::NotFound(message),
                429 => RecapError::Network(message),
                400..=499 => RecapError::InvalidInput(message),
                _ => RecapError::Network(message),
            };
            return InfraError(mapped);
        }

        InfraError(RecapError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → RecapError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        let mapped = match value.kind() {
            std::io::ErrorKind::NotFound => RecapError::NotFound(value.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                RecapError::Storage(format!("permission denied: {value}"))
            }
            _ => RecapError::Storage(value.to_string()),
        };
        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → RecapError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(RecapError::InvalidInput(format!("JSON error: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing state file");
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, RecapError::NotFound(_)));
    }

    #[test]
    fn io_permission_denied_maps_to_storage() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only dir");
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, RecapError::Storage(_)));
    }

    #[test]
    fn json_error_maps_to_invalid_input() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, RecapError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network() {
        // Nothing listens on this port.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9")
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
            .unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, RecapError::Network(_)));
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a deployment run.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more mandatory inputs were empty.
    #[error("Mandatory inputs are missing: {}", .0.join(", "))]
    MissingInputs(Vec<&'static str>),

    /// An input was present but could not be interpreted.
    #[error("Invalid input {name}: {value:?}")]
    InvalidInput {
        /// Input name, e.g. "app_id".
        name: &'static str,
        /// The raw value that was rejected.
        value: String,
    },

    /// The secret inputs produced no slots to send.
    #[error("You must provide a \"secret\" value or a \"secret_slots\" string with at least one slot.")]
    NoSecretSlots,

    /// The local WASM file could not be read.
    #[error("Error reading binary file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the FastEdge API client.
    #[error(transparent)]
    Api(#[from] fastedge_api::Error),
}

/// Result type for fastedge-deploy operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingInputs(vec!["api_key", "wasm_file"]);
        assert_eq!(err.to_string(), "Mandatory inputs are missing: api_key, wasm_file");

        let err = Error::InvalidInput {
            name: "app_id",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid input app_id: \"abc\"");

        let err = Error::Api(fastedge_api::Error::Request {
            context: "Error creating application",
            status: Some(400),
            message: "Bad Request".to_string(),
        });
        assert_eq!(err.to_string(), "Error creating application: Bad Request");

        let err = Error::Io {
            path: PathBuf::from("app.wasm"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Error reading binary file app.wasm: missing");
    }
}

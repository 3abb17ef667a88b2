use std::fmt::Write as _;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("invalid block configuration: {0}")]
    InvalidConfig(String),
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
    #[error("failed to serialize block output: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unknown block: {0}")]
    UnknownBlock(String),
}

pub type BlockResult<T> = Result<T, BlockError>;

impl BlockError {
    /// Wrap an AWS SDK failure, keeping the full error source chain in the
    /// message. The catalog does not classify service failures; whatever the
    /// SDK reports is surfaced as-is.
    pub fn api<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error,
    {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(message, ": {cause}");
            source = cause.source();
        }
        Self::Api { operation, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("service returned an error")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug, Error)]
    #[error("throttled: rate exceeded")]
    struct Inner;

    #[test]
    fn api_error_keeps_source_chain() {
        let err = BlockError::api("DescribeVolumes", Outer { inner: Inner });
        assert_eq!(
            err.to_string(),
            "DescribeVolumes failed: service returned an error: throttled: rate exceeded"
        );
    }

    #[test]
    fn invalid_config_display() {
        let err = BlockError::InvalidConfig("missing field `VolumeId`".to_string());
        assert!(err.to_string().contains("missing field `VolumeId`"));
    }
}

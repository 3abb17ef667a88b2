use async_trait::async_trait;
use schemars::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::connection::AwsConnection;
use crate::error::{BlockError, BlockResult};

/// A declarative descriptor pairing a config schema with one AWS SDK API
/// call.
///
/// Every block follows the same mechanical pattern: parse the config, build a
/// service client from the connection, construct the one-to-one SDK request,
/// `send().await`, and emit the response as JSON.
#[async_trait]
pub trait Block: Send + Sync {
    /// Unique catalog key the workflow engine uses to address this block,
    /// `<service>.<operation>` (e.g. `ec2.create_volume`).
    fn name(&self) -> &'static str;

    /// One-sentence summary transcribed from the AWS API reference.
    fn description(&self) -> &'static str;

    /// JSON schema of the input configuration, mirroring the AWS request
    /// shape. Required request members are required in the schema.
    fn config_schema(&self) -> Schema;

    /// JSON schema of the emitted event, mirroring the AWS response shape.
    fn output_schema(&self) -> Schema;

    /// Execute the wrapped API call and emit the raw response.
    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value>;
}

/// Deserialize a block's JSON config into its typed configuration struct.
pub fn parse_config<T: DeserializeOwned>(config: Value) -> BlockResult<T> {
    serde_json::from_value(config).map_err(|e| BlockError::InvalidConfig(e.to_string()))
}

/// Serialize a block's output model into the emitted JSON event.
pub fn to_output<T: Serialize>(output: T) -> BlockResult<Value> {
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct SampleConfig {
        volume_id: String,
        dry_run: Option<bool>,
    }

    #[test]
    fn parse_config_accepts_api_shaped_json() {
        let config: SampleConfig =
            parse_config(json!({"VolumeId": "vol-0abc", "DryRun": true})).unwrap();
        assert_eq!(
            config,
            SampleConfig {
                volume_id: "vol-0abc".to_string(),
                dry_run: Some(true),
            }
        );
    }

    #[test]
    fn parse_config_reports_missing_required_member() {
        let err = parse_config::<SampleConfig>(json!({"DryRun": false})).unwrap_err();
        match err {
            BlockError::InvalidConfig(message) => assert!(message.contains("VolumeId")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}

//! Layer blocks: publish, inspect, delete, and list layer versions.

use async_trait::async_trait;
use aws_sdk_lambda::types::{Architecture, Runtime};
use runblocks_core::convert::blob_from_base64;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    architectures, client, runtimes, LayerSummary, LayerVersion, LayerVersionSummary,
};

/// Layer archive for PublishLayerVersion, as the Lambda API shapes it.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerContentInput {
    #[schemars(description = "Base64-encoded zip file contents")]
    pub zip_file: Option<String>,
    #[schemars(description = "S3 bucket holding the layer archive")]
    pub s3_bucket: Option<String>,
    #[schemars(description = "S3 key of the layer archive")]
    pub s3_key: Option<String>,
    #[schemars(description = "Version of the S3 object to use")]
    pub s3_object_version: Option<String>,
}

impl LayerContentInput {
    fn into_sdk(self) -> BlockResult<aws_sdk_lambda::types::LayerVersionContentInput> {
        let zip_file = self
            .zip_file
            .as_deref()
            .map(|encoded| blob_from_base64("Content.ZipFile", encoded))
            .transpose()?;
        Ok(aws_sdk_lambda::types::LayerVersionContentInput::builder()
            .set_zip_file(zip_file)
            .set_s3_bucket(self.s3_bucket)
            .set_s3_key(self.s3_key)
            .set_s3_object_version(self.s3_object_version)
            .build())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PublishLayerVersionConfig {
    #[schemars(description = "Name or ARN of the layer")]
    pub layer_name: String,
    #[schemars(description = "Layer archive: zip contents or S3 location")]
    pub content: LayerContentInput,
    #[schemars(description = "Description of the version")]
    pub description: Option<String>,
    #[schemars(description = "Runtimes the layer is compatible with, up to 15")]
    pub compatible_runtimes: Option<Vec<String>>,
    #[schemars(description = "Instruction sets the layer is compatible with")]
    pub compatible_architectures: Option<Vec<String>>,
    #[schemars(description = "SPDX license identifier or license URL")]
    pub license_info: Option<String>,
}

/// Wraps Lambda `PublishLayerVersion`.
pub struct PublishLayerVersion;

#[async_trait]
impl Block for PublishLayerVersion {
    fn name(&self) -> &'static str {
        "lambda.publish_layer_version"
    }

    fn description(&self) -> &'static str {
        "Creates a layer version from a zip archive."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(PublishLayerVersionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(LayerVersion)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: PublishLayerVersionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .publish_layer_version()
            .layer_name(cfg.layer_name)
            .content(cfg.content.into_sdk()?)
            .set_description(cfg.description)
            .set_compatible_runtimes(runtimes(cfg.compatible_runtimes))
            .set_compatible_architectures(architectures(cfg.compatible_architectures))
            .set_license_info(cfg.license_info)
            .send()
            .await
            .map_err(|e| BlockError::api("PublishLayerVersion", e))?;
        to_output(LayerVersion::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerVersionCoordinatesConfig {
    #[schemars(description = "Name or ARN of the layer")]
    pub layer_name: String,
    #[schemars(description = "Version number of the layer")]
    pub version_number: i64,
}

/// Wraps Lambda `GetLayerVersion`.
pub struct GetLayerVersion;

#[async_trait]
impl Block for GetLayerVersion {
    fn name(&self) -> &'static str {
        "lambda.get_layer_version"
    }

    fn description(&self) -> &'static str {
        "Returns a layer version's details, with a download link for the archive."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(LayerVersionCoordinatesConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(LayerVersion)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: LayerVersionCoordinatesConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_layer_version()
            .layer_name(cfg.layer_name)
            .version_number(cfg.version_number)
            .send()
            .await
            .map_err(|e| BlockError::api("GetLayerVersion", e))?;
        to_output(LayerVersion::from(output))
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteLayerVersionResponse {}

/// Wraps Lambda `DeleteLayerVersion`. Functions that already use the version
/// keep working; new functions cannot reference it.
pub struct DeleteLayerVersion;

#[async_trait]
impl Block for DeleteLayerVersion {
    fn name(&self) -> &'static str {
        "lambda.delete_layer_version"
    }

    fn description(&self) -> &'static str {
        "Deletes a version of a layer."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(LayerVersionCoordinatesConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DeleteLayerVersionResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: LayerVersionCoordinatesConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .delete_layer_version()
            .layer_name(cfg.layer_name)
            .version_number(cfg.version_number)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteLayerVersion", e))?;
        to_output(DeleteLayerVersionResponse {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListLayersConfig {
    #[schemars(description = "Only list layers compatible with this runtime")]
    pub compatible_runtime: Option<String>,
    #[schemars(description = "Only list layers compatible with this instruction set")]
    pub compatible_architecture: Option<String>,
    pub marker: Option<String>,
    pub max_items: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListLayersResponse {
    pub layers: Option<Vec<LayerSummary>>,
    pub next_marker: Option<String>,
}

/// Wraps Lambda `ListLayers`.
pub struct ListLayers;

#[async_trait]
impl Block for ListLayers {
    fn name(&self) -> &'static str {
        "lambda.list_layers"
    }

    fn description(&self) -> &'static str {
        "Lists the account's layers, with each layer's latest matching version."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListLayersConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListLayersResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListLayersConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_layers()
            .set_compatible_runtime(cfg.compatible_runtime.as_deref().map(Runtime::from))
            .set_compatible_architecture(
                cfg.compatible_architecture.as_deref().map(Architecture::from),
            )
            .set_marker(cfg.marker)
            .set_max_items(cfg.max_items)
            .send()
            .await
            .map_err(|e| BlockError::api("ListLayers", e))?;
        to_output(ListLayersResponse {
            layers: output
                .layers
                .map(|list| list.into_iter().map(LayerSummary::from).collect()),
            next_marker: output.next_marker,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListLayerVersionsConfig {
    #[schemars(description = "Name or ARN of the layer")]
    pub layer_name: String,
    pub compatible_runtime: Option<String>,
    pub compatible_architecture: Option<String>,
    pub marker: Option<String>,
    pub max_items: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListLayerVersionsResponse {
    pub layer_versions: Option<Vec<LayerVersionSummary>>,
    pub next_marker: Option<String>,
}

/// Wraps Lambda `ListLayerVersions`.
pub struct ListLayerVersions;

#[async_trait]
impl Block for ListLayerVersions {
    fn name(&self) -> &'static str {
        "lambda.list_layer_versions"
    }

    fn description(&self) -> &'static str {
        "Lists the versions of a layer."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListLayerVersionsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListLayerVersionsResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListLayerVersionsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_layer_versions()
            .layer_name(cfg.layer_name)
            .set_compatible_runtime(cfg.compatible_runtime.as_deref().map(Runtime::from))
            .set_compatible_architecture(
                cfg.compatible_architecture.as_deref().map(Architecture::from),
            )
            .set_marker(cfg.marker)
            .set_max_items(cfg.max_items)
            .send()
            .await
            .map_err(|e| BlockError::api("ListLayerVersions", e))?;
        to_output(ListLayerVersionsResponse {
            layer_versions: output
                .layer_versions
                .map(|list| list.into_iter().map(LayerVersionSummary::from).collect()),
            next_marker: output.next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_layer_version_schema_requires_name_and_content() {
        let schema = serde_json::to_value(PublishLayerVersion.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("LayerName")));
        assert!(required.contains(&json!("Content")));
    }

    #[test]
    fn layer_coordinates_config_parses_version_number() {
        let cfg: LayerVersionCoordinatesConfig = parse_config(json!({
            "LayerName": "deps",
            "VersionNumber": 3
        }))
        .unwrap();
        assert_eq!(cfg.version_number, 3);
    }

    #[test]
    fn layer_content_zip_decodes() {
        let content = LayerContentInput {
            zip_file: Some("UEsDBA==".to_string()),
            s3_bucket: None,
            s3_key: None,
            s3_object_version: None,
        }
        .into_sdk()
        .unwrap();
        assert!(content.zip_file.is_some());
    }
}

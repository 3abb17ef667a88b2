//! Resource tag blocks. Lambda tags functions, event source mappings, and
//! code signing configs by ARN.

use std::collections::HashMap;

use async_trait::async_trait;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::client;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsConfig {
    #[schemars(description = "ARN of the resource to list tags for")]
    pub resource: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsResponse {
    pub tags: Option<HashMap<String, String>>,
}

/// Wraps Lambda `ListTags`.
pub struct ListTags;

#[async_trait]
impl Block for ListTags {
    fn name(&self) -> &'static str {
        "lambda.list_tags"
    }

    fn description(&self) -> &'static str {
        "Returns a resource's tags."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListTagsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListTagsResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListTagsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_tags()
            .resource(cfg.resource)
            .send()
            .await
            .map_err(|e| BlockError::api("ListTags", e))?;
        to_output(ListTagsResponse { tags: output.tags })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TagResourceConfig {
    #[schemars(description = "ARN of the resource to tag")]
    pub resource: String,
    #[schemars(description = "Tags to apply to the resource")]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TagResourceResponse {}

/// Wraps Lambda `TagResource`.
pub struct TagResource;

#[async_trait]
impl Block for TagResource {
    fn name(&self) -> &'static str {
        "lambda.tag_resource"
    }

    fn description(&self) -> &'static str {
        "Adds tags to a resource."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(TagResourceConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(TagResourceResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: TagResourceConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .tag_resource()
            .resource(cfg.resource)
            .set_tags(Some(cfg.tags))
            .send()
            .await
            .map_err(|e| BlockError::api("TagResource", e))?;
        to_output(TagResourceResponse {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UntagResourceConfig {
    #[schemars(description = "ARN of the resource to remove tags from")]
    pub resource: String,
    #[schemars(description = "Keys of the tags to remove")]
    pub tag_keys: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UntagResourceResponse {}

/// Wraps Lambda `UntagResource`.
pub struct UntagResource;

#[async_trait]
impl Block for UntagResource {
    fn name(&self) -> &'static str {
        "lambda.untag_resource"
    }

    fn description(&self) -> &'static str {
        "Removes tags from a resource."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(UntagResourceConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(UntagResourceResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: UntagResourceConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .untag_resource()
            .resource(cfg.resource)
            .set_tag_keys(Some(cfg.tag_keys))
            .send()
            .await
            .map_err(|e| BlockError::api("UntagResource", e))?;
        to_output(UntagResourceResponse {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_resource_config_parses_tag_map() {
        let cfg: TagResourceConfig = parse_config(json!({
            "Resource": "arn:aws:lambda:us-east-1:123456789012:function:orders-api",
            "Tags": {"env": "prod", "team": "data"}
        }))
        .unwrap();
        assert_eq!(cfg.tags.len(), 2);
    }

    #[test]
    fn untag_resource_schema_requires_keys() {
        let schema = serde_json::to_value(UntagResource.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("Resource")));
        assert!(required.contains(&json!("TagKeys")));
    }
}

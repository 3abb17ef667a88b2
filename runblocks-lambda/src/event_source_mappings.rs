//! Event source mapping blocks, for stream and queue triggers (Kinesis,
//! DynamoDB Streams, SQS, Kafka).

use async_trait::async_trait;
use aws_sdk_lambda::types::EventSourcePosition;
use runblocks_core::convert::timestamp_from_secs;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{client, EventSourceMapping};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEventSourceMappingConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "ARN of the event source; omit for self-managed Kafka")]
    pub event_source_arn: Option<String>,
    #[schemars(description = "Whether the mapping starts enabled; default true")]
    pub enabled: Option<bool>,
    #[schemars(description = "Records per batch; limits vary by source")]
    pub batch_size: Option<i32>,
    #[schemars(description = "Seconds to gather records before invoking, 0-300")]
    pub maximum_batching_window_in_seconds: Option<i32>,
    #[schemars(description = "Concurrent batches per shard, streams only")]
    pub parallelization_factor: Option<i32>,
    #[schemars(description = "TRIM_HORIZON | LATEST | AT_TIMESTAMP, streams only")]
    pub starting_position: Option<String>,
    #[schemars(description = "Epoch seconds to start reading from, with AT_TIMESTAMP")]
    pub starting_position_timestamp: Option<f64>,
    #[schemars(description = "Name of the Amazon MQ queue to consume")]
    pub queues: Option<Vec<String>>,
    #[schemars(description = "Name of the Kafka topic to consume")]
    pub topics: Option<Vec<String>>,
    #[schemars(description = "Discard records older than this many seconds, streams only")]
    pub maximum_record_age_in_seconds: Option<i32>,
    #[schemars(description = "Split a failed batch in two and retry, streams only")]
    pub bisect_batch_on_function_error: Option<bool>,
    #[schemars(description = "Retries before discarding a batch; -1 for infinite")]
    pub maximum_retry_attempts: Option<i32>,
    #[schemars(description = "Tumbling window duration in seconds, streams only")]
    pub tumbling_window_in_seconds: Option<i32>,
}

/// Wraps Lambda `CreateEventSourceMapping`.
pub struct CreateEventSourceMapping;

#[async_trait]
impl Block for CreateEventSourceMapping {
    fn name(&self) -> &'static str {
        "lambda.create_event_source_mapping"
    }

    fn description(&self) -> &'static str {
        "Maps an event source to a Lambda function."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CreateEventSourceMappingConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EventSourceMapping)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CreateEventSourceMappingConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .create_event_source_mapping()
            .function_name(cfg.function_name)
            .set_event_source_arn(cfg.event_source_arn)
            .set_enabled(cfg.enabled)
            .set_batch_size(cfg.batch_size)
            .set_maximum_batching_window_in_seconds(cfg.maximum_batching_window_in_seconds)
            .set_parallelization_factor(cfg.parallelization_factor)
            .set_starting_position(
                cfg.starting_position.as_deref().map(EventSourcePosition::from),
            )
            .set_starting_position_timestamp(timestamp_from_secs(
                cfg.starting_position_timestamp,
            ))
            .set_queues(cfg.queues)
            .set_topics(cfg.topics)
            .set_maximum_record_age_in_seconds(cfg.maximum_record_age_in_seconds)
            .set_bisect_batch_on_function_error(cfg.bisect_batch_on_function_error)
            .set_maximum_retry_attempts(cfg.maximum_retry_attempts)
            .set_tumbling_window_in_seconds(cfg.tumbling_window_in_seconds)
            .send()
            .await
            .map_err(|e| BlockError::api("CreateEventSourceMapping", e))?;
        to_output(EventSourceMapping::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EventSourceMappingIdConfig {
    #[serde(rename = "UUID")]
    #[schemars(description = "Identifier of the event source mapping")]
    pub uuid: String,
}

/// Wraps Lambda `GetEventSourceMapping`.
pub struct GetEventSourceMapping;

#[async_trait]
impl Block for GetEventSourceMapping {
    fn name(&self) -> &'static str {
        "lambda.get_event_source_mapping"
    }

    fn description(&self) -> &'static str {
        "Returns details of an event source mapping."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EventSourceMappingIdConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EventSourceMapping)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EventSourceMappingIdConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_event_source_mapping()
            .uuid(cfg.uuid)
            .send()
            .await
            .map_err(|e| BlockError::api("GetEventSourceMapping", e))?;
        to_output(EventSourceMapping::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateEventSourceMappingConfig {
    #[serde(rename = "UUID")]
    #[schemars(description = "Identifier of the event source mapping")]
    pub uuid: String,
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: Option<String>,
    pub enabled: Option<bool>,
    pub batch_size: Option<i32>,
    pub maximum_batching_window_in_seconds: Option<i32>,
    pub parallelization_factor: Option<i32>,
    pub maximum_record_age_in_seconds: Option<i32>,
    pub bisect_batch_on_function_error: Option<bool>,
    pub maximum_retry_attempts: Option<i32>,
    pub tumbling_window_in_seconds: Option<i32>,
}

/// Wraps Lambda `UpdateEventSourceMapping`.
pub struct UpdateEventSourceMapping;

#[async_trait]
impl Block for UpdateEventSourceMapping {
    fn name(&self) -> &'static str {
        "lambda.update_event_source_mapping"
    }

    fn description(&self) -> &'static str {
        "Updates an event source mapping, enabling, disabling, or reconfiguring batching."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(UpdateEventSourceMappingConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EventSourceMapping)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: UpdateEventSourceMappingConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .update_event_source_mapping()
            .uuid(cfg.uuid)
            .set_function_name(cfg.function_name)
            .set_enabled(cfg.enabled)
            .set_batch_size(cfg.batch_size)
            .set_maximum_batching_window_in_seconds(cfg.maximum_batching_window_in_seconds)
            .set_parallelization_factor(cfg.parallelization_factor)
            .set_maximum_record_age_in_seconds(cfg.maximum_record_age_in_seconds)
            .set_bisect_batch_on_function_error(cfg.bisect_batch_on_function_error)
            .set_maximum_retry_attempts(cfg.maximum_retry_attempts)
            .set_tumbling_window_in_seconds(cfg.tumbling_window_in_seconds)
            .send()
            .await
            .map_err(|e| BlockError::api("UpdateEventSourceMapping", e))?;
        to_output(EventSourceMapping::from(output))
    }
}

/// Wraps Lambda `DeleteEventSourceMapping`. The response is the mapping
/// entering the Deleting state.
pub struct DeleteEventSourceMapping;

#[async_trait]
impl Block for DeleteEventSourceMapping {
    fn name(&self) -> &'static str {
        "lambda.delete_event_source_mapping"
    }

    fn description(&self) -> &'static str {
        "Deletes an event source mapping."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EventSourceMappingIdConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EventSourceMapping)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EventSourceMappingIdConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .delete_event_source_mapping()
            .uuid(cfg.uuid)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteEventSourceMapping", e))?;
        to_output(EventSourceMapping::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListEventSourceMappingsConfig {
    #[schemars(description = "Only list mappings for this event source ARN")]
    pub event_source_arn: Option<String>,
    #[schemars(description = "Only list mappings for this function")]
    pub function_name: Option<String>,
    pub marker: Option<String>,
    pub max_items: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListEventSourceMappingsResponse {
    pub event_source_mappings: Option<Vec<EventSourceMapping>>,
    pub next_marker: Option<String>,
}

/// Wraps Lambda `ListEventSourceMappings`.
pub struct ListEventSourceMappings;

#[async_trait]
impl Block for ListEventSourceMappings {
    fn name(&self) -> &'static str {
        "lambda.list_event_source_mappings"
    }

    fn description(&self) -> &'static str {
        "Lists event source mappings, optionally scoped to a source or function."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListEventSourceMappingsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListEventSourceMappingsResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListEventSourceMappingsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_event_source_mappings()
            .set_event_source_arn(cfg.event_source_arn)
            .set_function_name(cfg.function_name)
            .set_marker(cfg.marker)
            .set_max_items(cfg.max_items)
            .send()
            .await
            .map_err(|e| BlockError::api("ListEventSourceMappings", e))?;
        to_output(ListEventSourceMappingsResponse {
            event_source_mappings: output
                .event_source_mappings
                .map(|list| list.into_iter().map(EventSourceMapping::from).collect()),
            next_marker: output.next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_mapping_config_parses_kinesis_request() {
        let cfg: CreateEventSourceMappingConfig = parse_config(json!({
            "FunctionName": "orders-consumer",
            "EventSourceArn": "arn:aws:kinesis:us-east-1:123456789012:stream/orders",
            "StartingPosition": "TRIM_HORIZON",
            "BatchSize": 100,
            "ParallelizationFactor": 2
        }))
        .unwrap();
        assert_eq!(cfg.starting_position.as_deref(), Some("TRIM_HORIZON"));
        assert_eq!(cfg.batch_size, Some(100));
    }

    #[test]
    fn mapping_id_config_uses_caps_uuid_member() {
        let cfg: EventSourceMappingIdConfig =
            parse_config(json!({"UUID": "14e0db71-abcd-4242-a18f-2f21fa3b6e2f"})).unwrap();
        assert_eq!(cfg.uuid, "14e0db71-abcd-4242-a18f-2f21fa3b6e2f");

        let schema = serde_json::to_value(GetEventSourceMapping.config_schema()).unwrap();
        assert!(schema["properties"]["UUID"].is_object());
        assert_eq!(schema["required"], json!(["UUID"]));
    }

    #[test]
    fn update_mapping_schema_requires_only_uuid() {
        let schema = serde_json::to_value(UpdateEventSourceMapping.config_schema()).unwrap();
        assert_eq!(schema["required"], json!(["UUID"]));
    }
}

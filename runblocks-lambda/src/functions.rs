//! Function lifecycle blocks: create, delete, get, update, list, invoke,
//! and version publishing.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_lambda::types::{
    FunctionVersion, InvocationType, LogType, PackageType, Runtime,
};
use runblocks_core::convert::{blob_from_base64, value_from_blob};
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use aws_smithy_types::Blob;

use crate::types::{
    architectures, client, Concurrency, DeadLetterConfigInput, EnvironmentInput,
    FunctionCodeInput, FunctionCodeLocation, FunctionConfiguration, TracingConfigInput,
    VpcConfigInput,
};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateFunctionConfig {
    #[schemars(description = "Name of the function, up to 64 characters")]
    pub function_name: String,
    #[schemars(description = "ARN of the function's execution role")]
    pub role: String,
    #[schemars(description = "Deployment package: zip contents, S3 location, or container image")]
    pub code: FunctionCodeInput,
    #[schemars(description = "Runtime identifier, e.g. python3.12; required for Zip packages")]
    pub runtime: Option<String>,
    #[schemars(description = "Entry point, e.g. app.handler; required for Zip packages")]
    pub handler: Option<String>,
    #[schemars(description = "Description of the function")]
    pub description: Option<String>,
    #[schemars(description = "Timeout in seconds, 1-900; default 3")]
    pub timeout: Option<i32>,
    #[schemars(description = "Memory in MB, 128-10240; default 128")]
    pub memory_size: Option<i32>,
    #[schemars(description = "Publish a version on creation")]
    pub publish: Option<bool>,
    #[schemars(description = "Zip | Image; default Zip")]
    pub package_type: Option<String>,
    pub environment: Option<EnvironmentInput>,
    pub vpc_config: Option<VpcConfigInput>,
    pub dead_letter_config: Option<DeadLetterConfigInput>,
    #[schemars(description = "KMS key for encrypting environment variables")]
    pub kms_key_arn: Option<String>,
    pub tracing_config: Option<TracingConfigInput>,
    #[schemars(description = "Layer version ARNs to add to the execution environment")]
    pub layers: Option<Vec<String>>,
    #[schemars(description = "Instruction set: x86_64 | arm64; default x86_64")]
    pub architectures: Option<Vec<String>>,
    #[schemars(description = "Tags to apply to the function")]
    pub tags: Option<HashMap<String, String>>,
}

/// Wraps Lambda `CreateFunction`.
pub struct CreateFunction;

#[async_trait]
impl Block for CreateFunction {
    fn name(&self) -> &'static str {
        "lambda.create_function"
    }

    fn description(&self) -> &'static str {
        "Creates a Lambda function from a deployment package or container image."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CreateFunctionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(FunctionConfiguration)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CreateFunctionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .create_function()
            .function_name(cfg.function_name)
            .role(cfg.role)
            .code(cfg.code.into_sdk()?)
            .set_runtime(cfg.runtime.as_deref().map(Runtime::from))
            .set_handler(cfg.handler)
            .set_description(cfg.description)
            .set_timeout(cfg.timeout)
            .set_memory_size(cfg.memory_size)
            .set_publish(cfg.publish)
            .set_package_type(cfg.package_type.as_deref().map(PackageType::from))
            .set_environment(cfg.environment.map(EnvironmentInput::into_sdk))
            .set_vpc_config(cfg.vpc_config.map(VpcConfigInput::into_sdk))
            .set_dead_letter_config(cfg.dead_letter_config.map(DeadLetterConfigInput::into_sdk))
            .set_kms_key_arn(cfg.kms_key_arn)
            .set_tracing_config(cfg.tracing_config.map(TracingConfigInput::into_sdk))
            .set_layers(cfg.layers)
            .set_architectures(architectures(cfg.architectures))
            .set_tags(cfg.tags)
            .send()
            .await
            .map_err(|e| BlockError::api("CreateFunction", e))?;
        to_output(FunctionConfiguration::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteFunctionConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "Version to delete; omit to delete the whole function")]
    pub qualifier: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteFunctionResponse {}

/// Wraps Lambda `DeleteFunction`.
pub struct DeleteFunction;

#[async_trait]
impl Block for DeleteFunction {
    fn name(&self) -> &'static str {
        "lambda.delete_function"
    }

    fn description(&self) -> &'static str {
        "Deletes a Lambda function or one of its published versions."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DeleteFunctionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DeleteFunctionResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DeleteFunctionConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .delete_function()
            .function_name(cfg.function_name)
            .set_qualifier(cfg.qualifier)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteFunction", e))?;
        to_output(DeleteFunctionResponse {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct GetFunctionConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "Version or alias to get details about")]
    pub qualifier: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct GetFunctionResponse {
    pub configuration: Option<FunctionConfiguration>,
    pub code: Option<FunctionCodeLocation>,
    pub tags: Option<HashMap<String, String>>,
    pub concurrency: Option<Concurrency>,
}

/// Wraps Lambda `GetFunction`.
pub struct GetFunction;

#[async_trait]
impl Block for GetFunction {
    fn name(&self) -> &'static str {
        "lambda.get_function"
    }

    fn description(&self) -> &'static str {
        "Returns a function's configuration plus a presigned URL for its deployment package."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(GetFunctionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(GetFunctionResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: GetFunctionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_function()
            .function_name(cfg.function_name)
            .set_qualifier(cfg.qualifier)
            .send()
            .await
            .map_err(|e| BlockError::api("GetFunction", e))?;
        to_output(GetFunctionResponse {
            configuration: output.configuration.map(FunctionConfiguration::from),
            code: output.code.map(FunctionCodeLocation::from),
            tags: output.tags,
            concurrency: output.concurrency.map(|c| Concurrency {
                reserved_concurrent_executions: c.reserved_concurrent_executions,
            }),
        })
    }
}

/// Wraps Lambda `GetFunctionConfiguration`.
pub struct GetFunctionConfiguration;

#[async_trait]
impl Block for GetFunctionConfiguration {
    fn name(&self) -> &'static str {
        "lambda.get_function_configuration"
    }

    fn description(&self) -> &'static str {
        "Returns the version-specific settings of a Lambda function."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(GetFunctionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(FunctionConfiguration)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: GetFunctionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_function_configuration()
            .function_name(cfg.function_name)
            .set_qualifier(cfg.qualifier)
            .send()
            .await
            .map_err(|e| BlockError::api("GetFunctionConfiguration", e))?;
        to_output(FunctionConfiguration::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateFunctionCodeConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "Base64-encoded zip file contents")]
    pub zip_file: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_key: Option<String>,
    pub s3_object_version: Option<String>,
    #[schemars(description = "URI of a container image in Amazon ECR")]
    pub image_uri: Option<String>,
    #[schemars(description = "Publish a new version after updating the code")]
    pub publish: Option<bool>,
    #[schemars(description = "Validate the request without modifying the function")]
    pub dry_run: Option<bool>,
    #[schemars(description = "Only update if the revision ID matches")]
    pub revision_id: Option<String>,
    pub architectures: Option<Vec<String>>,
}

/// Wraps Lambda `UpdateFunctionCode`.
pub struct UpdateFunctionCode;

#[async_trait]
impl Block for UpdateFunctionCode {
    fn name(&self) -> &'static str {
        "lambda.update_function_code"
    }

    fn description(&self) -> &'static str {
        "Updates a Lambda function's deployment package."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(UpdateFunctionCodeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(FunctionConfiguration)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: UpdateFunctionCodeConfig = parse_config(config)?;
        let zip_file = cfg
            .zip_file
            .as_deref()
            .map(|encoded| blob_from_base64("ZipFile", encoded))
            .transpose()?;
        let client = client(connection).await?;
        let output = client
            .update_function_code()
            .function_name(cfg.function_name)
            .set_zip_file(zip_file)
            .set_s3_bucket(cfg.s3_bucket)
            .set_s3_key(cfg.s3_key)
            .set_s3_object_version(cfg.s3_object_version)
            .set_image_uri(cfg.image_uri)
            .set_publish(cfg.publish)
            .set_dry_run(cfg.dry_run)
            .set_revision_id(cfg.revision_id)
            .set_architectures(architectures(cfg.architectures))
            .send()
            .await
            .map_err(|e| BlockError::api("UpdateFunctionCode", e))?;
        to_output(FunctionConfiguration::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateFunctionConfigurationConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    pub role: Option<String>,
    pub handler: Option<String>,
    pub description: Option<String>,
    pub timeout: Option<i32>,
    pub memory_size: Option<i32>,
    pub runtime: Option<String>,
    pub environment: Option<EnvironmentInput>,
    pub vpc_config: Option<VpcConfigInput>,
    pub dead_letter_config: Option<DeadLetterConfigInput>,
    pub kms_key_arn: Option<String>,
    pub tracing_config: Option<TracingConfigInput>,
    #[schemars(description = "Only update if the revision ID matches")]
    pub revision_id: Option<String>,
    #[schemars(description = "Layer version ARNs; replaces the current list")]
    pub layers: Option<Vec<String>>,
}

/// Wraps Lambda `UpdateFunctionConfiguration`.
pub struct UpdateFunctionConfiguration;

#[async_trait]
impl Block for UpdateFunctionConfiguration {
    fn name(&self) -> &'static str {
        "lambda.update_function_configuration"
    }

    fn description(&self) -> &'static str {
        "Modifies the version-specific settings of a Lambda function."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(UpdateFunctionConfigurationConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(FunctionConfiguration)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: UpdateFunctionConfigurationConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .update_function_configuration()
            .function_name(cfg.function_name)
            .set_role(cfg.role)
            .set_handler(cfg.handler)
            .set_description(cfg.description)
            .set_timeout(cfg.timeout)
            .set_memory_size(cfg.memory_size)
            .set_runtime(cfg.runtime.as_deref().map(Runtime::from))
            .set_environment(cfg.environment.map(EnvironmentInput::into_sdk))
            .set_vpc_config(cfg.vpc_config.map(VpcConfigInput::into_sdk))
            .set_dead_letter_config(cfg.dead_letter_config.map(DeadLetterConfigInput::into_sdk))
            .set_kms_key_arn(cfg.kms_key_arn)
            .set_tracing_config(cfg.tracing_config.map(TracingConfigInput::into_sdk))
            .set_revision_id(cfg.revision_id)
            .set_layers(cfg.layers)
            .send()
            .await
            .map_err(|e| BlockError::api("UpdateFunctionConfiguration", e))?;
        to_output(FunctionConfiguration::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListFunctionsConfig {
    #[schemars(description = "For Lambda@Edge, the master function's region")]
    pub master_region: Option<String>,
    #[schemars(description = "Set to ALL to include all published versions")]
    pub function_version: Option<String>,
    #[schemars(description = "Pagination token from a previous call")]
    pub marker: Option<String>,
    #[schemars(description = "Maximum number of functions to return, up to 10000")]
    pub max_items: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListFunctionsResponse {
    pub functions: Option<Vec<FunctionConfiguration>>,
    pub next_marker: Option<String>,
}

/// Wraps Lambda `ListFunctions`.
pub struct ListFunctions;

#[async_trait]
impl Block for ListFunctions {
    fn name(&self) -> &'static str {
        "lambda.list_functions"
    }

    fn description(&self) -> &'static str {
        "Returns a page of Lambda functions, with the version-specific configuration of each."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListFunctionsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListFunctionsResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListFunctionsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_functions()
            .set_master_region(cfg.master_region)
            .set_function_version(cfg.function_version.as_deref().map(FunctionVersion::from))
            .set_marker(cfg.marker)
            .set_max_items(cfg.max_items)
            .send()
            .await
            .map_err(|e| BlockError::api("ListFunctions", e))?;
        to_output(ListFunctionsResponse {
            functions: output
                .functions
                .map(|list| list.into_iter().map(FunctionConfiguration::from).collect()),
            next_marker: output.next_marker,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "RequestResponse | Event | DryRun; default RequestResponse")]
    pub invocation_type: Option<String>,
    #[schemars(description = "Set to Tail to include the last 4 KB of execution log")]
    pub log_type: Option<String>,
    #[schemars(description = "Base64-encoded context passed to the function")]
    pub client_context: Option<String>,
    #[schemars(description = "Version or alias to invoke")]
    pub qualifier: Option<String>,
    #[schemars(description = "JSON input passed to the function")]
    pub payload: Option<Value>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    #[schemars(description = "HTTP status code: 200, or 202 for Event invocations")]
    pub status_code: i32,
    #[schemars(description = "Present if the function returned an error")]
    pub function_error: Option<String>,
    #[schemars(description = "Base64-encoded last 4 KB of execution log, when requested")]
    pub log_result: Option<String>,
    pub executed_version: Option<String>,
    #[schemars(description = "The function's response, decoded from JSON when possible")]
    pub payload: Option<Value>,
}

/// Wraps Lambda `Invoke`, the synchronous and asynchronous invocation entry
/// point.
pub struct Invoke;

#[async_trait]
impl Block for Invoke {
    fn name(&self) -> &'static str {
        "lambda.invoke"
    }

    fn description(&self) -> &'static str {
        "Invokes a Lambda function, synchronously by default."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(InvokeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(InvokeResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: InvokeConfig = parse_config(config)?;
        let payload = cfg
            .payload
            .map(|value| serde_json::to_vec(&value).map(Blob::new))
            .transpose()?;
        let client = client(connection).await?;
        let output = client
            .invoke()
            .function_name(cfg.function_name)
            .set_invocation_type(cfg.invocation_type.as_deref().map(InvocationType::from))
            .set_log_type(cfg.log_type.as_deref().map(LogType::from))
            .set_client_context(cfg.client_context)
            .set_qualifier(cfg.qualifier)
            .set_payload(payload)
            .send()
            .await
            .map_err(|e| BlockError::api("Invoke", e))?;
        to_output(InvokeResponse {
            status_code: output.status_code,
            function_error: output.function_error,
            log_result: output.log_result,
            executed_version: output.executed_version,
            payload: output.payload.map(value_from_blob),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PublishVersionConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "Only publish if the code hash matches")]
    pub code_sha256: Option<String>,
    #[schemars(description = "Description for the version")]
    pub description: Option<String>,
    #[schemars(description = "Only publish if the revision ID matches")]
    pub revision_id: Option<String>,
}

/// Wraps Lambda `PublishVersion`.
pub struct PublishVersion;

#[async_trait]
impl Block for PublishVersion {
    fn name(&self) -> &'static str {
        "lambda.publish_version"
    }

    fn description(&self) -> &'static str {
        "Creates an immutable version from the function's current code and configuration."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(PublishVersionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(FunctionConfiguration)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: PublishVersionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .publish_version()
            .function_name(cfg.function_name)
            .set_code_sha256(cfg.code_sha256)
            .set_description(cfg.description)
            .set_revision_id(cfg.revision_id)
            .send()
            .await
            .map_err(|e| BlockError::api("PublishVersion", e))?;
        to_output(FunctionConfiguration::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListVersionsByFunctionConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    pub marker: Option<String>,
    pub max_items: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ListVersionsByFunctionResponse {
    pub versions: Option<Vec<FunctionConfiguration>>,
    pub next_marker: Option<String>,
}

/// Wraps Lambda `ListVersionsByFunction`.
pub struct ListVersionsByFunction;

#[async_trait]
impl Block for ListVersionsByFunction {
    fn name(&self) -> &'static str {
        "lambda.list_versions_by_function"
    }

    fn description(&self) -> &'static str {
        "Returns a page of a function's published versions, $LATEST included."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ListVersionsByFunctionConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ListVersionsByFunctionResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ListVersionsByFunctionConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .list_versions_by_function()
            .function_name(cfg.function_name)
            .set_marker(cfg.marker)
            .set_max_items(cfg.max_items)
            .send()
            .await
            .map_err(|e| BlockError::api("ListVersionsByFunction", e))?;
        to_output(ListVersionsByFunctionResponse {
            versions: output
                .versions
                .map(|list| list.into_iter().map(FunctionConfiguration::from).collect()),
            next_marker: output.next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_function_config_parses_zip_request() {
        let cfg: CreateFunctionConfig = parse_config(json!({
            "FunctionName": "orders-api",
            "Role": "arn:aws:iam::123456789012:role/orders-api",
            "Runtime": "python3.12",
            "Handler": "app.handler",
            "Code": {"S3Bucket": "artifacts", "S3Key": "orders-api.zip"},
            "Environment": {"Variables": {"TABLE": "orders"}},
            "Timeout": 30,
            "MemorySize": 256
        }))
        .unwrap();

        assert_eq!(cfg.function_name, "orders-api");
        assert_eq!(cfg.code.s3_bucket.as_deref(), Some("artifacts"));
        let variables = cfg.environment.unwrap().variables.unwrap();
        assert_eq!(variables.get("TABLE").map(String::as_str), Some("orders"));
    }

    #[test]
    fn create_function_schema_requires_name_role_and_code() {
        let schema = serde_json::to_value(CreateFunction.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        for member in ["FunctionName", "Role", "Code"] {
            assert!(required.contains(&json!(member)), "missing {member}");
        }
    }

    #[test]
    fn invoke_config_carries_json_payload() {
        let cfg: InvokeConfig = parse_config(json!({
            "FunctionName": "orders-api",
            "InvocationType": "Event",
            "Payload": {"order_id": 42}
        }))
        .unwrap();
        assert_eq!(cfg.payload, Some(json!({"order_id": 42})));
    }

    #[test]
    fn get_function_response_serializes_api_field_names() {
        let json = serde_json::to_value(GetFunctionResponse {
            configuration: None,
            code: Some(FunctionCodeLocation {
                repository_type: Some("S3".to_string()),
                location: Some("https://example".to_string()),
                image_uri: None,
                resolved_image_uri: None,
            }),
            tags: None,
            concurrency: Some(Concurrency {
                reserved_concurrent_executions: Some(10),
            }),
        })
        .unwrap();

        assert_eq!(json["Code"]["RepositoryType"], "S3");
        assert_eq!(json["Concurrency"]["ReservedConcurrentExecutions"], 10);
    }

    #[test]
    fn list_functions_config_accepts_all_versions_flag() {
        let cfg: ListFunctionsConfig =
            parse_config(json!({"FunctionVersion": "ALL", "MaxItems": 50})).unwrap();
        assert_eq!(cfg.function_version.as_deref(), Some("ALL"));
        assert_eq!(cfg.max_items, Some(50));
    }
}

//! Shared Lambda input fragments and serializable response models.
//!
//! Lambda re-emits the function configuration shape from five different
//! operations and the event source mapping shape from four; the `From`
//! conversions come from macros over the field-compatible SDK types.

use std::collections::HashMap;

use aws_sdk_lambda::types::{Architecture, Runtime, TracingMode};
use aws_sdk_lambda::Client;
use runblocks_core::convert::{blob_from_base64, timestamp};
use runblocks_core::{AwsConnection, BlockResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub(crate) async fn client(connection: &AwsConnection) -> BlockResult<Client> {
    Ok(Client::new(&connection.sdk_config().await?))
}

pub(crate) fn runtime_names(list: Option<Vec<Runtime>>) -> Option<Vec<String>> {
    list.map(|list| list.into_iter().map(|v| v.as_str().to_owned()).collect())
}

pub(crate) fn architecture_names(list: Option<Vec<Architecture>>) -> Option<Vec<String>> {
    list.map(|list| list.into_iter().map(|v| v.as_str().to_owned()).collect())
}

pub(crate) fn runtimes(list: Option<Vec<String>>) -> Option<Vec<Runtime>> {
    list.map(|list| list.iter().map(|v| Runtime::from(v.as_str())).collect())
}

pub(crate) fn architectures(list: Option<Vec<String>>) -> Option<Vec<Architecture>> {
    list.map(|list| list.iter().map(|v| Architecture::from(v.as_str())).collect())
}

/// Deployment package for CreateFunction, as the Lambda API shapes it.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCodeInput {
    #[schemars(description = "Base64-encoded zip file contents")]
    pub zip_file: Option<String>,
    #[schemars(description = "S3 bucket holding the deployment package")]
    pub s3_bucket: Option<String>,
    #[schemars(description = "S3 key of the deployment package")]
    pub s3_key: Option<String>,
    #[schemars(description = "Version of the S3 object to use")]
    pub s3_object_version: Option<String>,
    #[schemars(description = "URI of a container image in Amazon ECR")]
    pub image_uri: Option<String>,
}

impl FunctionCodeInput {
    pub(crate) fn into_sdk(self) -> BlockResult<aws_sdk_lambda::types::FunctionCode> {
        let zip_file = self
            .zip_file
            .as_deref()
            .map(|encoded| blob_from_base64("Code.ZipFile", encoded))
            .transpose()?;
        Ok(aws_sdk_lambda::types::FunctionCode::builder()
            .set_zip_file(zip_file)
            .set_s3_bucket(self.s3_bucket)
            .set_s3_key(self.s3_key)
            .set_s3_object_version(self.s3_object_version)
            .set_image_uri(self.image_uri)
            .build())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentInput {
    #[schemars(description = "Environment variable names and values")]
    pub variables: Option<HashMap<String, String>>,
}

impl EnvironmentInput {
    pub(crate) fn into_sdk(self) -> aws_sdk_lambda::types::Environment {
        aws_sdk_lambda::types::Environment::builder()
            .set_variables(self.variables)
            .build()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfigInput {
    #[schemars(description = "Subnets the function's ENIs are created in")]
    pub subnet_ids: Option<Vec<String>>,
    #[schemars(description = "Security groups applied to the function's ENIs")]
    pub security_group_ids: Option<Vec<String>>,
}

impl VpcConfigInput {
    pub(crate) fn into_sdk(self) -> aws_sdk_lambda::types::VpcConfig {
        aws_sdk_lambda::types::VpcConfig::builder()
            .set_subnet_ids(self.subnet_ids)
            .set_security_group_ids(self.security_group_ids)
            .build()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeadLetterConfigInput {
    #[schemars(description = "ARN of the SQS queue or SNS topic for failed events")]
    pub target_arn: Option<String>,
}

impl DeadLetterConfigInput {
    pub(crate) fn into_sdk(self) -> aws_sdk_lambda::types::DeadLetterConfig {
        aws_sdk_lambda::types::DeadLetterConfig::builder()
            .set_target_arn(self.target_arn)
            .build()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TracingConfigInput {
    #[schemars(description = "X-Ray tracing mode: Active | PassThrough")]
    pub mode: String,
}

impl TracingConfigInput {
    pub(crate) fn into_sdk(self) -> aws_sdk_lambda::types::TracingConfig {
        aws_sdk_lambda::types::TracingConfig::builder()
            .mode(TracingMode::from(self.mode.as_str()))
            .build()
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentError {
    pub error_code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentResponse {
    pub variables: Option<HashMap<String, String>>,
    pub error: Option<EnvironmentError>,
}

impl From<aws_sdk_lambda::types::EnvironmentResponse> for EnvironmentResponse {
    fn from(value: aws_sdk_lambda::types::EnvironmentResponse) -> Self {
        Self {
            variables: value.variables,
            error: value.error.map(|error| EnvironmentError {
                error_code: error.error_code,
                message: error.message,
            }),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfigResponse {
    pub subnet_ids: Option<Vec<String>>,
    pub security_group_ids: Option<Vec<String>>,
    pub vpc_id: Option<String>,
}

impl From<aws_sdk_lambda::types::VpcConfigResponse> for VpcConfigResponse {
    fn from(value: aws_sdk_lambda::types::VpcConfigResponse) -> Self {
        Self {
            subnet_ids: value.subnet_ids,
            security_group_ids: value.security_group_ids,
            vpc_id: value.vpc_id,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeadLetterConfig {
    pub target_arn: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TracingConfigResponse {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerReference {
    pub arn: Option<String>,
    pub code_size: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EphemeralStorage {
    #[schemars(description = "Size of /tmp in MB")]
    pub size: i32,
}

/// A function's configuration, as Lambda reports it. Lambda's `LastModified`
/// is already an ISO 8601 string on the wire and passes through untouched.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionConfiguration {
    pub function_name: Option<String>,
    pub function_arn: Option<String>,
    pub runtime: Option<String>,
    #[schemars(description = "ARN of the function's execution role")]
    pub role: Option<String>,
    pub handler: Option<String>,
    pub code_size: i64,
    pub description: Option<String>,
    pub timeout: Option<i32>,
    pub memory_size: Option<i32>,
    pub last_modified: Option<String>,
    pub code_sha256: Option<String>,
    pub version: Option<String>,
    pub environment: Option<EnvironmentResponse>,
    pub vpc_config: Option<VpcConfigResponse>,
    pub dead_letter_config: Option<DeadLetterConfig>,
    pub kms_key_arn: Option<String>,
    pub tracing_config: Option<TracingConfigResponse>,
    pub master_arn: Option<String>,
    pub revision_id: Option<String>,
    pub layers: Option<Vec<LayerReference>>,
    #[schemars(description = "Pending | Active | Inactive | Failed")]
    pub state: Option<String>,
    pub state_reason: Option<String>,
    pub state_reason_code: Option<String>,
    pub last_update_status: Option<String>,
    pub last_update_status_reason: Option<String>,
    pub last_update_status_reason_code: Option<String>,
    pub package_type: Option<String>,
    pub architectures: Option<Vec<String>>,
    pub ephemeral_storage: Option<EphemeralStorage>,
}

macro_rules! impl_function_configuration_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for FunctionConfiguration {
            fn from(value: $source) -> Self {
                Self {
                    function_name: value.function_name,
                    function_arn: value.function_arn,
                    runtime: value.runtime.map(|v| v.as_str().to_owned()),
                    role: value.role,
                    handler: value.handler,
                    code_size: value.code_size,
                    description: value.description,
                    timeout: value.timeout,
                    memory_size: value.memory_size,
                    last_modified: value.last_modified,
                    code_sha256: value.code_sha256,
                    version: value.version,
                    environment: value.environment.map(EnvironmentResponse::from),
                    vpc_config: value.vpc_config.map(VpcConfigResponse::from),
                    dead_letter_config: value.dead_letter_config.map(|v| DeadLetterConfig {
                        target_arn: v.target_arn,
                    }),
                    kms_key_arn: value.kms_key_arn,
                    tracing_config: value.tracing_config.map(|v| TracingConfigResponse {
                        mode: v.mode.map(|m| m.as_str().to_owned()),
                    }),
                    master_arn: value.master_arn,
                    revision_id: value.revision_id,
                    layers: value.layers.map(|list| {
                        list.into_iter()
                            .map(|layer| LayerReference {
                                arn: layer.arn,
                                code_size: layer.code_size,
                            })
                            .collect()
                    }),
                    state: value.state.map(|v| v.as_str().to_owned()),
                    state_reason: value.state_reason,
                    state_reason_code: value.state_reason_code.map(|v| v.as_str().to_owned()),
                    last_update_status: value.last_update_status.map(|v| v.as_str().to_owned()),
                    last_update_status_reason: value.last_update_status_reason,
                    last_update_status_reason_code: value
                        .last_update_status_reason_code
                        .map(|v| v.as_str().to_owned()),
                    package_type: value.package_type.map(|v| v.as_str().to_owned()),
                    architectures: architecture_names(value.architectures),
                    ephemeral_storage: value.ephemeral_storage.map(|v| EphemeralStorage {
                        size: v.size,
                    }),
                }
            }
        }
    )+};
}

impl_function_configuration_from!(
    aws_sdk_lambda::types::FunctionConfiguration,
    aws_sdk_lambda::operation::create_function::CreateFunctionOutput,
    aws_sdk_lambda::operation::get_function_configuration::GetFunctionConfigurationOutput,
    aws_sdk_lambda::operation::update_function_code::UpdateFunctionCodeOutput,
    aws_sdk_lambda::operation::update_function_configuration::UpdateFunctionConfigurationOutput,
    aws_sdk_lambda::operation::publish_version::PublishVersionOutput,
);

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCodeLocation {
    #[schemars(description = "Repository type, e.g. S3 or ECR")]
    pub repository_type: Option<String>,
    #[schemars(description = "Presigned URL for the deployment package")]
    pub location: Option<String>,
    pub image_uri: Option<String>,
    pub resolved_image_uri: Option<String>,
}

impl From<aws_sdk_lambda::types::FunctionCodeLocation> for FunctionCodeLocation {
    fn from(value: aws_sdk_lambda::types::FunctionCodeLocation) -> Self {
        Self {
            repository_type: value.repository_type,
            location: value.location,
            image_uri: value.image_uri,
            resolved_image_uri: value.resolved_image_uri,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Concurrency {
    pub reserved_concurrent_executions: Option<i32>,
}

/// An event source mapping, as Lambda reports it from the create, get,
/// update, delete, and list operations.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EventSourceMapping {
    #[serde(rename = "UUID")]
    #[schemars(description = "Identifier of the event source mapping")]
    pub uuid: Option<String>,
    pub event_source_arn: Option<String>,
    pub function_arn: Option<String>,
    #[schemars(description = "TRIM_HORIZON | LATEST | AT_TIMESTAMP")]
    pub starting_position: Option<String>,
    pub starting_position_timestamp: Option<String>,
    pub batch_size: Option<i32>,
    pub maximum_batching_window_in_seconds: Option<i32>,
    pub parallelization_factor: Option<i32>,
    pub last_modified: Option<String>,
    pub last_processing_result: Option<String>,
    #[schemars(
        description = "Creating | Enabling | Enabled | Disabling | Disabled | Updating | Deleting"
    )]
    pub state: Option<String>,
    pub state_transition_reason: Option<String>,
    pub topics: Option<Vec<String>>,
    pub queues: Option<Vec<String>>,
    pub maximum_record_age_in_seconds: Option<i32>,
    pub bisect_batch_on_function_error: Option<bool>,
    pub maximum_retry_attempts: Option<i32>,
    pub tumbling_window_in_seconds: Option<i32>,
}

macro_rules! impl_event_source_mapping_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for EventSourceMapping {
            fn from(value: $source) -> Self {
                Self {
                    uuid: value.uuid,
                    event_source_arn: value.event_source_arn,
                    function_arn: value.function_arn,
                    starting_position: value.starting_position.map(|v| v.as_str().to_owned()),
                    starting_position_timestamp: timestamp(value.starting_position_timestamp),
                    batch_size: value.batch_size,
                    maximum_batching_window_in_seconds: value.maximum_batching_window_in_seconds,
                    parallelization_factor: value.parallelization_factor,
                    last_modified: timestamp(value.last_modified),
                    last_processing_result: value.last_processing_result,
                    state: value.state,
                    state_transition_reason: value.state_transition_reason,
                    topics: value.topics,
                    queues: value.queues,
                    maximum_record_age_in_seconds: value.maximum_record_age_in_seconds,
                    bisect_batch_on_function_error: value.bisect_batch_on_function_error,
                    maximum_retry_attempts: value.maximum_retry_attempts,
                    tumbling_window_in_seconds: value.tumbling_window_in_seconds,
                }
            }
        }
    )+};
}

impl_event_source_mapping_from!(
    aws_sdk_lambda::types::EventSourceMappingConfiguration,
    aws_sdk_lambda::operation::create_event_source_mapping::CreateEventSourceMappingOutput,
    aws_sdk_lambda::operation::get_event_source_mapping::GetEventSourceMappingOutput,
    aws_sdk_lambda::operation::update_event_source_mapping::UpdateEventSourceMappingOutput,
    aws_sdk_lambda::operation::delete_event_source_mapping::DeleteEventSourceMappingOutput,
);

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerVersionContent {
    #[schemars(description = "Presigned URL for the layer archive, valid for 10 minutes")]
    pub location: Option<String>,
    pub code_sha256: Option<String>,
    pub code_size: i64,
    pub signing_profile_version_arn: Option<String>,
    pub signing_job_arn: Option<String>,
}

impl From<aws_sdk_lambda::types::LayerVersionContentOutput> for LayerVersionContent {
    fn from(value: aws_sdk_lambda::types::LayerVersionContentOutput) -> Self {
        Self {
            location: value.location,
            code_sha256: value.code_sha256,
            code_size: value.code_size,
            signing_profile_version_arn: value.signing_profile_version_arn,
            signing_job_arn: value.signing_job_arn,
        }
    }
}

/// A layer version, as PublishLayerVersion and GetLayerVersion report it.
/// Lambda's `CreatedDate` is an ISO 8601 string on the wire.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerVersion {
    pub content: Option<LayerVersionContent>,
    pub layer_arn: Option<String>,
    pub layer_version_arn: Option<String>,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub version: i64,
    pub compatible_runtimes: Option<Vec<String>>,
    pub license_info: Option<String>,
    pub compatible_architectures: Option<Vec<String>>,
}

macro_rules! impl_layer_version_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for LayerVersion {
            fn from(value: $source) -> Self {
                Self {
                    content: value.content.map(LayerVersionContent::from),
                    layer_arn: value.layer_arn,
                    layer_version_arn: value.layer_version_arn,
                    description: value.description,
                    created_date: value.created_date,
                    version: value.version,
                    compatible_runtimes: runtime_names(value.compatible_runtimes),
                    license_info: value.license_info,
                    compatible_architectures: architecture_names(value.compatible_architectures),
                }
            }
        }
    )+};
}

impl_layer_version_from!(
    aws_sdk_lambda::operation::publish_layer_version::PublishLayerVersionOutput,
    aws_sdk_lambda::operation::get_layer_version::GetLayerVersionOutput,
);

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerVersionSummary {
    pub layer_version_arn: Option<String>,
    pub version: i64,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub compatible_runtimes: Option<Vec<String>>,
    pub license_info: Option<String>,
    pub compatible_architectures: Option<Vec<String>>,
}

impl From<aws_sdk_lambda::types::LayerVersionsListItem> for LayerVersionSummary {
    fn from(value: aws_sdk_lambda::types::LayerVersionsListItem) -> Self {
        Self {
            layer_version_arn: value.layer_version_arn,
            version: value.version,
            description: value.description,
            created_date: value.created_date,
            compatible_runtimes: runtime_names(value.compatible_runtimes),
            license_info: value.license_info,
            compatible_architectures: architecture_names(value.compatible_architectures),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LayerSummary {
    pub layer_name: Option<String>,
    pub layer_arn: Option<String>,
    pub latest_matching_version: Option<LayerVersionSummary>,
}

impl From<aws_sdk_lambda::types::LayersListItem> for LayerSummary {
    fn from(value: aws_sdk_lambda::types::LayersListItem) -> Self {
        Self {
            layer_name: value.layer_name,
            layer_arn: value.layer_arn,
            latest_matching_version: value
                .latest_matching_version
                .map(LayerVersionSummary::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_lambda::types::{PackageType, State};

    #[test]
    fn function_configuration_converts_from_sdk_shape() {
        let sdk = aws_sdk_lambda::types::FunctionConfiguration::builder()
            .function_name("orders-api")
            .function_arn("arn:aws:lambda:us-east-1:123456789012:function:orders-api")
            .runtime(Runtime::Python312)
            .handler("app.handler")
            .code_size(1024)
            .timeout(30)
            .memory_size(256)
            .last_modified("2024-03-01T12:00:00.000+0000")
            .state(State::Active)
            .package_type(PackageType::Zip)
            .architectures(Architecture::Arm64)
            .build();

        let model = FunctionConfiguration::from(sdk);
        assert_eq!(model.function_name.as_deref(), Some("orders-api"));
        assert_eq!(model.runtime.as_deref(), Some("python3.12"));
        assert_eq!(model.state.as_deref(), Some("Active"));
        assert_eq!(model.architectures.as_deref(), Some(["arm64".to_string()].as_slice()));

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["MemorySize"], 256);
        assert_eq!(json["CodeSize"], 1024);
        assert_eq!(json["LastModified"], "2024-03-01T12:00:00.000+0000");
    }

    #[test]
    fn event_source_mapping_serializes_uuid_in_caps() {
        let sdk = aws_sdk_lambda::types::EventSourceMappingConfiguration::builder()
            .uuid("14e0db71-abcd-4242-a18f-2f21fa3b6e2f")
            .state("Enabled")
            .batch_size(10)
            .build();

        let json = serde_json::to_value(EventSourceMapping::from(sdk)).unwrap();
        assert_eq!(json["UUID"], "14e0db71-abcd-4242-a18f-2f21fa3b6e2f");
        assert_eq!(json["State"], "Enabled");
        assert_eq!(json["BatchSize"], 10);
    }

    #[test]
    fn function_code_input_maps_s3_coordinates() {
        let code = FunctionCodeInput {
            zip_file: None,
            s3_bucket: Some("artifacts".to_string()),
            s3_key: Some("orders-api.zip".to_string()),
            s3_object_version: None,
            image_uri: None,
        }
        .into_sdk()
        .unwrap();

        assert_eq!(code.s3_bucket.as_deref(), Some("artifacts"));
        assert!(code.zip_file.is_none());
    }

    #[test]
    fn function_code_input_rejects_bad_base64() {
        let result = FunctionCodeInput {
            zip_file: Some("!!!".to_string()),
            s3_bucket: None,
            s3_key: None,
            s3_object_version: None,
            image_uri: None,
        }
        .into_sdk();
        assert!(result.is_err());
    }

    #[test]
    fn layer_version_summary_converts_from_list_item() {
        let sdk = aws_sdk_lambda::types::LayerVersionsListItem::builder()
            .layer_version_arn("arn:aws:lambda:us-east-1:123456789012:layer:deps:3")
            .version(3)
            .created_date("2024-01-15T09:30:00.000+0000")
            .compatible_runtimes(Runtime::Python312)
            .build();

        let summary = LayerVersionSummary::from(sdk);
        assert_eq!(summary.version, 3);
        assert_eq!(
            summary.compatible_runtimes.as_deref(),
            Some(["python3.12".to_string()].as_slice())
        );
    }
}

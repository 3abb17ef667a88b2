//! Volume lifecycle blocks: create, delete, describe, modify, attach,
//! detach, and the two volume status queries.

use async_trait::async_trait;
use aws_sdk_ec2::types::{ResourceType, VolumeType};
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    client, filters, tag_specifications, FilterInput, TagInput, Volume, VolumeAttachment,
    VolumeModification, VolumeStatusItem,
};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVolumeConfig {
    #[schemars(description = "Availability Zone in which to create the volume")]
    pub availability_zone: String,
    #[schemars(description = "Size of the volume in GiB; required unless a snapshot is given")]
    pub size: Option<i32>,
    #[schemars(description = "Snapshot from which to create the volume")]
    pub snapshot_id: Option<String>,
    #[schemars(description = "Volume type: gp2 | gp3 | io1 | io2 | st1 | sc1 | standard")]
    pub volume_type: Option<String>,
    #[schemars(description = "Provisioned IOPS, for io1/io2/gp3 volumes")]
    pub iops: Option<i32>,
    #[schemars(description = "Throughput in MiB/s, gp3 only")]
    pub throughput: Option<i32>,
    #[schemars(description = "Whether the volume is encrypted")]
    pub encrypted: Option<bool>,
    #[schemars(description = "KMS key for encryption; omit for the EBS default key")]
    pub kms_key_id: Option<String>,
    #[schemars(description = "ARN of the Outpost on which to create the volume")]
    pub outpost_arn: Option<String>,
    #[schemars(description = "Enable Multi-Attach for io1/io2 volumes")]
    pub multi_attach_enabled: Option<bool>,
    #[schemars(description = "Idempotency token")]
    pub client_token: Option<String>,
    #[schemars(description = "Tags to apply to the volume on creation")]
    pub tags: Option<Vec<TagInput>>,
    #[schemars(description = "Check permissions without creating the volume")]
    pub dry_run: Option<bool>,
}

/// Wraps EC2 `CreateVolume`.
pub struct CreateVolume;

#[async_trait]
impl Block for CreateVolume {
    fn name(&self) -> &'static str {
        "ec2.create_volume"
    }

    fn description(&self) -> &'static str {
        "Creates an EBS volume that can be attached to an instance in the same Availability Zone."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CreateVolumeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(Volume)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CreateVolumeConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .create_volume()
            .availability_zone(cfg.availability_zone)
            .set_size(cfg.size)
            .set_snapshot_id(cfg.snapshot_id)
            .set_volume_type(cfg.volume_type.as_deref().map(VolumeType::from))
            .set_iops(cfg.iops)
            .set_throughput(cfg.throughput)
            .set_encrypted(cfg.encrypted)
            .set_kms_key_id(cfg.kms_key_id)
            .set_outpost_arn(cfg.outpost_arn)
            .set_multi_attach_enabled(cfg.multi_attach_enabled)
            .set_client_token(cfg.client_token)
            .set_tag_specifications(tag_specifications(ResourceType::Volume, cfg.tags))
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("CreateVolume", e))?;
        to_output(Volume::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteVolumeConfig {
    #[schemars(description = "ID of the volume to delete; the volume must be available")]
    pub volume_id: String,
    #[schemars(description = "Check permissions without deleting the volume")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteVolumeResult {}

/// Wraps EC2 `DeleteVolume`.
pub struct DeleteVolume;

#[async_trait]
impl Block for DeleteVolume {
    fn name(&self) -> &'static str {
        "ec2.delete_volume"
    }

    fn description(&self) -> &'static str {
        "Deletes the specified EBS volume; the volume must be in the available state."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DeleteVolumeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DeleteVolumeResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DeleteVolumeConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .delete_volume()
            .volume_id(cfg.volume_id)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteVolume", e))?;
        to_output(DeleteVolumeResult {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesConfig {
    #[schemars(description = "Volume IDs to describe; omit to describe all volumes")]
    pub volume_ids: Option<Vec<String>>,
    #[schemars(description = "Filters such as status, size, or tag:<key>")]
    pub filters: Option<Vec<FilterInput>>,
    #[schemars(description = "Maximum number of results per page")]
    pub max_results: Option<i32>,
    #[schemars(description = "Token from a previous page of results")]
    pub next_token: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesResult {
    pub volumes: Option<Vec<Volume>>,
    pub next_token: Option<String>,
}

/// Wraps EC2 `DescribeVolumes`.
pub struct DescribeVolumes;

#[async_trait]
impl Block for DescribeVolumes {
    fn name(&self) -> &'static str {
        "ec2.describe_volumes"
    }

    fn description(&self) -> &'static str {
        "Describes the specified EBS volumes, or all volumes in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeVolumesConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeVolumesResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeVolumesConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_volumes()
            .set_volume_ids(cfg.volume_ids)
            .set_filters(filters(cfg.filters))
            .set_max_results(cfg.max_results)
            .set_next_token(cfg.next_token)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeVolumes", e))?;
        to_output(DescribeVolumesResult {
            volumes: output
                .volumes
                .map(|list| list.into_iter().map(Volume::from).collect()),
            next_token: output.next_token,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyVolumeConfig {
    #[schemars(description = "ID of the volume to modify")]
    pub volume_id: String,
    #[schemars(description = "Target size in GiB; must not shrink the volume")]
    pub size: Option<i32>,
    #[schemars(description = "Target volume type")]
    pub volume_type: Option<String>,
    #[schemars(description = "Target provisioned IOPS")]
    pub iops: Option<i32>,
    #[schemars(description = "Target throughput in MiB/s, gp3 only")]
    pub throughput: Option<i32>,
    #[schemars(description = "Target Multi-Attach setting, io1/io2 only")]
    pub multi_attach_enabled: Option<bool>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyVolumeResult {
    pub volume_modification: Option<VolumeModification>,
}

/// Wraps EC2 `ModifyVolume`.
pub struct ModifyVolume;

#[async_trait]
impl Block for ModifyVolume {
    fn name(&self) -> &'static str {
        "ec2.modify_volume"
    }

    fn description(&self) -> &'static str {
        "Modifies the size, type, IOPS, or throughput of an EBS volume."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ModifyVolumeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ModifyVolumeResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ModifyVolumeConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .modify_volume()
            .volume_id(cfg.volume_id)
            .set_size(cfg.size)
            .set_volume_type(cfg.volume_type.as_deref().map(VolumeType::from))
            .set_iops(cfg.iops)
            .set_throughput(cfg.throughput)
            .set_multi_attach_enabled(cfg.multi_attach_enabled)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("ModifyVolume", e))?;
        to_output(ModifyVolumeResult {
            volume_modification: output.volume_modification.map(VolumeModification::from),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct AttachVolumeConfig {
    #[schemars(description = "Device name to expose to the instance, e.g. /dev/sdh or xvdh")]
    pub device: String,
    #[schemars(description = "Instance to attach the volume to")]
    pub instance_id: String,
    #[schemars(description = "Volume to attach; must be in the same Availability Zone")]
    pub volume_id: String,
    pub dry_run: Option<bool>,
}

/// Wraps EC2 `AttachVolume`.
pub struct AttachVolume;

#[async_trait]
impl Block for AttachVolume {
    fn name(&self) -> &'static str {
        "ec2.attach_volume"
    }

    fn description(&self) -> &'static str {
        "Attaches an EBS volume to a running or stopped instance as the given device."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(AttachVolumeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(VolumeAttachment)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: AttachVolumeConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .attach_volume()
            .device(cfg.device)
            .instance_id(cfg.instance_id)
            .volume_id(cfg.volume_id)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("AttachVolume", e))?;
        to_output(VolumeAttachment::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DetachVolumeConfig {
    #[schemars(description = "Volume to detach")]
    pub volume_id: String,
    #[schemars(description = "Device name; required when an instance has multiple attachments")]
    pub device: Option<String>,
    #[schemars(description = "Instance the volume is attached to")]
    pub instance_id: Option<String>,
    #[schemars(
        description = "Force detachment; the instance will not flush file system caches"
    )]
    pub force: Option<bool>,
    pub dry_run: Option<bool>,
}

/// Wraps EC2 `DetachVolume`.
pub struct DetachVolume;

#[async_trait]
impl Block for DetachVolume {
    fn name(&self) -> &'static str {
        "ec2.detach_volume"
    }

    fn description(&self) -> &'static str {
        "Detaches an EBS volume from an instance."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DetachVolumeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(VolumeAttachment)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DetachVolumeConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .detach_volume()
            .volume_id(cfg.volume_id)
            .set_device(cfg.device)
            .set_instance_id(cfg.instance_id)
            .set_force(cfg.force)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DetachVolume", e))?;
        to_output(VolumeAttachment::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesModificationsConfig {
    #[schemars(description = "Volume IDs to report modifications for")]
    pub volume_ids: Option<Vec<String>>,
    #[schemars(description = "Filters such as modification-state or target-size")]
    pub filters: Option<Vec<FilterInput>>,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesModificationsResult {
    pub volumes_modifications: Option<Vec<VolumeModification>>,
    pub next_token: Option<String>,
}

/// Wraps EC2 `DescribeVolumesModifications`.
pub struct DescribeVolumesModifications;

#[async_trait]
impl Block for DescribeVolumesModifications {
    fn name(&self) -> &'static str {
        "ec2.describe_volumes_modifications"
    }

    fn description(&self) -> &'static str {
        "Describes the most recent volume modification request for each of the specified volumes."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeVolumesModificationsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeVolumesModificationsResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeVolumesModificationsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_volumes_modifications()
            .set_volume_ids(cfg.volume_ids)
            .set_filters(filters(cfg.filters))
            .set_max_results(cfg.max_results)
            .set_next_token(cfg.next_token)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeVolumesModifications", e))?;
        to_output(DescribeVolumesModificationsResult {
            volumes_modifications: output
                .volumes_modifications
                .map(|list| list.into_iter().map(VolumeModification::from).collect()),
            next_token: output.next_token,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumeStatusConfig {
    #[schemars(description = "Volume IDs to report status for; omit for all volumes")]
    pub volume_ids: Option<Vec<String>>,
    #[schemars(description = "Filters such as volume-status.status or event.event-type")]
    pub filters: Option<Vec<FilterInput>>,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumeStatusResult {
    pub volume_statuses: Option<Vec<VolumeStatusItem>>,
    pub next_token: Option<String>,
}

/// Wraps EC2 `DescribeVolumeStatus`.
pub struct DescribeVolumeStatus;

#[async_trait]
impl Block for DescribeVolumeStatus {
    fn name(&self) -> &'static str {
        "ec2.describe_volume_status"
    }

    fn description(&self) -> &'static str {
        "Describes the status of the specified volumes, including impaired-volume events."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeVolumeStatusConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeVolumeStatusResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeVolumeStatusConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_volume_status()
            .set_volume_ids(cfg.volume_ids)
            .set_filters(filters(cfg.filters))
            .set_max_results(cfg.max_results)
            .set_next_token(cfg.next_token)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeVolumeStatus", e))?;
        to_output(DescribeVolumeStatusResult {
            volume_statuses: output
                .volume_statuses
                .map(|list| list.into_iter().map(VolumeStatusItem::from).collect()),
            next_token: output.next_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_volume_config_mirrors_api_request_shape() {
        let cfg: CreateVolumeConfig = parse_config(json!({
            "AvailabilityZone": "us-east-1a",
            "Size": 500,
            "VolumeType": "gp3",
            "Iops": 3000,
            "Throughput": 125,
            "Encrypted": true,
            "Tags": [{"Key": "env", "Value": "prod"}]
        }))
        .unwrap();

        assert_eq!(cfg.availability_zone, "us-east-1a");
        assert_eq!(cfg.size, Some(500));
        assert_eq!(cfg.volume_type.as_deref(), Some("gp3"));
        assert_eq!(cfg.tags.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn create_volume_schema_requires_only_availability_zone() {
        let schema = serde_json::to_value(CreateVolume.config_schema()).unwrap();
        assert_eq!(schema["required"], json!(["AvailabilityZone"]));
        assert!(schema["properties"]["KmsKeyId"].is_object());
    }

    #[test]
    fn attach_volume_schema_requires_all_identifiers() {
        let schema = serde_json::to_value(AttachVolume.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        for member in ["Device", "InstanceId", "VolumeId"] {
            assert!(required.contains(&json!(member)), "missing {member}");
        }
    }

    #[test]
    fn describe_volumes_config_accepts_filters() {
        let cfg: DescribeVolumesConfig = parse_config(json!({
            "Filters": [{"Name": "status", "Values": ["available"]}],
            "MaxResults": 50
        }))
        .unwrap();
        assert_eq!(cfg.filters.as_ref().map(Vec::len), Some(1));
        assert!(cfg.volume_ids.is_none());
    }

    #[test]
    fn rejects_unknown_snake_case_members() {
        // Configs transcribe the AWS request shape; lowercase keys are a
        // caller bug, not an alias.
        let result = parse_config::<DeleteVolumeConfig>(json!({"volume_id": "vol-1"}));
        assert!(result.is_err());
    }

    #[test]
    fn modify_volume_output_schema_names_modification() {
        let schema = serde_json::to_value(ModifyVolume.output_schema()).unwrap();
        assert!(schema["properties"]["VolumeModification"].is_object());
    }
}

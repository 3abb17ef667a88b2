//! Snapshot lifecycle blocks, including the createVolumePermission attribute
//! operations.

use async_trait::async_trait;
use aws_sdk_ec2::types::{OperationType, ResourceType, SnapshotAttributeName};
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    client, filters, tag_specifications, tags, CreateVolumePermission, FilterInput, ProductCode,
    Snapshot, Tag, TagInput,
};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSnapshotConfig {
    #[schemars(description = "ID of the EBS volume to snapshot")]
    pub volume_id: String,
    #[schemars(description = "Description propagated to the snapshot")]
    pub description: Option<String>,
    #[schemars(description = "ARN of the Outpost on which to store the snapshot")]
    pub outpost_arn: Option<String>,
    #[schemars(description = "Tags to apply to the snapshot on creation")]
    pub tags: Option<Vec<TagInput>>,
    #[schemars(description = "Check permissions without creating the snapshot")]
    pub dry_run: Option<bool>,
}

/// Wraps EC2 `CreateSnapshot`.
pub struct CreateSnapshot;

#[async_trait]
impl Block for CreateSnapshot {
    fn name(&self) -> &'static str {
        "ec2.create_snapshot"
    }

    fn description(&self) -> &'static str {
        "Creates a point-in-time snapshot of an EBS volume."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CreateSnapshotConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(Snapshot)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CreateSnapshotConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .create_snapshot()
            .volume_id(cfg.volume_id)
            .set_description(cfg.description)
            .set_outpost_arn(cfg.outpost_arn)
            .set_tag_specifications(tag_specifications(ResourceType::Snapshot, cfg.tags))
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("CreateSnapshot", e))?;
        to_output(Snapshot::from(output))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteSnapshotConfig {
    #[schemars(description = "ID of the snapshot to delete")]
    pub snapshot_id: String,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteSnapshotResult {}

/// Wraps EC2 `DeleteSnapshot`.
pub struct DeleteSnapshot;

#[async_trait]
impl Block for DeleteSnapshot {
    fn name(&self) -> &'static str {
        "ec2.delete_snapshot"
    }

    fn description(&self) -> &'static str {
        "Deletes the specified snapshot."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DeleteSnapshotConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DeleteSnapshotResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DeleteSnapshotConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .delete_snapshot()
            .snapshot_id(cfg.snapshot_id)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteSnapshot", e))?;
        to_output(DeleteSnapshotResult {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotsConfig {
    #[schemars(description = "Snapshot IDs to describe")]
    pub snapshot_ids: Option<Vec<String>>,
    #[schemars(description = "Scope results to snapshots owned by these accounts, or self/amazon")]
    pub owner_ids: Option<Vec<String>>,
    #[schemars(description = "Scope results to snapshots restorable by these accounts")]
    pub restorable_by_user_ids: Option<Vec<String>>,
    #[schemars(description = "Filters such as status, volume-id, or tag:<key>")]
    pub filters: Option<Vec<FilterInput>>,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotsResult {
    pub snapshots: Option<Vec<Snapshot>>,
    pub next_token: Option<String>,
}

/// Wraps EC2 `DescribeSnapshots`.
pub struct DescribeSnapshots;

#[async_trait]
impl Block for DescribeSnapshots {
    fn name(&self) -> &'static str {
        "ec2.describe_snapshots"
    }

    fn description(&self) -> &'static str {
        "Describes the specified snapshots, or the snapshots available to the account."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeSnapshotsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeSnapshotsResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeSnapshotsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_snapshots()
            .set_snapshot_ids(cfg.snapshot_ids)
            .set_owner_ids(cfg.owner_ids)
            .set_restorable_by_user_ids(cfg.restorable_by_user_ids)
            .set_filters(filters(cfg.filters))
            .set_max_results(cfg.max_results)
            .set_next_token(cfg.next_token)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeSnapshots", e))?;
        to_output(DescribeSnapshotsResult {
            snapshots: output
                .snapshots
                .map(|list| list.into_iter().map(Snapshot::from).collect()),
            next_token: output.next_token,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CopySnapshotConfig {
    #[schemars(description = "Region that holds the source snapshot")]
    pub source_region: String,
    #[schemars(description = "ID of the snapshot to copy")]
    pub source_snapshot_id: String,
    #[schemars(description = "Description for the new snapshot")]
    pub description: Option<String>,
    #[schemars(description = "Encrypt the copy; encrypted snapshots stay encrypted")]
    pub encrypted: Option<bool>,
    #[schemars(description = "KMS key for the copy; omit for the EBS default key")]
    pub kms_key_id: Option<String>,
    #[schemars(description = "ARN of the Outpost to copy the snapshot to")]
    pub destination_outpost_arn: Option<String>,
    #[schemars(description = "Tags to apply to the new snapshot")]
    pub tags: Option<Vec<TagInput>>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CopySnapshotResult {
    pub snapshot_id: Option<String>,
    pub tags: Option<Vec<Tag>>,
}

/// Wraps EC2 `CopySnapshot`. The copy lands in the connection's region.
pub struct CopySnapshot;

#[async_trait]
impl Block for CopySnapshot {
    fn name(&self) -> &'static str {
        "ec2.copy_snapshot"
    }

    fn description(&self) -> &'static str {
        "Copies a snapshot from another region or Outpost into the connection's region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CopySnapshotConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(CopySnapshotResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CopySnapshotConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .copy_snapshot()
            .source_region(cfg.source_region)
            .source_snapshot_id(cfg.source_snapshot_id)
            .set_description(cfg.description)
            .set_encrypted(cfg.encrypted)
            .set_kms_key_id(cfg.kms_key_id)
            .set_destination_outpost_arn(cfg.destination_outpost_arn)
            .set_tag_specifications(tag_specifications(ResourceType::Snapshot, cfg.tags))
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("CopySnapshot", e))?;
        to_output(CopySnapshotResult {
            snapshot_id: output.snapshot_id,
            tags: tags(output.tags),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotAttributeConfig {
    #[schemars(description = "Attribute to describe: productCodes | createVolumePermission")]
    pub attribute: String,
    #[schemars(description = "ID of the snapshot")]
    pub snapshot_id: String,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotAttributeResult {
    pub snapshot_id: Option<String>,
    pub create_volume_permissions: Option<Vec<CreateVolumePermission>>,
    pub product_codes: Option<Vec<ProductCode>>,
}

/// Wraps EC2 `DescribeSnapshotAttribute`.
pub struct DescribeSnapshotAttribute;

#[async_trait]
impl Block for DescribeSnapshotAttribute {
    fn name(&self) -> &'static str {
        "ec2.describe_snapshot_attribute"
    }

    fn description(&self) -> &'static str {
        "Describes the specified attribute of a snapshot."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeSnapshotAttributeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeSnapshotAttributeResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeSnapshotAttributeConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_snapshot_attribute()
            .attribute(SnapshotAttributeName::from(cfg.attribute.as_str()))
            .snapshot_id(cfg.snapshot_id)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeSnapshotAttribute", e))?;
        to_output(DescribeSnapshotAttributeResult {
            snapshot_id: output.snapshot_id,
            create_volume_permissions: output
                .create_volume_permissions
                .map(|list| list.into_iter().map(CreateVolumePermission::from).collect()),
            product_codes: output
                .product_codes
                .map(|list| list.into_iter().map(ProductCode::from).collect()),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ModifySnapshotAttributeConfig {
    #[schemars(description = "ID of the snapshot")]
    pub snapshot_id: String,
    #[schemars(description = "Attribute to modify; only createVolumePermission may be modified")]
    pub attribute: String,
    #[schemars(description = "Whether to add or remove the permissions")]
    pub operation_type: String,
    #[schemars(description = "Account IDs to grant or revoke")]
    pub user_ids: Option<Vec<String>>,
    #[schemars(description = "Group names; the only valid group is all")]
    pub group_names: Option<Vec<String>>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ModifySnapshotAttributeResult {}

/// Wraps EC2 `ModifySnapshotAttribute`.
pub struct ModifySnapshotAttribute;

#[async_trait]
impl Block for ModifySnapshotAttribute {
    fn name(&self) -> &'static str {
        "ec2.modify_snapshot_attribute"
    }

    fn description(&self) -> &'static str {
        "Adds or removes createVolumePermission entries on a snapshot."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ModifySnapshotAttributeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ModifySnapshotAttributeResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ModifySnapshotAttributeConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .modify_snapshot_attribute()
            .snapshot_id(cfg.snapshot_id)
            .attribute(SnapshotAttributeName::from(cfg.attribute.as_str()))
            .operation_type(OperationType::from(cfg.operation_type.as_str()))
            .set_user_ids(cfg.user_ids)
            .set_group_names(cfg.group_names)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("ModifySnapshotAttribute", e))?;
        to_output(ModifySnapshotAttributeResult {})
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ResetSnapshotAttributeConfig {
    #[schemars(description = "ID of the snapshot")]
    pub snapshot_id: String,
    #[schemars(description = "Attribute to reset; only createVolumePermission may be reset")]
    pub attribute: String,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ResetSnapshotAttributeResult {}

/// Wraps EC2 `ResetSnapshotAttribute`.
pub struct ResetSnapshotAttribute;

#[async_trait]
impl Block for ResetSnapshotAttribute {
    fn name(&self) -> &'static str {
        "ec2.reset_snapshot_attribute"
    }

    fn description(&self) -> &'static str {
        "Resets permission settings for the specified snapshot."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ResetSnapshotAttributeConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(ResetSnapshotAttributeResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ResetSnapshotAttributeConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .reset_snapshot_attribute()
            .snapshot_id(cfg.snapshot_id)
            .attribute(SnapshotAttributeName::from(cfg.attribute.as_str()))
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("ResetSnapshotAttribute", e))?;
        to_output(ResetSnapshotAttributeResult {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::SnapshotState;
    use aws_smithy_types::DateTime;
    use serde_json::json;

    #[test]
    fn snapshot_model_converts_from_sdk_shape() {
        let sdk = aws_sdk_ec2::types::Snapshot::builder()
            .snapshot_id("snap-0abc")
            .volume_id("vol-0abc")
            .state(SnapshotState::Completed)
            .progress("100%")
            .start_time(DateTime::from_secs(1_577_836_800))
            .volume_size(8)
            .build();

        let snapshot = Snapshot::from(sdk);
        assert_eq!(snapshot.snapshot_id.as_deref(), Some("snap-0abc"));
        assert_eq!(snapshot.state.as_deref(), Some("completed"));
        assert_eq!(snapshot.start_time.as_deref(), Some("2020-01-01T00:00:00Z"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["Progress"], "100%");
        assert_eq!(json["VolumeSize"], 8);
    }

    #[test]
    fn copy_snapshot_schema_requires_source_coordinates() {
        let schema = serde_json::to_value(CopySnapshot.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("SourceRegion")));
        assert!(required.contains(&json!("SourceSnapshotId")));
    }

    #[test]
    fn modify_snapshot_attribute_config_parses_share_request() {
        let cfg: ModifySnapshotAttributeConfig = parse_config(json!({
            "SnapshotId": "snap-0abc",
            "Attribute": "createVolumePermission",
            "OperationType": "add",
            "UserIds": ["123456789012"]
        }))
        .unwrap();
        assert_eq!(cfg.operation_type, "add");
        assert_eq!(cfg.user_ids.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn describe_snapshots_config_accepts_owner_scoping() {
        let cfg: DescribeSnapshotsConfig = parse_config(json!({
            "OwnerIds": ["self"],
            "Filters": [{"Name": "status", "Values": ["completed"]}]
        }))
        .unwrap();
        assert_eq!(cfg.owner_ids.as_deref(), Some(["self".to_string()].as_slice()));
    }
}

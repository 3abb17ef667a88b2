//! Shared EC2 input fragments and serializable response models.
//!
//! The SDK's generated response types do not implement `Serialize`, so the
//! shapes the blocks emit are transcribed here once and converted from the
//! SDK types. Shapes EC2 repeats across several outputs (volume, attachment,
//! snapshot) get their `From` impls from a macro over the field-compatible
//! SDK types.

use aws_sdk_ec2::types::{ResourceType, TagSpecification};
use aws_sdk_ec2::Client;
use runblocks_core::convert::timestamp;
use runblocks_core::{AwsConnection, BlockResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub(crate) async fn client(connection: &AwsConnection) -> BlockResult<Client> {
    Ok(Client::new(&connection.sdk_config().await?))
}

/// One resource tag, as EC2 requests carry them.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TagInput {
    #[schemars(description = "Tag key")]
    pub key: String,
    #[schemars(description = "Tag value")]
    pub value: String,
}

/// One request filter (`Name` plus allowed `Values`), as the EC2 Describe*
/// calls accept them.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FilterInput {
    #[schemars(description = "Filter name, e.g. status or tag:<key>")]
    pub name: String,
    #[schemars(description = "One or more filter values; values are ORed")]
    pub values: Vec<String>,
}

/// Wrap config tags into the single-element `TagSpecifications` list EC2
/// create calls expect.
pub(crate) fn tag_specifications(
    resource_type: ResourceType,
    tags: Option<Vec<TagInput>>,
) -> Option<Vec<TagSpecification>> {
    tags.map(|list| {
        vec![TagSpecification::builder()
            .resource_type(resource_type)
            .set_tags(Some(
                list.into_iter()
                    .map(|tag| {
                        aws_sdk_ec2::types::Tag::builder()
                            .key(tag.key)
                            .value(tag.value)
                            .build()
                    })
                    .collect(),
            ))
            .build()]
    })
}

pub(crate) fn filters(
    filters: Option<Vec<FilterInput>>,
) -> Option<Vec<aws_sdk_ec2::types::Filter>> {
    filters.map(|list| {
        list.into_iter()
            .map(|filter| {
                aws_sdk_ec2::types::Filter::builder()
                    .name(filter.name)
                    .set_values(Some(filter.values))
                    .build()
            })
            .collect()
    })
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl From<aws_sdk_ec2::types::Tag> for Tag {
    fn from(value: aws_sdk_ec2::types::Tag) -> Self {
        Self {
            key: value.key,
            value: value.value,
        }
    }
}

pub(crate) fn tags(tags: Option<Vec<aws_sdk_ec2::types::Tag>>) -> Option<Vec<Tag>> {
    tags.map(|list| list.into_iter().map(Tag::from).collect())
}

/// An EBS volume, as EC2 describes it.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub volume_id: Option<String>,
    pub availability_zone: Option<String>,
    #[schemars(description = "Volume size in GiB")]
    pub size: Option<i32>,
    pub snapshot_id: Option<String>,
    #[schemars(description = "creating | available | in-use | deleting | deleted | error")]
    pub state: Option<String>,
    pub create_time: Option<String>,
    pub volume_type: Option<String>,
    pub iops: Option<i32>,
    pub throughput: Option<i32>,
    pub encrypted: Option<bool>,
    pub kms_key_id: Option<String>,
    pub multi_attach_enabled: Option<bool>,
    pub outpost_arn: Option<String>,
    pub fast_restored: Option<bool>,
    pub attachments: Option<Vec<VolumeAttachment>>,
    pub tags: Option<Vec<Tag>>,
}

/// EC2 emits the volume shape both as `types::Volume` and flattened into the
/// CreateVolume response; one conversion over the field-compatible types.
macro_rules! impl_volume_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for Volume {
            fn from(value: $source) -> Self {
                Self {
                    volume_id: value.volume_id,
                    availability_zone: value.availability_zone,
                    size: value.size,
                    snapshot_id: value.snapshot_id,
                    state: value.state.map(|v| v.as_str().to_owned()),
                    create_time: timestamp(value.create_time),
                    volume_type: value.volume_type.map(|v| v.as_str().to_owned()),
                    iops: value.iops,
                    throughput: value.throughput,
                    encrypted: value.encrypted,
                    kms_key_id: value.kms_key_id,
                    multi_attach_enabled: value.multi_attach_enabled,
                    outpost_arn: value.outpost_arn,
                    fast_restored: value.fast_restored,
                    attachments: value
                        .attachments
                        .map(|list| list.into_iter().map(VolumeAttachment::from).collect()),
                    tags: tags(value.tags),
                }
            }
        }
    )+};
}

impl_volume_from!(
    aws_sdk_ec2::types::Volume,
    aws_sdk_ec2::operation::create_volume::CreateVolumeOutput,
);

/// A volume-to-instance attachment, as EC2 reports it.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeAttachment {
    pub volume_id: Option<String>,
    pub instance_id: Option<String>,
    #[schemars(description = "Device name exposed to the instance, e.g. /dev/sdh")]
    pub device: Option<String>,
    #[schemars(description = "attaching | attached | detaching | detached | busy")]
    pub state: Option<String>,
    pub attach_time: Option<String>,
    pub delete_on_termination: Option<bool>,
}

macro_rules! impl_volume_attachment_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for VolumeAttachment {
            fn from(value: $source) -> Self {
                Self {
                    volume_id: value.volume_id,
                    instance_id: value.instance_id,
                    device: value.device,
                    state: value.state.map(|v| v.as_str().to_owned()),
                    attach_time: timestamp(value.attach_time),
                    delete_on_termination: value.delete_on_termination,
                }
            }
        }
    )+};
}

impl_volume_attachment_from!(
    aws_sdk_ec2::types::VolumeAttachment,
    aws_sdk_ec2::operation::attach_volume::AttachVolumeOutput,
    aws_sdk_ec2::operation::detach_volume::DetachVolumeOutput,
);

/// An EBS snapshot, as EC2 describes it.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub snapshot_id: Option<String>,
    pub volume_id: Option<String>,
    #[schemars(description = "pending | completed | error | recoverable | recovering")]
    pub state: Option<String>,
    pub state_message: Option<String>,
    pub start_time: Option<String>,
    #[schemars(description = "Completion percentage, e.g. 100%")]
    pub progress: Option<String>,
    pub owner_id: Option<String>,
    pub owner_alias: Option<String>,
    pub description: Option<String>,
    #[schemars(description = "Size of the source volume in GiB")]
    pub volume_size: Option<i32>,
    pub encrypted: Option<bool>,
    pub kms_key_id: Option<String>,
    pub data_encryption_key_id: Option<String>,
    pub outpost_arn: Option<String>,
    pub storage_tier: Option<String>,
    pub restore_expiry_time: Option<String>,
    pub tags: Option<Vec<Tag>>,
}

macro_rules! impl_snapshot_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for Snapshot {
            fn from(value: $source) -> Self {
                Self {
                    snapshot_id: value.snapshot_id,
                    volume_id: value.volume_id,
                    state: value.state.map(|v| v.as_str().to_owned()),
                    state_message: value.state_message,
                    start_time: timestamp(value.start_time),
                    progress: value.progress,
                    owner_id: value.owner_id,
                    owner_alias: value.owner_alias,
                    description: value.description,
                    volume_size: value.volume_size,
                    encrypted: value.encrypted,
                    kms_key_id: value.kms_key_id,
                    data_encryption_key_id: value.data_encryption_key_id,
                    outpost_arn: value.outpost_arn,
                    storage_tier: value.storage_tier.map(|v| v.as_str().to_owned()),
                    restore_expiry_time: timestamp(value.restore_expiry_time),
                    tags: tags(value.tags),
                }
            }
        }
    )+};
}

impl_snapshot_from!(
    aws_sdk_ec2::types::Snapshot,
    aws_sdk_ec2::operation::create_snapshot::CreateSnapshotOutput,
);

/// Progress record for a ModifyVolume request.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeModification {
    pub volume_id: Option<String>,
    #[schemars(description = "modifying | optimizing | completed | failed")]
    pub modification_state: Option<String>,
    pub status_message: Option<String>,
    pub target_size: Option<i32>,
    pub target_iops: Option<i32>,
    pub target_volume_type: Option<String>,
    pub target_throughput: Option<i32>,
    pub target_multi_attach_enabled: Option<bool>,
    pub original_size: Option<i32>,
    pub original_iops: Option<i32>,
    pub original_volume_type: Option<String>,
    pub original_throughput: Option<i32>,
    pub original_multi_attach_enabled: Option<bool>,
    #[schemars(description = "Modification progress from 0 to 100 percent")]
    pub progress: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl From<aws_sdk_ec2::types::VolumeModification> for VolumeModification {
    fn from(value: aws_sdk_ec2::types::VolumeModification) -> Self {
        Self {
            volume_id: value.volume_id,
            modification_state: value.modification_state.map(|v| v.as_str().to_owned()),
            status_message: value.status_message,
            target_size: value.target_size,
            target_iops: value.target_iops,
            target_volume_type: value.target_volume_type.map(|v| v.as_str().to_owned()),
            target_throughput: value.target_throughput,
            target_multi_attach_enabled: value.target_multi_attach_enabled,
            original_size: value.original_size,
            original_iops: value.original_iops,
            original_volume_type: value.original_volume_type.map(|v| v.as_str().to_owned()),
            original_throughput: value.original_throughput,
            original_multi_attach_enabled: value.original_multi_attach_enabled,
            progress: value.progress,
            start_time: timestamp(value.start_time),
            end_time: timestamp(value.end_time),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeStatusDetail {
    #[schemars(description = "io-enabled | io-performance | initialization-state")]
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeStatusInfo {
    #[schemars(description = "ok | impaired | insufficient-data")]
    pub status: Option<String>,
    pub details: Option<Vec<VolumeStatusDetail>>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeStatusEvent {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub instance_id: Option<String>,
    pub not_before: Option<String>,
    pub not_after: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeStatusAction {
    pub code: Option<String>,
    pub description: Option<String>,
    pub event_id: Option<String>,
    pub event_type: Option<String>,
}

/// Status entry for one volume, as DescribeVolumeStatus reports it.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeStatusItem {
    pub volume_id: Option<String>,
    pub availability_zone: Option<String>,
    pub outpost_arn: Option<String>,
    pub volume_status: Option<VolumeStatusInfo>,
    pub events: Option<Vec<VolumeStatusEvent>>,
    pub actions: Option<Vec<VolumeStatusAction>>,
}

impl From<aws_sdk_ec2::types::VolumeStatusItem> for VolumeStatusItem {
    fn from(value: aws_sdk_ec2::types::VolumeStatusItem) -> Self {
        Self {
            volume_id: value.volume_id,
            availability_zone: value.availability_zone,
            outpost_arn: value.outpost_arn,
            volume_status: value.volume_status.map(|info| VolumeStatusInfo {
                status: info.status.map(|v| v.as_str().to_owned()),
                details: info.details.map(|list| {
                    list.into_iter()
                        .map(|detail| VolumeStatusDetail {
                            name: detail.name.map(|v| v.as_str().to_owned()),
                            status: detail.status,
                        })
                        .collect()
                }),
            }),
            events: value.events.map(|list| {
                list.into_iter()
                    .map(|event| VolumeStatusEvent {
                        event_id: event.event_id,
                        event_type: event.event_type,
                        description: event.description,
                        instance_id: event.instance_id,
                        not_before: timestamp(event.not_before),
                        not_after: timestamp(event.not_after),
                    })
                    .collect()
            }),
            actions: value.actions.map(|list| {
                list.into_iter()
                    .map(|action| VolumeStatusAction {
                        code: action.code,
                        description: action.description,
                        event_id: action.event_id,
                        event_type: action.event_type,
                    })
                    .collect()
            }),
        }
    }
}

/// One createVolumePermission entry on a snapshot.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVolumePermission {
    #[schemars(description = "The only valid group is `all`")]
    pub group: Option<String>,
    pub user_id: Option<String>,
}

impl From<aws_sdk_ec2::types::CreateVolumePermission> for CreateVolumePermission {
    fn from(value: aws_sdk_ec2::types::CreateVolumePermission) -> Self {
        Self {
            group: value.group.map(|v| v.as_str().to_owned()),
            user_id: value.user_id,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ProductCode {
    pub product_code_id: Option<String>,
    pub product_code_type: Option<String>,
}

impl From<aws_sdk_ec2::types::ProductCode> for ProductCode {
    fn from(value: aws_sdk_ec2::types::ProductCode) -> Self {
        Self {
            product_code_id: value.product_code_id,
            product_code_type: value.product_code_type.map(|v| v.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::{VolumeAttachmentState, VolumeState, VolumeType};
    use aws_smithy_types::DateTime;

    #[test]
    fn volume_converts_from_sdk_shape() {
        let sdk = aws_sdk_ec2::types::Volume::builder()
            .volume_id("vol-0abc123")
            .availability_zone("us-east-1a")
            .size(100)
            .state(VolumeState::Available)
            .volume_type(VolumeType::Gp3)
            .create_time(DateTime::from_secs(1_577_836_800))
            .tags(
                aws_sdk_ec2::types::Tag::builder()
                    .key("env")
                    .value("prod")
                    .build(),
            )
            .build();

        let volume = Volume::from(sdk);
        assert_eq!(volume.volume_id.as_deref(), Some("vol-0abc123"));
        assert_eq!(volume.state.as_deref(), Some("available"));
        assert_eq!(volume.volume_type.as_deref(), Some("gp3"));
        assert_eq!(volume.create_time.as_deref(), Some("2020-01-01T00:00:00Z"));

        let json = serde_json::to_value(&volume).unwrap();
        assert_eq!(json["VolumeId"], "vol-0abc123");
        assert_eq!(json["Tags"][0]["Key"], "env");
    }

    #[test]
    fn attachment_converts_from_sdk_shape() {
        let sdk = aws_sdk_ec2::types::VolumeAttachment::builder()
            .volume_id("vol-0abc123")
            .instance_id("i-0def456")
            .device("/dev/sdh")
            .state(VolumeAttachmentState::Attached)
            .build();

        let attachment = VolumeAttachment::from(sdk);
        assert_eq!(attachment.state.as_deref(), Some("attached"));
        assert_eq!(attachment.device.as_deref(), Some("/dev/sdh"));
    }

    #[test]
    fn tag_specifications_wraps_all_tags_in_one_spec() {
        let specs = tag_specifications(
            ResourceType::Volume,
            Some(vec![
                TagInput {
                    key: "env".to_string(),
                    value: "prod".to_string(),
                },
                TagInput {
                    key: "team".to_string(),
                    value: "data".to_string(),
                },
            ]),
        )
        .unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].resource_type(), Some(&ResourceType::Volume));
        assert_eq!(specs[0].tags().len(), 2);
        assert!(tag_specifications(ResourceType::Volume, None).is_none());
    }

    #[test]
    fn filters_map_name_and_values() {
        let built = filters(Some(vec![FilterInput {
            name: "status".to_string(),
            values: vec!["available".to_string(), "creating".to_string()],
        }]))
        .unwrap();

        assert_eq!(built[0].name.as_deref(), Some("status"));
        assert_eq!(built[0].values().len(), 2);
    }
}

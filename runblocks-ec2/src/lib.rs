//! EC2 EBS blocks.
//!
//! Each block wraps exactly one EC2 API call against the EBS surface:
//! volume lifecycle, snapshot lifecycle, and the account-level encryption
//! defaults. Configs transcribe the EC2 request shapes; emitted events
//! transcribe the response shapes.

pub mod encryption;
pub mod snapshots;
pub mod types;
pub mod volumes;

use runblocks_core::Block;

/// The EC2 block catalog, in the order the operations are documented.
pub fn blocks() -> Vec<Box<dyn Block>> {
    vec![
        // Volumes
        Box::new(volumes::CreateVolume),
        Box::new(volumes::DeleteVolume),
        Box::new(volumes::DescribeVolumes),
        Box::new(volumes::ModifyVolume),
        Box::new(volumes::AttachVolume),
        Box::new(volumes::DetachVolume),
        Box::new(volumes::DescribeVolumesModifications),
        Box::new(volumes::DescribeVolumeStatus),
        // Snapshots
        Box::new(snapshots::CreateSnapshot),
        Box::new(snapshots::DeleteSnapshot),
        Box::new(snapshots::DescribeSnapshots),
        Box::new(snapshots::CopySnapshot),
        Box::new(snapshots::DescribeSnapshotAttribute),
        Box::new(snapshots::ModifySnapshotAttribute),
        Box::new(snapshots::ResetSnapshotAttribute),
        // Account encryption defaults
        Box::new(encryption::GetEbsEncryptionByDefault),
        Box::new(encryption::EnableEbsEncryptionByDefault),
        Box::new(encryption::DisableEbsEncryptionByDefault),
        Box::new(encryption::GetEbsDefaultKmsKeyId),
        Box::new(encryption::ModifyEbsDefaultKmsKeyId),
        Box::new(encryption::ResetEbsDefaultKmsKeyId),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_names_are_unique_and_namespaced() {
        let names: Vec<_> = blocks().iter().map(|b| b.name()).collect();
        let unique: BTreeSet<_> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|n| n.starts_with("ec2.")));
    }

    #[test]
    fn every_block_declares_both_schemas() {
        for block in blocks() {
            let config = serde_json::to_value(block.config_schema()).unwrap();
            let output = serde_json::to_value(block.output_schema()).unwrap();
            assert!(config.is_object(), "{} config schema", block.name());
            assert!(output.is_object(), "{} output schema", block.name());
            assert!(!block.description().is_empty());
        }
    }
}

//! Account-level EBS encryption defaults. These operations are regional and
//! take no resource identifiers.

use async_trait::async_trait;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::client;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptionDefaultsConfig {
    #[schemars(description = "Check permissions without making the request")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EbsEncryptionByDefaultResult {
    #[schemars(description = "Whether encryption by default is enabled for the region")]
    pub ebs_encryption_by_default: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EbsDefaultKmsKeyIdResult {
    #[schemars(description = "ARN of the default KMS key for EBS encryption")]
    pub kms_key_id: Option<String>,
}

/// Wraps EC2 `GetEbsEncryptionByDefault`.
pub struct GetEbsEncryptionByDefault;

#[async_trait]
impl Block for GetEbsEncryptionByDefault {
    fn name(&self) -> &'static str {
        "ec2.get_ebs_encryption_by_default"
    }

    fn description(&self) -> &'static str {
        "Reports whether EBS encryption by default is enabled in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EncryptionDefaultsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsEncryptionByDefaultResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EncryptionDefaultsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_ebs_encryption_by_default()
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("GetEbsEncryptionByDefault", e))?;
        to_output(EbsEncryptionByDefaultResult {
            ebs_encryption_by_default: output.ebs_encryption_by_default,
        })
    }
}

/// Wraps EC2 `EnableEbsEncryptionByDefault`.
pub struct EnableEbsEncryptionByDefault;

#[async_trait]
impl Block for EnableEbsEncryptionByDefault {
    fn name(&self) -> &'static str {
        "ec2.enable_ebs_encryption_by_default"
    }

    fn description(&self) -> &'static str {
        "Enables EBS encryption by default for new volumes in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EncryptionDefaultsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsEncryptionByDefaultResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EncryptionDefaultsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .enable_ebs_encryption_by_default()
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("EnableEbsEncryptionByDefault", e))?;
        to_output(EbsEncryptionByDefaultResult {
            ebs_encryption_by_default: output.ebs_encryption_by_default,
        })
    }
}

/// Wraps EC2 `DisableEbsEncryptionByDefault`. Existing volumes keep their
/// encryption state.
pub struct DisableEbsEncryptionByDefault;

#[async_trait]
impl Block for DisableEbsEncryptionByDefault {
    fn name(&self) -> &'static str {
        "ec2.disable_ebs_encryption_by_default"
    }

    fn description(&self) -> &'static str {
        "Disables EBS encryption by default for new volumes in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EncryptionDefaultsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsEncryptionByDefaultResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EncryptionDefaultsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .disable_ebs_encryption_by_default()
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("DisableEbsEncryptionByDefault", e))?;
        to_output(EbsEncryptionByDefaultResult {
            ebs_encryption_by_default: output.ebs_encryption_by_default,
        })
    }
}

/// Wraps EC2 `GetEbsDefaultKmsKeyId`.
pub struct GetEbsDefaultKmsKeyId;

#[async_trait]
impl Block for GetEbsDefaultKmsKeyId {
    fn name(&self) -> &'static str {
        "ec2.get_ebs_default_kms_key_id"
    }

    fn description(&self) -> &'static str {
        "Describes the default KMS key for EBS encryption in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EncryptionDefaultsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsDefaultKmsKeyIdResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EncryptionDefaultsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_ebs_default_kms_key_id()
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("GetEbsDefaultKmsKeyId", e))?;
        to_output(EbsDefaultKmsKeyIdResult {
            kms_key_id: output.kms_key_id,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyEbsDefaultKmsKeyIdConfig {
    #[schemars(description = "KMS key to use for EBS encryption by default; ID, alias, or ARN")]
    pub kms_key_id: String,
    pub dry_run: Option<bool>,
}

/// Wraps EC2 `ModifyEbsDefaultKmsKeyId`.
pub struct ModifyEbsDefaultKmsKeyId;

#[async_trait]
impl Block for ModifyEbsDefaultKmsKeyId {
    fn name(&self) -> &'static str {
        "ec2.modify_ebs_default_kms_key_id"
    }

    fn description(&self) -> &'static str {
        "Changes the default KMS key for EBS encryption in the region."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ModifyEbsDefaultKmsKeyIdConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsDefaultKmsKeyIdResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ModifyEbsDefaultKmsKeyIdConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .modify_ebs_default_kms_key_id()
            .kms_key_id(cfg.kms_key_id)
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("ModifyEbsDefaultKmsKeyId", e))?;
        to_output(EbsDefaultKmsKeyIdResult {
            kms_key_id: output.kms_key_id,
        })
    }
}

/// Wraps EC2 `ResetEbsDefaultKmsKeyId`, reverting to the AWS managed key.
pub struct ResetEbsDefaultKmsKeyId;

#[async_trait]
impl Block for ResetEbsDefaultKmsKeyId {
    fn name(&self) -> &'static str {
        "ec2.reset_ebs_default_kms_key_id"
    }

    fn description(&self) -> &'static str {
        "Resets the default KMS key for EBS encryption to the AWS managed key."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(EncryptionDefaultsConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(EbsDefaultKmsKeyIdResult)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: EncryptionDefaultsConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .reset_ebs_default_kms_key_id()
            .set_dry_run(cfg.dry_run)
            .send()
            .await
            .map_err(|e| BlockError::api("ResetEbsDefaultKmsKeyId", e))?;
        to_output(EbsDefaultKmsKeyIdResult {
            kms_key_id: output.kms_key_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_config_accepts_empty_object() {
        let cfg: EncryptionDefaultsConfig = parse_config(json!({})).unwrap();
        assert!(cfg.dry_run.is_none());
    }

    #[test]
    fn modify_kms_key_schema_requires_key() {
        let schema = serde_json::to_value(ModifyEbsDefaultKmsKeyId.config_schema()).unwrap();
        assert_eq!(schema["required"], json!(["KmsKeyId"]));
    }

    #[test]
    fn encryption_result_serializes_api_field_name() {
        let json = serde_json::to_value(EbsEncryptionByDefaultResult {
            ebs_encryption_by_default: Some(true),
        })
        .unwrap();
        assert_eq!(json["EbsEncryptionByDefault"], true);
    }
}

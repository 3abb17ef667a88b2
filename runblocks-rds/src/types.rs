//! Shared RDS input fragments and serializable response models.
//!
//! Unlike the EC2 filter, the RDS `Filter` builder enforces its required
//! members and can fail to build, so conversion returns a result.

use aws_sdk_rds::Client;
use runblocks_core::convert::timestamp;
use runblocks_core::{AwsConnection, BlockError, BlockResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub(crate) async fn client(connection: &AwsConnection) -> BlockResult<Client> {
    Ok(Client::new(&connection.sdk_config().await?))
}

/// One resource tag, as RDS requests carry them.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TagInput {
    #[schemars(description = "Tag key")]
    pub key: String,
    #[schemars(description = "Tag value")]
    pub value: String,
}

pub(crate) fn tags(tags: Option<Vec<TagInput>>) -> Option<Vec<aws_sdk_rds::types::Tag>> {
    tags.map(|list| {
        list.into_iter()
            .map(|tag| {
                aws_sdk_rds::types::Tag::builder()
                    .key(tag.key)
                    .value(tag.value)
                    .build()
            })
            .collect()
    })
}

/// One request filter (`Name` plus allowed `Values`), as the RDS Describe*
/// calls accept them.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FilterInput {
    #[schemars(description = "Filter name, e.g. tenant-db-name")]
    pub name: String,
    #[schemars(description = "One or more filter values; values are ORed")]
    pub values: Vec<String>,
}

pub(crate) fn filters(
    filters: Option<Vec<FilterInput>>,
) -> BlockResult<Option<Vec<aws_sdk_rds::types::Filter>>> {
    filters
        .map(|list| {
            list.into_iter()
                .map(|filter| {
                    aws_sdk_rds::types::Filter::builder()
                        .name(filter.name)
                        .set_values(Some(filter.values))
                        .build()
                        .map_err(|e| BlockError::InvalidConfig(e.to_string()))
                })
                .collect()
        })
        .transpose()
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Changes to a tenant database that have been requested but not yet applied.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TenantDatabasePendingModifiedValues {
    pub master_user_password: Option<String>,
    #[serde(rename = "TenantDBName")]
    pub tenant_db_name: Option<String>,
}

/// A tenant database, as RDS describes it.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TenantDatabase {
    pub tenant_database_create_time: Option<String>,
    #[serde(rename = "DBInstanceIdentifier")]
    #[schemars(description = "Identifier of the instance the tenant database lives in")]
    pub db_instance_identifier: Option<String>,
    #[serde(rename = "TenantDBName")]
    pub tenant_db_name: Option<String>,
    #[schemars(description = "available | creating | modifying | deleting")]
    pub status: Option<String>,
    pub master_username: Option<String>,
    pub dbi_resource_id: Option<String>,
    pub tenant_database_resource_id: Option<String>,
    #[serde(rename = "TenantDatabaseARN")]
    pub tenant_database_arn: Option<String>,
    pub character_set_name: Option<String>,
    pub nchar_character_set_name: Option<String>,
    pub deletion_protection: Option<bool>,
    pub pending_modified_values: Option<TenantDatabasePendingModifiedValues>,
    pub tag_list: Option<Vec<Tag>>,
}

impl From<aws_sdk_rds::types::TenantDatabase> for TenantDatabase {
    fn from(value: aws_sdk_rds::types::TenantDatabase) -> Self {
        Self {
            tenant_database_create_time: timestamp(value.tenant_database_create_time),
            db_instance_identifier: value.db_instance_identifier,
            tenant_db_name: value.tenant_db_name,
            status: value.status,
            master_username: value.master_username,
            dbi_resource_id: value.dbi_resource_id,
            tenant_database_resource_id: value.tenant_database_resource_id,
            tenant_database_arn: value.tenant_database_arn,
            character_set_name: value.character_set_name,
            nchar_character_set_name: value.nchar_character_set_name,
            deletion_protection: value.deletion_protection,
            pending_modified_values: value.pending_modified_values.map(|pending| {
                TenantDatabasePendingModifiedValues {
                    master_user_password: pending.master_user_password,
                    tenant_db_name: pending.tenant_db_name,
                }
            }),
            tag_list: value.tag_list.map(|list| {
                list.into_iter()
                    .map(|tag| Tag {
                        key: tag.key,
                        value: tag.value,
                    })
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_smithy_types::DateTime;
    use serde_json::json;

    #[test]
    fn tenant_database_serializes_with_rds_member_names() {
        let model = TenantDatabase::from(
            aws_sdk_rds::types::TenantDatabase::builder()
                .db_instance_identifier("saas-oracle-1")
                .tenant_db_name("acme")
                .status("available")
                .tenant_database_arn("arn:aws:rds:us-east-1:123456789012:tenant-database:tdb-abc")
                .tenant_database_create_time(DateTime::from_secs(1_577_836_800))
                .build(),
        );
        let value = serde_json::to_value(model).unwrap();
        assert_eq!(value["DBInstanceIdentifier"], json!("saas-oracle-1"));
        assert_eq!(value["TenantDBName"], json!("acme"));
        assert_eq!(
            value["TenantDatabaseARN"],
            json!("arn:aws:rds:us-east-1:123456789012:tenant-database:tdb-abc")
        );
        assert_eq!(
            value["TenantDatabaseCreateTime"],
            json!("2020-01-01T00:00:00Z")
        );
    }

    #[test]
    fn filter_conversion_builds_rds_filters() {
        let built = filters(Some(vec![FilterInput {
            name: "tenant-db-name".to_string(),
            values: vec!["acme".to_string()],
        }]))
        .unwrap()
        .unwrap();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].name(), "tenant-db-name");
    }
}

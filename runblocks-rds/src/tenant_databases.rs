//! Tenant database blocks. All four calls key on the owning instance
//! identifier plus the tenant database name.

use async_trait::async_trait;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{client, filters, tags, FilterInput, TagInput, TenantDatabase};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTenantDatabasesConfig {
    #[serde(rename = "DBInstanceIdentifier")]
    #[schemars(description = "Only describe tenant databases in this instance")]
    pub db_instance_identifier: Option<String>,
    #[serde(rename = "TenantDBName")]
    #[schemars(description = "Only describe the tenant database with this name")]
    pub tenant_db_name: Option<String>,
    #[schemars(description = "Filters such as tenant-db-name or tenant-database-resource-id")]
    pub filters: Option<Vec<FilterInput>>,
    pub marker: Option<String>,
    #[schemars(description = "Page size, 20-100")]
    pub max_records: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTenantDatabasesResponse {
    pub tenant_databases: Option<Vec<TenantDatabase>>,
    pub marker: Option<String>,
}

/// Wraps RDS `DescribeTenantDatabases`.
pub struct DescribeTenantDatabases;

#[async_trait]
impl Block for DescribeTenantDatabases {
    fn name(&self) -> &'static str {
        "rds.describe_tenant_databases"
    }

    fn description(&self) -> &'static str {
        "Describes tenant databases, across instances or within one."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DescribeTenantDatabasesConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DescribeTenantDatabasesResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DescribeTenantDatabasesConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .describe_tenant_databases()
            .set_db_instance_identifier(cfg.db_instance_identifier)
            .set_tenant_db_name(cfg.tenant_db_name)
            .set_filters(filters(cfg.filters)?)
            .set_marker(cfg.marker)
            .set_max_records(cfg.max_records)
            .send()
            .await
            .map_err(|e| BlockError::api("DescribeTenantDatabases", e))?;
        to_output(DescribeTenantDatabasesResponse {
            tenant_databases: output
                .tenant_databases
                .map(|list| list.into_iter().map(TenantDatabase::from).collect()),
            marker: output.marker,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTenantDatabaseConfig {
    #[serde(rename = "DBInstanceIdentifier")]
    #[schemars(description = "Identifier of the CDB-enabled instance to create the tenant in")]
    pub db_instance_identifier: String,
    #[serde(rename = "TenantDBName")]
    #[schemars(description = "Name of the tenant database, unique within the instance")]
    pub tenant_db_name: String,
    #[schemars(description = "Name of the tenant database's master user")]
    pub master_username: String,
    #[schemars(description = "Password for the master user")]
    pub master_user_password: String,
    #[schemars(description = "Character set, e.g. AL32UTF8; instance default when omitted")]
    pub character_set_name: Option<String>,
    #[schemars(description = "National character set, e.g. AL16UTF16")]
    pub nchar_character_set_name: Option<String>,
    #[schemars(description = "Tags to apply to the tenant database")]
    pub tags: Option<Vec<TagInput>>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TenantDatabaseResponse {
    pub tenant_database: Option<TenantDatabase>,
}

/// Wraps RDS `CreateTenantDatabase`.
pub struct CreateTenantDatabase;

#[async_trait]
impl Block for CreateTenantDatabase {
    fn name(&self) -> &'static str {
        "rds.create_tenant_database"
    }

    fn description(&self) -> &'static str {
        "Creates a tenant database in a multi-tenant instance."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(CreateTenantDatabaseConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(TenantDatabaseResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: CreateTenantDatabaseConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .create_tenant_database()
            .db_instance_identifier(cfg.db_instance_identifier)
            .tenant_db_name(cfg.tenant_db_name)
            .master_username(cfg.master_username)
            .master_user_password(cfg.master_user_password)
            .set_character_set_name(cfg.character_set_name)
            .set_nchar_character_set_name(cfg.nchar_character_set_name)
            .set_tags(tags(cfg.tags))
            .send()
            .await
            .map_err(|e| BlockError::api("CreateTenantDatabase", e))?;
        to_output(TenantDatabaseResponse {
            tenant_database: output.tenant_database.map(TenantDatabase::from),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyTenantDatabaseConfig {
    #[serde(rename = "DBInstanceIdentifier")]
    #[schemars(description = "Identifier of the instance holding the tenant database")]
    pub db_instance_identifier: String,
    #[serde(rename = "TenantDBName")]
    #[schemars(description = "Current name of the tenant database")]
    pub tenant_db_name: String,
    #[schemars(description = "New password for the master user")]
    pub master_user_password: Option<String>,
    #[serde(rename = "NewTenantDBName")]
    #[schemars(description = "New name for the tenant database")]
    pub new_tenant_db_name: Option<String>,
}

/// Wraps RDS `ModifyTenantDatabase`. The returned model carries the requested
/// changes under `PendingModifiedValues` until they apply.
pub struct ModifyTenantDatabase;

#[async_trait]
impl Block for ModifyTenantDatabase {
    fn name(&self) -> &'static str {
        "rds.modify_tenant_database"
    }

    fn description(&self) -> &'static str {
        "Modifies a tenant database, renaming it or rotating the master password."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(ModifyTenantDatabaseConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(TenantDatabaseResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: ModifyTenantDatabaseConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .modify_tenant_database()
            .db_instance_identifier(cfg.db_instance_identifier)
            .tenant_db_name(cfg.tenant_db_name)
            .set_master_user_password(cfg.master_user_password)
            .set_new_tenant_db_name(cfg.new_tenant_db_name)
            .send()
            .await
            .map_err(|e| BlockError::api("ModifyTenantDatabase", e))?;
        to_output(TenantDatabaseResponse {
            tenant_database: output.tenant_database.map(TenantDatabase::from),
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTenantDatabaseConfig {
    #[serde(rename = "DBInstanceIdentifier")]
    #[schemars(description = "Identifier of the instance holding the tenant database")]
    pub db_instance_identifier: String,
    #[serde(rename = "TenantDBName")]
    #[schemars(description = "Name of the tenant database to delete")]
    pub tenant_db_name: String,
    #[schemars(description = "Skip the final snapshot; default false")]
    pub skip_final_snapshot: Option<bool>,
    #[serde(rename = "FinalDBSnapshotIdentifier")]
    #[schemars(description = "Name for the final snapshot, required unless skipped")]
    pub final_db_snapshot_identifier: Option<String>,
}

/// Wraps RDS `DeleteTenantDatabase`.
pub struct DeleteTenantDatabase;

#[async_trait]
impl Block for DeleteTenantDatabase {
    fn name(&self) -> &'static str {
        "rds.delete_tenant_database"
    }

    fn description(&self) -> &'static str {
        "Deletes a tenant database, optionally taking a final snapshot first."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(DeleteTenantDatabaseConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(TenantDatabaseResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: DeleteTenantDatabaseConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .delete_tenant_database()
            .db_instance_identifier(cfg.db_instance_identifier)
            .tenant_db_name(cfg.tenant_db_name)
            .set_skip_final_snapshot(cfg.skip_final_snapshot)
            .set_final_db_snapshot_identifier(cfg.final_db_snapshot_identifier)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteTenantDatabase", e))?;
        to_output(TenantDatabaseResponse {
            tenant_database: output.tenant_database.map(TenantDatabase::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_tenant_database_config_uses_rds_member_names() {
        let cfg: CreateTenantDatabaseConfig = parse_config(json!({
            "DBInstanceIdentifier": "saas-oracle-1",
            "TenantDBName": "acme",
            "MasterUsername": "acme_admin",
            "MasterUserPassword": "correct-horse-battery",
            "CharacterSetName": "AL32UTF8"
        }))
        .unwrap();
        assert_eq!(cfg.db_instance_identifier, "saas-oracle-1");
        assert_eq!(cfg.tenant_db_name, "acme");
    }

    #[test]
    fn create_tenant_database_schema_requires_credentials() {
        let schema = serde_json::to_value(CreateTenantDatabase.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("DBInstanceIdentifier")));
        assert!(required.contains(&json!("TenantDBName")));
        assert!(required.contains(&json!("MasterUsername")));
        assert!(required.contains(&json!("MasterUserPassword")));
    }

    #[test]
    fn modify_tenant_database_rename_member_is_caps_db() {
        let cfg: ModifyTenantDatabaseConfig = parse_config(json!({
            "DBInstanceIdentifier": "saas-oracle-1",
            "TenantDBName": "acme",
            "NewTenantDBName": "acme_prod"
        }))
        .unwrap();
        assert_eq!(cfg.new_tenant_db_name.as_deref(), Some("acme_prod"));
    }

    #[test]
    fn delete_tenant_database_config_rejects_camel_case_members() {
        let err = parse_config::<DeleteTenantDatabaseConfig>(json!({
            "dbInstanceIdentifier": "saas-oracle-1",
            "tenantDBName": "acme"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid block configuration"));
    }

    #[test]
    fn describe_tenant_databases_config_parses_filters() {
        let cfg: DescribeTenantDatabasesConfig = parse_config(json!({
            "Filters": [{"Name": "tenant-db-name", "Values": ["acme", "globex"]}],
            "MaxRecords": 50
        }))
        .unwrap();
        let filters = cfg.filters.unwrap();
        assert_eq!(filters[0].values.len(), 2);
        assert_eq!(cfg.max_records, Some(50));
    }
}

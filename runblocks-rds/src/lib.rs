//! RDS tenant database blocks.
//!
//! Tenant databases live inside a CDB-enabled Oracle instance; each block
//! wraps one of the four RDS calls that manage them. Configs transcribe the
//! RDS request shapes; emitted events transcribe the response shapes.

pub mod tenant_databases;
pub mod types;

use runblocks_core::Block;

/// The RDS block catalog.
pub fn blocks() -> Vec<Box<dyn Block>> {
    vec![
        Box::new(tenant_databases::DescribeTenantDatabases),
        Box::new(tenant_databases::CreateTenantDatabase),
        Box::new(tenant_databases::ModifyTenantDatabase),
        Box::new(tenant_databases::DeleteTenantDatabase),
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
        assert!(names.iter().all(|n| n.starts_with("rds.")));
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

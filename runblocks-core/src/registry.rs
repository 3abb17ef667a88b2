use std::collections::BTreeMap;

use crate::block::Block;
use crate::error::{BlockError, BlockResult};

/// The block catalog, keyed by block name. Built once at startup from the
/// per-service catalogs.
#[derive(Default)]
pub struct Registry {
    blocks: BTreeMap<&'static str, Box<dyn Block>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog of blocks. Duplicate names are a programming error
    /// in the catalog definition, not a runtime condition.
    pub fn register(&mut self, blocks: Vec<Box<dyn Block>>) {
        for block in blocks {
            let name = block.name();
            log::debug!("registering block {name}");
            assert!(
                self.blocks.insert(name, block).is_none(),
                "duplicate block name: {name}"
            );
        }
    }

    pub fn get(&self, name: &str) -> BlockResult<&dyn Block> {
        self.blocks
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| BlockError::UnknownBlock(name.to_string()))
    }

    /// All blocks in catalog (name) order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Block> {
        self.blocks.values().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::to_output;
    use crate::connection::AwsConnection;
    use async_trait::async_trait;
    use schemars::{schema_for, JsonSchema, Schema};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Deserialize, JsonSchema)]
    struct NoConfig {}

    #[derive(Serialize, JsonSchema)]
    struct NoOutput {}

    struct Stub(&'static str);

    #[async_trait]
    impl Block for Stub {
        fn name(&self) -> &'static str {
            self.0
        }
        fn description(&self) -> &'static str {
            "stub"
        }
        fn config_schema(&self) -> Schema {
            schema_for!(NoConfig)
        }
        fn output_schema(&self) -> Schema {
            schema_for!(NoOutput)
        }
        async fn run(&self, _connection: &AwsConnection, _config: Value) -> crate::BlockResult<Value> {
            to_output(NoOutput {})
        }
    }

    #[test]
    fn get_resolves_registered_blocks() {
        let mut registry = Registry::new();
        registry.register(vec![Box::new(Stub("ec2.create_volume"))]);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("ec2.create_volume").map(Block::name).ok(),
            Some("ec2.create_volume")
        );
    }

    #[test]
    fn get_reports_unknown_block() {
        let registry = Registry::new();
        match registry.get("ec2.missing") {
            Err(BlockError::UnknownBlock(name)) => assert_eq!(name, "ec2.missing"),
            other => panic!("expected UnknownBlock, got {:?}", other.map(Block::name)),
        }
    }

    #[test]
    #[should_panic(expected = "duplicate block name")]
    fn duplicate_names_panic() {
        let mut registry = Registry::new();
        registry.register(vec![
            Box::new(Stub("ec2.create_volume")),
            Box::new(Stub("ec2.create_volume")),
        ]);
    }

    #[test]
    fn registered_block_runs_through_the_trait_object() {
        let mut registry = Registry::new();
        registry.register(vec![Box::new(Stub("lambda.invoke"))]);
        let block = registry.get("lambda.invoke").unwrap();
        let event = tokio_test::block_on(
            block.run(&AwsConnection::default(), Value::Object(serde_json::Map::new())),
        )
        .unwrap();
        assert_eq!(event, serde_json::json!({}));
    }

    #[test]
    fn iter_is_name_ordered() {
        let mut registry = Registry::new();
        registry.register(vec![
            Box::new(Stub("rds.describe_tenant_databases")),
            Box::new(Stub("ec2.delete_volume")),
            Box::new(Stub("lambda.invoke")),
        ]);
        let names: Vec<_> = registry.iter().map(Block::name).collect();
        assert_eq!(
            names,
            vec![
                "ec2.delete_volume",
                "lambda.invoke",
                "rds.describe_tenant_databases"
            ]
        );
    }
}

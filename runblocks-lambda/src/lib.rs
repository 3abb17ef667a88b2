//! Lambda blocks.
//!
//! One block per Lambda API call across the function lifecycle, reserved
//! concurrency, resource tags, layers, and event source mappings. Configs
//! transcribe the Lambda request shapes; emitted events transcribe the
//! response shapes.

pub mod concurrency;
pub mod event_source_mappings;
pub mod functions;
pub mod layers;
pub mod tags;
pub mod types;

use runblocks_core::Block;

/// The Lambda block catalog, in the order the operations are documented.
pub fn blocks() -> Vec<Box<dyn Block>> {
    vec![
        // Functions
        Box::new(functions::CreateFunction),
        Box::new(functions::DeleteFunction),
        Box::new(functions::GetFunction),
        Box::new(functions::GetFunctionConfiguration),
        Box::new(functions::UpdateFunctionCode),
        Box::new(functions::UpdateFunctionConfiguration),
        Box::new(functions::ListFunctions),
        Box::new(functions::Invoke),
        Box::new(functions::PublishVersion),
        Box::new(functions::ListVersionsByFunction),
        // Reserved concurrency
        Box::new(concurrency::PutFunctionConcurrency),
        Box::new(concurrency::GetFunctionConcurrency),
        Box::new(concurrency::DeleteFunctionConcurrency),
        // Tags
        Box::new(tags::ListTags),
        Box::new(tags::TagResource),
        Box::new(tags::UntagResource),
        // Layers
        Box::new(layers::PublishLayerVersion),
        Box::new(layers::GetLayerVersion),
        Box::new(layers::DeleteLayerVersion),
        Box::new(layers::ListLayers),
        Box::new(layers::ListLayerVersions),
        // Event source mappings
        Box::new(event_source_mappings::CreateEventSourceMapping),
        Box::new(event_source_mappings::GetEventSourceMapping),
        Box::new(event_source_mappings::UpdateEventSourceMapping),
        Box::new(event_source_mappings::DeleteEventSourceMapping),
        Box::new(event_source_mappings::ListEventSourceMappings),
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
        assert!(names.iter().all(|n| n.starts_with("lambda.")));
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

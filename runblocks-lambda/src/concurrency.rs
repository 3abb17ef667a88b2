//! Reserved concurrency blocks.

use async_trait::async_trait;
use runblocks_core::{parse_config, to_output, AwsConnection, Block, BlockError, BlockResult};
use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{client, Concurrency};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PutFunctionConcurrencyConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
    #[schemars(description = "Number of concurrent executions reserved for the function")]
    pub reserved_concurrent_executions: i32,
}

/// Wraps Lambda `PutFunctionConcurrency`.
pub struct PutFunctionConcurrency;

#[async_trait]
impl Block for PutFunctionConcurrency {
    fn name(&self) -> &'static str {
        "lambda.put_function_concurrency"
    }

    fn description(&self) -> &'static str {
        "Reserves a share of the account's concurrency for a function."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(PutFunctionConcurrencyConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(Concurrency)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: PutFunctionConcurrencyConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .put_function_concurrency()
            .function_name(cfg.function_name)
            .reserved_concurrent_executions(cfg.reserved_concurrent_executions)
            .send()
            .await
            .map_err(|e| BlockError::api("PutFunctionConcurrency", e))?;
        to_output(Concurrency {
            reserved_concurrent_executions: output.reserved_concurrent_executions,
        })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionConcurrencyConfig {
    #[schemars(description = "Function name, ARN, or partial ARN")]
    pub function_name: String,
}

/// Wraps Lambda `GetFunctionConcurrency`.
pub struct GetFunctionConcurrency;

#[async_trait]
impl Block for GetFunctionConcurrency {
    fn name(&self) -> &'static str {
        "lambda.get_function_concurrency"
    }

    fn description(&self) -> &'static str {
        "Returns a function's reserved concurrency setting."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(FunctionConcurrencyConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(Concurrency)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: FunctionConcurrencyConfig = parse_config(config)?;
        let client = client(connection).await?;
        let output = client
            .get_function_concurrency()
            .function_name(cfg.function_name)
            .send()
            .await
            .map_err(|e| BlockError::api("GetFunctionConcurrency", e))?;
        to_output(Concurrency {
            reserved_concurrent_executions: output.reserved_concurrent_executions,
        })
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteFunctionConcurrencyResponse {}

/// Wraps Lambda `DeleteFunctionConcurrency`, returning the function to the
/// unreserved pool.
pub struct DeleteFunctionConcurrency;

#[async_trait]
impl Block for DeleteFunctionConcurrency {
    fn name(&self) -> &'static str {
        "lambda.delete_function_concurrency"
    }

    fn description(&self) -> &'static str {
        "Removes a function's reserved concurrency."
    }

    fn config_schema(&self) -> Schema {
        schema_for!(FunctionConcurrencyConfig)
    }

    fn output_schema(&self) -> Schema {
        schema_for!(DeleteFunctionConcurrencyResponse)
    }

    async fn run(&self, connection: &AwsConnection, config: Value) -> BlockResult<Value> {
        let cfg: FunctionConcurrencyConfig = parse_config(config)?;
        let client = client(connection).await?;
        client
            .delete_function_concurrency()
            .function_name(cfg.function_name)
            .send()
            .await
            .map_err(|e| BlockError::api("DeleteFunctionConcurrency", e))?;
        to_output(DeleteFunctionConcurrencyResponse {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_concurrency_schema_requires_both_members() {
        let schema = serde_json::to_value(PutFunctionConcurrency.config_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("FunctionName")));
        assert!(required.contains(&json!("ReservedConcurrentExecutions")));
    }

    #[test]
    fn put_concurrency_config_requires_integer_reservation() {
        let err = parse_config::<PutFunctionConcurrencyConfig>(json!({
            "FunctionName": "orders-api",
            "ReservedConcurrentExecutions": "ten"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid block configuration"));
    }
}

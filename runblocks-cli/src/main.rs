//! runblocks command line.
//!
//! `list` and `schema` introspect the catalog without touching AWS; `run`
//! executes a single block against a region with the supplied credentials.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use runblocks_core::{AwsConnection, Registry};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "runblocks", version, about = "Declarative blocks over AWS API calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every block in the catalog with its description
    List,
    /// Print a block's config and output schemas as JSON
    Schema {
        /// Block name, e.g. ec2.create_volume
        name: String,
    },
    /// Run one block and print the event it emits
    Run {
        /// Block name, e.g. lambda.invoke
        name: String,

        /// Path to a JSON file holding the block configuration
        #[arg(long, value_name = "FILE", conflicts_with = "config_json")]
        config: Option<PathBuf>,

        /// Inline JSON block configuration
        #[arg(long, value_name = "JSON")]
        config_json: Option<String>,

        /// AWS region to target
        #[arg(long, env = "AWS_REGION")]
        region: String,

        /// Static access key ID; omit to use the default credential chain
        #[arg(long, env = "AWS_ACCESS_KEY_ID")]
        access_key_id: Option<String>,

        /// Static secret access key
        #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
        secret_access_key: Option<String>,

        /// Session token for temporary credentials
        #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
        session_token: Option<String>,

        /// Custom endpoint URL, e.g. a LocalStack address
        #[arg(long, env = "AWS_ENDPOINT_URL")]
        endpoint_url: Option<String>,
    },
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(runblocks_ec2::blocks());
    registry.register(runblocks_lambda::blocks());
    registry.register(runblocks_rds::blocks());
    registry
}

fn load_config(config: Option<PathBuf>, config_json: Option<String>) -> Result<Value> {
    match (config, config_json) {
        (Some(path), None) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))
        }
        (None, Some(raw)) => serde_json::from_str(&raw).context("parsing --config-json"),
        (None, None) => Ok(Value::Object(serde_json::Map::new())),
        (Some(_), Some(_)) => bail!("pass either --config or --config-json, not both"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = registry();

    match cli.command {
        Commands::List => {
            for block in registry.iter() {
                println!("{:<40} {}", block.name(), block.description());
            }
        }
        Commands::Schema { name } => {
            let block = registry.get(&name)?;
            let schemas = serde_json::json!({
                "name": block.name(),
                "description": block.description(),
                "config": block.config_schema(),
                "output": block.output_schema(),
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Commands::Run {
            name,
            config,
            config_json,
            region,
            access_key_id,
            secret_access_key,
            session_token,
            endpoint_url,
        } => {
            let block = registry.get(&name)?;
            let config = load_config(config, config_json)?;
            let connection = AwsConnection {
                region,
                access_key_id,
                secret_access_key,
                session_token,
                endpoint_url,
            };
            log::info!("running block {name}");
            let event = block.run(&connection, config).await?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    Ok(())
}

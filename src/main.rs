use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use file_manager_agent::files::GeminiFileSearchProvider;
use file_manager_agent::llm::GeminiProvider;
use file_manager_agent::logging::{self, LoggingConfig};
use file_manager_agent::{FileManagerAgent, FileManagerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <store-display-name> <store-resource>", args[0]);
    }
    let (store_name, store_resource) = (args[1].clone(), args[2].clone());

    let _log_guard = logging::init_logging(&LoggingConfig::from_env())?;
    tracing::info!("=== File Manager Agent Starting ===");

    let config = FileManagerConfig::from_env()?;

    let llm = GeminiProvider::new(config.api_key.clone())?
        .with_model(config.model.clone())
        .with_max_tokens(config.max_tokens)
        .with_api_base(config.api_base.clone());
    let files = GeminiFileSearchProvider::new(config.api_key.clone()).with_api_base(config.api_base.clone());

    let mut cache = HashMap::new();
    cache.insert(store_name.clone(), store_resource);

    let agent = FileManagerAgent::new(store_name, Arc::new(cache), Arc::new(llm), Arc::new(files), &config);
    println!("{}", agent.reply().await);

    tracing::info!("=== File Manager Agent Shutting Down ===");
    Ok(())
}

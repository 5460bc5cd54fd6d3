use std::path::Path;
use std::sync::Arc;

use console::style;
use tracing::info;

use crate::answer::QaService;
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::openai::OpenAiClient;
use crate::web::{AppState, start_server};
use crate::{QaError, Result};

/// Load and validate the configuration file
#[inline]
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).map_err(|e| QaError::Config(format!("{:#}", e)))
}

/// Build the QA service backed by the remote API
#[inline]
pub fn build_service(config: &Config) -> Result<QaService> {
    let client = Arc::new(OpenAiClient::from_config(config)?);
    let embedder: Arc<dyn Embedder> = Arc::<OpenAiClient>::clone(&client);
    QaService::from_config(config, embedder, client)
}

/// Index the documents, then serve the web front end
#[inline]
pub async fn serve(config: Config) -> Result<()> {
    let service = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_service(&config))
            .await
            .map_err(|e| QaError::Other(anyhow::anyhow!("Index build task failed: {}", e)))??
    };
    info!(
        "Index ready with {} chunks from {}",
        service.index().len(),
        config.documents.directory.display()
    );

    let state = AppState::new(Arc::new(service), &config.server.title);
    start_server(&config.server.bind_address(), state).await
}

/// Index the documents and answer a single question on stdout
#[inline]
pub fn ask(config: &Config, question: &str) -> Result<()> {
    let service = build_service(config)?;
    let answer = service.answer(question)?;

    println!("{} {}", style("Answer:").bold().green(), answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("{}", style("Sources:").bold().yellow());
        for source in &answer.sources {
            println!(
                "  {} {}",
                source.chunk.source,
                style(format!("(similarity {:.3})", source.similarity)).dim()
            );
        }
    }

    Ok(())
}

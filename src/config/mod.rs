// Configuration management module
// TOML settings file plus the API key taken from the environment

pub mod settings;

#[cfg(test)]
mod tests;

use console::style;

pub use settings::{
    Config, ConfigError, DEFAULT_API_KEY_ENV, DEFAULT_CONFIG_FILE, DocumentsConfig, LoggingConfig,
    OpenAiConfig, RetrievalConfig, ServerConfig,
};

/// Print the effective configuration to stderr
#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    match &config.source_path {
        Some(path) => eprintln!("Config file: {}", style(path.display()).dim()),
        None => eprintln!("Config file: {}", style("(defaults)").dim()),
    }
    eprintln!();

    eprintln!("{}", style("Documents:").bold().yellow());
    eprintln!(
        "  Directory: {}",
        style(config.documents.directory.display()).cyan()
    );
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!(
        "  Chunk Overlap: {}",
        style(config.chunking.chunk_overlap).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!();

    eprintln!("{}", style("OpenAI Settings:").bold().yellow());
    match config.openai.api_url() {
        Ok(url) => eprintln!("  API URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  API URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!(
        "  Embedding Model: {}",
        style(&config.openai.embedding_model).cyan()
    );
    eprintln!(
        "  Completion Model: {}",
        style(&config.openai.completion_model).cyan()
    );
    eprintln!("  Temperature: {}", style(config.openai.temperature).cyan());
    eprintln!("  Batch Size: {}", style(config.openai.batch_size).cyan());
    if config.api_key().is_some() {
        eprintln!(
            "  API Key: {} (from {})",
            style("set").green(),
            config.openai.api_key_env
        );
    } else {
        eprintln!(
            "  API Key: {} (set {})",
            style("missing").red(),
            config.openai.api_key_env
        );
    }
    eprintln!();

    eprintln!("{}", style("Server:").bold().yellow());
    eprintln!(
        "  Address: {}",
        style(config.server.bind_address()).cyan()
    );
    eprintln!(
        "  Log File: {}",
        style(config.log_file_path().display()).cyan()
    );
}

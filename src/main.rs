use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdf_qa::Result;
use pdf_qa::commands::{ask, load_config, serve};
use pdf_qa::config::{DEFAULT_CONFIG_FILE, show_config};
use pdf_qa::logging::init_logging;

#[derive(Parser)]
#[command(name = "pdf-qa")]
#[command(about = "Ask questions about a directory of PDF documents")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the documents and serve the question form (default)
    Serve {
        /// Override the port from the configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Index the documents and answer one question
    Ask {
        /// The question to answer
        question: String,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    if let Some(Commands::Config) = cli.command {
        show_config(&config);
        return Ok(());
    }

    let _guard = init_logging(&config.logging)?;

    match cli.command {
        None => serve(config).await?,
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.server.port = port;
                config.validate()?;
            }
            serve(config).await?;
        }
        Some(Commands::Ask { question }) => {
            tokio::task::spawn_blocking(move || ask(&config, &question))
                .await
                .map_err(|e| pdf_qa::QaError::Other(e.into()))??;
        }
        Some(Commands::Config) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["pdf-qa"]).expect("should parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn serve_with_port() {
        let cli = Cli::try_parse_from(["pdf-qa", "serve", "--port", "9000"]).expect("should parse");

        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(9000)),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn ask_with_question() {
        let cli = Cli::try_parse_from([
            "pdf-qa",
            "ask",
            "How much was the agriculture budget increased by?",
        ])
        .expect("should parse");

        match cli.command {
            Some(Commands::Ask { question }) => {
                assert_eq!(question, "How much was the agriculture budget increased by?");
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["pdf-qa", "config", "--config", "custom.toml"])
            .expect("should parse");

        assert!(matches!(cli.command, Some(Commands::Config)));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn ask_requires_question() {
        let result = Cli::try_parse_from(["pdf-qa", "ask"]);
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn invalid_command() {
        let result = Cli::try_parse_from(["pdf-qa", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn help_message() {
        let result = Cli::try_parse_from(["pdf-qa", "--help"]);
        assert!(result.is_err());

        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}

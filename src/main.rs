use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_lexicon::channel::ChannelIdentifier;
use channel_lexicon::cli::{Cli, Commands, OutputFormat};
use channel_lexicon::config::Config;
use channel_lexicon::pipeline::{AggregationEngine, AnalysisSettings};
use channel_lexicon::{output, utils, LexiconError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "channel_lexicon=debug" } else { "channel_lexicon=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli).await {
        for line in error_lines(&err) {
            eprintln!("{}", line);
        }
        std::process::exit(1);
    }
}

/// User-facing lines for a failed run
fn error_lines(err: &anyhow::Error) -> Vec<String> {
    match err.downcast_ref::<LexiconError>() {
        Some(LexiconError::InvalidIdentifier(input)) => vec![
            format!("Error: Invalid channel identifier: {}", input),
            "Use a channel URL with an @handle or a /channel/<ID> path, e.g. https://www.youtube.com/@channel"
                .to_string(),
        ],
        Some(LexiconError::EntityNotFound(handle)) => {
            vec![format!("Error: Could not find a channel for {}", handle)]
        }
        Some(LexiconError::Provider(provider_err)) => {
            // The outermost context names the step that failed
            let mut lines = vec![format!("Error: {}", err)];
            if err.to_string() != provider_err.to_string() {
                lines.push(format!("   {}", provider_err.message));
            }
            if let Some(code) = provider_err.code {
                lines.push(format!("   (YouTube Data API returned {})", code));
            }
            lines
        }
        None => vec![format!("Error: {:#}", err)],
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            channel,
            top_n,
            max_results,
            language,
            captions,
            output,
            format,
            api_key,
            concurrency,
        } => {
            // Reject malformed identifiers before touching config, credentials or the network
            ChannelIdentifier::parse(&channel)?;

            let mut config = Config::load().await?;
            if let Some(top_n) = top_n {
                config.analysis.top_n = top_n as usize;
            }
            if let Some(max_results) = max_results {
                config.analysis.max_results = max_results;
            }
            if let Some(language) = language {
                config.analysis.language = language;
            }
            if let Some(captions) = captions {
                config.captions.preferred_languages = captions;
            }
            if let Some(concurrency) = concurrency {
                config.app.max_concurrent_fetches = concurrency as usize;
            }
            config.validate()?;

            let api_key = config.api_key(api_key.as_deref())?;

            // Check for required external dependencies (non-fatal)
            let missing_deps = utils::check_dependencies(&config.captions.yt_dlp_path).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - videos will be reported without transcripts)");
            }

            let format = match format {
                Some(format) => format,
                None => OutputFormat::from_str(&config.app.default_output_format, true)
                    .map_err(|e| anyhow::anyhow!("Invalid app.default_output_format: {}", e))?,
            };

            let mut settings = AnalysisSettings::from_config(&config);
            settings.show_progress = !cli.quiet;
            let engine = AggregationEngine::from_config(&config, api_key, settings);

            let report = engine.run(&channel).await?;

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(utils::generate_report_filename(report.display_title(), format.extension()))
                    } else {
                        path
                    };
                    output::save_to_file(&report, &path, &format).await?;
                    println!("Report saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&report, &format)?;
                }
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Edit it to change defaults, or run `lexicon config --show`.");
            }
        }
        Commands::Stopwords { language } => {
            let words = language.words();
            if words.is_empty() {
                println!("No stopwords are filtered for '{}'.", language);
            } else {
                println!("{} stopwords ({}):", words.len(), language);
                println!("{}", words.join(", "));
            }
        }
    }

    Ok(())
}

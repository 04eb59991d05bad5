//! engageny-chef: translate chef strings through the cached Google translator.
//!
//! Subcommands: `translate` (arguments or stdin lines), `forget` (drop cached entries),
//! `init-config` (write an example configuration file), `env-docs` (print environment
//! variable documentation).

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use engageny_chef::core::{
    build_localizer, forget_translations, normalize_language, print_error_message,
    print_info_message,
};
use engageny_chef::env::{core::LogLevel, core::NoColor, generate_env_docs, EnvConfig, EnvVar};
use engageny_chef::translation::config::{ConfigManager, TranslationConfig};
use engageny_chef::translation::error::{TranslationError, TranslationResult};

#[derive(Parser, Debug)]
#[command(name = "engageny-chef")]
#[command(about = "Cached translation of chef titles and descriptions")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the translation-cache-<lang> stores
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Target language: ar, bn, en, es, zh-cn, zh-tw
    #[arg(short, long, value_name = "LANG")]
    lang: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Translate each argument, or each stdin line when none are given
    Translate {
        #[arg(value_name = "TEXT")]
        texts: Vec<String>,
    },
    /// Remove cached translations for the given source texts
    Forget {
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },
    /// Write an example configuration file with every default filled in
    InitConfig {
        #[arg(value_name = "FILE", default_value = "engageny-chef.toml")]
        path: PathBuf,
    },
    /// Print environment variable documentation
    EnvDocs {
        /// Also print the values currently set in the environment
        #[arg(long)]
        summary: bool,
    },
}

fn init_logging() {
    let level = LogLevel::get_or_default("info".to_string());
    let no_color = NoColor::get_or_default(false);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(io::stderr)
        .with_ansi(!no_color)
        .init();
}

fn load_config(args: &Args) -> TranslationResult<TranslationConfig> {
    let manager = match &args.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };

    let mut config = match &args.lang {
        Some(lang) => manager.config_for_language(&normalize_language(Some(lang))?),
        None => manager.into_config(),
    };
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.to_string_lossy().into_owned();
    }

    Ok(config)
}

fn translate(config: &TranslationConfig, texts: Vec<String>) -> TranslationResult<()> {
    let texts = if texts.is_empty() {
        io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        texts
    };

    let mut localizer = build_localizer(config)?;
    for text in &texts {
        match localizer.localize(text) {
            Ok(translated) => print_info_message(&translated),
            Err(e) => {
                localizer.finish()?;
                return Err(e);
            }
        }
    }
    localizer.finish()?;

    Ok(())
}

fn run(args: Args) -> TranslationResult<()> {
    match &args.cmd {
        Command::EnvDocs { summary } => {
            print_info_message(&generate_env_docs());
            if *summary {
                EnvConfig::from_env()
                    .map_err(|e| TranslationError::ConfigError(e.to_string()))?
                    .print_summary();
            }
            Ok(())
        }
        Command::Translate { texts } => {
            let config = load_config(&args)?;
            translate(&config, texts.clone())
        }
        Command::Forget { texts } => {
            let config = load_config(&args)?;
            forget_translations(&config, texts)
        }
        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(path)?;
            print_info_message(&format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(args) {
        print_error_message(&format!("Error: {}", e));
        process::exit(1);
    }
}

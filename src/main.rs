//! CLI entry point for `mailcards`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use mailcards::config::{self, Config};
use mailcards::error::CardsError;
use mailcards::extract::explode;
use mailcards::i18n;
use mailcards::model::Source;
use mailcards::pipeline::MessageViewExtractor;

#[derive(Parser)]
#[command(name = "mailcards", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<String>,

    /// Configuration file (overrides $MAILCARDS_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a message to HTML with cards
    Render {
        /// Message file (.eml)
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the flattened plain text instead of HTML
        #[arg(long)]
        text: bool,
    },
    /// Print the structured data found in a message
    Extract {
        /// Message file (.eml)
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the buttons generated for a JSON-LD document
    Buttons {
        /// JSON-LD document (.json)
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// Value of `--name VALUE` or `--name=VALUE`, scanned before clap runs.
fn early_arg(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == name {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix(&prefix).map(String::from)
        }
    })
}

/// Load the configuration named by `--config`, or the default one.
fn load_config_early(args: &[String]) -> Config {
    match early_arg(args, "--config") {
        Some(path) => config::load_config_from(Path::new(&path)),
        None => config::load_config(),
    }
}

/// Language from `--lang`, then `[general] lang`, then the system locale.
fn detect_lang_early(args: &[String], config: &Config) -> i18n::Lang {
    early_arg(args, "--lang")
        .as_deref()
        .and_then(i18n::Lang::from_code)
        .or_else(|| config.general.lang.as_deref().and_then(i18n::Lang::from_code))
        .unwrap_or_else(i18n::detect_system_lang)
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let mut cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .after_help(i18n::app_after_help());

    for (name, about) in [
        ("render", i18n::help_cmd_render()),
        ("extract", i18n::help_cmd_extract()),
        ("buttons", i18n::help_cmd_buttons()),
        ("completions", i18n::help_cmd_completions()),
        ("manpage", i18n::help_cmd_manpage()),
    ] {
        cmd = cmd.mut_subcommand(name, |s| s.about(about));
    }
    cmd
}

fn main() -> anyhow::Result<()> {
    // Language must be known before clap renders --help, and it may come
    // from the config file.
    let args: Vec<String> = std::env::args().collect();
    let config = load_config_early(&args);
    i18n::set_lang(detect_lang_early(&args, &config));

    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    tracing::debug!(config = ?cli.config, lang = i18n::lang().code(), "Startup");

    match cli.command {
        Commands::Render { file, output, text } => cmd_render(&config, &file, output.as_deref(), text),
        Commands::Extract { file, pretty } => cmd_extract(&config, &file, pretty),
        Commands::Buttons { file } => cmd_buttons(&config, &file),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailcards.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("{}: {}", i18n::err_file_not_found(), path.display());
    }
    Ok(std::fs::read(path).map_err(|e| CardsError::io(path, e))?)
}

/// Run the full pipeline and write the resulting HTML (or text).
fn cmd_render(config: &Config, file: &Path, output: Option<&Path>, text: bool) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let view = MessageViewExtractor::from_config(config).view_raw_message(&raw)?;
    let body = if text { &view.text } else { &view.html };

    match output {
        Some(path) => {
            std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "  {} card(s) from {} -> {}",
                view.objects.len() + usize::from(view.heuristic.is_some()),
                file.display(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Print extracted objects (and the heuristic object) as JSON.
fn cmd_extract(config: &Config, file: &Path, pretty: bool) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let view = MessageViewExtractor::from_config(config).view_raw_message(&raw)?;
    let report = serde_json::json!({
        "objects": view.objects,
        "heuristic": view.heuristic,
    });
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

/// Print the buttons of every object in a JSON-LD document.
fn cmd_buttons(config: &Config, file: &Path) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let value: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;
    let extractor = MessageViewExtractor::from_config(config);

    let report: Vec<serde_json::Value> = explode(value, Source::LdJsonPart)
        .iter()
        .map(|obj| {
            serde_json::json!({
                "type": obj.schema_type(),
                "buttons": extractor.buttons_for(&obj.value),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailcards", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let man = clap_mangen::Man::new(build_localized_command());
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}

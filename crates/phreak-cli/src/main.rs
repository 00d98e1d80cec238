//! Phreak CLI - planner-driven browsing of an in-scope domain
//!
//! Usage:
//!   phreak init                     Write a default .phreak/config.toml
//!   phreak run                      Interactive capture/plan/act loop
//!   phreak snapshot <url>           Capture one page and print its elements
//!   phreak compile <file>           Compile a saved capture offline
//!   phreak exec <url> <command>...  Run raw commands against one capture

mod shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phreak_agent::{BrowsePrompt, CompletionClient};
use phreak_browser::{BrowserDriver, BrowserSession, Session};
use phreak_core::PhreakConfig;
use phreak_page::{compile, CapturedPage, CompileOptions};
use shell::{Interrupt, Prompter, Shell, MANUAL_SETTLE};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "phreak")]
#[command(author, version, about = "Planner-driven browsing of an in-scope domain")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide page content; exercise caution when running suggested commands
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to .phreak/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Attach to a browser already listening on this debugging port
    #[arg(long, global = true, value_name = "PORT")]
    connect: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run the interactive loop on the scoped domain
    Run {
        /// Override the scoped domain from the configuration
        #[arg(long)]
        domain: Option<String>,
    },

    /// Capture one page and print its elements
    Snapshot {
        url: String,

        /// Save the raw capture as JSON
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Compile a saved capture and print its elements
    Compile {
        file: PathBuf,
    },

    /// Capture one page and run commands against it without a planner
    Exec {
        url: String,

        /// Commands, one per argument (e.g. "CLICK 2" "TYPESUBMIT 4 \"x\"")
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init { path } = &cli.command {
        return cmd_init(path);
    }

    let mut config = load_config(cli.config.as_deref())?;
    config.session.quiet |= cli.quiet;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Run { domain } => {
            if let Some(domain) = domain {
                config.session.scoped_domain = domain;
            }
            cmd_run(&config, cli.connect).await
        }
        Commands::Snapshot { url, save } => cmd_snapshot(&config, cli.connect, &url, save).await,
        Commands::Compile { file } => cmd_compile(&config, &file),
        Commands::Exec { url, commands } => {
            cmd_exec(&config, cli.connect, &url, &commands.join("\n")).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PhreakConfig> {
    let config = match path {
        Some(path) => PhreakConfig::load_file_or_default(path),
        None => PhreakConfig::load_or_default(&std::env::current_dir()?),
    };
    config.context("Failed to load configuration")
}

async fn open_browser(config: &PhreakConfig, connect: Option<u16>) -> Result<BrowserSession> {
    let browser = match connect {
        Some(port) => BrowserSession::connect(port).await,
        None => BrowserSession::launch(&config.browser).await,
    };
    browser.context("Failed to start browser")
}

fn compile_options(config: &PhreakConfig) -> CompileOptions {
    CompileOptions {
        correct_macos_ratio: config.browser.correct_macos_ratio,
    }
}

fn cmd_init(path: &Path) -> Result<()> {
    info!("Initializing Phreak in {:?}", path);

    let config_path = PhreakConfig::write_default(path).context("Failed to write config")?;

    println!("Initialized Phreak in {:?}", path);
    println!("Created:");
    println!("  {}", config_path.display());
    Ok(())
}

async fn cmd_run(config: &PhreakConfig, connect: Option<u16>) -> Result<()> {
    let domain = &config.session.scoped_domain;
    phreak_agent::get_api_key(&config.planner.api_key_env)?;

    if config.session.quiet {
        println!(
            "Running in quiet mode (HTML and other content hidden);\n\
             exercise caution when running suggested commands."
        );
    }

    let browser = open_browser(config, connect).await?;
    let mut session = Session::new(browser, config);

    println!("\nWelcome to phreak!");
    println!("Pentest beginning on in-scope domain: \"{}\"", domain);
    session
        .go_to(domain)
        .await
        .with_context(|| format!("Failed to open {}", domain))?;

    let planner = CompletionClient::new(&config.planner);
    let prompt = BrowsePrompt::new(domain.clone(), &config.planner);
    let mut shell = Shell {
        planner: &planner,
        prompt: &prompt,
        prompter: Prompter::new(
            tokio::io::BufReader::new(tokio::io::stdin()),
            Interrupt::listen(),
        ),
        quiet: config.session.quiet,
        settle: MANUAL_SETTLE,
    };

    shell.run(&mut session).await
}

async fn cmd_snapshot(
    config: &PhreakConfig,
    connect: Option<u16>,
    url: &str,
    save: Option<PathBuf>,
) -> Result<()> {
    let browser = open_browser(config, connect).await?;
    browser.go_to(url).await?;

    let page = browser.capture().await.context("Failed to capture page")?;
    if let Some(save) = save {
        tokio::fs::write(&save, serde_json::to_string_pretty(&page)?)
            .await
            .with_context(|| format!("Failed to write {}", save.display()))?;
        info!("Saved capture to {}", save.display());
    }

    print_page(config, &page)
}

fn cmd_compile(config: &PhreakConfig, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let page: CapturedPage =
        serde_json::from_str(&content).context("Failed to parse capture JSON")?;

    print_page(config, &page)
}

fn print_page(config: &PhreakConfig, page: &CapturedPage) -> Result<()> {
    let state = compile(page, &compile_options(config))?;

    println!("URL: {}", state.url);
    println!("{}", state.scroll);
    println!("{}", state.text);
    Ok(())
}

async fn cmd_exec(
    config: &PhreakConfig,
    connect: Option<u16>,
    url: &str,
    commands: &str,
) -> Result<()> {
    let browser = open_browser(config, connect).await?;
    let mut session = Session::new(browser, config);
    session.go_to(url).await?;

    let state = session.capture().await.context("Failed to capture page")?;
    if !config.session.quiet {
        println!("{}\n", state.text);
    }

    let report = session.act(commands).await;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => println!("ok    {}", outcome.command),
            Err(e) => println!("fail  {}: {}", outcome.command, e),
        }
    }
    println!(
        "\n{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );

    println!("URL: {}", session.driver().current_url().await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["phreak", "-q", "exec", "localhost", "CLICK 2", "SCROLL DOWN"]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Exec { url, commands } => {
                assert_eq!(url, "localhost");
                assert_eq!(commands, vec!["CLICK 2", "SCROLL DOWN"]);
            }
            _ => panic!("expected exec"),
        }

        let cli = Cli::parse_from(["phreak", "run", "--domain", "http://localhost:8080/"]);
        assert!(matches!(cli.command, Commands::Run { domain: Some(_) }));
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();

        let config =
            load_config(Some(&PhreakConfig::path_in(dir.path()))).unwrap();
        assert_eq!(config.session.settle_delay_ms, 2000);
    }

    #[test]
    fn test_compile_saved_capture() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capture.json");
        std::fs::write(&file, serde_json::to_string(&CapturedPage::default()).unwrap()).unwrap();

        // A default capture has no documents
        let err = cmd_compile(&PhreakConfig::default(), &file).unwrap_err();
        assert!(err.to_string().contains("Malformed snapshot"));
    }
}

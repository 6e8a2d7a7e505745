//! folio - portfolio site analytics and response hardening tools
//!
//! Inspects the security headers and policy the site is served with, and
//! replays recorded page sessions through the analytics tracker.

mod replay;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::bootstrap::Bootstrap;
use folio_core::security::{self, ContentSecurityPolicy, SecurityHeaders};
use folio_core::Config;
use http::HeaderMap;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio site analytics and response hardening tools")]
#[command(version)]
struct Args {
    /// Verbose output (writes the log file)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the response headers and content security policy
    Headers {
        /// Show what a production response gets (default: site.production)
        #[arg(long)]
        production: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the <meta http-equiv> tags for static pages, plus the gtag.js
    /// bootstrap in production
    Meta {
        /// Render for production (default: site.production)
        #[arg(long)]
        production: bool,
    },

    /// Show the config file path and resolved configuration
    Config,

    /// Replay a recorded page session through the tracker
    Replay {
        /// Session file (JSON)
        session: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose; the guard must outlive the command
    let _log_guard = if args.verbose {
        Some(folio_core::logging::init(&config.logging).context("failed to initialize logging")?)
    } else {
        None
    };

    match args.command {
        Command::Headers { production, json } => {
            cmd_headers(&config, production || config.site.production, json)
        }
        Command::Meta { production } => cmd_meta(&config, production || config.site.production),
        Command::Config => cmd_config(&config),
        Command::Replay { session, json } => cmd_replay(&config, &session, json),
    }
}

fn cmd_headers(config: &Config, production: bool, json: bool) -> Result<()> {
    let headers =
        SecurityHeaders::from_config(&config.security).context("invalid security headers")?;
    let csp = ContentSecurityPolicy::from_config(&config.security);

    let mut applied = HeaderMap::new();
    headers.apply(&mut applied, production);

    let rendered: Vec<(String, String)> = applied
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    if json {
        let headers: serde_json::Map<String, serde_json::Value> = rendered
            .into_iter()
            .map(|(name, value)| (name, serde_json::Value::String(value)))
            .collect();
        let out = serde_json::json!({
            "production": production,
            "headers": headers,
            "content_security_policy": csp.render(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Response Headers");
    println!("================");
    println!();
    println!(
        "Mode:            {}",
        if production { "production" } else { "development" }
    );
    println!();
    if rendered.is_empty() {
        println!("No security headers are applied outside production.");
    } else {
        for (name, value) in &rendered {
            println!("{name}: {value}");
        }
    }
    println!();
    println!("Content Security Policy");
    println!("-----------------------");
    println!("{}", csp.render());

    Ok(())
}

fn cmd_meta(config: &Config, production: bool) -> Result<()> {
    config
        .security
        .validate()
        .context("invalid security configuration")?;
    println!("{}", security::meta_tags(&config.security));

    let mut config = config.clone();
    config.site.production = production;
    if let Some(bootstrap) = Bootstrap::from_config(&config) {
        println!("{}", bootstrap.render());
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let path = Config::config_path();
    let status = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# Config file: {}{}", path.display(), status);
    println!("# Log file:    {}", Config::log_path().display());
    println!();
    print!("{}", config.to_toml().context("failed to render configuration")?);
    Ok(())
}

fn cmd_replay(config: &Config, path: &Path, json: bool) -> Result<()> {
    let session = replay::Session::load(path)
        .with_context(|| format!("failed to load session {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        interactions = session.interactions.len(),
        "Replaying session"
    );

    let report = replay::run(config, &session);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        replay::print_report(&path.display().to_string(), &report);
    }
    Ok(())
}

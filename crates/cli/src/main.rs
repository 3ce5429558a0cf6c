mod config;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use loader::{Context, LocatorKind, NextResolve, Resolved};
use policy::Policy;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "gravymoat.toml";

#[derive(Parser)]
#[command(name = "gravymoat")]
#[command(about = "Least-privilege capability policy for module graphs", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report policy entries that will be ignored
    Check {
        /// Policy file (defaults to the one in the config)
        policy: Option<PathBuf>,
    },
    /// Show how an import by a resource would be resolved
    Explain {
        /// Resource doing the import
        #[arg(long)]
        from: String,
        /// Specifier being imported
        specifier: String,
        /// Policy file (defaults to the one in the config)
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },
    /// Print the module served for a partial builtin grant
    Attenuate {
        /// Module to narrow
        specifier: String,
        /// Exports to keep
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Print the censorship prologue for a resource
    Censor {
        /// Resource whose source would be censored
        resource: String,
        /// Policy file (defaults to the one in the config)
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },
    /// Print the hardening bootstrap injected before the entry module
    Bootstrap,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Check { policy } => cmd_check(&policy_path(policy, &config, &cli.config)?),
        Commands::Explain {
            from,
            specifier,
            policy,
        } => {
            let policy = Policy::load(policy_path(policy, &config, &cli.config)?)?;
            cmd_explain(&config.context(policy)?, &from, &specifier).await
        }
        Commands::Attenuate { specifier, symbols } => cmd_attenuate(&specifier, &symbols),
        Commands::Censor { resource, policy } => {
            let policy = Policy::load(policy_path(policy, &config, &cli.config)?)?;
            cmd_censor(&config.context(policy)?, &resource).await
        }
        Commands::Bootstrap => cmd_bootstrap(&config, &cli.config),
    }
}

fn cmd_check(path: &Path) -> Result<()> {
    let (policy, warnings) = Policy::load_with_warnings(path)?;

    for warning in &warnings {
        println!("warning: {warning}");
    }

    if !warnings.is_empty() {
        return Err(Error::MalformedPolicy {
            path: path.to_path_buf(),
            count: warnings.len(),
        });
    }

    println!(
        "{}: ok ({} resource{})",
        path.display(),
        policy.resources.len(),
        if policy.resources.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Resolves every specifier to a placeholder locator so decisions can be
/// inspected without a real module graph.
struct OfflineResolve;

impl NextResolve for OfflineResolve {
    async fn resolve(&self, specifier: &str) -> loader::Result<Resolved> {
        Ok(Resolved::new(format!("offline:///{specifier}"), None))
    }
}

async fn cmd_explain(ctx: &Context, from: &str, specifier: &str) -> Result<()> {
    let entry = ctx.resolve("<entry>", None, &OfflineResolve).await?;
    let requester = ctx.resolve(from, Some(&entry.locator), &OfflineResolve).await?;
    let resolved = ctx
        .resolve(specifier, Some(&requester.locator), &OfflineResolve)
        .await?;

    match LocatorKind::parse(&resolved.locator)? {
        LocatorKind::Attenuation { symbols, .. } => {
            let names: Vec<&str> = symbols.iter().collect();
            println!("{from} -> {specifier}: attenuated to {}", names.join(", "));
            println!("  locator: {}", resolved.locator);
        }
        LocatorKind::HardeningBootstrap => {
            println!("{from} -> {specifier}: hardening bootstrap");
        }
        LocatorKind::Real(_) if from == specifier => {
            println!("{from} -> {specifier}: allowed (self-reference)");
        }
        LocatorKind::Real(_) => {
            println!("{from} -> {specifier}: allowed");
        }
    }
    Ok(())
}

fn cmd_attenuate(specifier: &str, symbols: &[String]) -> Result<()> {
    println!("{}", loader::codegen::attenuation_source(specifier, symbols)?);
    Ok(())
}

async fn cmd_censor(ctx: &Context, resource: &str) -> Result<()> {
    let allowed = ctx.policy().global_grants(resource).await;
    let prologue = loader::codegen::censorship_prologue(&allowed, ctx.censored_globals());
    println!("{}", prologue.trim_end());
    Ok(())
}

fn cmd_bootstrap(config: &Config, config_path: &Path) -> Result<()> {
    let lockdown = config
        .lockdown()?
        .ok_or_else(|| Error::BootstrapNotConfigured {
            config: config_path.to_path_buf(),
        })?;
    print!("{}", loader::BootstrapSource::source(&lockdown)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        Ok(Config::default_config())
    }
}

fn policy_path(arg: Option<PathBuf>, config: &Config, config_path: &Path) -> Result<PathBuf> {
    arg.or_else(|| config.policy.clone())
        .ok_or_else(|| Error::PolicyNotConfigured {
            config: config_path.to_path_buf(),
        })
}

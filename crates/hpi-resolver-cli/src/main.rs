use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use hpi_resolver_core::{
    ArtifactCoordinate, Config, ManifestAttributes, PluginCatalog, ReleasesByDate,
    RepositoryKind, Result,
};

mod args;
use args::{Cli, Kind, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("hpi-resolver v{}", env!("CARGO_PKG_VERSION"));

    if let Some(shell) = cli.completions {
        handle_completions(shell);
        return ExitCode::SUCCESS;
    }

    if cli.init_config {
        return match Config::init(&resolve_base_dir(cli.base_dir.clone())) {
            Ok(path) => {
                println!("{} {}", "Initialized:".green(), path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{} {}", "[ERROR]".red().bold(), e);
                ExitCode::from(e.exit_code() as u8)
            }
        };
    }

    let result = load_config(&cli).and_then(|config| {
        if cli.by_release_date {
            handle_releases(&config)
        } else {
            // clap guarantees the coordinate when neither flag is given
            let coordinate = cli.coordinate.as_deref().unwrap_or_default();
            handle_resolve(&config, coordinate, cli.digest, cli.timestamp)
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "hpi-resolver", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("HPI_RESOLVER_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".hpi-resolver"))
        .unwrap_or_else(|| PathBuf::from(".hpi-resolver"))
}

/// Config file values, overridden by command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(&resolve_base_dir(cli.base_dir.clone()))?,
    };

    if let Some(url) = &cli.repository_url {
        config.repository.url = url.clone();
    }
    if let Some(id) = &cli.repository_id {
        config.repository.id = id.clone();
    }
    if let Some(kind) = cli.kind {
        config.repository.kind = match kind {
            Kind::Artifactory => RepositoryKind::Artifactory,
            Kind::Maven => RepositoryKind::Maven,
        };
    }
    if let Some(index) = &cli.index {
        config.repository.index = Some(index.clone());
    }
    if let Some(local) = &cli.local_repository {
        config.repository.local = Some(local.clone());
    }

    Ok(config)
}

fn handle_resolve(config: &Config, coordinate: &str, digest: bool, timestamp: bool) -> Result<()> {
    let requested = ArtifactCoordinate::parse(coordinate)?;
    println!(
        "Resolving HPI {}:{}:{}",
        requested.group_id, requested.artifact_id, requested.version
    );

    let repository = config.open_repository()?;
    let catalog = PluginCatalog::discover(&*repository)?;

    let found = catalog.find_plugin(
        &requested.group_id,
        &requested.artifact_id,
        &requested.version,
    );
    let artifact = match found {
        Some(hpi) => hpi.artifact.clone(),
        None => {
            log::warn!("{} is not in the index; resolving it as given", requested);
            requested
        }
    };

    let attributes = repository.load_manifest_attributes(&artifact)?;
    for line in format_attributes(&attributes) {
        println!("{}", line);
    }

    if digest {
        println!("SHA-1:{}", repository.load_digest(&artifact)?);
    }
    if timestamp {
        println!("Timestamp:{}", repository.load_timestamp(&artifact)?.to_rfc3339());
    }

    Ok(())
}

fn handle_releases(config: &Config) -> Result<()> {
    let repository = config.open_repository()?;
    let catalog = PluginCatalog::discover(&*repository)?;

    for line in format_releases(&catalog.list_plugins_by_release_date()) {
        println!("{}", line);
    }
    Ok(())
}

/// `Name:Value` lines, sorted by attribute name
fn format_attributes(attributes: &ManifestAttributes) -> Vec<String> {
    attributes
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect()
}

fn format_releases(releases: &ReleasesByDate) -> Vec<String> {
    releases
        .iter()
        .flat_map(|(date, plugins)| {
            plugins.iter().map(move |(artifact_id, hpi)| {
                format!("{} {}:{}", date.to_rfc3339(), artifact_id, hpi.version())
            })
        })
        .collect()
}

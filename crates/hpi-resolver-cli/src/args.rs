use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "hpi-resolver")]
#[command(about = "Resolve a Jenkins plugin and print its manifest information")]
#[command(version)]
pub struct Cli {
    /// Plugin to resolve: groupId:artifactId:version[:packaging]
    #[arg(
        value_name = "GROUP_ID:ARTIFACT_ID:VERSION",
        required_unless_present_any = [
            "by_release_date",
            "completions",
            "init_config",
        ]
    )]
    pub coordinate: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Base directory (default: ~/.hpi-resolver)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Config file (default: <base-dir>/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Remote repository URL
    #[arg(long)]
    pub repository_url: Option<String>,

    /// Remote repository id
    #[arg(long)]
    pub repository_id: Option<String>,

    /// Accessor strategy
    #[arg(long, value_enum)]
    pub kind: Option<Kind>,

    /// Artifact index: Maven-layout directory or coordinate list file
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Local repository used for downloads (default: ~/.m2/repository)
    #[arg(long)]
    pub local_repository: Option<PathBuf>,

    /// Also print the SHA-1 digest
    #[arg(long)]
    pub digest: bool,

    /// Also print the publish timestamp
    #[arg(long)]
    pub timestamp: bool,

    /// List every indexed release by publish date instead
    #[arg(long, conflicts_with = "coordinate")]
    pub by_release_date: bool,

    /// Write a commented config.toml into the base directory and exit
    #[arg(long, conflicts_with_all = ["coordinate", "by_release_date"])]
    pub init_config: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    Artifactory,
    Maven,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

use std::{net::IpAddr, path::PathBuf};

use clap::Parser;

/// Touches the README.md of repositories in one GitHub organization.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Optional TOML configuration file
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    /// GitHub API token
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Only repositories of this organization are accepted
    #[clap(long)]
    pub organization: Option<String>,
    /// Base url of the GitHub REST API
    #[clap(long)]
    pub github_endpoint: Option<String>,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Serves `GET /?repoUrl=<url>` over HTTP
    Serve {
        #[clap(long)]
        host: Option<IpAddr>,
        #[clap(short, long)]
        port: Option<u16>,
    },
    /// Appends a space to the README.md of a single repository and exits
    Touch {
        repo_url: String,
    },
}

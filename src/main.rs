use std::error::Error;

use clap::Parser;
use readme_upsert::{
    cli::args::{CliArgs, Command},
    config::ReadmeUpsertConfig,
    ReadmeUpserterBuilder,
};

#[tokio::main]
async fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    log::debug!("{:?}", cli_args.cmd);

    let config = ReadmeUpsertConfig::load(cli_args.config.as_deref())?;
    let mut builder = ReadmeUpserterBuilder::from_config(config);
    if let Some(token) = cli_args.token.filter(|token| !token.is_empty()) {
        builder = builder.token(token);
    }
    if let Some(organization) = cli_args.organization {
        builder = builder.organization(organization);
    }
    if let Some(endpoint) = cli_args.github_endpoint {
        builder = builder.github_endpoint(endpoint);
    }

    match cli_args.cmd {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                builder = builder.host(host);
            }
            if let Some(port) = port {
                builder = builder.port(port);
            }
            builder.try_build()?.serve().await
        }
        Command::Touch { repo_url } => {
            let outcome = builder.try_build()?.touch(&repo_url).await?;
            println!("{}", outcome.message());
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

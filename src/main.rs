mod backlog;
mod config;
mod picker;
mod sheet;

use clap::Parser;
use colored::Colorize;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

/// review-sheet — interactive CLI that walks through project, repository,
/// and pull request selection on Backlog, then exports the pull request's
/// review comments to a formatted Excel workbook in the current directory.
#[derive(Parser, Debug)]
#[command(name = "review-sheet", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;
    let client = backlog::BacklogClient::new(&config)?;

    let _main_span = info_span!("export", space = %config.space).entered();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    println!("Fetching projects...");
    let projects = client.list_projects().await?;
    let project = &projects[picker::choose(&projects, "projects", &mut input)?];
    println!("Selected project: {}", project.name.bold());

    println!("Fetching repositories...");
    let repositories = client.list_repositories(project.id).await?;
    let repository = &repositories[picker::choose(&repositories, "repositories", &mut input)?];
    println!("Selected repository: {}", repository.name.bold());

    println!("Fetching pull requests...");
    let pull_requests = client.list_pull_requests(project.id, repository.id).await?;
    let pull_request = &pull_requests[picker::choose(&pull_requests, "pull requests", &mut input)?];
    println!("Selected pull request: {}", pull_request.summary.bold());

    println!("Fetching comments...");
    let comments = client
        .list_comments(project.id, repository.id, pull_request.number)
        .await?;
    info!(comments = comments.len(), "fetched comments");

    let filename = sheet::generate(
        &project.name,
        &repository.name,
        &pull_request.summary,
        &comments,
    )?;
    println!("{} {}", "Excel file generated:".green().bold(), filename);

    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use wikiseed_core::api::{CategoryMemberClient, CategoryMemberSource};
use wikiseed_core::collect::{VITAL_LEVELS, collect_vital_titles};
use wikiseed_core::config::load_config;
use wikiseed_core::output::write_seed_file;

const DEFAULT_CONFIG_PATH: &str = "wikiseed.toml";

#[derive(Debug, Parser)]
#[command(
    name = "wikiseed",
    version,
    about = "Fetch all level-1-to-5 Vital Articles into a seed CSV"
)]
struct Cli {
    #[arg(long, value_name = "PATH", help = "Override the output file")]
    output: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Config file (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print resolved settings before crawling")]
    diagnostics: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(&config_path)?;
    let output = cli.output.unwrap_or_else(|| PathBuf::from(config.output()));

    if cli.diagnostics {
        println!("api_url: {}", config.api_url());
        println!("user_agent: {}", config.user_agent());
        println!("timeout_ms: {}", config.timeout_ms());
        println!("output: {}", normalize_path(&output));
        println!(
            "levels: {}-{}",
            VITAL_LEVELS.start(),
            VITAL_LEVELS.end()
        );
    }

    let mut client = CategoryMemberClient::new(&config)?;
    let titles = collect_vital_titles(&mut client)?;
    println!("fetched_titles: {}", titles.len());
    println!("request_count: {}", client.request_count());

    write_seed_file(&output, &titles)?;
    println!(
        "wrote {} vital article titles to {}",
        titles.len(),
        normalize_path(&output)
    );
    Ok(())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

use anyhow::Result;
use md_image_migrate::{cli::parse_args, run_migration};

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;

    let level = match config.verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    run_migration(&config).await?;
    Ok(())
}

mod budget;
mod db;
mod error;
mod import;
mod models;
mod notify;
mod run;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    let mut db = db::Database::open(&db_path)?;

    if args.len() < 2 {
        run::cli::print_usage();
        return Ok(());
    }
    run::cli::as_cli(&args, &mut db)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("centime=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn get_db_path() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "centime", "Centime")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("centime.db"))
}

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use log::info;

mod app;
mod config;
mod render;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();
    let mut app = App::new(config).context("could not set up the grid")?;

    let outcomes = app.run()?;
    let found = outcomes.iter().filter(|(_, o)| o.is_found()).count();
    info!("{} of {} searches reached the end", found, outcomes.len());

    Ok(())
}

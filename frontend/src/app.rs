use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use solver::{search_with_cancel, Algorithm, CancelToken, Grid, SearchOutcome};

use crate::{config::Config, render};

/// One line of `--json` output.
#[derive(Serialize)]
struct Record<'a> {
    algorithm: Algorithm,
    outcome: &'a SearchOutcome,
}

pub struct App {
    config: Config,
    grid: Grid,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let grid = config.build_grid()?;
        info!(
            "{:?} layout of size {}, start {:?}, end {:?}",
            config.preset,
            grid.size(),
            grid.start(),
            grid.end()
        );
        Ok(Self { config, grid })
    }

    /// Run every algorithm on the same layout, one after the other.
    pub fn run(&mut self) -> Result<Vec<(Algorithm, SearchOutcome)>> {
        let mut outcomes = Vec::with_capacity(Algorithm::ALL.len());
        for algorithm in Algorithm::ALL {
            let outcome = self.run_one(algorithm)?;
            self.report(algorithm, &outcome)?;
            outcomes.push((algorithm, outcome));
        }
        Ok(outcomes)
    }

    fn run_one(&mut self, algorithm: Algorithm) -> Result<SearchOutcome> {
        let start = self.grid.start().context("the grid has no start")?;
        let goal = self.grid.end().context("the grid has no end")?;

        self.grid.reset_visitation();

        let cancel = CancelToken::new();
        let animate = self.config.animate && !self.config.json;
        let delay = Duration::from_millis(self.config.delay_ms);
        let max_steps = self.config.max_steps;
        let mut steps = 0;

        let outcome = search_with_cancel(
            &mut self.grid,
            algorithm,
            start,
            goal,
            |grid| {
                steps += 1;
                if animate {
                    let frame = render::frame(grid, algorithm, steps);
                    if let Err(e) = render::show(&mut io::stdout(), &frame) {
                        warn!("could not draw step {}: {}", steps, e);
                    }
                    thread::sleep(delay);
                }
                if max_steps.is_some_and(|max| steps >= max) {
                    cancel.cancel();
                }
            },
            &cancel,
        )?;

        debug!("{} finished after {} redraws", algorithm, steps);
        Ok(outcome)
    }

    fn report(&self, algorithm: Algorithm, outcome: &SearchOutcome) -> Result<()> {
        let mut out = io::stdout().lock();
        if self.config.json {
            let record = Record { algorithm, outcome };
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        } else {
            writeln!(out, "{}", render::summary(&self.grid, algorithm, outcome))?;
        }
        Ok(())
    }
}

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use solver::{util, Grid, Position, Role};

#[derive(Parser, Debug)]
#[command(name = "gridpath")]
#[command(version)]
#[command(about = "Run A*, Dijkstra, BFS and DFS over a grid and watch them search")]
#[command(long_about = None)]
pub struct Config {
    /// Number of rows (and columns) of the grid
    #[arg(long, short = 'n', env = "GRIDPATH_SIZE", default_value_t = 21)]
    pub size: usize,

    /// Layout to start from
    #[arg(long, short, env = "GRIDPATH_PRESET", default_value = "maze", value_enum)]
    pub preset: Preset,

    /// Move the start to "row,col"
    #[arg(long)]
    pub start: Option<Position>,

    /// Move the end to "row,col"
    #[arg(long)]
    pub end: Option<Position>,

    /// Redraw the grid after every step
    #[arg(long, short, env = "GRIDPATH_ANIMATE")]
    pub animate: bool,

    /// Pause between redraws, in milliseconds
    #[arg(long, env = "GRIDPATH_DELAY_MS", default_value_t = 15)]
    pub delay_ms: u64,

    /// Cancel a search once it has taken this many steps
    #[arg(long, env = "GRIDPATH_MAX_STEPS")]
    pub max_steps: Option<usize>,

    /// Print one JSON object per algorithm instead of captions
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// No walls at all
    Open,
    /// Walls along the edge
    Border,
    /// A single route snaking from top to bottom
    Maze,
    /// The end is walled in and cannot be reached
    Enclosed,
}

impl Config {
    /// Build the preset layout and apply the start/end overrides.
    pub fn build_grid(&self) -> Result<Grid> {
        let mut grid = match self.preset {
            Preset::Open => util::open(self.size),
            Preset::Border => util::bordered(self.size),
            Preset::Maze => util::serpentine(self.size),
            Preset::Enclosed => util::enclosed(self.size),
        }
        .with_context(|| format!("could not build the {:?} layout", self.preset))?;

        for (position, role) in [(self.start, Role::Start), (self.end, Role::End)] {
            if let Some(position) = position {
                // the chosen cell may be a wall or hold the other role
                grid.clear(position)
                    .with_context(|| format!("cannot place {:?} at {}", role, position))?;
                grid.set_role(position, role)?;
            }
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("gridpath").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);

        assert_eq!(config.preset, Preset::Maze);
        assert!(!config.json);
        assert_eq!(config.start, None);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--preset", "open", "-n", "6", "--start", "2,3", "--end", "5,0",
        ]);
        let grid = config.build_grid().unwrap();

        assert_eq!(grid.size(), 6);
        assert_eq!(grid.start(), Some(Position::new(2, 3)));
        assert_eq!(grid.end(), Some(Position::new(5, 0)));
    }

    #[test]
    fn test_start_on_wall() {
        let config = parse(&["--preset", "border", "-n", "5", "--start", "0,0"]);
        let grid = config.build_grid().unwrap();

        let start = grid.cell(Position::new(0, 0)).unwrap();
        assert!(start.is_start());
        assert!(!start.is_wall());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(Config::try_parse_from(["gridpath", "--start", "1;2"]).is_err());
        assert!(parse(&["--preset", "maze", "-n", "2"]).build_grid().is_err());
        assert!(parse(&["-n", "5", "--end", "9,9"]).build_grid().is_err());
    }
}

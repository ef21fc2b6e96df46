use std::io::{self, Write};

use solver::{Algorithm, Grid, SearchOutcome};

/// Moves the cursor home and clears the screen.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// The status line shown under the grid once a search is over.
pub fn caption(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found(report) => format!(
            "Time Elapsed: {:.2}s | Cells Visited: {} | Shortest Path: {} Cells",
            report.elapsed.as_secs_f64(),
            report.cells_visited,
            report.path_length
        ),
        SearchOutcome::NotFound(_) => "Unable To Find The Target Node!".to_owned(),
        SearchOutcome::Cancelled(_) => "Cancelled".to_owned(),
    }
}

/// One animation frame: a cleared screen with the grid and a title.
pub fn frame(grid: &Grid, algorithm: Algorithm, steps: usize) -> String {
    format!("{}{} (step {})\n{}", CLEAR, algorithm, steps, grid)
}

/// Write a frame and flush it so it shows up before the next pause.
pub fn show(out: &mut impl Write, frame: &str) -> io::Result<()> {
    out.write_all(frame.as_bytes())?;
    out.flush()
}

/// The grid followed by the caption of the search that just ran on it.
pub fn summary(grid: &Grid, algorithm: Algorithm, outcome: &SearchOutcome) -> String {
    format!("{}\n{}{}: {}", algorithm, grid, algorithm, caption(outcome))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use solver::{PathReport, Position, SearchSummary};

    use super::*;

    #[test]
    fn test_caption() {
        let found = SearchOutcome::Found(PathReport {
            cells_visited: 9,
            path_length: 5,
            elapsed: Duration::from_millis(1234),
            path: vec![Position::new(1, 1)],
        });
        assert_eq!(
            caption(&found),
            "Time Elapsed: 1.23s | Cells Visited: 9 | Shortest Path: 5 Cells"
        );

        let summary = SearchSummary {
            cells_visited: 4,
            elapsed: Duration::ZERO,
        };
        assert_eq!(
            caption(&SearchOutcome::NotFound(summary)),
            "Unable To Find The Target Node!"
        );
        assert_eq!(caption(&SearchOutcome::Cancelled(summary)), "Cancelled");
    }

    /// Accepts writes but fails to flush.
    struct Unflushable(Vec<u8>);

    impl Write for Unflushable {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_show_reports_flush_errors() {
        let mut ok = Vec::new();
        show(&mut ok, "frame").unwrap();
        assert_eq!(ok, b"frame");

        let mut broken = Unflushable(Vec::new());
        let err = show(&mut broken, "frame").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(broken.0, b"frame");
    }

    #[test]
    fn test_frame() {
        let grid: Grid = "S.\n.G".parse().unwrap();
        let frame = frame(&grid, Algorithm::BreadthFirst, 3);

        assert!(frame.starts_with(CLEAR));
        assert!(frame.ends_with("S.\n.G\n"));
        assert!(frame.contains("(step 3)"));
    }
}

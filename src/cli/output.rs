//! Handles all user-facing output for the CLI.
//!
//! Colored status lines and line diffs for `check`, plain listings for `list`.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::output::{FileStatus, RenderedFile};

/// Prints the status of one destination, with a diff when it is stale.
pub fn print_status(file: &RenderedFile, status: &FileStatus) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let (color, tag) = match status {
        FileStatus::UpToDate => (Color::Green, "ok"),
        FileStatus::Missing => (Color::Red, "missing"),
        FileStatus::Stale { .. } => (Color::Yellow, "stale"),
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{:>8}", tag);
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", file.path.display());

    if let FileStatus::Stale { on_disk } = status {
        let changeset = Changeset::new(on_disk, &file.contents, "\n");
        print_diff(&mut stdout, &changeset.diffs);
        let _ = stdout.reset();
    }
}

/// Prints the one-line summary after `check`.
pub fn print_summary(stale: usize, total: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if stale == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    if stale == 0 {
        let _ = writeln!(stdout, "all {} artifacts up to date", total);
    } else {
        let _ = writeln!(
            stdout,
            "{} of {} artifacts out of date; run `aritygen generate`",
            stale, total
        );
    }
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                for line in x.lines() {
                    let _ = writeln!(stdout, " {}", line);
                }
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "+{}", line);
                }
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "-{}", line);
                }
            }
        }
    }
}

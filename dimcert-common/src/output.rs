//! Unified routines to print data.

use ansi_term::{Colour, Style};
use atty::{self, Stream};
use libc::{self, signal};
use std::{fmt::Display, time::SystemTime};

/// Write the final verdict to stdout.
pub fn print_solution(verdict: &str) {
    write_to_stdout!("s {}\n", verdict);
}

/// Write a key-value pair to stdout.
pub fn print_key_value(key: &str, value: impl Display) {
    requires!(key.len() < 35);
    comment!("{:<35} {:>15}", format!("{}:", key), value);
}

/// We handle SIGPIPE ourselves to avoid printing errors.
pub fn install_signal_handler() {
    assert!(unsafe { signal(libc::SIGPIPE, libc::SIG_DFL) } != libc::SIG_ERR);
}

/// Check whether we are writing to a terminal.
pub fn is_a_tty() -> bool {
    atty::is(Stream::Stdout)
}

/// The style of the "Error: " prefix, plain unless stdout is a terminal.
pub fn error_style() -> Style {
    if is_a_tty() {
        Colour::Red.normal()
    } else {
        Style::default()
    }
}

/// A RAII object that prints a timing message when it is destroyed.
pub struct Timer {
    /// The name of the thing that is being timed
    name: &'static str,
    /// The start time, set at construction time
    start: SystemTime,
    /// Whether this timer should be silenced
    pub disabled: bool,
}

impl Timer {
    /// Create a timer that only reports when `verbose` is set.
    pub fn verbose(name: &'static str, verbose: bool) -> Timer {
        Timer {
            name,
            start: SystemTime::now(),
            disabled: !verbose,
        }
    }
}

#[cfg(test)]
thread_local! {
    /// The number of timing reports printed by this thread.
    static REPORTS: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

impl Drop for Timer {
    /// Write the elapsed time as comment.
    fn drop(&mut self) {
        if self.disabled {
            return;
        }
        let elapsed_time = match self.start.elapsed() {
            Ok(elapsed_time) => elapsed_time,
            Err(_) => return,
        };
        #[cfg(test)]
        REPORTS.with(|reports| reports.set(reports.get() + 1));
        print_key_value(
            &format!("{} (s)", self.name),
            format!(
                "{}.{:03}",
                elapsed_time.as_secs(),
                elapsed_time.subsec_millis()
            ),
        );
    }
}

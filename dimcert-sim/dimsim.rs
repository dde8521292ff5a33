//! Simulate a counterexample trace on a model
//!
//! The exit code tells the verdict: 0 if the trace reaches the goal, 1 if it
//! is empty, 2 if it does not start in an initial state, 3 if it violates a
//! constraint of the model, and 4 if it never reaches the goal.

use clap::{Arg, ArgMatches};
use dimcert_common::{
    comment, config, die,
    error::Result,
    log,
    output::{install_signal_handler, print_key_value, print_solution, Timer},
    parser::{parse_system_file, parse_trace_file, Format},
    trace::{check_trace, TraceVerdict},
};

/// Run `dimsim`.
fn main() {
    std::process::exit(run_frontend());
}

/// Run `dimsim`, returning its exit code.
///
/// This is a separate function because `std::process::exit` does not
/// call destructors.
fn run_frontend() -> i32 {
    install_signal_handler();
    let mut app = clap::App::new("dimsim")
        .version(concat!(
            env!("CARGO_PKG_VERSION"),
            " (git commit ",
            env!("GIT_COMMIT"),
            ")"
        ))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .after_help(
            "Exit codes: 0 goal reached, 1 empty trace, 2 initial state violated,
3 constraint violated, 4 goal not reached.
Input files may be compressed - supported file extensions are: zst, gz, bz2, xz and lz4.",
        )
        .arg(
            Arg::with_name("MODEL")
                .required(true)
                .help("model in Dimspec or CIP format"),
        )
        .arg(
            Arg::with_name("TRACE")
                .required(true)
                .help("trace, v<k> lines for Dimspec, <k> = <values> lines for CIP"),
        )
        .arg(
            Arg::with_name("FORMAT")
                .takes_value(true)
                .long("format")
                .possible_values(&Format::NAMES)
                .help("Input format (default: by the model's file extension)"),
        );
    if config::ENABLE_LOGGING {
        app = app.arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Set the verbosity level"),
        );
    }

    let flags = Flags::new(app.get_matches());
    match run(&flags) {
        Ok(verdict) => {
            comment!("{}", verdict);
            print_solution(match verdict {
                TraceVerdict::GoalReached(_) => "GOAL REACHED",
                _ => "GOAL NOT REACHED",
            });
            verdict.exit_code()
        }
        Err(err) => die!("{}", err),
    }
}

/// Parsed arguments. See `dimsim --help`.
#[derive(Debug)]
pub struct Flags {
    pub model_filename: String,
    pub trace_filename: String,
    /// The format of both model and trace
    pub format: Format,
    pub verbosity: u64,
}

impl Flags {
    /// Create a flags instance from commandline arguments.
    pub fn new(matches: ArgMatches) -> Flags {
        let model_filename = matches.value_of("MODEL").unwrap_or_default().to_string();
        let format = match matches.value_of("FORMAT") {
            Some(name) => {
                Format::from_name(name).unwrap_or_else(|| die!("unknown format: {}", name))
            }
            None => Format::by_extension(&model_filename),
        };
        Flags {
            model_filename,
            trace_filename: matches.value_of("TRACE").unwrap_or_default().to_string(),
            format,
            verbosity: matches.occurrences_of("v"),
        }
    }
}

/// Parse model and trace and simulate the trace.
fn run(flags: &Flags) -> Result<TraceVerdict> {
    log!(flags, 1, "dimsim version: {}", env!("GIT_COMMIT"));
    let _timer = Timer::verbose("total time", flags.verbosity > 0);
    let model = parse_system_file(&flags.model_filename, flags.format)?;
    let size = model
        .size()
        .map_err(|err| err.context(&flags.model_filename))?;
    let trace = parse_trace_file(&flags.trace_filename, flags.format)?;
    if flags.verbosity > 0 {
        print_key_value("model variables", size);
        print_key_value("timeframes", trace.len());
    }
    Ok(check_trace(&model, &trace))
}

//! Emit QBF certification queries for model checking witnesses

use clap::{Arg, ArgMatches};
use dimcert_common::{
    certify::{build_query, write_query, Query},
    comment, config, die,
    error::Result,
    log,
    output::{install_signal_handler, print_key_value, Timer},
    parser::{apply_mapping, parse_mapping_file, parse_system_file, Format},
    reindex::index_consecutively,
};

/// Run `dimcert`.
fn main() {
    std::process::exit(run_frontend());
}

/// Run `dimcert`, returning its exit code.
///
/// This is a separate function because `std::process::exit` does not
/// call destructors.
fn run_frontend() -> i32 {
    install_signal_handler();
    let mut app = clap::App::new("dimcert")
        .version(concat!(
            env!("CARGO_PKG_VERSION"),
            " (git commit ",
            env!("GIT_COMMIT"),
            ")"
        ))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .after_help(
            "Each query is unsatisfiable if and only if its check passes.
Input files may be compressed - supported file extensions are: zst, gz, bz2, xz and lz4.
Use \"-\" for an output file to write it to standard output.",
        )
        .arg(
            Arg::with_name("MODEL")
                .required(true)
                .help("model in Dimspec or CIP format"),
        )
        .arg(
            Arg::with_name("WITNESS")
                .required(true)
                .help("witness in Dimspec or CIP format"),
        );
    for query in Query::ALL.iter() {
        app = app.arg(
            Arg::with_name(query.name())
                .default_value(query.default_filename())
                .help(match query {
                    Query::Reset => "output file of the reset query",
                    Query::Transition => "output file of the transition query",
                    Query::Property => "output file of the property query",
                    Query::Base => "output file of the base query",
                    Query::Step => "output file of the step query",
                }),
        );
    }
    app = app
        .arg(
            Arg::with_name("MAPPING_FILE")
                .takes_value(true)
                .short("m")
                .long("mapping")
                .help("Read the state correspondence from this TOML file instead of the witness."),
        )
        .arg(
            Arg::with_name("FORMAT")
                .takes_value(true)
                .long("format")
                .possible_values(&Format::NAMES)
                .help("Input format (default: by file extension, .cip for CIP, otherwise Dimspec)"),
        );
    if config::ENABLE_LOGGING {
        app = app.arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Set the verbosity level (use up to two times)"),
        );
    }

    let flags = Flags::new(app.get_matches());
    match run(&flags) {
        Ok(()) => 0,
        Err(err) => die!("{}", err),
    }
}

/// Parsed arguments. See `dimcert --help`.
#[derive(Debug)]
pub struct Flags {
    pub model_filename: String,
    pub witness_filename: String,
    /// One per query, in the order of `Query::ALL`
    pub output_filenames: Vec<String>,
    /// Present when the correspondence is read from a separate file
    pub mapping_filename: Option<String>,
    /// Present when the input format is given explicitly
    pub format: Option<Format>,
    pub verbosity: u64,
}

impl Flags {
    /// Create a flags instance from commandline arguments.
    pub fn new(matches: ArgMatches) -> Flags {
        let filename = |name| matches.value_of(name).unwrap_or_default().to_string();
        Flags {
            model_filename: filename("MODEL"),
            witness_filename: filename("WITNESS"),
            output_filenames: Query::ALL.iter().map(|query| filename(query.name())).collect(),
            mapping_filename: matches.value_of("MAPPING_FILE").map(String::from),
            format: matches.value_of("FORMAT").map(|name| {
                Format::from_name(name).unwrap_or_else(|| die!("unknown format: {}", name))
            }),
            verbosity: matches.occurrences_of("v"),
        }
    }
    fn verbose(&self) -> bool {
        self.verbosity > 0
    }
    /// The format of an input file.
    fn format_of(&self, filename: &str) -> Format {
        self.format.unwrap_or_else(|| Format::by_extension(filename))
    }
}

/// Parse model and witness and write the five queries.
fn run(flags: &Flags) -> Result<()> {
    log!(flags, 1, "dimcert version: {}", env!("GIT_COMMIT"));
    let timer = Timer::verbose("total time", flags.verbose());
    let mut model = {
        let _timer = Timer::verbose("parse model", flags.verbose());
        parse_system_file(&flags.model_filename, flags.format_of(&flags.model_filename))?
    };
    let mut witness = {
        let _timer = Timer::verbose("parse witness", flags.verbose());
        parse_system_file(
            &flags.witness_filename,
            flags.format_of(&flags.witness_filename),
        )?
    };
    if let Some(mapping_filename) = &flags.mapping_filename {
        apply_mapping(&mut witness, parse_mapping_file(mapping_filename)?);
    }
    if flags.verbose() {
        print_key_value("model variables", model.initial.variables);
        print_key_value("witness variables", witness.initial.variables);
    }
    let space = index_consecutively(&mut witness, &mut model)?;
    if space.positional_default {
        log!(flags, 1, "no state correspondence given, pairing variables by position");
    }
    if flags.verbose() {
        print_key_value("shared variables", space.size);
        print_key_value("corresponding variables", space.shared_current().len());
    }
    for (&query, filename) in Query::ALL.iter().zip(flags.output_filenames.iter()) {
        let _timer = Timer::verbose(query.name(), flags.verbose());
        let circuit = build_query(query, &witness, &model, &space);
        log!(
            flags,
            2,
            "{} query: {} variables, {} gates",
            query,
            circuit.number_of_variables(),
            circuit.number_of_gates()
        );
        write_query(&circuit, filename).map_err(|err| err.context(query.name()))?;
    }
    drop(timer);
    if flags.verbose() {
        comment!("wrote {}", flags.output_filenames.join(" "));
    }
    Ok(())
}

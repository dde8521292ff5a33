//! Reading and writing files

use crate::{
    cip::parse_cip,
    dimspec::parse_dimspec,
    error::{Error, Result},
    input::Input,
    system::{Correspondence, TransitionSystem},
    trace::{parse_cip_trace, parse_dimspec_trace, Trace},
};
use serde_derive::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
};

/// The syntax of transition systems and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Dimspec,
    Cip,
}

impl Format {
    /// The names accepted on the command line.
    pub const NAMES: [&'static str; 2] = ["dimspec", "cip"];

    pub fn from_name(name: &str) -> Option<Format> {
        match name {
            "dimspec" => Some(Format::Dimspec),
            "cip" => Some(Format::Cip),
            _ => None,
        }
    }
    /// Determine the format based on the filename, defaulting to Dimspec.
    pub fn by_extension(filename: &str) -> Format {
        let (basename, _compression_format) = compression_format_by_extension(filename);
        if basename.ends_with(".cip") {
            Format::Cip
        } else {
            Format::Dimspec
        }
    }
}

/// A correspondence file, replacing the pairs declared in the witness.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Mapping {
    #[serde(default)]
    pub pair: Vec<Correspondence>,
}

/// Open a file for reading.
pub fn open_file(filename: &str) -> Result<File> {
    File::open(filename).map_err(|err| Error::from(err).context(filename))
}

/// Open a file for writing, or stdout if the filename is "-".
pub fn open_file_for_writing(filename: &str) -> Result<Box<dyn Write>> {
    Ok(match filename {
        "-" => Box::new(BufWriter::new(io::stdout())),
        filename => Box::new(BufWriter::new(
            File::create(filename).map_err(|err| Error::from(err).context(filename))?,
        )),
    })
}

/// File extension of Zstandard archives.
const ZSTD: &str = ".zst";
/// File extension of Gzip archives.
const GZIP: &str = ".gz";
/// File extension of Bzip2 archives.
const BZIP2: &str = ".bz2";
/// File extension of XZ archives.
const XZ: &str = ".xz";
/// File extension of LZ4 archives.
const LZ4: &str = ".lz4";

/// Strip the compression format off a filename.
///
/// If the filename ends with a known archive extension,
/// return the filename without extension and the extension.
/// Otherwise return the unmodified filename and the empty string.
fn compression_format_by_extension(filename: &str) -> (&str, &str) {
    for extension in &[ZSTD, GZIP, BZIP2, LZ4, XZ] {
        if filename.ends_with(extension) {
            return (&filename[0..filename.len() - extension.len()], extension);
        }
    }
    (filename, "")
}

/// Read a whole, possibly compressed, file.
///
/// If the file is compressed it is transparently uncompressed.
/// If the filename is "-", reads from stdin.
pub fn read_compressed_file_or_stdin(filename: &str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match filename {
        "-" => {
            io::stdin().read_to_end(&mut buffer)?;
        }
        filename => {
            let file = open_file(filename)?;
            decompressor(file, filename)?
                .read_to_end(&mut buffer)
                .map_err(|err| Error::from(err).context(filename))?;
        }
    }
    Ok(buffer)
}

/// Wrap a file in the decoder for its compression format.
fn decompressor(file: File, filename: &str) -> Result<Box<dyn Read>> {
    let (_basename, compression_format) = compression_format_by_extension(filename);
    let failed = |err: io::Error| Error::from(err).context(filename);
    Ok(match compression_format {
        ZSTD => Box::new(zstd::stream::read::Decoder::new(file).map_err(failed)?),
        GZIP => Box::new(flate2::read::GzDecoder::new(file)),
        BZIP2 => Box::new(bzip2::read::BzDecoder::new(file)),
        XZ => Box::new(xz2::read::XzDecoder::new(file)),
        LZ4 => Box::new(lz4::Decoder::new(file).map_err(failed)?),
        _ => Box::new(BufReader::new(file)),
    })
}

/// Parse a model or witness from a file.
pub fn parse_system_file(filename: &str, format: Format) -> Result<TransitionSystem> {
    let buffer = read_compressed_file_or_stdin(filename)?;
    parse_system(&buffer, format).map_err(|err| err.context(filename))
}

/// Parse a model or witness from memory.
pub fn parse_system(buffer: &[u8], format: Format) -> Result<TransitionSystem> {
    let mut input = Input::from_bytes(buffer);
    let system = match format {
        Format::Dimspec => parse_dimspec(&mut input),
        Format::Cip => parse_cip(&mut input),
    }?;
    Ok(system)
}

/// Parse a counterexample trace from a file.
pub fn parse_trace_file(filename: &str, format: Format) -> Result<Trace> {
    let buffer = read_compressed_file_or_stdin(filename)?;
    let mut input = Input::from_bytes(&buffer);
    let trace = match format {
        Format::Dimspec => parse_dimspec_trace(&mut input),
        Format::Cip => parse_cip_trace(&mut input),
    };
    trace.map_err(|err| Error::from(err).context(filename))
}

/// Parse a TOML correspondence file.
pub fn parse_mapping_file(filename: &str) -> Result<Vec<Correspondence>> {
    let buffer = read_compressed_file_or_stdin(filename)?;
    parse_mapping(&buffer).map_err(|err| err.context(filename))
}

/// Replace the correspondence declared in the witness by the pairs of a
/// mapping file.
pub fn apply_mapping(witness: &mut TransitionSystem, pairs: Vec<Correspondence>) {
    witness.simulation = pairs;
}

pub fn parse_mapping(buffer: &[u8]) -> Result<Vec<Correspondence>> {
    let text = std::str::from_utf8(buffer)
        .map_err(|_| Error::Malformed(Input::UTF8.to_string()))?;
    let mapping: Mapping =
        toml::from_str(text).map_err(|err| Error::Malformed(format!("{}", err)))?;
    Ok(mapping.pair)
}

//! Errors that abort certification

use std::{error, fmt, io};

/// Everything that can go wrong between reading the input and writing the queries.
///
/// None of these are recoverable: each is a deterministic function of the
/// input, so the front ends report the error and exit.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    Io(io::Error),
    /// The input does not follow its format, including literals beyond the
    /// declared variable count.
    Malformed(String),
    /// Declared variable counts disagree with each other or with the clauses.
    SizeMismatch(String),
    /// The state correspondence is not a partial bijection between witness
    /// and model variables.
    MappingConflict(String),
}

impl Error {
    /// Prefix the message with the file or system it is about.
    pub fn context(self, what: &str) -> Error {
        match self {
            Error::Io(err) => Error::Io(io::Error::new(
                err.kind(),
                format!("{}: {}", what, err),
            )),
            Error::Malformed(why) => Error::Malformed(format!("{}: {}", what, why)),
            Error::SizeMismatch(why) => Error::SizeMismatch(format!("{}: {}", what, why)),
            Error::MappingConflict(why) => {
                Error::MappingConflict(format!("{}: {}", what, why))
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::Malformed(why) => write!(f, "malformed input: {}", why),
            Error::SizeMismatch(why) => write!(f, "size mismatch: {}", why),
            Error::MappingConflict(why) => write!(f, "mapping conflict: {}", why),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Parse errors carry `InvalidData` and become `Malformed`.
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::InvalidData {
            Error::Malformed(format!("{}", err))
        } else {
            Error::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

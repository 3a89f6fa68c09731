use thiserror::Error;

/// Errors that may appear while reading structural data files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Can't parse an ATOM line: {line}")]
    InvalidAtomLine { line: String },

    #[error("No atoms found in: {fname}")]
    NoAtomsFound { fname: String },

    #[error("Can't parse a line of an SS2 file: {line}")]
    InvalidSs2Line { line: String },

    #[error("SS2 file provides no secondary structure data: {fname}")]
    EmptySs2File { fname: String },

    #[error("I/O error while reading structural data")]
    Io(#[from] std::io::Error),
}

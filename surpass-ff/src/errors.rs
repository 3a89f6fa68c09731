use thiserror::Error;

/// Errors in the weighted score configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed score config line (expected: <TermName> <weight> [args...]): {line}")]
    MalformedScoreLine { line: String },

    #[error("Unknown energy term name: {name}")]
    UnknownTermName { name: String },

    #[error("Energy term {term} requires an argument: {what}")]
    MissingArgument { term: String, what: String },

    #[error("Energy term {term} can't parse its argument: {value}")]
    MalformedArgument { term: String, value: String },
}

/// Errors in the knowledge-based parameter data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("SURPASS parameter file is missing: {path}")]
    ParameterFileMissing { path: String },

    #[error("Can't find the distribution {key}; known distributions: {known}")]
    MissingDistribution { key: String, known: String },

    #[error("Malformed parameter file {path}: {detail}")]
    MalformedTable { path: String, detail: String },

    #[error("I/O error while reading parameter data")]
    Io(#[from] std::io::Error),
}

/// Errors raised while assembling the energy function.
#[derive(Debug, Error)]
pub enum EnergySetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}

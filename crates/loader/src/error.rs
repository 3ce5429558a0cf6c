use thiserror::Error;

/// Errors raised while resolving or loading a module.
///
/// Every variant is fatal to the branch of the module graph being built;
/// nothing here is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requester holds no grant for the specifier.
    #[error("not allowed to load module {specifier} from {resource}")]
    PolicyDenied { specifier: String, resource: String },

    /// A locator was looked up before anything resolved to it.
    #[error("module {0} was never resolved")]
    UnresolvedModule(String),

    /// A synthetic locator is missing one of its parameters.
    #[error("no {parameter} provided in synthetic locator {locator}")]
    MissingParameter {
        locator: String,
        parameter: &'static str,
    },

    /// A name that cannot be emitted as a binding in generated source.
    #[error("invalid binding name: {0:?}")]
    InvalidSymbol(String),

    /// The host returned no source for a module that must be rewritten.
    #[error("no source returned for {0}")]
    MissingSource(String),

    #[error("config error: {0}")]
    Config(String),

    /// Failure reported by the host's own resolve or load step.
    #[error("host error: {0}")]
    Host(String),

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

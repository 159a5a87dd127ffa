use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by grainflow.
///
/// Errors are only ever reported on the control side: when validating configs or grain
/// parameters. The audio rendering path never fails: full pools and queues hand values back via
/// `Err(value)` and exhausted source material terminates grains early.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    ParameterError(String),
    ConfigError(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterError(str) => write!(f, "Invalid grain parameter: {str}"),
            Self::ConfigError(str) => write!(f, "Invalid config: {str}"),
        }
    }
}

use std::error;
use std::fmt;

#[derive(Debug)]

/**
 * Error to represent invalid run configuration, a failure to read a
 * configuration file, or a failure to write simulation output.
 */
pub enum Error {
    InvalidGeometry(String),
    InvalidParameter(&'static str, f64),
    InvalidRelaxation(f64),
    Load(String),
    Snapshot(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            InvalidGeometry(what) => write!(fmt, "invalid geometry: {}", what),
            InvalidParameter(name, value) => write!(fmt, "invalid parameter {}: {}", name, value),
            InvalidRelaxation(omega) => write!(fmt, "relaxation factor must lie in (0, 2): {}", omega),
            Load(what) => write!(fmt, "failed to load configuration: {}", what),
            Snapshot(what) => write!(fmt, "failed to write snapshot: {}", what),
        }
    }
}

impl error::Error for Error {}

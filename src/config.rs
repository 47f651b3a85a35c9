//! Startup configuration.
//!
//! Both binaries take a single optional positional argument: the address to
//! listen on (server) or connect to (client). There are no flags, environment
//! variables or config files.

use crate::DEFAULT_ADDR;

/// Address configuration shared by the server and the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `host:port` to bind to or connect to
    pub addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process arguments.
    pub fn from_args() -> Self {
        Self::from_arg(std::env::args().nth(1))
    }

    /// Builds the configuration from the first positional argument.
    ///
    /// A missing or empty argument selects [`DEFAULT_ADDR`]. Anything after
    /// the first argument is ignored.
    pub fn from_arg(arg: Option<String>) -> Self {
        match arg {
            Some(addr) if !addr.is_empty() => Self { addr },
            _ => Self::default(),
        }
    }

    /// Returns the address as a string slice.
    pub fn address(&self) -> &str {
        &self.addr
    }
}

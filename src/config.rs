//! Adapter configuration
//!
//! Holds the switches read once when a connection is established: which
//! adapter flavour to present, which host framework version the save hooks
//! are wired for, and how LOB content is chunked on write.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default chunk size for LOB writes, the largest single PL/SQL RAW buffer
pub const DEFAULT_LOB_WRITE_CHUNK_SIZE: usize = 32767;

/// Version of the host persistence framework the hooks are wired into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
}

impl HostVersion {
    /// Create a host version
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for HostVersion {
    fn default() -> Self {
        Self::new(3, 0)
    }
}

impl FromStr for HostVersion {
    type Err = Error;

    /// Parse `MAJOR.MINOR[.PATCH...]`; anything after the minor version is
    /// ignored
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u16> {
            parts
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(|| Error::InvalidHostVersion(s.to_string()))
        };
        let major = next()?;
        let minor = next()?;
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Configuration for an Oracle enhanced adapter.
///
/// # Examples
///
/// ```rust
/// use oracle_enhanced::{AdapterConfig, HostVersion};
///
/// let config = AdapterConfig::new()
///     .host_version("3.1.12".parse()?)
///     .lob_write_chunk_size(8192);
///
/// assert!(!config.emulate_oracle_adapter);
/// assert_eq!(config.host_version, HostVersion::new(3, 1));
/// # Ok::<(), oracle_enhanced::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Present the adapter as the plain Oracle emulation adapter
    pub emulate_oracle_adapter: bool,
    /// Host framework version used to pick the save hook pair
    pub host_version: HostVersion,
    /// Maximum number of bytes sent per LOB write call
    pub lob_write_chunk_size: usize,
}

impl AdapterConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            emulate_oracle_adapter: false,
            host_version: HostVersion::default(),
            lob_write_chunk_size: DEFAULT_LOB_WRITE_CHUNK_SIZE,
        }
    }

    /// Set emulation mode
    pub fn emulate_oracle_adapter(mut self, enabled: bool) -> Self {
        self.emulate_oracle_adapter = enabled;
        self
    }

    /// Set the host framework version
    pub fn host_version(mut self, version: HostVersion) -> Self {
        self.host_version = version;
        self
    }

    /// Set the LOB write chunk size
    pub fn lob_write_chunk_size(mut self, size: usize) -> Self {
        self.lob_write_chunk_size = size;
        self
    }

    /// Check the configuration before a connection is built
    pub fn validate(&self) -> Result<()> {
        if self.lob_write_chunk_size == 0 {
            return Err(Error::Configuration(
                "lob_write_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::new()
    }
}

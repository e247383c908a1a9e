use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// Usable bytes in the store when nothing else is configured
pub const DEFAULT_CAPACITY: usize = 1024;

/// Upper bound for a configured capacity
pub const MAX_CAPACITY: usize = 64 * 1024;

/// Max length for device and class names, in bytes
pub const MAX_NAME_LEN: usize = 32;

const DEFAULT_NAME: &str = "lkmasg1";
const DEFAULT_CLASS: &str = "char";

const_assert!(DEFAULT_CAPACITY > 0);
const_assert!(DEFAULT_CAPACITY <= MAX_CAPACITY);
const_assert!(DEFAULT_NAME.len() <= MAX_NAME_LEN);
const_assert!(DEFAULT_CLASS.len() <= MAX_NAME_LEN);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Blob is not a valid pinecone-encoded config
    Decode,
    /// Device or class name is empty
    EmptyName,
    /// Device or class name exceeds `MAX_NAME_LEN`
    NameTooLong,
    /// Store must hold at least one byte
    ZeroCapacity,
    /// Capacity exceeds `MAX_CAPACITY`
    CapacityTooLarge,
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "malformed config blob"),
            Self::EmptyName => write!(f, "empty name"),
            Self::NameTooLong => write!(f, "name longer than {} bytes", MAX_NAME_LEN),
            Self::ZeroCapacity => write!(f, "zero capacity"),
            Self::CapacityTooLarge => write!(f, "capacity above {} bytes", MAX_CAPACITY),
        }
    }
}

/// Settings for one FIFO device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device node name, i.e. `/dev/<name>`
    pub name: String,
    /// Device class the node is created in
    pub class: String,
    /// Usable bytes in the store, excluding the terminator slot
    pub capacity: usize,
}
impl DeviceConfig {
    pub fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            ..Self::default()
        }
    }

    /// Decodes a pinecone blob and validates the result
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = pinecone::from_bytes(bytes).map_err(|err| {
            log::warn!("config decode failed: {:?}", err);
            ConfigError::Decode
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        pinecone::to_vec(self).expect("Could not serialize device config")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_name(&self.name)?;
        validate_name(&self.class)?;
        if self.capacity == 0 {
            Err(ConfigError::ZeroCapacity)
        } else if self.capacity > MAX_CAPACITY {
            Err(ConfigError::CapacityTooLarge)
        } else {
            Ok(())
        }
    }
}
impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            class: DEFAULT_CLASS.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        Err(ConfigError::EmptyName)
    } else if name.len() > MAX_NAME_LEN {
        Err(ConfigError::NameTooLong)
    } else {
        Ok(())
    }
}

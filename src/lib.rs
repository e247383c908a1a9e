//! Single-buffer FIFO character device.
//!
//! Bytes written to the device are appended to one bounded store,
//! and reads consume a prefix of it. Writes that do not fit are
//! truncated silently: the returned count is the only signal, so
//! callers must always compare it against what they asked for.

// Safety
#![deny(overflowing_literals)]
#![deny(unused_must_use)]
// Disable some clippy lints
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::new_without_default)]
// No-std when not running tests
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate alloc;

mod chrdev;
mod config;
mod device;
mod endpoint;
mod file_ops;
mod module;
mod result;
mod store;
mod user;

pub use self::chrdev::{ClassId, DeviceNumber, DeviceTable, MajorNumber, Registrar, RegistryError};
pub use self::config::{ConfigError, DeviceConfig, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use self::device::FifoDevice;
pub use self::endpoint::ChannelEndpoint;
pub use self::file_ops::{FileClientId, FileOps};
pub use self::module::{FifoModule, ModuleError};
pub use self::result::{IoError, IoResult};
pub use self::store::ByteStore;
pub use self::user::{UserSink, UserSource};

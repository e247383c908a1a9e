use core::fmt;

pub type IoResult<T> = Result<T, IoError>;

/// Errors a device file operation can fail with.
///
/// Short reads and truncated writes are not errors,
/// they are reported through the returned byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum IoError {
    /// Copying across the user boundary failed.
    /// The device state is left untouched.
    Fault,
    /// No device node with the requested name
    NotFound,
    /// The file does not implement the operation
    Unsupported,
}
impl IoError {
    /// Positive errno value, as used by the kernel ABI
    pub const fn errno(self) -> i32 {
        match self {
            Self::Fault => 14,       // EFAULT
            Self::NotFound => 19,    // ENODEV
            Self::Unsupported => 22, // EINVAL
        }
    }
}
impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fault => write!(f, "bad address"),
            Self::NotFound => write!(f, "no such device"),
            Self::Unsupported => write!(f, "invalid argument"),
        }
    }
}

use core::fmt;

use super::result::{IoError, IoResult};
use super::user::{UserSink, UserSource};

/// Identifies one opened instance of a device file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FileClientId(u64);
impl FileClientId {
    pub(crate) const fn first() -> Self {
        Self(0)
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}
impl fmt::Display for FileClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fc{}", self.0)
    }
}

/// Operations on a device file, from the perspective of the driver.
///
/// Called concurrently from any number of clients, so implementations
/// must synchronize their own state.
#[allow(unused_variables)]
pub trait FileOps: Send + Sync {
    /// Copy up to `len` bytes into `buf`, returning how many bytes were read.
    /// Fewer than `len` bytes is not an error.
    fn read(&self, fc: FileClientId, buf: &mut dyn UserSink, len: usize) -> IoResult<usize>;

    /// Take up to `len` bytes from `buf`, returning how many bytes were written.
    /// Fewer than `len` bytes is not an error.
    ///
    /// If not implemented, causes `Unsupported` error.
    fn write(&self, fc: FileClientId, buf: &dyn UserSource, len: usize) -> IoResult<usize> {
        Err(IoError::Unsupported)
    }

    /// Allows device to perform some initialization when a new fc is opened.
    ///
    /// If not implemented, does nothing.
    fn open(&self, fc: FileClientId) -> IoResult<()> {
        Ok(())
    }

    /// Allows releasing resources when a fc is closed.
    /// This function must not fail.
    ///
    /// If not implemented, does nothing.
    fn close(&self, fc: FileClientId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `/dev/null`
    struct NullDevice;
    impl FileOps for NullDevice {
        fn read(&self, _fc: FileClientId, _buf: &mut dyn UserSink, _len: usize) -> IoResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_default_ops() {
        let fc = FileClientId::first();
        let dev = NullDevice;
        assert_eq!(dev.open(fc), Ok(()));
        assert_eq!(dev.write(fc, b"abc", 3), Err(IoError::Unsupported));
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(dev.read(fc, &mut out, 3), Ok(0));
        dev.close(fc);
    }

    #[test]
    fn test_client_ids() {
        let a = FileClientId::first();
        let b = a.next();
        assert_ne!(a, b);
        assert_eq!(b.as_u64(), 1);
        assert_eq!(format!("{}", b), "fc1");
    }
}

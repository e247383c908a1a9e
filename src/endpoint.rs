use alloc::sync::Arc;
use core::fmt;

use super::file_ops::{FileClientId, FileOps};
use super::result::IoResult;
use super::user::{UserSink, UserSource};

/// An opened device file, as seen by one client.
///
/// Follows the kernel calling convention: `read` and `write` return the
/// number of bytes transferred, or a negated errno on failure. That count
/// can be smaller than requested without being an error.
/// The file offset is accepted but ignored, the device is a stream.
pub struct ChannelEndpoint {
    fc: FileClientId,
    file: Arc<dyn FileOps>,
}
impl ChannelEndpoint {
    /// Opens `file` for the client `fc`
    pub fn open(file: Arc<dyn FileOps>, fc: FileClientId) -> IoResult<Self> {
        file.open(fc)?;
        Ok(Self { fc, file })
    }

    pub fn client(&self) -> FileClientId {
        self.fc
    }

    /// Reads up to `len` bytes into `buf`
    pub fn read(&self, buf: &mut dyn UserSink, len: usize, _offset: u64) -> isize {
        to_ssize(self.file.read(self.fc, buf, len))
    }

    /// Writes up to `len` bytes from `buf`
    pub fn write(&self, buf: &dyn UserSource, len: usize, _offset: u64) -> isize {
        to_ssize(self.file.write(self.fc, buf, len))
    }

    pub fn close(self) {
        self.file.close(self.fc);
    }
}
impl fmt::Debug for ChannelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelEndpoint").field("fc", &self.fc).finish()
    }
}

/// Byte counts never exceed the store capacity, so they always fit
fn to_ssize(result: IoResult<usize>) -> isize {
    match result {
        Ok(count) => count as isize,
        Err(error) => -(error.errno() as isize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::FifoDevice;
    use crate::result::IoError;

    struct Unwritable;
    impl UserSink for Unwritable {
        fn copy_to_user(&mut self, _src: &[u8]) -> IoResult<()> {
            Err(IoError::Fault)
        }
    }

    struct ReadOnly;
    impl FileOps for ReadOnly {
        fn read(&self, _fc: FileClientId, _buf: &mut dyn UserSink, _len: usize) -> IoResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_counts_and_offset() {
        let dev = Arc::new(FifoDevice::with_capacity("fifo", 10));
        let ep = ChannelEndpoint::open(dev.clone(), FileClientId::first()).unwrap();
        assert_eq!(dev.open_count(), 1);

        assert_eq!(ep.write(b"HelloWorld!", 11, 0), 10);
        let mut out = [0u8; 5];
        // Offset has no effect
        assert_eq!(ep.read(&mut out, 5, 1234), 5);
        assert_eq!(&out, b"Hello");
        assert_eq!(ep.write(b"!!", 2, 99), 2);

        let mut rest: Vec<u8> = Vec::new();
        assert_eq!(ep.read(&mut rest, 100, 0), 7);
        assert_eq!(rest, b"World!!");
        assert_eq!(ep.read(&mut rest, 100, 0), 0);
        ep.close();
    }

    #[test]
    fn test_negative_errno() {
        let dev = Arc::new(FifoDevice::with_capacity("fifo", 10));
        let ep = ChannelEndpoint::open(dev.clone(), FileClientId::first()).unwrap();
        ep.write(b"abc", 3, 0);
        assert_eq!(ep.read(&mut Unwritable, 3, 0), -14);
        assert_eq!(dev.contents(), b"abc");

        let ro = ChannelEndpoint::open(Arc::new(ReadOnly), FileClientId::first()).unwrap();
        assert_eq!(ro.write(b"abc", 3, 0), -22);
    }
}

use alloc::boxed::Box;
use core::fmt;

use super::result::IoResult;
use super::user::{UserSink, UserSource};

/// Terminator kept right after the valid region
const TERMINATOR: u8 = 0;

/// Bounded prefix buffer holding not-yet-consumed bytes.
///
/// Writes append to the end and reads consume from the front,
/// after which the remaining bytes are shifted back to offset zero.
/// The backing storage is allocated once, with one extra slot
/// for the terminator, and never grows.
///
/// No locking is done here, see `FifoDevice` for that.
pub struct ByteStore {
    /// Always `capacity + 1` bytes
    buffer: Box<[u8]>,
    /// Bytes `[0, len)` are valid, and `buffer[len]` is the terminator
    len: usize,
}
impl ByteStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![TERMINATOR; capacity + 1].into_boxed_slice(),
            len: 0,
        }
    }

    /// Maximum number of data bytes, not counting the terminator slot
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Room left before the store is full
    pub fn available(&self) -> usize {
        self.capacity() - self.len
    }

    /// Unconsumed bytes, oldest first
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Appends as much of `data` as fits, returning how many bytes were accepted.
    ///
    /// Input that does not fit is dropped from its tail without any other
    /// indication; callers must check the returned count.
    pub fn append(&mut self, data: &[u8]) -> usize {
        let accepted = data.len().min(self.available());
        let start = self.len;
        self.buffer[start..start + accepted].copy_from_slice(&data[..accepted]);
        self.commit(accepted);
        accepted
    }

    /// Appends up to `requested` bytes copied from a caller-owned source,
    /// returning how many were accepted. Truncates like `append`.
    ///
    /// If the source faults, the store is left as it was.
    pub fn write_from<S: UserSource + ?Sized>(
        &mut self, src: &S, requested: usize,
    ) -> IoResult<usize> {
        let accepted = requested.min(self.available());
        if accepted == 0 {
            return Ok(0);
        }

        let start = self.len;
        if let Err(error) = src.copy_from_user(&mut self.buffer[start..start + accepted]) {
            // The copy may have clobbered the terminator
            self.terminate();
            return Err(error);
        }

        self.commit(accepted);
        Ok(accepted)
    }

    /// Moves up to `requested` bytes from the front of the store into `dst`,
    /// returning how many were served. Never serves more than `len()`.
    ///
    /// If the destination faults, nothing is consumed.
    pub fn read_into<D: UserSink + ?Sized>(
        &mut self, dst: &mut D, requested: usize,
    ) -> IoResult<usize> {
        let served = requested.min(self.len);
        if served == 0 {
            return Ok(0);
        }

        dst.copy_to_user(&self.buffer[..served])?;
        self.compact(served);
        Ok(served)
    }

    fn commit(&mut self, accepted: usize) {
        self.len += accepted;
        self.terminate();
    }

    /// Drops the first `consumed` bytes and shifts the rest to the front
    fn compact(&mut self, consumed: usize) {
        debug_assert!(consumed <= self.len);
        log::trace!("compact: {} consumed, {} kept", consumed, self.len - consumed);
        self.buffer.copy_within(consumed..self.len, 0);
        self.len -= consumed;
        self.terminate();
    }

    fn terminate(&mut self) {
        self.buffer[self.len] = TERMINATOR;
    }
}
impl fmt::Debug for ByteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStore")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish()
    }
}

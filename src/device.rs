use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use super::config::DeviceConfig;
use super::file_ops::{FileClientId, FileOps};
use super::result::IoResult;
use super::store::ByteStore;
use super::user::{UserSink, UserSource};

/// # FIFO device
/// Everything written is appended to a single bounded store,
/// and reading consumes from its front.
///
/// Writes that do not fit are truncated, and reads past the
/// stored data are clamped. Both only report how many bytes
/// were actually transferred, so callers must compare that
/// against the requested length.
#[derive(Debug)]
pub struct FifoDevice {
    /// Device name, used in log messages
    name: String,
    /// All reads and writes go through this lock
    store: Mutex<ByteStore>,
    /// Number of times the device has been opened, diagnostic only
    open_count: AtomicU64,
}
impl FifoDevice {
    pub fn new(config: &DeviceConfig) -> Self {
        Self::with_capacity(&config.name, config.capacity)
    }

    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            store: Mutex::new(ByteStore::with_capacity(capacity)),
            open_count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn open_count(&self) -> u64 {
        self.open_count.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn available(&self) -> usize {
        self.store.lock().available()
    }

    /// Copy of the unconsumed bytes, without consuming them
    pub fn contents(&self) -> Vec<u8> {
        self.store.lock().as_slice().to_vec()
    }
}
impl FileOps for FifoDevice {
    fn open(&self, fc: FileClientId) -> IoResult<()> {
        self.open_count.fetch_add(1, Ordering::Relaxed);
        log::info!("{}: device opened ({})", self.name, fc);
        Ok(())
    }

    fn close(&self, fc: FileClientId) {
        log::info!("{}: device closed ({})", self.name, fc);
    }

    /// Serves up to `len` bytes and removes them from the store
    fn read(&self, fc: FileClientId, buf: &mut dyn UserSink, len: usize) -> IoResult<usize> {
        let mut store = self.store.lock();
        match store.read_into(buf, len) {
            Ok(served) => {
                log::debug!(
                    "{}: sent {} of {} requested bytes to {}, {} left",
                    self.name,
                    served,
                    len,
                    fc,
                    store.len()
                );
                Ok(served)
            },
            Err(error) => {
                log::debug!("{}: failed to send {} bytes to {}", self.name, len, fc);
                Err(error)
            },
        }
    }

    /// Appends up to `len` bytes, silently dropping what does not fit
    fn write(&self, fc: FileClientId, buf: &dyn UserSource, len: usize) -> IoResult<usize> {
        let mut store = self.store.lock();
        let accepted = store.write_from(buf, len)?;
        log::debug!(
            "{}: received {} of {} bytes from {}, {} stored",
            self.name,
            accepted,
            len,
            fc,
            store.len()
        );
        Ok(accepted)
    }
}

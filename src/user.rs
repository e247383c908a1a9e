//! Copying across the user/kernel trust boundary.
//!
//! The actual mechanism belongs to the host kernel; devices only
//! see these two traits. In-memory buffers implement them and
//! fault only when the requested length does not fit.

use alloc::vec::Vec;

use super::result::{IoError, IoResult};

/// Caller-owned destination of a read (`copy_to_user`)
pub trait UserSink {
    /// Copy all of `src` to the destination, or fail without
    /// partial effects visible to the device.
    fn copy_to_user(&mut self, src: &[u8]) -> IoResult<()>;
}

/// Caller-owned source of a write (`copy_from_user`)
pub trait UserSource {
    /// Fill `dst` completely from the start of the source
    fn copy_from_user(&self, dst: &mut [u8]) -> IoResult<()>;
}

impl UserSink for [u8] {
    fn copy_to_user(&mut self, src: &[u8]) -> IoResult<()> {
        let target = self.get_mut(..src.len()).ok_or(IoError::Fault)?;
        target.copy_from_slice(src);
        Ok(())
    }
}

impl UserSink for &mut [u8] {
    fn copy_to_user(&mut self, src: &[u8]) -> IoResult<()> {
        (**self).copy_to_user(src)
    }
}

impl<const N: usize> UserSink for [u8; N] {
    fn copy_to_user(&mut self, src: &[u8]) -> IoResult<()> {
        self[..].copy_to_user(src)
    }
}

/// Growable sink, never faults
impl UserSink for Vec<u8> {
    fn copy_to_user(&mut self, src: &[u8]) -> IoResult<()> {
        self.extend_from_slice(src);
        Ok(())
    }
}

impl UserSource for [u8] {
    fn copy_from_user(&self, dst: &mut [u8]) -> IoResult<()> {
        let source = self.get(..dst.len()).ok_or(IoError::Fault)?;
        dst.copy_from_slice(source);
        Ok(())
    }
}

impl UserSource for &[u8] {
    fn copy_from_user(&self, dst: &mut [u8]) -> IoResult<()> {
        (**self).copy_from_user(dst)
    }
}

impl<const N: usize> UserSource for [u8; N] {
    fn copy_from_user(&self, dst: &mut [u8]) -> IoResult<()> {
        self[..].copy_from_user(dst)
    }
}

impl UserSource for Vec<u8> {
    fn copy_from_user(&self, dst: &mut [u8]) -> IoResult<()> {
        self[..].copy_from_user(dst)
    }
}

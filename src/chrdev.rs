//! Character device registration.
//!
//! Mirrors what a kernel offers to a char driver: a major number for the
//! driver itself, a device class, and device nodes inside that class.
//! `DeviceTable` keeps all of this in memory and resolves opens by node name.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;
use hashbrown::HashMap;

use super::endpoint::ChannelEndpoint;
use super::file_ops::{FileClientId, FileOps};
use super::result::{IoError, IoResult};

/// Dynamic majors are allocated downwards from here
const DYNAMIC_MAJOR_FIRST: u32 = 254;
/// Lowest dynamic major
const DYNAMIC_MAJOR_LAST: u32 = 234;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MajorNumber(u32);
impl MajorNumber {
    pub const fn new(major: u32) -> Self {
        Self(major)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}
impl fmt::Display for MajorNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Major/minor pair, i.e. `MKDEV(major, minor)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceNumber {
    pub major: MajorNumber,
    pub minor: u32,
}
impl DeviceNumber {
    pub const fn new(major: MajorNumber, minor: u32) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ClassId(u64);
impl ClassId {
    const fn first() -> Self {
        Self(0)
    }

    const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Name or number is already in use
    AlreadyExists,
    /// All dynamic major numbers are taken
    NoFreeMajor,
    /// Referenced class or major has not been registered
    NotRegistered,
}
impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already registered"),
            Self::NoFreeMajor => write!(f, "no free major number"),
            Self::NotRegistered => write!(f, "not registered"),
        }
    }
}

/// Registration facilities a char driver needs from the kernel.
///
/// Teardown calls must not fail.
pub trait Registrar {
    /// Registers a driver, allocating a major dynamically if `requested` is `None`
    fn register_chrdev(
        &mut self, requested: Option<MajorNumber>, name: &str, file: Arc<dyn FileOps>,
    ) -> Result<MajorNumber, RegistryError>;

    fn unregister_chrdev(&mut self, major: MajorNumber, name: &str);

    fn create_class(&mut self, name: &str) -> Result<ClassId, RegistryError>;

    fn destroy_class(&mut self, class: ClassId);

    /// Creates device node `name` in `class`, backed by driver `dev.major`
    fn create_device(
        &mut self, class: ClassId, dev: DeviceNumber, name: &str,
    ) -> Result<(), RegistryError>;

    fn destroy_device(&mut self, class: ClassId, dev: DeviceNumber);
}

struct CharDriver {
    name: String,
    file: Arc<dyn FileOps>,
}

#[derive(Debug)]
struct DeviceNode {
    class: ClassId,
    dev: DeviceNumber,
}

/// In-memory registrar
pub struct DeviceTable {
    drivers: HashMap<MajorNumber, CharDriver>,
    classes: HashMap<ClassId, String>,
    /// Device nodes by name
    nodes: HashMap<String, DeviceNode>,
    next_class: ClassId,
    next_client: FileClientId,
}
impl DeviceTable {
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
            classes: HashMap::new(),
            nodes: HashMap::new(),
            next_class: ClassId::first(),
            next_client: FileClientId::first(),
        }
    }

    /// True when no drivers, classes or nodes remain
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty() && self.classes.is_empty() && self.nodes.is_empty()
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Opens device node `name`, giving the client a fresh id
    pub fn open(&mut self, name: &str) -> IoResult<ChannelEndpoint> {
        let node = self.nodes.get(name).ok_or(IoError::NotFound)?;
        let driver = self.drivers.get(&node.dev.major).ok_or(IoError::NotFound)?;
        let file = Arc::clone(&driver.file);

        let fc = self.next_client;
        self.next_client = self.next_client.next();
        ChannelEndpoint::open(file, fc)
    }

    fn allocate_major(&self) -> Result<MajorNumber, RegistryError> {
        (DYNAMIC_MAJOR_LAST..=DYNAMIC_MAJOR_FIRST)
            .rev()
            .map(MajorNumber)
            .find(|major| !self.drivers.contains_key(major))
            .ok_or(RegistryError::NoFreeMajor)
    }
}
impl Registrar for DeviceTable {
    fn register_chrdev(
        &mut self, requested: Option<MajorNumber>, name: &str, file: Arc<dyn FileOps>,
    ) -> Result<MajorNumber, RegistryError> {
        if self.drivers.values().any(|d| d.name == name) {
            return Err(RegistryError::AlreadyExists);
        }

        let major = match requested {
            Some(major) if self.drivers.contains_key(&major) => {
                return Err(RegistryError::AlreadyExists);
            },
            Some(major) => major,
            None => self.allocate_major()?,
        };

        let driver = CharDriver {
            name: name.to_string(),
            file,
        };
        self.drivers.insert(major, driver);
        Ok(major)
    }

    fn unregister_chrdev(&mut self, major: MajorNumber, name: &str) {
        let known = self.drivers.get(&major).map_or(false, |d| d.name == name);
        if known {
            self.drivers.remove(&major);
        } else {
            log::warn!("unregister_chrdev: no driver {} with major {}", name, major);
        }
    }

    fn create_class(&mut self, name: &str) -> Result<ClassId, RegistryError> {
        if self.classes.values().any(|c| c == name) {
            return Err(RegistryError::AlreadyExists);
        }

        let id = self.next_class;
        self.next_class = self.next_class.next();
        self.classes.insert(id, name.to_string());
        Ok(id)
    }

    fn destroy_class(&mut self, class: ClassId) {
        if self.classes.remove(&class).is_none() {
            log::warn!("destroy_class: no such class {:?}", class);
        }
    }

    fn create_device(
        &mut self, class: ClassId, dev: DeviceNumber, name: &str,
    ) -> Result<(), RegistryError> {
        if !self.classes.contains_key(&class) || !self.drivers.contains_key(&dev.major) {
            return Err(RegistryError::NotRegistered);
        }
        if self.nodes.contains_key(name) {
            return Err(RegistryError::AlreadyExists);
        }

        self.nodes.insert(name.to_string(), DeviceNode { class, dev });
        Ok(())
    }

    fn destroy_device(&mut self, class: ClassId, dev: DeviceNumber) {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| !(node.class == class && node.dev == dev));
        if self.nodes.len() == before {
            log::warn!("destroy_device: no node {:?} in class {:?}", dev, class);
        }
    }
}
impl fmt::Debug for DeviceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTable")
            .field("drivers", &self.drivers.len())
            .field("classes", &self.classes)
            .field("nodes", &self.nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::FifoDevice;

    fn fifo() -> Arc<dyn FileOps> {
        Arc::new(FifoDevice::with_capacity("fifo", 8))
    }

    #[test]
    fn test_dynamic_majors() {
        let mut table = DeviceTable::new();
        let a = table.register_chrdev(None, "a", fifo()).unwrap();
        let b = table.register_chrdev(None, "b", fifo()).unwrap();
        assert_eq!(a, MajorNumber::new(254));
        assert_eq!(b, MajorNumber::new(253));

        // Freed majors are reused
        table.unregister_chrdev(a, "a");
        let c = table.register_chrdev(None, "c", fifo()).unwrap();
        assert_eq!(c, MajorNumber::new(254));
    }

    #[test]
    fn test_major_exhaustion() {
        let mut table = DeviceTable::new();
        let count = DYNAMIC_MAJOR_FIRST - DYNAMIC_MAJOR_LAST + 1;
        for i in 0..count {
            let name = format!("dev{}", i);
            table.register_chrdev(None, &name, fifo()).unwrap();
        }
        assert_eq!(
            table.register_chrdev(None, "one_too_many", fifo()),
            Err(RegistryError::NoFreeMajor)
        );

        // Static majors are still available
        let fixed = MajorNumber::new(60);
        assert_eq!(table.register_chrdev(Some(fixed), "fixed", fifo()), Ok(fixed));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut table = DeviceTable::new();
        let major = table.register_chrdev(None, "a", fifo()).unwrap();
        assert_eq!(
            table.register_chrdev(None, "a", fifo()),
            Err(RegistryError::AlreadyExists)
        );
        assert_eq!(
            table.register_chrdev(Some(major), "b", fifo()),
            Err(RegistryError::AlreadyExists)
        );

        let class = table.create_class("char").unwrap();
        assert_eq!(table.create_class("char"), Err(RegistryError::AlreadyExists));

        table.create_device(class, DeviceNumber::new(major, 0), "a").unwrap();
        assert_eq!(
            table.create_device(class, DeviceNumber::new(major, 1), "a"),
            Err(RegistryError::AlreadyExists)
        );
    }

    #[test]
    fn test_create_device_requires_registration() {
        let mut table = DeviceTable::new();
        let class = table.create_class("char").unwrap();
        let dev = DeviceNumber::new(MajorNumber::new(254), 0);
        assert_eq!(table.create_device(class, dev, "x"), Err(RegistryError::NotRegistered));

        let major = table.register_chrdev(None, "x", fifo()).unwrap();
        table.destroy_class(class);
        let dev = DeviceNumber::new(major, 0);
        assert_eq!(table.create_device(class, dev, "x"), Err(RegistryError::NotRegistered));
    }

    #[test]
    fn test_open_by_name() {
        let mut table = DeviceTable::new();
        let dev = Arc::new(FifoDevice::with_capacity("fifo", 8));
        let major = table.register_chrdev(None, "fifo", dev.clone()).unwrap();
        let class = table.create_class("char").unwrap();
        table.create_device(class, DeviceNumber::new(major, 0), "fifo").unwrap();

        assert_eq!(table.open("nope").unwrap_err(), IoError::NotFound);

        let writer = table.open("fifo").unwrap();
        let reader = table.open("fifo").unwrap();
        assert_ne!(writer.client(), reader.client());
        assert_eq!(dev.open_count(), 2);

        assert_eq!(writer.write(b"shared", 6, 0), 6);
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(reader.read(&mut out, 6, 0), 6);
        assert_eq!(out, b"shared");
        writer.close();
        reader.close();
    }

    #[test]
    fn test_teardown_empties_table() {
        let mut table = DeviceTable::new();
        let major = table.register_chrdev(None, "fifo", fifo()).unwrap();
        let class = table.create_class("char").unwrap();
        let dev = DeviceNumber::new(major, 0);
        table.create_device(class, dev, "fifo").unwrap();
        assert!(table.has_node("fifo"));

        table.destroy_device(class, dev);
        table.destroy_class(class);
        table.unregister_chrdev(major, "fifo");
        assert!(table.is_empty());

        // Repeated teardown only warns
        table.unregister_chrdev(major, "fifo");
        table.destroy_class(class);
        table.destroy_device(class, dev);
        assert!(table.is_empty());
    }
}

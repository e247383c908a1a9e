//! Install and removal of the FIFO device.

use alloc::sync::Arc;
use core::fmt;

use super::chrdev::{ClassId, DeviceNumber, MajorNumber, Registrar, RegistryError};
use super::config::{ConfigError, DeviceConfig};
use super::device::FifoDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleError {
    Config(ConfigError),
    Registry(RegistryError),
}
impl From<ConfigError> for ModuleError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}
impl From<RegistryError> for ModuleError {
    fn from(error: RegistryError) -> Self {
        Self::Registry(error)
    }
}
impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(error) => write!(f, "invalid config: {}", error),
            Self::Registry(error) => write!(f, "registration failed: {}", error),
        }
    }
}

/// An installed FIFO device: the driver, its class and its single node.
///
/// Must be given back to `remove` with the same registrar,
/// otherwise the registrations are leaked.
#[derive(Debug)]
#[must_use]
pub struct FifoModule {
    config: DeviceConfig,
    device: Arc<FifoDevice>,
    major: MajorNumber,
    class: ClassId,
}
impl FifoModule {
    /// Registers the driver, creates the class and the device node.
    /// On failure, everything done so far is undone.
    pub fn install<R: Registrar>(config: DeviceConfig, registrar: &mut R) -> Result<Self, ModuleError> {
        log::info!("{}: installing module", config.name);
        config.validate()?;

        let device = Arc::new(FifoDevice::new(&config));

        let major = registrar
            .register_chrdev(None, &config.name, device.clone())
            .map_err(|error| {
                log::error!("{}: could not register major number: {}", config.name, error);
                error
            })?;
        log::info!("{}: registered correctly with major number {}", config.name, major);

        let class = match registrar.create_class(&config.class) {
            Ok(class) => class,
            Err(error) => {
                log::error!("{}: failed to register device class: {}", config.name, error);
                registrar.unregister_chrdev(major, &config.name);
                return Err(error.into());
            },
        };
        log::info!("{}: device class registered correctly", config.name);

        let dev = DeviceNumber::new(major, 0);
        if let Err(error) = registrar.create_device(class, dev, &config.name) {
            log::error!("{}: failed to create the device: {}", config.name, error);
            registrar.destroy_class(class);
            registrar.unregister_chrdev(major, &config.name);
            return Err(error.into());
        }
        log::info!("{}: device created correctly", config.name);

        Ok(Self {
            config,
            device,
            major,
            class,
        })
    }

    /// Tears down the node, the class and the driver, in that order.
    /// The store is released once the last open endpoint is gone.
    pub fn remove<R: Registrar>(self, registrar: &mut R) {
        log::info!("{}: removing module", self.config.name);
        registrar.destroy_device(self.class, self.device_number());
        registrar.destroy_class(self.class);
        registrar.unregister_chrdev(self.major, &self.config.name);
        log::info!("{}: removed", self.config.name);
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn device(&self) -> &Arc<FifoDevice> {
        &self.device
    }

    pub fn major(&self) -> MajorNumber {
        self.major
    }

    pub fn device_number(&self) -> DeviceNumber {
        DeviceNumber::new(self.major, 0)
    }
}

//! Fixed-capacity device registry.
//!
//! Maps dense small-integer ids to driver-owned handles. A driver registers
//! its handle at startup and flips the initialized flag once the hardware is
//! up; lookups before that report `NotReady` so callers retry on a later
//! tick instead of blocking.

use crate::error::{DeviceError, Error, RegistryError, Result};
use crate::motion::{Counts, Rate};

/// A device that reports encoder counts.
pub trait Counter {
    /// Raw count.
    fn count(&mut self) -> core::result::Result<Counts, DeviceError>;

    /// Raw rate in counts per second.
    fn rate(&mut self) -> core::result::Result<Rate, DeviceError>;
}

/// A driver that populates a registry.
///
/// Invoked by the runtime loop hosting the driver: `init` once, `poll` on
/// every tick until shutdown, `exit` once.
pub trait CounterDriver<H, const N: usize> {
    /// Register handles. Hardware may still be coming up afterwards.
    fn init(&mut self, registry: &mut DeviceRegistry<H, N>) -> Result<()>;

    /// Advance hardware bring-up and service the devices.
    fn poll(&mut self, registry: &mut DeviceRegistry<H, N>) -> Result<()>;

    /// Unregister handles.
    fn exit(&mut self, registry: &mut DeviceRegistry<H, N>) -> Result<()>;
}

#[derive(Debug)]
struct Entry<H> {
    handle: H,
    initialized: bool,
}

/// Slot table of device handles keyed by id `< N`.
#[derive(Debug)]
pub struct DeviceRegistry<H, const N: usize> {
    slots: [Option<Entry<H>>; N],
}

impl<H, const N: usize> Default for DeviceRegistry<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, const N: usize> DeviceRegistry<H, N> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    fn slot(&self, id: u8) -> core::result::Result<&Option<Entry<H>>, RegistryError> {
        self.slots.get(id as usize).ok_or(RegistryError::InvalidId(id))
    }

    fn slot_mut(&mut self, id: u8) -> core::result::Result<&mut Option<Entry<H>>, RegistryError> {
        self.slots
            .get_mut(id as usize)
            .ok_or(RegistryError::InvalidId(id))
    }

    /// Register a handle under `id`. The entry starts uninitialized.
    ///
    /// # Errors
    ///
    /// `InvalidId` past capacity; `AlreadyRegistered` if the slot is taken,
    /// in which case the existing entry is left untouched.
    pub fn register(&mut self, id: u8, handle: H) -> core::result::Result<(), RegistryError> {
        let slot = self.slot_mut(id)?;
        if slot.is_some() {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        *slot = Some(Entry {
            handle,
            initialized: false,
        });
        debug!("registered device {}", id);
        Ok(())
    }

    /// Remove the entry holding `handle` and give it back.
    pub fn unregister(&mut self, handle: &H) -> core::result::Result<H, RegistryError>
    where
        H: PartialEq,
    {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|e| e.handle == *handle))
            .ok_or(RegistryError::NotFound)?;
        slot.take().map(|e| e.handle).ok_or(RegistryError::NotFound)
    }

    /// Remove the entry under `id` and give its handle back.
    pub fn unregister_id(&mut self, id: u8) -> core::result::Result<H, RegistryError> {
        let entry = self.slot_mut(id)?.take().ok_or(RegistryError::NotFound)?;
        debug!("unregistered device {}", id);
        Ok(entry.handle)
    }

    /// Mark the hardware behind `id` as (not) ready.
    pub fn set_initialized(&mut self, id: u8, initialized: bool) -> core::result::Result<(), RegistryError> {
        let entry = self.slot_mut(id)?.as_mut().ok_or(RegistryError::NotFound)?;
        entry.initialized = initialized;
        Ok(())
    }

    /// Whether a handle occupies `id`, initialized or not.
    pub fn is_registered(&self, id: u8) -> bool {
        matches!(self.slot(id), Ok(Some(_)))
    }

    /// Look up an initialized handle.
    ///
    /// # Errors
    ///
    /// `Registry(InvalidId)` past capacity; `Device(NotReady)` if the slot is
    /// empty or its hardware has not finished initialization.
    pub fn get(&self, id: u8) -> Result<&H> {
        match self.slot(id)? {
            Some(entry) if entry.initialized => Ok(&entry.handle),
            _ => Err(Error::Device(DeviceError::NotReady)),
        }
    }

    /// Look up an initialized handle mutably. Same errors as [`get`](Self::get).
    pub fn get_mut(&mut self, id: u8) -> Result<&mut H> {
        match self.slot_mut(id)? {
            Some(entry) if entry.initialized => Ok(&mut entry.handle),
            _ => Err(Error::Device(DeviceError::NotReady)),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity fixed at build time.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<H: Counter, const N: usize> DeviceRegistry<H, N> {
    /// Read the count of device `id`.
    pub fn count(&mut self, id: u8) -> Result<Counts> {
        Ok(self.get_mut(id)?.count()?)
    }

    /// Read the rate of device `id`.
    pub fn rate(&mut self, id: u8) -> Result<Rate> {
        Ok(self.get_mut(id)?.rate()?)
    }
}

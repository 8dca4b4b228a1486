// src/registry.rs
//! Object registry: maps handles returned by creation calls to the records
//! the diagram keeps for them.
//!
//! Records are never dropped. Unregistering marks a record deleted so a
//! second delete can be told apart from a handle that was never seen.

use std::collections::BTreeMap;

use log::debug;

use crate::api::Handle;
use crate::display::ElementId;
use crate::error::RegistryError;
use crate::format::NameLookup;

/// Everything the diagram knows about one created object.
///
/// `extra` carries the kind-specific view state (the bound target of a
/// texture, the cells of a buffer panel, ...).
#[derive(Debug, Clone)]
pub struct ObjectRecord<T> {
    pub handle: Handle,
    pub name: String,
    /// Root element of the object's panel.
    pub display: ElementId,
    pub deleted: bool,
    pub extra: T,
}

#[derive(Debug)]
pub struct ObjectRegistry<T> {
    records: BTreeMap<Handle, ObjectRecord<T>>,
}

impl<T> Default for ObjectRegistry<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T> ObjectRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `DuplicateHandle` if `handle` is present and not deleted.
    /// A deleted handle may be registered again.
    pub fn register(
        &mut self,
        handle: Handle,
        name: &str,
        display: ElementId,
        extra: T,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.records.get(&handle) {
            if !existing.deleted {
                return Err(RegistryError::DuplicateHandle(handle));
            }
        }
        debug!("ObjectRegistry: {} registered as '{}'", handle, name);
        self.records.insert(
            handle,
            ObjectRecord {
                handle,
                name: name.to_string(),
                display,
                deleted: false,
                extra,
            },
        );
        Ok(())
    }

    pub fn resolve(&self, handle: Handle) -> Result<&ObjectRecord<T>, RegistryError> {
        match self.records.get(&handle) {
            Some(record) if !record.deleted => Ok(record),
            _ => Err(RegistryError::UnknownHandle(handle)),
        }
    }

    pub fn resolve_mut(&mut self, handle: Handle) -> Result<&mut ObjectRecord<T>, RegistryError> {
        match self.records.get_mut(&handle) {
            Some(record) if !record.deleted => Ok(record),
            _ => Err(RegistryError::UnknownHandle(handle)),
        }
    }

    /// Marks the record deleted and returns the display the caller must detach.
    pub fn unregister(&mut self, handle: Handle) -> Result<ElementId, RegistryError> {
        let record = self
            .records
            .get_mut(&handle)
            .ok_or(RegistryError::UnknownHandle(handle))?;
        if record.deleted {
            return Err(RegistryError::AlreadyDeleted(handle));
        }
        record.deleted = true;
        debug!("ObjectRegistry: {} ('{}') deleted", handle, record.name);
        Ok(record.display)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Live records in handle order.
    pub fn live(&self) -> impl Iterator<Item = &ObjectRecord<T>> {
        self.records.values().filter(|r| !r.deleted)
    }

    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> NameLookup for ObjectRegistry<T> {
    fn name_of(&self, handle: Handle) -> Option<String> {
        self.records.get(&handle).map(|r| r.name.clone())
    }
}

#[cfg(test)]
mod tests;

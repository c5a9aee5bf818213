//! Fixed-capacity entity tables with typed handles
//!
//! Every exhibit entity is created once at startup into a slot of an
//! [`Arena`] and never freed or re-indexed. Composites (a fish, a
//! jellyfish, an aquarium) only hold [`Handle`]s into the tables that own
//! the storage, so an id is always checked against the table it names.

use core::fmt;
use core::marker::PhantomData;

use crate::error::{EntityKind, Error};

/// An entity type that lives in an [`Arena`]
pub trait Entity {
    /// Table the entity belongs to, used in error reports
    const KIND: EntityKind;

    /// Error for a lookup that hits an empty slot
    fn unconfigured(index: u8) -> Error {
        Error::InvalidId {
            kind: Self::KIND,
            index,
        }
    }
}

/// Non-owning reference to an entity slot
pub struct Handle<T> {
    index: u8,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a handle for slot `index`
    pub const fn new(index: u8) -> Self {
        Self {
            index,
            _entity: PhantomData,
        }
    }

    /// Slot index
    pub const fn index(self) -> u8 {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for Handle<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "#{=u8}", self.index)
    }
}

/// Fixed-capacity table of entities indexed by [`Handle`]
pub struct Arena<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T: Entity, const N: usize> Default for Arena<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity, const N: usize> Arena<T, N> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Place `value` in the slot named by `handle`, replacing any previous entity
    pub fn init(&mut self, handle: Handle<T>, value: T) -> Result<&mut T, Error> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or(Self::out_of_range(handle))?;
        Ok(slot.insert(value))
    }

    /// Borrow the entity behind `handle`
    pub fn get(&self, handle: Handle<T>) -> Result<&T, Error> {
        self.slots
            .get(handle.index as usize)
            .ok_or(Self::out_of_range(handle))?
            .as_ref()
            .ok_or(T::unconfigured(handle.index))
    }

    /// Mutably borrow the entity behind `handle`
    pub fn get_mut(&mut self, handle: Handle<T>) -> Result<&mut T, Error> {
        self.slots
            .get_mut(handle.index as usize)
            .ok_or(Self::out_of_range(handle))?
            .as_mut()
            .ok_or(T::unconfigured(handle.index))
    }

    /// Fail with `InvalidId` if `handle` is outside the table
    pub fn check_range(&self, handle: Handle<T>) -> Result<(), Error> {
        if (handle.index as usize) < N {
            Ok(())
        } else {
            Err(Self::out_of_range(handle))
        }
    }

    /// Check if `handle` names a configured slot
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_ok()
    }

    /// Configured entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (Handle::new(i as u8), e)))
    }

    /// Mutable access to configured entities in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|e| (Handle::new(i as u8), e)))
    }

    fn out_of_range(handle: Handle<T>) -> Error {
        Error::InvalidId {
            kind: T::KIND,
            index: handle.index,
        }
    }
}

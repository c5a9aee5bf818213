//! Persistent records of the exhibit
//!
//! The firmware keeps two records in flash, the servo calibration table
//! and the aquarium policy, each postcard-encoded under its own key. A
//! write replaces the record; nothing else is ever stored.

/// Which record a flash item holds
///
/// The byte value is written to flash and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Zero references and last positions of the fish axes
    ServoCalibration = 0,
    /// Tap reaction, visibility rule and fish routes
    AquariumPolicy = 1,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Key stored as `value`, `None` for bytes no record uses
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::ServoCalibration),
            1 => Some(StorageKey::AquariumPolicy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The flash peripheral rejected an erase
    Flash,
    /// The map layer failed for another reason
    Storage,
    /// No record under the key
    NotFound,
    /// Record larger than the caller's buffer or the item limit
    BufferTooSmall,
    /// The partition no longer parses; only an erase recovers it
    Corrupted,
    /// No room left even after garbage collection
    Full,
}

/// Record store over a wear-levelled flash partition
pub trait FlashStorage {
    /// Copy the record of `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the record of `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Wipe every record
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        match buffer.first().copied().map(StorageKey::from_u8) {
            Some(Some(key)) => Ok((key, 1)),
            Some(None) => Err(sequential_storage::map::SerializationError::InvalidFormat),
            None => Err(sequential_storage::map::SerializationError::BufferTooSmall),
        }
    }
}

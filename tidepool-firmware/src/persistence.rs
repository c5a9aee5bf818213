//! Flash persistence for the calibration table and the aquarium policy
//!
//! Both records are postcard-encoded under their own storage key. Loading
//! never fails: anything missing or invalid falls back to a default with a
//! log line. A corrupted partition is wiped at boot, so the policy read
//! that follows falls back as well.

use defmt::*;

use tidepool_core::config::{AquariumPolicy, CalibrationData};
use tidepool_hal::FlashStorage;
use tidepool_hal_rp2040::flash::{FlashError, StorageKey};

/// Maximum serialized calibration size
const MAX_CALIBRATION_SIZE: usize = 256;

/// Maximum serialized policy size
const MAX_POLICY_SIZE: usize = 512;

/// Persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<FlashError> for PersistenceError {
    fn from(e: FlashError) -> Self {
        PersistenceError::Flash(e)
    }
}

/// Load the calibration table, or an empty one
pub async fn load_calibration(storage: &mut impl FlashStorage) -> CalibrationData {
    match load_calibration_inner(storage).await {
        Ok(data) => {
            info!(
                "Loaded calibration for {} servo(s) from flash",
                data.valid_count()
            );
            data
        }
        Err(PersistenceError::Flash(FlashError::NotFound)) => {
            info!("No calibration in flash, servos will be calibrated");
            CalibrationData::new()
        }
        Err(PersistenceError::Flash(FlashError::Corrupted)) => {
            // The map refuses writes until the partition is wiped
            warn!("Storage partition corrupted, erasing it");
            if let Err(e) = storage.erase_all().await {
                error!("Erase failed: {:?}, calibration will not persist", e);
            }
            CalibrationData::new()
        }
        Err(e) => {
            warn!("Failed to load calibration: {:?}, starting empty", e);
            CalibrationData::new()
        }
    }
}

async fn load_calibration_inner(
    storage: &mut impl FlashStorage,
) -> Result<CalibrationData, PersistenceError> {
    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let len = storage
        .read(StorageKey::ServoCalibration, &mut buffer)
        .await?;

    debug!("Read {} bytes of calibration from flash", len);

    let data: CalibrationData =
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistenceError::Deserialize)?;

    if !data.is_valid() {
        return Err(PersistenceError::InvalidFormat);
    }
    if !data.verify_crc() {
        return Err(PersistenceError::CrcMismatch);
    }

    Ok(data)
}

/// Write the calibration table, refreshing its CRC first
pub async fn save_calibration(
    storage: &mut impl FlashStorage,
    data: &mut CalibrationData,
) -> Result<(), PersistenceError> {
    data.update_crc();

    let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
    let bytes = postcard::to_slice(data, &mut buffer).map_err(|_| PersistenceError::Serialize)?;

    debug!("Saving {} bytes of calibration to flash", bytes.len());

    storage.write(StorageKey::ServoCalibration, bytes).await?;
    Ok(())
}

/// Load the aquarium policy, or `fallback` if none is stored
pub async fn load_policy(
    storage: &mut impl FlashStorage,
    fallback: AquariumPolicy,
) -> AquariumPolicy {
    let mut buffer = [0u8; MAX_POLICY_SIZE];
    let len = match storage.read(StorageKey::AquariumPolicy, &mut buffer).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => {
            info!("No policy in flash, using built-in show");
            return fallback;
        }
        Err(e) => {
            warn!("Failed to read policy: {:?}, using built-in show", e);
            return fallback;
        }
    };

    match postcard::from_bytes::<AquariumPolicy>(&buffer[..len]) {
        Ok(policy) => {
            info!(
                "Loaded policy: {:?} taps, {} patrol point(s)",
                policy.tap_reaction,
                policy.patrol.len()
            );
            policy
        }
        Err(_) => {
            warn!("Stored policy does not decode, using built-in show");
            fallback
        }
    }
}

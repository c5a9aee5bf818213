//! Calibration persistence task
//!
//! Owns the flash storage and writes the calibration table whenever the
//! control loop changes it.

use defmt::*;
use embassy_time::Timer;

use tidepool_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::CALIBRATION_SAVE;
use crate::persistence::save_calibration;

/// Quiet time before writing, so the axes checkpointed on one arrival
/// end up in a single flash write
const SAVE_COALESCE_MS: u64 = 200;

#[embassy_executor::task]
pub async fn calibration_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Calibration task started");

    loop {
        let mut table = CALIBRATION_SAVE.wait().await;

        Timer::after_millis(SAVE_COALESCE_MS).await;
        if let Some(newer) = CALIBRATION_SAVE.try_take() {
            table = newer;
        }

        match save_calibration(&mut storage, &mut table).await {
            Ok(()) => debug!(
                "Calibration saved ({} servo(s))",
                table.valid_count()
            ),
            Err(e) => error!("Failed to save calibration: {:?}", e),
        }
    }
}

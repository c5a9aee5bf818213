//! Exhibit control loop
//!
//! Runs the aquarium's short step every `SHORT_TIME_STEP_MS` with the
//! measured elapsed time, and its long step whenever `LONG_TIME_STEP_MS`
//! has accumulated. Faults are logged and the loop carries on; the next
//! tick retries whatever failed.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use tidepool_core::config::{LONG_TIME_STEP_MS, SHORT_TIME_STEP_MS};
use tidepool_core::events::Event;
use tidepool_core::Exhibit;
use tidepool_hal_rp2040::Rp2040Board;

use crate::layout::AQUARIUM;
use crate::store::FlashMirroredStore;

pub type FirmwareExhibit = Exhibit<Rp2040Board<'static>, FlashMirroredStore>;

/// Observer installed on the exhibit
pub fn log_event(event: &Event) {
    info!("{:?}", event);
}

#[embassy_executor::task]
pub async fn control_task(mut exhibit: FirmwareExhibit) {
    info!("Control task started");

    let mut ticker = Ticker::every(Duration::from_millis(SHORT_TIME_STEP_MS as u64));
    let mut last = Instant::now();
    let mut since_long_ms: u32 = 0;

    loop {
        ticker.next().await;

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_millis() as u32;
        last = now;

        if let Err(e) = exhibit.short_step(AQUARIUM, elapsed_ms) {
            warn!("Short step fault: {:?}", e);
        }

        since_long_ms = since_long_ms.saturating_add(elapsed_ms);
        if since_long_ms >= LONG_TIME_STEP_MS {
            if let Err(e) = exhibit.long_step(AQUARIUM, since_long_ms) {
                warn!("Long step fault: {:?}", e);
            }
            since_long_ms = 0;
        }
    }
}

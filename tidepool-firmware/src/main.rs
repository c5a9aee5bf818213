//! Tidepool - Animatronic Aquarium Exhibit Firmware
//!
//! Main firmware binary for the RP2040 exhibit controller. Boots the
//! board, restores servo calibration and the aquarium policy from flash,
//! assembles the exhibit and hands it to the control loop.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::pwm::Pwm;
use {defmt_rtt as _, panic_probe as _};

use tidepool_core::config::{ServoPulseConfig, JELLYFISH_RAISED_ANGLE};
use tidepool_core::Exhibit;
use tidepool_hal_rp2040::board::servo_pwm_config;
use tidepool_hal_rp2040::flash::Rp2040FlashStorage;
use tidepool_hal_rp2040::{AnalogMux, Rp2040Board};

use crate::store::FlashMirroredStore;

mod channels;
mod layout;
mod persistence;
mod store;
mod tasks;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tidepool firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let calibration = persistence::load_calibration(&mut storage).await;
    let policy = persistence::load_policy(&mut storage, layout::default_policy()).await;

    let continuous = ServoPulseConfig::continuous();
    let limited = ServoPulseConfig::limited();

    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let mux = AnalogMux::new(
        adc,
        [
            Channel::new_pin(p.PIN_26, Pull::None),
            Channel::new_pin(p.PIN_27, Pull::None),
        ],
        [
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_11, Level::Low),
            Output::new(p.PIN_12, Level::Low),
        ],
    );

    let mut board = Rp2040Board::new(mux);

    // Axes idle at neutral so nothing spins before the exhibit takes over
    let neutral = continuous.neutral_us;
    unwrap!(board.add_servo(
        layout::FISH_X_PWM,
        Pwm::new_output_a(p.PWM_SLICE0, p.PIN_0, servo_pwm_config(neutral)),
        neutral,
    ));
    unwrap!(board.add_servo(
        layout::FISH_Y_PWM,
        Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, servo_pwm_config(neutral)),
        neutral,
    ));
    unwrap!(board.add_servo(
        layout::FISH_Z_PWM,
        Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, servo_pwm_config(neutral)),
        neutral,
    ));

    let level = limited.angle_to_pulse(90);
    unwrap!(board.add_servo(
        layout::FISH_THETA_PWM,
        Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, servo_pwm_config(level)),
        level,
    ));
    let raised = limited.angle_to_pulse(JELLYFISH_RAISED_ANGLE);
    unwrap!(board.add_servo(
        layout::JELLYFISH_LIFT_PWM,
        Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, servo_pwm_config(raised)),
        raised,
    ));
    unwrap!(board.add_led(layout::JELLYFISH_LED, Output::new(p.PIN_15, Level::Low)));
    info!("Board wired: {} output line(s)", board.output_count());

    let mut exhibit = Exhibit::new(board, FlashMirroredStore::new(calibration));
    exhibit.set_observer(tasks::control::log_event);

    if let Err(e) = layout::assemble(&mut exhibit, policy) {
        // Keep running: whatever did configure still gets stepped
        error!("Exhibit assembly incomplete: {:?}", e);
    }
    info!("Exhibit assembled");

    spawner.spawn(tasks::calibration_task(storage)).unwrap();
    spawner.spawn(tasks::control_task(exhibit)).unwrap();

    info!("All tasks spawned, exhibit running");
}

use std::borrow::Borrow;

use esp_idf_svc::hal::adc::oneshot::AdcDriver;
use esp_idf_svc::hal::adc::Adc;
use esp_idf_svc::hal::gpio::ADCPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::info;

use firebase::FirebaseSession;
use moisture_sensor::{Calibration, MoistureSensor};
use uploader::UploadRecord;

mod config;
mod firebase;
mod moisture_sensor;
#[cfg(feature = "continuous")]
mod sample_buffer;
mod time_source;
mod uploader;
mod wifi_helper;

/// Boot count, retained across deep sleep. Everything else restarts
/// from scratch on timer wakeup.
#[cfg(feature = "single-shot")]
#[link_section = ".rtc.data"]
static mut WAKEUP_COUNT: u32 = 0;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    #[cfg(feature = "single-shot")]
    report_wakeup();

    let peripherals = Peripherals::take()?;

    // Keep both handles alive: dropping the Wi-Fi driver tears the link
    // down and dropping the SNTP handle stops clock synchronization.
    let _wifi =
        wifi_helper::connect_wifi(config::WIFI_SSID, config::WIFI_PASSWORD, peripherals.modem)?;

    let mut session =
        FirebaseSession::new(config::FIREBASE_API_KEY, config::FIREBASE_DATABASE_URL);
    if let Err(e) = session.authenticate() {
        log::error!("Authentication failed: {e}");
    }

    let _sntp = time_source::sync_clock(config::NTP_SERVER)?;

    let adc = AdcDriver::new(peripherals.adc1)?;
    let mut sensor = MoistureSensor::new(
        &adc,
        peripherals.pins.gpio34,
        Calibration::new(config::AIR_MOISTURE, config::WATER_MOISTURE),
    )?;

    #[cfg(feature = "single-shot")]
    run_single_shot(&mut sensor, &mut session)?;

    #[cfg(feature = "continuous")]
    run_continuous(&mut sensor, &mut session)?;

    Ok(())
}

#[cfg(feature = "single-shot")]
fn report_wakeup() {
    let cause = unsafe { esp_idf_svc::hal::sys::esp_sleep_get_wakeup_cause() };
    let count = unsafe { WAKEUP_COUNT };
    info!("Wakeup {count} caused by {cause}");
    unsafe { WAKEUP_COUNT = count + 1 };
}

/// One sample, one upload attempt, then deep sleep. The timer wakeup
/// resets the chip and execution restarts at `main`.
#[cfg(feature = "single-shot")]
fn run_single_shot<'a, ADC: Adc, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>(
    sensor: &mut MoistureSensor<'a, ADC, APin, M>,
    session: &mut FirebaseSession,
) -> anyhow::Result<()> {
    let moisture = sensor.read_raw();
    info!(
        "Moisture value {} ({}%)",
        moisture,
        sensor.percentage(moisture)
    );

    let record = UploadRecord::new(moisture, time_source::now());
    uploader::log_moisture(session, config::DEVICE_NAME, &record);

    info!("Going to sleep!");
    unsafe {
        esp_idf_svc::hal::sys::esp_deep_sleep(config::SAMPLE_DELAY_S * 1_000_000);
    }

    #[allow(unreachable_code)]
    Ok(())
}

/// Samples forever, smoothing over the last [`config::SAMPLE_WINDOW`]
/// readings. Uploads are skipped while the session is not ready; the
/// session never re-authenticates.
#[cfg(feature = "continuous")]
fn run_continuous<'a, ADC: Adc, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>(
    sensor: &mut MoistureSensor<'a, ADC, APin, M>,
    session: &mut FirebaseSession,
) -> anyhow::Result<()> {
    use esp_idf_svc::hal::delay::FreeRtos;

    let first = sensor.read_raw();
    let mut buffer = sample_buffer::SampleBuffer::<{ config::SAMPLE_WINDOW }>::new(first);

    loop {
        let moisture = sensor.read_raw();
        buffer.push(moisture);

        let percentage = sensor.percentage(moisture);
        let average_percentage = sensor.percentage(buffer.average());

        info!("Moisture value {moisture} ({percentage}%, average {average_percentage}%)");

        let record = UploadRecord::new(moisture, time_source::now())
            .with_percentages(percentage, average_percentage);
        uploader::log_moisture(session, config::DEVICE_NAME, &record);

        FreeRtos::delay_ms(config::SAMPLE_DELAY_S as u32 * 1000);
    }
}

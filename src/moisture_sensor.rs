use std::borrow::Borrow;

use esp_idf_svc::hal::{
    adc::{
        attenuation,
        oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
        Adc,
    },
    gpio::ADCPin,
};

/// Raw ADC references taken at the two known physical conditions:
/// probe in open air (driest) and probe submerged (wettest).
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    air: u16,
    water: u16,
}

impl Calibration {
    pub const fn new(air: u16, water: u16) -> Self {
        Self { air, water }
    }

    /// Linear interpolation of a raw sample onto [0, 100], truncating.
    /// Readings outside the calibration span map outside [0, 100]; no
    /// clamping.
    pub fn percentage(&self, raw: u16) -> i32 {
        map(raw as i32, self.air as i32, self.water as i32, 0, 100)
    }
}

fn map(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

pub struct MoistureSensor<'a, ADC: Adc + 'a, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>
{
    channel: AdcChannelDriver<'a, APin, M>,
    calibration: Calibration,
}

impl<'a, ADC: Adc + 'a, APin: ADCPin<Adc = ADC>, M: Borrow<AdcDriver<'a, ADC>>>
    MoistureSensor<'a, ADC, APin, M>
{
    pub fn new(adc_driver: M, pin_adc: APin, calibration: Calibration) -> anyhow::Result<Self> {
        Ok(Self {
            channel: AdcChannelDriver::new(
                adc_driver,
                pin_adc,
                &AdcChannelConfig {
                    attenuation: attenuation::DB_11,
                    calibration: true,
                    ..Default::default()
                },
            )?,
            calibration,
        })
    }

    pub fn read_raw(&mut self) -> u16 {
        self.channel.read().unwrap_or(0)
    }

    pub fn percentage(&self, raw: u16) -> i32 {
        self.calibration.percentage(raw)
    }
}

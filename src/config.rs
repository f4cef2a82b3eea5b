use mutually_exclusive_features::exactly_one_of;

exactly_one_of!("single-shot", "continuous");

// Wi-Fi credentials, baked in at build time. Replace before flashing.
pub const WIFI_SSID: &str = "SSID";
pub const WIFI_PASSWORD: &str = "PASSWORD";

// Firebase realtime database project.
pub const FIREBASE_API_KEY: &str = "API_KEY";
pub const FIREBASE_DATABASE_URL: &str = "https://project-id-default-rtdb.firebaseio.com";

// Key prefix for every uploaded record.
pub const DEVICE_NAME: &str = "plant1";

/*** Sensor calibration ***/
// Raw ADC value with the probe in open air (driest) and fully submerged
// (wettest). Measured once per probe.
pub const AIR_MOISTURE: u16 = 2610;
pub const WATER_MOISTURE: u16 = 900;

/*** Timing ***/
// Seconds between samples: deep-sleep duration in single-shot builds,
// loop delay in continuous builds.
pub const SAMPLE_DELAY_S: u64 = 10;

pub const NTP_SERVER: &str = "pool.ntp.org";

// Moving-average window, continuous builds only.
#[cfg(feature = "continuous")]
pub const SAMPLE_WINDOW: usize = 16;

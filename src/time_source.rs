use std::time::{SystemTime, UNIX_EPOCH};

use esp_idf_svc::sntp::{EspSntp, SntpConf};
use esp_idf_svc::sys::SNTP_MAX_SERVERS;
use log::info;

// Private in `esp_idf_svc::sntp`; re-derived from the sys constant it
// aliases there.
const SNTP_SERVER_NUM: usize = SNTP_MAX_SERVERS as usize;

// Before the first SNTP sync the system clock counts from the epoch, so
// anything earlier than 2016-01-01 means wall time is not established.
const MIN_VALID_EPOCH: i64 = 1_451_606_400;

/// Starts periodic SNTP synchronization against `server`. Fire and
/// forget: the sync happens in the background and the returned handle
/// only needs to be kept alive.
pub fn sync_clock(server: &str) -> anyhow::Result<EspSntp<'static>> {
    let conf = SntpConf {
        servers: [server; SNTP_SERVER_NUM],
        ..Default::default()
    };

    Ok(EspSntp::new(&conf)?)
}

/// Epoch seconds, or the sentinel `0` while wall time has not been
/// established yet. Callers use the sentinel as-is, which keys the
/// record at `<device>/0`.
pub fn now() -> i64 {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    if established(epoch) {
        epoch
    } else {
        info!("Failed to obtain time");
        0
    }
}

fn established(epoch: i64) -> bool {
    epoch >= MIN_VALID_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_relative_time_is_not_established() {
        // Seconds since boot, clock never synced.
        assert!(!established(42));
        assert!(!established(0));
    }

    #[test]
    fn synced_wall_time_is_established() {
        assert!(established(1700000000));
    }
}

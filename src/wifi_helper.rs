use std::net::Ipv4Addr;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::{modem::Modem, peripheral::Peripheral};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
use log::info;

const POLL_DELAY_MS: u32 = 1000;

/// Blocking station association. Polls the link state once a second with
/// no timeout: wrong credentials or an unreachable access point block
/// forever. The returned handle must be kept alive for the connection to
/// persist.
pub fn connect_wifi<'a>(
    ssid: &str,
    password: &str,
    modem: impl Peripheral<P = Modem> + 'a,
) -> anyhow::Result<EspWifi<'a>> {
    let wifi_configuration: Configuration = Configuration::Client(ClientConfiguration {
        ssid: ssid.try_into().unwrap(),
        bssid: None,
        auth_method: AuthMethod::WPA2Personal,
        password: password.try_into().unwrap(),
        channel: None,
    });

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = EspWifi::new(modem, sys_loop, Some(nvs))?;
    wifi.set_configuration(&wifi_configuration)?;

    wifi.start()?;
    wifi.connect()?;

    info!("Connecting to WiFi (SSID {ssid})..");
    loop {
        if wifi.is_connected().unwrap_or(false) {
            let ip_info = wifi.sta_netif().get_ip_info()?;
            // Connected but DHCP still in flight.
            if ip_info.ip != Ipv4Addr::UNSPECIFIED {
                info!("Connected with IP {}", ip_info.ip);
                break;
            }
        }
        FreeRtos::delay_ms(POLL_DELAY_MS);
    }

    Ok(wifi)
}

use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::config::WifiCredentials;
use crate::network::Network;

/// Station-mode Wi-Fi on the ESP-IDF driver. `begin` only starts the
/// association; `wait_for_association` does the waiting.
pub struct EspNetwork {
    wifi: Box<EspWifi<'static>>,
}

impl EspNetwork {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, nvs)?;
        Ok(Self {
            wifi: Box::new(wifi),
        })
    }
}

impl Network for EspNetwork {
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<()> {
        let auth = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let ssid = fit::<32>("SSID", &credentials.ssid);
        let password = fit::<64>("password", &credentials.password);

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid,
                password,
                auth_method: auth,
                ..Default::default()
            }))?;

        self.wifi.start()?;
        self.wifi.connect()?;
        info!("WiFi connecting to '{}'...", credentials.ssid);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn ip_address(&mut self) -> Option<String> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip.to_string())
    }
}

/// Copy into a driver-sized buffer, cutting at a char boundary if needed.
fn fit<const N: usize>(what: &str, value: &str) -> heapless::String<N> {
    let mut out = heapless::String::<N>::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            warn!("WiFi {} longer than {} bytes, truncated", what, N);
            break;
        }
    }
    out
}

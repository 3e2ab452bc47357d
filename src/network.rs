use embedded_hal::delay::DelayNs;
use log::info;

use crate::config::WifiCredentials;

/// Delay between association checks.
pub const ASSOCIATION_POLL_MS: u32 = 500;
const PROGRESS_EVERY: u32 = 10;

/// Station-mode network link.
pub trait Network {
    /// Configure the credentials and start associating; does not wait.
    fn begin(&mut self, credentials: &WifiCredentials) -> anyhow::Result<()>;
    fn is_connected(&mut self) -> bool;
    fn ip_address(&mut self) -> Option<String>;
}

/// Start association and block until the link is up, polling every
/// [`ASSOCIATION_POLL_MS`]. There is no timeout: a network that never comes up
/// keeps the station here.
pub fn wait_for_association<N, D>(
    network: &mut N,
    delay: &mut D,
    credentials: &WifiCredentials,
) -> anyhow::Result<u32>
where
    N: Network + ?Sized,
    D: DelayNs + ?Sized,
{
    info!("Connecting to {}", credentials.ssid);
    network.begin(credentials)?;

    let mut polls = 0u32;
    while !network.is_connected() {
        delay.delay_ms(ASSOCIATION_POLL_MS);
        polls = polls.wrapping_add(1);
        if polls % PROGRESS_EVERY == 0 {
            info!(
                "Still connecting to {} ({} ms)",
                credentials.ssid,
                polls as u64 * ASSOCIATION_POLL_MS as u64
            );
        }
    }
    info!("WiFi connected!");
    Ok(polls)
}

//! E-paper weather station: fetch a Pirate Weather forecast, lay it out on a
//! 296x128 monochrome panel, then sleep until the next refresh.
//!
//! Everything outside the `espidf`-gated modules builds and tests on the host.

pub mod bitmap;
pub mod config;
pub mod framebuffer;
pub mod http_client;
pub mod layout;
pub mod network;
pub mod parse;
pub mod render;
pub mod station;
pub mod surface;
pub mod weather;
pub mod weather_icons;

#[cfg(target_os = "espidf")]
pub mod epd;
#[cfg(target_os = "espidf")]
pub mod power;
#[cfg(target_os = "espidf")]
pub mod wifi;

#[cfg(not(target_os = "espidf"))]
pub mod simulator;

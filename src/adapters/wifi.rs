//! WiFi station-mode adapter.
//!
//! Credential validation plus the blocking station bring-up used at boot.
//! The lamp is functional without the network; `main` treats a failed
//! join as a degraded boot, not a fatal one.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real station join via `esp_idf_svc::wifi`.
//! - **all other targets**: only validation and [`Credentials`] compile,
//!   which is all the host tests need.

use core::fmt;

#[cfg(target_os = "espidf")]
use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

/// Station credentials, validated at construction so the join path never
/// sees a malformed pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|()| ConnectivityError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password)
            .map_err(|()| ConnectivityError::InvalidPassword)?;
        Ok(Self { ssid: s, password: p })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }
}

// ───────────────────────────────────────────────────────────────
// Station join (blocking, boot-time only)
// ───────────────────────────────────────────────────────────────

/// Join attempts before the boot gives up and continues offline.
#[cfg(target_os = "espidf")]
const JOIN_ATTEMPTS: u32 = 3;

/// Bring the station up and block until the netif has an address,
/// retrying a few times before reporting failure.
///
/// NVS flash is already initialised by [`NvsStore::new`], so the WiFi
/// driver runs without its own partition handle.
///
/// [`NvsStore::new`]: crate::adapters::nvs::NvsStore::new
#[cfg(target_os = "espidf")]
pub fn join(
    modem: esp_idf_svc::hal::modem::Modem,
    sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    creds: &Credentials,
) -> anyhow::Result<Box<esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>>> {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::wifi::{
        AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
    };

    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), None)?, sysloop)?;

    let auth_method = if creds.password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: creds.ssid.clone(),
        password: creds.password.clone(),
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;

    let mut attempt = 1;
    loop {
        info!(
            "WiFi: connecting to '{}' (attempt {}/{})",
            creds.ssid(),
            attempt,
            JOIN_ATTEMPTS
        );
        match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
            Ok(()) => break,
            Err(e) if attempt < JOIN_ATTEMPTS => {
                warn!("WiFi: attempt {} failed ({}), retrying", attempt, e);
                FreeRtos::delay_ms(2_000);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let ip = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi: connected, ip={}", ip.ip);

    Ok(Box::new(wifi))
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_ssid() {
        assert_eq!(
            Credentials::new("", "password123"),
            Err(ConnectivityError::InvalidSsid)
        );
    }

    #[test]
    fn rejects_oversized_ssid() {
        let long = "s".repeat(33);
        assert_eq!(
            Credentials::new(&long, "password123"),
            Err(ConnectivityError::InvalidSsid)
        );
        assert!(Credentials::new(&"s".repeat(32), "password123").is_ok());
    }

    #[test]
    fn rejects_non_printable_ssid() {
        assert_eq!(
            Credentials::new("bad\u{7}name", "password123"),
            Err(ConnectivityError::InvalidSsid)
        );
    }

    #[test]
    fn password_length_bounds() {
        assert_eq!(
            Credentials::new("Net", "short"),
            Err(ConnectivityError::InvalidPassword)
        );
        assert_eq!(
            Credentials::new("Net", &"p".repeat(65)),
            Err(ConnectivityError::InvalidPassword)
        );
        assert!(Credentials::new("Net", "exactly8").is_ok());
        assert!(Credentials::new("Net", &"p".repeat(64)).is_ok());
    }

    #[test]
    fn accepts_open_network() {
        let creds = Credentials::new("OpenCafe", "").unwrap();
        assert_eq!(creds.ssid(), "OpenCafe");
    }
}

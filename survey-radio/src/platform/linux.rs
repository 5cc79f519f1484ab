//! Linux radio access through the `iw` tool and `/proc/net/wireless`.
//!
//! `iw dev <iface> link` reports the association, `/proc/net/wireless` the
//! link quality on the 0..=70 scale and `iw dev <iface> scan` the visible
//! access points. Scanning requires `CAP_NET_ADMIN`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use survey_common::link::quality_from_rssi;
use survey_common::AssociatedLink;

use crate::{
    error::RadioError,
    radio::{LinkStateProvider, NeighborScan, VisibleAccessPoint},
};

const PROC_NET_WIRELESS: &str = "/proc/net/wireless";

pub struct IwRadio {
    program: String,
}

impl IwRadio {
    pub fn new() -> Self {
        Self {
            program: "iw".to_string(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, RadioError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| RadioError::Command {
                command: format!("{} {}", self.program, args.join(" ")),
                source,
            })
    }
}

impl Default for IwRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStateProvider for IwRadio {
    fn query_link(&mut self, interface: &str) -> Result<Option<AssociatedLink>, RadioError> {
        let output = self.run(&["dev", interface, "link"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RadioError::QueryFailed(format!(
                "iw exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut link = match parse_iw_link(&stdout) {
            Some(link) => link,
            None => return Ok(None),
        };

        link.quality = fs::read_to_string(PROC_NET_WIRELESS)
            .ok()
            .and_then(|table| parse_proc_wireless_quality(&table, interface))
            .unwrap_or_else(|| quality_from_rssi(link.rssi));

        Ok(Some(link))
    }
}

impl NeighborScan for IwRadio {
    fn scan(
        &mut self,
        interface: &str,
        filter: &dyn Fn(&VisibleAccessPoint) -> bool,
    ) -> Result<Vec<VisibleAccessPoint>, RadioError> {
        let output = self.run(&["dev", interface, "scan"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RadioError::ScanFailed(format!(
                "iw exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_iw_scan(&stdout)
            .into_iter()
            .filter(|ap| filter(ap))
            .collect())
    }
}

/// Check that `interface` exists and is driven by the wireless stack.
pub fn is_wireless_interface(interface: &str) -> bool {
    if interface.is_empty() || interface.contains('/') {
        return false;
    }
    let base = Path::new("/sys/class/net").join(interface);
    base.join("wireless").exists() || base.join("phy80211").exists()
}

pub type PlatformRadio = IwRadio;

/// Parse `iw dev <iface> link`. Returns `None` for "Not connected.".
///
/// Quality is left at 0; it is not part of the `iw` output.
pub fn parse_iw_link(output: &str) -> Option<AssociatedLink> {
    let mut lines = output.lines();

    // "Connected to 00:11:22:33:44:55 (on wlan0)"
    let header = lines.next()?.trim();
    let bssid = header
        .strip_prefix("Connected to ")?
        .split_whitespace()
        .next()?
        .to_uppercase();

    let mut link = AssociatedLink {
        ssid: String::new(),
        bssid,
        rssi: 0,
        quality: 0,
        frequency: 0.0,
        bitrate: 0.0,
    };

    for line in lines {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("SSID:") {
            link.ssid = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("freq:") {
            link.frequency = parse_freq_ghz(rest).unwrap_or(0.0);
        } else if let Some(rest) = line.strip_prefix("signal:") {
            link.rssi = parse_signal_dbm(rest).unwrap_or(0);
        } else if let Some(rest) = line.strip_prefix("tx bitrate:") {
            link.bitrate = rest
                .split_whitespace()
                .next()
                .and_then(|rate| rate.parse().ok())
                .unwrap_or(0.0);
        }
    }

    Some(link)
}

/// Link quality of `interface` from the `/proc/net/wireless` table.
///
/// ```text
/// Inter-| sta-|   Quality        |   Discarded packets
///  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
///  wlan0: 0000   54.  -56.  -256        0      0      0      0     17        0
/// ```
pub fn parse_proc_wireless_quality(table: &str, interface: &str) -> Option<i32> {
    table.lines().find_map(|line| {
        let (name, rest) = line.trim().split_once(':')?;
        if name != interface {
            return None;
        }
        let quality = rest.split_whitespace().nth(1)?;
        quality.trim_end_matches('.').parse().ok()
    })
}

#[derive(Default)]
struct BssStanza {
    bssid: Option<String>,
    ssid: Option<String>,
    rssi: Option<i32>,
    frequency: Option<f64>,
}

impl BssStanza {
    fn flush(self) -> Option<VisibleAccessPoint> {
        let rssi = self.rssi?;
        Some(VisibleAccessPoint {
            bssid: self.bssid?,
            ssid: self.ssid.unwrap_or_default(),
            rssi,
            quality: quality_from_rssi(rssi),
            frequency: self.frequency?,
        })
    }
}

/// Parse `iw dev <iface> scan` into one entry per BSS stanza, in output order.
///
/// Stanzas without a signal or frequency line are dropped.
pub fn parse_iw_scan(output: &str) -> Vec<VisibleAccessPoint> {
    let mut results = Vec::new();
    let mut current: Option<BssStanza> = None;

    for line in output.lines() {
        // "BSS aa:bb:cc:dd:ee:ff(on wlan0) -- associated"
        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(stanza) = current.take() {
                results.extend(stanza.flush());
            }

            let mac_end = rest
                .find(|c: char| !c.is_ascii_hexdigit() && c != ':')
                .unwrap_or(rest.len());
            let mac = &rest[..mac_end];

            if mac.len() == 17 {
                current = Some(BssStanza {
                    bssid: Some(mac.to_uppercase()),
                    ..Default::default()
                });
            }
            continue;
        }

        let trimmed = line.trim();
        if let Some(ref mut stanza) = current {
            if let Some(rest) = trimmed.strip_prefix("SSID:") {
                stanza.ssid = Some(rest.trim().to_string());
            } else if let Some(rest) = trimmed.strip_prefix("signal:") {
                stanza.rssi = parse_signal_dbm(rest);
            } else if let Some(rest) = trimmed.strip_prefix("freq:") {
                stanza.frequency = parse_freq_ghz(rest);
            }
        }
    }

    if let Some(stanza) = current.take() {
        results.extend(stanza.flush());
    }

    results
}

/// "-52.00 dBm" -> -52
fn parse_signal_dbm(s: &str) -> Option<i32> {
    let value: f64 = s.split_whitespace().next()?.parse().ok()?;
    Some(value.round() as i32)
}

/// "2412" or "2412.0" (MHz) -> 2.412
fn parse_freq_ghz(s: &str) -> Option<f64> {
    let mhz: f64 = s.split_whitespace().next()?.parse().ok()?;
    Some(mhz / 1000.0)
}

use std::fmt;

use serde::Serialize;

/// Upper bound of the link quality scale reported by wireless-tools.
pub const MAX_LINK_QUALITY: i32 = 70;

/// Metrics of an established association with an access point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociatedLink {
    pub ssid: String,
    pub bssid: String,
    /// dBm
    pub rssi: i32,
    /// 0..=70
    pub quality: i32,
    /// GHz
    pub frequency: f64,
    /// Mbps
    pub bitrate: f64,
}

/// One poll of the radio interface.
///
/// Metrics only exist while the interface is associated, so an unassociated
/// snapshot reports zero values for every field except the interface name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSnapshot {
    interface: String,
    link: Option<AssociatedLink>,
}

impl LinkSnapshot {
    pub fn unassociated(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
            link: None,
        }
    }

    pub fn associated(interface: &str, mut link: AssociatedLink) -> Self {
        link.bssid = link.bssid.to_uppercase();
        Self {
            interface: interface.to_string(),
            link: Some(link),
        }
    }

    pub fn is_associated(&self) -> bool {
        self.link.is_some()
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn ssid(&self) -> &str {
        self.link.as_ref().map(|l| l.ssid.as_str()).unwrap_or("")
    }

    pub fn bssid(&self) -> &str {
        self.link.as_ref().map(|l| l.bssid.as_str()).unwrap_or("")
    }

    pub fn rssi(&self) -> i32 {
        self.link.as_ref().map(|l| l.rssi).unwrap_or(0)
    }

    pub fn quality(&self) -> i32 {
        self.link.as_ref().map(|l| l.quality).unwrap_or(0)
    }

    pub fn frequency(&self) -> f64 {
        self.link.as_ref().map(|l| l.frequency).unwrap_or(0.0)
    }

    pub fn bitrate(&self) -> f64 {
        self.link.as_ref().map(|l| l.bitrate).unwrap_or(0.0)
    }

    /// 802.11 channel of the associated frequency, 0 when unassociated.
    pub fn channel(&self) -> u16 {
        freq_to_channel((self.frequency() * 1000.0).round() as u32)
    }
}

impl fmt::Display for LinkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SSID: {}\tBSSID: {}\tAssociated: {}",
            self.ssid(),
            self.bssid(),
            self.is_associated()
        )?;
        writeln!(
            f,
            "RSSI: {}\tQuality: {}/{}\tFrequency: {} GHz",
            self.rssi(),
            self.quality(),
            MAX_LINK_QUALITY,
            self.frequency()
        )?;
        write!(f, "Channel: {}\tBitrate: {} Mbps", self.channel(), self.bitrate())
    }
}

/// Convert a frequency in MHz to an 802.11 channel number.
pub fn freq_to_channel(freq_mhz: u32) -> u16 {
    match freq_mhz {
        2412..=2472 => ((freq_mhz - 2407) / 5) as u16,
        2484 => 14,
        5170..=5885 => ((freq_mhz - 5000) / 5) as u16,
        5955..=7115 => ((freq_mhz - 5950) / 5) as u16,
        _ => 0,
    }
}

/// Quality on the 0..=70 scale derived from RSSI, as wireless-tools does
/// for mac80211 drivers.
pub fn quality_from_rssi(rssi: i32) -> i32 {
    (rssi + 110).clamp(0, MAX_LINK_QUALITY)
}

//! Receiver configuration.
//!
//! Every struct here has a `Default` matching the stock receiver profile: CSI with all
//! training fields enabled, station parked on channel 5 with the secondary channel below,
//! power save off, and none of the optional print paths.

use crate::error::{Error, Result};

/// Primary channel the receiver parks on unless told otherwise.
pub const DEFAULT_CHANNEL: u8 = 5;
/// Interval between channel hops when hopping is enabled.
pub const DEFAULT_HOP_INTERVAL_MS: u64 = 4000;
/// Hopping walks channels `1..HOP_WRAP_CHANNEL`.
pub const HOP_WRAP_CHANNEL: u8 = 11;

/// CSI Collection Parameters handed to the WiFi driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSIConfig {
    /// Enable to receive legacy long training field (lltf) data.
    pub lltf_enabled: bool,
    /// Enable to receive HT long training field (htltf) data.
    pub htltf_enabled: bool,
    /// Enable to receive space time block code HT long training field (stbc-htltf2) data.
    pub stbc_htltf2_enabled: bool,
    /// Generate htltf data by averaging lltf and ht_ltf data when receiving an HT packet.
    pub ltf_merge_enabled: bool,
    /// Smooth adjacent sub-carriers with the channel filter.
    pub channel_filter_enabled: bool,
    /// Scale CSI data manually by `shift` instead of automatically.
    pub manu_scale: bool,
    /// Manual left shift bits, 0~15. Only used with `manu_scale`.
    pub shift: u8,
    /// Enable to dump 802.11 ACK frames.
    pub dump_ack_en: bool,
}

impl Default for CSIConfig {
    fn default() -> Self {
        Self {
            lltf_enabled: true,
            htltf_enabled: true,
            stbc_htltf2_enabled: true,
            ltf_merge_enabled: true,
            channel_filter_enabled: true,
            manu_scale: false,
            shift: 0,
            dump_ack_en: false,
        }
    }
}

impl CSIConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shift > 15 {
            return Err(Error::ConfigError("CSI shift must be within 0..=15"));
        }
        Ok(())
    }
}

/// Position of the 40 MHz secondary channel relative to the primary.
/// Discriminants match the driver's `wifi_second_chan_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SecondaryChannel {
    None = 0,
    Above = 1,
    Below = 2,
}

/// Radio parameters applied once the station is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    /// Primary channel, 1..=13.
    pub channel: u8,
    pub secondary_channel: SecondaryChannel,
    /// Modem power save. Timestamps in the CSI metadata are only precise with it off.
    pub power_save: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            secondary_channel: SecondaryChannel::Below,
            power_save: false,
        }
    }
}

impl RadioConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=13).contains(&self.channel) {
            return Err(Error::ConfigError("primary channel must be within 1..=13"));
        }
        Ok(())
    }
}

/// Optional behaviour of the receiver, all off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverOptions {
    /// Emit a `CSI_RIG` line describing the data layout ahead of every record.
    pub print_csi_type: bool,
    /// Print every overheard management frame. Experimental.
    pub promiscuous_print: bool,
    /// Walk channels 1 to 10 instead of staying on the configured channel.
    pub channel_hopping: bool,
    pub hop_interval_ms: u64,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            print_csi_type: false,
            promiscuous_print: false,
            channel_hopping: false,
            hop_interval_ms: DEFAULT_HOP_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_profile() {
        let radio = RadioConfig::default();
        assert_eq!(radio.channel, 5);
        assert_eq!(radio.secondary_channel, SecondaryChannel::Below);
        assert!(!radio.power_save);

        let csi = CSIConfig::default();
        assert!(csi.lltf_enabled && csi.htltf_enabled && csi.stbc_htltf2_enabled);
        assert!(csi.ltf_merge_enabled && csi.channel_filter_enabled);
        assert!(!csi.manu_scale);
        assert_eq!(csi.shift, 0);

        let opts = ReceiverOptions::default();
        assert!(!opts.channel_hopping && !opts.promiscuous_print && !opts.print_csi_type);
        assert_eq!(opts.hop_interval_ms, 4000);
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let mut radio = RadioConfig::default();
        radio.channel = 0;
        assert!(matches!(radio.validate(), Err(Error::ConfigError(_))));
        radio.channel = 14;
        assert!(radio.validate().is_err());
        radio.channel = 13;
        assert!(radio.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_shift() {
        let csi = CSIConfig {
            manu_scale: true,
            shift: 16,
            ..Default::default()
        };
        assert!(csi.validate().is_err());
    }
}

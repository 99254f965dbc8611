use heapless::Vec;

use crate::error::{Error, Result};

/// Largest CSI buffer the driver produces (HT40 with STBC).
pub const MAX_CSI_LEN: usize = 612;

// CSI Received Packet Radio Metadata Header Value Interpretations

// rssi: Received Signal Strength Indicator(RSSI) of packet. unit: dBm.
// rate: PHY rate encoding of the packet. Only valid for non HT(11bg) packet.
// sig_mode: Protocol of the received packet, 0: non HT(11bg) packet; 1: HT(11n) packet; 3: VHT(11ac) packet.
// mcs: Modulation Coding Scheme. If is HT(11n) packet, shows the modulation, range from 0 to 76(MSC0 ~ MCS76).
// cwb: Channel Bandwidth of the packet. 0: 20MHz; 1: 40MHz.
// smoothing: 1 if channel estimate smoothing is recommended, 0 if only per-carrier independent estimates are.
// not_sounding: 0 for a sounding PPDU, 1 otherwise.
// aggregation: 0: MPDU packet; 1: AMPDU packet
// stbc: Space Time Block Code(STBC). 0: non STBC packet; 1: STBC packet.
// fec_coding: Set for 11n packets which are LDPC.
// sgi: Short Guide Interval (SGI). 0: Long GI; 1: Short GI.
// noise_floor: noise floor of Radio Frequency Module(RF). unit: dBm.
// ampdu_cnt: The number of subframes aggregated in AMPDU.
// channel: Primary channel on which this packet is received.
// secondary_channel: 0: none; 1: above; 2: below.
// timestamp: Local receive time in microseconds, precise only if modem/light sleep is off.
// ant: 0: WiFi antenna 0; 1: WiFi antenna 1.
// sig_len: Length of packet including Frame Check Sequence(FCS).
// rx_state: 0: no error; others: error numbers which are not public.

/// A mapping of the different possible recieved CSI data formats supported by the Espressif WiFi driver.
/// The driver documents them here:
/// <https://docs.espressif.com/projects/esp-idf/en/latest/esp32s3/api-guides/wifi.html#wi-fi-channel-state-information>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RxCSIFmt {
    /// Sec Chnl = None, Sig Mode = non-Ht, Chnl BW = 20MHz, non-STBC
    Bw20,
    /// Sec Chnl = None, Sig Mode = Ht, Chnl BW = 20MHz, non-STBC
    HtBw20,
    /// Sec Chnl = None, Sig Mode = Ht, Chnl BW = 20MHz, STBC
    HtBw20Stbc,
    /// Sec Chnl = Below, Sig Mode = non-Ht, Chnl BW = 20MHz, non-STBC
    SecbBw20,
    /// Sec Chnl = Below, Sig Mode = Ht, Chnl BW = 20MHz, non-STBC
    SecbHtBw20,
    /// Sec Chnl = Below, Sig Mode = Ht, Chnl BW = 20MHz, STBC
    SecbHtBw20Stbc,
    /// Sec Chnl = Below, Sig Mode = Ht, Chnl BW = 40MHz, non-STBC
    SecbHtBw40,
    /// Sec Chnl = Below, Sig Mode = Ht, Chnl BW = 40MHz, STBC
    SecbHtBw40Stbc,
    /// Sec Chnl = Above, Sig Mode = non-Ht, Chnl BW = 20MHz, non-STBC
    SecaBw20,
    /// Sec Chnl = Above, Sig Mode = Ht, Chnl BW = 20MHz, non-STBC
    SecaHtBw20,
    /// Sec Chnl = Above, Sig Mode = Ht, Chnl BW = 20MHz, STBC
    SecaHtBw20Stbc,
    /// Sec Chnl = Above, Sig Mode = Ht, Chnl BW = 40MHz, non-STBC
    SecaHtBw40,
    /// Sec Chnl = Above, Sig Mode = Ht, Chnl BW = 40MHz, STBC
    SecaHtBw40Stbc,
    /// Not a defined format
    #[default]
    Undefined,
}

impl RxCSIFmt {
    /// Derives the format from the packet's secondary channel, signal mode, bandwidth and STBC flag.
    /// Without a secondary channel the bandwidth is always 20MHz and is not consulted.
    pub fn classify(secondary_channel: u32, sig_mode: u32, bandwidth: u32, stbc: u32) -> Self {
        use RxCSIFmt::*;
        match (secondary_channel, sig_mode, bandwidth, stbc) {
            // None
            (0, 0, _, _) => Bw20,
            (0, 1, _, 0) => HtBw20,
            (0, 1, _, 1) => HtBw20Stbc,
            // Above
            (1, 0, _, _) => SecaBw20,
            (1, 1, 0, 0) => SecaHtBw20,
            (1, 1, 0, 1) => SecaHtBw20Stbc,
            (1, 1, 1, 0) => SecaHtBw40,
            (1, 1, 1, 1) => SecaHtBw40Stbc,
            // Below
            (2, 0, _, _) => SecbBw20,
            (2, 1, 0, 0) => SecbHtBw20,
            (2, 1, 0, 1) => SecbHtBw20Stbc,
            (2, 1, 1, 0) => SecbHtBw40,
            (2, 1, 1, 1) => SecbHtBw40Stbc,
            _ => Undefined,
        }
    }
}

/// The driver reports RSSI and noise floor as raw 8 bit fields without sign extension.
pub fn normalize_dbm(raw: i32) -> i32 {
    if raw > 127 {
        raw - 256
    } else {
        raw
    }
}

/// CSI Received Packet w/ Radio Metadata
#[derive(Debug, Clone, Default)]
pub struct CSIDataPacket {
    /// MAC address of the sender.
    pub mac: [u8; 6],
    /// Received Signal Strength Indicator.
    pub rssi: i32,
    /// PHY rate encoding of the packet. Only valid for non HT(11bg) packet.
    pub rate: u32,
    /// Protocol of the received packet.
    /// 0: non HT(11bg) packet; 1: HT(11n) packet; 3: VHT(11ac) packet.
    pub sig_mode: u32,
    /// Modulation Coding Scheme.
    pub mcs: u32,
    /// Channel Bandwidth of the packet.
    /// 0: 20MHz; 1: 40MHz.
    pub bandwidth: u32,
    pub smoothing: u32,
    pub not_sounding: u32,
    /// 0: MPDU packet; 1: AMPDU packet
    pub aggregation: u32,
    /// 0: non STBC packet; 1: STBC packet.
    pub stbc: u32,
    pub fec_coding: u32,
    /// 0: Long GI; 1: Short GI.
    pub sgi: u32,
    /// Noise floor of Radio Frequency Module(RF), dBm.
    pub noise_floor: i32,
    /// The number of subframes aggregated in AMPDU.
    pub ampdu_cnt: u32,
    /// Primary channel on which the Packet was Received.
    pub channel: u32,
    /// 0: none; 1: above; 2: below.
    pub secondary_channel: u32,
    /// Local Timestamp of Recieved Packet (microseconds).
    pub timestamp: u32,
    /// 0: WiFi antenna 0; 1: WiFi antenna 1.
    pub antenna: u32,
    /// Length of packet including Frame Check Sequence(FCS).
    pub sig_len: u32,
    /// 0: no error; others: error numbers which are not public.
    pub rx_state: u32,
    /// The first four bytes of `csi_data` are invalid due to a hardware limitation.
    pub first_word_invalid: bool,
    /// Data format of the recieved CSI.
    pub data_format: RxCSIFmt,
    /// Raw CSI data, largest case size is 612 bytes.
    pub csi_data: Vec<i8, MAX_CSI_LEN>,
}

impl CSIDataPacket {
    /// Copies the driver's CSI buffer into the packet.
    /// An empty buffer is a malformed callback and is rejected, as is one larger than any
    /// format the driver defines.
    pub fn set_csi_data(&mut self, data: &[i8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::SystemError("empty CSI buffer"));
        }
        self.csi_data.clear();
        self.csi_data
            .extend_from_slice(data)
            .map_err(|_| Error::SystemError("CSI buffer exceeds 612 bytes"))
    }

    /// Updates `data_format` from the radio metadata.
    pub fn csi_fmt_from_params(&mut self) {
        self.data_format =
            RxCSIFmt::classify(self.secondary_channel, self.sig_mode, self.bandwidth, self.stbc);
    }

    pub fn mac(&self) -> &[u8; 6] {
        &self.mac
    }
    pub fn csi_data_len(&self) -> u16 {
        self.csi_data.len() as u16
    }
    pub fn csi_data(&self) -> &[i8] {
        self.csi_data.as_slice()
    }
}

#[cfg(feature = "firmware")]
impl CSIDataPacket {
    /// Captures a sample handed to the CSI callback. The driver's buffer is copied so
    /// nothing here outlives the callback.
    pub(crate) fn from_csi_info(info: &esp_wifi::wifi::wifi_csi_info_t) -> Result<Self> {
        if info.buf.is_null() {
            return Err(Error::SystemError("null CSI buffer"));
        }
        let rx_ctrl = &info.rx_ctrl;
        let mut packet = CSIDataPacket {
            mac: info.mac,
            rssi: normalize_dbm(rx_ctrl.rssi()),
            rate: rx_ctrl.rate(),
            sig_mode: rx_ctrl.sig_mode(),
            mcs: rx_ctrl.mcs(),
            bandwidth: rx_ctrl.cwb(),
            smoothing: rx_ctrl.smoothing(),
            not_sounding: rx_ctrl.not_sounding(),
            aggregation: rx_ctrl.aggregation(),
            stbc: rx_ctrl.stbc(),
            fec_coding: rx_ctrl.fec_coding(),
            sgi: rx_ctrl.sgi(),
            noise_floor: normalize_dbm(rx_ctrl.noise_floor()),
            ampdu_cnt: rx_ctrl.ampdu_cnt(),
            channel: rx_ctrl.channel(),
            secondary_channel: rx_ctrl.secondary_channel(),
            timestamp: rx_ctrl.timestamp(),
            antenna: rx_ctrl.ant(),
            sig_len: rx_ctrl.sig_len(),
            rx_state: rx_ctrl.rx_state(),
            first_word_invalid: info.first_word_invalid,
            data_format: RxCSIFmt::Undefined,
            csi_data: Vec::new(),
        };
        // SAFETY: the driver guarantees `buf` holds `len` bytes for the duration of the callback.
        let data = unsafe { core::slice::from_raw_parts(info.buf as *const i8, info.len as usize) };
        packet.set_csi_data(data)?;
        packet.csi_fmt_from_params();
        Ok(packet)
    }

    /// Radio metadata of an overheard frame. The CSI buffer is left empty.
    pub(crate) fn from_promiscuous(info: &esp_wifi::wifi::PromiscuousPkt<'_>) -> Self {
        let rx_cntl = &info.rx_cntl;
        CSIDataPacket {
            rssi: normalize_dbm(rx_cntl.rssi),
            rate: rx_cntl.rate,
            sig_mode: rx_cntl.sig_mode,
            mcs: rx_cntl.mcs,
            bandwidth: rx_cntl.cwb,
            smoothing: rx_cntl.smoothing,
            not_sounding: rx_cntl.not_sounding,
            aggregation: rx_cntl.aggregation,
            stbc: rx_cntl.stbc,
            fec_coding: rx_cntl.fec_coding,
            sgi: rx_cntl.sgi,
            noise_floor: normalize_dbm(rx_cntl.noise_floor),
            ampdu_cnt: rx_cntl.ampdu_cnt,
            channel: rx_cntl.channel,
            secondary_channel: rx_cntl.secondary_channel,
            timestamp: rx_cntl.timestamp,
            antenna: rx_cntl.ant,
            sig_len: rx_cntl.sig_len,
            rx_state: rx_cntl.rx_state,
            ..Default::default()
        }
    }
}

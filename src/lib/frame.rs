//! Experimental promiscuous print path.
//!
//! Dumps overheard management frames with their radio metadata. It is not needed for CSI
//! collection and stays disabled unless `ReceiverOptions::promiscuous_print` is set.

use core::fmt::{self, Write};

use crate::csi::CSIDataPacket;

/// Fixed part of an 802.11 management frame header.
pub const MGMT_HEADER_LEN: usize = 24;

/// Frame classes reported by the driver's promiscuous callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Management,
    Control,
    Data,
    Misc,
}

impl PacketType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => PacketType::Management,
            1 => PacketType::Control,
            2 => PacketType::Data,
            _ => PacketType::Misc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementHeader {
    pub frame_control: u16,
    pub duration: u16,
    /// addr1
    pub receiver: [u8; 6],
    /// addr2
    pub sender: [u8; 6],
    /// addr3, the BSSID for management frames
    pub filter: [u8; 6],
    pub sequence_control: u16,
}

impl ManagementHeader {
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < MGMT_HEADER_LEN {
            return None;
        }
        let addr = |at: usize| -> [u8; 6] {
            let mut out = [0u8; 6];
            out.copy_from_slice(&frame[at..at + 6]);
            out
        };
        Some(Self {
            frame_control: u16::from_le_bytes([frame[0], frame[1]]),
            duration: u16::from_le_bytes([frame[2], frame[3]]),
            receiver: addr(4),
            sender: addr(10),
            filter: addr(16),
            sequence_control: u16::from_le_bytes([frame[22], frame[23]]),
        })
    }
}

/// Uppercase MAC rendering used by the frame dump.
struct UpperMac<'a>(&'a [u8; 6]);

impl fmt::Display for UpperMac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

pub fn write_rx_line<W: Write>(w: &mut W, meta: &CSIDataPacket) -> fmt::Result {
    writeln!(
        w,
        "RX: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        meta.rssi,
        meta.rate,
        meta.sig_mode,
        meta.mcs,
        meta.bandwidth,
        meta.smoothing,
        meta.not_sounding,
        meta.aggregation,
        meta.stbc,
        meta.fec_coding,
        meta.sgi,
        meta.noise_floor,
        meta.ampdu_cnt,
        meta.channel,
        meta.secondary_channel,
        meta.timestamp,
        meta.antenna,
        meta.sig_len,
        meta.rx_state,
    )
}

/// Writes the dump for one overheard frame. `meta` carries only radio metadata, its CSI
/// buffer is unused.
pub fn write_frame<W: Write>(
    w: &mut W,
    packet_type: PacketType,
    meta: &CSIDataPacket,
    frame: &[u8],
) -> fmt::Result {
    if packet_type != PacketType::Management {
        return writeln!(w, "Not management");
    }
    let Some(header) = ManagementHeader::parse(frame) else {
        log::warn!("Dropping truncated management frame ({} bytes)", frame.len());
        return Ok(());
    };

    writeln!(w, "Sender MAC Address: {}", UpperMac(&header.sender))?;
    write_rx_line(w, meta)?;
    w.write_char('\n')?;

    // Display valid frames only
    if meta.sig_mode > 0 {
        writeln!(
            w,
            "Rx Data packet from {} to {}",
            UpperMac(&header.sender),
            UpperMac(&header.receiver)
        )?;
        let len = (meta.sig_len as usize).min(frame.len());
        for byte in &frame[..len] {
            write!(w, "{:02x} ", byte)?;
        }
        write_rx_line(w, meta)?;
        w.write_str("\n\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn beacon() -> [u8; 28] {
        let mut frame = [0u8; 28];
        frame[0] = 0x80;
        frame[2] = 0x3a;
        frame[3] = 0x01;
        frame[4..10].copy_from_slice(&[0xff; 6]);
        frame[10..16].copy_from_slice(&[0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
        frame[16..22].copy_from_slice(&[0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
        frame[22] = 0x10;
        frame[23] = 0x02;
        frame
    }

    #[test]
    fn parses_fixed_header() {
        let header = ManagementHeader::parse(&beacon()).unwrap();
        assert_eq!(header.frame_control, 0x0080);
        assert_eq!(header.duration, 0x013a);
        assert_eq!(header.receiver, [0xff; 6]);
        assert_eq!(header.sender, [0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
        assert_eq!(header.sequence_control, 0x0210);
        assert!(ManagementHeader::parse(&beacon()[..23]).is_none());
    }

    #[test]
    fn skips_non_management_frames() {
        let mut out: String<64> = String::new();
        write_frame(&mut out, PacketType::Data, &CSIDataPacket::default(), &beacon()).unwrap();
        assert_eq!(out.as_str(), "Not management\n");
        assert_eq!(PacketType::from_raw(2), PacketType::Data);
        assert_eq!(PacketType::from_raw(7), PacketType::Misc);
    }

    #[test]
    fn legacy_frame_prints_sender_and_metadata() {
        let meta = CSIDataPacket {
            rssi: -70,
            channel: 6,
            sig_len: 28,
            ..Default::default()
        };
        let mut out: String<256> = String::new();
        write_frame(&mut out, PacketType::Management, &meta, &beacon()).unwrap();
        assert_eq!(
            out.as_str(),
            "Sender MAC Address: A0:B1:C2:D3:E4:F5\nRX: -70,0,0,0,0,0,0,0,0,0,0,0,0,6,0,0,0,28,0\n\n"
        );
    }

    #[test]
    fn ht_frame_adds_payload_dump() {
        let meta = CSIDataPacket {
            sig_mode: 1,
            sig_len: 4,
            ..Default::default()
        };
        let mut out: String<512> = String::new();
        write_frame(&mut out, PacketType::Management, &meta, &beacon()).unwrap();
        assert!(out.contains("Rx Data packet from A0:B1:C2:D3:E4:F5 to FF:FF:FF:FF:FF:FF\n"));
        assert!(out.contains("\n80 00 3a 01 RX: "));
        assert!(out.ends_with("\n\n\n"));
    }

    #[test]
    fn dump_is_clamped_to_captured_bytes() {
        let meta = CSIDataPacket {
            sig_mode: 1,
            sig_len: 1500,
            ..Default::default()
        };
        let mut out: String<1024> = String::new();
        write_frame(&mut out, PacketType::Management, &meta, &beacon()).unwrap();
        let (dump, _) = out.lines().nth(4).unwrap().split_once("RX: ").unwrap();
        assert_eq!(dump.split_whitespace().count(), 28);
    }

    #[test]
    fn overflowing_writer_reports_error() {
        let mut out: String<16> = String::new();
        let meta = CSIDataPacket::default();
        assert!(write_frame(&mut out, PacketType::Management, &meta, &beacon()).is_err());
    }
}

//! CSV rendering of CSI samples.
//!
//! One line per sample, columns in the order of [`HEADER`]. The `data` column is the raw,
//! signed CSI buffer rendered as a quoted, bracketed list so that CSV readers keep it in a
//! single cell:
//!
//! ```text
//! CSI_DATA,0,24:0a:c4:00:00:01,-42,11,1,7,0,1,1,0,0,0,0,-93,0,5,2,123456,0,90,0,4,0,"[3,-4,5,-6]"
//! ```

use core::cell::Cell;
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::csi::CSIDataPacket;

/// Column header, emitted once ahead of the first record.
pub const HEADER: &str = "type,id,mac,rssi,rate,sig_mode,mcs,bandwidth,smoothing,not_sounding,aggregation,stbc,fec_coding,sgi,noise_floor,ampdu_cnt,channel,secondary_channel,local_timestamp,ant,sig_len,rx_state,len,first_word,data";

/// Log banner announcing the start of the record stream.
pub const BANNER: &str = "================ CSI RECV ================";

/// Wrapper rendering a MAC address as lowercase colon separated hex.
pub struct Mac<'a>(pub &'a [u8; 6]);

impl fmt::Display for Mac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Counts emitted records. The count doubles as the record id and decides when the
/// header is due.
pub struct SampleCounter {
    count: Mutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl SampleCounter {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Returns the id for the next record and advances the counter.
    pub fn next_id(&self) -> u32 {
        self.count.lock(|count| {
            let id = count.get();
            count.set(id.wrapping_add(1));
            id
        })
    }

    pub fn current(&self) -> u32 {
        self.count.lock(|count| count.get())
    }
}

impl Default for SampleCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_header<W: Write>(w: &mut W) -> fmt::Result {
    writeln!(w, "{}", HEADER)
}

/// Writes one `CSI_DATA` line, terminated by a newline.
pub fn write_record<W: Write>(w: &mut W, id: u32, packet: &CSIDataPacket) -> fmt::Result {
    write!(
        w,
        "CSI_DATA,{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        id,
        Mac(packet.mac()),
        packet.rssi,
        packet.rate,
        packet.sig_mode,
        packet.mcs,
        packet.bandwidth,
        packet.smoothing,
        packet.not_sounding,
        packet.aggregation,
        packet.stbc,
        packet.fec_coding,
        packet.sgi,
        packet.noise_floor,
        packet.ampdu_cnt,
        packet.channel,
        packet.secondary_channel,
        packet.timestamp,
        packet.antenna,
        packet.sig_len,
        packet.rx_state,
    )?;
    write!(
        w,
        ",{},{},\"[",
        packet.csi_data.len(),
        packet.first_word_invalid as u8
    )?;
    for (i, value) in packet.csi_data.iter().enumerate() {
        if i > 0 {
            w.write_char(',')?;
        }
        write!(w, "{}", value)?;
    }
    w.write_str("]\"\n")
}

/// Writes the `CSI_RIG` line describing how the sample's buffer is laid out.
pub fn write_csi_type<W: Write>(w: &mut W, packet: &CSIDataPacket) -> fmt::Result {
    writeln!(
        w,
        "CSI_RIG,{},{},{},{},{},{},{},{:?}",
        Mac(packet.mac()),
        packet.channel,
        packet.secondary_channel,
        packet.sig_mode,
        packet.bandwidth,
        packet.stbc,
        packet.csi_data.len(),
        packet.data_format,
    )
}

/// Writes a full sample: the header if this is the first record, the optional type line,
/// then the record itself. Returns the id assigned to the record.
pub fn emit<W: Write>(
    w: &mut W,
    counter: &SampleCounter,
    packet: &CSIDataPacket,
    with_type: bool,
) -> Result<u32, fmt::Error> {
    if with_type {
        write_csi_type(w, packet)?;
    }
    let id = counter.next_id();
    if id == 0 {
        log::info!("{}", BANNER);
        write_header(w)?;
    }
    write_record(w, id, packet)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csi::{normalize_dbm, RxCSIFmt};
    use heapless::String;

    fn sample() -> CSIDataPacket {
        let mut packet = CSIDataPacket {
            mac: [0x24, 0x0a, 0xc4, 0x00, 0x00, 0x01],
            rssi: -42,
            rate: 11,
            sig_mode: 1,
            mcs: 7,
            bandwidth: 0,
            smoothing: 1,
            not_sounding: 1,
            aggregation: 0,
            stbc: 0,
            fec_coding: 0,
            sgi: 0,
            noise_floor: -93,
            ampdu_cnt: 0,
            channel: 5,
            secondary_channel: 2,
            timestamp: 123456,
            antenna: 0,
            sig_len: 90,
            rx_state: 0,
            first_word_invalid: false,
            ..Default::default()
        };
        packet.set_csi_data(&[3, -4, 5, -6]).unwrap();
        packet
    }

    #[test]
    fn header_lists_columns_in_order() {
        let columns: heapless::Vec<&str, 32> = HEADER.split(',').collect();
        assert_eq!(columns.len(), 25);
        assert_eq!(columns[0], "type");
        assert_eq!(columns[7], "bandwidth");
        assert_eq!(columns[18], "local_timestamp");
        assert_eq!(columns[24], "data");
    }

    #[test]
    fn renders_record_line() {
        let mut out: String<512> = String::new();
        write_record(&mut out, 0, &sample()).unwrap();
        assert_eq!(
            out.as_str(),
            "CSI_DATA,0,24:0a:c4:00:00:01,-42,11,1,7,0,1,1,0,0,0,0,-93,0,5,2,123456,0,90,0,4,0,\"[3,-4,5,-6]\"\n"
        );
    }

    #[test]
    fn record_has_one_field_per_header_column() {
        let mut out: String<512> = String::new();
        write_record(&mut out, 9, &sample()).unwrap();
        let (meta, data) = out.split_once(",\"[").unwrap();
        assert_eq!(meta.split(',').count() + 1, HEADER.split(',').count());
        assert_eq!(data, "3,-4,5,-6]\"\n");
    }

    #[test]
    fn first_word_flag_renders_as_digit() {
        let mut packet = sample();
        packet.first_word_invalid = true;
        let mut out: String<512> = String::new();
        write_record(&mut out, 1, &packet).unwrap();
        assert!(out.contains(",4,1,\"["));
    }

    #[test]
    fn single_value_buffer_has_no_separator() {
        let mut packet = sample();
        packet.set_csi_data(&[-128]).unwrap();
        let mut out: String<512> = String::new();
        write_record(&mut out, 3, &packet).unwrap();
        assert!(out.ends_with(",1,0,\"[-128]\"\n"));
    }

    #[test]
    fn header_precedes_only_first_record() {
        let counter = SampleCounter::new();
        let packet = sample();

        let mut first: String<1024> = String::new();
        assert_eq!(emit(&mut first, &counter, &packet, false).unwrap(), 0);
        assert!(first.starts_with(HEADER));
        assert!(first.contains("\nCSI_DATA,0,"));

        let mut second: String<1024> = String::new();
        assert_eq!(emit(&mut second, &counter, &packet, false).unwrap(), 1);
        assert!(second.starts_with("CSI_DATA,1,"));
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn type_line_precedes_record() {
        let counter = SampleCounter::new();
        counter.next_id();
        let mut packet = sample();
        packet.csi_fmt_from_params();
        assert_eq!(packet.data_format, RxCSIFmt::SecbHtBw20);

        let mut out: String<1024> = String::new();
        emit(&mut out, &counter, &packet, true).unwrap();
        let (rig, record) = out.split_once('\n').unwrap();
        assert_eq!(rig, "CSI_RIG,24:0a:c4:00:00:01,5,2,1,0,0,4,SecbHtBw20");
        assert!(record.starts_with("CSI_DATA,1,"));
    }

    #[test]
    fn raw_noise_floor_renders_negative() {
        let packet = CSIDataPacket {
            noise_floor: normalize_dbm(0xA3),
            ..sample()
        };
        let mut out: String<512> = String::new();
        write_record(&mut out, 0, &packet).unwrap();
        let noise_floor = out.split(',').nth(14).unwrap();
        assert_eq!(noise_floor, "-93");
    }

    #[test]
    fn overflowing_writer_reports_error() {
        let mut out: String<16> = String::new();
        assert!(write_record(&mut out, 0, &sample()).is_err());
    }
}

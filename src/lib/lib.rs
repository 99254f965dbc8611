//! # A CSI receiver for ESP devices
//! ## Overview
//! This crate turns an ESP device into a Channel State Information (CSI) receiver. The WiFi radio is brought up in station mode, the driver's CSI extraction is enabled, and every CSI sample the driver reports is written to the serial console as one CSV line.
//! Currently this crate supports only the ESP `no-std` development framework.
//!
//! ### Choosing a device
//! The device needs WiFi and CSI support. Currently supported devices include:
//! - ESP32
//! - ESP32-C2
//! - ESP32-C3
//! - ESP32-S3
//!
//! Select exactly one of them through the crate features. Without a device feature only the hardware independent parts (record formatting, configuration, the channel walk) are built, which is what the host tests run against.
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
//! ## Output Format
//! The first sample is preceded by a column header:
//!
//! ```text
//! type,id,mac,rssi,rate,sig_mode,mcs,bandwidth,smoothing,not_sounding,aggregation,stbc,fec_coding,sgi,noise_floor,ampdu_cnt,channel,secondary_channel,local_timestamp,ant,sig_len,rx_state,len,first_word,data
//! ```
//!
//! Every sample is then printed as a `CSI_DATA` line. `id` counts samples from 0, `mac` is the sender, `len` is the number of CSI bytes, `first_word` is 1 when the driver flags the first four bytes as invalid, and `data` holds the raw signed CSI bytes:
//!
//! ```text
//! CSI_DATA,0,24:0a:c4:00:00:01,-42,11,1,7,0,1,1,0,0,0,0,-93,0,5,2,123456,0,90,0,4,0,"[3,-4,5,-6]"
//! ```
//!
//! With `ReceiverOptions::print_csi_type` a `CSI_RIG` line describing the sample's data layout precedes each record.
//!
//! ## Using the `esp-csi-recv` Crate
//!
//! #### Step 1: Create a Receiver
//!```rust, ignore
//!let mut receiver = CSIReceiver::new(
//!    CSIConfig::default(),
//!    // Channel 5, secondary channel below, power save off
//!    RadioConfig::default(),
//!    ReceiverOptions {
//!        channel_hopping: true,
//!        ..Default::default()
//!    },
//!    controller,
//!);
//!```
//!
//! #### Step 2: Initialize
//!```rust, ignore
//!receiver.init(interfaces, &spawner).await.unwrap();
//!```
//! Samples are printed from the driver callback from here on. Keep `receiver` alive, dropping it shuts the radio down.

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "firmware")]
use esp_alloc as _;
#[cfg(feature = "firmware")]
use esp_backtrace as _;

#[cfg(feature = "firmware")]
pub mod collector;
pub mod config;
pub mod csi;
pub mod error;
pub mod frame;
pub mod hop;
pub mod record;

#[cfg(feature = "firmware")]
pub use crate::collector::CSIReceiver;
pub use crate::config::{CSIConfig, RadioConfig, ReceiverOptions, SecondaryChannel};
pub use crate::csi::{CSIDataPacket, RxCSIFmt};
pub use crate::error::{Error, Result};

/// Number of records emitted so far. Shared by every callback invocation.
pub static SAMPLE_COUNTER: record::SampleCounter = record::SampleCounter::new();

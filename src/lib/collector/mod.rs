//! Hardware side of the receiver: WiFi bring-up and the driver callbacks.

mod receiver;

pub use receiver::CSIReceiver;

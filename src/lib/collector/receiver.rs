use core::sync::atomic::{AtomicBool, Ordering};

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_println::{println, Printer};
use esp_wifi::config::PowerSaveMode;
use esp_wifi::wifi::{
    wifi_csi_info_t, ClientConfiguration, Configuration, CsiConfig, Interfaces, PromiscuousPkt,
    Sniffer, WifiController,
};

use crate::config::{CSIConfig, RadioConfig, ReceiverOptions, SecondaryChannel};
use crate::csi::CSIDataPacket;
use crate::error::{Error, Result};
use crate::frame::{self, PacketType};
use crate::hop::ChannelHopper;
use crate::record;
use crate::SAMPLE_COUNTER;

static PRINT_CSI_TYPE: AtomicBool = AtomicBool::new(false);

/// Driver Struct to receive CSI as a Station and log every sample to the console.
///
/// The WiFi controller and sniffer are owned for the lifetime of the receiver; dropping
/// the receiver shuts the radio down.
pub struct CSIReceiver {
    /// CSI Collection Parameters
    pub csi_config: CSIConfig,
    /// Channel and power save settings
    pub radio_config: RadioConfig,
    pub options: ReceiverOptions,
    controller: WifiController<'static>,
    sniffer: Option<Sniffer>,
}

impl CSIReceiver {
    /// Creates a new `CSIReceiver` instance with a defined configuration/profile.
    pub fn new(
        csi_config: CSIConfig,
        radio_config: RadioConfig,
        options: ReceiverOptions,
        wifi_controller: WifiController<'static>,
    ) -> Self {
        Self {
            csi_config,
            radio_config,
            options,
            controller: wifi_controller,
            sniffer: None,
        }
    }

    /// Creates a new `CSIReceiver` instance with defaults.
    pub fn new_with_defaults(wifi_controller: WifiController<'static>) -> Self {
        Self::new(
            CSIConfig::default(),
            RadioConfig::default(),
            ReceiverOptions::default(),
            wifi_controller,
        )
    }

    /// Brings up WiFi in station mode, enables CSI and registers the logging callback.
    /// Samples start printing as soon as this returns.
    pub async fn init(&mut self, interfaces: Interfaces<'static>, spawner: &Spawner) -> Result<()> {
        self.csi_config.validate()?;
        self.radio_config.validate()?;

        log::info!("Initializing CSI Receiver");
        self.start_station().await?;
        self.enable_csi(interfaces.sniffer)?;

        if self.options.channel_hopping {
            let hopper = ChannelHopper::new(&self.radio_config);
            let interval = Duration::from_millis(self.options.hop_interval_ms);
            spawner
                .spawn(channel_hop_task(hopper, interval))
                .map_err(|_| Error::SystemError("failed to spawn channel hop task"))?;
        }
        Ok(())
    }

    async fn start_station(&mut self) -> Result<()> {
        let config = Configuration::Client(ClientConfiguration {
            channel: Some(self.radio_config.channel),
            ..Default::default()
        });
        self.controller.set_configuration(&config)?;
        self.controller.start_async().await?;
        log::info!("WiFi Started");

        set_channel(
            self.radio_config.channel,
            self.radio_config.secondary_channel,
        )?;

        let ps = if self.radio_config.power_save {
            PowerSaveMode::Minimum
        } else {
            PowerSaveMode::None
        };
        self.controller.set_power_saving(ps)?;
        Ok(())
    }

    fn enable_csi(&mut self, mut sniffer: Sniffer) -> Result<()> {
        sniffer.set_promiscuous_mode(true)?;
        if self.options.promiscuous_print {
            log::warn!("Promiscuous frame printing is experimental");
            sniffer.set_receive_cb(print_promiscuous);
        }
        self.sniffer = Some(sniffer);

        PRINT_CSI_TYPE.store(self.options.print_csi_type, Ordering::Relaxed);
        self.controller
            .set_csi(build_csi_config(&self.csi_config), csi_rx_cb)?;
        log::info!(
            "CSI enabled on channel {} ({:?})",
            self.radio_config.channel,
            self.radio_config.secondary_channel
        );
        Ok(())
    }
}

fn build_csi_config(csi_config: &CSIConfig) -> CsiConfig {
    CsiConfig {
        lltf_en: csi_config.lltf_enabled,
        htltf_en: csi_config.htltf_enabled,
        stbc_htltf2_en: csi_config.stbc_htltf2_enabled,
        ltf_merge_en: csi_config.ltf_merge_enabled,
        channel_filter_en: csi_config.channel_filter_enabled,
        manu_scale: csi_config.manu_scale,
        shift: csi_config.shift,
        dump_ack_en: csi_config.dump_ack_en,
    }
}

/// `esp-wifi` only sets the primary channel through the station configuration, the
/// secondary channel needs the raw driver call.
fn set_channel(channel: u8, secondary: SecondaryChannel) -> Result<()> {
    let code = unsafe {
        esp_wifi_sys::include::esp_wifi_set_channel(
            channel,
            secondary as esp_wifi_sys::include::wifi_second_chan_t,
        )
    };
    if code != 0 {
        return Err(Error::DriverError(code));
    }
    Ok(())
}

// Runs in the driver's context for every CSI-bearing packet
fn csi_rx_cb(info: wifi_csi_info_t) {
    let packet = match CSIDataPacket::from_csi_info(&info) {
        Ok(packet) => packet,
        Err(e) => {
            log::warn!("<ESP_ERR_INVALID_ARG> wifi_csi_cb: {}", e);
            return;
        }
    };
    let with_type = PRINT_CSI_TYPE.load(Ordering::Relaxed);
    if record::emit(&mut Printer, &SAMPLE_COUNTER, &packet, with_type).is_err() {
        log::warn!("Failed to write CSI record");
    }
}

fn print_promiscuous(packet: PromiscuousPkt<'_>) {
    let meta = CSIDataPacket::from_promiscuous(&packet);
    let packet_type = PacketType::from_raw(packet.frame_type);
    if frame::write_frame(&mut Printer, packet_type, &meta, packet.data).is_err() {
        log::warn!("Failed to write promiscuous frame");
    }
}

#[embassy_executor::task]
async fn channel_hop_task(mut hopper: ChannelHopper, interval: Duration) {
    loop {
        Timer::after(interval).await;
        let (channel, secondary) = hopper.advance();
        match set_channel(channel, secondary) {
            Ok(()) => {
                println!("================================================");
                println!("Set channel to {}", channel);
                println!("================================================");
            }
            Err(e) => log::warn!("Failed to hop to channel {}: {}", channel, e),
        }
    }
}

//! CSI receiver firmware
//!
//! Parks the station on channel 5 (secondary channel below) with power save off and
//! prints every CSI sample the driver reports as a CSV line on the serial console.
//! Traffic on the channel drives the sample rate; nothing is transmitted.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_bootloader_esp_idf::esp_app_desc;
use esp_csi_recv::{CSIConfig, CSIReceiver, RadioConfig, ReceiverOptions};
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_wifi::{init, EspWifiController};

esp_app_desc!();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Info);

    // Configure System Clock
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    // Take Peripherals
    let peripherals = esp_hal::init(config);

    // Allocate some heap space
    esp_alloc::heap_allocator!(size: 72 * 1024);

    // Initialize Embassy
    #[cfg(feature = "esp32")]
    {
        let timg1 = TimerGroup::new(peripherals.TIMG1);
        esp_hal_embassy::init(timg1.timer0);
    }
    #[cfg(not(feature = "esp32"))]
    {
        use esp_hal::timer::systimer::SystemTimer;
        let systimer = SystemTimer::new(peripherals.SYSTIMER);
        esp_hal_embassy::init(systimer.alarm0);
    }

    // Instantiate peripherals necessary to set up WiFi
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let rng = Rng::new(peripherals.RNG);

    let init = &*mk_static!(EspWifiController<'static>, init(timg0.timer0, rng).unwrap());
    let (controller, interfaces) = esp_wifi::wifi::new(init, peripherals.WIFI).unwrap();
    log::info!("WiFi Controller Initialized");

    let mut receiver = CSIReceiver::new(
        CSIConfig::default(),
        RadioConfig::default(),
        ReceiverOptions::default(),
        controller,
    );

    // Any bring-up failure halts the device
    if let Err(e) = receiver.init(interfaces, &spawner).await {
        panic!("CSI receiver init failed: {}", e);
    }

    loop {
        Timer::after(Duration::from_secs(1)).await
    }
}

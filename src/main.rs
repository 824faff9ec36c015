#![no_std]
#![no_main]

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"),  // version
    env!("CARGO_PKG_NAME"),     // project_name
    "00:00:00",                 // build_time
    "2025-01-01",               // build_date
    "0.0.0",                    // idf_ver (not using IDF)
    0x10000,                    // mmu_page_size (64KB)
    0,                          // min_efuse_blk_rev_full (accept all)
    u16::MAX                    // max_efuse_blk_rev_full (accept all)
);

use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode as SpiMode;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::usb_serial_jtag::{UsbSerialJtag, UsbSerialJtagRx, UsbSerialJtagTx};
use esp_hal::Async;
use static_cell::StaticCell;

use lora_transmitter_firmware::config::{self, lora_defaults};
use lora_transmitter_firmware::dispatcher::{COMMAND_CHANNEL, RESPONSE_CHANNEL};
use lora_transmitter_firmware::lora::{Sx126xDriver, Sx126xPins};
use lora_transmitter_firmware::radio::{ActiveConfig, RadioConfig, RadioConfigValidator};
use lora_transmitter_firmware::serial::IoPort;
use lora_transmitter_firmware::tasks;

type Radio = Sx126xDriver<
    Spi<'static, Async>,
    Output<'static>,
    Input<'static>,
    Output<'static>,
    Input<'static>,
>;

type HostPort = IoPort<UsbSerialJtagRx<'static, Async>, UsbSerialJtagTx<'static, Async>>;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    // Logs go to UART0; USB Serial JTAG carries only the command protocol
    esp_println::logger::init_logger(log::LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // The compiled-in configuration must validate before the radio is touched
    let active = match ActiveConfig::new(
        RadioConfigValidator::for_device(lora_defaults::DEVICE),
        &RadioConfig::default(),
    ) {
        Ok(active) => active,
        Err(err) => panic!("boot configuration invalid: {}", err),
    };

    let spi = match Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(config::spi::FREQUENCY_MHZ))
            .with_mode(SpiMode::_0),
    ) {
        Ok(spi) => spi,
        Err(err) => panic!("SPI config rejected: {:?}", err),
    };
    let spi = spi
        .with_sck(peripherals.GPIO7)
        .with_miso(peripherals.GPIO8)
        .with_mosi(peripherals.GPIO9)
        .into_async();

    let pins = Sx126xPins {
        nss: Output::new(peripherals.GPIO41, Level::High, OutputConfig::default()),
        dio1: Input::new(peripherals.GPIO39, InputConfig::default().with_pull(Pull::Down)),
        nrst: Output::new(peripherals.GPIO42, Level::High, OutputConfig::default()),
        busy: Input::new(peripherals.GPIO40, InputConfig::default().with_pull(Pull::Down)),
    };
    let radio = Sx126xDriver::new(spi, pins);

    let usb_serial = UsbSerialJtag::new(peripherals.USB_DEVICE).into_async();
    let (usb_rx, usb_tx) = usb_serial.split();
    let port = IoPort::new(usb_rx, usb_tx);

    log::info!(
        "boot: {} v{}.{}.{}",
        env!("CARGO_PKG_NAME"),
        config::protocol::VERSION_MAJOR,
        config::protocol::VERSION_MINOR,
        config::protocol::VERSION_PATCH
    );

    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(async_main(spawner, radio, active, port));
    })
}

#[embassy_executor::task]
async fn async_main(spawner: Spawner, radio: Radio, active: ActiveConfig, port: HostPort) {
    spawner.must_spawn(serial_task(port));
    spawner.must_spawn(transmitter_task(radio, active));
}

#[embassy_executor::task]
async fn serial_task(port: HostPort) {
    tasks::serial_task(port, COMMAND_CHANNEL.sender(), RESPONSE_CHANNEL.receiver()).await;
}

#[embassy_executor::task]
async fn transmitter_task(radio: Radio, active: ActiveConfig) {
    tasks::transmitter_task(radio, active, COMMAND_CHANNEL.receiver(), RESPONSE_CHANNEL.sender())
        .await;
}

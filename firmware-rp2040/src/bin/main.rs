#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::i2c::{self, Blocking, I2c};
use embassy_rp::peripherals::{I2C0, USB};
use embassy_rp::usb::Driver;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Timer};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use nunchuk_rp2040::{
    configure_usb_hid, DriverRegistry, I2cTransport, Nunchuk, NunchukConfig, ReportSignal,
    SignalInput, SignalSink, TickScheduler, UsbHidOutput, NUNCHUK_DRIVER,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Hardware description of the device wired to I2C0.
const BOARD_COMPATIBLE: &str = "nintendo,nunchuk";

#[cfg(not(feature = "fast-mode"))]
const I2C_FREQUENCY: u32 = 100_000;
#[cfg(feature = "fast-mode")]
const I2C_FREQUENCY: u32 = 400_000;

/// Wait before retrying a failed attach (controller unplugged at boot).
const ATTACH_RETRY: Duration = Duration::from_secs(1);

type NunchukBus = I2c<'static, I2C0, Blocking>;

/// Signal for passing joystick reports from the poll task to the output task.
/// Latest value wins: only the most recent stick position matters.
static REPORT_SIGNAL: StaticCell<ReportSignal> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Nunchuk joystick starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let mut registry: DriverRegistry<2> = DriverRegistry::new();
    if let Err(e) = registry.register(&NUNCHUK_DRIVER) {
        error!("Failed to register driver {}: {}", NUNCHUK_DRIVER.name, e);
        return;
    }
    let Some(driver) = registry.match_compatible(BOARD_COMPATIBLE) else {
        error!("No driver for {}", BOARD_COMPATIBLE);
        return;
    };
    info!("Using driver {} for {}", driver.name, BOARD_COMPATIBLE);

    let signal: &'static ReportSignal = REPORT_SIGNAL.init(Signal::new());

    // --- I2C Setup ---
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_blocking(
        p.I2C0,
        p.PIN_5, // SCL
        p.PIN_4, // SDA
        i2c_config,
    );

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Gamepad");
    usb_config.product = Some("Nunchuk Joystick");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state);

    let usb_device = builder.build();
    let usb_output = UsbHidOutput::new(hid_writer);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(nunchuk_task(i2c, signal).unwrap());
    spawner.spawn(output_task(usb_output, signal).unwrap());

    info!("Nunchuk joystick initialized");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Nunchuk task - attaches the driver (retrying until a controller answers)
/// and then polls it on every tick.
///
/// The frame read blocks for its settle delays, stalling this executor for
/// up to 40 ms per tick. Ticks that are due in the meantime run back to back.
#[embassy_executor::task]
async fn nunchuk_task(i2c: NunchukBus, signal: &'static ReportSignal) {
    let config = NunchukConfig::default();
    let mut transport = I2cTransport::new(i2c, config.address);
    let mut host = SignalInput::new(signal);
    let mut scheduler = TickScheduler::new();

    loop {
        let mut nunchuk: Nunchuk<_, Delay, RoscRng, SignalSink> = Nunchuk::new(config);
        if let Err(e) = nunchuk.attach(&mut transport, Delay, RoscRng, &mut host, &mut scheduler) {
            warn!("Nunchuk attach failed: {}, retrying", e);
            Timer::after(ATTACH_RETRY).await;
            continue;
        }

        // The controller stays registered for the lifetime of the firmware.
        // Read failures are logged by the driver and the next tick retries.
        loop {
            scheduler.next().await;
            let _ = nunchuk.poll();
        }
    }
}

/// Output task - waits for joystick reports and sends them to USB HID.
#[embassy_executor::task]
async fn output_task(mut output: UsbHidOutput<'static>, signal: &'static ReportSignal) {
    // Wait for USB to be ready
    output.wait_ready().await;
    info!("USB HID ready, forwarding Nunchuk state...");

    loop {
        let report = signal.wait().await;
        if let Err(e) = output.send(&report).await {
            error!("Output error: {:?}", e);
        }
    }
}

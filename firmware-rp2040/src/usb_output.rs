//! USB HID joystick output.

use defmt::Format;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;

/// USB HID joystick report.
///
/// Matches [`REPORT_DESCRIPTOR`]. Total size: 3 bytes (buttons: 1, stick: 2x1).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
#[repr(C)]
pub struct NunchukReport {
    /// Button bitfield, see [`BUTTON_Z`](Self::BUTTON_Z) / [`BUTTON_C`](Self::BUTTON_C)
    pub buttons: u8,
    /// Stick X (0-255)
    pub x: u8,
    /// Stick Y (0-255)
    pub y: u8,
}

impl NunchukReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 3;

    /// HID button 1.
    pub const BUTTON_Z: u8 = 1 << 0;
    /// HID button 2.
    pub const BUTTON_C: u8 = 1 << 1;

    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        [self.buttons, self.x, self.y]
    }

    /// No buttons, stick centered.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            x: 0x80,
            y: 0x80,
        }
    }
}

/// HID report descriptor: 2 buttons, one unsigned 8-bit X/Y stick.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (Z, C) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x02, //   Usage Maximum (Button 2)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x06, //   Report Size (6)
    0x81, 0x03, //   Input (Constant) - padding
    //
    // --- Stick ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x02, //   Report Count (2)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

type UsbDriver<'d> = Driver<'d, USB>;

const REPORT_SIZE: usize = NunchukReport::SIZE;

/// USB HID joystick output.
pub struct UsbHidOutput<'d> {
    writer: HidWriter<'d, UsbDriver<'d>, REPORT_SIZE>,
}

impl<'d> UsbHidOutput<'d> {
    pub fn new(writer: HidWriter<'d, UsbDriver<'d>, REPORT_SIZE>) -> Self {
        Self { writer }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
    }

    pub async fn send(&mut self, report: &NunchukReport) -> Result<(), EndpointError> {
        self.writer.write(&report.as_bytes()).await
    }
}

/// Configure the USB HID class in the USB builder.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
) -> HidWriter<'d, UsbDriver<'d>, REPORT_SIZE> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 5,
        max_packet_size: 8,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}

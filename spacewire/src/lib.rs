//! A Wireshark dissector for SpaceWire frames tunnelled over Ethernet with Ethertype `0x88B5`.
//!
//! * [Interpreting frames](#interpreting-frames)
//! * [Registration](#registration)
//! * [Building the plugin](#building-the-plugin)
//!
//! # Interpreting frames
//!
//! The frame format is as simple as it gets. The first byte is the address, and every byte after
//! it is a data byte. [`interpret`] turns a frame into one [`Field`] per byte, each labelled with
//! the byte's character (or `.` if it is not printable ASCII) and its hex value.
//!
//! ```rust
//! use spacewire::{interpret, FieldKind};
//!
//! let fields = interpret(b"Hi\n");
//!
//! let address = fields.address().unwrap();
//! assert_eq!(address.kind, FieldKind::Address);
//! assert_eq!(address.label, "Address: 'H' (0x48)");
//!
//! let data: Vec<_> = fields.data_bytes().iter().map(ToString::to_string).collect();
//! assert_eq!(data, ["Data Byte 1: 'i' (0x69)", "Data Byte 2: '.' (0x0A)"]);
//! ```
//!
//! Interpretation never fails. An empty frame gives an empty [`FieldSequence`].
//!
//! # Registration
//!
//! Wireshark needs to know about the protocol, its fields and which dissector table to hook into
//! before it sees any packet. [`register`] describes all of this as a [`Registration`].
//!
//! Field           | Filter              | Type        | Display
//! ----------------|---------------------|-------------|----------
//! `Address`       | `spacewire.address` | `FT_STRING` | `BASE_NONE`
//! `Data Byte`     | `spacewire.data`    | `FT_STRING` | `BASE_NONE`
//!
//! The dissector is bound to `0x88B5` in the `"ethertype"` table. Further bindings can be added
//! with [`Registration::with_decode_from`].
//!
//! ```rust
//! use spacewire::{register, DecodeFrom};
//!
//! let reg = register().with_decode_from(DecodeFrom::DecodeAs("udp.port".to_string()));
//! assert!(reg.validate().is_ok());
//! ```
//!
//! # Building the plugin
//!
//! The Wireshark entry points are behind the `plugin` feature, since they need libwireshark to
//! link.
//!
//! ```sh
//! cargo build --release -p spacewire --features plugin
//! ```
//!
//! Copy the resulting shared library (`libspacewire.so` on Linux) into Wireshark's plugin folder,
//! e.g. `~/.local/lib/wireshark/plugins/4.0/epan/`. The plugin declares itself for Wireshark 4.0
//! through [`version!`].
//!
//! Registration and handoff log through the [`log`](https://docs.rs/log) facade. When loaded by
//! Wireshark, the plugin sends these records to stderr, at debug level in debug builds and info
//! level otherwise.

mod field;
mod interpret;
mod logging;
mod register;

#[cfg(feature = "plugin")]
mod plugin;

pub use field::{display_char, Field, FieldKind};
pub use interpret::{interpret, FieldSequence};
pub use register::{
    register, DecodeFrom, HeaderField, Registration, RegistrationError, ETHERTYPE_SPACEWIRE,
    ETHERTYPE_TABLE,
};
pub use spacewire_derive::version;

#[cfg(test)]
mod compile_tests {
    #[test]
    fn run_all() {
        let t = trybuild::TestCases::new();

        t.pass("tests/simple/*.rs");
    }
}

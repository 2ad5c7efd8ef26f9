use std::ffi::CString;
use std::fmt;

/// The two roles a byte can play in a SpaceWire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// The first byte of the frame.
    Address,
    /// Every byte after the address.
    DataByte,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::Address, FieldKind::DataByte];

    /// Display name of the field in Wireshark's tree and field registry.
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Address => "Address",
            FieldKind::DataByte => "Data Byte",
        }
    }

    /// Default Wireshark filter string for the field. Display filters such as
    /// `spacewire.data == "A"` depend on these staying stable.
    pub const fn abbrev(self) -> &'static str {
        match self {
            FieldKind::Address => "spacewire.address",
            FieldKind::DataByte => "spacewire.data",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One interpreted byte of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    /// Byte offset into the frame.
    pub offset: usize,
    /// Always 1, every field covers exactly one byte.
    pub length: usize,
    pub raw_byte: u8,
    /// `raw_byte` if printable, else `'.'`.
    pub display_char: char,
    /// Text shown for the field in the protocol tree.
    pub label: String,
}

impl Field {
    pub(crate) fn new(kind: FieldKind, offset: usize, raw_byte: u8) -> Self {
        let display_char = display_char(raw_byte);
        let label = match kind {
            FieldKind::Address => format!("Address: '{display_char}' (0x{raw_byte:02X})"),
            FieldKind::DataByte => {
                format!("Data Byte {offset}: '{display_char}' (0x{raw_byte:02X})")
            }
        };
        Field {
            kind,
            offset,
            length: 1,
            raw_byte,
            display_char,
            label,
        }
    }

    /// The string stored as the field's value, which is what display filters compare against.
    pub fn value(&self) -> String {
        self.display_char.to_string()
    }

    /// Value and label as C strings for the protocol tree.
    #[cfg_attr(not(feature = "plugin"), allow(dead_code))]
    pub(crate) fn c_strings(&self) -> (CString, CString) {
        // `display_char` never yields NUL and the label's other characters are fixed ASCII.
        debug_assert!(!self.label.contains('\0'));
        debug_assert_ne!(self.display_char, '\0');
        // SAFETY: neither string contains a NUL byte, see above.
        unsafe {
            (
                CString::from_vec_unchecked(self.value().into_bytes()),
                CString::from_vec_unchecked(self.label.clone().into_bytes()),
            )
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Maps a byte to itself if it is printable ASCII (0x20 to 0x7E), and to `'.'` otherwise.
pub const fn display_char(byte: u8) -> char {
    match byte {
        0x20..=0x7E => byte as char,
        _ => '.',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_bounds() {
        assert_eq!(display_char(0x1F), '.');
        assert_eq!(display_char(0x20), ' ');
        assert_eq!(display_char(0x7E), '~');
        assert_eq!(display_char(0x7F), '.');
        assert_eq!(display_char(0xFF), '.');
    }

    #[test]
    fn address_label() {
        let field = Field::new(FieldKind::Address, 0, b'A');
        assert_eq!(field.label, "Address: 'A' (0x41)");
        assert_eq!(field.to_string(), field.label);
        assert_eq!(field.value(), "A");
    }

    #[test]
    fn data_byte_label_uses_decimal_offset_and_upper_hex() {
        let field = Field::new(FieldKind::DataByte, 12, 0xAB);
        assert_eq!(field.label, "Data Byte 12: '.' (0xAB)");
        assert_eq!(field.value(), ".");
        assert_eq!(field.length, 1);
    }

    #[test]
    fn every_byte_converts_to_c_strings() {
        for byte in 0..=u8::MAX {
            for kind in FieldKind::ALL {
                let field = Field::new(kind, 1, byte);
                let (value, label) = field.c_strings();
                assert_eq!(value.to_str().unwrap(), field.value());
                assert_eq!(label.to_str().unwrap(), field.label);
            }
        }
    }

    #[test]
    fn kind_names_and_filters() {
        assert_eq!(FieldKind::Address.name(), "Address");
        assert_eq!(FieldKind::DataByte.to_string(), "Data Byte");
        assert_eq!(FieldKind::Address.abbrev(), "spacewire.address");
        assert_eq!(FieldKind::DataByte.abbrev(), "spacewire.data");
    }
}

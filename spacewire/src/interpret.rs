use crate::field::{Field, FieldKind};

/// Fields produced from one frame, in ascending offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSequence(Vec<Field>);

impl FieldSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.0
    }

    /// The address field. `None` iff the frame was empty.
    pub fn address(&self) -> Option<&Field> {
        self.0.first().filter(|f| f.kind == FieldKind::Address)
    }

    /// All fields after the address.
    pub fn data_bytes(&self) -> &[Field] {
        match self.address() {
            Some(_) => &self.0[1..],
            None => &self.0,
        }
    }
}

impl IntoIterator for FieldSequence {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldSequence {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Interprets a SpaceWire frame. Byte 0 becomes the address and every following byte becomes a
/// data byte, so the result always holds exactly `frame.len()` fields.
///
/// ```
/// let fields = spacewire::interpret(&[0x41, 0x00, 0x7F]);
/// let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
/// assert_eq!(
///     labels,
///     ["Address: 'A' (0x41)", "Data Byte 1: '.' (0x00)", "Data Byte 2: '.' (0x7F)"],
/// );
/// ```
pub fn interpret(frame: &[u8]) -> FieldSequence {
    let mut fields = Vec::with_capacity(frame.len());

    if let Some(&address) = frame.first() {
        fields.push(Field::new(FieldKind::Address, 0, address));
    }
    for (offset, &byte) in frame.iter().enumerate().skip(1) {
        fields.push(Field::new(FieldKind::DataByte, offset, byte));
    }

    FieldSequence(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::display_char;
    use proptest::prelude::*;

    #[test]
    fn empty_frame_has_no_fields() {
        let fields = interpret(&[]);
        assert!(fields.is_empty());
        assert!(fields.address().is_none());
        assert!(fields.data_bytes().is_empty());
    }

    #[test]
    fn single_byte_is_address() {
        let fields = interpret(&[0x41]);
        assert_eq!(fields.len(), 1);

        let address = fields.address().unwrap();
        assert_eq!(address.kind, FieldKind::Address);
        assert_eq!(address.offset, 0);
        assert_eq!(address.label, "Address: 'A' (0x41)");
        assert!(fields.data_bytes().is_empty());
    }

    #[test]
    fn non_printable_bytes_render_as_dot() {
        let fields = interpret(&[0x41, 0x00, 0x7F]);
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Address: 'A' (0x41)",
                "Data Byte 1: '.' (0x00)",
                "Data Byte 2: '.' (0x7F)",
            ]
        );
    }

    #[test]
    fn percent_sign_is_kept_verbatim() {
        let fields = interpret(b"%%");
        assert_eq!(fields.as_slice()[0].label, "Address: '%' (0x25)");
        assert_eq!(fields.as_slice()[1].label, "Data Byte 1: '%' (0x25)");
    }

    proptest! {
        #[test]
        fn one_field_per_byte(frame in proptest::collection::vec(any::<u8>(), 0..512)) {
            let fields = interpret(&frame);
            prop_assert_eq!(fields.len(), frame.len());
            prop_assert_eq!(fields.data_bytes().len(), frame.len().saturating_sub(1));
        }

        #[test]
        fn address_first_then_data_bytes_in_order(
            frame in proptest::collection::vec(any::<u8>(), 1..512),
        ) {
            let fields = interpret(&frame);
            for (i, field) in fields.iter().enumerate() {
                let expected = if i == 0 { FieldKind::Address } else { FieldKind::DataByte };
                prop_assert_eq!(field.kind, expected);
                prop_assert_eq!(field.offset, i);
                prop_assert_eq!(field.length, 1);
                prop_assert_eq!(field.raw_byte, frame[i]);
            }
        }

        #[test]
        fn display_char_follows_printability(byte in any::<u8>()) {
            let c = display_char(byte);
            if (0x20..=0x7E).contains(&byte) {
                prop_assert_eq!(c, byte as char);
            } else {
                prop_assert_eq!(c, '.');
            }
            prop_assert_eq!(interpret(&[byte]).as_slice()[0].display_char, c);
        }

        #[test]
        fn interpretation_is_idempotent(frame in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(interpret(&frame), interpret(&frame));
        }
    }
}

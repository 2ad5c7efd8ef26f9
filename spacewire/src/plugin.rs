//! Wireshark entry points. Only built with the `plugin` feature.
//!
//! Wireshark calls `plugin_register` when it loads the library, then `proto_register` and
//! `proto_reg_handoff` once each during startup, always on the same thread. After that, `dissect`
//! runs once per SpaceWire frame.

use std::ffi::{c_char, c_int, c_uint, c_void};

use once_cell::sync::OnceCell;

use crate::field::FieldKind;
use crate::logging::init_logger;
use crate::register::{register, to_cstring, DecodeFrom, HeaderField, RegistrationError};
use crate::{interpret, version};

version!("0.1.0", 4, 0);

macro_rules! cstr {
    ($x:expr) => {
        concat!($x, '\0').as_ptr() as *const c_char
    };
}

/// Ids Wireshark handed out during registration.
#[derive(Debug)]
struct Handles {
    proto_id: c_int,
    hf_address: c_int,
    hf_data: c_int,
    ett: c_int,
    /// Protocol column text. Wireshark keeps the pointer, so this is never freed.
    proto_desc: *const c_char,
    /// Bindings from the registration that was validated, applied at handoff.
    decode_from: Vec<DecodeFrom>,
}

// SAFETY: `proto_desc` points at leaked, never mutated memory.
unsafe impl Sync for Handles {}
unsafe impl Send for Handles {}

impl Handles {
    fn hf(&self, kind: FieldKind) -> c_int {
        match kind {
            FieldKind::Address => self.hf_address,
            FieldKind::DataByte => self.hf_data,
        }
    }
}

static HANDLES: OnceCell<Handles> = OnceCell::new();

static PLUGIN: epan_sys::proto_plugin = epan_sys::proto_plugin {
    register_protoinfo: Some(proto_register),
    register_handoff: Some(proto_reg_handoff),
};

#[no_mangle]
extern "C" fn plugin_register() {
    init_logger();

    // SAFETY: called once by wireshark on its main thread, PLUGIN lives forever.
    unsafe {
        epan_sys::proto_register_plugin(&PLUGIN);
    }
}

extern "C" fn proto_register() {
    if let Err(e) = try_proto_register() {
        log::error!("SpaceWire dissector not registered: {e}");
    }
}

/// Hands the string to wireshark for the rest of the process.
fn leak_cstr(value: &str) -> Result<*const c_char, RegistrationError> {
    let s = to_cstring(value)?;
    Ok(Box::leak(s.into_boxed_c_str()).as_ptr())
}

fn try_proto_register() -> Result<(), RegistrationError> {
    let reg = register();
    reg.validate()?;

    let proto_desc = leak_cstr(&reg.proto_desc)?;
    let proto_name = leak_cstr(&reg.proto_name)?;
    let proto_filter = leak_cstr(&reg.proto_filter)?;
    let proto_id =
        unsafe { epan_sys::proto_register_protocol(proto_desc, proto_name, proto_filter) };
    log::debug!("registered protocol {} as {proto_id}", reg.proto_filter);

    let mut hf_address = -1;
    let mut hf_data = -1;
    for field in &reg.fields {
        let idx = register_hf_index(proto_id, field)?;
        log::debug!("registered field {} as {idx}", field.abbrev);
        match field.kind {
            FieldKind::Address => hf_address = idx,
            FieldKind::DataByte => hf_data = idx,
        }
    }

    let ett_ptr = Box::leak(Box::new(-1)) as *mut c_int;
    unsafe {
        epan_sys::proto_register_subtree_array([ett_ptr].as_mut_ptr(), 1);
    }
    let ett = unsafe { *ett_ptr };
    debug_assert_ne!(ett, -1);

    let handles = Handles {
        proto_id,
        hf_address,
        hf_data,
        ett,
        proto_desc,
        decode_from: reg.decode_from,
    };
    if HANDLES.set(handles).is_err() {
        log::error!("SpaceWire protocol registered twice, keeping the first ids");
    }
    Ok(())
}

/// Registers one header field as an ascii string without a value map.
fn register_hf_index(proto_id: c_int, field: &HeaderField) -> Result<c_int, RegistrationError> {
    let hf_index_ptr = Box::leak(Box::new(-1)) as *mut c_int;
    let blurb = match &field.blurb {
        Some(blurb) => leak_cstr(blurb)?,
        None => std::ptr::null(),
    };

    let hf_register_info = epan_sys::hf_register_info {
        p_id: hf_index_ptr,
        hfinfo: epan_sys::header_field_info {
            name: leak_cstr(&field.name)?,
            abbrev: leak_cstr(&field.abbrev)?,
            type_: epan_sys::ftenum_FT_STRING as c_uint,
            display: epan_sys::field_display_e_BASE_NONE as c_int,
            strings: std::ptr::null(),
            bitmask: 0,
            blurb,
            id: -1,
            parent: 0,
            ref_type: epan_sys::hf_ref_type_HF_REF_TYPE_NONE,
            same_name_prev_id: -1,
            same_name_next: std::ptr::null_mut(),
        },
    };
    let hfs = Box::leak(Box::new([hf_register_info])) as *mut _;

    unsafe {
        epan_sys::proto_register_field_array(proto_id, hfs, 1);
    }
    let idx = unsafe { *hf_index_ptr };
    debug_assert_ne!(idx, -1);
    Ok(idx)
}

extern "C" fn proto_reg_handoff() {
    if let Err(e) = try_proto_reg_handoff() {
        log::error!("SpaceWire dissector not bound: {e}");
    }
}

fn try_proto_reg_handoff() -> Result<(), RegistrationError> {
    let handles = HANDLES.get().ok_or(RegistrationError::NotRegistered)?;

    let handle = unsafe { epan_sys::create_dissector_handle(Some(dissect), handles.proto_id) };
    for decode_from in &handles.decode_from {
        let table = leak_cstr(decode_from.table())?;
        match decode_from {
            DecodeFrom::DecodeAs(name) => {
                unsafe { epan_sys::dissector_add_for_decode_as(table, handle) };
                log::debug!("offered SpaceWire under Decode As for {name}");
            }
            DecodeFrom::Uint(name, patterns) => {
                for &pattern in patterns {
                    unsafe { epan_sys::dissector_add_uint(table, pattern as c_uint, handle) };
                    log::debug!("bound SpaceWire to {name} {pattern:#06X}");
                }
            }
        }
    }
    Ok(())
}

/// Copies the captured bytes of the frame out of the tvb.
unsafe fn captured_bytes(tvb: *mut epan_sys::tvbuff) -> Vec<u8> {
    let len = epan_sys::tvb_captured_length(tvb) as usize;
    let mut buf = vec![0; len];
    if len > 0 {
        epan_sys::tvb_memcpy(tvb, buf.as_mut_ptr() as *mut c_void, 0, len);
    }
    buf
}

unsafe extern "C" fn dissect(
    tvb: *mut epan_sys::tvbuff,
    pinfo: *mut epan_sys::_packet_info,
    tree: *mut epan_sys::_proto_node,
    _data: *mut c_void,
) -> c_int {
    let Some(handles) = HANDLES.get() else {
        return 0;
    };

    epan_sys::col_set_str((*pinfo).cinfo, epan_sys::COL_PROTOCOL as c_int, handles.proto_desc);
    epan_sys::col_clear((*pinfo).cinfo, epan_sys::COL_INFO as c_int);

    let item = epan_sys::proto_tree_add_item(tree, handles.proto_id, tvb, 0, -1, epan_sys::ENC_NA);
    let subtree = epan_sys::proto_item_add_subtree(item, handles.ett);

    let frame = captured_bytes(tvb);
    let fields = interpret(&frame);
    log::trace!("dissecting {} SpaceWire bytes", frame.len());

    for field in &fields {
        let (value, label) = field.c_strings();
        // The label goes through "%s", since a '%' byte renders as itself.
        epan_sys::proto_tree_add_string_format(
            subtree,
            handles.hf(field.kind),
            tvb,
            field.offset as c_int,
            field.length as c_int,
            value.as_ptr(),
            cstr!("%s"),
            label.as_ptr(),
        );
    }

    frame.len() as c_int
}

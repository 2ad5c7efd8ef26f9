use spacewire::version;

version!("0.1.0", 4, 0);

fn main() {
    assert_eq!(
        plugin_version,
        [
            b'0' as std::ffi::c_char,
            b'.' as std::ffi::c_char,
            b'1' as std::ffi::c_char,
            b'.' as std::ffi::c_char,
            b'0' as std::ffi::c_char,
            0,
        ]
    );
    assert_eq!(plugin_want_major, 4_i32);
    assert_eq!(plugin_want_minor, 0_i32);
}

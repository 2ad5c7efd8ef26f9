use spacewire::version;

version!("12.34.5", 3, 6);

fn main() {
    let ver: Vec<u8> = plugin_version.iter().map(|&c| c as u8).collect();
    assert_eq!(ver, b"12.34.5\0");
    assert_eq!(plugin_want_major, 3_i32);
    assert_eq!(plugin_want_minor, 6_i32);
}

//! This crate provides the macros for the [spacewire](../spacewire) plugin crate.

use once_cell::sync::Lazy;
use proc_macro::TokenStream;
use quote::quote;
use regex::Regex;
use syn::parse::{Parse, ParseStream};

#[derive(Debug)]
struct VersionMacroInput {
    plugin_ver: syn::LitStr,
    ws_major_ver: syn::LitInt,
    ws_minor_ver: syn::LitInt,
}

impl Parse for VersionMacroInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let plugin_ver = Parse::parse(input)?;
        <syn::Token![,]>::parse(input)?;
        let ws_major_ver = Parse::parse(input)?;
        <syn::Token![,]>::parse(input)?;
        let ws_minor_ver = Parse::parse(input)?;
        Ok(VersionMacroInput {
            plugin_ver,
            ws_major_ver,
            ws_minor_ver,
        })
    }
}

impl VersionMacroInput {
    fn validate(&self) -> syn::Result<()> {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$")
                .expect("regexp for plugin versions should be valid")
        });

        if !RE.is_match(&self.plugin_ver.value()) {
            return Err(syn::Error::new(
                self.plugin_ver.span(),
                "expected a plugin version of the form MAJOR.MINOR.PATCH",
            ));
        }
        self.ws_major_ver.base10_parse::<i32>()?;
        self.ws_minor_ver.base10_parse::<i32>()?;
        Ok(())
    }
}

/// Declares the plugin version and supported Wireshark version.
///
/// Wireshark looks these symbols up by name when it loads the shared library, and refuses the
/// plugin if they are missing or if the major/minor pair does not match its own.
///
/// # Example
///
/// The following usage declares a plugin version of 0.1.0, built for wireshark version 4.0.x.
///
/// ```
/// use spacewire_derive::version;
/// version!("0.1.0", 4, 0);
/// ```
#[proc_macro]
pub fn version(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as VersionMacroInput);
    if let Err(e) = input.validate() {
        return e.to_compile_error().into();
    }

    let mut ver_str = input.plugin_ver.value().into_bytes();
    ver_str.push(0); // pad a null byte
    let nr_chars = ver_str.len();

    let ws_major_ver = input.ws_major_ver;
    let ws_minor_ver = input.ws_minor_ver;

    let version_info: proc_macro2::TokenStream = quote! {
        #[no_mangle]
        #[used]
        static plugin_version: [std::ffi::c_char; #nr_chars] =
            [#(#ver_str as std::ffi::c_char),*];
        #[no_mangle]
        #[used]
        static plugin_want_major: std::ffi::c_int = #ws_major_ver;
        #[no_mangle]
        #[used]
        static plugin_want_minor: std::ffi::c_int = #ws_minor_ver;
    };

    version_info.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> VersionMacroInput {
        syn::parse_str(s).unwrap()
    }

    #[test]
    fn accepts_dotted_numeric_versions() {
        assert!(parse(r#""0.1.0", 4, 0"#).validate().is_ok());
        assert!(parse(r#""12.0.345", 3, 6"#).validate().is_ok());
    }

    #[test]
    fn rejects_malformed_versions() {
        let cases = [
            r#""", 4, 0"#,
            r#""0.1", 4, 0"#,
            r#""v0.1.0", 4, 0"#,
            r#""0.1.0-rc1", 4, 0"#,
        ];
        for bad in cases {
            assert!(parse(bad).validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(syn::parse_str::<VersionMacroInput>(r#""0.1.0", 4"#).is_err());
    }
}

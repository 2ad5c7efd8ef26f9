use std::sync::Once;

use log::LevelFilter;

static INIT_LOGGER: Once = Once::new();

/// Level the plugin logs at. Registration details are only shown in debug builds.
pub(crate) const fn level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Sends the plugin's log records to stderr, which Wireshark's console captures. Only the first
/// call installs anything.
#[cfg_attr(not(feature = "plugin"), allow(dead_code))]
pub(crate) fn init_logger() {
    INIT_LOGGER.call_once(|| simple_logging::log_to_stderr(level()));
}

/*!

A "logger" for builds without the `logging` feature (and for WASM targets). It does not output anything anywhere but
satisfies the public API, so that libraries embedding truthlink can install their own `log` implementation.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}

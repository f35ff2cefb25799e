//! Output macros routed by debug mode.
//!
//! With `PLANBOARD_DEBUG` or `RUST_LOG` set, messages go through `tracing`
//! so they interleave with engine logs; otherwise they are printed plainly.
//!
//! - `msg_print!`, `msg_success!`, `msg_info!`, `msg_warning!`: stdout
//! - `msg_error!`: stderr
//! - `msg_debug!`: debug mode only
//! - `msg_error_anyhow!`, `msg_bail_anyhow!`: build or return an `anyhow::Error`
//!
//! ```rust
//! use planboard::{msg_info, msg_success};
//! use planboard::libs::messages::Message;
//!
//! msg_success!(Message::ConfigSaved);
//! msg_info!(Message::PeriodsHeader, true);
//! ```

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Whether debug output is on. Checked once per process.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("PLANBOARD_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __msg_route {
    ($level:ident, $out:ident, $prefix:literal, $msg:expr, $pad:literal) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::$level!("{}{}{}{}", $pad, $prefix, $msg, $pad);
        } else {
            $out!("{}{}{}{}", $pad, $prefix, $msg, $pad);
        }
    };
}

#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        $crate::__msg_route!(info, println, "", $msg, "")
    };
    ($msg:expr, true) => {
        $crate::__msg_route!(info, println, "", $msg, "\n")
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        $crate::__msg_route!(info, println, "✅ ", $msg, "")
    };
    ($msg:expr, true) => {
        $crate::__msg_route!(info, println, "✅ ", $msg, "\n")
    };
}

#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        $crate::__msg_route!(error, eprintln, "❌ ", $msg, "")
    };
    ($msg:expr, true) => {
        $crate::__msg_route!(error, eprintln, "❌ ", $msg, "\n")
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        $crate::__msg_route!(warn, println, "⚠️ ", $msg, "")
    };
    ($msg:expr, true) => {
        $crate::__msg_route!(warn, println, "⚠️ ", $msg, "\n")
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        $crate::__msg_route!(info, println, "ℹ️ ", $msg, "")
    };
    ($msg:expr, true) => {
        $crate::__msg_route!(info, println, "ℹ️ ", $msg, "\n")
    };
}

#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}

//! Logging shims that forward to `tracing` when the feature is enabled.
#![allow(unused_macros)]

macro_rules! debug {
    ($($t:tt)*) => {
        log_event!(debug, $($t)*)
    }
}

macro_rules! info {
    ($($t:tt)*) => {
        log_event!(info, $($t)*)
    }
}

macro_rules! warn {
    ($($t:tt)*) => {
        log_event!(warn, $($t)*)
    }
}

macro_rules! log_event {
    ($level: ident, $($t:tt)*) => {
        #[cfg(feature = "tracing")]
        { tracing::$level!($($t)*) }
        // Keep arguments type-checked and "used" without tracing.
        #[cfg(not(feature = "tracing"))]
        { if false { let _ = ( $($t)* ); } }
    }
}

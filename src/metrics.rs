//! Prometheus metrics collection for autovoice.
//!
//! Tracks channel churn (created/reclaimed), grace-timer behavior, and
//! platform-call failures. Exposed on the HTTP surface via
//! [`gather_metrics`].

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Total temp channels created (lobby joins plus on-demand requests).
pub static CHANNELS_CREATED: OnceLock<IntCounter> = OnceLock::new();

/// Total temp channels reclaimed after their grace period.
pub static CHANNELS_RECLAIMED: OnceLock<IntCounter> = OnceLock::new();

/// Grace timers that fired but left the channel alone (rejoin in time).
pub static RECLAIMS_CANCELLED: OnceLock<IntCounter> = OnceLock::new();

/// Platform-call failures by error code.
pub static PLATFORM_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Currently registered temp channels.
pub static ACTIVE_TEMP_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize metrics. Idempotent: re-registration failures are logged and
/// ignored so tests can call this freely.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::debug!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(
        CHANNELS_CREATED,
        IntCounter::new("autovoice_channels_created_total", "Temp channels created")
    );
    register!(
        CHANNELS_RECLAIMED,
        IntCounter::new(
            "autovoice_channels_reclaimed_total",
            "Temp channels deleted after their grace period"
        )
    );
    register!(
        RECLAIMS_CANCELLED,
        IntCounter::new(
            "autovoice_reclaims_cancelled_total",
            "Reclaims abandoned because the channel regained occupants"
        )
    );
    register!(
        PLATFORM_ERRORS,
        IntCounterVec::new(
            Opts::new(
                "autovoice_platform_errors_total",
                "Platform-call failures by error code"
            ),
            &["code"]
        )
    );
    register!(
        ACTIVE_TEMP_CHANNELS,
        IntGauge::new(
            "autovoice_active_temp_channels",
            "Currently registered temp channels"
        )
    );
}

/// Gather all metrics in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// Update helpers are no-ops until init() runs, so library code can record
// metrics unconditionally.

pub fn inc_channels_created() {
    if let Some(c) = CHANNELS_CREATED.get() {
        c.inc();
    }
}

pub fn inc_channels_reclaimed() {
    if let Some(c) = CHANNELS_RECLAIMED.get() {
        c.inc();
    }
}

pub fn inc_reclaims_cancelled() {
    if let Some(c) = RECLAIMS_CANCELLED.get() {
        c.inc();
    }
}

pub fn inc_platform_error(code: &str) {
    if let Some(c) = PLATFORM_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}

pub fn set_active_temp_channels(n: i64) {
    if let Some(g) = ACTIVE_TEMP_CHANNELS.get() {
        g.set(n);
    }
}

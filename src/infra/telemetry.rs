use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::acquisition::{METRIC_ACQUISITION_TOTAL, METRIC_LIVE_FALLBACK_TOTAL};
use crate::application::page::{METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT_TOTAL,
            Unit::Count,
            "Cache lookups answered from the cache, labelled by kind."
        );
        describe_counter!(
            METRIC_CACHE_MISS_TOTAL,
            Unit::Count,
            "Cache lookups that fell through to the store, labelled by kind."
        );
        describe_counter!(
            METRIC_ACQUISITION_TOTAL,
            Unit::Count,
            "Acquired page records, labelled by the source that produced them (live or synthetic)."
        );
        describe_counter!(
            METRIC_LIVE_FALLBACK_TOTAL,
            Unit::Count,
            "Live scrapes that failed and were replaced by synthetic records."
        );
    });
}

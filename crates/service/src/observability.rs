use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static CACHE_HITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "samples_cache_hits_total",
        "Sample query list lookups served from the cache"
    )
    .expect("register cache_hits_total")
});

pub static CACHE_POPULATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "samples_cache_populations_total",
        "Sample query list loads from storage"
    )
    .expect("register cache_populations_total")
});

pub static POLICY_BOOTSTRAPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "samples_policy_bootstraps_total",
        "Default policy documents written because none existed"
    )
    .expect("register policy_bootstraps_total")
});

pub static AUTHORIZATION_DENIALS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "samples_authorization_denials_total",
        "Mutating requests rejected by a category policy"
    )
    .expect("register authorization_denials_total")
});

/// Text exposition of the default registry.
pub fn encode_metrics() -> Result<String, String> {
    // touch the counters so they show up before first use
    Lazy::force(&CACHE_HITS_TOTAL);
    Lazy::force(&CACHE_POPULATIONS_TOTAL);
    Lazy::force(&POLICY_BOOTSTRAPS_TOTAL);
    Lazy::force(&AUTHORIZATION_DENIALS_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}

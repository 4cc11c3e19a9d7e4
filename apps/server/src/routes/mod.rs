mod health;
mod metrics;

macros_utils::routes! {
    route health::health_route,
    route metrics::metrics_route,
}

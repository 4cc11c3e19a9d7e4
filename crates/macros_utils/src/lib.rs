//! Small declarative helpers shared by the workspace apps

/// Declares a `routes` function registering every listed actix service.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     route metrics_route,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $route:path),* $(,)?) => {
        pub fn routes(cfg: &mut ::actix_web::web::ServiceConfig) {
            $( cfg.service($route); )*
        }
    };
}

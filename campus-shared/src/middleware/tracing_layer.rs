use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Deployment environment variable, shared with the service configuration.
pub const ENVIRONMENT_VAR: &str = "CAMPUS__ENVIRONMENT";

pub fn is_production_name(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

/// `CAMPUS__ENVIRONMENT=production` switches log output to JSON lines.
pub fn is_production_env() -> bool {
    std::env::var(ENVIRONMENT_VAR)
        .map(|v| is_production_name(&v))
        .unwrap_or(false)
}

pub fn init_tracing(service_name: &str) {
    let crate_target = service_name.replace('-', "_");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{crate_target}=debug,tower_http=debug")));

    if is_production_env() {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    tracing::info!(service = service_name, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_name_ignores_case_and_padding() {
        assert!(is_production_name("production"));
        assert!(is_production_name(" Production "));
        assert!(!is_production_name("development"));
        assert!(!is_production_name(""));
    }
}

use std::sync::Arc;

use campus_api::config::AppConfig;
use campus_api::{router, AppState};
use campus_shared::auth::TokenKeys;
use campus_shared::clients::db::create_pool;
use campus_shared::clients::push::{DisabledPush, FcmClient, PushProvider};
use campus_shared::middleware::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("campus-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    let tokens = TokenKeys::new(&config.jwt_secret);

    let push: Arc<dyn PushProvider> = match config.fcm_credentials() {
        Some(credentials) => Arc::new(FcmClient::new(credentials, config.push_concurrency)?),
        None => {
            tracing::warn!("firebase credentials not configured, push notifications disabled");
            Arc::new(DisabledPush)
        }
    };

    let otp = config.otp_verifier()?;
    tracing::info!(mode = otp.mode(), environment = %config.environment, "OTP verification ready");

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "prometheus recorder not installed");
            None
        }
    };

    let state = AppState {
        db,
        config: Arc::new(config),
        tokens,
        push,
        otp: Arc::new(otp),
        metrics,
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "campus-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

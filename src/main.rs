mod app;
mod config;
mod error;
mod groups;
mod signups;
mod state;
mod store;
mod util;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "brewmatch=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;
    if state.store().is_err() {
        tracing::warn!(
            "AIRTABLE_API_KEY / AIRTABLE_BASE_ID not set; requests will fail until configured"
        );
    }

    let app = app::build_app(state);
    app::serve(app).await
}

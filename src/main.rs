mod config;
mod credential;
mod llm;
mod routes;
mod search;
mod services;
mod state;
mod upstream;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let creds = config.credential_status();
    if creds.tavily_key_set {
        tracing::info!(key_len = creds.tavily_key_length, "search provider key configured");
    } else {
        tracing::warn!("TAVILY_API_KEY not set; pitch generation will fail until it is");
    }
    if creds.perplexity_key_set {
        tracing::info!(key_len = creds.perplexity_key_length, "completion provider key configured");
    } else {
        tracing::warn!("PERPLEXITY_API_KEY not set; pitch generation will fail until it is");
    }

    let state = state::AppState::from_config(&config).expect("upstream client init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, model = %config.completion.model, "pocket-pitch listening");
    axum::serve(listener, app).await.expect("server failed");
}

//! PriceGuard server binary.
//!
//! Loads configuration from the environment, opens a lazily-connecting
//! Postgres pool, wires the processor clients that are configured and serves
//! the API until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use chrono::Utc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use priceguard::adapters::auth::Argon2PasswordHasher;
use priceguard::adapters::http::{self, AppState};
use priceguard::adapters::paypal::{PayPalApiConfig, PayPalGatewayAdapter};
use priceguard::adapters::postgres::{
    PostgresAccountRepository, PostgresWebhookEventRepository, MIGRATOR,
};
use priceguard::adapters::stripe::{StripeApiConfig, StripeGatewayAdapter};
use priceguard::config::{AppConfig, ServerConfig};
use priceguard::domain::billing::StripeWebhookVerifier;
use priceguard::ports::{PayPalGateway, StripeGateway, WebhookEventRepository};

/// How long verified webhook ids are remembered.
const LEDGER_RETENTION_DAYS: i64 = 90;
const LEDGER_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe = config.stripe.api_key().is_some(),
        paypal = config.paypal.credentials().is_some(),
        "Starting PriceGuard"
    );

    let pool = config.database.connect_lazy()?;
    if config.database.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let webhook_events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    spawn_ledger_sweep(webhook_events.clone());

    let state = AppState {
        accounts: Arc::new(PostgresAccountRepository::new(pool)),
        webhook_events,
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        stripe: stripe_gateway(&config)?,
        stripe_webhook_verifier: config.stripe.webhook_secret().map(|secret| {
            StripeWebhookVerifier::new(secret.clone()).with_tolerance(config.stripe.tolerance_secs)
        }),
        paypal: paypal_gateway(&config)?,
        paypal_webhook_id: config.paypal.webhook_id().map(str::to_string),
        frontend_url: config.server.frontend_base().to_string(),
    };
    if state.stripe_webhook_verifier.is_none() {
        tracing::warn!("Stripe webhook secret not set; /api/stripe/webhook will reject deliveries");
    }

    let app = http::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(CompressionLayer::new())
            .layer(cors_layer(&config.server)),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn stripe_gateway(config: &AppConfig) -> Result<Option<Arc<dyn StripeGateway>>, BoxError> {
    let Some(api_key) = config.stripe.api_key() else {
        tracing::warn!("Stripe API key not set; billing routes will answer 503");
        return Ok(None);
    };
    let adapter = StripeGatewayAdapter::new(
        StripeApiConfig::new(api_key.clone())
            .with_base_url(config.stripe.api_base_url.clone())
            .with_timeout(Duration::from_secs(config.server.request_timeout_secs)),
    )?;
    Ok(Some(Arc::new(adapter)))
}

fn paypal_gateway(config: &AppConfig) -> Result<Option<Arc<dyn PayPalGateway>>, BoxError> {
    let Some((client_id, client_secret)) = config.paypal.credentials() else {
        tracing::info!("PayPal credentials not set; PayPal routes will answer 503");
        return Ok(None);
    };
    let adapter = PayPalGatewayAdapter::new(
        PayPalApiConfig::new(client_id, client_secret.clone(), config.paypal.base_url())
            .with_timeout(Duration::from_secs(config.server.request_timeout_secs)),
    )?;
    Ok(Some(Arc::new(adapter)))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Periodically forgets ledger rows past the retention window.
fn spawn_ledger_sweep(ledger: Arc<dyn WebhookEventRepository>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LEDGER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(LEDGER_RETENTION_DAYS);
            match ledger.delete_before(cutoff).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, "Pruned webhook ledger"),
                Err(err) => tracing::warn!(error = %err, "Webhook ledger sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

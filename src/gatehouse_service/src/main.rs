use std::sync::Arc;

use color_eyre::eyre::Result;
use gatehouse_adapters::{
    config::{AllowedOrigins, Settings},
    email::PostmarkEmailClient,
    persistence::{PostgresUserStore, RedisKvStore},
};
use gatehouse_core::Email;
use gatehouse_service::{AuthService, build_auth_state, init_tracing};
use redis::Client;
use reqwest::Client as HttpClient;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install().expect("Failed to install color_eyre");
    init_tracing().expect("Failed to initialize tracing");

    let settings = Settings::load()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(settings.postgres.url.expose_secret())
        .await?;

    sqlx::migrate!().run(&pg_pool).await?;

    let redis_client = Client::open(format!("redis://{}/", settings.redis.host_name))?;
    let redis_conn = Arc::new(RwLock::new(redis_client.get_connection()?));

    let user_store = PostgresUserStore::new(pg_pool);
    let kv_store = RedisKvStore::new(redis_conn);

    let http_client = HttpClient::builder()
        .timeout(Duration::from_millis(
            settings.email_client.timeout_milliseconds,
        ))
        .build()?;

    let email_client = PostmarkEmailClient::new(
        settings.email_client.base_url.clone(),
        Email::parse(&settings.email_client.sender)?,
        settings.email_client.auth_token.clone(),
        http_client,
    );

    let state = build_auth_state(&settings, user_store, kv_store, email_client)?;

    let allowed_origins = settings
        .application
        .allowed_origins
        .as_deref()
        .map(AllowedOrigins::parse);

    let listener = tokio::net::TcpListener::bind(&settings.application.listen_address).await?;

    AuthService::new(state)
        .run_standalone(listener, allowed_origins)
        .await?;

    Ok(())
}

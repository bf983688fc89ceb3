//! Backend server.
//!
//! Wires the member table, the shared refresh session store, and the
//! authentication routes into a single actix-web server.
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use anyhow::Context;
use footlog_auth::Authenticator;
use footlog_auth::Config;
use footlog_auth::Crypto;
use footlog_auth::Member;
use footlog_auth::RedisVault;
use std::sync::Arc;
use tokio_postgres::Client;

type Members = Arc<Client>;

async fn health(client: web::Data<Members>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

#[rustfmt::skip]
pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let bind = std::env::var("BIND_ADDR").context("BIND_ADDR must be set")?;
    let db_url = std::env::var("DB_URL").context("DB_URL must be set")?;
    let redis_url = std::env::var("REDIS_URL").context("REDIS_URL must be set")?;
    let client = footlog_pg::db(&db_url).await?;
    footlog_pg::migrate::<Member>(&client).await?;
    let sessions = RedisVault::new(&redis_url)?;
    let auth = Authenticator::new(config, client.clone(), sessions)?;
    let origin = auth.config().client_origin.clone();
    let crypto = web::Data::new(Crypto::clone(auth.crypto()));
    let auth = web::Data::new(auth);
    let client = web::Data::new(client);
    log::info!("starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allowed_origin(&origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
            )
            .app_data(auth.clone())
            .app_data(crypto.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .configure(footlog_auth::routes::<Members, RedisVault>)
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}

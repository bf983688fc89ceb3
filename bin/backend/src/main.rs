//! Backend Binary
//!
//! Serves the authentication API on BIND_ADDR (e.g. 0.0.0.0:8080).
//! Requires JWT_SECRET, DB_URL, and REDIS_URL.

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(e) = footlog_core::log() {
        eprintln!("failed to initialize logging: {}", e);
    }
    footlog_core::kys();
    match footlog_server::run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server exited: {:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

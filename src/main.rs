use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::Level;
use wastewise::calibration::{self, CalibrationModel};
use wastewise::service::WasteService;
use wastewise::state::AppState;
use wastewise::store::{BinStore, MemoryStore};
use wastewise::{api, config, seed};

fn init_tracing(level: &str) {
    let parsed = Level::from_str(level).ok();
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(parsed.unwrap_or(Level::INFO))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    if parsed.is_none() {
        tracing::warn!(level, "Unknown log level, using info");
    }
}

fn load_calibration(config: &config::Config) -> CalibrationModel {
    match config.calibration_path() {
        Some(path) => match calibration::load_calibration_from_path(path) {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    empty_distance_cm = model.empty_distance_cm,
                    full_distance_cm = model.full_distance_cm,
                    "Calibration loaded"
                );
                model
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load calibration, using default");
                CalibrationModel::default()
            }
        },
        None => {
            tracing::info!("No calibration path configured, using default calibration");
            CalibrationModel::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "wastewise starting"
    );

    let calibration = load_calibration(&config);
    let store: Arc<dyn BinStore> = Arc::new(MemoryStore::new());

    let seeds = config.seed_bins();
    if seeds.is_empty() {
        tracing::warn!("No seed bins configured in [[seed.bins]]");
    } else {
        seed::seed_bins(store.as_ref(), seeds, &calibration, SystemTime::now())?;
    }

    let service = WasteService::new(store, calibration, config.route_options());
    let state = Arc::new(AppState::new(service, config.default_window_minutes()));

    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("wastewise stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

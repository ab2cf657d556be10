use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use ride_hailing::config::environment::EnvironmentConfig;
use ride_hailing::database::connection::create_pool;
use ride_hailing::database::schema::ensure_schema;
use ride_hailing::routes::create_app_router;
use ride_hailing::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚕 Ride Hailing - Backend");
    info!("=========================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    ensure_schema(&pool).await?;

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app_router(AppState::new(pool, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔑 Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/me - Perfil del usuario autenticado");
    info!("🚕 Rides:");
    info!("   POST /api/rides/request - Solicitar viaje");
    info!("   POST /api/rides/:id/accept - Aceptar viaje");
    info!("   POST /api/rides/:id/arrive - Marcar llegada al origen");
    info!("   POST /api/rides/:id/start - Iniciar viaje");
    info!("   POST /api/rides/:id/complete - Completar viaje");
    info!("   POST /api/rides/:id/cancel - Cancelar viaje");
    info!("   GET  /api/rides/:id - Detalle del viaje");
    info!("   GET  /api/rides/history - Viajes terminados");
    info!("   GET  /api/rides/active - Viaje en curso");
    info!("   GET  /api/rides/available - Viajes disponibles (conductores)");
    info!("🚦 Drivers:");
    info!("   PUT  /api/drivers/status - Cambiar disponibilidad");
    info!("💬 Messages:");
    info!("   POST /api/messages - Enviar mensaje");
    info!("   GET  /api/messages/ride/:ride_id - Historial del chat");
    info!("   PUT  /api/messages/:id/read - Marcar como leído");
    info!("📡 Realtime:");
    info!("   GET  /api/ws - Canal WebSocket");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

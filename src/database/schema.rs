//! Esquema de la base de datos
//!
//! Este módulo crea las tablas e índices si no existen todavía.
//! Se ejecuta al arrancar el servidor, antes de aceptar tráfico.

use sqlx::PgPool;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('passenger', 'driver')),
    driver_status TEXT NOT NULL DEFAULT 'offline',
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_RIDES: &str = r#"
CREATE TABLE IF NOT EXISTS rides (
    id UUID PRIMARY KEY,
    passenger_id UUID NOT NULL REFERENCES users(id),
    driver_id UUID REFERENCES users(id),
    status TEXT NOT NULL DEFAULT 'pending',
    pickup_lat DOUBLE PRECISION NOT NULL,
    pickup_lng DOUBLE PRECISION NOT NULL,
    pickup_address TEXT NOT NULL,
    dropoff_lat DOUBLE PRECISION NOT NULL,
    dropoff_lng DOUBLE PRECISION NOT NULL,
    dropoff_address TEXT NOT NULL,
    distance_km NUMERIC(10, 2),
    estimated_duration_min INTEGER,
    actual_duration_min INTEGER,
    fare NUMERIC(10, 2),
    fare_breakdown JSONB,
    payment_method TEXT NOT NULL DEFAULT 'cash',
    accepted_at TIMESTAMPTZ,
    arrived_at TIMESTAMPTZ,
    started_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,
    cancelled_by TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_RIDE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS ride_messages (
    id UUID PRIMARY KEY,
    ride_id UUID NOT NULL REFERENCES rides(id),
    sender_id UUID NOT NULL REFERENCES users(id),
    sender_role TEXT NOT NULL,
    body TEXT NOT NULL,
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_rides_passenger_id ON rides(passenger_id)",
    "CREATE INDEX IF NOT EXISTS idx_rides_driver_id ON rides(driver_id)",
    "CREATE INDEX IF NOT EXISTS idx_rides_status ON rides(status)",
    "CREATE INDEX IF NOT EXISTS idx_ride_messages_ride_id ON ride_messages(ride_id, created_at)",
];

/// Crear tablas e índices si no existen
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_RIDES).execute(pool).await?;
    sqlx::query(CREATE_RIDE_MESSAGES).execute(pool).await?;

    for statement in CREATE_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("🗄️ Esquema de base de datos verificado");
    Ok(())
}

//! Cálculo de tarifas
//!
//! Tarifa = base + distancia + tiempo, con un mínimo garantizado.
//! Los montos se manejan siempre como Decimal, nunca como float.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tabla de precios vigente
#[derive(Debug, Clone)]
pub struct Pricing {
    pub base_fare: Decimal,
    pub per_km: Decimal,
    pub per_minute: Decimal,
    pub minimum_fare: Decimal,
}

lazy_static! {
    static ref PRICING: Pricing = Pricing {
        base_fare: Decimal::new(250, 2),    // 2.50
        per_km: Decimal::new(120, 2),       // 1.20
        per_minute: Decimal::new(35, 2),    // 0.35
        minimum_fare: Decimal::new(500, 2), // 5.00
    };
}

/// Desglose de la tarifa de un viaje
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: Decimal,
    pub distance_fare: Decimal,
    pub time_fare: Decimal,
    pub total: Decimal,
}

/// Calcular la tarifa a partir de distancia (km) y duración (minutos)
pub fn calculate_fare(distance_km: Option<Decimal>, duration_min: Option<i32>) -> FareBreakdown {
    let distance_fare = distance_km
        .map(|d| (d * PRICING.per_km).round_dp(2))
        .unwrap_or(Decimal::ZERO);

    let time_fare = duration_min
        .map(|m| (Decimal::from(m) * PRICING.per_minute).round_dp(2))
        .unwrap_or(Decimal::ZERO);

    let subtotal = PRICING.base_fare + distance_fare + time_fare;
    let total = subtotal.max(PRICING.minimum_fare);

    FareBreakdown {
        base_fare: PRICING.base_fare,
        distance_fare,
        time_fare,
        total,
    }
}

/// Duración real del viaje en minutos, redondeada hacia arriba (mínimo 1)
pub fn actual_duration_minutes(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> i32 {
    let seconds = (completed_at - started_at).num_seconds().max(0);
    let minutes = (seconds + 59) / 60;
    (minutes as i32).max(1)
}

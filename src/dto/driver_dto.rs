use serde::Deserialize;

// Request para cambiar la disponibilidad del conductor
#[derive(Debug, Deserialize)]
pub struct UpdateDriverStatusRequest {
    pub is_online: bool,
}

//! Middleware for the API. The dashboard is served from a different
//! origin in development, so CORS stays permissive.

use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

//! Version information API endpoint.

use axum::Json;

use crate::version::VersionInfo;

/// Get version and build information
#[utoipa::path(
    get,
    path = "/api/version",
    tag = "system",
    responses(
        (status = 200, description = "Version information", body = VersionInfo)
    )
)]
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo::get())
}

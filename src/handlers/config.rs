use crate::{
    database::connection::DbPool, middleware::auth::AuthenticatedUser, models::config::AppConfig,
    requests::config::ConfigValueRequest, utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};

pub async fn get_config(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    let key = path.into_inner();

    match AppConfig::get(&pool, &key).await {
        Ok(Some(value)) => Ok(HttpResponse::Ok().json(ApiResponse::success(value))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            format!("Config key {} not found", key),
        ))),
        Err(e) => {
            error!("Database error reading config {}: {}", key, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to read configuration".to_string(),
                )),
            )
        }
    }
}

pub async fn set_config(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    request: web::Json<ConfigValueRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    if !user.user_role.is_admin() {
        return Ok(HttpResponse::Forbidden()
            .json(ApiResponse::<()>::error("Access denied".to_string())));
    }

    let key = path.into_inner();
    info!("Admin {} setting config key {}", user.user_id, key);

    match AppConfig::set(&pool, &key, &request.value).await {
        Ok(config) => Ok(HttpResponse::Ok().json(ApiResponse::success(config))),
        Err(e) => {
            error!("Database error writing config {}: {}", key, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to write configuration".to_string(),
                )),
            )
        }
    }
}

use crate::error::AppError;
use crate::middlewares::get_authenticated_profile;
use crate::models::*;
use crate::services::PityConfigService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/app-state/pity-config",
    tag = "app_state",
    responses(
        (status = 200, description = "获取 pity 配置成功", body = PityConfigResponse),
        (status = 500, description = "配置已损坏", body = ApiError)
    )
)]
/// 获取当前生效的 pity 配置（公开）
pub async fn get_pity_config(service: web::Data<PityConfigService>) -> Result<HttpResponse> {
    match service.get_config().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/app-state/pity-config",
    tag = "app_state",
    request_body = UpdatePityConfigRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新 pity 配置成功", body = PityConfigResponse),
        (status = 400, description = "参数错误", body = ApiError),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要管理员权限")
    )
)]
/// 部分更新 pity 配置（仅管理员）
pub async fn update_pity_config(
    service: web::Data<PityConfigService>,
    req: HttpRequest,
    body: web::Json<UpdatePityConfigRequest>,
) -> Result<HttpResponse> {
    match get_authenticated_profile(&req) {
        Some(profile) if profile.is_admin => {}
        Some(_) => return Ok(AppError::Forbidden.error_response()),
        None => {
            return Ok(AppError::AuthError("Missing access token".to_string()).error_response());
        }
    }
    match service.update_config(&body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn app_state_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/app-state").service(
            web::resource("/pity-config")
                .route(web::get().to(get_pity_config))
                .route(web::patch().to(update_pity_config)),
        ),
    );
}

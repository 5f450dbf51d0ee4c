use crate::error::AppError;
use crate::middlewares::get_authenticated_profile;
use crate::models::*;
use crate::services::GachaService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

/// 从请求扩展中获取档案ID（中间件在鉴权后注入）
fn get_profile_id_from_request(req: &HttpRequest) -> Result<Uuid, AppError> {
    get_authenticated_profile(req)
        .map(|p| p.profile_id)
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

#[utoipa::path(
    post,
    path = "/gacha/roll",
    tag = "gacha",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽卡成功", body = RollResponse),
        (status = 400, description = "余额不足", body = ApiError),
        (status = 401, description = "未授权"),
        (status = 409, description = "事务冲突，可重试", body = ApiError),
        (status = 503, description = "没有可抽取的奖励", body = ApiError)
    )
)]
/// 进行一次抽卡:
/// 1. 扣除固定费用
/// 2. 按 pity 加成后的分组概率抽分组，再在组内抽物品
/// 3. 有限库存物品扣减库存
/// 4. 生成归属记录并更新 pity 计数
pub async fn roll(service: web::Data<GachaService>, req: HttpRequest) -> Result<HttpResponse> {
    let profile_id = match get_profile_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.roll(profile_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gacha/odds",
    tag = "gacha",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取当前概率成功", body = OddsResponse),
        (status = 401, description = "未授权"),
        (status = 503, description = "没有可抽取的奖励", body = ApiError)
    )
)]
/// 当前 pity 计数下各分组的抽取概率
pub async fn get_odds(service: web::Data<GachaService>, req: HttpRequest) -> Result<HttpResponse> {
    let profile_id = match get_profile_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.odds(profile_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gacha/records",
    tag = "gacha",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20，最大100)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取归属记录成功"),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取归属记录（倒序）
pub async fn get_records(
    service: web::Data<GachaService>,
    req: HttpRequest,
    query: web::Query<OwnershipRecordQuery>,
) -> Result<HttpResponse> {
    let profile_id = match get_profile_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_records(profile_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn gacha_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gacha")
            .route("/roll", web::post().to(roll))
            .route("/odds", web::get().to(get_odds))
            .route("/records", web::get().to(get_records)),
    );
}

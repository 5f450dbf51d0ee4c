use crate::entities::pity_policy_entity as policies;
use crate::error::{AppError, AppResult};
use crate::gacha::{BasisPoints, PityPolicy};
use crate::models::{PityConfigResponse, UpdatePityConfigRequest};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryOrder, Set, TransactionTrait,
};

/// 读取 pity 配置；没有配置行时使用默认值
///
/// Takes any connection so the roll transaction reads the policy it draws with.
pub async fn load_policy<C: ConnectionTrait>(conn: &C) -> AppResult<PityPolicy> {
    let row = policies::Entity::find()
        .order_by_asc(policies::Column::Id)
        .one(conn)
        .await?;
    match row {
        Some(m) => Ok(PityPolicy::try_from(&m)?),
        None => Ok(PityPolicy::default()),
    }
}

#[derive(Clone)]
pub struct PityConfigService {
    pool: DatabaseConnection,
}

impl PityConfigService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前生效的 pity 配置
    pub async fn get_policy(&self) -> AppResult<PityPolicy> {
        load_policy(&self.pool).await
    }

    pub async fn get_config(&self) -> AppResult<PityConfigResponse> {
        let policy = self.get_policy().await?;
        Ok(PityConfigResponse::from(&policy))
    }

    /// 部分更新 pity 配置（不存在则创建）
    pub async fn update_config(
        &self,
        req: &UpdatePityConfigRequest,
    ) -> AppResult<PityConfigResponse> {
        let txn = self.pool.begin().await?;

        let current = policies::Entity::find()
            .order_by_asc(policies::Column::Id)
            .one(&txn)
            .await?;
        // 已损坏的配置允许被管理员覆盖，因此以默认值为基础
        let base = current
            .as_ref()
            .and_then(|m| PityPolicy::try_from(m).ok())
            .unwrap_or_default();
        let updated = apply_update(&base, req)?;

        match current {
            Some(m) => {
                let mut am = m.into_active_model();
                am.enabled = Set(updated.enabled);
                am.rolls_until_pity = Set(to_stored(updated.rolls_until_pity()));
                am.boost_formula = Set(updated.boost_formula.as_str().to_string());
                am.win_weight_threshold = Set(to_stored(updated.win_weight_threshold.get()));
                am.updated_at = Set(Utc::now());
                am.update(&txn).await?;
            }
            None => {
                policies::ActiveModel {
                    enabled: Set(updated.enabled),
                    rolls_until_pity: Set(to_stored(updated.rolls_until_pity())),
                    boost_formula: Set(updated.boost_formula.as_str().to_string()),
                    win_weight_threshold: Set(to_stored(updated.win_weight_threshold.get())),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;

        log::info!(
            "Pity config updated: enabled={}, rolls_until_pity={}, formula={}, win_threshold={}",
            updated.enabled,
            updated.rolls_until_pity(),
            updated.boost_formula,
            updated.win_weight_threshold
        );
        Ok(PityConfigResponse::from(&updated))
    }
}

// 已校验的值不会超过 i32 范围
fn to_stored(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// 合并请求中的字段并校验
fn apply_update(base: &PityPolicy, req: &UpdatePityConfigRequest) -> AppResult<PityPolicy> {
    let rolls_until_pity = match req.rolls_until_pity {
        Some(n) if n < 1 || n > i64::from(i32::MAX) => {
            return Err(AppError::ValidationError(
                "rolls_until_pity must be a positive integer".into(),
            ));
        }
        Some(n) => n as u32,
        None => base.rolls_until_pity(),
    };
    let win_weight_threshold = match req.win_weight_threshold {
        Some(n) if !(0..=i64::from(BasisPoints::SCALE)).contains(&n) => {
            return Err(AppError::ValidationError(format!(
                "win_weight_threshold must be between 0 and {}",
                BasisPoints::SCALE
            )));
        }
        Some(n) => BasisPoints::new(n as u32),
        None => base.win_weight_threshold,
    };

    Ok(PityPolicy::new(
        req.enabled.unwrap_or(base.enabled),
        rolls_until_pity,
        req.boost_formula.unwrap_or(base.boost_formula),
        win_weight_threshold,
    )?)
}

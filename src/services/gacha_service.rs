use crate::entities::{
    ownership_record_entity as records, profile_entity as profiles,
    reward_group_entity as groups, reward_item_entity as items,
};
use crate::error::{AppError, AppResult};
use crate::gacha::{
    self, CounterUpdate, GroupWeightCalculator, RewardPool, RollDraw, next_counter,
};
use crate::models::{
    OddsResponse, OwnershipRecordPageResponse, OwnershipRecordQuery, PaginatedResponse,
    PaginationParams, RollResponse, RolledItem,
};
use crate::services::pity_config_service::load_policy;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct GachaService {
    pool: DatabaseConnection,
    roll_cost: i64,
}

impl GachaService {
    pub fn new(pool: DatabaseConnection, roll_cost: i64) -> Self {
        Self { pool, roll_cost }
    }

    /// 抽卡 (Roll)
    pub async fn roll(&self, profile_id: Uuid) -> AppResult<RollResponse> {
        let mut rng = StdRng::from_entropy();
        self.roll_with_rng(profile_id, &mut rng).await
    }

    /// 抽卡，随机源由调用方提供
    ///
    /// 逻辑 (单个事务内完成，任一步失败整体回滚):
    /// 1. 读取档案并校验余额
    /// 2. 读取 pity 配置、启用的分组与可抽取物品
    /// 3. 先抽分组 (pity 加成后归一化)，再在组内抽物品
    /// 4. 落库 (见 [`settle_roll`])：条件扣费、条件扣减库存、写归属记录、更新 pity 计数
    /// 5. 读取最新档案后提交
    pub async fn roll_with_rng<R: Rng + Send>(
        &self,
        profile_id: Uuid,
        rng: &mut R,
    ) -> AppResult<RollResponse> {
        let cost = self.roll_cost;
        let txn = self
            .pool
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(AppError::TransactionFailed)?;

        let profile = profiles::Entity::find_by_id(profile_id)
            .one(&txn)
            .await
            .map_err(AppError::TransactionFailed)?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

        if !profile.can_afford(cost) {
            return Err(AppError::InsufficientFunds {
                balance: profile.coins,
                cost,
            });
        }
        let counter = pity_counter(&profile)?;

        let policy = load_policy(&txn).await.map_err(into_transaction_error)?;
        let (group_models, item_models) = load_candidates(&txn)
            .await
            .map_err(AppError::TransactionFailed)?;
        let reward_pool = RewardPool::from_models(&group_models, &item_models)?;

        let draw = gacha::draw(&reward_pool, &policy, counter, rng)?;
        let outcome = next_counter(&policy, draw.group.base_weight, counter);
        let record = settle_roll(&txn, &profile, cost, &draw, outcome.update).await?;

        let updated = profiles::Entity::find_by_id(profile_id)
            .one(&txn)
            .await
            .map_err(AppError::TransactionFailed)?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

        let item = item_models
            .iter()
            .find(|m| m.id == draw.item.id)
            .ok_or_else(|| AppError::InternalError(format!("item {} vanished", draw.item.id)))?;
        let group = group_models
            .iter()
            .find(|m| m.id == draw.group.group_id)
            .ok_or_else(|| {
                AppError::InternalError(format!("group {} vanished", draw.group.group_id))
            })?;
        let rolled = RolledItem::new(item, group);

        txn.commit().await.map_err(AppError::TransactionFailed)?;

        log::info!(
            "Roll completed: profile={}, group={}, item={}, pity_multiplier={}, win={}, counter={}->{}, balance={}",
            profile_id,
            draw.group.group_id,
            draw.item.id,
            draw.pity_multiplier,
            outcome.is_win,
            counter,
            updated.consecutive_rolls_without_win,
            updated.coins
        );

        Ok(RollResponse {
            item: rolled,
            record_id: record.unique_id,
            rolled_at: record.created_at,
            balance: updated.coins,
            pity_counter: updated.consecutive_rolls_without_win,
            is_win: outcome.is_win,
            pity_boosted: draw.pity_multiplier > 0,
        })
    }

    /// 当前 pity 计数下各分组的抽取概率 (只读)
    pub async fn odds(&self, profile_id: Uuid) -> AppResult<OddsResponse> {
        let profile = self.get_profile(profile_id).await?;
        let counter = pity_counter(&profile)?;
        let policy = load_policy(&self.pool).await?;

        let (group_models, item_models) = load_candidates(&self.pool).await?;
        let reward_pool = RewardPool::from_models(&group_models, &item_models)?;
        let distribution =
            GroupWeightCalculator::new(&policy).calculate(reward_pool.groups(), counter)?;

        Ok(OddsResponse::new(
            profile.consecutive_rolls_without_win,
            &distribution,
            &group_models,
        ))
    }

    /// 获取归属记录（分页，最新在前）
    pub async fn list_records(
        &self,
        profile_id: Uuid,
        query: &OwnershipRecordQuery,
    ) -> AppResult<OwnershipRecordPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query =
            records::Entity::find().filter(records::Column::ProfileId.eq(profile_id));
        let total = base_query.clone().count(&self.pool).await?;

        let rows = base_query
            .find_also_related(items::Entity)
            .order_by_desc(records::Column::CreatedAt)
            .order_by_desc(records::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> AppResult<profiles::Model> {
        profiles::Entity::find_by_id(profile_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))
    }
}

/// 抽中之后的落库步骤 (须在抽卡事务内调用)
///
/// `profile` 为事务开始时读到的快照；扣费与扣库存均以数据库当前值为准，
/// 条件不满足时返回错误，由调用方回滚事务。
pub async fn settle_roll(
    txn: &DatabaseTransaction,
    profile: &profiles::Model,
    cost: i64,
    draw: &RollDraw,
    update: CounterUpdate,
) -> AppResult<records::Model> {
    let profile_id = profile.id;
    let now = Utc::now();

    // 条件扣费：并发抽卡时余额不会被扣成负数
    let debited = profiles::Entity::update_many()
        .col_expr(
            profiles::Column::Coins,
            Expr::col(profiles::Column::Coins).sub(cost),
        )
        .col_expr(profiles::Column::UpdatedAt, Expr::value(now))
        .filter(profiles::Column::Id.eq(profile_id))
        .filter(profiles::Column::Coins.gte(cost))
        .exec(txn)
        .await
        .map_err(AppError::TransactionFailed)?;
    if debited.rows_affected == 0 {
        log::warn!("Roll debit lost a race: profile={profile_id}, cost={cost}");
        return Err(AppError::InsufficientFunds {
            balance: profile.coins,
            cost,
        });
    }

    if draw.item.is_finite() {
        let secured = items::Entity::update_many()
            .col_expr(
                items::Column::StockQuantity,
                Expr::col(items::Column::StockQuantity).sub(1),
            )
            .col_expr(items::Column::UpdatedAt, Expr::value(now))
            .filter(items::Column::Id.eq(draw.item.id))
            .filter(items::Column::StockQuantity.gt(0))
            .exec(txn)
            .await
            .map_err(AppError::TransactionFailed)?;
        if secured.rows_affected == 0 {
            log::warn!(
                "Item {} sold out while rolling for profile {profile_id}",
                draw.item.id
            );
            return Err(AppError::TransactionFailed(DbErr::Custom(format!(
                "item {} is out of stock",
                draw.item.id
            ))));
        }
    }

    let record = records::ActiveModel {
        unique_id: Set(Uuid::new_v4()),
        profile_id: Set(profile_id),
        item_id: Set(draw.item.id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(AppError::TransactionFailed)?;

    // 相对更新，不覆盖并发事务写入的值
    let counter_expr = match update {
        CounterUpdate::Reset => Expr::value(0),
        CounterUpdate::Increment => {
            Expr::col(profiles::Column::ConsecutiveRollsWithoutWin).add(1)
        }
    };
    profiles::Entity::update_many()
        .col_expr(profiles::Column::ConsecutiveRollsWithoutWin, counter_expr)
        .filter(profiles::Column::Id.eq(profile_id))
        .exec(txn)
        .await
        .map_err(AppError::TransactionFailed)?;

    Ok(record)
}

// -----------------------------
// 内部辅助方法
// -----------------------------

/// 启用的分组与可抽取物品 (库存不为 0)
async fn load_candidates<C: ConnectionTrait>(
    conn: &C,
) -> Result<(Vec<groups::Model>, Vec<items::Model>), DbErr> {
    let group_models = groups::Entity::find()
        .filter(groups::Column::IsActive.eq(true))
        .order_by_asc(groups::Column::Id)
        .all(conn)
        .await?;
    let item_models = items::Entity::find()
        .filter(items::Column::IsActive.eq(true))
        .filter(items::Column::StockQuantity.ne(0))
        .order_by_asc(items::Column::Id)
        .all(conn)
        .await?;
    Ok((group_models, item_models))
}

fn pity_counter(profile: &profiles::Model) -> AppResult<u32> {
    u32::try_from(profile.consecutive_rolls_without_win).map_err(|_| {
        AppError::InvalidConfiguration(format!(
            "profile {}: pity counter is negative ({})",
            profile.id, profile.consecutive_rolls_without_win
        ))
    })
}

// 事务内的数据库错误统一视为事务失败
fn into_transaction_error(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(db) => AppError::TransactionFailed(db),
        other => other,
    }
}

#![allow(dead_code)]

use chrono::Utc;
use gacha_backend::entities::{
    ownership_record_entity as records, pity_policy_entity as policies,
    profile_entity as profiles, reward_group_entity as groups, reward_item_entity as items,
};
use gacha_backend::gacha::RewardPool;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

pub const ROLL_COST: i64 = 50;

/// 单连接的内存 SQLite，所有查询共享同一个数据库
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_profile(db: &DatabaseConnection, coins: i64, counter: i32) -> Uuid {
    let id = Uuid::new_v4();
    profiles::ActiveModel {
        id: Set(id),
        username: Set(format!("player-{}", &id.to_string()[..8])),
        coins: Set(coins),
        consecutive_rolls_without_win: Set(counter),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

pub async fn create_group(db: &DatabaseConnection, name: &str, base_weight: i32) -> i64 {
    groups::ActiveModel {
        name: Set(name.to_string()),
        base_weight: Set(base_weight),
        is_limited_edition: Set(false),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn create_item(
    db: &DatabaseConnection,
    group_id: i64,
    name: &str,
    stock_quantity: i32,
    manual_weight: Option<i32>,
) -> i64 {
    items::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        image: Set(None),
        group_id: Set(Some(group_id)),
        stock_quantity: Set(stock_quantity),
        manual_weight: Set(manual_weight),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn set_policy(
    db: &DatabaseConnection,
    enabled: bool,
    rolls_until_pity: i32,
    boost_formula: &str,
    win_weight_threshold: i32,
) {
    policies::Entity::update_many()
        .col_expr(policies::Column::Enabled, Expr::value(enabled))
        .col_expr(policies::Column::RollsUntilPity, Expr::value(rolls_until_pity))
        .col_expr(policies::Column::BoostFormula, Expr::value(boost_formula))
        .col_expr(
            policies::Column::WinWeightThreshold,
            Expr::value(win_weight_threshold),
        )
        .exec(db)
        .await
        .unwrap();
}

pub async fn profile(db: &DatabaseConnection, id: Uuid) -> profiles::Model {
    profiles::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

pub async fn stock_of(db: &DatabaseConnection, item_id: i64) -> i32 {
    items::Entity::find_by_id(item_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

pub async fn record_count(db: &DatabaseConnection, profile_id: Uuid) -> u64 {
    records::Entity::find()
        .filter(records::Column::ProfileId.eq(profile_id))
        .count(db)
        .await
        .unwrap()
}

/// 模拟另一笔已提交的事务改写余额
pub async fn set_coins(db: &DatabaseConnection, id: Uuid, coins: i64) {
    profiles::Entity::update_many()
        .col_expr(profiles::Column::Coins, Expr::value(coins))
        .filter(profiles::Column::Id.eq(id))
        .exec(db)
        .await
        .unwrap();
}

pub async fn set_stock(db: &DatabaseConnection, item_id: i64, stock_quantity: i32) {
    items::Entity::update_many()
        .col_expr(items::Column::StockQuantity, Expr::value(stock_quantity))
        .filter(items::Column::Id.eq(item_id))
        .exec(db)
        .await
        .unwrap();
}

pub async fn reward_pool(db: &DatabaseConnection) -> RewardPool {
    let group_models = groups::Entity::find().all(db).await.unwrap();
    let item_models = items::Entity::find().all(db).await.unwrap();
    RewardPool::from_models(&group_models, &item_models).unwrap()
}

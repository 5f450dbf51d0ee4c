mod common;

use common::*;
use gacha_backend::AppError;
use gacha_backend::gacha::{self, CounterUpdate, PityPolicy};
use gacha_backend::models::OwnershipRecordQuery;
use gacha_backend::services::{GachaService, settle_roll};
use rand::rngs::mock::StepRng;
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

// 常量随机源：0 落在第一个分组，u64::MAX 落在最后一个分组
fn fixed_rng(value: u64) -> StepRng {
    StepRng::new(value, 0)
}

#[tokio::test]
async fn test_roll_debits_and_advances_counter() {
    let db = setup_db().await;
    let common_group = create_group(&db, "Common", 9990).await;
    let rare_group = create_group(&db, "Rare", 10).await;
    let common_item = create_item(&db, common_group, "Sticker", -1, None).await;
    let rare_item = create_item(&db, rare_group, "Golden Ticket", -1, None).await;
    let service = GachaService::new(db.clone(), ROLL_COST);

    // 抽中普通分组：未中，计数 9 -> 10
    let profile_id = create_profile(&db, 1000, 9).await;
    let result = service
        .roll_with_rng(profile_id, &mut fixed_rng(0))
        .await
        .unwrap();
    assert_eq!(result.item.id, common_item);
    assert_eq!(result.balance, 950);
    assert!(!result.is_win);
    assert_eq!(result.pity_counter, 10);
    // 计数 9 < 10，本次不加成
    assert!(!result.pity_boosted);

    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 950);
    assert_eq!(stored.consecutive_rolls_without_win, 10);
    assert_eq!(record_count(&db, profile_id).await, 1);

    // 抽中稀有分组：中，计数清零
    let profile_id = create_profile(&db, 1000, 9).await;
    let result = service
        .roll_with_rng(profile_id, &mut fixed_rng(u64::MAX))
        .await
        .unwrap();
    assert_eq!(result.item.id, rare_item);
    assert_eq!(result.balance, 950);
    assert!(result.is_win);
    assert_eq!(result.pity_counter, 0);
    assert!(!result.pity_boosted);

    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 950);
    assert_eq!(stored.consecutive_rolls_without_win, 0);
    assert_eq!(record_count(&db, profile_id).await, 1);
}

#[tokio::test]
async fn test_selected_group_at_threshold_resets_counter() {
    let db = setup_db().await;
    let group = create_group(&db, "Epic", 500).await;
    create_item(&db, group, "Dragon", -1, None).await;
    let profile_id = create_profile(&db, 100, 7).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let result = service.roll(profile_id).await.unwrap();
    assert!(result.is_win);
    assert_eq!(result.pity_counter, 0);
    assert_eq!(profile(&db, profile_id).await.consecutive_rolls_without_win, 0);
}

#[tokio::test]
async fn test_selected_group_above_threshold_increments_counter() {
    let db = setup_db().await;
    let group = create_group(&db, "Uncommon", 501).await;
    create_item(&db, group, "Badge", -1, None).await;
    let profile_id = create_profile(&db, 100, 7).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let result = service.roll(profile_id).await.unwrap();
    assert!(!result.is_win);
    assert_eq!(result.pity_counter, 8);
}

#[tokio::test]
async fn test_win_resets_counter_when_pity_disabled() {
    let db = setup_db().await;
    set_policy(&db, false, 10, "inverse", 500).await;
    let group = create_group(&db, "Legendary", 10).await;
    create_item(&db, group, "Crown", -1, None).await;
    let profile_id = create_profile(&db, 100, 42).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let result = service.roll(profile_id).await.unwrap();
    assert!(result.is_win);
    assert!(!result.pity_boosted);
    assert_eq!(result.pity_counter, 0);
}

#[tokio::test]
async fn test_finite_stock_is_consumed_exactly() {
    let db = setup_db().await;
    let group = create_group(&db, "Limited", 100).await;
    let item = create_item(&db, group, "Signed Poster", 3, None).await;
    let profile_id = create_profile(&db, 1000, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    for expected_stock in [2, 1, 0] {
        let result = service.roll(profile_id).await.unwrap();
        assert_eq!(result.item.id, item);
        assert_eq!(stock_of(&db, item).await, expected_stock);
    }
    assert_eq!(record_count(&db, profile_id).await, 3);

    // 库存耗尽后不再有可抽取奖励，且不扣费
    let err = service.roll(profile_id).await.unwrap_err();
    assert!(matches!(err, AppError::NoEligibleRewards));
    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 850);
    assert_eq!(stored.consecutive_rolls_without_win, 0);
    assert_eq!(stock_of(&db, item).await, 0);
    assert_eq!(record_count(&db, profile_id).await, 3);
}

#[tokio::test]
async fn test_unlimited_stock_is_never_decremented() {
    let db = setup_db().await;
    let group = create_group(&db, "Common", 9000).await;
    let item = create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, 500, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    for _ in 0..5 {
        service.roll(profile_id).await.unwrap();
    }
    assert_eq!(stock_of(&db, item).await, -1);
    assert_eq!(profile(&db, profile_id).await.coins, 250);
}

#[tokio::test]
async fn test_insufficient_funds_changes_nothing() {
    let db = setup_db().await;
    let group = create_group(&db, "Common", 9000).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, ROLL_COST - 1, 3).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let err = service.roll(profile_id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientFunds { balance: 49, cost: 50 }
    ));

    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 49);
    assert_eq!(stored.consecutive_rolls_without_win, 3);
    assert_eq!(record_count(&db, profile_id).await, 0);
}

#[tokio::test]
async fn test_exact_balance_can_roll_once() {
    let db = setup_db().await;
    let group = create_group(&db, "Common", 9000).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, ROLL_COST, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    assert_eq!(service.roll(profile_id).await.unwrap().balance, 0);
    assert!(matches!(
        service.roll(profile_id).await,
        Err(AppError::InsufficientFunds { balance: 0, .. })
    ));
}

#[tokio::test]
async fn test_concurrent_rolls_never_overdraw() {
    let db = setup_db().await;
    let group = create_group(&db, "Common", 9000).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, ROLL_COST, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let (first, second) = tokio::join!(service.roll(profile_id), service.roll(profile_id));

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(r, Err(AppError::InsufficientFunds { .. }))));

    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 0);
    assert_eq!(record_count(&db, profile_id).await, 1);
}

#[tokio::test]
async fn test_debit_lost_to_concurrent_roll_is_insufficient_funds() {
    let db = setup_db().await;
    let group = create_group(&db, "Limited", 100).await;
    let item = create_item(&db, group, "Signed Poster", 2, None).await;
    let profile_id = create_profile(&db, ROLL_COST, 4).await;

    // 抽取时读到的快照余额足够
    let snapshot = profile(&db, profile_id).await;
    let pool = reward_pool(&db).await;
    let draw = gacha::draw(&pool, &PityPolicy::default(), 4, &mut fixed_rng(0)).unwrap();
    // 另一笔抽卡先提交，余额已不足
    set_coins(&db, profile_id, ROLL_COST - 1).await;
    let before = profile(&db, profile_id).await;

    let txn = db.begin().await.unwrap();
    let err = settle_roll(&txn, &snapshot, ROLL_COST, &draw, CounterUpdate::Increment)
        .await
        .unwrap_err();
    txn.rollback().await.unwrap();

    assert!(matches!(
        err,
        AppError::InsufficientFunds { balance: 50, cost: 50 }
    ));
    assert_eq!(profile(&db, profile_id).await, before);
    assert_eq!(stock_of(&db, item).await, 2);
    assert_eq!(record_count(&db, profile_id).await, 0);
}

#[tokio::test]
async fn test_stock_lost_to_concurrent_roll_fails_transaction() {
    let db = setup_db().await;
    let group = create_group(&db, "Limited", 100).await;
    let item = create_item(&db, group, "Signed Poster", 1, None).await;
    let profile_id = create_profile(&db, 1000, 4).await;

    let snapshot = profile(&db, profile_id).await;
    let pool = reward_pool(&db).await;
    let draw = gacha::draw(&pool, &PityPolicy::default(), 4, &mut fixed_rng(0)).unwrap();
    assert_eq!(draw.item.id, item);
    // 最后一件在抽取之后被别人抽走
    set_stock(&db, item, 0).await;

    let txn = db.begin().await.unwrap();
    let err = settle_roll(&txn, &snapshot, ROLL_COST, &draw, CounterUpdate::Increment)
        .await
        .unwrap_err();
    txn.rollback().await.unwrap();

    assert!(matches!(err, AppError::TransactionFailed(_)));
    assert!(err.is_retryable());
    // 已执行的扣费随事务回滚
    assert_eq!(profile(&db, profile_id).await, snapshot);
    assert_eq!(stock_of(&db, item).await, 0);
    assert_eq!(record_count(&db, profile_id).await, 0);
}

#[tokio::test]
async fn test_failure_after_selection_rolls_back_everything() {
    let db = setup_db().await;
    let group = create_group(&db, "Limited", 100).await;
    let item = create_item(&db, group, "Signed Poster", 2, None).await;
    let profile_id = create_profile(&db, 1000, 4).await;

    // 写归属记录时失败：扣费与扣库存必须一并回滚
    db.execute_unprepared("DROP TABLE ownership_records")
        .await
        .unwrap();

    let service = GachaService::new(db.clone(), ROLL_COST);
    let err = service.roll(profile_id).await.unwrap_err();
    assert!(matches!(err, AppError::TransactionFailed(_)));
    assert!(err.is_retryable());

    let stored = profile(&db, profile_id).await;
    assert_eq!(stored.coins, 1000);
    assert_eq!(stored.consecutive_rolls_without_win, 4);
    assert_eq!(stock_of(&db, item).await, 2);
}

#[tokio::test]
async fn test_no_groups_is_no_eligible_rewards() {
    let db = setup_db().await;
    let profile_id = create_profile(&db, 1000, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    assert!(matches!(
        service.roll(profile_id).await,
        Err(AppError::NoEligibleRewards)
    ));
    assert_eq!(profile(&db, profile_id).await.coins, 1000);
}

#[tokio::test]
async fn test_corrupt_configuration_is_rejected() {
    let db = setup_db().await;
    let group = create_group(&db, "Broken", -5).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, 1000, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    assert!(matches!(
        service.roll(profile_id).await,
        Err(AppError::InvalidConfiguration(_))
    ));
    assert_eq!(profile(&db, profile_id).await.coins, 1000);
}

#[tokio::test]
async fn test_unknown_boost_formula_is_rejected() {
    let db = setup_db().await;
    set_policy(&db, true, 10, "exponential", 500).await;
    let group = create_group(&db, "Common", 9000).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, 1000, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    assert!(matches!(
        service.roll(profile_id).await,
        Err(AppError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let db = setup_db().await;
    let service = GachaService::new(db.clone(), ROLL_COST);
    assert!(matches!(
        service.roll(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_odds_reflect_pity_boost() {
    let db = setup_db().await;
    let common_group = create_group(&db, "Common", 9990).await;
    let rare_group = create_group(&db, "Rare", 10).await;
    create_item(&db, common_group, "Sticker", -1, None).await;
    create_item(&db, rare_group, "Golden Ticket", -1, None).await;

    let service = GachaService::new(db.clone(), ROLL_COST);

    let fresh = create_profile(&db, 0, 0).await;
    let base = service.odds(fresh).await.unwrap();
    assert_eq!(base.pity_multiplier, 0);

    let unlucky = create_profile(&db, 0, 20).await;
    let boosted = service.odds(unlucky).await.unwrap();
    assert_eq!(boosted.pity_multiplier, 2);
    assert_eq!(boosted.groups.len(), 2);

    let total: f64 = boosted.groups.iter().map(|g| g.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let rare = |odds: &gacha_backend::models::OddsResponse| {
        odds.groups
            .iter()
            .find(|g| g.group_id == rare_group)
            .unwrap()
            .probability
    };
    assert!((rare(&base) - 0.001).abs() < 1e-9);
    assert!(rare(&boosted) > rare(&base));
}

#[tokio::test]
async fn test_records_are_paginated_newest_first() {
    let db = setup_db().await;
    let group = create_group(&db, "Common", 9000).await;
    create_item(&db, group, "Sticker", -1, None).await;
    let profile_id = create_profile(&db, 1000, 0).await;

    let service = GachaService::new(db.clone(), ROLL_COST);
    let mut rolled = Vec::new();
    for _ in 0..3 {
        rolled.push(service.roll(profile_id).await.unwrap().record_id);
    }

    let page = service
        .list_records(
            profile_id,
            &OwnershipRecordQuery {
                page: Some(1),
                per_page: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].unique_id, rolled[2]);
    assert_eq!(page.data[0].item_name.as_deref(), Some("Sticker"));

    let other = create_profile(&db, 0, 0).await;
    let empty = service
        .list_records(
            other,
            &OwnershipRecordQuery {
                page: None,
                per_page: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.data.is_empty());
}

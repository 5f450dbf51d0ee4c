use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

/// Player profiles (coins + pity counter)
#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Username,
    Coins,
    ConsecutiveRollsWithoutWin,
    CreatedAt,
    UpdatedAt,
}

/// Rarity tiers
#[derive(DeriveIden)]
enum RewardGroups {
    Table,
    Id,
    Name,
    BaseWeight,
    IsLimitedEdition,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Concrete prizes
#[derive(DeriveIden)]
enum RewardItems {
    Table,
    Id,
    Name,
    Description,
    Image,
    GroupId,
    StockQuantity,
    ManualWeight,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// One row per successful roll
#[derive(DeriveIden)]
enum OwnershipRecords {
    Table,
    Id,
    UniqueId,
    ProfileId,
    ItemId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PityPolicies {
    Table,
    Id,
    Enabled,
    RollsUntilPity,
    BoostFormula,
    WinWeightThreshold,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Weights and thresholds are basis points: 10000 = 100%.
/// stock_quantity: -1 unlimited, > 0 remaining, 0 exhausted.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Username).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Profiles::Coins)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::ConsecutiveRollsWithoutWin)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardGroups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RewardGroups::Name).string_len(255).not_null())
                    .col(ColumnDef::new(RewardGroups::BaseWeight).integer().not_null())
                    .col(
                        ColumnDef::new(RewardGroups::IsLimitedEdition)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RewardGroups::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RewardGroups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RewardGroups::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RewardItems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(RewardItems::Description).text().null())
                    .col(ColumnDef::new(RewardItems::Image).text().null())
                    .col(ColumnDef::new(RewardItems::GroupId).big_integer().null())
                    .col(
                        ColumnDef::new(RewardItems::StockQuantity)
                            .integer()
                            .not_null()
                            .default(-1),
                    )
                    .col(ColumnDef::new(RewardItems::ManualWeight).integer().null())
                    .col(
                        ColumnDef::new(RewardItems::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RewardItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RewardItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reward_items_group")
                            .from(RewardItems::Table, RewardItems::GroupId)
                            .to(RewardGroups::Table, RewardGroups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reward_items_group")
                    .table(RewardItems::Table)
                    .col(RewardItems::GroupId)
                    .to_owned(),
            )
            .await?;

        // 记录只追加，不随物品下线删除
        manager
            .create_table(
                Table::create()
                    .table(OwnershipRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OwnershipRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OwnershipRecords::UniqueId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(OwnershipRecords::ProfileId).uuid().not_null())
                    .col(
                        ColumnDef::new(OwnershipRecords::ItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OwnershipRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ownership_records_profile")
                            .from(OwnershipRecords::Table, OwnershipRecords::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ownership_records_item")
                            .from(OwnershipRecords::Table, OwnershipRecords::ItemId)
                            .to(RewardItems::Table, RewardItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ownership_records_profile")
                    .table(OwnershipRecords::Table)
                    .col(OwnershipRecords::ProfileId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PityPolicies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PityPolicies::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PityPolicies::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PityPolicies::RollsUntilPity)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(PityPolicies::BoostFormula)
                            .string_len(32)
                            .not_null()
                            .default("inverse"),
                    )
                    .col(
                        ColumnDef::new(PityPolicies::WinWeightThreshold)
                            .integer()
                            .not_null()
                            .default(500),
                    )
                    .col(
                        ColumnDef::new(PityPolicies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 默认 pity 配置：10 次未中后开始加成，inverse 公式，500bp 以下算中
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "INSERT INTO pity_policies (enabled, rolls_until_pity, boost_formula, win_weight_threshold) \
             VALUES (TRUE, 10, 'inverse', 500)"
                .to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：记录 -> 物品 -> 分组 -> 用户 -> 配置
        manager
            .drop_table(Table::drop().if_exists().table(OwnershipRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(RewardItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(RewardGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(PityPolicies::Table).to_owned())
            .await?;

        Ok(())
    }
}

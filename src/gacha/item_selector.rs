use rand::Rng;

use super::distribution::{Distribution, DrawRange, Fallback};
use super::{BasisPoints, GachaError};
use crate::entities::{UNLIMITED_STOCK, reward_item_entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stock {
    Unlimited,
    /// 剩余数量，可抽取的物品恒大于 0
    Finite(u32),
}

/// 可抽取的物品 (已校验)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCandidate {
    pub id: i64,
    pub stock: Stock,
    pub manual_weight: Option<BasisPoints>,
}

impl ItemCandidate {
    /// 未启用或已售罄的物品返回 `Ok(None)`
    pub fn from_model(m: &reward_item_entity::Model) -> Result<Option<Self>, GachaError> {
        let stock = match m.stock_quantity {
            UNLIMITED_STOCK => Stock::Unlimited,
            0 => return Ok(None),
            n if n > 0 => Stock::Finite(n.unsigned_abs()),
            n => {
                return Err(GachaError::invalid(format!(
                    "item {}: stock_quantity must be -1 or >= 0, got {n}",
                    m.id
                )));
            }
        };
        let manual_weight = m
            .manual_weight
            .map(|w| BasisPoints::from_stored(w, "manual_weight"))
            .transpose()
            .map_err(|e| GachaError::invalid(format!("item {}: {e}", m.id)))?;

        if !m.is_available() {
            return Ok(None);
        }
        Ok(Some(Self {
            id: m.id,
            stock,
            manual_weight,
        }))
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.stock, Stock::Finite(_))
    }
}

/// 由分组内库存类型决定的加权方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// 无限物品按手动占比，有限物品按库存瓜分剩余部分
    Mixed,
    /// 手动权重或均分，在未归一化的总权重上抽取
    UnlimitedOnly,
    /// 按剩余库存加权
    FiniteOnly,
}

#[derive(Debug, Clone)]
pub struct ItemDistribution {
    mode: SelectionMode,
    item_ids: Vec<i64>,
    distribution: Distribution,
}

impl ItemDistribution {
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn item_ids(&self) -> &[i64] {
        &self.item_ids
    }

    pub fn weights(&self) -> &[f64] {
        self.distribution.weights()
    }

    fn draw_range(&self) -> DrawRange {
        match self.mode {
            SelectionMode::Mixed => DrawRange::Unit,
            SelectionMode::UnlimitedOnly | SelectionMode::FiniteOnly => DrawRange::Total,
        }
    }

    /// 累积和不足时兜底为第一个物品
    pub fn select_at(&self, r: f64) -> i64 {
        self.item_ids[self.distribution.pick(r)]
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        self.item_ids[self.distribution.sample(rng, self.draw_range())]
    }
}

pub struct ItemSelector;

impl ItemSelector {
    /// 仅含无限物品的分组：以基点均分 100%
    fn equal_split(count: usize) -> f64 {
        f64::from(BasisPoints::SCALE) / count as f64
    }

    pub fn distribution(items: &[ItemCandidate]) -> Result<ItemDistribution, GachaError> {
        if items.is_empty() {
            return Err(GachaError::NoEligibleRewards);
        }

        let mut items = items.to_vec();
        items.sort_by_key(|i| i.id);

        let has_finite = items.iter().any(ItemCandidate::is_finite);
        let has_unlimited = items.iter().any(|i| !i.is_finite());
        let mode = match (has_unlimited, has_finite) {
            (true, true) => SelectionMode::Mixed,
            (true, false) => SelectionMode::UnlimitedOnly,
            _ => SelectionMode::FiniteOnly,
        };

        let weights: Vec<f64> = match mode {
            SelectionMode::Mixed => {
                let manual_total: f64 = items
                    .iter()
                    .filter(|i| !i.is_finite())
                    .map(|i| i.manual_weight.unwrap_or_default().as_share())
                    .sum();
                // 手动份额总和 >= 1 时，有限库存物品不可达 (允许的配置)
                let remainder = (1.0 - manual_total).max(0.0);
                let finite_total: f64 = items
                    .iter()
                    .filter_map(|i| match i.stock {
                        Stock::Finite(n) => Some(f64::from(n)),
                        Stock::Unlimited => None,
                    })
                    .sum();

                items
                    .iter()
                    .map(|i| match i.stock {
                        Stock::Unlimited => i.manual_weight.unwrap_or_default().as_share(),
                        Stock::Finite(n) => remainder * f64::from(n) / finite_total,
                    })
                    .collect()
            }
            SelectionMode::UnlimitedOnly => {
                let split = Self::equal_split(items.len());
                items
                    .iter()
                    .map(|i| i.manual_weight.map_or(split, |w| f64::from(w.get())))
                    .collect()
            }
            SelectionMode::FiniteOnly => items
                .iter()
                .map(|i| match i.stock {
                    Stock::Finite(n) => f64::from(n),
                    Stock::Unlimited => 0.0,
                })
                .collect(),
        };

        let distribution = Distribution::new(weights, Fallback::First)?;
        Ok(ItemDistribution {
            mode,
            item_ids: items.iter().map(|i| i.id).collect(),
            distribution,
        })
    }
}

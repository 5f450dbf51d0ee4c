use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{BasisPoints, GachaError};
use crate::entities::pity_policy_entity;

/// Pity 加成公式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BoostFormula {
    /// 加成 = (1 / weight) * 0.1 * multiplier，越稀有加成越多
    Inverse,
    /// 所有分组加成 = 0.5 * multiplier
    Flat,
}

impl BoostFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoostFormula::Inverse => "inverse",
            BoostFormula::Flat => "flat",
        }
    }
}

impl fmt::Display for BoostFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoostFormula {
    type Err = GachaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inverse" => Ok(BoostFormula::Inverse),
            "flat" => Ok(BoostFormula::Flat),
            other => Err(GachaError::invalid(format!("unknown boost formula '{other}'"))),
        }
    }
}

/// Pity 配置，每次抽卡读取一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PityPolicy {
    pub enabled: bool,
    rolls_until_pity: u32,
    pub boost_formula: BoostFormula,
    pub win_weight_threshold: BasisPoints,
}

impl Default for PityPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            rolls_until_pity: 10,
            boost_formula: BoostFormula::Inverse,
            win_weight_threshold: BasisPoints::new(500),
        }
    }
}

impl PityPolicy {
    pub fn new(
        enabled: bool,
        rolls_until_pity: u32,
        boost_formula: BoostFormula,
        win_weight_threshold: BasisPoints,
    ) -> Result<Self, GachaError> {
        if rolls_until_pity == 0 {
            return Err(GachaError::invalid("rolls_until_pity must be positive"));
        }
        Ok(Self {
            enabled,
            rolls_until_pity,
            boost_formula,
            win_weight_threshold,
        })
    }

    pub fn rolls_until_pity(&self) -> u32 {
        self.rolls_until_pity
    }

    /// 达到阈值后为 `floor(counter / rolls_until_pity)`，否则为 0
    pub fn pity_multiplier(&self, counter: u32) -> u32 {
        if !self.enabled || counter < self.rolls_until_pity {
            return 0;
        }
        counter / self.rolls_until_pity
    }

    /// 基础权重不高于阈值即视为“中”
    pub fn is_win(&self, base_weight: BasisPoints) -> bool {
        base_weight <= self.win_weight_threshold
    }
}

impl TryFrom<&pity_policy_entity::Model> for PityPolicy {
    type Error = GachaError;

    fn try_from(m: &pity_policy_entity::Model) -> Result<Self, Self::Error> {
        let rolls_until_pity = u32::try_from(m.rolls_until_pity)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                GachaError::invalid(format!(
                    "rolls_until_pity must be positive, got {}",
                    m.rolls_until_pity
                ))
            })?;
        let boost_formula = m.boost_formula.parse()?;
        let threshold = BasisPoints::from_stored(m.win_weight_threshold, "win_weight_threshold")?;
        PityPolicy::new(m.enabled, rolls_until_pity, boost_formula, threshold)
    }
}

/// 一次抽卡对计数的修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    Reset,
    Increment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PityOutcome {
    pub is_win: bool,
    pub update: CounterUpdate,
    pub new_counter: u32,
}

/// 按选中分组未加成的基础权重判定中与未中，与本次是否加成无关
pub fn next_counter(policy: &PityPolicy, selected_base_weight: BasisPoints, current: u32) -> PityOutcome {
    if policy.is_win(selected_base_weight) {
        PityOutcome {
            is_win: true,
            update: CounterUpdate::Reset,
            new_counter: 0,
        }
    } else {
        PityOutcome {
            is_win: false,
            update: CounterUpdate::Increment,
            new_counter: current.saturating_add(1),
        }
    }
}

use rand::Rng;

use super::distribution::{Distribution, DrawRange, Fallback};
use super::{BasisPoints, BoostFormula, GachaError, PityPolicy};
use crate::entities::reward_group_entity;

/// 参与抽取的分组 (已校验)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCandidate {
    pub id: i64,
    pub base_weight: BasisPoints,
}

impl TryFrom<&reward_group_entity::Model> for GroupCandidate {
    type Error = GachaError;

    fn try_from(m: &reward_group_entity::Model) -> Result<Self, Self::Error> {
        let base_weight = BasisPoints::from_stored(m.base_weight, "base_weight")
            .map_err(|e| GachaError::invalid(format!("group {}: {e}", m.id)))?;
        Ok(Self {
            id: m.id,
            base_weight,
        })
    }
}

/// 单个分组在分布中的权重与概率
#[derive(Debug, Clone, PartialEq)]
pub struct GroupWeight {
    pub group_id: i64,
    pub base_weight: BasisPoints,
    pub adjusted_weight: f64,
    pub probability: f64,
}

/// 某一 pity 计数下的归一化分组分布
#[derive(Debug, Clone)]
pub struct GroupDistribution {
    entries: Vec<GroupWeight>,
    pity_multiplier: u32,
    distribution: Distribution,
}

impl GroupDistribution {
    pub fn entries(&self) -> &[GroupWeight] {
        &self.entries
    }

    pub fn pity_multiplier(&self) -> u32 {
        self.pity_multiplier
    }

    pub fn is_boosted(&self) -> bool {
        self.pity_multiplier > 0
    }

    /// r 取值 [0, 1)；累积和不足时兜底为最后一个权重为正的分组 (权重为 0 的分组永不被抽中)
    pub fn select_at(&self, r: f64) -> &GroupWeight {
        &self.entries[self.distribution.pick(r)]
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &GroupWeight {
        &self.entries[self.distribution.sample(rng, DrawRange::Unit)]
    }
}

pub struct GroupWeightCalculator<'a> {
    policy: &'a PityPolicy,
}

impl<'a> GroupWeightCalculator<'a> {
    pub fn new(policy: &'a PityPolicy) -> Self {
        Self { policy }
    }

    /// 基础权重 (`bp / 100`) 加上 pity 加成
    ///
    /// flat 对所有分组一视同仁，基础权重为 0 的分组同样获得加成；
    /// inverse 对基础权重为 0 的分组不加成 (1 / 0 无意义)。
    pub fn adjusted_weight(&self, base_weight: BasisPoints, pity_multiplier: u32) -> f64 {
        let weight = base_weight.as_weight();
        if pity_multiplier == 0 {
            return weight;
        }

        let multiplier = f64::from(pity_multiplier);
        let boost = match self.policy.boost_formula {
            BoostFormula::Inverse if base_weight.is_zero() => 0.0,
            BoostFormula::Inverse => (1.0 / weight) * 0.1 * multiplier,
            BoostFormula::Flat => 0.5 * multiplier,
        };
        weight + boost
    }

    /// 计算各分组的归一化概率 (按 id 升序)
    pub fn calculate(
        &self,
        groups: &[GroupCandidate],
        counter: u32,
    ) -> Result<GroupDistribution, GachaError> {
        let mut groups = groups.to_vec();
        groups.sort_by_key(|g| g.id);

        let pity_multiplier = self.policy.pity_multiplier(counter);
        let adjusted: Vec<f64> = groups
            .iter()
            .map(|g| self.adjusted_weight(g.base_weight, pity_multiplier))
            .collect();

        let total: f64 = adjusted.iter().sum();
        if groups.is_empty() || total <= 0.0 {
            return Err(GachaError::NoEligibleRewards);
        }

        let entries: Vec<GroupWeight> = groups
            .iter()
            .zip(&adjusted)
            .map(|(g, w)| GroupWeight {
                group_id: g.id,
                base_weight: g.base_weight,
                adjusted_weight: *w,
                probability: w / total,
            })
            .collect();

        let distribution = Distribution::new(
            entries.iter().map(|e| e.probability).collect(),
            Fallback::Last,
        )?;

        Ok(GroupDistribution {
            entries,
            pity_multiplier,
            distribution,
        })
    }
}

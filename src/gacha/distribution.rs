use rand::Rng;

use super::GachaError;

/// 累积和未命中时的兜底策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// 最后一个权重为正的项 (分组)
    Last,
    /// 第一个权重为正的项 (物品)
    First,
}

/// 随机数的取值范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRange {
    /// r 取值 [0, 1)
    Unit,
    /// r 取值 [0, 总权重)
    Total,
}

/// 按固定顺序排列的离散权重分布
///
/// 顺序累加权重，返回第一个权重为正且累积和 `>= r` 的项；权重为 0 的项永不被选中。
/// 浮点误差导致 `r` 超出累积和时由 [`Fallback`] 决定结果。
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    weights: Vec<f64>,
    total: f64,
    fallback: Fallback,
}

impl Distribution {
    pub fn new(weights: Vec<f64>, fallback: Fallback) -> Result<Self, GachaError> {
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(GachaError::invalid(format!(
                "weight must be finite and non-negative, got {bad}"
            )));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(GachaError::NoEligibleRewards);
        }

        Ok(Self {
            weights,
            total,
            fallback,
        })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// 各项权重除以总权重
    pub fn probabilities(&self) -> Vec<f64> {
        self.weights.iter().map(|w| w / self.total).collect()
    }

    /// 按给定随机值选择下标
    pub fn pick(&self, r: f64) -> usize {
        let mut cumulative = 0.0;
        for (index, weight) in self.weights.iter().enumerate() {
            cumulative += weight;
            if *weight > 0.0 && cumulative >= r {
                return index;
            }
        }
        self.fallback_index()
    }

    /// 从 `rng` 取一个新的随机值并选择下标
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, range: DrawRange) -> usize {
        let upper = match range {
            DrawRange::Unit => 1.0,
            DrawRange::Total => self.total,
        };
        let r = rng.gen_range(0.0..upper);
        self.pick(r)
    }

    fn fallback_index(&self) -> usize {
        let positive = |(_, w): &(usize, &f64)| **w > 0.0;
        let found = match self.fallback {
            Fallback::Last => self.weights.iter().enumerate().rev().find(positive),
            Fallback::First => self.weights.iter().enumerate().find(positive),
        };
        // total > 0 时必有权重为正的项
        found.map(|(index, _)| index).unwrap_or_default()
    }
}

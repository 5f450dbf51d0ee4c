use serde::{Deserialize, Serialize};
use std::fmt;

use super::GachaError;

/// 基点 (basis points): 10000 = 100%
///
/// 权重与阈值以整数存储和比较，只在构建分布时转为浮点数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub const SCALE: u32 = 10_000;
    pub const ZERO: BasisPoints = BasisPoints(0);

    pub const fn new(value: u32) -> Self {
        BasisPoints(value)
    }

    /// 从数据库整数读取，负数视为配置错误
    pub fn from_stored(value: i32, field: &str) -> Result<Self, GachaError> {
        u32::try_from(value)
            .map(BasisPoints)
            .map_err(|_| GachaError::invalid(format!("{field} must not be negative, got {value}")))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// 分组抽取使用的相对权重 (5500bp -> 55.0)
    pub fn as_weight(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// 绝对概率 (500bp -> 0.05)
    pub fn as_share(self) -> f64 {
        f64::from(self.0) / f64::from(Self::SCALE)
    }
}

impl From<u32> for BasisPoints {
    fn from(value: u32) -> Self {
        BasisPoints(value)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_and_share_scales() {
        let bp = BasisPoints::new(5500);
        assert_eq!(bp.as_weight(), 55.0);
        assert_eq!(bp.as_share(), 0.55);
        assert_eq!(BasisPoints::new(10).as_weight(), 0.1);
    }

    #[test]
    fn test_from_stored_rejects_negative() {
        assert_eq!(BasisPoints::from_stored(500, "w").unwrap(), BasisPoints::new(500));
        assert!(matches!(
            BasisPoints::from_stored(-1, "base_weight"),
            Err(GachaError::InvalidConfiguration(msg)) if msg.contains("base_weight")
        ));
    }

    #[test]
    fn test_ordering_follows_integer_value() {
        assert!(BasisPoints::new(500) <= BasisPoints::new(500));
        assert!(BasisPoints::new(501) > BasisPoints::new(500));
        assert_eq!(BasisPoints::new(90).to_string(), "90bp");
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gacha::{BoostFormula, PityPolicy};

/// Pity 配置响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PityConfigResponse {
    pub enabled: bool,
    /// 连续未中多少次后开始加成
    pub rolls_until_pity: u32,
    pub boost_formula: BoostFormula,
    /// 基础权重不高于该值 (basis points) 的分组算作“中”
    pub win_weight_threshold: u32,
}

impl From<&PityPolicy> for PityConfigResponse {
    fn from(p: &PityPolicy) -> Self {
        PityConfigResponse {
            enabled: p.enabled,
            rolls_until_pity: p.rolls_until_pity(),
            boost_formula: p.boost_formula,
            win_weight_threshold: p.win_weight_threshold.get(),
        }
    }
}

/// 部分更新 Pity 配置 (仅管理员)
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdatePityConfigRequest {
    pub enabled: Option<bool>,
    pub rolls_until_pity: Option<i64>,
    pub boost_formula: Option<BoostFormula>,
    pub win_weight_threshold: Option<i64>,
}

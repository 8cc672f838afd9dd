//! 原子谓词定义
//!
//! 证明搜索的叶子公式：
//! - Implemented: trait 引用成立
//! - WellFormedAdt: ADT 实例良构

use super::param::{Ident, Param, TraitRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 谓词种类
///
/// 协归纳相容性测试按种类对谓词分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    /// trait 已实现
    Implemented,
    /// ADT 良构
    WellFormedAdt,
}

/// 原子谓词
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// trait 引用成立
    Implemented(TraitRef),
    /// ADT 实例良构
    WellFormedAdt {
        /// ADT 名
        adt_id: Ident,
        /// 实参（与 ADT 声明的泛型按位置对应）
        params: Vec<Param>,
    },
}

impl Predicate {
    /// 创建 Implemented 谓词
    pub fn implemented(trait_ref: TraitRef) -> Self {
        Predicate::Implemented(trait_ref)
    }

    /// 创建 WellFormedAdt 谓词
    pub fn well_formed_adt(
        adt_id: impl Into<String>,
        params: Vec<Param>,
    ) -> Self {
        Predicate::WellFormedAdt {
            adt_id: Ident::new(adt_id),
            params,
        }
    }

    /// 谓词种类
    pub fn kind(&self) -> PredicateKind {
        match self {
            Predicate::Implemented(_) => PredicateKind::Implemented,
            Predicate::WellFormedAdt { .. } => PredicateKind::WellFormedAdt,
        }
    }

    /// 谓词头部标识符（trait 名或 ADT 名）
    pub fn head_id(&self) -> &Ident {
        match self {
            Predicate::Implemented(tr) => &tr.trait_id,
            Predicate::WellFormedAdt { adt_id, .. } => adt_id,
        }
    }

    /// 谓词的参数列表
    pub fn params(&self) -> &[Param] {
        match self {
            Predicate::Implemented(tr) => &tr.params,
            Predicate::WellFormedAdt { params, .. } => params,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Predicate::Implemented(tr) => write!(f, "Implemented({})", tr),
            Predicate::WellFormedAdt { adt_id, params } => {
                write!(f, "WellFormedAdt({}", adt_id)?;
                for p in params {
                    write!(f, ", {}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}

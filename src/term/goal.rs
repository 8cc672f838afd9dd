//! 证明目标定义
//!
//! 目标由原子谓词经合取与量词组合而成：
//! - Pred: 原子谓词
//! - All: 合取（顺序执行，后项在前项产出的每个环境中证明）
//! - ForAll: 全称量化（引入新鲜全称变量）
//! - Exists: 存在量化（引入新鲜存在变量）

use super::param::{Generics, TraitRef};
use super::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 证明目标
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    /// 原子谓词
    Pred(Predicate),
    /// 合取
    All(Vec<Goal>),
    /// 全称量化
    ForAll(Generics, Box<Goal>),
    /// 存在量化
    Exists(Generics, Box<Goal>),
}

impl Goal {
    /// 创建 Implemented 目标
    pub fn implemented(trait_ref: TraitRef) -> Self {
        Goal::Pred(Predicate::Implemented(trait_ref))
    }

    /// 创建合取目标
    pub fn all(goals: Vec<Goal>) -> Self {
        Goal::All(goals)
    }

    /// 创建全称量化目标
    pub fn for_all(
        binders: Generics,
        body: Goal,
    ) -> Self {
        Goal::ForAll(binders, Box::new(body))
    }

    /// 创建存在量化目标
    pub fn exists(
        binders: Generics,
        body: Goal,
    ) -> Self {
        Goal::Exists(binders, Box::new(body))
    }
}

impl From<Predicate> for Goal {
    fn from(pred: Predicate) -> Self {
        Goal::Pred(pred)
    }
}

impl fmt::Display for Goal {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Goal::Pred(p) => write!(f, "{}", p),
            Goal::All(goals) => {
                write!(f, "all(")?;
                for (i, g) in goals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", g)?;
                }
                write!(f, ")")
            }
            Goal::ForAll(binders, body) => {
                write!(f, "forall<")?;
                for (i, b) in binders.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", b.id)?;
                }
                write!(f, "> {}", body)
            }
            Goal::Exists(binders, body) => {
                write!(f, "exists<")?;
                for (i, b) in binders.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", b.id)?;
                }
                write!(f, "> {}", body)
            }
        }
    }
}

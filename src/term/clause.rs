//! 子句与参数关系定义
//!
//! - Clause: Horn 风格规则 `head :- premises`，可对 binders 全称量化。
//!   不变式（invariant）同为 Clause，存放于独立的常备集合。
//! - Relation: 参数关系的单步（目前仅有相等关系）

use super::goal::Goal;
use super::param::{Generics, Param};
use super::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horn 风格子句
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    /// 全称量化的绑定子（实例化时以新鲜存在变量替换）
    pub binders: Generics,
    /// 结论谓词
    pub head: Predicate,
    /// 前提子目标（顺序显著）
    pub premises: Vec<Goal>,
}

impl Clause {
    /// 创建无前提、无绑定子的事实
    pub fn fact(head: Predicate) -> Self {
        Clause {
            binders: Generics::none(),
            head,
            premises: Vec::new(),
        }
    }

    /// 创建带绑定子和前提的规则
    pub fn rule(
        binders: Generics,
        head: Predicate,
        premises: Vec<Goal>,
    ) -> Self {
        Clause {
            binders,
            head,
            premises,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if !self.binders.is_empty() {
            write!(f, "forall<")?;
            for (i, b) in self.binders.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", b.id)?;
            }
            write!(f, "> ")?;
        }
        write!(f, "{}", self.head)?;
        if !self.premises.is_empty() {
            write!(f, " :- ")?;
            for (i, p) in self.premises.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", p)?;
            }
        }
        Ok(())
    }
}

/// 参数关系的单步
///
/// 参数列表按位置逐对展开为若干 `Eq` 步骤
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// 两个参数相等（可合一）
    Eq(Param, Param),
}

impl fmt::Display for Relation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Relation::Eq(a, b) => write!(f, "{} == {}", a, b),
        }
    }
}

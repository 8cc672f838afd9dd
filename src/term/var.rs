//! 求解器变量定义
//!
//! 实现证明搜索中的两类新鲜变量：
//! - Existential: 存在变量（实例化子句绑定子时引入，可被绑定）
//! - Universal: 全称变量（skolem，证明 forall 目标时引入，仅与自身合一）
//!
//! 每个变量携带一个 universe 层级，用于量词卫生检查：
//! 低层级的存在变量不可绑定到提及更高层级全称变量的项。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 变量种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// 存在变量（可绑定）
    Existential,
    /// 全称变量（skolem，不可绑定）
    Universal,
}

/// 求解器变量
///
/// 每个变量有一个全局唯一的索引（由 Environment 的计数器分配）、
/// 种类和引入时的 universe 层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    index: usize,
    kind: VarKind,
    universe: usize,
}

impl Var {
    /// 创建新的存在变量
    pub fn existential(
        index: usize,
        universe: usize,
    ) -> Self {
        Var {
            index,
            kind: VarKind::Existential,
            universe,
        }
    }

    /// 创建新的全称变量
    pub fn universal(
        index: usize,
        universe: usize,
    ) -> Self {
        Var {
            index,
            kind: VarKind::Universal,
            universe,
        }
    }

    /// 获取变量的索引
    pub fn index(&self) -> usize {
        self.index
    }

    /// 获取变量的种类
    pub fn kind(&self) -> VarKind {
        self.kind
    }

    /// 获取变量引入时的 universe 层级
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// 是否为存在变量
    pub fn is_existential(&self) -> bool {
        self.kind == VarKind::Existential
    }

    /// 是否为全称变量
    pub fn is_universal(&self) -> bool {
        self.kind == VarKind::Universal
    }
}

impl fmt::Display for Var {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.kind {
            VarKind::Existential => write!(f, "?{}", self.index),
            VarKind::Universal => write!(f, "!{}", self.index),
        }
    }
}

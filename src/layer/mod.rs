//! 声明层钩子束
//!
//! 核心只通过钩子束消费；本模块提供面向声明层的具体实现：
//! - 子句提供者：按谓词过滤降低产物，并为内建标量合成良构子句
//! - 谓词相等 / 参数关系：委托给通用合一子系统
//! - 协归纳策略：可插拔的谓词种类分类（核心不硬编码任何策略）
//! - ADT 泛型查询：未声明 id 为调用方缺陷，立即失败

use crate::decl::{DeclError, Program};
use crate::env::{Env, Hooks};
use crate::lower::{lower_program, LoweredProgram};
use crate::term::{Clause, Generics, Ident, Predicate, PredicateKind, Relation, Var};
use crate::unify;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

/// 协归纳相容性策略
///
/// 对 (栈上谓词, 当前目标) 的固定、无副作用分类。
/// 具体分类随类型系统层而异，由构造方注入
pub type CoinductivePolicy = fn(&Predicate, &Predicate) -> bool;

/// 内置策略
pub mod policy {
    use super::{Predicate, PredicateKind};

    /// 仅良构性谓词可协归纳假定（参考策略）
    ///
    /// 递归数据结构的良构性合法地依赖自身；任意 trait 实现则不然
    pub fn wf_only(
        on_stack: &Predicate,
        goal: &Predicate,
    ) -> bool {
        on_stack.kind() == PredicateKind::WellFormedAdt
            && goal.kind() == PredicateKind::WellFormedAdt
    }

    /// 一切谓词均可协归纳假定
    pub fn coinductive_all(
        _on_stack: &Predicate,
        _goal: &Predicate,
    ) -> bool {
        true
    }

    /// 一切复现均视为不终止风险
    pub fn inductive_only(
        _on_stack: &Predicate,
        _goal: &Predicate,
    ) -> bool {
        false
    }
}

/// 内建标量构造子的良构事实
///
/// 声明集之外合成的子句：`WellFormedAdt(i32)` 等无条件成立
static BUILTIN_WF: Lazy<Vec<Clause>> = Lazy::new(|| {
    const SCALARS: &[&str] = &[
        "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "bool", "char", "str",
    ];
    SCALARS
        .iter()
        .map(|s| Clause::fact(Predicate::well_formed_adt(*s, Vec::new())))
        .collect()
});

/// 声明层钩子束
///
/// 环境构造时绑定，证明搜索期间固定不变
pub struct DeclLayer {
    lowered: LoweredProgram,
    policy: CoinductivePolicy,
}

impl DeclLayer {
    /// 由降低产物构造
    pub fn new(
        lowered: LoweredProgram,
        policy: CoinductivePolicy,
    ) -> Self {
        DeclLayer { lowered, policy }
    }

    /// 由程序直接构造环境（降低 + 注入钩子束）
    pub fn env(
        program: &Program,
        policy: CoinductivePolicy,
    ) -> Result<Env, DeclError> {
        let lowered = lower_program(program)?;
        Ok(Env::new(Arc::new(DeclLayer::new(lowered, policy))))
    }

    /// 空声明集的环境（测试基线用）
    pub fn empty_env(policy: CoinductivePolicy) -> Env {
        Env::new(Arc::new(DeclLayer::new(LoweredProgram::default(), policy)))
    }
}

impl Hooks for DeclLayer {
    fn clauses(
        &self,
        predicate: &Predicate,
    ) -> Vec<Clause> {
        let mut out: Vec<Clause> = self
            .lowered
            .clauses
            .iter()
            .filter(|c| {
                c.head.kind() == predicate.kind() && c.head.head_id() == predicate.head_id()
            })
            .cloned()
            .collect();
        // 内建规则按需合成，不在声明集中
        out.extend(
            BUILTIN_WF
                .iter()
                .filter(|c| {
                    c.head.kind() == predicate.kind() && c.head.head_id() == predicate.head_id()
                })
                .cloned(),
        );
        out
    }

    fn invariants(&self) -> Vec<Clause> {
        self.lowered.invariants.clone()
    }

    fn equate_predicates(
        &self,
        env: &Env,
        wildcards: &HashSet<Var>,
        left: &Predicate,
        right: &Predicate,
    ) -> Result<Env, unify::Mismatch> {
        unify::equate_predicates_modulo_vars(env, wildcards, left, right)
    }

    fn relate_parameters(
        &self,
        env: &Env,
        relation: &Relation,
    ) -> Result<Env, unify::Mismatch> {
        unify::relate(env, relation)
    }

    fn coinduction_compatible(
        &self,
        on_stack: &Predicate,
        goal: &Predicate,
    ) -> bool {
        (self.policy)(on_stack, goal)
    }

    fn adt_generics(
        &self,
        adt_id: &Ident,
    ) -> Result<Generics, DeclError> {
        self.lowered
            .adt_generics
            .get(adt_id)
            .cloned()
            .ok_or_else(|| DeclError::UnknownAdt {
                id: adt_id.clone(),
            })
    }
}

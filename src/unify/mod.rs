//! 合一与谓词相等子系统
//!
//! 判定两个谓词或两个参数列表能否经变量代换变得句法相同：
//! - relate: 参数关系的单步（结构合一，带 occurs check 与 universe 检查）
//! - relate_all: 参数列表按位置合一
//! - equate_predicates_modulo_vars: 模无关变量集的谓词相等
//!
//! 失败（Mismatch）只剪掉当前分支，从不中止整个搜索。

use crate::env::Env;
use crate::term::{Param, Predicate, Relation, Var};
use std::collections::HashSet;
use thiserror::Error;

/// 局部、可恢复的合一失败
///
/// 不向调用方逐条报告；唯一作用是剪枝
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// 构造子不同
    #[error("Constructor mismatch: {left} vs {right}")]
    Ctor { left: String, right: String },

    /// 参数数量不同
    #[error("Arity mismatch: {expected} parameters expected, found {found}")]
    Arity { expected: usize, found: usize },

    /// occurs check 失败（变量绑定到包含自身的项）
    #[error("Occurs check failed: {var} occurs in {term}")]
    Occurs { var: String, term: String },

    /// universe 检查失败（绑定会泄漏更深层的全称变量）
    #[error("Universe violation: cannot bind {var} to {term}")]
    Universe { var: String, term: String },

    /// 全称变量只能与自身合一
    #[error("Cannot unify distinct universal variables: {left} vs {right}")]
    Skolem { left: String, right: String },

    /// 谓词头部不同
    #[error("Predicate head mismatch: {left} vs {right}")]
    PredicateHead { left: String, right: String },
}

/// 执行一步参数关系
pub fn relate(
    env: &Env,
    relation: &Relation,
) -> Result<Env, Mismatch> {
    match relation {
        Relation::Eq(left, right) => unify_params(env, left, right),
    }
}

/// 参数列表按位置合一
pub fn relate_all(
    env: &Env,
    left: &[Param],
    right: &[Param],
) -> Result<Env, Mismatch> {
    if left.len() != right.len() {
        return Err(Mismatch::Arity {
            expected: left.len(),
            found: right.len(),
        });
    }
    let mut env = env.clone();
    for (l, r) in left.iter().zip(right.iter()) {
        env = unify_params(&env, l, r)?;
    }
    Ok(env)
}

/// 结构合一两个参数项
///
/// 已绑定变量先解引用再比较；存在变量可绑定（受 occurs check
/// 与 universe 检查约束）；全称变量仅与自身合一
fn unify_params(
    env: &Env,
    left: &Param,
    right: &Param,
) -> Result<Env, Mismatch> {
    let left = env.resolve_shallow(left);
    let right = env.resolve_shallow(right);

    match (&left, &right) {
        (Param::Var(v1), Param::Var(v2)) if v1 == v2 => Ok(env.clone()),

        (Param::Var(v1), Param::Var(v2)) if v1.is_existential() && v2.is_existential() => {
            // 让较深 universe 的变量指向较浅的，避免泄漏
            if v1.universe() >= v2.universe() {
                Ok(env.with_binding(*v1, Param::Var(*v2)))
            } else {
                Ok(env.with_binding(*v2, Param::Var(*v1)))
            }
        }

        (Param::Var(v), other) if v.is_existential() => bind(env, *v, other),
        (other, Param::Var(v)) if v.is_existential() => bind(env, *v, other),

        (Param::Var(v1), Param::Var(v2)) => Err(Mismatch::Skolem {
            left: v1.to_string(),
            right: v2.to_string(),
        }),
        (Param::Var(v), other) | (other, Param::Var(v)) => Err(Mismatch::Ctor {
            left: v.to_string(),
            right: other.to_string(),
        }),

        (Param::Name(n1), Param::Name(n2)) if n1 == n2 => Ok(env.clone()),

        (
            Param::App {
                ctor: c1,
                args: a1,
            },
            Param::App {
                ctor: c2,
                args: a2,
            },
        ) => {
            if c1 != c2 {
                return Err(Mismatch::Ctor {
                    left: c1.to_string(),
                    right: c2.to_string(),
                });
            }
            relate_all(env, a1, a2)
        }

        _ => Err(Mismatch::Ctor {
            left: left.to_string(),
            right: right.to_string(),
        }),
    }
}

/// 将存在变量绑定到项
///
/// occurs check：项中不得出现该变量自身；
/// universe 检查：项中全称变量的层级不得超过该变量的层级；
/// 项中更深层的存在变量降级（promotion）为该变量层级的新鲜
/// 存在变量——它们自此不得再绑定到深层 skolem
fn bind(
    env: &Env,
    var: Var,
    term: &Param,
) -> Result<Env, Mismatch> {
    let term = env.resolve(term);

    if term.mentions(&var) {
        return Err(Mismatch::Occurs {
            var: var.to_string(),
            term: term.to_string(),
        });
    }

    let leaks = term
        .vars()
        .iter()
        .any(|v| v.is_universal() && v.universe() > var.universe());
    if leaks {
        return Err(Mismatch::Universe {
            var: var.to_string(),
            term: term.to_string(),
        });
    }

    let mut env = env.clone();
    let mut deep: Vec<Var> = Vec::new();
    for v in term.vars() {
        if v.is_existential() && v.universe() > var.universe() && !deep.contains(&v) {
            deep.push(v);
        }
    }
    for v in deep {
        let (next, fresh) = env.with_fresh_existential(var.universe());
        env = next.with_binding(v, Param::Var(fresh));
    }
    let term = env.resolve(&term);

    Ok(env.with_binding(var, term))
}

/// 模无关变量集的谓词相等
///
/// 比较经不同推导路径到达的同一义务；`wildcards` 中的变量是
/// 无关占位符，出现即视为相容而不产生绑定。其余部分按结构合一，
/// 成功返回扩展后的环境
pub fn equate_predicates_modulo_vars(
    env: &Env,
    wildcards: &HashSet<Var>,
    left: &Predicate,
    right: &Predicate,
) -> Result<Env, Mismatch> {
    if left.kind() != right.kind() || left.head_id() != right.head_id() {
        return Err(Mismatch::PredicateHead {
            left: left.to_string(),
            right: right.to_string(),
        });
    }

    let lparams = left.params();
    let rparams = right.params();
    if lparams.len() != rparams.len() {
        return Err(Mismatch::Arity {
            expected: lparams.len(),
            found: rparams.len(),
        });
    }

    let mut env = env.clone();
    for (l, r) in lparams.iter().zip(rparams.iter()) {
        env = equate_params(&env, wildcards, l, r)?;
    }
    Ok(env)
}

fn equate_params(
    env: &Env,
    wildcards: &HashSet<Var>,
    left: &Param,
    right: &Param,
) -> Result<Env, Mismatch> {
    let left = env.resolve_shallow(left);
    let right = env.resolve_shallow(right);

    let is_wild = |p: &Param| matches!(p, Param::Var(v) if wildcards.contains(v));
    if is_wild(&left) || is_wild(&right) {
        return Ok(env.clone());
    }

    match (&left, &right) {
        (
            Param::App {
                ctor: c1,
                args: a1,
            },
            Param::App {
                ctor: c2,
                args: a2,
            },
        ) => {
            if c1 != c2 {
                return Err(Mismatch::Ctor {
                    left: c1.to_string(),
                    right: c2.to_string(),
                });
            }
            if a1.len() != a2.len() {
                return Err(Mismatch::Arity {
                    expected: a1.len(),
                    found: a2.len(),
                });
            }
            let mut env = env.clone();
            for (l, r) in a1.iter().zip(a2.iter()) {
                env = equate_params(&env, wildcards, l, r)?;
            }
            Ok(env)
        }
        _ => unify_params(env, &left, &right),
    }
}

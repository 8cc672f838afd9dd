//! 程序级检查
//!
//! 对整个声明集做一次性体检：
//! - 一致性（coherence）：同一 trait 的两个 impl 头部在绑定子
//!   新鲜化后可合一即为重叠（重复 impl 是重叠的特例）
//! - 每个 ADT：在其泛型的任意实例化下证明自身良构
//! - 每个 impl：在其泛型的任意实例化下证明 trait 引用中
//!   已声明 ADT 的良构义务
//!
//! 各义务相互独立、不共享可变状态，用 rayon 并行证明，
//! 结果经 parking_lot 互斥锁汇入错误集合。

use crate::decl::{ImplDecl, Program};
use crate::env::Env;
use crate::layer::{CoinductivePolicy, DeclLayer};
use crate::solve::{prove_top_level_goal, SolveError, SolverConfig};
use crate::term::{Goal, Ident, Param, Predicate, SubstNames};
use crate::unify;
use parking_lot::Mutex;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

/// 检查失败
#[derive(Debug, Error)]
pub enum CheckError {
    /// 某项义务不可证
    #[error("Obligation not provable for {item}: {goal}")]
    Unprovable {
        /// 义务所属的声明（诊断标签）
        item: String,
        /// 未能证明的目标
        goal: Goal,
    },

    /// 同一 trait 的两个 impl 重叠
    #[error("Overlapping impls of trait {trait_id}: impl #{first} and impl #{second}")]
    OverlappingImpls {
        /// 被重复实现的 trait
        trait_id: Ident,
        /// 第一个 impl 的位置
        first: usize,
        /// 第二个 impl 的位置
        second: usize,
    },

    /// 求解的终止性错误
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// 一项待证义务
#[derive(Debug, Clone)]
struct Obligation {
    item: String,
    goal: Goal,
}

/// 检查整个程序
///
/// 空错误集即通过。声明集的构造期缺陷在降低阶段快速失败
pub fn check_program(
    program: &Program,
    policy: CoinductivePolicy,
    config: &SolverConfig,
) -> Result<(), Vec<CheckError>> {
    let env = DeclLayer::env(program, policy)
        .map_err(|e| vec![CheckError::Solve(SolveError::Decl(e))])?;

    let mut errors = check_coherence(program, &env);

    let obligations = collect_obligations(program);
    debug!(count = obligations.len(), "checking program obligations");

    let obligation_errors: Mutex<Vec<CheckError>> = Mutex::new(Vec::new());
    obligations.par_iter().for_each(|obligation| {
        match prove_obligation(&env, obligation, config) {
            Ok(()) => {}
            Err(e) => obligation_errors.lock().push(e),
        }
    });

    errors.extend(obligation_errors.into_inner());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// 一致性检查：同一 trait 的 impl 两两配对做重叠测试
fn check_coherence(
    program: &Program,
    env: &Env,
) -> Vec<CheckError> {
    let impls: Vec<&ImplDecl> = program.impls().collect();
    let mut errors = Vec::new();
    for (first, left) in impls.iter().enumerate() {
        for (second, right) in impls.iter().enumerate().skip(first + 1) {
            if left.trait_ref.trait_id != right.trait_ref.trait_id {
                continue;
            }
            if impls_overlap(env, left, right) {
                errors.push(CheckError::OverlappingImpls {
                    trait_id: left.trait_ref.trait_id.clone(),
                    first,
                    second,
                });
            }
        }
    }
    errors
}

/// 两个 impl 头部在各自绑定子新鲜化后能否合一
fn impls_overlap(
    env: &Env,
    left: &ImplDecl,
    right: &ImplDecl,
) -> bool {
    let (env, map) = env.with_fresh_existentials(&left.generics);
    let left = left.trait_ref.subst_names(&map);
    let (env, map) = env.with_fresh_existentials(&right.generics);
    let right = right.trait_ref.subst_names(&map);
    unify::relate_all(&env, &left.params, &right.params).is_ok()
}

fn prove_obligation(
    env: &Env,
    obligation: &Obligation,
    config: &SolverConfig,
) -> Result<(), CheckError> {
    let solutions = prove_top_level_goal(env, &obligation.goal, config)?;
    if solutions.is_empty() {
        return Err(CheckError::Unprovable {
            item: obligation.item.clone(),
            goal: obligation.goal.clone(),
        });
    }
    Ok(())
}

/// 收集全部义务
fn collect_obligations(program: &Program) -> Vec<Obligation> {
    let mut out = Vec::new();

    for adt in program.adts() {
        let params: Vec<Param> = adt
            .generics
            .iter()
            .map(|b| Param::Name(b.id.clone()))
            .collect();
        let body = Goal::Pred(Predicate::WellFormedAdt {
            adt_id: adt.id.clone(),
            params,
        });
        let goal = if adt.generics.is_empty() {
            body
        } else {
            Goal::for_all(adt.generics.clone(), body)
        };
        out.push(Obligation {
            item: format!("adt {}", adt.id),
            goal,
        });
    }

    for (index, impl_decl) in program.impls().enumerate() {
        let wf_goals: Vec<Goal> = impl_decl
            .trait_ref
            .params
            .iter()
            .filter_map(|p| well_formed_goal(program, p))
            .collect();
        if wf_goals.is_empty() {
            continue;
        }
        let body = Goal::all(wf_goals);
        let goal = if impl_decl.generics.is_empty() {
            body
        } else {
            Goal::for_all(impl_decl.generics.clone(), body)
        };
        out.push(Obligation {
            item: format!("impl #{} of {}", index, impl_decl.trait_ref.trait_id),
            goal,
        });
    }

    out
}

/// 参数中已声明 ADT 的良构目标
fn well_formed_goal(
    program: &Program,
    param: &Param,
) -> Option<Goal> {
    match param {
        Param::App { ctor, args } if program.adt(ctor).is_some() => {
            Some(Goal::Pred(Predicate::WellFormedAdt {
                adt_id: ctor.clone(),
                params: args.clone(),
            }))
        }
        _ => None,
    }
}

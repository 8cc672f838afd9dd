//! COSLD 求解器
//!
//! 协归纳 SLD 消解（coinductive Selective Linear Definite-clause
//! resolution）的核心状态机：
//! - 显式工作表：分支状态（环境快照 + 待证目标栈 + 活跃协归纳假设集）
//!   作为纯数据，不依赖原生递归控制流的隐式回溯
//! - AND 分支：合取按顺序证明，后项在前项产出的每个环境中展开
//! - OR 分支：候选子句逐一尝试，收集全部成功环境而非首个
//! - 协归纳：目标在当前证明栈上结构性复现且相容性测试允许时，
//!   视为暂定为真；不允许则放弃该分支（宁可不完备，不失可靠）

use crate::decl::DeclError;
use crate::env::Env;
use crate::term::{Clause, Goal, Predicate, Relation, SubstNames};
use crate::unify::Mismatch;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;
use tracing::{debug, trace};

/// 求解器配置
///
/// 参考语义不规定超时；面向不可信输入时以深度与分支数上限
/// 约束搜索，资源耗尽作为与"不可证"不同的结局浮出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// 单个分支上活跃假设栈的最大深度
    pub max_depth: usize,
    /// 整个搜索允许展开的分支总数
    pub max_branches: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_depth: 128,
            max_branches: 65_536,
        }
    }
}

/// 求解的终止性错误
///
/// 局部合一失败从不经由此类型上浮，它们只剪枝
#[derive(Debug, Error)]
pub enum SolveError {
    /// 搜索预算耗尽（与"目标不可证"不同的结局）
    ///
    /// 仅当搜索结束时无任何成功环境、且至少一条分支因预算被截断
    /// 时上浮；已找到的解优先于预算诊断
    #[error("Search exhausted: {kind} limit of {limit} exceeded")]
    SearchExhausted {
        /// 超出的预算种类（"depth" 或 "branches"）
        kind: &'static str,
        /// 配置的上限
        limit: usize,
    },

    /// 声明集的构造期缺陷
    #[error(transparent)]
    Decl(#[from] DeclError),
}

/// 工作表中的一项
///
/// `PopAssumption` 是内部标记：某原子谓词的全部前提证毕后，
/// 将其从活跃假设栈上弹出，使假设集精确对应未决的证明栈
#[derive(Debug, Clone)]
enum WorkItem {
    Goal(Goal),
    PopAssumption,
}

/// 一条证明分支：环境快照、待证目标栈、活跃协归纳假设集
///
/// 分支之间不共享可变状态，可随时无副作用地放弃
#[derive(Debug, Clone)]
struct Branch {
    env: Env,
    work: SmallVec<[WorkItem; 8]>,
    assumptions: Vec<Predicate>,
}

/// 证明顶层目标，返回目标成立的全部输出环境
///
/// 空集即"不可证"。子句尝试顺序只影响探索次序，
/// 不影响可证目标的集合
pub fn prove_top_level_goal(
    env: &Env,
    goal: &Goal,
    config: &SolverConfig,
) -> Result<Vec<Env>, SolveError> {
    debug!(goal = %goal, "prove_top_level_goal");

    let mut frontier: Vec<Branch> = vec![Branch {
        env: env.clone(),
        work: smallvec![WorkItem::Goal(goal.clone())],
        assumptions: Vec::new(),
    }];
    let mut solutions: Vec<Env> = Vec::new();
    let mut exhausted: Option<SolveError> = None;
    let mut expanded = 0usize;

    while let Some(mut branch) = frontier.pop() {
        expanded += 1;
        if expanded > config.max_branches {
            exhausted = Some(SolveError::SearchExhausted {
                kind: "branches",
                limit: config.max_branches,
            });
            break;
        }

        let item = match branch.work.pop() {
            Some(item) => item,
            None => {
                // 目标栈清空：该分支成功
                if !solutions.contains(&branch.env) {
                    trace!(env = ?branch.env, "branch succeeded");
                    solutions.push(branch.env);
                }
                continue;
            }
        };

        match item {
            WorkItem::PopAssumption => {
                branch.assumptions.pop();
                frontier.push(branch);
            }
            WorkItem::Goal(goal) => {
                if let Err(e) = step_goal(branch, goal, config, &mut frontier) {
                    // 预算截断只放弃当前分支；其余分支照常探索
                    trace!(error = %e, "branch cut by budget");
                    exhausted.get_or_insert(e);
                }
            }
        }
    }

    debug!(count = solutions.len(), "prove_top_level_goal finished");
    match exhausted {
        // 无解且有分支被截断：资源耗尽是与"不可证"不同的结局
        Some(e) if solutions.is_empty() => Err(e),
        _ => Ok(solutions),
    }
}

/// 展开一个目标，将后继分支压入边界
fn step_goal(
    mut branch: Branch,
    goal: Goal,
    config: &SolverConfig,
    frontier: &mut Vec<Branch>,
) -> Result<(), SolveError> {
    match goal {
        Goal::All(goals) => {
            // 合取：顺序证明，后项依赖前项产出的绑定
            for g in goals.into_iter().rev() {
                branch.work.push(WorkItem::Goal(g));
            }
            frontier.push(branch);
        }
        Goal::ForAll(binders, body) => {
            // 以新鲜全称变量（skolem）重写，证明对任意实例化成立
            let (env, map) = branch.env.with_fresh_universals(&binders);
            branch.env = env;
            branch.work.push(WorkItem::Goal(body.subst_names(&map)));
            frontier.push(branch);
        }
        Goal::Exists(binders, body) => {
            let (env, map) = branch.env.with_fresh_existentials(&binders);
            branch.env = env;
            branch.work.push(WorkItem::Goal(body.subst_names(&map)));
            frontier.push(branch);
        }
        Goal::Pred(predicate) => {
            let predicate = branch.env.resolve_predicate(&predicate);
            if branch.assumptions.len() >= config.max_depth {
                return Err(SolveError::SearchExhausted {
                    kind: "depth",
                    limit: config.max_depth,
                });
            }
            step_predicate(branch, predicate, frontier);
        }
    }
    Ok(())
}

/// 证明一个原子谓词：先做循环检查，再对候选子句做 OR 分支
fn step_predicate(
    branch: Branch,
    predicate: Predicate,
    frontier: &mut Vec<Branch>,
) {
    // 协归纳循环检查：目标是否已作为未决义务出现在证明栈上
    if let Some(recurring) = find_on_stack(&branch, &predicate) {
        if branch
            .env
            .hooks()
            .coinduction_compatible(&recurring, &predicate)
        {
            // 暂定为真：不再展开，分支继续
            trace!(goal = %predicate, "coinductive cycle assumed");
            frontier.push(branch);
        } else {
            // 不相容的复现：存在不终止风险，放弃该分支
            trace!(goal = %predicate, "cycle rejected, branch abandoned");
        }
        return;
    }

    // OR 分支：每条候选子句都是一个候选证明
    let mut candidates = branch.env.clauses_for(&predicate);
    candidates.extend(branch.env.invariants());

    for clause in candidates {
        match apply_clause(&branch.env, &clause, &predicate) {
            Ok((env, premises)) => {
                trace!(clause = %clause, goal = %predicate, "clause applies");
                let mut next = Branch {
                    env,
                    work: branch.work.clone(),
                    assumptions: branch.assumptions.clone(),
                };
                next.work.push(WorkItem::PopAssumption);
                for premise in premises.into_iter().rev() {
                    next.work.push(WorkItem::Goal(premise));
                }
                next.assumptions.push(predicate.clone());
                frontier.push(next);
            }
            Err(mismatch) => {
                trace!(clause = %clause, %mismatch, "clause does not apply");
            }
        }
    }
}

/// 子句应用：绑定子新鲜化，头部与目标合一，前提成为新的子目标
fn apply_clause(
    env: &Env,
    clause: &Clause,
    goal: &Predicate,
) -> Result<(Env, Vec<Goal>), Mismatch> {
    let (env, map) = env.with_fresh_existentials(&clause.binders);
    let head = clause.head.subst_names(&map);

    if head.kind() != goal.kind() || head.head_id() != goal.head_id() {
        return Err(Mismatch::PredicateHead {
            left: head.to_string(),
            right: goal.to_string(),
        });
    }

    if head.params().len() != goal.params().len() {
        return Err(Mismatch::Arity {
            expected: head.params().len(),
            found: goal.params().len(),
        });
    }

    let hooks = env.hooks().clone();
    let mut env = env;
    for (h, g) in head.params().iter().zip(goal.params().iter()) {
        env = hooks.relate_parameters(&env, &Relation::Eq(h.clone(), g.clone()))?;
    }

    let premises = clause
        .premises
        .iter()
        .map(|p| p.subst_names(&map))
        .collect();
    Ok((env, premises))
}

/// 在活跃假设栈上查找与目标结构相等的未决谓词
///
/// 相等判定经由层特定的谓词相等钩子进行；检查是纯测试：
/// 仅当钩子在不引入任何新绑定的情况下成功，才算同一义务。
/// 仅可合一而不相等的谓词是更深的不同义务，交由深度预算约束
fn find_on_stack(
    branch: &Branch,
    goal: &Predicate,
) -> Option<Predicate> {
    let no_wildcards = std::collections::HashSet::new();
    for assumed in branch.assumptions.iter().rev() {
        let assumed = branch.env.resolve_predicate(assumed);
        match branch
            .env
            .hooks()
            .equate_predicates(&branch.env, &no_wildcards, &assumed, goal)
        {
            Ok(out) if out == branch.env => return Some(assumed),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{policy, DeclLayer};
    use crate::term::{Generics, Param, TraitRef};

    fn base_pred() -> Predicate {
        Predicate::Implemented(TraitRef::new("Clone", vec![Param::scalar("i32")]))
    }

    #[test]
    fn test_empty_environment_baseline() {
        let env = DeclLayer::empty_env(policy::wf_only);
        let config = SolverConfig::default();

        // 无子句、无不变式：原子目标产出空解集
        let none = prove_top_level_goal(&env, &Goal::Pred(base_pred()), &config).expect("solves");
        assert!(none.is_empty());

        // 空前提下平凡为真的目标：恰好一个解，即未修改的环境
        let one = prove_top_level_goal(&env, &Goal::all(Vec::new()), &config).expect("solves");
        assert_eq!(one, vec![env]);
    }

    #[test]
    fn test_conjunction_restricts_to_conjunct_solutions() {
        // A ∧ B 的每个解都限制为各合取项的解
        let env = DeclLayer::empty_env(policy::wf_only);
        let config = SolverConfig::default();

        let a = Goal::Pred(Predicate::well_formed_adt("i32", Vec::new()));
        let b = Goal::Pred(Predicate::well_formed_adt("bool", Vec::new()));
        let both =
            prove_top_level_goal(&env, &Goal::all(vec![a.clone(), b.clone()]), &config)
                .expect("solves");
        let a_only = prove_top_level_goal(&env, &a, &config).expect("solves");

        assert!(!both.is_empty());
        assert!(both.len() <= a_only.len());
        for sol in &both {
            assert!(a_only.contains(sol));
        }
    }

    #[test]
    fn test_forall_does_not_leak_skolem() {
        // forall<T> WellFormedAdt(i32) 可证，且输出环境不含对 skolem 的绑定
        let env = DeclLayer::empty_env(policy::wf_only);
        let config = SolverConfig::default();

        let goal = Goal::for_all(
            Generics::types(&["T"]),
            Goal::Pred(Predicate::well_formed_adt("i32", Vec::new())),
        );
        let solutions = prove_top_level_goal(&env, &goal, &config).expect("solves");
        assert_eq!(solutions.len(), 1);
        for (var, param) in solutions[0].bindings() {
            assert!(var.is_existential());
            assert!(param.vars().iter().all(|v| !v.is_universal()));
        }
    }

    #[test]
    fn test_exists_decomposes() {
        let env = DeclLayer::empty_env(policy::wf_only);
        let config = SolverConfig::default();

        // 存在量化引入新鲜存在变量后继续证明目标体
        let goal = Goal::exists(
            Generics::types(&["T"]),
            Goal::Pred(Predicate::well_formed_adt("bool", Vec::new())),
        );
        let solutions = prove_top_level_goal(&env, &goal, &config).expect("solves");
        assert_eq!(solutions.len(), 1);
    }

    #[test]
    fn test_depth_budget_surfaces_exhaustion() {
        // 左递归子句 + 不允许协归纳：深度预算耗尽是独立结局
        use crate::lower::LoweredProgram;
        use std::sync::Arc;

        let mut lowered = LoweredProgram::default();
        let head = Predicate::Implemented(TraitRef::new(
            "Loop",
            vec![Param::app("Box", vec![Param::name("T")])],
        ));
        lowered.clauses.push(Clause::rule(
            Generics::types(&["T"]),
            head.clone(),
            vec![Goal::Pred(Predicate::Implemented(TraitRef::new(
                "Loop",
                vec![Param::app("Box", vec![Param::app(
                    "Box",
                    vec![Param::name("T")],
                )])],
            )))],
        ));
        let env = crate::env::Env::new(Arc::new(DeclLayer::new(lowered, policy::inductive_only)));

        let goal = Goal::Pred(Predicate::Implemented(TraitRef::new(
            "Loop",
            vec![Param::app("Box", vec![Param::scalar("i32")])],
        )));
        let config = SolverConfig {
            max_depth: 16,
            max_branches: 4096,
        };
        let result = prove_top_level_goal(&env, &goal, &config);
        assert!(matches!(
            result,
            Err(SolveError::SearchExhausted { .. })
        ));
    }

    #[test]
    fn test_exists_before_forall_cannot_defer_choice() {
        // exists<A> forall<T> Tr(A, T)：A 必须先于 T 选定，
        // 子句 forall X. Tr(Option<X>, X) 不能使其成立——
        // 那要求 A 依赖后引入的 skolem
        use crate::lower::LoweredProgram;
        use std::sync::Arc;

        let mut lowered = LoweredProgram::default();
        lowered.clauses.push(Clause::rule(
            Generics::types(&["X"]),
            Predicate::Implemented(TraitRef::new(
                "Tr",
                vec![
                    Param::app("Option", vec![Param::name("X")]),
                    Param::name("X"),
                ],
            )),
            Vec::new(),
        ));
        let env = crate::env::Env::new(Arc::new(DeclLayer::new(lowered.clone(), policy::wf_only)));

        let body = |a: &str, t: &str| {
            Goal::Pred(Predicate::Implemented(TraitRef::new(
                "Tr",
                vec![Param::name(a), Param::name(t)],
            )))
        };
        let goal = Goal::exists(
            Generics::types(&["A"]),
            Goal::for_all(Generics::types(&["T"]), body("A", "T")),
        );
        let solutions =
            prove_top_level_goal(&env, &goal, &SolverConfig::default()).expect("solves");
        assert!(solutions.is_empty());

        // 量词换序后 A 可在 T 之后选定，目标成立
        let env = crate::env::Env::new(Arc::new(DeclLayer::new(lowered, policy::wf_only)));
        let flipped = Goal::for_all(
            Generics::types(&["T"]),
            Goal::exists(Generics::types(&["A"]), body("A", "T")),
        );
        let solutions =
            prove_top_level_goal(&env, &flipped, &SolverConfig::default()).expect("solves");
        assert_eq!(solutions.len(), 1);
    }

    #[test]
    fn test_all_successes_collected() {
        // OR 分支收集全部成功环境，而非首个
        use crate::lower::LoweredProgram;
        use std::sync::Arc;

        let mut lowered = LoweredProgram::default();
        let target = |p: Param| Predicate::Implemented(TraitRef::new("Into", vec![p]));
        lowered.clauses.push(Clause::rule(
            Generics::types(&["T"]),
            target(Param::name("T")),
            vec![Goal::Pred(Predicate::WellFormedAdt {
                adt_id: crate::term::Ident::new("i32"),
                params: Vec::new(),
            })],
        ));
        lowered.clauses.push(Clause::fact(target(Param::scalar("i32"))));
        let env = crate::env::Env::new(Arc::new(DeclLayer::new(lowered, policy::wf_only)));

        let goal = Goal::Pred(target(Param::scalar("i32")));
        let solutions =
            prove_top_level_goal(&env, &goal, &SolverConfig::default()).expect("solves");
        assert_eq!(solutions.len(), 2);
    }
}

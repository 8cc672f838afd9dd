//! 协归纳循环处理测试
//!
//! 自引用的义务在相容策略下终止并成功；
//! 不相容策略下终止并失败（不挂起）

use std::sync::Arc;
use tuili::env::Env;
use tuili::layer::{policy, DeclLayer};
use tuili::lower::LoweredProgram;
use tuili::solve::{prove_top_level_goal, SolverConfig};
use tuili::term::{Clause, Generics, Goal, Param, Predicate, TraitRef};
use tuili::util::logger;

/// 自引用不变式：WellFormedAdt(Node) 的推导要求再次证明自身
fn self_referential_env(policy: tuili::layer::CoinductivePolicy) -> Env {
    let mut lowered = LoweredProgram::default();
    let head = Predicate::well_formed_adt("Node", Vec::new());
    lowered.invariants.push(Clause::rule(
        Generics::none(),
        head.clone(),
        vec![Goal::Pred(head)],
    ));
    Env::new(Arc::new(DeclLayer::new(lowered, policy)))
}

#[test]
fn test_compatible_cycle_terminates_and_succeeds() {
    logger::init_test();
    let env = self_referential_env(policy::wf_only);
    let goal = Goal::Pred(Predicate::well_formed_adt("Node", Vec::new()));

    let solutions = prove_top_level_goal(&env, &goal, &SolverConfig::default()).unwrap();
    assert!(!solutions.is_empty());
}

#[test]
fn test_incompatible_cycle_terminates_and_fails() {
    logger::init_test();
    let env = self_referential_env(policy::inductive_only);
    let goal = Goal::Pred(Predicate::well_formed_adt("Node", Vec::new()));

    let solutions = prove_top_level_goal(&env, &goal, &SolverConfig::default()).unwrap();
    assert!(solutions.is_empty());
}

#[test]
fn test_mutual_recursion_with_compatible_policy() {
    // Tree 与 Forest 互递归：良构性互相依赖
    let mut lowered = LoweredProgram::default();
    let tree = Predicate::well_formed_adt("Tree", Vec::new());
    let forest = Predicate::well_formed_adt("Forest", Vec::new());
    lowered.invariants.push(Clause::rule(
        Generics::none(),
        tree.clone(),
        vec![Goal::Pred(forest.clone())],
    ));
    lowered.invariants.push(Clause::rule(
        Generics::none(),
        forest,
        vec![Goal::Pred(tree.clone())],
    ));
    let env = Env::new(Arc::new(DeclLayer::new(lowered, policy::wf_only)));

    let solutions =
        prove_top_level_goal(&env, &Goal::Pred(tree), &SolverConfig::default()).unwrap();
    assert!(!solutions.is_empty());
}

#[test]
fn test_trait_cycle_not_assumed_under_wf_policy() {
    // Implemented 谓词在 wf_only 策略下不可协归纳假定
    let mut lowered = LoweredProgram::default();
    let head = Predicate::Implemented(TraitRef::new("Recursive", vec![Param::scalar("i32")]));
    lowered.clauses.push(Clause::rule(
        Generics::none(),
        head.clone(),
        vec![Goal::Pred(head.clone())],
    ));
    let env = Env::new(Arc::new(DeclLayer::new(lowered, policy::wf_only)));

    let solutions =
        prove_top_level_goal(&env, &Goal::Pred(head), &SolverConfig::default()).unwrap();
    assert!(solutions.is_empty());
}

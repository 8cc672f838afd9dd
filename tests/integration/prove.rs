//! 端到端证明测试
//!
//! 覆盖声明 → 降低 → 环境 → COSLD 求解的完整链路

use tuili::decl::{
    AdtDecl, AdtKind, CrateDecl, FieldDecl, ImplDecl, Program, TraitDecl, VariantDecl, WhereClause,
};
use tuili::layer::policy;
use tuili::term::{Generics, Goal, Ident, Param, TraitRef};
use tuili::util::logger;

/// Option<T> + trait Clone + impl forall T. Clone for Option<T> where Clone for T
fn option_clone_program(with_i32_impl: bool) -> Program {
    let mut krate = CrateDecl::new("core");
    krate.add_adt(AdtDecl {
        id: Ident::new("Option"),
        kind: AdtKind::Enum,
        generics: Generics::types(&["T"]),
        where_clauses: Vec::new(),
        variants: vec![
            VariantDecl::new("None", Vec::new()),
            VariantDecl::new("Some", vec![FieldDecl::new("0", Param::name("T"))]),
        ],
    });
    krate.add_trait(TraitDecl::new("Clone", &[]));
    krate.add_impl(ImplDecl {
        generics: Generics::types(&["T"]),
        trait_ref: TraitRef::new("Clone", vec![Param::app("Option", vec![Param::name("T")])]),
        where_clauses: vec![WhereClause::implemented(TraitRef::new(
            "Clone",
            vec![Param::name("T")],
        ))],
        items: Vec::new(),
    });
    if with_i32_impl {
        krate.add_impl(ImplDecl {
            generics: Generics::none(),
            trait_ref: TraitRef::new("Clone", vec![Param::scalar("i32")]),
            where_clauses: Vec::new(),
            items: Vec::new(),
        });
    }
    Program::with_crate(krate)
}

fn option_i32_clone_goal() -> Goal {
    Goal::implemented(TraitRef::new(
        "Clone",
        vec![Param::app("Option", vec![Param::scalar("i32")])],
    ))
}

#[test]
fn test_option_clone_provable_with_base_impl() {
    logger::init_test();
    let program = option_clone_program(true);
    assert!(tuili::is_provable(&program, &option_i32_clone_goal(), policy::wf_only).unwrap());
}

#[test]
fn test_option_clone_not_provable_without_base_impl() {
    logger::init_test();
    let program = option_clone_program(false);
    assert!(!tuili::is_provable(&program, &option_i32_clone_goal(), policy::wf_only).unwrap());
}

#[test]
fn test_nested_option_clone() {
    // Clone for Option<Option<i32>> 需要两次应用泛型 impl
    let program = option_clone_program(true);
    let goal = Goal::implemented(TraitRef::new(
        "Clone",
        vec![Param::app(
            "Option",
            vec![Param::app("Option", vec![Param::scalar("i32")])],
        )],
    ));
    assert!(tuili::is_provable(&program, &goal, policy::wf_only).unwrap());
}

#[test]
fn test_forall_goal_requires_premise_for_arbitrary_instantiation() {
    // forall<T> Clone for Option<T>：T 是任意类型，其 Clone 前提
    // 无法建立，目标不可证
    let program = option_clone_program(true);
    let goal = Goal::for_all(
        Generics::types(&["T"]),
        Goal::implemented(TraitRef::new(
            "Clone",
            vec![Param::app("Option", vec![Param::name("T")])],
        )),
    );
    assert!(!tuili::is_provable(&program, &goal, policy::wf_only).unwrap());
}

#[test]
fn test_exists_goal_finds_witness() {
    // exists<T> Clone for Option<T>：T = i32 做见证
    let program = option_clone_program(true);
    let goal = Goal::exists(
        Generics::types(&["T"]),
        Goal::implemented(TraitRef::new(
            "Clone",
            vec![Param::app("Option", vec![Param::name("T")])],
        )),
    );
    let solutions = tuili::prove(&program, &goal, policy::wf_only).unwrap();
    assert!(!solutions.is_empty());
}

#[test]
fn test_conjunction_goal() {
    let program = option_clone_program(true);
    let goal = Goal::all(vec![
        Goal::implemented(TraitRef::new("Clone", vec![Param::scalar("i32")])),
        option_i32_clone_goal(),
    ]);
    assert!(tuili::is_provable(&program, &goal, policy::wf_only).unwrap());
}

#[test]
fn test_unknown_trait_fails_fast() {
    // impl 引用未声明的 trait：构造期缺陷，而非"不可证"
    let mut krate = CrateDecl::new("core");
    krate.add_impl(ImplDecl {
        generics: Generics::none(),
        trait_ref: TraitRef::new("Ghost", vec![Param::scalar("i32")]),
        where_clauses: Vec::new(),
        items: Vec::new(),
    });
    let program = Program::with_crate(krate);

    let goal = Goal::implemented(TraitRef::new("Ghost", vec![Param::scalar("i32")]));
    assert!(tuili::prove(&program, &goal, policy::wf_only).is_err());
}

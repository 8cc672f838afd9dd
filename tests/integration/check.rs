//! 程序级检查端到端测试

use tuili::check::{check_program, CheckError};
use tuili::decl::{
    AdtDecl, AdtKind, CrateDecl, FieldDecl, ImplDecl, Program, TraitDecl, VariantDecl, WhereClause,
};
use tuili::layer::policy;
use tuili::solve::SolverConfig;
use tuili::term::{Generics, Ident, Param, TraitRef};
use tuili::util::logger;

/// Pair 结构体 + Clone trait + 逐字段 impl 的完整声明集
fn pair_program() -> Program {
    let mut krate = CrateDecl::new("core");
    krate.add_adt(AdtDecl {
        id: Ident::new("Pair"),
        kind: AdtKind::Struct,
        generics: Generics::types(&["A", "B"]),
        where_clauses: Vec::new(),
        variants: vec![VariantDecl::new(
            "Pair",
            vec![
                FieldDecl::new("first", Param::name("A")),
                FieldDecl::new("second", Param::name("B")),
            ],
        )],
    });
    krate.add_trait(TraitDecl::new("Clone", &[]));
    krate.add_impl(ImplDecl {
        generics: Generics::types(&["A", "B"]),
        trait_ref: TraitRef::new(
            "Clone",
            vec![Param::app("Pair", vec![Param::name("A"), Param::name("B")])],
        ),
        where_clauses: vec![
            WhereClause::implemented(TraitRef::new("Clone", vec![Param::name("A")])),
            WhereClause::implemented(TraitRef::new("Clone", vec![Param::name("B")])),
        ],
        items: Vec::new(),
    });
    Program::with_crate(krate)
}

#[test]
fn test_well_formed_program_passes() {
    logger::init_test();
    assert!(check_program(&pair_program(), policy::wf_only, &SolverConfig::default()).is_ok());
}

#[test]
fn test_scalar_fields_discharged_by_builtins() {
    let mut krate = CrateDecl::new("core");
    krate.add_adt(AdtDecl {
        id: Ident::new("Point"),
        kind: AdtKind::Struct,
        generics: Generics::none(),
        where_clauses: Vec::new(),
        variants: vec![VariantDecl::new(
            "Point",
            vec![
                FieldDecl::new("x", Param::scalar("f64")),
                FieldDecl::new("y", Param::scalar("f64")),
            ],
        )],
    });
    let program = Program::with_crate(krate);

    assert!(check_program(&program, policy::wf_only, &SolverConfig::default()).is_ok());
}

#[test]
fn test_unsatisfied_where_clause_reported() {
    // Holder<T> where T: Clone，但 Clone 无任何 impl：
    // 良构义务在任意 T 下不可证
    let mut krate = CrateDecl::new("core");
    krate.add_trait(TraitDecl::new("Clone", &[]));
    krate.add_adt(AdtDecl {
        id: Ident::new("Holder"),
        kind: AdtKind::Struct,
        generics: Generics::types(&["T"]),
        where_clauses: vec![WhereClause::implemented(TraitRef::new(
            "Clone",
            vec![Param::name("T")],
        ))],
        variants: vec![VariantDecl::new(
            "Holder",
            vec![FieldDecl::new("0", Param::name("T"))],
        )],
    });
    let program = Program::with_crate(krate);

    let errors =
        check_program(&program, policy::wf_only, &SolverConfig::default()).expect_err("must fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CheckError::Unprovable { item, .. } => assert!(item.contains("Holder")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_declaration_defect_fails_fast() {
    // impl 引用未声明的 trait：降低阶段即失败，不进入证明
    let mut krate = CrateDecl::new("core");
    krate.add_impl(ImplDecl {
        generics: Generics::none(),
        trait_ref: TraitRef::new("Ghost", vec![Param::scalar("i32")]),
        where_clauses: Vec::new(),
        items: Vec::new(),
    });
    let program = Program::with_crate(krate);

    let errors =
        check_program(&program, policy::wf_only, &SolverConfig::default()).expect_err("must fail");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CheckError::Solve(_)));
}

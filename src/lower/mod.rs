//! 声明降低（clause lowering）
//!
//! 将声明集翻译为扁平、顺序无关的逻辑子句集与常备不变式集：
//! - 每个 impl 声明产出一条子句：头部为 Implemented(trait_ref)，
//!   前提恰为 impl 的 where 子句
//! - 每个 ADT 声明产出一条不变式：以自身泛型全称量化，
//!   捕捉其形状（字段类型的良构义务 + 自身 where 子句）
//! - trait 声明不直接产出子句，仅登记其泛型供头部匹配
//!
//! 同时建立 ADT 泛型索引，供钩子回答"此 ADT 的形式参数是什么"。

use crate::decl::{AdtDecl, DeclError, ImplDecl, Program, WhereClause};
use crate::term::{Clause, Generics, Goal, Ident, Param, Predicate};
use indexmap::IndexMap;
use tracing::debug;

/// 降低产物
///
/// 子句与不变式是集合语义：存放顺序不承载含义
#[derive(Debug, Clone, Default)]
pub struct LoweredProgram {
    /// 派生子句集
    pub clauses: Vec<Clause>,
    /// 常备不变式集
    pub invariants: Vec<Clause>,
    /// ADT 泛型索引
    pub adt_generics: IndexMap<Ident, Generics>,
    /// trait 泛型登记（供头部匹配）
    pub trait_generics: IndexMap<Ident, Generics>,
}

/// 将程序降低为子句与不变式
///
/// 先做构造期校验；声明集缺陷在此快速失败，不进入求解
pub fn lower_program(program: &Program) -> Result<LoweredProgram, DeclError> {
    program.validate()?;

    let mut lowered = LoweredProgram::default();

    // 先登记全部泛型索引：impl 可以引用其他 crate 的 trait
    for krate in &program.crates {
        for adt in krate.adts.values() {
            lowered
                .adt_generics
                .insert(adt.id.clone(), adt.generics.clone());
        }
        for trait_decl in krate.traits.values() {
            lowered
                .trait_generics
                .insert(trait_decl.id.clone(), trait_decl.generics.clone());
        }
    }

    for krate in &program.crates {
        for adt in krate.adts.values() {
            lowered.invariants.push(lower_adt(program, adt));
        }
        for impl_decl in &krate.impls {
            // trait 引用的参数数量必须与声明的泛型一致（含隐式 Self）
            if let Some(generics) = lowered.trait_generics.get(&impl_decl.trait_ref.trait_id) {
                if impl_decl.trait_ref.params.len() != generics.len() {
                    return Err(DeclError::TraitArity {
                        id: impl_decl.trait_ref.trait_id.clone(),
                        expected: generics.len(),
                        found: impl_decl.trait_ref.params.len(),
                    });
                }
            }
            lowered.clauses.push(lower_impl(impl_decl));
        }
    }

    debug!(
        clauses = lowered.clauses.len(),
        invariants = lowered.invariants.len(),
        adts = lowered.adt_generics.len(),
        "program lowered"
    );
    Ok(lowered)
}

/// impl 声明 → 子句
///
/// `forall impl.generics . Implemented(trait_ref) :- where_clauses`。
/// 子句仅当求解器能把查询的 trait 引用与头部合一时适用，
/// impl 的泛型届时作为新鲜求解变量实例化
fn lower_impl(impl_decl: &ImplDecl) -> Clause {
    Clause::rule(
        impl_decl.generics.clone(),
        Predicate::Implemented(impl_decl.trait_ref.clone()),
        impl_decl
            .where_clauses
            .iter()
            .map(lower_where_clause)
            .collect(),
    )
}

/// ADT 声明 → 不变式
///
/// `forall adt.generics . WellFormedAdt(adt) :- 字段良构义务 + where 子句`。
/// 以 ADT 自身泛型量化，对任意实例化适用
fn lower_adt(
    program: &Program,
    adt: &AdtDecl,
) -> Clause {
    let params: Vec<Param> = adt
        .generics
        .iter()
        .map(|b| Param::Name(b.id.clone()))
        .collect();
    let head = Predicate::WellFormedAdt {
        adt_id: adt.id.clone(),
        params,
    };

    let mut premises: Vec<Goal> = adt
        .where_clauses
        .iter()
        .map(lower_where_clause)
        .collect();
    for variant in &adt.variants {
        for field in &variant.fields {
            premises.extend(well_formed_obligation(program, &field.ty));
        }
    }

    Clause::rule(adt.generics.clone(), head, premises)
}

/// where 子句 → 子目标
fn lower_where_clause(wc: &WhereClause) -> Goal {
    match wc {
        WhereClause::Implemented(tr) => Goal::Pred(Predicate::Implemented(tr.clone())),
        WhereClause::ForAll(binders, inner) => {
            Goal::for_all(binders.clone(), lower_where_clause(inner))
        }
    }
}

/// 字段类型的良构义务
///
/// 只有已声明 ADT 的构造子应用产生义务；绑定名（泛型参数）
/// 与未声明构造子（内建标量等）不产生，由钩子合成的内建子句兜底
fn well_formed_obligation(
    program: &Program,
    ty: &Param,
) -> Option<Goal> {
    match ty {
        Param::App { ctor, args } if program.adt(ctor).is_some() => {
            Some(Goal::Pred(Predicate::WellFormedAdt {
                adt_id: ctor.clone(),
                params: args.clone(),
            }))
        }
        _ => None,
    }
}

//! 绑定名代换
//!
//! 将声明侧的绑定名（`Param::Name`）按名字映射替换为具体参数项，
//! 用于实例化子句绑定子和量化目标。内层量词遮蔽同名外层绑定。

use super::clause::Clause;
use super::goal::Goal;
use super::param::{Generics, Ident, Param, TraitRef};
use super::predicate::Predicate;
use indexmap::IndexMap;

/// 名字到参数项的映射
pub type NameMap = IndexMap<Ident, Param>;

/// 可进行绑定名代换的项
pub trait SubstNames {
    /// 以 `map` 替换项中的绑定名，返回替换后的新项
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self;
}

/// 移除被内层绑定子遮蔽的名字
fn unshadowed(
    map: &NameMap,
    binders: &Generics,
) -> NameMap {
    map.iter()
        .filter(|(id, _)| !binders.contains_id(id))
        .map(|(id, p)| (id.clone(), p.clone()))
        .collect()
}

impl SubstNames for Param {
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self {
        match self {
            Param::Var(v) => Param::Var(*v),
            Param::Name(id) => map.get(id).cloned().unwrap_or_else(|| self.clone()),
            Param::App { ctor, args } => Param::App {
                ctor: ctor.clone(),
                args: args.iter().map(|a| a.subst_names(map)).collect(),
            },
        }
    }
}

impl SubstNames for TraitRef {
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self {
        TraitRef {
            trait_id: self.trait_id.clone(),
            params: self.params.iter().map(|p| p.subst_names(map)).collect(),
        }
    }
}

impl SubstNames for Predicate {
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self {
        match self {
            Predicate::Implemented(tr) => Predicate::Implemented(tr.subst_names(map)),
            Predicate::WellFormedAdt { adt_id, params } => Predicate::WellFormedAdt {
                adt_id: adt_id.clone(),
                params: params.iter().map(|p| p.subst_names(map)).collect(),
            },
        }
    }
}

impl SubstNames for Goal {
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self {
        match self {
            Goal::Pred(p) => Goal::Pred(p.subst_names(map)),
            Goal::All(goals) => Goal::All(goals.iter().map(|g| g.subst_names(map)).collect()),
            Goal::ForAll(binders, body) => {
                let inner = unshadowed(map, binders);
                Goal::ForAll(binders.clone(), Box::new(body.subst_names(&inner)))
            }
            Goal::Exists(binders, body) => {
                let inner = unshadowed(map, binders);
                Goal::Exists(binders.clone(), Box::new(body.subst_names(&inner)))
            }
        }
    }
}

impl SubstNames for Clause {
    fn subst_names(
        &self,
        map: &NameMap,
    ) -> Self {
        let inner = unshadowed(map, &self.binders);
        Clause {
            binders: self.binders.clone(),
            head: self.head.subst_names(&inner),
            premises: self.premises.iter().map(|g| g.subst_names(&inner)).collect(),
        }
    }
}

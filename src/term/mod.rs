//! 项语言（term language）
//!
//! 求解器操作的统一项表示：
//! - Ident: 不透明标识符
//! - Var: 求解器变量（存在变量/全称变量）
//! - Param: 参数项（变量、绑定名、构造子应用）
//! - Predicate / Goal: 原子谓词与证明目标
//! - Clause: Horn 风格子句（head :- premises）

pub mod clause;
pub mod goal;
pub mod param;
pub mod predicate;
pub mod subst;
pub mod var;

pub use clause::{Clause, Relation};
pub use goal::Goal;
pub use param::{Generics, Ident, KindedVarId, Param, ParamKind, TraitRef};
pub use predicate::{Predicate, PredicateKind};
pub use subst::{NameMap, SubstNames};
pub use var::{Var, VarKind};

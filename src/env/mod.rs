//! 求解环境
//!
//! Environment 是贯穿证明搜索的不可变值对象：
//! - 钩子束（hook bundle）：环境构造时注入的回调集合，搜索期间固定不变
//! - 代换：已积累的变量绑定（求解过程只演化这一部分）
//! - 新鲜变量计数器与当前 universe 层级
//!
//! 每个证明分支持有自己的环境快照；成功返回环境，失败丢弃。

use crate::decl::DeclError;
use crate::term::{Clause, Generics, Ident, NameMap, Param, Predicate, Relation, Var};
use crate::unify::Mismatch;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// 钩子束
///
/// 核心与外围层之间唯一的扩展点。环境构造时绑定，
/// 搜索期间不可替换；求解器只演化环境的绑定部分
pub trait Hooks: Send + Sync {
    /// 与谓词相关的候选子句
    ///
    /// 对给定谓词必须是全函数且纯函数；允许动态合成子句
    /// （例如内建规则），不限于声明集降低产出的子句
    fn clauses(
        &self,
        predicate: &Predicate,
    ) -> Vec<Clause>;

    /// 常备不变式集合（环境生命周期内固定）
    fn invariants(&self) -> Vec<Clause>;

    /// 层特定的谓词相等（模指定变量集）
    ///
    /// 比较经不同推导路径到达的同一义务；`wildcards` 中的变量
    /// 视为无关占位符
    fn equate_predicates(
        &self,
        env: &Env,
        wildcards: &HashSet<Var>,
        left: &Predicate,
        right: &Predicate,
    ) -> Result<Env, Mismatch>;

    /// 参数合一/关系的单步（必须遵守 occurs check）
    fn relate_parameters(
        &self,
        env: &Env,
        relation: &Relation,
    ) -> Result<Env, Mismatch>;

    /// 协归纳相容性测试
    ///
    /// 对谓词种类的固定、无副作用分类：判定循环出现的目标
    /// 能否被协归纳地假定为真
    fn coinduction_compatible(
        &self,
        on_stack: &Predicate,
        goal: &Predicate,
    ) -> bool;

    /// 查询 ADT 声明的形式泛型参数
    ///
    /// 对作用域内全部已声明 ADT 为全函数；未声明的 id 是调用方缺陷，
    /// 返回终止性错误
    fn adt_generics(
        &self,
        adt_id: &Ident,
    ) -> Result<Generics, DeclError>;
}

/// 求解环境（不可变值对象）
///
/// 分支产生新环境而非原地修改；钩子束以 `Arc` 共享，
/// 只有绑定、计数器与 universe 随证明演化
#[derive(Clone)]
pub struct Env {
    hooks: Arc<dyn Hooks>,
    bindings: IndexMap<Var, Param>,
    next_var: usize,
    universe: usize,
}

impl Env {
    /// 构造环境（make-environment）
    ///
    /// 纯构造，不做形状之外的校验：钩子函数是被信任的
    pub fn new(hooks: Arc<dyn Hooks>) -> Self {
        Env {
            hooks,
            bindings: IndexMap::new(),
            next_var: 0,
            universe: 0,
        }
    }

    /// 钩子束
    pub fn hooks(&self) -> &Arc<dyn Hooks> {
        &self.hooks
    }

    /// 与谓词相关的候选子句（委托给钩子）
    pub fn clauses_for(
        &self,
        predicate: &Predicate,
    ) -> Vec<Clause> {
        self.hooks.clauses(predicate)
    }

    /// 常备不变式集合（委托给钩子）
    pub fn invariants(&self) -> Vec<Clause> {
        self.hooks.invariants()
    }

    /// 当前 universe 层级
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// 已积累的绑定
    pub fn bindings(&self) -> &IndexMap<Var, Param> {
        &self.bindings
    }

    /// 查找变量的直接绑定
    pub fn lookup(
        &self,
        var: &Var,
    ) -> Option<&Param> {
        self.bindings.get(var)
    }

    /// 为绑定子引入新鲜存在变量
    ///
    /// 返回扩展后的环境和绑定名到新变量的映射
    pub fn with_fresh_existentials(
        &self,
        binders: &Generics,
    ) -> (Env, NameMap) {
        let mut env = self.clone();
        let mut map = NameMap::new();
        for binder in binders.iter() {
            let var = Var::existential(env.next_var, env.universe);
            env.next_var += 1;
            map.insert(binder.id.clone(), Param::Var(var));
        }
        (env, map)
    }

    /// 为绑定子引入新鲜全称变量（skolem），提升 universe 层级
    ///
    /// 证明必须对任意实例化成立；新变量不得向调用方泄漏绑定
    pub fn with_fresh_universals(
        &self,
        binders: &Generics,
    ) -> (Env, NameMap) {
        let mut env = self.clone();
        env.universe += 1;
        let mut map = NameMap::new();
        for binder in binders.iter() {
            let var = Var::universal(env.next_var, env.universe);
            env.next_var += 1;
            map.insert(binder.id.clone(), Param::Var(var));
        }
        (env, map)
    }

    /// 在指定 universe 层级引入单个新鲜存在变量
    ///
    /// 供 unify 子系统做 universe 降级（promotion）：把深层存在变量
    /// 换成浅层的新鲜变量
    pub(crate) fn with_fresh_existential(
        &self,
        universe: usize,
    ) -> (Env, Var) {
        let mut env = self.clone();
        let var = Var::existential(env.next_var, universe);
        env.next_var += 1;
        (env, var)
    }

    /// 记录一个绑定，返回新环境
    ///
    /// 不做检查；occurs check 与 universe 检查由 unify 子系统负责
    pub(crate) fn with_binding(
        &self,
        var: Var,
        param: Param,
    ) -> Env {
        let mut env = self.clone();
        env.bindings.insert(var, param);
        env
    }

    /// 追踪变量链，返回参数的浅解析结果
    ///
    /// 只追到绑定链的根，不递归进入构造子实参
    pub fn resolve_shallow(
        &self,
        param: &Param,
    ) -> Param {
        let mut current = param.clone();
        // 绑定链长度受绑定总数约束，不会成环（occurs check 保证）
        while let Param::Var(v) = &current {
            match self.bindings.get(v) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    /// 将当前代换完整应用到参数项
    pub fn resolve(
        &self,
        param: &Param,
    ) -> Param {
        match self.resolve_shallow(param) {
            Param::App { ctor, args } => Param::App {
                ctor,
                args: args.iter().map(|a| self.resolve(a)).collect(),
            },
            leaf => leaf,
        }
    }

    /// 将当前代换完整应用到谓词
    pub fn resolve_predicate(
        &self,
        predicate: &Predicate,
    ) -> Predicate {
        match predicate {
            Predicate::Implemented(tr) => Predicate::Implemented(crate::term::TraitRef {
                trait_id: tr.trait_id.clone(),
                params: tr.params.iter().map(|p| self.resolve(p)).collect(),
            }),
            Predicate::WellFormedAdt { adt_id, params } => Predicate::WellFormedAdt {
                adt_id: adt_id.clone(),
                params: params.iter().map(|p| self.resolve(p)).collect(),
            },
        }
    }

}

/// 环境的结构相等
///
/// 两个环境是"同一求解状态"当且仅当钩子束为同一实例
/// 且积累的绑定一致；钩子束只比较指针身份
impl PartialEq for Env {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.hooks, &other.hooks)
            && self.bindings == other.bindings
            && self.universe == other.universe
    }
}

impl Eq for Env {}

impl fmt::Debug for Env {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Env")
            .field("bindings", &self.bindings)
            .field("next_var", &self.next_var)
            .field("universe", &self.universe)
            .finish_non_exhaustive()
    }
}

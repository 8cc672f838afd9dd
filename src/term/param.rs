//! 参数项与泛型定义
//!
//! - Ident: 不透明标识符（crate、ADT、trait、变体、字段、参数的名字）
//! - ParamKind / KindedVarId / Generics: 声明的泛型参数序列（顺序显著）
//! - Param: 参数项（求解器变量、声明绑定名、构造子应用）
//! - TraitRef: trait 引用（trait id + 参数列表，首位为 Self）

use super::var::Var;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// 不透明标识符
///
/// 在声明作用域内全局唯一，其余不作解释
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    /// 创建新标识符
    pub fn new(name: impl Into<String>) -> Self {
        Ident(name.into())
    }

    /// 获取标识符的文本
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name)
    }
}

impl fmt::Display for Ident {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 参数种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// 类型参数
    Ty,
    /// 生命周期参数
    Lifetime,
    /// Const 参数
    Const,
}

/// 带种类的绑定变量（泛型参数声明）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindedVarId {
    /// 参数种类
    pub kind: ParamKind,
    /// 参数名
    pub id: Ident,
}

impl KindedVarId {
    /// 创建类型参数
    pub fn ty(name: impl Into<String>) -> Self {
        KindedVarId {
            kind: ParamKind::Ty,
            id: Ident::new(name),
        }
    }

    /// 创建生命周期参数
    pub fn lifetime(name: impl Into<String>) -> Self {
        KindedVarId {
            kind: ParamKind::Lifetime,
            id: Ident::new(name),
        }
    }

    /// 创建 Const 参数
    pub fn konst(name: impl Into<String>) -> Self {
        KindedVarId {
            kind: ParamKind::Const,
            id: Ident::new(name),
        }
    }
}

/// 泛型参数序列（顺序显著，按位置代换）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Generics(Vec<KindedVarId>);

impl Generics {
    /// 创建空泛型序列
    pub fn none() -> Self {
        Generics(Vec::new())
    }

    /// 从类型参数名列表创建
    pub fn types(names: &[&str]) -> Self {
        Generics(names.iter().map(|n| KindedVarId::ty(*n)).collect())
    }

    /// 是否包含指定名字的参数
    pub fn contains_id(
        &self,
        id: &Ident,
    ) -> bool {
        self.0.iter().any(|v| &v.id == id)
    }
}

impl Deref for Generics {
    type Target = [KindedVarId];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<KindedVarId>> for Generics {
    fn from(params: Vec<KindedVarId>) -> Self {
        Generics(params)
    }
}

/// 参数项
///
/// 标量类型表示为无参构造子应用（如 `App { ctor: "i32", args: [] }`），
/// 生命周期和 Const 实参同样以带种类的叶子构造子表示
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    /// 求解器变量
    Var(Var),
    /// 声明侧绑定名（实例化时被替换）
    Name(Ident),
    /// 构造子应用
    App {
        /// 构造子（ADT 名或内建标量名）
        ctor: Ident,
        /// 实参（顺序显著）
        args: Vec<Param>,
    },
}

impl Param {
    /// 创建构造子应用
    pub fn app(
        ctor: impl Into<String>,
        args: Vec<Param>,
    ) -> Self {
        Param::App {
            ctor: Ident::new(ctor),
            args,
        }
    }

    /// 创建无参构造子（标量类型）
    pub fn scalar(ctor: impl Into<String>) -> Self {
        Param::app(ctor, Vec::new())
    }

    /// 创建声明绑定名
    pub fn name(id: impl Into<String>) -> Self {
        Param::Name(Ident::new(id))
    }

    /// 项中出现的所有求解器变量
    pub fn vars(&self) -> Vec<Var> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(
        &self,
        out: &mut Vec<Var>,
    ) {
        match self {
            Param::Var(v) => out.push(*v),
            Param::Name(_) => {}
            Param::App { args, .. } => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    /// 项中是否出现指定变量（occurs check 用）
    pub fn mentions(
        &self,
        var: &Var,
    ) -> bool {
        match self {
            Param::Var(v) => v == var,
            Param::Name(_) => false,
            Param::App { args, .. } => args.iter().any(|a| a.mentions(var)),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Param::Var(v) => write!(f, "{}", v),
            Param::Name(id) => write!(f, "{}", id),
            Param::App { ctor, args } => {
                write!(f, "{}", ctor)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

/// Trait 引用
///
/// `params[0]` 恒为 Self 类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitRef {
    /// Trait 名
    pub trait_id: Ident,
    /// 参数列表（首位为 Self）
    pub params: Vec<Param>,
}

impl TraitRef {
    /// 创建 trait 引用
    pub fn new(
        trait_id: impl Into<String>,
        params: Vec<Param>,
    ) -> Self {
        TraitRef {
            trait_id: Ident::new(trait_id),
            params,
        }
    }

    /// Self 类型（参数列表首位）
    pub fn self_ty(&self) -> Option<&Param> {
        self.params.first()
    }
}

impl fmt::Display for TraitRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}(", self.trait_id)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}

//! 声明模型
//!
//! 表示 crate 中的三类声明：
//! - AdtDecl: 代数数据类型声明（struct/enum/union + 变体 + 字段）
//! - TraitDecl: trait 声明（泛型首位恒为隐式 Self）
//! - ImplDecl: trait 实现声明（无名，仅按位置/内容区分）
//!
//! 声明以扁平、按标识符索引的表存放（arena + index 模式），
//! 相互引用通过 id 查找而非直接所有权，自然支持递归/互递归声明。

use crate::term::{Generics, Ident, KindedVarId, Param, ParamKind, TraitRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 声明集的构造期错误
///
/// 这些是声明集本身的缺陷，在求解开始前快速失败，
/// 与"目标不可证"是不同的失败类别
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeclError {
    /// 重复的 ADT 声明
    #[error("Duplicate ADT declaration: {id}")]
    DuplicateAdt { id: Ident },

    /// 重复的 trait 声明
    #[error("Duplicate trait declaration: {id}")]
    DuplicateTrait { id: Ident },

    /// impl 引用了未声明的 trait
    #[error("Impl references unknown trait: {id}")]
    UnknownTrait { id: Ident },

    /// 查找了未声明的 ADT
    #[error("Unknown ADT: {id}")]
    UnknownAdt { id: Ident },

    /// trait 声明缺少隐式 Self 参数
    #[error("Trait '{id}' is missing the implicit Self parameter")]
    MissingSelf { id: Ident },

    /// 字段类型引用了不在作用域内的绑定名
    #[error("ADT '{adt}' field references unbound name: {name}")]
    UnboundName { adt: Ident, name: Ident },

    /// impl 的 trait 引用参数数量与 trait 声明不符
    #[error("Impl of trait '{id}' supplies {found} parameters, declaration expects {expected}")]
    TraitArity {
        id: Ident,
        expected: usize,
        found: usize,
    },
}

/// ADT 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdtKind {
    /// 结构体
    Struct,
    /// 枚举
    Enum,
    /// 联合体
    Union,
}

/// 字段声明
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    /// 字段名
    pub id: Ident,
    /// 字段类型
    pub ty: Param,
}

impl FieldDecl {
    /// 创建字段声明
    pub fn new(
        id: impl Into<String>,
        ty: Param,
    ) -> Self {
        FieldDecl {
            id: Ident::new(id),
            ty,
        }
    }
}

/// 变体声明（字段顺序显著）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantDecl {
    /// 变体名
    pub id: Ident,
    /// 字段序列
    pub fields: Vec<FieldDecl>,
}

impl VariantDecl {
    /// 创建变体声明
    pub fn new(
        id: impl Into<String>,
        fields: Vec<FieldDecl>,
    ) -> Self {
        VariantDecl {
            id: Ident::new(id),
            fields,
        }
    }
}

/// where 子句
///
/// 附着在声明上的前提，降低后成为派生子句的前件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhereClause {
    /// trait 引用必须成立
    Implemented(TraitRef),
    /// 全称量化的嵌套 where 子句
    ForAll(Generics, Box<WhereClause>),
}

impl WhereClause {
    /// 创建 Implemented 义务
    pub fn implemented(trait_ref: TraitRef) -> Self {
        WhereClause::Implemented(trait_ref)
    }

    /// 创建全称量化子句
    pub fn for_all(
        binders: Generics,
        body: WhereClause,
    ) -> Self {
        WhereClause::ForAll(binders, Box::new(body))
    }
}

/// ADT 声明
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdtDecl {
    /// ADT 名
    pub id: Ident,
    /// 种类
    pub kind: AdtKind,
    /// 泛型参数
    pub generics: Generics,
    /// where 子句
    pub where_clauses: Vec<WhereClause>,
    /// 变体序列（顺序显著）
    pub variants: Vec<VariantDecl>,
}

/// trait 项（方法/关联项签名，对核心不透明）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitItem {
    /// 项名
    pub id: Ident,
}

/// trait 声明
///
/// 泛型的首位恒为隐式 `Self` 类型参数，由构造函数保证
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitDecl {
    /// trait 名
    pub id: Ident,
    /// 泛型参数（首位为 Self）
    pub generics: Generics,
    /// where 子句
    pub where_clauses: Vec<WhereClause>,
    /// trait 项（对核心不透明）
    pub items: Vec<TraitItem>,
}

impl TraitDecl {
    /// 创建 trait 声明，自动补上隐式 Self 参数
    pub fn new(
        id: impl Into<String>,
        extra_generics: &[&str],
    ) -> Self {
        let mut params = vec![KindedVarId::ty("Self")];
        params.extend(extra_generics.iter().map(|n| KindedVarId::ty(*n)));
        TraitDecl {
            id: Ident::new(id),
            generics: Generics::from(params),
            where_clauses: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// trait 实现声明（无名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplDecl {
    /// 泛型参数
    pub generics: Generics,
    /// 被实现的 trait 引用
    pub trait_ref: TraitRef,
    /// where 子句
    pub where_clauses: Vec<WhereClause>,
    /// impl 项（对核心不透明）
    pub items: Vec<TraitItem>,
}

/// crate 声明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrateDecl {
    /// crate 名
    pub id: Ident,
    /// ADT 声明表（按 id 索引）
    pub adts: IndexMap<Ident, AdtDecl>,
    /// trait 声明表（按 id 索引）
    pub traits: IndexMap<Ident, TraitDecl>,
    /// impl 声明序列（无名，按位置区分）
    pub impls: Vec<ImplDecl>,
}

impl CrateDecl {
    /// 创建空 crate
    pub fn new(id: impl Into<String>) -> Self {
        CrateDecl {
            id: Ident::new(id),
            adts: IndexMap::new(),
            traits: IndexMap::new(),
            impls: Vec::new(),
        }
    }

    /// 注册 ADT 声明
    pub fn add_adt(
        &mut self,
        adt: AdtDecl,
    ) -> &mut Self {
        self.adts.insert(adt.id.clone(), adt);
        self
    }

    /// 注册 trait 声明
    pub fn add_trait(
        &mut self,
        trait_decl: TraitDecl,
    ) -> &mut Self {
        self.traits.insert(trait_decl.id.clone(), trait_decl);
        self
    }

    /// 注册 impl 声明
    pub fn add_impl(
        &mut self,
        impl_decl: ImplDecl,
    ) -> &mut Self {
        self.impls.push(impl_decl);
        self
    }
}

/// 程序：一组 crate 声明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// crate 序列
    pub crates: Vec<CrateDecl>,
}

impl Program {
    /// 创建空程序
    pub fn new() -> Self {
        Program { crates: Vec::new() }
    }

    /// 由单个 crate 创建程序
    pub fn with_crate(krate: CrateDecl) -> Self {
        Program {
            crates: vec![krate],
        }
    }

    /// 按 id 查找 ADT 声明
    pub fn adt(
        &self,
        id: &Ident,
    ) -> Option<&AdtDecl> {
        self.crates.iter().find_map(|c| c.adts.get(id))
    }

    /// 按 id 查找 trait 声明
    pub fn trait_decl(
        &self,
        id: &Ident,
    ) -> Option<&TraitDecl> {
        self.crates.iter().find_map(|c| c.traits.get(id))
    }

    /// 所有 impl 声明
    pub fn impls(&self) -> impl Iterator<Item = &ImplDecl> {
        self.crates.iter().flat_map(|c| c.impls.iter())
    }

    /// 所有 ADT 声明
    pub fn adts(&self) -> impl Iterator<Item = &AdtDecl> {
        self.crates.iter().flat_map(|c| c.adts.values())
    }

    /// 构造期校验
    ///
    /// 检查重复声明、impl 引用未知 trait、trait 缺失隐式 Self。
    /// 这些缺陷在求解前快速失败
    pub fn validate(&self) -> Result<(), DeclError> {
        let mut seen_adts: IndexMap<&Ident, ()> = IndexMap::new();
        let mut seen_traits: IndexMap<&Ident, ()> = IndexMap::new();

        for krate in &self.crates {
            for adt in krate.adts.values() {
                if seen_adts.insert(&adt.id, ()).is_some() {
                    return Err(DeclError::DuplicateAdt {
                        id: adt.id.clone(),
                    });
                }
                for variant in &adt.variants {
                    for field in &variant.fields {
                        check_names_in_scope(&adt.id, &field.ty, &adt.generics)?;
                    }
                }
            }
            for trait_decl in krate.traits.values() {
                if seen_traits.insert(&trait_decl.id, ()).is_some() {
                    return Err(DeclError::DuplicateTrait {
                        id: trait_decl.id.clone(),
                    });
                }
                let implicit_self = trait_decl.generics.first();
                let has_self = matches!(
                    implicit_self,
                    Some(KindedVarId { kind: ParamKind::Ty, id }) if id.as_str() == "Self"
                );
                if !has_self {
                    return Err(DeclError::MissingSelf {
                        id: trait_decl.id.clone(),
                    });
                }
            }
        }

        for impl_decl in self.impls() {
            if self.trait_decl(&impl_decl.trait_ref.trait_id).is_none() {
                return Err(DeclError::UnknownTrait {
                    id: impl_decl.trait_ref.trait_id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// 字段类型中的绑定名必须由 ADT 自身泛型引入
fn check_names_in_scope(
    adt: &Ident,
    ty: &Param,
    generics: &Generics,
) -> Result<(), DeclError> {
    match ty {
        Param::Name(name) if !generics.contains_id(name) => Err(DeclError::UnboundName {
            adt: adt.clone(),
            name: name.clone(),
        }),
        Param::App { args, .. } => {
            for arg in args {
                check_names_in_scope(adt, arg, generics)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

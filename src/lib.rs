//! TuiLi (推理) Trait Resolution Engine
//!
//! A reference-quality, layered proof engine for nominal type systems:
//! declarations (ADTs, traits, impls) are lowered into Horn-like clauses
//! and standing invariants, and a coinductive SLD resolution procedure
//! (COSLD) decides whether a goal predicate is provable, producing the
//! output environments (variable bindings) under which it holds.
//!
//! # Example
//!
//! ```
//! use tuili::decl::{AdtDecl, AdtKind, CrateDecl, FieldDecl, Program, VariantDecl};
//! use tuili::decl::{ImplDecl, TraitDecl, WhereClause};
//! use tuili::layer::policy;
//! use tuili::term::{Generics, Goal, Ident, Param, TraitRef};
//!
//! let mut krate = CrateDecl::new("core");
//! krate.add_adt(AdtDecl {
//!     id: Ident::new("Option"),
//!     kind: AdtKind::Enum,
//!     generics: Generics::types(&["T"]),
//!     where_clauses: Vec::new(),
//!     variants: vec![
//!         VariantDecl::new("None", Vec::new()),
//!         VariantDecl::new("Some", vec![FieldDecl::new("0", Param::name("T"))]),
//!     ],
//! });
//! krate.add_trait(TraitDecl::new("Clone", &[]));
//! krate.add_impl(ImplDecl {
//!     generics: Generics::types(&["T"]),
//!     trait_ref: TraitRef::new("Clone", vec![Param::app("Option", vec![Param::name("T")])]),
//!     where_clauses: vec![WhereClause::implemented(TraitRef::new(
//!         "Clone",
//!         vec![Param::name("T")],
//!     ))],
//!     items: Vec::new(),
//! });
//! krate.add_impl(ImplDecl {
//!     generics: Generics::none(),
//!     trait_ref: TraitRef::new("Clone", vec![Param::scalar("i32")]),
//!     where_clauses: Vec::new(),
//!     items: Vec::new(),
//! });
//! let program = Program::with_crate(krate);
//!
//! let goal = Goal::implemented(TraitRef::new(
//!     "Clone",
//!     vec![Param::app("Option", vec![Param::scalar("i32")])],
//! ));
//! assert!(tuili::is_provable(&program, &goal, policy::wf_only).unwrap());
//! ```
//!
//! # Crate Features
//!
//! - `debug`: Enable extra debug assertions

#![doc(html_root_url = "https://docs.rs/tuili")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod check;
pub mod decl;
pub mod env;
pub mod layer;
pub mod lower;
pub mod solve;
pub mod term;
pub mod unify;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

// Logging
use tracing::debug;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const NAME: &str = "TuiLi (推理)";

use crate::env::Env;
use crate::layer::{CoinductivePolicy, DeclLayer};
use crate::solve::SolverConfig;
use crate::term::Goal;

/// Prove a goal against a declaration set
///
/// Lowers the program, builds a declaration-layer environment with the
/// given coinduction policy and returns every output environment under
/// which the goal holds (empty = not provable).
pub fn prove(
    program: &decl::Program,
    goal: &Goal,
    policy: CoinductivePolicy,
) -> Result<Vec<Env>> {
    debug!(goal = %goal, "prove called");
    let env = DeclLayer::env(program, policy).context("Failed to lower declarations")?;
    let solutions = solve::prove_top_level_goal(&env, goal, &SolverConfig::default())
        .context("Proof search failed")?;
    debug!(count = solutions.len(), "prove finished");
    Ok(solutions)
}

/// Check whether a goal is provable (at least one output environment)
pub fn is_provable(
    program: &decl::Program,
    goal: &Goal,
    policy: CoinductivePolicy,
) -> Result<bool> {
    Ok(!prove(program, goal, policy)?.is_empty())
}

//! Helion type core: structural inference types and nominal datatypes.
//!
//! Inference works on structural types (variables and named constructors)
//! solved by union-find. Code generation works on nominal datatypes held in
//! a thread-safe registry, which also owns specialization, subtyping and
//! memory layout. Annotations cross into both layers through [`convert`].
//!
//! # Architecture
//!
//! - [`ty`]: structural types, variables and schemes
//! - [`unify`]: union-find resolution, unification, generalization
//! - [`iir`]: the intermediate representation inference runs over
//! - [`infer`]: memoized deduction over IIR functions
//! - [`datatype`]: the nominal registry and specialization cache
//! - [`subtype`]: the nominal subtype relation
//! - [`layout`]: lazily memoized layout lowering
//! - [`convert`]: annotation conversion in both directions
//! - [`error`]: error types with constraint provenance
//! - [`diagnostics`]: ariadne and JSON rendering of errors

pub mod convert;
pub mod datatype;
pub mod diagnostics;
pub mod error;
pub mod iir;
pub mod infer;
pub mod layout;
pub mod subtype;
pub mod ty;
pub mod unify;

pub use convert::{convert, convert_with_params, from_datatype, to_datatype};
pub use datatype::{global_registry, DatatypeId, FieldType, Registry, Style};
pub use error::{ConstraintOrigin, DatatypeError, TypeError};
pub use subtype::subtype;
pub use ty::{Scheme, Ty, TyVar};
pub use unify::InferCtx;

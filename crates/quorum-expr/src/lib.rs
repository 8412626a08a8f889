//! Expression trees for decision programs.
//!
//! # Overview
//!
//! - [`Node`]: closed sum type over linear, quadratic and composite nodes
//! - [`builders`]: simplifying constructors (`add`, `sub`, `mult`, `div`,
//!   `abs`, `sqrt`, `sigma`)
//! - [`Dual`]: forward-mode values for derivative evaluation
//! - [`VarSpace`]: the bounds a tree is interpreted against
//! - [`codec`]: the text form used for cached programs

pub mod builders;
pub mod codec;
pub mod dual;
pub mod error;
pub mod node;
pub mod space;

pub use codec::Tokens;
pub use dual::Dual;
pub use error::{CodecError, ExprError};
pub use node::{Decoupled, Linear, Node, NodeKind, Quadratic, ZERO_TOLERANCE};
pub use space::{BoxSpace, VarSpace};

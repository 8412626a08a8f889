//! Quorum core: decision problems compiled into mathematical programs.

pub mod config;
pub mod ids;
pub mod logging;
pub mod mask;
pub mod problem;
pub mod program;
pub mod translate;

pub use config::CompileOptions;
pub use ids::DetailSetId;
pub use logging::{LogFormat, LoggingError, enable_logging};
pub use mask::{
    Bridge, BridgeSlot, FixMask, FixMaskBuilder, MaskError, MaskLayer, MaskStack, RltMask,
    RltMaskBuilder,
};
pub use problem::{Choice, ConstraintSpec, DisplaySpec, Fragment, Problem, ProblemError};
pub use program::{
    ConstraintClass, ConstraintSnapshot, DisplaySnapshot, LayerSnapshot, Program,
    ProgramConstraint, ProgramError, ProgramSnapshot, classify,
};
pub use translate::{Lowered, TranslateError, Translator};

//! Text save/load for cached programs.
//!
//! Layout, one field group per line:
//!
//! ```text
//! <decision hash>
//! v<code version>
//! <n_var>
//! <detail set count>
//! <size> <member>...              (per set)
//! <constraint count>
//! <lb> <ub> <set id | -1> <0|1>   (per constraint, followed by its tree,
//! <node tag | -1> ...              -1 for a relaxed row)
//! <display count>
//! <node>...                       (per display)
//! ```

use std::collections::BTreeSet;
use std::fmt::Write;

use quorum_expr::{Node, Tokens};

use crate::config::CompileOptions;
use crate::ids::DetailSetId;
use crate::mask::{FixMask, MaskStack};
use crate::problem::Problem;

use super::classify::classify;
use super::error::ProgramError;
use super::{Program, ProgramConstraint};

/// Tag written in place of the tree of a relaxed constraint, and in place of
/// a missing detail set id.
const ABSENT: i64 = -1;

impl<'p> Program<'p> {
    /// Serialize the program. Only a program over a single fixing mask and
    /// without exclusion rows can be saved.
    pub fn save(&self, hash: &str, version: &str) -> Result<String, ProgramError> {
        if self.stack.simple_fix().is_none() {
            return Err(ProgramError::NotSimple { operation: "save" });
        }
        if self.exclusions_added {
            return Err(ProgramError::ExclusionsPresent { operation: "save" });
        }

        let mut out = String::new();
        let _ = writeln!(out, "{hash}");
        let _ = writeln!(out, "v{version}");
        let _ = writeln!(out, "{}", self.n_var());

        let _ = writeln!(out, "{}", self.detail_sets.len());
        for set in &self.detail_sets {
            let _ = write!(out, "{}", set.len());
            for name in set {
                let _ = write!(out, " {name}");
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{}", self.constraints.len());
        for constraint in &self.constraints {
            let set_id = constraint
                .detail_set
                .map_or(ABSENT, |id| i64::from(id.inner()));
            let _ = writeln!(
                out,
                "{} {} {} {}",
                constraint.lower,
                constraint.upper,
                set_id,
                u8::from(constraint.relaxable)
            );
            match &constraint.expr {
                Some(expr) => expr.save(&mut out)?,
                None => {
                    let _ = writeln!(out, "{ABSENT}");
                }
            }
        }

        let _ = writeln!(out, "{}", self.displays.len());
        for display in &self.displays {
            display.save(&mut out)?;
        }

        tracing::debug!(
            component = "program",
            operation = "save",
            status = "success",
            constraints = self.constraints.len(),
            displays = self.displays.len(),
            bytes = out.len(),
            "Saved program"
        );
        Ok(out)
    }

    /// Rebuild a program saved by [`Program::save`]. `mask` must produce the
    /// saved variable count. A hash or version mismatch is reported as a
    /// stale cache, see [`ProgramError::is_stale_cache`].
    pub fn load(
        problem: &'p Problem,
        mask: FixMask,
        text: &str,
        hash: &str,
        version: &str,
        options: CompileOptions,
    ) -> Result<Self, ProgramError> {
        let mut header = text.splitn(3, '\n');
        let found_hash = header.next().unwrap_or_default().trim_end_matches('\r');
        let found_version = header.next().unwrap_or_default().trim_end_matches('\r');
        let body = header.next().unwrap_or_default();

        let expected_version = format!("v{version}");
        let stale = if found_hash != hash {
            Some(ProgramError::StaleHash {
                expected: hash.to_string(),
                found: found_hash.to_string(),
            })
        } else if found_version != expected_version {
            Some(ProgramError::StaleVersion {
                expected: expected_version,
                found: found_version.to_string(),
            })
        } else {
            None
        };
        if let Some(err) = stale {
            tracing::warn!(
                component = "program",
                operation = "load",
                status = "stale",
                error_code = err.code(),
                "Cached program is stale"
            );
            return Err(err);
        }

        if mask.n_var_orig() != problem.dim() {
            return Err(ProgramError::DimensionMismatch {
                expected: problem.dim(),
                found: mask.n_var_orig(),
            });
        }

        let mut tokens = Tokens::new(body);
        let n_var = tokens.next_usize("variable count")?;
        if n_var != mask.n_var() {
            return Err(ProgramError::DimensionMismatch {
                expected: n_var,
                found: mask.n_var(),
            });
        }

        let set_count = tokens.next_usize("detail set count")?;
        let mut detail_sets = Vec::with_capacity(set_count);
        for _ in 0..set_count {
            let size = tokens.next_usize("detail set size")?;
            let mut set = BTreeSet::new();
            for _ in 0..size {
                set.insert(tokens.next_token("detail name")?.to_string());
            }
            detail_sets.push(set);
        }

        let constraint_count = tokens.next_usize("constraint count")?;
        let mut constraints = Vec::with_capacity(constraint_count);
        for _ in 0..constraint_count {
            let lower = tokens.next_f64("constraint lower bound")?;
            let upper = tokens.next_f64("constraint upper bound")?;
            let set_id = tokens.next_i64("detail set id")?;
            let relaxable = tokens.next_flag("relaxable flag")?;
            let tag = tokens.next_i64("node type tag")?;
            let expr = if tag == ABSENT {
                None
            } else {
                Some(Node::load_with_tag(tag, &mut tokens, n_var)?)
            };
            constraints.push(ProgramConstraint {
                lower,
                upper,
                class: classify(expr.as_ref(), &mask),
                detail_set: u32::try_from(set_id).ok().map(DetailSetId::new),
                relaxable,
                expr,
            });
        }

        let display_count = tokens.next_usize("display count")?;
        let mut displays = Vec::with_capacity(display_count);
        for _ in 0..display_count {
            displays.push(Node::load(&mut tokens, n_var)?);
        }
        if !tokens.is_empty() {
            return Err(ProgramError::TrailingData);
        }

        tracing::debug!(
            component = "program",
            operation = "load",
            status = "success",
            constraints = constraints.len(),
            displays = displays.len(),
            n_var,
            "Loaded program"
        );

        Ok(Self {
            problem,
            stack: MaskStack::new(mask),
            constraints,
            displays,
            detail_sets,
            bridge: None,
            exclusions_added: false,
            options,
        })
    }
}

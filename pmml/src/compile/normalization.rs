//! Normalization stages
//!
//! Two `LinearNorm` layouts are recognized:
//!
//! ```text
//! AnchorScaled  orig0 = 0,    orig1 = dmin, norm0 = -dmax/dmin, norm1 = 0
//!               n = -(x - orig1) / (orig1 * norm0)
//! MinMax        orig0 = dmin, orig1 = dmax, norm0 = -1,         norm1 = 1
//!               n = (x - orig0) / (0.5 * (orig1 - orig0)) - 1
//! ```
//!
//! The layout of a whole variable set is taken from its first variable;
//! the other variables are only checked for consistency and reported.

use crate::function::{Expr, FunctionStage};
use crate::network::NormDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormShape {
    AnchorScaled,
    MinMax,
}

impl NormShape {
    /// Shape of one descriptor, `None` when it matches neither layout
    pub fn classify(d: &NormDescriptor) -> Option<Self> {
        if d.orig0 == 0.0 && d.norm1 == 0.0 {
            Some(NormShape::AnchorScaled)
        } else if d.norm0 == -1.0 && d.norm1 == 1.0 {
            Some(NormShape::MinMax)
        } else {
            None
        }
    }

    /// Shape used to compile a variable set, decided by its first variable
    pub fn for_set(descriptors: &[NormDescriptor]) -> Option<Self> {
        descriptors.first().map(|first| {
            if first.norm1 == 0.0 {
                NormShape::AnchorScaled
            } else {
                NormShape::MinMax
            }
        })
    }
}

/// Which end of the network a descriptor set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationSide {
    Inputs,
    Outputs,
}

impl fmt::Display for NormalizationSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationSide::Inputs => write!(f, "inputs"),
            NormalizationSide::Outputs => write!(f, "outputs"),
        }
    }
}

/// Check that every descriptor of a set has one recognized shape
///
/// Stops at the first descriptor that is unrecognized or disagrees with the
/// shape established so far, logging a warning. Returns the shape shared by
/// the whole set when the check passes.
pub fn diagnose_shapes(descriptors: &[NormDescriptor], side: NormalizationSide) -> Option<NormShape> {
    let mut established: Option<NormShape> = None;
    for (index, d) in descriptors.iter().enumerate() {
        let Some(current) = NormShape::classify(d) else {
            tracing::warn!(
                %side,
                variable = index,
                "unknown method for {} normalization, results may be wrong",
                side
            );
            return None;
        };
        if established.is_some_and(|shape| shape != current) {
            tracing::warn!(
                %side,
                variable = index,
                "mixed methods for {} normalization, results may be wrong",
                side
            );
            return None;
        }
        established = Some(current);
    }
    established
}

/// Stage mapping raw inputs to the network's normalized domain
pub fn input_stage(descriptors: &[NormDescriptor], input_names: Vec<String>) -> FunctionStage {
    let outputs = match NormShape::for_set(descriptors) {
        Some(NormShape::AnchorScaled) => descriptors
            .iter()
            .enumerate()
            .map(|(k, d)| {
                Expr::neg(Expr::div(
                    Expr::sub(Expr::var(k), Expr::constant(d.orig1)),
                    Expr::constant(d.orig1 * d.norm0),
                ))
            })
            .collect(),
        Some(NormShape::MinMax) => descriptors
            .iter()
            .enumerate()
            .map(|(k, d)| {
                Expr::sub(
                    Expr::div(
                        Expr::sub(Expr::var(k), Expr::constant(d.orig0)),
                        Expr::constant(0.5 * (d.orig1 - d.orig0)),
                    ),
                    Expr::constant(1.0),
                )
            })
            .collect(),
        None => Vec::new(),
    };
    FunctionStage::new(input_names, outputs)
}

/// Stage mapping normalized network outputs back to raw values
pub fn output_stage(descriptors: &[NormDescriptor]) -> FunctionStage {
    let outputs = match NormShape::for_set(descriptors) {
        Some(NormShape::AnchorScaled) => descriptors
            .iter()
            .enumerate()
            .map(|(k, d)| {
                Expr::add(
                    Expr::mul(Expr::var(k), Expr::constant(-(d.orig1 * d.norm0))),
                    Expr::constant(d.orig1),
                )
            })
            .collect(),
        Some(NormShape::MinMax) => descriptors
            .iter()
            .enumerate()
            .map(|(k, d)| {
                Expr::add(
                    Expr::constant(d.orig0),
                    Expr::mul(
                        Expr::constant(0.5 * (d.orig1 - d.orig0)),
                        Expr::add(Expr::var(k), Expr::constant(1.0)),
                    ),
                )
            })
            .collect(),
        None => Vec::new(),
    };
    FunctionStage::positional(descriptors.len(), outputs)
}

//! Function stages and their composition

use super::expr::Expr;
use crate::error::{PmmlError, Result};
use serde::{Deserialize, Serialize};

/// One vector-to-vector step: an expression per output over named inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStage {
    input_names: Vec<String>,
    outputs: Vec<Expr>,
}

impl FunctionStage {
    pub fn new(input_names: Vec<String>, outputs: Vec<Expr>) -> Self {
        Self {
            input_names,
            outputs,
        }
    }

    /// Stage over anonymous inputs `x0..x{n-1}`
    pub fn positional(input_dimension: usize, outputs: Vec<Expr>) -> Self {
        Self::new(
            (0..input_dimension).map(|k| format!("x{}", k)).collect(),
            outputs,
        )
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn outputs(&self) -> &[Expr] {
        &self.outputs
    }

    pub fn input_dimension(&self) -> usize {
        self.input_names.len()
    }

    pub fn output_dimension(&self) -> usize {
        self.outputs.len()
    }

    /// A stage without outputs is a no-op in a composition
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn evaluate(&self, inputs: &[f64]) -> Vec<f64> {
        self.outputs.iter().map(|e| e.eval(inputs)).collect()
    }

    /// Every output expression rendered over the stage's input names
    pub fn formulas(&self) -> Vec<String> {
        self.outputs
            .iter()
            .map(|e| e.render(&self.input_names))
            .collect()
    }
}

/// A chain of stages; stage k's outputs feed stage k+1's inputs by position
///
/// Built once and immutable afterwards, so it can be shared across threads
/// and evaluated concurrently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposedFunction {
    stages: Vec<FunctionStage>,
}

impl ComposedFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stage(stage: FunctionStage) -> Self {
        Self::new().then(stage)
    }

    /// Append `stage`; stages without outputs are skipped
    pub fn then(mut self, stage: FunctionStage) -> Self {
        if !stage.is_empty() {
            self.stages.push(stage);
        }
        self
    }

    pub fn stages(&self) -> &[FunctionStage] {
        &self.stages
    }

    /// Names of the first stage's inputs
    pub fn input_names(&self) -> &[String] {
        self.stages
            .first()
            .map(|s| s.input_names())
            .unwrap_or(&[])
    }

    /// Expected input length, `None` for the identity (no stages)
    pub fn input_dimension(&self) -> Option<usize> {
        self.stages.first().map(FunctionStage::input_dimension)
    }

    pub fn output_dimension(&self) -> Option<usize> {
        self.stages.last().map(FunctionStage::output_dimension)
    }

    /// Evaluate the chain on one point
    pub fn evaluate(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if let Some(expected) = self.input_dimension() {
            if inputs.len() != expected {
                return Err(PmmlError::InvalidArgument(format!(
                    "expected {} inputs, got {}",
                    expected,
                    inputs.len()
                )));
            }
        }
        let mut values = inputs.to_vec();
        for stage in &self.stages {
            values = stage.evaluate(&values);
        }
        Ok(values)
    }

    /// Evaluate the chain on every point of a sample
    pub fn evaluate_many<P: AsRef<[f64]>>(&self, points: &[P]) -> Result<Vec<Vec<f64>>> {
        points.iter().map(|p| self.evaluate(p.as_ref())).collect()
    }
}

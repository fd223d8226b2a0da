//! Owned linear regression models

use crate::config::PmmlConfig;
use crate::error::{PmmlError, Result};
use crate::function::{ComposedFunction, Expr, FunctionStage};
use crate::xml::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `output = intercept + sum_i coefficients[i] * inputs[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    coefficients: Vec<f64>,
    input_names: Vec<String>,
    output_name: String,
}

impl LinearModel {
    /// Build a model, naming unnamed variables
    ///
    /// Empty input names become `x{i}` and an empty output name becomes
    /// `output`. `input_names` may be empty altogether; otherwise it must
    /// have one entry per coefficient.
    pub fn new(
        name: impl Into<String>,
        intercept: f64,
        coefficients: Vec<f64>,
        input_names: Vec<String>,
        output_name: impl Into<String>,
    ) -> Result<Self> {
        if !input_names.is_empty() && input_names.len() != coefficients.len() {
            return Err(PmmlError::InvalidArgument(format!(
                "{} input names given for {} coefficients",
                input_names.len(),
                coefficients.len()
            )));
        }
        let input_names = (0..coefficients.len())
            .map(|i| match input_names.get(i) {
                Some(name) if !name.is_empty() => name.clone(),
                _ => format!("x{}", i),
            })
            .collect();
        let output_name = output_name.into();
        let output_name = if output_name.is_empty() {
            "output".to_string()
        } else {
            output_name
        };
        Ok(Self {
            name: name.into(),
            intercept,
            coefficients,
            input_names,
            output_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    pub fn evaluate(&self, inputs: &[f64]) -> Result<f64> {
        if inputs.len() != self.dimension() {
            return Err(PmmlError::InvalidArgument(format!(
                "expected {} inputs, got {}",
                self.dimension(),
                inputs.len()
            )));
        }
        Ok(self
            .coefficients
            .iter()
            .zip(inputs)
            .fold(self.intercept, |acc, (c, x)| acc + c * x))
    }

    /// The model as a one-stage function over its input names
    pub fn to_function(&self) -> ComposedFunction {
        let affine = self
            .coefficients
            .iter()
            .enumerate()
            .fold(Expr::constant(self.intercept), |acc, (i, &c)| {
                Expr::add(acc, Expr::mul(Expr::constant(c), Expr::var(i)))
            });
        ComposedFunction::from_stage(FunctionStage::new(self.input_names.clone(), vec![affine]))
    }
}

/// A validated regression model read from, or destined to, a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    linear: LinearModel,
}

impl RegressionModel {
    pub fn new(linear: LinearModel) -> Self {
        Self { linear }
    }

    /// Read the regression model named `name` (the first one when empty)
    pub fn from_document(doc: &Document, name: &str) -> Result<Self> {
        let model = doc.regression_model(name)?;
        Ok(Self::new(model.to_linear_model()?))
    }

    pub fn from_file(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let doc = Document::from_file(path)?;
        Self::from_document(&doc, name)
    }

    pub fn linear(&self) -> &LinearModel {
        &self.linear
    }

    pub fn name(&self) -> &str {
        self.linear.name()
    }

    pub fn to_function(&self) -> ComposedFunction {
        self.linear.to_function()
    }

    /// A fresh document holding this model only
    pub fn to_document(&self, config: PmmlConfig) -> Document {
        let mut doc = Document::with_config(config);
        if self.linear.name().is_empty() {
            let mut named = self.linear.clone();
            named.name = "Unnamed".to_string();
            doc.add_regression_model(&named);
        } else {
            doc.add_regression_model(&self.linear);
        }
        doc
    }

    /// Write this model alone into a new document at `path`
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_document(PmmlConfig::default()).write_file(path)?;
        tracing::debug!(model = self.name(), path = %path.display(), "regression model exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let model = LinearModel::new(
            "m",
            0.0,
            vec![1.0, 2.0, 3.0],
            vec!["a".to_string(), String::new(), "c".to_string()],
            "",
        )
        .unwrap();
        assert_eq!(model.input_names(), ["a", "x1", "c"]);
        assert_eq!(model.output_name(), "output");

        let anonymous = LinearModel::new("m", 0.0, vec![1.0, 2.0], Vec::new(), "y").unwrap();
        assert_eq!(anonymous.input_names(), ["x0", "x1"]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = LinearModel::new("m", 0.0, vec![1.0], vec!["a".into(), "b".into()], "y");
        assert!(matches!(err, Err(PmmlError::InvalidArgument(_))));
    }

    #[test]
    fn test_function_matches_direct_evaluation() {
        let model = LinearModel::new("m", 0.5, vec![2.0, -1.0], Vec::new(), "y").unwrap();
        let f = model.to_function();
        assert_eq!(f.evaluate(&[3.0, 4.0]).unwrap(), vec![2.5]);
        assert_eq!(model.evaluate(&[3.0, 4.0]).unwrap(), 2.5);
        assert!(model.evaluate(&[1.0]).is_err());
        assert_eq!(f.stages()[0].formulas(), vec!["0.5 + 2.0 * x0 + (-1.0) * x1"]);
    }

    #[test]
    fn test_unnamed_model_exported_as_unnamed() {
        let model = RegressionModel::new(
            LinearModel::new("", 1.0, vec![2.0], Vec::new(), "y").unwrap(),
        );
        let doc = model.to_document(PmmlConfig::default());
        assert_eq!(doc.regression_model_names(), vec!["Unnamed"]);
    }
}

//! Read access to a `RegressionModel` element
//!
//! Only plain linear regressions are accepted: a single `RegressionTable`
//! made of `NumericPredictor`s with exponent 1. Every accessor validates the
//! model first; the outcome of a successful validation is cached on the
//! reference.

use super::model::LinearModel;
use crate::error::{Result, ValidationError};
use crate::model::ModelRef;
use crate::xml::query::{parse_index, parse_real};
use crate::xml::{Document, NodeId};
use std::cell::Cell;

/// Borrowed view of one `RegressionModel` element
#[derive(Debug, Clone)]
pub struct RegressionModelRef<'doc> {
    model: ModelRef<'doc>,
    validated: Cell<bool>,
}

impl<'doc> RegressionModelRef<'doc> {
    pub(crate) fn new(model: ModelRef<'doc>) -> Self {
        Self {
            model,
            validated: Cell::new(false),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn document(&self) -> &'doc Document {
        self.model.document()
    }

    pub fn node(&self) -> NodeId {
        self.model.node()
    }

    /// Check that the element describes a supported linear regression
    ///
    /// Of `modelType`, `functionName` and `normalizationMethod`, only the
    /// first one present (in attribute order) is checked.
    pub fn check_valid(&self) -> Result<()> {
        if self.validated.get() {
            return Ok(());
        }
        let doc = self.document();
        let node = self.node();

        if let Some(element) = doc.element(node) {
            for (name, value) in element.attributes() {
                let rejected = match name {
                    "modelType" => (value != "linearRegression")
                        .then(|| ValidationError::UnsupportedModelType(value.to_string())),
                    "functionName" => (value != "regression")
                        .then(|| ValidationError::UnsupportedFunctionName(value.to_string())),
                    "normalizationMethod" => (value != "none")
                        .then(|| ValidationError::UnsupportedNormalization(value.to_string())),
                    _ => continue,
                };
                if let Some(err) = rejected {
                    return Err(err.into());
                }
                break;
            }
        }

        let tables = doc.select_elements(node, "RegressionTable")?;
        let table = match tables.as_slice() {
            [] => return Err(ValidationError::MissingRegressionTable.into()),
            [table] => *table,
            more => return Err(ValidationError::MultipleRegressionTables(more.len()).into()),
        };
        for child in doc.child_elements(table) {
            if !doc.has_tag(child, "NumericPredictor") {
                let name = doc
                    .element(child)
                    .map(|el| el.local_name().to_string())
                    .unwrap_or_default();
                return Err(ValidationError::UnsupportedPredictor(name).into());
            }
        }

        let exponents = doc.select_values(node, "RegressionTable/NumericPredictor/@exponent")?;
        if exponents.is_empty() {
            return Err(ValidationError::MissingExponents.into());
        }
        if let Some(bad) = exponents.iter().find(|e| parse_index(e) != 1) {
            return Err(ValidationError::UnsupportedExponent(bad.clone()).into());
        }

        self.validated.set(true);
        tracing::trace!(model = self.model_name(), "regression model validated");
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.check_valid().is_ok()
    }

    /// `intercept` of the regression table, 0 when absent or not numeric
    pub fn intercept(&self) -> Result<f64> {
        self.check_valid()?;
        let intercept = self
            .document()
            .query_scalar(self.node(), "RegressionTable/@intercept")?;
        Ok(if intercept.is_nan() { 0.0 } else { intercept })
    }

    /// `targetFieldName` of the model, empty when absent
    pub fn target_variable_name(&self) -> Result<String> {
        self.check_valid()?;
        self.document().query_string(self.node(), "@targetFieldName")
    }

    /// `(name, coefficient)` of every predictor in document order
    pub fn coefficients(&self) -> Result<Vec<(String, f64)>> {
        self.check_valid()?;
        let doc = self.document();
        let predictors = doc.select_elements(self.node(), "RegressionTable/NumericPredictor")?;
        Ok(predictors
            .into_iter()
            .map(|p| {
                let name = doc.get_attribute(p, "name").unwrap_or_default().to_string();
                let coefficient = doc.get_attribute(p, "coefficient").map(parse_real).unwrap_or(0.0);
                (name, coefficient)
            })
            .collect())
    }

    /// Owned copy of the model
    pub fn to_linear_model(&self) -> Result<LinearModel> {
        let (names, coefficients): (Vec<String>, Vec<f64>) =
            self.coefficients()?.into_iter().unzip();
        LinearModel::new(
            self.model_name(),
            self.intercept()?,
            coefficients,
            names,
            self.target_variable_name()?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PmmlError;

    fn model_doc(attributes: &str, table: &str) -> Document {
        Document::parse(&format!(
            r#"<PMML xmlns="http://www.dmg.org/PMML-3_0" version="3.0">
  <RegressionModel modelName="m" {attributes} targetFieldName="y">
    {table}
  </RegressionModel>
</PMML>"#
        ))
        .unwrap()
    }

    const TABLE: &str = r#"<RegressionTable intercept="1.5">
      <NumericPredictor name="a" exponent="1" coefficient="2"/>
      <NumericPredictor name="b" exponent="1" coefficient="-0.5"/>
    </RegressionTable>"#;

    fn validation_error(doc: &Document) -> ValidationError {
        match doc.regression_model("m").unwrap().check_valid() {
            Err(PmmlError::Validation(err)) => err,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_linear_model() {
        let doc = model_doc(r#"functionName="regression""#, TABLE);
        let model = doc.regression_model("m").unwrap();
        assert!(model.is_valid());
        assert_eq!(model.intercept().unwrap(), 1.5);
        assert_eq!(model.target_variable_name().unwrap(), "y");
        assert_eq!(
            model.coefficients().unwrap(),
            vec![("a".to_string(), 2.0), ("b".to_string(), -0.5)]
        );
    }

    #[test]
    fn test_rejects_exponent_two() {
        let doc = model_doc(
            r#"functionName="regression""#,
            r#"<RegressionTable intercept="0">
      <NumericPredictor name="a" exponent="1" coefficient="2"/>
      <NumericPredictor name="b" exponent="2" coefficient="3"/>
    </RegressionTable>"#,
        );
        assert_eq!(
            validation_error(&doc),
            ValidationError::UnsupportedExponent("2".to_string())
        );
        assert!(doc.regression_model("m").unwrap().intercept().is_err());
    }

    #[test]
    fn test_rejects_wrong_function_name() {
        let doc = model_doc(r#"functionName="classification""#, TABLE);
        assert_eq!(
            validation_error(&doc),
            ValidationError::UnsupportedFunctionName("classification".to_string())
        );
    }

    #[test]
    fn test_only_first_kind_attribute_is_checked() {
        // functionName comes first and passes, normalizationMethod is not looked at
        let doc = model_doc(
            r#"functionName="regression" normalizationMethod="softmax""#,
            TABLE,
        );
        assert!(doc.regression_model("m").unwrap().is_valid());

        let doc = model_doc(
            r#"normalizationMethod="softmax" functionName="regression""#,
            TABLE,
        );
        assert_eq!(
            validation_error(&doc),
            ValidationError::UnsupportedNormalization("softmax".to_string())
        );
    }

    #[test]
    fn test_table_structure_errors() {
        let doc = model_doc("", "");
        assert_eq!(validation_error(&doc), ValidationError::MissingRegressionTable);

        let doc = model_doc("", &format!("{TABLE}{TABLE}"));
        assert_eq!(
            validation_error(&doc),
            ValidationError::MultipleRegressionTables(2)
        );

        let doc = model_doc(
            "",
            r#"<RegressionTable intercept="0">
      <NumericPredictor name="a" exponent="1" coefficient="2"/>
      <CategoricalPredictor name="c" value="x" coefficient="1"/>
    </RegressionTable>"#,
        );
        assert_eq!(
            validation_error(&doc),
            ValidationError::UnsupportedPredictor("CategoricalPredictor".to_string())
        );

        let doc = model_doc(
            "",
            r#"<RegressionTable intercept="0"><NumericPredictor name="a" coefficient="2"/></RegressionTable>"#,
        );
        assert_eq!(validation_error(&doc), ValidationError::MissingExponents);
    }

    #[test]
    fn test_to_linear_model() {
        let doc = model_doc(r#"functionName="regression""#, TABLE);
        let linear = doc.regression_model("").unwrap().to_linear_model().unwrap();
        assert_eq!(linear.name(), "m");
        assert_eq!(linear.input_names(), ["a", "b"]);
        assert_eq!(linear.output_name(), "y");
        assert_eq!(linear.evaluate(&[1.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_missing_intercept_reads_as_zero() {
        let doc = model_doc(
            r#"functionName="regression""#,
            r#"<RegressionTable><NumericPredictor name="a" exponent="1" coefficient="3"/></RegressionTable>"#,
        );
        let model = doc.regression_model("m").unwrap();
        assert_eq!(model.intercept().unwrap(), 0.0);
        let linear = model.to_linear_model().unwrap();
        assert_eq!(linear.evaluate(&[2.0]).unwrap(), 6.0);

        let doc = model_doc(
            r#"functionName="regression""#,
            r#"<RegressionTable intercept="n/a"><NumericPredictor name="a" exponent="1" coefficient="3"/></RegressionTable>"#,
        );
        assert_eq!(doc.regression_model("m").unwrap().intercept().unwrap(), 0.0);
    }
}

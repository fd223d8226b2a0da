//! Document scaffolding and model export
//!
//! Layout produced for a fresh document:
//!
//! ```text
//! PMML
//! ├── Header (copyright, description)
//! │   └── Application (name, version)
//! ├── DataDictionary (numberOfFields)
//! │   └── DataField × (inputs + 1)
//! └── RegressionModel (modelName, functionName, algorithmName, targetFieldName)
//!     ├── MiningSchema
//!     │   └── MiningField × (inputs + 1)
//!     └── RegressionTable (intercept)
//!         └── NumericPredictor × inputs
//! ```

use super::query::parse_index;
use super::{Document, NodeId};
use crate::regression::LinearModel;

/// Shortest text that reads back as the same `f64`
fn format_real(value: f64) -> String {
    format!("{:?}", value)
}

impl Document {
    /// First top-level element with local name `tag`
    fn top_level(&self, tag: &str) -> Option<NodeId> {
        self.child_elements(self.root())
            .find(|&child| self.has_tag(child, tag))
    }

    /// New element with `attributes`, appended to `parent`
    fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(id, name, *value);
        }
        self.append_child(parent, id);
        id
    }

    /// Ensure the document has a `Header`, returning it
    ///
    /// A new header goes before the first top-level element.
    pub fn add_header(&mut self) -> NodeId {
        if let Some(header) = self.top_level("Header") {
            return header;
        }

        let root = self.root();
        let header = self.create_element("Header");
        self.set_attribute(header, "copyright", self.config.copyright.clone());
        self.set_attribute(header, "description", self.config.description.clone());
        let index = self
            .child_elements(root)
            .next()
            .and_then(|first| self.child_index(root, first))
            .unwrap_or(self.children(root).len());
        self.insert_child(root, index, header);

        let application = [
            ("name", self.config.application_name.clone()),
            ("version", self.config.application_version.clone()),
        ];
        let application: Vec<(&str, &str)> = application
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        self.append_element(header, "Application", &application);

        tracing::trace!("header added");
        header
    }

    /// Locate the `DataDictionary`, creating it when missing
    ///
    /// A new dictionary is placed after the `Header` (or after a
    /// `MiningBuildTask` that precedes any other element), before the first
    /// other element otherwise. An existing dictionary has its
    /// `numberOfFields` increased by `fields`, when it declares one.
    fn data_dictionary(&mut self, fields: usize) -> NodeId {
        let root = self.root();
        if let Some(dictionary) = self.top_level("DataDictionary") {
            if let Some(declared) = self.get_attribute(dictionary, "numberOfFields") {
                let total = parse_index(declared) + fields;
                self.set_attribute(dictionary, "numberOfFields", total.to_string());
            }
            return dictionary;
        }

        let mut anchor: Option<NodeId> = None;
        let mut before: Option<NodeId> = None;
        for child in self.child_elements(root) {
            if anchor.is_none() && self.has_tag(child, "Header") {
                anchor = Some(child);
            } else if self.has_tag(child, "MiningBuildTask") {
                anchor = Some(child);
                break;
            } else {
                if anchor.is_none() {
                    before = Some(child);
                }
                break;
            }
        }
        let index = match (anchor, before) {
            (Some(after), _) => self.child_index(root, after).map(|i| i + 1),
            (None, Some(before)) => self.child_index(root, before),
            (None, None) => None,
        }
        .unwrap_or(self.children(root).len());

        let dictionary = self.create_element("DataDictionary");
        self.set_attribute(dictionary, "numberOfFields", fields.to_string());
        self.insert_child(root, index, dictionary);
        dictionary
    }

    /// Append `model` as a `RegressionModel`, declaring its fields
    ///
    /// Fields are added to the dictionary even when already declared, so
    /// exporting twice duplicates `DataField` entries and counts them twice.
    pub fn add_regression_model(&mut self, model: &LinearModel) -> NodeId {
        self.add_header();
        let fields = 1 + model.dimension();
        let dictionary = self.data_dictionary(fields);

        let root = self.root();
        let regression = self.append_element(
            root,
            "RegressionModel",
            &[
                ("modelName", model.name()),
                ("functionName", "regression"),
                ("algorithmName", "linearRegression"),
                ("targetFieldName", model.output_name()),
            ],
        );

        let schema = self.append_element(regression, "MiningSchema", &[]);
        for name in model.input_names() {
            self.append_element(schema, "MiningField", &[("name", name.as_str())]);
        }
        self.append_element(
            schema,
            "MiningField",
            &[("name", model.output_name()), ("usageType", "predicted")],
        );

        let intercept = format_real(model.intercept());
        let table = self.append_element(
            regression,
            "RegressionTable",
            &[("intercept", intercept.as_str())],
        );
        for (name, &coefficient) in model.input_names().iter().zip(model.coefficients()) {
            let coefficient = format_real(coefficient);
            self.append_element(
                table,
                "NumericPredictor",
                &[
                    ("name", name.as_str()),
                    ("exponent", "1"),
                    ("coefficient", coefficient.as_str()),
                ],
            );
        }

        for name in model.input_names() {
            self.append_element(
                dictionary,
                "DataField",
                &[("name", name.as_str()), ("optype", "continuous")],
            );
        }
        self.append_element(
            dictionary,
            "DataField",
            &[("name", model.output_name()), ("optype", "continuous")],
        );

        tracing::debug!(
            model = model.name(),
            inputs = model.dimension(),
            fields,
            "regression model added"
        );
        regression
    }
}

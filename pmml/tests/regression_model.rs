use pmml_models::{
    Document, LinearModel, PmmlError, RegressionModel, ValidationError,
};

const LINEAR_REGRESSION: &str = include_str!("../../docs/examples/linear_regression.pmml");

fn relative_error(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        a.abs()
    } else {
        ((a - b) / b).abs()
    }
}

#[test]
fn test_read_clearance_model() {
    let doc = Document::parse(LINEAR_REGRESSION).expect("fixture should parse");
    assert_eq!(doc.number_of_regression_models(), 2);
    assert_eq!(doc.regression_model_names(), vec!["clearance", "quadratic"]);

    let model = doc.regression_model("clearance").unwrap();
    assert_eq!(model.intercept().unwrap(), 3.25);
    assert_eq!(model.target_variable_name().unwrap(), "clearance");
    assert_eq!(
        model.coefficients().unwrap(),
        vec![
            ("age".to_string(), -0.0425),
            ("weight".to_string(), 0.118),
            ("dose".to_string(), 1.5e-3),
        ]
    );

    let owned = RegressionModel::from_document(&doc, "").unwrap();
    let f = owned.to_function();
    let y = f.evaluate(&[40.0, 70.0, 200.0]).unwrap()[0];
    assert!((y - (3.25 - 0.0425 * 40.0 + 0.118 * 70.0 + 1.5e-3 * 200.0)).abs() < 1e-12);
}

#[test]
fn test_quadratic_model_rejected() {
    let doc = Document::parse(LINEAR_REGRESSION).unwrap();
    let model = doc.regression_model("quadratic").unwrap();
    assert!(!model.is_valid());
    match model.coefficients() {
        Err(PmmlError::Validation(ValidationError::UnsupportedExponent(e))) => assert_eq!(e, "2"),
        other => panic!("expected an exponent error, got {:?}", other),
    }
    assert!(RegressionModel::from_document(&doc, "quadratic").is_err());
}

#[test]
fn test_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exported.pmml");

    let coefficients = vec![0.1, -1.0 / 3.0, 2.718281828459045e-7, 12345.678901234567];
    let linear = LinearModel::new(
        "fit",
        std::f64::consts::PI,
        coefficients.clone(),
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        "response",
    )
    .unwrap();
    RegressionModel::new(linear).export_to_file(&path).unwrap();

    let doc = Document::from_file(&path).unwrap();
    let model = doc.regression_model("fit").unwrap();
    assert!(relative_error(model.intercept().unwrap(), std::f64::consts::PI) <= 1e-15);
    assert_eq!(model.target_variable_name().unwrap(), "response");

    let read: Vec<(String, f64)> = model.coefficients().unwrap();
    assert_eq!(read.len(), coefficients.len());
    for ((name, value), (expected_name, expected)) in
        read.iter().zip(["a", "b", "c", "d"].iter().zip(&coefficients))
    {
        assert_eq!(name, expected_name);
        assert!(relative_error(*value, *expected) <= 1e-15);
    }
}

#[test]
fn test_export_then_read_with_default_names() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("unnamed.pmml");

    let linear = LinearModel::new("", -2.5, vec![1.0, 4.0], Vec::new(), "")?;
    RegressionModel::new(linear).export_to_file(&path)?;

    let back = RegressionModel::from_file(&path, "Unnamed")?;
    assert_eq!(back.linear().input_names(), ["x0", "x1"]);
    assert_eq!(back.linear().output_name(), "output");
    assert_eq!(back.linear().evaluate(&[1.0, 1.0])?, 2.5);
    Ok(())
}

#[test]
fn test_added_model_next_to_existing_ones() {
    let mut doc = Document::parse(LINEAR_REGRESSION).unwrap();
    let linear = LinearModel::new("extra", 1.0, vec![2.0], vec!["age".into()], "z").unwrap();
    doc.add_regression_model(&linear);

    // Existing dictionary grows, fields are not deduplicated
    let root = doc.root();
    assert_eq!(
        doc.query_unsigned(root, "DataDictionary/@numberOfFields").unwrap(),
        9
    );
    assert_eq!(
        doc.count_matches(root, "DataDictionary/DataField[@name='age']").unwrap(),
        2
    );
    assert_eq!(doc.count_matches(root, "Header").unwrap(), 1);

    let xml = doc.to_xml_string().unwrap();
    let reread = Document::parse(&xml).unwrap();
    assert_eq!(
        reread.regression_model_names(),
        vec!["clearance", "quadratic", "extra"]
    );
    assert_eq!(reread.regression_model("extra").unwrap().intercept().unwrap(), 1.0);
}

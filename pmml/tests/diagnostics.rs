use pmml_models::{Document, NeuralNetwork};
use std::io;
use std::sync::{Arc, Mutex};

const ANN_POUTRE: &str = include_str!("../../docs/examples/ann_poutre.pmml");

const IRREGULAR: &str = r#"<PMML xmlns="http://www.dmg.org/PMML-3_0" version="3.0">
  <NeuralNetwork modelName="mixed" numberOfLayers="1" activationFunction="identity">
    <NeuralInputs numberOfInputs="2">
      <NeuralInput id="0"><DerivedField><NormContinuous field="a">
        <LinearNorm orig="0" norm="-1"/><LinearNorm orig="10" norm="1"/>
      </NormContinuous></DerivedField></NeuralInput>
      <NeuralInput id="1"><DerivedField><NormContinuous field="b">
        <LinearNorm orig="0" norm="-4"/><LinearNorm orig="2" norm="0"/>
      </NormContinuous></DerivedField></NeuralInput>
    </NeuralInputs>
    <NeuralLayer numberOfNeurons="1">
      <Neuron id="2" bias="0"><Con from="0" weight="1"/><Con from="1" weight="1"/></Neuron>
    </NeuralLayer>
  </NeuralNetwork>
  <NeuralNetwork modelName="skewed" numberOfLayers="1">
    <NeuralInputs numberOfInputs="1">
      <NeuralInput id="0"><DerivedField><NormContinuous field="x">
        <LinearNorm orig="-1" norm="-1"/><LinearNorm orig="1" norm="1"/>
      </NormContinuous></DerivedField></NeuralInput>
    </NeuralInputs>
    <NeuralLayer numberOfNeurons="1" activationFunction="softplus">
      <Neuron id="1" bias="0"><Con from="0" weight="1"/></Neuron>
    </NeuralLayer>
    <NeuralOutputs numberOfOutputs="1">
      <NeuralOutput outputNeuron="1"><DerivedField><NormContinuous field="y">
        <LinearNorm orig="1" norm="0"/><LinearNorm orig="2" norm="0.5"/>
      </NormContinuous></DerivedField></NeuralOutput>
    </NeuralOutputs>
  </NeuralNetwork>
</PMML>"#;

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records every event on this thread
fn with_captured_log<T>(f: impl FnOnce() -> T) -> (T, String) {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&log.0.lock().expect("log buffer poisoned")).into_owned();
    (result, text)
}

#[test]
fn test_mixed_input_shapes_are_reported() {
    let doc = Document::parse(IRREGULAR).expect("document should parse");
    let (net, log) = with_captured_log(|| NeuralNetwork::from_document(&doc, "mixed"));

    // The warning does not abort compilation
    let net = net.expect("network should still compile");
    assert_eq!(net.input_names(), ["a", "b"]);
    assert!(log.contains("WARN"), "log was: {}", log);
    assert!(log.contains("mixed methods for inputs normalization"), "log was: {}", log);
    assert!(log.contains("variable=1"), "log was: {}", log);
}

#[test]
fn test_unknown_output_shape_and_activation_are_reported() {
    let doc = Document::parse(IRREGULAR).expect("document should parse");
    let (net, log) = with_captured_log(|| NeuralNetwork::from_document(&doc, "skewed"));

    assert!(net.is_ok());
    assert!(
        log.contains("unknown method for outputs normalization"),
        "log was: {}",
        log
    );
    assert!(log.contains("ERROR"), "log was: {}", log);
    assert!(log.contains("unsupported activation function"), "log was: {}", log);
    assert!(log.contains("softplus"), "log was: {}", log);
}

#[test]
fn test_consistent_network_logs_no_warning() {
    let doc = Document::parse(ANN_POUTRE).expect("fixture should parse");
    let (net, log) = with_captured_log(|| NeuralNetwork::from_document(&doc, "ANNPoutre"));

    assert!(net.is_ok());
    assert!(!log.contains("WARN"), "log was: {}", log);
    assert!(!log.contains("ERROR"), "log was: {}", log);
    assert!(log.contains("neural network assembled"), "log was: {}", log);
}

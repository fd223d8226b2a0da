//! Relative path queries over a [`Document`]
//!
//! Patterns are slash-separated steps evaluated from a context element:
//!
//! ```text
//! NeuralLayer[2]/Neuron[@id='4']/Con/@weight
//! NeuralInputs/NeuralInput/DerivedField/NormContinuous/LinearNorm/@orig
//! ./RegressionTable/NumericPredictor
//! NeuralInputs/NeuralInput[@id=2]/*/*/@field
//! Note/text()
//! ```
//!
//! Each step names a child element (or `*`) and may carry predicates:
//! `[@attr='value']`, `[@attr="value"]`, `[@attr=value]` or a 1-based
//! position `[n]`, applied left to right per parent. A trailing `@attr` or
//! `text()` selects values instead of elements. Tag names are matched by
//! local name within the document's default namespace, so callers never
//! spell prefixes.

use super::{Document, NodeId};
use crate::error::{PmmlError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, map, map_res, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

// =============================================================================
// Query AST
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TagTest {
    Any,
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Attribute { name: String, value: String },
    Position(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    tag: TagTest,
    predicates: Vec<Predicate>,
}

/// What a query yields once the element steps are resolved
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Elements,
    Attribute(String),
    Text,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    SelfStep,
    Step(Step),
    Attribute(String),
    Text,
}

/// A parsed query pattern
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPath {
    steps: Vec<Step>,
    target: Target,
}

impl QueryPath {
    /// Parse a pattern string
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| PmmlError::InvalidQuery {
            pattern: pattern.to_string(),
            reason,
        };

        let (_, segments) = all_consuming(path)(pattern.trim())
            .map_err(|e| invalid(format!("syntax error: {:?}", e)))?;

        let mut steps = Vec::new();
        let mut target = Target::Elements;
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.into_iter().enumerate() {
            match segment {
                Segment::SelfStep => {}
                Segment::Step(step) if target == Target::Elements => steps.push(step),
                Segment::Step(_) => {
                    return Err(invalid("element step after a value selector".to_string()))
                }
                Segment::Attribute(_) | Segment::Text if i != last => {
                    return Err(invalid(
                        "@attribute and text() must be the last step".to_string(),
                    ))
                }
                Segment::Attribute(name) => target = Target::Attribute(name),
                Segment::Text => target = Target::Text,
            }
        }
        Ok(Self { steps, target })
    }
}

// =============================================================================
// Pattern grammar
// =============================================================================

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))(input)
}

fn literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        take_while1(is_name_char),
    ))(input)
}

fn attribute_predicate(input: &str) -> IResult<&str, Predicate> {
    map(
        tuple((char('@'), name, char('='), literal)),
        |(_, name, _, value)| Predicate::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        },
    )(input)
}

fn position_predicate(input: &str) -> IResult<&str, Predicate> {
    map(map_res(digit1, str::parse::<usize>), Predicate::Position)(input)
}

fn predicate(input: &str) -> IResult<&str, Predicate> {
    delimited(
        char('['),
        alt((attribute_predicate, position_predicate)),
        char(']'),
    )(input)
}

fn step(input: &str) -> IResult<&str, Segment> {
    let (input, tag_test) = alt((
        map(char('*'), |_| TagTest::Any),
        map(name, |n: &str| TagTest::Named(n.to_string())),
    ))(input)?;
    let (input, predicates) = many0(predicate)(input)?;
    Ok((
        input,
        Segment::Step(Step {
            tag: tag_test,
            predicates,
        }),
    ))
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(tag("text()"), |_| Segment::Text),
        map(preceded(char('@'), name), |n: &str| {
            Segment::Attribute(n.to_string())
        }),
        map(char('.'), |_| Segment::SelfStep),
        step,
    ))(input)
}

fn path(input: &str) -> IResult<&str, Vec<Segment>> {
    separated_list1(char('/'), segment)(input)
}

// =============================================================================
// Evaluation
// =============================================================================

impl Document {
    fn evaluate_steps(&self, context: NodeId, query: &QueryPath) -> Vec<NodeId> {
        let mut current = vec![context];
        for step in &query.steps {
            let mut next = Vec::new();
            for &node in &current {
                let mut matched: Vec<NodeId> = self
                    .child_elements(node)
                    .filter(|&child| match &step.tag {
                        TagTest::Any => true,
                        TagTest::Named(tag) => self.has_tag(child, tag),
                    })
                    .collect();
                for predicate in &step.predicates {
                    matched = match predicate {
                        Predicate::Attribute { name, value } => matched
                            .into_iter()
                            .filter(|&c| self.get_attribute(c, name) == Some(value.as_str()))
                            .collect(),
                        Predicate::Position(pos) => matched
                            .get(pos.wrapping_sub(1))
                            .copied()
                            .into_iter()
                            .collect(),
                    };
                }
                next.extend(matched);
            }
            current = next;
        }
        current
    }

    fn evaluate_values(&self, context: NodeId, query: &QueryPath) -> Vec<String> {
        let elements = self.evaluate_steps(context, query);
        match &query.target {
            Target::Elements => elements.iter().map(|&e| self.text_content(e)).collect(),
            Target::Attribute(name) => elements
                .iter()
                .filter_map(|&e| self.get_attribute(e, name))
                .map(str::to_string)
                .collect(),
            Target::Text => elements
                .iter()
                .flat_map(|&e| self.children(e).iter().filter_map(|&c| self.text(c)))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Elements reached by `pattern` from `context`, in document order
    ///
    /// With a trailing `@attr` only elements carrying that attribute are
    /// kept; with `text()` only elements with direct character data.
    pub fn select_elements(&self, context: NodeId, pattern: &str) -> Result<Vec<NodeId>> {
        let query = QueryPath::parse(pattern)?;
        let elements = self.evaluate_steps(context, &query);
        Ok(match &query.target {
            Target::Elements => elements,
            Target::Attribute(name) => elements
                .into_iter()
                .filter(|&e| self.get_attribute(e, name).is_some())
                .collect(),
            Target::Text => elements
                .into_iter()
                .filter(|&e| self.children(e).iter().any(|&c| self.text(c).is_some()))
                .collect(),
        })
    }

    /// String values selected by `pattern` (attribute values, text, or the
    /// text content of selected elements)
    pub fn select_values(&self, context: NodeId, pattern: &str) -> Result<Vec<String>> {
        let query = QueryPath::parse(pattern)?;
        Ok(self.evaluate_values(context, &query))
    }

    /// Number of nodes selected by `pattern`
    pub fn count_matches(&self, context: NodeId, pattern: &str) -> Result<usize> {
        let query = QueryPath::parse(pattern)?;
        Ok(match query.target {
            Target::Elements => self.evaluate_steps(context, &query).len(),
            _ => self.evaluate_values(context, &query).len(),
        })
    }

    /// First selected value as a number, NaN when nothing matches or the
    /// value is not numeric
    pub fn query_scalar(&self, context: NodeId, pattern: &str) -> Result<f64> {
        let query = QueryPath::parse(pattern)?;
        Ok(self
            .evaluate_values(context, &query)
            .first()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN))
    }

    /// First selected value as a non-negative integer; NaN, negative and
    /// missing values read as 0
    ///
    /// A fractional value, or one too large to index memory, is an
    /// `InvalidArgument` error.
    pub fn query_unsigned(&self, context: NodeId, pattern: &str) -> Result<usize> {
        let value = self.query_scalar(context, pattern)?;
        if !value.is_finite() || value <= 0.0 {
            return Ok(0);
        }
        if value.fract() != 0.0 || value >= isize::MAX as f64 {
            return Err(PmmlError::InvalidArgument(format!(
                "'{}' selects {}, which is not a usable count",
                pattern, value
            )));
        }
        Ok(value as usize)
    }

    /// First selected value, empty when nothing matches
    pub fn query_string(&self, context: NodeId, pattern: &str) -> Result<String> {
        let query = QueryPath::parse(pattern)?;
        Ok(self
            .evaluate_values(context, &query)
            .into_iter()
            .next()
            .unwrap_or_default())
    }
}

// =============================================================================
// Lenient numeric conversion
// =============================================================================

/// Leading-integer conversion: `"12abc"` is 12, anything unparsable is 0
pub(crate) fn parse_index(value: &str) -> usize {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Longest numeric prefix of `value`, 0 when there is none
pub(crate) fn parse_real(value: &str) -> f64 {
    let value = value.trim();
    if let Ok(v) = value.parse::<f64>() {
        return v;
    }
    match numeric_prefix_len(value) {
        0 => 0.0,
        end => value[..end].parse().unwrap_or(0.0),
    }
}

/// Byte length of the leading `[sign] digits [. digits] [e [sign] digits]`
/// run, 0 when no mantissa digit is present
fn numeric_prefix_len(value: &str) -> usize {
    let bytes = value.as_bytes();
    let digits_from = |start: usize| {
        bytes[start.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer = digits_from(end);
    end += integer;
    let mut mantissa = integer;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits_from(end + 1);
        mantissa += fraction;
        if mantissa > 0 {
            end += 1 + fraction;
        }
    }
    if mantissa == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    end
}

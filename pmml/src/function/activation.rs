//! Neuron activation functions

use super::expr::{Expr, MathFn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activation applied to a neuron's weighted sum `z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    Tanh,
    Logistic,
    Exponential,
    Reciprocal,
    Square,
    Gauss,
    Sine,
    Cosine,
    Elliott,
    Arctan,
}

impl Activation {
    pub const ALL: [Activation; 11] = [
        Activation::Identity,
        Activation::Tanh,
        Activation::Logistic,
        Activation::Exponential,
        Activation::Reciprocal,
        Activation::Square,
        Activation::Gauss,
        Activation::Sine,
        Activation::Cosine,
        Activation::Elliott,
        Activation::Arctan,
    ];

    /// `activationFunction` value as spelled in documents
    pub fn tag(&self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::Tanh => "tanh",
            Activation::Logistic => "logistic",
            Activation::Exponential => "exponential",
            Activation::Reciprocal => "reciprocal",
            Activation::Square => "square",
            Activation::Gauss => "Gauss",
            Activation::Sine => "sine",
            Activation::Cosine => "cosine",
            Activation::Elliott => "Elliott",
            Activation::Arctan => "arctan",
        }
    }

    /// Decode a tag, degrading unknown tags to [`Activation::Identity`]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            tracing::error!(
                activation = tag,
                "unsupported activation function, using identity instead"
            );
            Activation::Identity
        })
    }

    /// Wrap the weighted sum `z`
    pub fn apply(&self, z: Expr) -> Expr {
        match self {
            Activation::Identity => z,
            Activation::Tanh => Expr::call(MathFn::Tanh, z),
            Activation::Logistic => Expr::div(
                Expr::constant(1.0),
                Expr::add(
                    Expr::constant(1.0),
                    Expr::call(MathFn::Exp, Expr::neg(z)),
                ),
            ),
            Activation::Exponential => Expr::call(MathFn::Exp, z),
            Activation::Reciprocal => Expr::div(Expr::constant(1.0), z),
            Activation::Square => Expr::mul(z.clone(), z),
            Activation::Gauss => Expr::call(MathFn::Exp, Expr::neg(Expr::mul(z.clone(), z))),
            Activation::Sine => Expr::call(MathFn::Sin, z),
            Activation::Cosine => Expr::call(MathFn::Cos, z),
            Activation::Elliott => Expr::div(
                z.clone(),
                Expr::add(Expr::constant(1.0), Expr::call(MathFn::Abs, z)),
            ),
            // atan(1) = pi/4, so the output spans (-1, 1)
            Activation::Arctan => Expr::div(
                Expr::mul(Expr::constant(0.5), Expr::call(MathFn::Atan, z)),
                Expr::call(MathFn::Atan, Expr::constant(1.0)),
            ),
        }
    }
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activation::ALL
            .iter()
            .copied()
            .find(|a| a.tag() == s)
            .ok_or_else(|| format!("unknown activation function '{}'", s))
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(activation: Activation, z: f64) -> f64 {
        activation.apply(Expr::var(0)).eval(&[z])
    }

    #[test]
    fn test_activation_table() {
        let z = 0.7_f64;
        assert_eq!(at(Activation::Identity, z), z);
        assert_eq!(at(Activation::Tanh, z), z.tanh());
        assert!((at(Activation::Logistic, z) - 1.0 / (1.0 + (-z).exp())).abs() < 1e-15);
        assert_eq!(at(Activation::Exponential, z), z.exp());
        assert_eq!(at(Activation::Reciprocal, z), 1.0 / z);
        assert_eq!(at(Activation::Square, z), z * z);
        assert_eq!(at(Activation::Gauss, z), (-(z * z)).exp());
        assert_eq!(at(Activation::Sine, z), z.sin());
        assert_eq!(at(Activation::Cosine, z), z.cos());
        assert_eq!(at(Activation::Elliott, -z), -z / (1.0 + z));
        assert!((at(Activation::Arctan, z) - 0.5 * z.atan() / 1f64.atan()).abs() < 1e-15);
    }

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for activation in Activation::ALL {
            assert_eq!(activation.tag().parse::<Activation>(), Ok(activation));
        }
        assert!("threshold".parse::<Activation>().is_err());
        // Tags are case sensitive
        assert!("gauss".parse::<Activation>().is_err());
    }

    #[test]
    fn test_unknown_tag_falls_back_to_identity() {
        assert_eq!(Activation::from_tag("radialBasis"), Activation::Identity);
        assert_eq!(Activation::from_tag("tanh"), Activation::Tanh);
    }
}

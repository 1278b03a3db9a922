use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

/// Multiplicative perturbation range applied per weight by
/// [`Layer::perturbed`]: each element is scaled by an independent uniform
/// factor in `[0.9, 1.1]`.
pub(crate) const PERTURBATION_MIN: f32 = 0.9;
pub(crate) const PERTURBATION_MAX: f32 = 1.1;

/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Identity,
}

impl Activation {
    pub(crate) fn apply(self, x: f32) -> f32 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Identity => x,
        }
    }

    /// The wire name used in model metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Identity => "identity",
        }
    }

    /// Parses a wire name; unknown names are the caller's
    /// `UnsupportedActivation` error.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "relu" => Some(Self::Relu),
            "sigmoid" => Some(Self::Sigmoid),
            "identity" => Some(Self::Identity),
            _ => None,
        }
    }
}

/// A fully-connected layer: `output = activation(weights * input + bias)`.
///
/// Weights are row-major, one row of `input_dim` values per output unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    input_dim: usize,
    output_dim: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
    activation: Activation,
}

/// A layer whose parameter vectors do not match its declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("dense layer {input_dim}x{output_dim} requires {expected} parameters, got {got}")]
pub struct LayerShapeError {
    pub input_dim: usize,
    pub output_dim: usize,
    pub expected: usize,
    pub got: usize,
}

impl DenseLayer {
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        weights: Vec<f32>,
        bias: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, LayerShapeError> {
        let expected = input_dim * output_dim + output_dim;
        let got = weights.len() + bias.len();
        if weights.len() != input_dim * output_dim || bias.len() != output_dim {
            return Err(LayerShapeError {
                input_dim,
                output_dim,
                expected,
                got,
            });
        }
        Ok(Self {
            input_dim,
            output_dim,
            weights,
            bias,
            activation,
        })
    }

    /// He-style random initialization: weights from `N(0, sqrt(2/input))`,
    /// zero bias.
    pub fn random<R>(rng: &mut R, input_dim: usize, output_dim: usize, activation: Activation) -> Self
    where
        R: Rng + ?Sized,
    {
        #[expect(clippy::cast_precision_loss)]
        let std_dev = (2.0 / input_dim as f32).sqrt();
        let normal = Normal::new(0.0, std_dev).unwrap();
        let weights = (0..input_dim * output_dim)
            .map(|_| normal.sample(rng))
            .collect();
        Self {
            input_dim,
            output_dim,
            weights,
            bias: vec![0.0; output_dim],
            activation,
        }
    }

    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    /// Writes `activation(W * input + b)` into `output`, reusing its
    /// allocation. `input` length must equal `input_dim`.
    pub(crate) fn forward_into(&self, input: &[f32], output: &mut Vec<f32>) {
        debug_assert_eq!(input.len(), self.input_dim);
        output.clear();
        output.reserve(self.output_dim);
        for unit in 0..self.output_dim {
            let row = &self.weights[unit * self.input_dim..(unit + 1) * self.input_dim];
            let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
            output.push(self.activation.apply(sum + self.bias[unit]));
        }
    }

    pub(crate) fn perturbed<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let scale = |rng: &mut R, values: &[f32]| {
            values
                .iter()
                .map(|v| v * rng.random_range(PERTURBATION_MIN..=PERTURBATION_MAX))
                .collect()
        };
        Self {
            input_dim: self.input_dim,
            output_dim: self.output_dim,
            weights: scale(rng, &self.weights),
            bias: scale(rng, &self.bias),
            activation: self.activation,
        }
    }
}

/// The closed set of layer kinds the crate supports.
///
/// Model artifacts name the kind explicitly; loading anything outside this
/// set is an `UnsupportedLayerKind` error rather than a silent fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Dense(DenseLayer),
}

impl Layer {
    #[must_use]
    pub fn input_dim(&self) -> usize {
        match self {
            Self::Dense(dense) => dense.input_dim(),
        }
    }

    #[must_use]
    pub fn output_dim(&self) -> usize {
        match self {
            Self::Dense(dense) => dense.output_dim(),
        }
    }

    /// Number of `f32` parameters this layer contributes to the weight blob.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        match self {
            Self::Dense(dense) => dense.weights().len() + dense.bias().len(),
        }
    }

    pub(crate) fn forward_into(&self, input: &[f32], output: &mut Vec<f32>) {
        match self {
            Self::Dense(dense) => dense.forward_into(input, output),
        }
    }

    pub(crate) fn perturbed<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Dense(dense) => Self::Dense(dense.perturbed(rng)),
        }
    }
}

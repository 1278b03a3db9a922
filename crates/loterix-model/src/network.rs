use rand::Rng;

use loterix_engine::{DRAW_SIZE, Draw, Prediction, Predictor};

use crate::{
    layer::{Activation, DenseLayer, Layer},
    normalize::{discretize, normalize},
};

/// Layer dimensions of the reference topology: a draw in, a draw out, two
/// hidden layers.
pub const REFERENCE_TOPOLOGY: [usize; 4] = [DRAW_SIZE, 128, 128, DRAW_SIZE];

/// A feed-forward network: an ordered stack of layers whose dimensions chain.
///
/// The network is an owned value with an explicit lifecycle. Nothing in the
/// crate mutates a network in place; the only derivation is [`perturbed`],
/// which builds an independent copy first.
///
/// [`perturbed`]: Network::perturbed
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

/// A layer stack that cannot form a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("a network needs at least one layer")]
    NoLayers,
    #[display("layer {index} expects {expected} inputs but the previous layer produces {got}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
}

/// A forward pass rejected before any arithmetic ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ForwardError {
    #[display("input has {got} values but the network expects {expected}")]
    InputDimension { expected: usize, got: usize },
    #[display("network produces {got} outputs but a prediction needs {expected}")]
    OutputDimension { expected: usize, got: usize },
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Result<Self, NetworkError> {
        let Some(first) = layers.first() else {
            return Err(NetworkError::NoLayers);
        };
        let mut got = first.output_dim();
        for (index, layer) in layers.iter().enumerate().skip(1) {
            if layer.input_dim() != got {
                return Err(NetworkError::DimensionMismatch {
                    index,
                    expected: layer.input_dim(),
                    got,
                });
            }
            got = layer.output_dim();
        }
        Ok(Self { layers })
    }

    /// A randomly initialized network over the given layer dimensions:
    /// relu on hidden layers, sigmoid on the output layer.
    ///
    /// # Panics
    ///
    /// Panics if `dims` has fewer than two entries.
    pub fn random<R>(rng: &mut R, dims: &[usize]) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(dims.len() >= 2, "a network needs an input and an output dim");
        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let activation = if index == dims.len() - 2 {
                    Activation::Sigmoid
                } else {
                    Activation::Relu
                };
                Layer::Dense(DenseLayer::random(rng, pair[0], pair[1], activation))
            })
            .collect();
        Self { layers }
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.layers[0].input_dim()
    }

    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].output_dim()
    }

    /// Total `f32` parameter count across all layers.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Runs one forward pass.
    ///
    /// Scratch activations live only inside this call; both buffers are
    /// dropped on every return path, error included.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, ForwardError> {
        if input.len() != self.input_dim() {
            return Err(ForwardError::InputDimension {
                expected: self.input_dim(),
                got: input.len(),
            });
        }

        let mut current = input.to_vec();
        let mut next = Vec::new();
        for layer in &self.layers {
            layer.forward_into(&current, &mut next);
            std::mem::swap(&mut current, &mut next);
        }
        Ok(current)
    }

    /// An independent copy with every weight and bias scaled by a uniform
    /// factor in `[0.9, 1.1]`. The receiver is never touched.
    #[must_use]
    pub fn perturbed<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            layers: self.layers.iter().map(|layer| layer.perturbed(rng)).collect(),
        }
    }
}

impl Predictor for Network {
    type Error = ForwardError;

    fn predict(&self, draw: &Draw) -> Result<Prediction, ForwardError> {
        let input: Vec<f32> = draw.balls.iter().map(|&ball| normalize(ball)).collect();
        let output = self.forward(&input)?;
        if output.len() != DRAW_SIZE {
            return Err(ForwardError::OutputDimension {
                expected: DRAW_SIZE,
                got: output.len(),
            });
        }

        let mut prediction: Prediction = [0; DRAW_SIZE];
        for (slot, value) in prediction.iter_mut().zip(&output) {
            *slot = discretize(*value);
        }
        Ok(prediction)
    }

    fn perturbed<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Network::perturbed(self, rng)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use loterix_engine::{BALL_MAX, BALL_MIN};

    use super::*;

    fn identity_dense(dim: usize) -> Layer {
        let mut weights = vec![0.0; dim * dim];
        for i in 0..dim {
            weights[i * dim + i] = 1.0;
        }
        Layer::Dense(
            DenseLayer::new(dim, dim, weights, vec![0.0; dim], Activation::Identity).unwrap(),
        )
    }

    fn draw_of(balls: [u8; DRAW_SIZE]) -> Draw {
        Draw {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            balls,
        }
    }

    #[test]
    fn new_rejects_an_empty_stack() {
        assert_eq!(Network::new(vec![]), Err(NetworkError::NoLayers));
    }

    #[test]
    fn new_rejects_mismatched_dimensions() {
        let layers = vec![identity_dense(3), identity_dense(4)];
        assert_eq!(
            Network::new(layers),
            Err(NetworkError::DimensionMismatch {
                index: 1,
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn forward_through_identity_layers_is_the_input() {
        let network = Network::new(vec![identity_dense(3), identity_dense(3)]).unwrap();
        let output = network.forward(&[0.25, 0.5, 0.75]).unwrap();
        assert_eq!(output, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let network = Network::new(vec![identity_dense(3)]).unwrap();
        assert_eq!(
            network.forward(&[1.0]),
            Err(ForwardError::InputDimension {
                expected: 3,
                got: 1
            })
        );
    }

    #[test]
    fn random_network_chains_the_requested_dims() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let network = Network::random(&mut rng, &REFERENCE_TOPOLOGY);
        assert_eq!(network.input_dim(), DRAW_SIZE);
        assert_eq!(network.output_dim(), DRAW_SIZE);
        assert_eq!(network.layers().len(), 3);
        assert_eq!(
            network.parameter_count(),
            15 * 128 + 128 + 128 * 128 + 128 + 128 * 15 + 15
        );
    }

    #[test]
    fn predictions_stay_in_the_ball_domain() {
        let mut rng = Pcg64Mcg::seed_from_u64(4);
        let network = Network::random(&mut rng, &REFERENCE_TOPOLOGY);
        let draw = draw_of([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

        let prediction = network.predict(&draw).unwrap();
        assert_eq!(prediction.len(), DRAW_SIZE);
        assert!(
            prediction
                .iter()
                .all(|ball| (BALL_MIN..=BALL_MAX).contains(ball))
        );
    }

    #[test]
    fn prediction_is_deterministic() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let network = Network::random(&mut rng, &[DRAW_SIZE, 8, DRAW_SIZE]);
        let draw = draw_of([3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]);

        assert_eq!(network.predict(&draw).unwrap(), network.predict(&draw).unwrap());
    }

    #[test]
    fn wrong_output_dimension_is_reported() {
        // 15 in, 10 out: forward succeeds but a prediction cannot be built
        let mut rng = Pcg64Mcg::seed_from_u64(6);
        let network = Network::random(&mut rng, &[DRAW_SIZE, 10]);
        let draw = draw_of([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

        assert_eq!(
            network.predict(&draw),
            Err(ForwardError::OutputDimension {
                expected: DRAW_SIZE,
                got: 10
            })
        );
    }

    #[test]
    fn perturbed_network_is_structurally_independent() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let network = Network::random(&mut rng, &[DRAW_SIZE, 4, DRAW_SIZE]);
        let snapshot = network.clone();
        let clone = Network::perturbed(&network, &mut rng);

        // the source is bit-for-bit intact
        assert_eq!(network, snapshot);
        // the clone differs but keeps the topology
        assert_ne!(clone, network);
        assert_eq!(clone.parameter_count(), network.parameter_count());
    }
}

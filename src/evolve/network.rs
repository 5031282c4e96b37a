//! Feed-forward policy network used as the evolved genome.
//!
//! Hidden layers use `tanh`, the output layer is linear; the action is the
//! argmax of the outputs. Weights are evolved, never trained by gradients.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::policy::{Policy, action_from_outputs};
use crate::game::Action;

/// Fully connected layer, weights stored row-major as `[outputs][inputs]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl DenseLayer {
    fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        Self {
            inputs,
            outputs,
            weights: (0..inputs * outputs)
                .map(|_| rng.gen_range(-1.0..1.0))
                .collect(),
            biases: (0..outputs).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    fn forward(&self, inputs: &[f32], hidden: bool) -> Vec<f32> {
        (0..self.outputs)
            .map(|out| {
                let row = &self.weights[out * self.inputs..(out + 1) * self.inputs];
                let sum: f32 = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                let value = sum + self.biases[out];
                if hidden { value.tanh() } else { value }
            })
            .collect()
    }

    fn check_shape(&self, index: usize) -> Result<(), String> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err(format!(
                "layer {index} is {}x{}, both sides need at least one unit",
                self.inputs, self.outputs
            ));
        }
        if self.weights.len() != self.inputs * self.outputs {
            return Err(format!(
                "layer {index} holds {} weights, expected {}",
                self.weights.len(),
                self.inputs * self.outputs
            ));
        }
        if self.biases.len() != self.outputs {
            return Err(format!(
                "layer {index} holds {} biases, expected {}",
                self.biases.len(),
                self.outputs
            ));
        }
        Ok(())
    }

    fn same_shape(&self, other: &DenseLayer) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs
    }
}

/// Evolvable multi-layer perceptron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    layers: Vec<DenseLayer>,
}

impl FeedForwardNetwork {
    /// Randomly initialized network with the given layer widths, input first
    ///
    /// `layer_sizes` needs at least an input and an output width.
    pub fn random<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| DenseLayer::random(pair[0], pair[1], rng))
            .collect();
        Self { layers }
    }

    /// Layer widths, input first
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.layers.first().map(|l| l.inputs).into_iter().collect();
        sizes.extend(self.layers.iter().map(|l| l.outputs));
        sizes
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.inputs).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.outputs).unwrap_or(0)
    }

    /// Total number of weights and biases
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Check that the layers form a well-shaped network ending in one output per action
    ///
    /// Networks built by [`FeedForwardNetwork::random`] always pass; the check
    /// matters for networks deserialized from disk.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        for (index, layer) in self.layers.iter().enumerate() {
            layer.check_shape(index)?;
        }

        if let Some((index, pair)) = self
            .layers
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[0].outputs != pair[1].inputs)
        {
            return Err(format!(
                "layer {index} emits {} values but layer {} takes {}",
                pair[0].outputs,
                index + 1,
                pair[1].inputs
            ));
        }

        if self.output_size() != Action::COUNT {
            return Err(format!(
                "network emits {} outputs, expected one per action ({})",
                self.output_size(),
                Action::COUNT
            ));
        }

        Ok(())
    }

    /// Run the network; missing inputs count as zero
    pub fn forward(&self, inputs: &[f32]) -> Vec<f32> {
        let last = self.layers.len().saturating_sub(1);
        let mut activations = inputs.to_vec();
        for (idx, layer) in self.layers.iter().enumerate() {
            activations = layer.forward(&activations, idx < last);
        }
        activations
    }

    /// Perturb each parameter with probability `rate` by N(0, scale)
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f32, scale: f32) {
        let sigma = scale.max(1e-5);
        let rate = f64::from(rate.clamp(0.0, 1.0));
        for layer in &mut self.layers {
            for param in layer.weights.iter_mut().chain(layer.biases.iter_mut()) {
                if rng.gen_bool(rate) {
                    *param += gaussian(rng) * sigma;
                }
            }
        }
    }

    /// Child taking each neuron's incoming weights and bias from either parent
    ///
    /// Returns `None` when the parents have different shapes.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &FeedForwardNetwork, rng: &mut R) -> Option<Self> {
        if self.layers.len() != other.layers.len()
            || self.layers.iter().zip(&other.layers).any(|(a, b)| !a.same_shape(b))
        {
            return None;
        }

        let mut child = self.clone();
        for (child_layer, other_layer) in child.layers.iter_mut().zip(&other.layers) {
            let inputs = child_layer.inputs;
            for out in 0..child_layer.outputs {
                if rng.gen_bool(0.5) {
                    continue;
                }
                let row = out * inputs..(out + 1) * inputs;
                child_layer.weights[row.clone()].copy_from_slice(&other_layer.weights[row]);
                child_layer.biases[out] = other_layer.biases[out];
            }
        }
        Some(child)
    }
}

impl Policy for FeedForwardNetwork {
    fn choose_action(&mut self, observation: &[f32]) -> Action {
        action_from_outputs(&self.forward(observation))
    }
}

/// Standard normal sample via Box-Muller
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    let u1: f32 = rng.gen_range(f32::MIN_POSITIVE..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (TWO_PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_network_structure() {
        let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
        let net = FeedForwardNetwork::random(&[50, 16, 3], &mut rng);

        assert_eq!(net.layer_sizes(), vec![50, 16, 3]);
        assert_eq!(net.input_size(), 50);
        assert_eq!(net.output_size(), 3);
        assert_eq!(net.parameter_count(), 50 * 16 + 16 + 16 * 3 + 3);
    }

    #[test]
    fn test_forward_outputs() {
        let mut rng = StdRng::seed_from_u64(123);
        let net = FeedForwardNetwork::random(&[4, 5, 3], &mut rng);

        let outputs = net.forward(&[1.0, 0.0, 0.5, -1.0]);
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|v| v.is_finite()));

        // Deterministic for the same weights
        assert_eq!(outputs, net.forward(&[1.0, 0.0, 0.5, -1.0]));
    }

    #[test]
    fn test_forward_known_weights() {
        // Single linear layer: out0 = x0 + x1, out1 = -x0, out2 = bias 0.5
        let net = FeedForwardNetwork {
            layers: vec![DenseLayer {
                inputs: 2,
                outputs: 3,
                weights: vec![1.0, 1.0, -1.0, 0.0, 0.0, 0.0],
                biases: vec![0.0, 0.0, 0.5],
            }],
        };

        assert_eq!(net.forward(&[1.0, 2.0]), vec![3.0, -1.0, 0.5]);
        let mut policy = net.clone();
        assert_eq!(policy.choose_action(&[1.0, 2.0]), Action::Forward);
        assert_eq!(policy.choose_action(&[-1.0, 0.0]), Action::TurnLeft);
        assert_eq!(policy.choose_action(&[0.0, 0.0]), Action::TurnRight);
    }

    #[test]
    fn test_mutate_changes_parameters() {
        let mut rng = StdRng::seed_from_u64(456);
        let original = FeedForwardNetwork::random(&[10, 8, 3], &mut rng);

        let mut mutated = original.clone();
        mutated.mutate(&mut rng, 1.0, 0.5);
        assert_ne!(mutated, original);

        let mut untouched = original.clone();
        untouched.mutate(&mut rng, 0.0, 0.5);
        assert_eq!(untouched, original);
    }

    #[test]
    fn test_crossover_mixes_parents() {
        let mut rng = StdRng::seed_from_u64(789);
        let a = FeedForwardNetwork::random(&[6, 4, 3], &mut rng);
        let b = FeedForwardNetwork::random(&[6, 4, 3], &mut rng);

        let child = a.crossover(&b, &mut rng).unwrap();
        assert_eq!(child.layer_sizes(), a.layer_sizes());

        // Every neuron comes whole from one parent
        for ((c, pa), pb) in child.layers.iter().zip(&a.layers).zip(&b.layers) {
            for out in 0..c.outputs {
                let row = out * c.inputs..(out + 1) * c.inputs;
                let from_a = c.weights[row.clone()] == pa.weights[row.clone()]
                    && c.biases[out] == pa.biases[out];
                let from_b = c.weights[row.clone()] == pb.weights[row]
                    && c.biases[out] == pb.biases[out];
                assert!(from_a || from_b);
            }
        }
    }

    #[test]
    fn test_validate_accepts_random_networks() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(FeedForwardNetwork::random(&[50, 16, 3], &mut rng).validate(), Ok(()));
        assert_eq!(FeedForwardNetwork::random(&[9, 3], &mut rng).validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_malformed_networks() {
        let layer = |inputs, outputs, weights: usize, biases: usize| DenseLayer {
            inputs,
            outputs,
            weights: vec![0.5; weights],
            biases: vec![0.0; biases],
        };

        let truncated = FeedForwardNetwork {
            layers: vec![layer(50, 3, 1, 3)],
        };
        assert!(truncated.validate().unwrap_err().contains("weights"));

        let short_biases = FeedForwardNetwork {
            layers: vec![layer(4, 3, 12, 2)],
        };
        assert!(short_biases.validate().unwrap_err().contains("biases"));

        let unchained = FeedForwardNetwork {
            layers: vec![layer(4, 5, 20, 5), layer(6, 3, 18, 3)],
        };
        assert!(unchained.validate().unwrap_err().contains("takes"));

        let wrong_outputs = FeedForwardNetwork {
            layers: vec![layer(4, 2, 8, 2)],
        };
        assert!(wrong_outputs.validate().unwrap_err().contains("outputs"));

        let empty = FeedForwardNetwork { layers: Vec::new() };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_crossover_rejects_mismatched_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = FeedForwardNetwork::random(&[6, 4, 3], &mut rng);
        let b = FeedForwardNetwork::random(&[6, 5, 3], &mut rng);
        assert!(a.crossover(&b, &mut rng).is_none());
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fully connected layer with sigmoid activation.
///
/// `weights` is row-major `[outputs][inputs]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
}

impl DenseLayer {
    /// Layer with weights and biases drawn uniformly from `[-0.2, 0.2)`.
    pub fn random(inputs: usize, outputs: usize, rng: &mut impl Rng) -> Self {
        let weights = (0..inputs * outputs).map(|_| random_weight(&mut *rng)).collect();
        let biases = (0..outputs).map(|_| random_weight(&mut *rng)).collect();
        Self {
            inputs,
            outputs,
            weights,
            biases,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.inputs == 0 || self.outputs == 0 {
            return Err("layer has zero width".to_string());
        }
        if self.weights.len() != self.inputs * self.outputs {
            return Err(format!(
                "weights length {} does not match {}x{}",
                self.weights.len(),
                self.outputs,
                self.inputs
            ));
        }
        if self.biases.len() != self.outputs {
            return Err(format!(
                "biases length {} does not match {} outputs",
                self.biases.len(),
                self.outputs
            ));
        }
        if self.weights.iter().chain(&self.biases).any(|v| !v.is_finite()) {
            return Err("layer contains non-finite parameters".to_string());
        }
        Ok(())
    }

    fn has_consistent_shape(&self, input_len: usize) -> bool {
        self.inputs == input_len
            && self.weights.len() == self.inputs * self.outputs
            && self.biases.len() == self.outputs
    }

    /// Write `sigmoid(W * input + b)` into `out`.
    pub fn forward_into(&self, input: &[f32], out: &mut [f32]) {
        for (o, slot) in out.iter_mut().enumerate().take(self.outputs) {
            let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
            let sum = row
                .iter()
                .zip(input)
                .fold(self.biases[o], |acc, (w, x)| acc + w * x);
            *slot = sigmoid(sum);
        }
    }
}

/// Feed-forward sigmoid network stored as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpNetwork {
    pub layers: Vec<DenseLayer>,
}

impl MlpNetwork {
    /// Randomly initialized network; `sizes` lists input, hidden and output widths.
    pub fn random(sizes: &[usize], rng: &mut impl Rng) -> Self {
        let layers = sizes
            .windows(2)
            .map(|pair| DenseLayer::random(pair[0], pair[1], &mut *rng))
            .collect();
        Self { layers }
    }

    pub fn input_len(&self) -> usize {
        self.layers.first().map(|layer| layer.inputs).unwrap_or(0)
    }

    pub fn output_len(&self) -> usize {
        self.layers.last().map(|layer| layer.outputs).unwrap_or(0)
    }

    /// Widths of every layer, input first.
    pub fn topology(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.input_len());
        sizes.extend(self.layers.iter().map(|layer| layer.outputs));
        sizes
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".to_string());
        }
        for (idx, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|err| format!("layer {idx}: {err}"))?;
        }
        for (idx, pair) in self.layers.windows(2).enumerate() {
            if pair[0].outputs != pair[1].inputs {
                return Err(format!(
                    "layer {} outputs {} but layer {} expects {}",
                    idx,
                    pair[0].outputs,
                    idx + 1,
                    pair[1].inputs
                ));
            }
        }
        Ok(())
    }

    /// Evaluate the network on one input. Returns an empty vector on a size mismatch.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        if self.layers.is_empty() || input.len() != self.input_len() {
            return Vec::new();
        }
        let mut current = input.to_vec();
        for layer in &self.layers {
            if !layer.has_consistent_shape(current.len()) {
                return Vec::new();
            }
            let mut next = vec![0.0f32; layer.outputs];
            layer.forward_into(&current, &mut next);
            current = next;
        }
        current
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn random_weight(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>() * 0.4 - 0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn forward_output_matches_topology() {
        let mut rng = StdRng::seed_from_u64(7);
        let net = MlpNetwork::random(&[6, 4, 3, 2], &mut rng);
        net.validate().unwrap();
        assert_eq!(net.topology(), vec![6, 4, 3, 2]);
        let out = net.forward(&[0.1; 6]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn wrong_input_length_yields_empty_output() {
        let mut rng = StdRng::seed_from_u64(7);
        let net = MlpNetwork::random(&[6, 2], &mut rng);
        assert!(net.forward(&[0.0; 5]).is_empty());
    }

    #[test]
    fn malformed_layers_yield_empty_output() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut short = MlpNetwork::random(&[6, 4, 2], &mut rng);
        short.layers[0].weights.truncate(10);
        assert!(short.forward(&[0.1; 6]).is_empty());

        let mut broken_chain = MlpNetwork::random(&[6, 4, 2], &mut rng);
        broken_chain.layers[1] = DenseLayer::random(5, 2, &mut rng);
        assert!(broken_chain.forward(&[0.1; 6]).is_empty());
    }

    #[test]
    fn validate_catches_broken_chain() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = MlpNetwork::random(&[4, 3, 2], &mut rng);
        net.layers[1] = DenseLayer::random(5, 2, &mut rng);
        assert!(net.validate().is_err());
    }

    #[test]
    fn sigmoid_is_centered() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert!(sigmoid(40.0) <= 1.0);
        assert!(sigmoid(-40.0) >= 0.0);
    }
}

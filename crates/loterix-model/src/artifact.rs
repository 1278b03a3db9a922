//! Two-file model persistence: a JSON structural description next to a raw
//! little-endian `f32` weight blob. Both halves must be present to load; the
//! structure is validated against the blob before a network is built.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    layer::{Activation, DenseLayer, Layer},
    network::{Network, NetworkError},
};

const DENSE_KIND: &str = "dense";

/// The `.model.json` half of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_score: i64,
    pub layers: Vec<LayerSpec>,
}

/// Structural description of one layer.
///
/// `kind` and `activation` are free-form strings on the wire so that an
/// artifact written by a newer build fails with a named unsupported kind
/// instead of a serde error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: String,
    pub input_dim: usize,
    pub output_dim: usize,
    pub activation: String,
}

/// The on-disk location of an artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub metadata: PathBuf,
    pub weights: PathBuf,
}

impl ArtifactPaths {
    /// Derives both file names from a common stem:
    /// `models/aggro` → `models/aggro.model.json` + `models/aggro.weights.bin`.
    #[must_use]
    pub fn from_stem(stem: &Path) -> Self {
        Self {
            metadata: PathBuf::from(format!("{}.model.json", stem.display())),
            weights: PathBuf::from(format!("{}.weights.bin", stem.display())),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelLoadError {
    #[display("model metadata file not found: {}", path.display())]
    MissingMetadata { path: PathBuf },
    #[display("model weights file not found: {}", path.display())]
    MissingWeights { path: PathBuf },
    #[display("failed to read model metadata: {source}")]
    MetadataIo { source: io::Error },
    #[display("failed to parse model metadata: {source}")]
    MetadataJson { source: serde_json::Error },
    #[display("failed to read model weights: {source}")]
    WeightsIo { source: io::Error },
    #[display("unsupported layer kind {kind:?}")]
    UnsupportedLayerKind { kind: String },
    #[display("unsupported activation {value:?}")]
    UnsupportedActivation { value: String },
    #[display("weight blob length {len} is not a whole number of f32 values")]
    MalformedWeights { len: usize },
    #[display("weight blob holds {got} values but the layer specs require {expected}")]
    WeightCountMismatch { expected: usize, got: usize },
    #[display("layer specs do not form a network: {source}")]
    Structure { source: NetworkError },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelSaveError {
    #[display("failed to write model artifact: {source}")]
    Io { source: io::Error },
    #[display("failed to serialize model metadata: {source}")]
    Json { source: serde_json::Error },
}

/// Writes the artifact pair for `network`, stamping `trained_at` with the
/// current time.
pub fn save_model(
    network: &Network,
    name: &str,
    final_score: i64,
    paths: &ArtifactPaths,
) -> Result<ModelMetadata, ModelSaveError> {
    let metadata = ModelMetadata {
        name: name.to_owned(),
        trained_at: Utc::now(),
        final_score,
        layers: layer_specs(network),
    };

    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|source| ModelSaveError::Json { source })?;
    fs::write(&paths.metadata, json).map_err(|source| ModelSaveError::Io { source })?;
    fs::write(&paths.weights, encode_weights(network))
        .map_err(|source| ModelSaveError::Io { source })?;
    Ok(metadata)
}

/// Loads the artifact pair.
///
/// Both files are checked up front so a half-copied artifact is rejected
/// naming the missing file; the weight blob is validated against the specs
/// before any layer is constructed.
pub fn load_model(paths: &ArtifactPaths) -> Result<(Network, ModelMetadata), ModelLoadError> {
    if !paths.metadata.exists() {
        return Err(ModelLoadError::MissingMetadata {
            path: paths.metadata.clone(),
        });
    }
    if !paths.weights.exists() {
        return Err(ModelLoadError::MissingWeights {
            path: paths.weights.clone(),
        });
    }

    let json = fs::read_to_string(&paths.metadata)
        .map_err(|source| ModelLoadError::MetadataIo { source })?;
    let metadata: ModelMetadata =
        serde_json::from_str(&json).map_err(|source| ModelLoadError::MetadataJson { source })?;

    let blob = fs::read(&paths.weights).map_err(|source| ModelLoadError::WeightsIo { source })?;
    let values = decode_weights(&blob)?;

    let network = network_from_parts(&metadata.layers, &values)?;
    Ok((network, metadata))
}

/// The structural description of every layer, in order.
#[must_use]
pub fn layer_specs(network: &Network) -> Vec<LayerSpec> {
    network
        .layers()
        .iter()
        .map(|layer| match layer {
            Layer::Dense(dense) => LayerSpec {
                kind: DENSE_KIND.to_owned(),
                input_dim: dense.input_dim(),
                output_dim: dense.output_dim(),
                activation: dense.activation().as_str().to_owned(),
            },
        })
        .collect()
}

/// Serializes all parameters as little-endian `f32`s, per layer: weights
/// (row-major) then biases.
#[must_use]
pub fn encode_weights(network: &Network) -> Vec<u8> {
    let mut blob = Vec::with_capacity(network.parameter_count() * 4);
    for layer in network.layers() {
        match layer {
            Layer::Dense(dense) => {
                for value in dense.weights().iter().chain(dense.bias()) {
                    blob.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
    }
    blob
}

/// Inverse of [`encode_weights`]'s framing.
pub fn decode_weights(blob: &[u8]) -> Result<Vec<f32>, ModelLoadError> {
    if blob.len() % 4 != 0 {
        return Err(ModelLoadError::MalformedWeights { len: blob.len() });
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

/// Rebuilds a network from layer specs plus the flat parameter vector.
pub fn network_from_parts(
    specs: &[LayerSpec],
    values: &[f32],
) -> Result<Network, ModelLoadError> {
    let expected: usize = specs
        .iter()
        .map(|spec| spec.input_dim * spec.output_dim + spec.output_dim)
        .sum();
    if values.len() != expected {
        return Err(ModelLoadError::WeightCountMismatch {
            expected,
            got: values.len(),
        });
    }

    let mut layers = Vec::with_capacity(specs.len());
    let mut offset = 0;
    for spec in specs {
        if spec.kind != DENSE_KIND {
            return Err(ModelLoadError::UnsupportedLayerKind {
                kind: spec.kind.clone(),
            });
        }
        let activation = Activation::from_wire(&spec.activation).ok_or_else(|| {
            ModelLoadError::UnsupportedActivation {
                value: spec.activation.clone(),
            }
        })?;

        let weight_count = spec.input_dim * spec.output_dim;
        let weights = values[offset..offset + weight_count].to_vec();
        offset += weight_count;
        let bias = values[offset..offset + spec.output_dim].to_vec();
        offset += spec.output_dim;

        let dense = DenseLayer::new(spec.input_dim, spec.output_dim, weights, bias, activation)
            .expect("slices sized from the layer description");
        layers.push(Layer::Dense(dense));
    }

    Network::new(layers).map_err(|source| ModelLoadError::Structure { source })
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use loterix_engine::DRAW_SIZE;

    use super::*;

    fn small_network(seed: u64) -> Network {
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        Network::random(&mut rng, &[DRAW_SIZE, 4, DRAW_SIZE])
    }

    fn spec(kind: &str, input_dim: usize, output_dim: usize, activation: &str) -> LayerSpec {
        LayerSpec {
            kind: kind.to_owned(),
            input_dim,
            output_dim,
            activation: activation.to_owned(),
        }
    }

    #[test]
    fn encode_decode_roundtrip_rebuilds_the_network() {
        let network = small_network(1);
        let values = decode_weights(&encode_weights(&network)).unwrap();
        let rebuilt = network_from_parts(&layer_specs(&network), &values).unwrap();
        assert_eq!(rebuilt, network);
    }

    #[test]
    fn blob_length_is_four_bytes_per_parameter() {
        let network = small_network(2);
        assert_eq!(encode_weights(&network).len(), network.parameter_count() * 4);
    }

    #[test]
    fn decode_rejects_a_torn_blob() {
        let err = decode_weights(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ModelLoadError::MalformedWeights { len: 3 }));
    }

    #[test]
    fn weight_count_mismatch_is_reported() {
        let network = small_network(3);
        let mut values = decode_weights(&encode_weights(&network)).unwrap();
        values.pop();

        let err = network_from_parts(&layer_specs(&network), &values).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::WeightCountMismatch { expected, got }
                if got + 1 == expected
        ));
    }

    #[test]
    fn unknown_layer_kind_is_an_explicit_error() {
        let specs = vec![spec("conv2d", 1, 1, "relu")];
        let err = network_from_parts(&specs, &[0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::UnsupportedLayerKind { kind } if kind == "conv2d"
        ));
    }

    #[test]
    fn unknown_activation_is_an_explicit_error() {
        let specs = vec![spec(DENSE_KIND, 1, 1, "softmax")];
        let err = network_from_parts(&specs, &[0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::UnsupportedActivation { value } if value == "softmax"
        ));
    }

    #[test]
    fn load_names_the_missing_half() {
        let stem = env::temp_dir().join(format!("loterix-missing-{}", process::id()));
        let paths = ArtifactPaths::from_stem(&stem);

        let err = load_model(&paths).unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingMetadata { path } if path == paths.metadata));
    }

    #[test]
    fn load_names_missing_weights_when_metadata_exists() {
        let stem = env::temp_dir().join(format!("loterix-halfpair-{}", process::id()));
        let paths = ArtifactPaths::from_stem(&stem);
        fs::write(&paths.metadata, "{}").unwrap();

        let err = load_model(&paths).unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingWeights { path } if path == paths.weights));

        fs::remove_file(&paths.metadata).unwrap();
    }

    #[test]
    fn save_then_load_preserves_topology_and_weights() {
        let stem = env::temp_dir().join(format!("loterix-roundtrip-{}", process::id()));
        let paths = ArtifactPaths::from_stem(&stem);
        let network = small_network(4);

        let saved = save_model(&network, "test-model", 42, &paths).unwrap();
        let (loaded, metadata) = load_model(&paths).unwrap();

        assert_eq!(loaded, network);
        assert_eq!(metadata, saved);
        assert_eq!(metadata.name, "test-model");
        assert_eq!(metadata.final_score, 42);

        fs::remove_file(&paths.metadata).unwrap();
        fs::remove_file(&paths.weights).unwrap();
    }

    #[test]
    fn artifact_paths_share_the_stem() {
        let paths = ArtifactPaths::from_stem(Path::new("models/aggro"));
        assert_eq!(paths.metadata, Path::new("models/aggro.model.json"));
        assert_eq!(paths.weights, Path::new("models/aggro.weights.bin"));
    }
}

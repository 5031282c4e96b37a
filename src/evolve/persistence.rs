//! Policy persistence for saving and loading evolved networks
//!
//! The winning network and the settings it was evolved under are written as
//! a single pretty-printed JSON document, so a saved policy can be inspected
//! by hand and reloaded without knowing its shape in advance.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::config::EvolutionConfig;
use super::evolution::Champion;
use super::network::FeedForwardNetwork;
use super::policy::Sensor;

/// Metadata saved with the policy
///
/// Carries what a player needs to feed the network the observation it was
/// evolved on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Generation the network was found in
    pub generation: usize,

    /// Fitness the network scored during evolution
    pub fitness: f64,

    /// Length of the observation vector the network expects
    pub input_size: usize,

    /// Observation encoding the network was evolved on
    pub sensor: Sensor,

    /// Board width used during evolution
    pub grid_width: usize,

    /// Board height used during evolution
    pub grid_height: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl PolicyMetadata {
    pub fn new(champion: &Champion, config: &EvolutionConfig) -> Self {
        Self {
            generation: champion.generation,
            fitness: champion.fitness,
            input_size: champion.network.input_size(),
            sensor: config.sensor,
            grid_width: config.game.grid_width,
            grid_height: config.game.grid_height,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A network together with its metadata, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPolicy {
    pub metadata: PolicyMetadata,
    pub network: FeedForwardNetwork,
}

/// Save an evolved champion to `path`
///
/// Creates parent directories if they don't exist.
pub fn save_policy(champion: &Champion, config: &EvolutionConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let saved = SavedPolicy {
        metadata: PolicyMetadata::new(champion, config),
        network: champion.network.clone(),
    };

    let json = serde_json::to_string_pretty(&saved).context("Failed to serialize policy")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write policy to {:?}", path))?;

    Ok(())
}

/// Load a saved policy
///
/// Fails when the network is malformed or when the stored input size
/// disagrees with the network itself.
pub fn load_policy(path: &Path) -> Result<SavedPolicy> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy from {:?}", path))?;
    let saved: SavedPolicy = serde_json::from_str(&json)
        .with_context(|| format!("Failed to deserialize policy from {:?}", path))?;

    saved
        .network
        .validate()
        .map_err(|reason| anyhow!(reason))
        .with_context(|| format!("Malformed policy network in {:?}", path))?;

    if saved.network.input_size() != saved.metadata.input_size {
        bail!(
            "Policy network expects {} inputs but metadata records {}",
            saved.network.input_size(),
            saved.metadata.input_size
        );
    }

    Ok(saved)
}

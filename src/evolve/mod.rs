//! Neuroevolution of snake-playing policies
//!
//! A population of small feed-forward networks is evaluated on seeded games,
//! ranked by the worst of several episodes, and bred by tournament selection,
//! crossover and Gaussian mutation.

pub mod config;
pub mod evolution;
pub mod fitness;
pub mod network;
pub mod persistence;
pub mod policy;
pub mod selection;

pub use config::{EvolutionConfig, ScoreKind};
pub use evolution::{Champion, Evolution, GenerationStats};
pub use fitness::{EpisodeOutcome, episode_seed, evaluate_genome, run_episode};
pub use network::FeedForwardNetwork;
pub use persistence::{PolicyMetadata, SavedPolicy, load_policy, save_policy};
pub use policy::{Policy, Sensor, action_from_outputs, argmax};
pub use selection::{BreedingPlan, Pairing, SelectionConfig};

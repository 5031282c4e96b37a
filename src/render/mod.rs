pub mod renderer;

pub use renderer::{PlaybackInfo, Renderer};

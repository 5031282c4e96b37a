//! Visualization mode for watching an evolved policy play
//!
//! Loads a saved policy and lets it drive the snake in the TUI. Episodes
//! restart automatically after a game over.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::path::Path;
use std::time::Duration;
use tokio::time::{Interval, interval};
use tracing::{debug, info};

use crate::error::GameError;
use crate::evolve::{FeedForwardNetwork, Policy, PolicyMetadata, load_policy};
use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, PlaybackAction};
use crate::metrics::GameMetrics;
use crate::render::{PlaybackInfo, Renderer};

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step), same as human mode
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step)
    VeryFast,
}

impl VisualizationSpeed {
    fn from_preset(preset: u8) -> Option<Self> {
        match preset {
            1 => Some(Self::Slow),
            2 => Some(Self::Normal),
            3 => Some(Self::Fast),
            4 => Some(Self::VeryFast),
            _ => None,
        }
    }

    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Visualization mode for watching evolved policies
pub struct VisualizeMode {
    network: FeedForwardNetwork,
    metadata: PolicyMetadata,
    engine: GameEngine,
    renderer: Renderer,
    input_handler: InputHandler,
    metrics: GameMetrics,
    should_quit: bool,
    paused: bool,
    speed: VisualizationSpeed,
    /// Episodes started so far, the current one included
    episode_count: usize,
}

impl VisualizeMode {
    /// Load the policy at `model_path` and prepare a game on `config`
    ///
    /// The board may differ from the one the policy was evolved on, but the
    /// observation size must match the network's input.
    pub fn new(model_path: &Path, config: GameConfig) -> Result<Self> {
        let saved = load_policy(model_path)
            .with_context(|| format!("Failed to load policy from {:?}", model_path))?;

        let expected = saved.metadata.sensor.input_size(&config);
        if expected != saved.metadata.input_size {
            bail!(
                "Policy expects {} inputs but this board produces {}",
                saved.metadata.input_size,
                expected
            );
        }

        let engine = GameEngine::new(config).context("Failed to start game")?;

        println!("{}", "=".repeat(60));
        println!("Loaded Policy Information");
        println!("{}", "=".repeat(60));
        println!("Policy path: {:?}", model_path);
        println!("Generation: {}", saved.metadata.generation + 1);
        println!("Fitness: {:.1}", saved.metadata.fitness);
        println!("Sensor: {:?}", saved.metadata.sensor);
        println!("Network layers: {:?}", saved.network.layer_sizes());
        println!(
            "Evolved on: {}x{} grid",
            saved.metadata.grid_width, saved.metadata.grid_height
        );
        println!("Version: {}", saved.metadata.version);
        println!("{}", "=".repeat(60));
        println!();
        println!("Starting visualization...");
        println!();

        Ok(Self {
            network: saved.network,
            metadata: saved.metadata,
            engine,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
            should_quit: false,
            paused: false,
            speed: VisualizationSpeed::Normal,
            episode_count: 1,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_visualization_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.tick()?;
                    }
                }

                _ = render_timer.tick() => {
                    if !self.paused && self.engine.is_alive() {
                        self.metrics.update();
                    }
                    let info = self.playback_info();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.engine.state(), &self.metrics, Some(&info));
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance the game by one step, or start the next episode after a game over
    fn tick(&mut self) -> Result<()> {
        if self.engine.is_alive() {
            self.step_agent()
        } else {
            self.reset_episode()
        }
    }

    /// Let the network pick and play one action
    fn step_agent(&mut self) -> Result<()> {
        let observation = self
            .metadata
            .sensor
            .read(&self.engine)
            .context("Failed to read observation")?;
        let action = self.network.choose_action(&observation);

        match self.engine.step(action) {
            Ok(result) if result.alive => {}
            Ok(_) | Err(GameError::BoardFull { .. }) => {
                let state = self.engine.state();
                info!(
                    episode = self.episode_count,
                    pills = state.pills_eaten,
                    fitness = state.fitness,
                    termination = ?state.termination,
                    "episode finished"
                );
                self.metrics.on_game_over(state.pills_eaten, state.fitness);
            }
            Err(err) => return Err(err).context("Game step failed"),
        }

        Ok(())
    }

    fn reset_episode(&mut self) -> Result<()> {
        self.engine.reset().context("Failed to reset episode")?;
        self.metrics.on_game_start();
        self.episode_count += 1;
        debug!(episode = self.episode_count, "episode started");
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_playback_key(key) {
                PlaybackAction::Quit => self.should_quit = true,
                PlaybackAction::TogglePause => self.paused = !self.paused,
                PlaybackAction::Reset => self.reset_episode()?,
                PlaybackAction::Speed(preset) => {
                    if let Some(speed) = VisualizationSpeed::from_preset(preset) {
                        self.change_speed(speed, tick_timer);
                    }
                }
                PlaybackAction::None => {}
            }
        }

        Ok(())
    }

    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval());
    }

    fn playback_info(&self) -> PlaybackInfo {
        PlaybackInfo {
            episode: self.episode_count,
            speed: self.speed.as_str(),
            paused: self.paused,
            generation: self.metadata.generation + 1,
            fitness: self.metadata.fitness,
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

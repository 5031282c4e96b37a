use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

use crate::error::GameError;
use crate::game::{Action, GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Applied on the next tick; the snake keeps going forward otherwise
    pending_action: Option<Action>,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self> {
        let engine = GameEngine::new(config).context("Failed to start game")?;

        Ok(Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_action: None,
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

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks at 8 Hz (125ms per tick)
        let mut tick_timer = interval(Duration::from_millis(125));

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if self.engine.is_alive() {
                        self.update_game()?;
                    }
                }

                _ = render_timer.tick() => {
                    if self.engine.is_alive() {
                        self.metrics.update();
                    }
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.engine.state(), &self.metrics, None);
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

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::GameAction(action) => {
                    self.pending_action = Some(action);
                }
                KeyAction::Restart => {
                    self.reset_game()?;
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let action = self.pending_action.take().unwrap_or(Action::Forward);

        match self.engine.step(action) {
            Ok(result) if result.alive => {
                if result.ate_pill {
                    debug!(pills = self.engine.state().pills_eaten, "pill eaten");
                }
            }
            Ok(_) | Err(GameError::BoardFull { .. }) => self.on_game_over(),
            Err(err) => return Err(err).context("Game step failed"),
        }

        Ok(())
    }

    fn on_game_over(&mut self) {
        let state = self.engine.state();
        info!(
            pills = state.pills_eaten,
            fitness = state.fitness,
            steps = state.steps,
            termination = ?state.termination,
            "game over"
        );
        self.metrics.on_game_over(state.pills_eaten, state.fitness);
    }

    fn reset_game(&mut self) -> Result<()> {
        self.engine.reset().context("Failed to restart game")?;
        self.metrics.on_game_start();
        self.pending_action = None;
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn mode() -> HumanMode {
        HumanMode::new(GameConfig::small().with_seed(9)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert!(mode.engine.is_alive());
        assert_eq!(mode.engine.state().pills_eaten, 0);
        assert!(mode.pending_action.is_none());
    }

    #[test]
    fn test_invalid_board_rejected() {
        assert!(HumanMode::new(GameConfig::new(0, 10)).is_err());
    }

    #[test]
    fn test_pending_action_is_consumed() {
        let mut mode = mode();
        let heading = mode.engine.state().snake.heading;

        mode.pending_action = Some(Action::TurnLeft);
        mode.update_game().unwrap();

        assert!(mode.pending_action.is_none());
        assert_eq!(mode.engine.state().snake.heading, heading.turned_left());

        // No input keeps the heading
        mode.update_game().unwrap();
        assert_eq!(mode.engine.state().snake.heading, heading.turned_left());
    }

    #[test]
    fn test_game_over_and_reset() {
        let mut mode = mode();

        // Heading right from the centre of a 10x10 board reaches the wall
        while mode.engine.is_alive() {
            mode.update_game().unwrap();
        }
        assert_eq!(mode.metrics.games_played, 1);

        mode.reset_game().unwrap();
        assert!(mode.engine.is_alive());
        assert_eq!(mode.engine.state().steps, 0);
    }
}

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Heading, Position, Termination};
use crate::metrics::GameMetrics;

/// Playback details shown when a saved policy is driving the snake
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackInfo {
    pub episode: usize,
    pub speed: &'static str,
    pub paused: bool,
    /// Generation the policy was evolved in
    pub generation: usize,
    /// Fitness recorded when the policy was saved
    pub fitness: f64,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        playback: Option<&PlaybackInfo>,
    ) {
        let header_height = if playback.is_some() { 4 } else { 3 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], state, metrics, playback);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.is_alive {
            let grid = self.render_grid(game_area, state);
            frame.render_widget(grid, game_area);
        } else {
            let game_over = self.render_game_over(game_area, state, playback.is_some());
            frame.render_widget(game_over, game_area);
        }

        let controls = self.render_controls(chunks[2], playback.is_some());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        head_glyph(state.snake.heading),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if state.is_pill(pos) {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        state: &GameState,
        metrics: &GameMetrics,
        playback: Option<&PlaybackInfo>,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut text = vec![Line::from(vec![
            Span::styled("Pills: ", label),
            Span::styled(
                state.pills_eaten.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Fitness: ", label),
            Span::styled(state.fitness.to_string(), value),
            Span::raw("    "),
            Span::styled("Hunger: ", label),
            Span::styled(state.snake.hunger.to_string(), hunger_style(state.snake.hunger)),
            Span::raw("    "),
            Span::styled("Steps: ", label),
            Span::styled(state.steps.to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ])];

        if let Some(info) = playback {
            let mut spans = vec![
                Span::styled(
                    "VISUALIZE",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Episode: ", label),
                Span::styled(info.episode.to_string(), value),
                Span::raw("    "),
                Span::styled("Speed: ", label),
                Span::styled(info.speed, value),
                Span::raw("    "),
                Span::styled("Policy: ", label),
                Span::styled(
                    format!("gen {} / fitness {:.0}", info.generation, info.fitness),
                    value,
                ),
            ];
            if info.paused {
                spans.push(Span::raw("    "));
                spans.push(Span::styled(
                    "PAUSED",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
            }
            text.push(Line::from(spans));
        }

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, state: &GameState, playback: bool) -> Paragraph<'_> {
        let cause = match state.termination {
            Some(Termination::Wall) => "hit the wall",
            Some(Termination::SelfCollision) => "bit itself",
            Some(Termination::Starvation) => "starved",
            Some(Termination::BoardFull) => "filled the board",
            None => "stopped",
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(
                format!("The snake {}", cause),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Pills eaten: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.pills_eaten.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Fitness: ", Style::default().fg(Color::Yellow)),
                Span::styled(state.fitness.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
        ];

        if playback {
            text.push(Line::from(Span::styled(
                "Next episode starting...",
                Style::default().fg(Color::Gray),
            )));
        } else {
            text.push(Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect, playback: bool) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let spans = if playback {
            vec![
                Span::styled("Space", key),
                Span::raw(" pause | "),
                Span::styled("R", key),
                Span::raw(" reset | "),
                Span::styled("1-4", key),
                Span::raw(" speed | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]
        } else {
            vec![
                Span::styled("↑/W", key),
                Span::raw(" forward | "),
                Span::styled("←/A", key),
                Span::raw(" turn left | "),
                Span::styled("→/D", key),
                Span::raw(" turn right | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]
        };

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn head_glyph(heading: Heading) -> &'static str {
    match heading {
        Heading::Up => "▲ ",
        Heading::Down => "▼ ",
        Heading::Left => "◀ ",
        Heading::Right => "▶ ",
    }
}

/// Hunger turns yellow, then red, as the snake nears starvation
fn hunger_style(hunger: i32) -> Style {
    let color = match hunger {
        h if h <= 10 => Color::Red,
        h if h <= 30 => Color::Yellow,
        _ => Color::White,
    };
    Style::default().fg(color)
}

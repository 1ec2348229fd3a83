//! Terminal front end — ratatui highway renderer and the interactive game loop.
//!
//! [`TuiRenderer`] implements [`Renderer`] over any ratatui backend, so tests
//! draw into a `TestBackend`. [`run_interactive`] owns the real terminal: raw
//! mode, alternate screen and, where supported, key-release reporting so
//! sustains end when the key is let go.

pub mod highway;
pub mod status;

use std::error::Error;
use std::io::{self, Stdout};

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use log::{info, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};

use crate::audio::NotePlayer;
use crate::chart::{Lane, SongLibrary};
use crate::config::GameConfig;
use crate::engine::GameState;
use crate::game::{GameSession, Renderer};
use crate::highscore::HighScoreStore;
use crate::input::{EventSource, KeyMap};

use highway::{project, Cell, LANE_COLORS};
use status::StatusInfo;

/// Width of the status panel.
const STATUS_WIDTH: u16 = 26;

/// Draws game snapshots into a ratatui terminal.
pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    keymap: KeyMap,
    song: String,
}

impl<B: Backend> TuiRenderer<B> {
    pub fn new(terminal: Terminal<B>, keymap: KeyMap) -> Self {
        Self {
            terminal,
            keymap,
            song: String::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> Renderer for TuiRenderer<B> {
    fn render(&mut self, state: &GameState, high_score: u64) -> io::Result<()> {
        let status = StatusInfo::new(state, &self.song, high_score);
        let keymap = &self.keymap;
        self.terminal
            .draw(|frame| draw(frame, state, &status, keymap))
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(())
    }

    fn song_changed(&mut self, name: &str) {
        self.song = name.to_string();
    }
}

/// Draw one full frame.
pub fn draw(frame: &mut Frame, state: &GameState, status: &StatusInfo, keymap: &KeyMap) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(12), Constraint::Length(STATUS_WIDTH)])
        .split(frame.area());

    draw_highway(frame, chunks[0], state, status);
    draw_status(frame, chunks[1], status, keymap);

    if status.game_over {
        draw_game_over(frame, chunks[0], status);
    }
}

fn draw_highway(frame: &mut Frame, area: Rect, state: &GameState, status: &StatusInfo) {
    let block = Block::default()
        .title(format!(" {} ", status.song))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lane_width = (inner.width / LANE_COLORS.len() as u16).max(1) as usize;
    let lines: Vec<Line> = project(state, inner.height as usize)
        .iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .enumerate()
                    .map(|(lane, cell)| lane_span(*cell, lane, lane_width))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn lane_span(cell: Cell, lane: usize, width: usize) -> Span<'static> {
    let color = LANE_COLORS[lane];
    let fill = |s: &str| s.repeat(width);
    match cell {
        Cell::Empty => Span::raw(" ".repeat(width)),
        Cell::HitLine => Span::styled(fill("─"), Style::default().fg(Color::Gray)),
        Cell::Tail => {
            let left = width.saturating_sub(1) / 2;
            let right = width.saturating_sub(left + 1);
            Span::styled(
                format!("{}┃{}", " ".repeat(left), " ".repeat(right)),
                Style::default().fg(color),
            )
        }
        Cell::Head => Span::styled(fill("█"), Style::default().fg(color)),
        Cell::Judged => Span::styled(fill("░"), Style::default().fg(color)),
        Cell::Held => Span::styled(
            fill("▓"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    }
}

fn draw_status(frame: &mut Frame, area: Rect, status: &StatusInfo, keymap: &KeyMap) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let field = |name: &'static str, text: String| {
        Line::from(vec![
            Span::styled(format!("{name:<11}"), label),
            Span::styled(text, value),
        ])
    };

    let keys: Vec<Span> = Lane::all()
        .map(|lane| {
            Span::styled(
                format!(" {} ", keymap.key_for(lane).to_ascii_uppercase()),
                Style::default()
                    .fg(Color::Black)
                    .bg(LANE_COLORS[lane.index()]),
            )
        })
        .collect();

    let lines = vec![
        field("Score", status.score.to_string()),
        field("Multiplier", status.multiplier_display()),
        field("Combo", status.combo.to_string()),
        field("Best", status.best_display().to_string()),
        Line::raw(""),
        Line::from(keys),
        Line::raw(""),
        Line::styled("r restart", label),
        Line::styled("tab / 1-9 song", label),
        Line::styled("q quit", label),
    ];

    let block = Block::default()
        .title(" fretfall ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_game_over(frame: &mut Frame, area: Rect, status: &StatusInfo) {
    let width = area.width.min(30);
    let height = area.height.min(7);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay = Rect::new(x, y, width, height);

    let mut lines = vec![
        Line::styled(
            "GAME OVER",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!("Score {}", status.score)),
    ];
    if status.is_new_record() {
        lines.push(Line::styled(
            "New high score!",
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::styled(
        "press r to restart",
        Style::default().fg(Color::DarkGray),
    ));

    let block = Block::default()
        .style(Style::default().bg(Color::Black))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        overlay,
    );
}

/// Puts the terminal into game mode and restores it on drop.
pub struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        } else {
            info!("terminal does not report key releases; sustains complete on their own");
        }
        Ok(Self { enhanced })
    }

    /// Whether key-release events are reported.
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        if let Err(e) = execute!(stdout, LeaveAlternateScreen, cursor::Show) {
            warn!("failed to leave alternate screen: {e}");
        }
        if let Err(e) = disable_raw_mode() {
            warn!("failed to disable raw mode: {e}");
        }
    }
}

/// Play interactively in the current terminal until the player quits.
///
/// Returns the best score seen during the run.
pub fn run_interactive(
    config: &GameConfig,
    library: SongLibrary,
    song: &str,
    player: Box<dyn NotePlayer>,
    store: Box<dyn HighScoreStore>,
) -> Result<u64, Box<dyn Error>> {
    let keymap = config.keymap()?;
    let _guard = TerminalGuard::enter()?;
    let terminal: Terminal<CrosstermBackend<Stdout>> =
        Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let renderer = TuiRenderer::new(terminal, keymap.clone());

    let mut session = GameSession::new(library, song, player, Box::new(renderer), store)?;
    let mut source = EventSource::new();
    source.spawn_ticker(config.tick_ms);
    source.spawn_keyboard(keymap);

    session.run(&source);
    source.shutdown();
    info!("quit with best score {}", session.high_score());
    Ok(session.high_score())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartRow, Timeline};
    use crate::engine::{reduce, GameEvent, TICK_MS};
    use ratatui::backend::TestBackend;

    fn renderer(width: u16, height: u16) -> TuiRenderer<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut r = TuiRenderer::new(terminal, KeyMap::default());
        r.song_changed("IWonder");
        r
    }

    fn screen(r: &TuiRenderer<TestBackend>) -> String {
        r.terminal()
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn status_panel_shows_scoreboard() {
        let mut r = renderer(60, 20);
        r.render(&GameState::initial(), 42).unwrap();
        let text = screen(&r);
        assert!(text.contains("IWonder"));
        assert!(text.contains("Score"));
        assert!(text.contains("x1.0"));
        assert!(text.contains("42"));
        assert!(text.contains(" H "));
        assert!(!text.contains("GAME OVER"));
    }

    #[test]
    fn hit_line_is_drawn() {
        let mut r = renderer(60, 20);
        r.render(&GameState::initial(), 0).unwrap();
        assert!(screen(&r).contains("────"));
    }

    #[test]
    fn falling_note_appears() {
        let tl = Timeline::from_rows(&[ChartRow {
            user_played: true,
            instrument: "piano".into(),
            velocity: 96,
            pitch: 60,
            start: 0.0,
            end: 0.3,
        }]);
        let state = (0..60).fold(GameState::initial(), |s, _| {
            reduce(&s, &GameEvent::Tick(TICK_MS), &tl).state
        });
        let mut r = renderer(60, 20);
        r.render(&state, 0).unwrap();
        assert!(screen(&r).contains('█'));
    }

    #[test]
    fn game_over_banner_offers_restart() {
        let tl = Timeline::new();
        let mut state = GameState::initial();
        while !state.is_game_over() {
            state = reduce(&state, &GameEvent::Tick(TICK_MS), &tl).state;
        }
        let mut r = renderer(60, 20);
        r.render(&state, 0).unwrap();
        let text = screen(&r);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("press r to restart"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut r = renderer(4, 3);
        assert!(r.render(&GameState::initial(), 0).is_ok());
    }
}

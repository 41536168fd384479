//! Layout and drawing: playfield, sidebar, pause and game-over overlays.

use crate::game::{GameState, Phase};
use crate::grid::Cell;
use crate::matcher::Popped;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Every glyph is double width, so one grid cell is two terminal columns.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Duration of the pop fade in ms.
const POP_FADE_MS: u32 = 450;

const EMPTY_GLYPH: &str = "　";
const WALL_GLYPH: &str = "⬛";
/// Earth, water, fire, wind.
const PUYO_GLYPHS: [&str; 4] = ["土", "水", "火", "風"];

/// Glyph for a cell value.
pub fn cell_glyph(cell: Cell) -> &'static str {
    match cell {
        Cell::Empty => EMPTY_GLYPH,
        Cell::Wall => WALL_GLYPH,
        Cell::Puyo(i) => PUYO_GLYPHS[i as usize % PUYO_GLYPHS.len()],
    }
}

fn cell_style(cell: Cell, theme: &Theme) -> Style {
    let fg = match cell {
        Cell::Empty => theme.bg,
        Cell::Wall => theme.wall,
        Cell::Puyo(i) => theme.puyo_color(i),
    };
    Style::default().fg(fg).bg(theme.bg)
}

/// Outer size (with border) of the playfield box.
fn playfield_size(state: &GameState) -> (u16, u16) {
    let (w, h) = (state.grid.width() as u16, state.grid.height() as u16);
    (w * CELL_WIDTH + 2, h + 2)
}

/// Playfield and sidebar rects, centred in `area`.
fn game_layout(area: Rect, state: &GameState) -> (Rect, Rect) {
    let (pw, ph) = playfield_size(state);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(pw + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(ph), Constraint::Fill(1)])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Board rect (inside the border) for the current layout.
fn board_rect(area: Rect, state: &GameState) -> Rect {
    let (playfield, _) = game_layout(area, state);
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: (state.grid.width() as u16 * CELL_WIDTH).min(playfield.width.saturating_sub(2)),
        height: (state.grid.height() as u16).min(playfield.height.saturating_sub(2)),
    }
}

/// Buffer positions covered by popped cells.
fn popped_buffer_positions(board: Rect, popped: &[Popped]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for p in popped {
        let x0 = board.x + p.x as u16 * CELL_WIDTH;
        let y = board.y + p.y as u16;
        for x in x0..x0 + CELL_WIDTH {
            set.insert((x, y));
        }
    }
    set
}

/// Draw the game. While `pop_effect` runs, the last popped puyos are drawn
/// over the field and faded out.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    paused: bool,
    pop_effect: &mut Option<Effect>,
    pop_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let (playfield, sidebar) = game_layout(area, state);
    draw_playfield(frame, state, theme, playfield, pop_effect.is_some());
    draw_sidebar(frame, state, theme, sidebar, paused);

    if pop_effect.is_some() {
        apply_pop_effect(frame, state, area, pop_effect, pop_process_time, now);
    }
    if state.phase == Phase::GameOver {
        draw_game_over(frame, state, theme, playfield);
    } else if paused {
        draw_pause_overlay(frame, theme, playfield);
    }
}

fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, popping: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" puyotui ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = Rect {
        x: inner.x,
        y: inner.y,
        width: (state.grid.width() as u16 * CELL_WIDTH).min(inner.width),
        height: (state.grid.height() as u16).min(inner.height),
    };
    let view = state.view();
    let buf = frame.buffer_mut();
    for (y, row) in view.rows().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            let rx = board.x + x as u16 * CELL_WIDTH;
            let ry = board.y + y as u16;
            if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
                buf.set_string(rx, ry, cell_glyph(cell), cell_style(cell, theme));
            }
        }
    }

    if popping {
        for p in &state.last_popped {
            let rx = board.x + p.x as u16 * CELL_WIDTH;
            let ry = board.y + p.y as u16;
            if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
                let cell = Cell::Puyo(p.color);
                let style = cell_style(cell, theme).add_modifier(Modifier::BOLD);
                buf.set_string(rx, ry, cell_glyph(cell), style);
            }
        }
    }
}

/// Advance the running pop fade by the time since the last frame.
fn apply_pop_effect(
    frame: &mut Frame,
    state: &GameState,
    area: Rect,
    pop_effect: &mut Option<Effect>,
    pop_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let board = board_rect(area, state);
    let delta = pop_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *pop_process_time = Some(now);

    if let Some(effect) = pop_effect {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

/// New pop fade over the cells popped by the latest match pass.
pub fn new_pop_effect(area: Rect, state: &GameState, theme: &Theme) -> Effect {
    let board = board_rect(area, state);
    let popped = popped_buffer_positions(board, &state.last_popped);
    let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
        popped.contains(&(pos.x, pos.y))
    }));
    let bg = theme.bg;
    fx::fade_to(bg, bg, (POP_FADE_MS, Interpolation::Linear))
        .with_filter(filter)
        .with_area(board)
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, paused: bool) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats
            Constraint::Length(3), // Colours
            Constraint::Fill(1),   // Controls
        ])
        .split(area);

    let status = match state.phase {
        Phase::Falling if paused => "paused",
        Phase::Falling => "falling",
        Phase::Resolving => "settling",
        Phase::GameOver => "game over",
    };
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats = vec![
        stat("State:  ", status.to_string()),
        stat("Popped: ", state.puyos_popped.to_string()),
        stat("Groups: ", state.groups_popped.to_string()),
        stat("Pieces: ", state.pieces_locked.to_string()),
        stat("Field:  ", state.grid.puyo_count().to_string()),
    ];
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    let palette: Vec<Span> = (0..state.rules().palette_size)
        .map(|i| {
            let cell = Cell::Puyo(i);
            Span::styled(cell_glyph(cell), cell_style(cell, theme))
        })
        .collect();
    Paragraph::new(Line::from(palette))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[1], frame.buffer_mut());

    let help = |keys: &'static str, what: &'static str| {
        Line::from(vec![Span::styled(keys, fg_style), Span::styled(what, dim_style)])
    };
    let controls = vec![
        help("←/a/h  ", "move left"),
        help("→/d/l  ", "move right"),
        help("↓/s/j  ", "soft drop"),
        help("↑/spc  ", "rotate"),
        help("p / q  ", "pause / quit"),
    ];
    Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Controls ", title_style)),
        )
        .render(chunks[2], frame.buffer_mut());
}

/// Small box centred on the playfield.
fn overlay_rect(playfield: Rect, height: u16) -> Rect {
    let width = playfield.width.saturating_sub(2).max(1);
    Rect {
        x: playfield.x + 1,
        y: playfield.y + playfield.height.saturating_sub(height) / 2,
        width,
        height: height.min(playfield.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, playfield: Rect) {
    let popup = overlay_rect(playfield, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("p resume", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, playfield: Rect) {
    let popup = overlay_rect(playfield, 7);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(Span::styled(
            format!("Popped {}", state.puyos_popped),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled("r restart  q quit", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cell_glyphs() {
        assert_eq!(cell_glyph(Cell::Empty), "　");
        assert_eq!(cell_glyph(Cell::Wall), "⬛");
        assert_eq!(cell_glyph(Cell::Puyo(0)), "土");
        assert_eq!(cell_glyph(Cell::Puyo(3)), "風");
    }

    #[test]
    fn test_popped_positions_cover_both_columns() {
        let board = Rect::new(10, 5, 16, 14);
        let set = popped_buffer_positions(board, &[Popped { x: 2, y: 3, color: 0 }]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&(14, 8)));
        assert!(set.contains(&(15, 8)));
    }

    #[test]
    fn test_draw_renders_walls_and_piece() {
        let state = GameState::new(&GameConfig { seed: Some(3), ..GameConfig::default() });
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut effect = None;
        let mut process_time = None;
        terminal
            .draw(|f| draw(f, &state, &theme, false, &mut effect, &mut process_time, Instant::now()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains(WALL_GLYPH));
        assert!(text.contains(cell_glyph(Cell::Puyo(state.piece.color()))));
        assert!(text.contains("puyotui"));
    }
}

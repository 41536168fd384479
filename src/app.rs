//! App: terminal init, main loop, tick and key handling.

use crate::game::GameState;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Whether the main loop keeps going after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    paused: bool,
    last_tick: Instant,
    /// TachyonFX fade for popped puyos (created when a group pops).
    pop_effect: Option<Effect>,
    /// Last time the pop effect was processed (for delta).
    pop_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let state = GameState::new(&config);
        Self {
            args,
            config,
            theme,
            state,
            paused: false,
            last_tick: Instant::now(),
            pop_effect: None,
            pop_effect_process_time: None,
        }
    }

    fn reset_game(&mut self) {
        self.state = GameState::new(&self.config);
        self.paused = false;
        self.last_tick = Instant::now();
        self.pop_effect = None;
        self.pop_effect_process_time = None;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_interval = Duration::from_millis(self.config.tick_ms.max(1));
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    self.paused,
                    &mut self.pop_effect,
                    &mut self.pop_effect_process_time,
                    now,
                );
            })?;

            if self.pop_effect.as_ref().is_some_and(Effect::done) {
                self.pop_effect = None;
                self.pop_effect_process_time = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? && self.handle_keys(pending_keys()?) == Flow::Quit {
                return Ok(());
            }

            if !self.paused && self.last_tick.elapsed() >= tick_interval {
                self.last_tick = Instant::now();
                let groups_before = self.state.groups_popped;
                self.state.tick();
                if self.state.groups_popped > groups_before && !self.args.no_animation {
                    let area = terminal.get_frame().area();
                    self.pop_effect = Some(crate::ui::new_pop_effect(area, &self.state, &self.theme));
                    self.pop_effect_process_time = None;
                }
                if self.state.input_held() && self.flush_after_lock(pending_keys()?) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match key_to_action(key) {
            Action::Quit => return Flow::Quit,
            Action::Pause if !self.state.is_over() => self.paused = !self.paused,
            Action::Restart if self.state.is_over() => self.reset_game(),
            action => match action.command() {
                Some(command) if !self.paused => {
                    self.state.apply(command);
                }
                _ => {}
            },
        }
        Flow::Continue
    }

    fn handle_keys(&mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Flow {
        for key in keys {
            if self.handle_key(key) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Keys queued while a piece locked. The game holds input at this point,
    /// so moves are dropped; quit and pause still count.
    fn flush_after_lock(&mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Flow {
        let flow = self.handle_keys(keys);
        self.state.release_input();
        flow
    }
}

/// Key presses already queued by the terminal, without blocking.
fn pending_keys() -> Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Orientation, SPAWN_X, SPAWN_Y};
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app() -> App {
        let args = Args::try_parse_from(["puyotui", "--seed", "5"]).unwrap();
        let config = GameConfig::from(&args);
        App::new(args, config, Theme::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tick_until_lock(app: &mut App) {
        while !app.state.tick().locked() {}
    }

    #[test]
    fn test_keys_queued_at_lock_do_not_steer_next_piece() {
        let mut app = app();
        tick_until_lock(&mut app);
        let flow = app.flush_after_lock([press(KeyCode::Left), press(KeyCode::Up)]);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(app.state.piece.pivot(), (SPAWN_X, SPAWN_Y));
        assert_eq!(app.state.piece.orientation(), Orientation::Up);
        assert!(!app.state.input_held());

        assert_eq!(app.handle_keys([press(KeyCode::Left)]), Flow::Continue);
        assert_eq!(app.state.piece.pivot(), (SPAWN_X - 1, SPAWN_Y));
    }

    #[test]
    fn test_quit_and_pause_survive_lock_flush() {
        let mut app = app();
        tick_until_lock(&mut app);
        assert_eq!(app.flush_after_lock([press(KeyCode::Char('p'))]), Flow::Continue);
        assert!(app.paused);

        tick_until_lock(&mut app);
        let flow = app.flush_after_lock([press(KeyCode::Left), press(KeyCode::Char('q'))]);
        assert_eq!(flow, Flow::Quit);
        assert!(!app.state.input_held());
    }

    #[test]
    fn test_moves_ignored_while_paused() {
        let mut app = app();
        app.handle_keys([press(KeyCode::Char('p')), press(KeyCode::Right)]);
        assert!(app.paused);
        assert_eq!(app.state.piece.pivot(), (SPAWN_X, SPAWN_Y));
    }
}

//! Game state: grid, active piece, lock → settle → match cycle, spawning.

use crate::grid::{Cell, Grid, Rules};
use crate::matcher::{ClearReport, Matcher, Popped};
use crate::piece::{ActivePiece, Fall};
use crate::settle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of piece colours: uniform in `0..palette_size`.
pub trait ColorSource: std::fmt::Debug {
    fn next_color(&mut self, palette_size: u8) -> u8;
}

/// `StdRng`-backed colours; seeded for reproducible games, entropy otherwise.
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl ColorSource for RandomColors {
    fn next_color(&mut self, palette_size: u8) -> u8 {
        self.rng.gen_range(0..palette_size.max(1))
    }
}

/// How settling advances per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettleMode {
    /// Settle to fixpoint inside one tick.
    #[default]
    Instant,
    /// One settle pass per tick, so falls are visible.
    Gradual,
}

/// Player command, already decoded from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// Where the game loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A piece is under player control.
    Falling,
    /// Piece locked; settling and popping until the field is stable.
    Resolving,
    GameOver,
}

/// What one tick did, for the shell to react to (effects, input draining).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Fell,
    /// Cells dropped during a gradual settle pass.
    Settled,
    /// A match pass popped at least one group.
    Popped,
    /// Field stable, fresh piece in play. `locked` is set when the
    /// previous piece locked during this same tick.
    Spawned { locked: bool },
    /// Piece locked; the field still needs another tick to resolve.
    Locked,
    GameOver,
    Idle,
}

impl TickEvent {
    /// True if a piece locked during this tick.
    pub fn locked(self) -> bool {
        matches!(self, Self::Locked | Self::Spawned { locked: true })
    }
}

/// Game state: grid, current piece, match engine, stats.
#[derive(Debug)]
pub struct GameState {
    rules: Rules,
    pub grid: Grid,
    pub piece: ActivePiece,
    matcher: Matcher,
    colors: Box<dyn ColorSource>,
    settle_mode: SettleMode,
    pub phase: Phase,
    /// Set by a tick that locked a piece; commands are refused until
    /// `release_input` so keys aimed at the old piece never steer the new one.
    input_held: bool,
    /// Cells popped by the most recent clearing pass.
    pub last_popped: Vec<Popped>,
    pub puyos_popped: u32,
    pub groups_popped: u32,
    pub pieces_locked: u32,
}

impl GameState {
    pub fn new(config: &crate::GameConfig) -> Self {
        Self::with_rules(
            Rules::default(),
            Box::new(RandomColors::new(config.seed)),
            config.settle_mode,
        )
    }

    /// Fresh grid and the first piece already falling.
    pub fn with_rules(rules: Rules, colors: Box<dyn ColorSource>, settle_mode: SettleMode) -> Self {
        let mut state = Self {
            rules,
            grid: Grid::from_rules(&rules),
            piece: ActivePiece::new(rules.spawn),
            matcher: Matcher::new(rules.width, rules.height, rules.clear_threshold),
            colors,
            settle_mode,
            phase: Phase::Resolving,
            input_held: false,
            last_popped: Vec::new(),
            puyos_popped: 0,
            groups_popped: 0,
            pieces_locked: 0,
        };
        state.spawn_next();
        state
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Apply a player command. Ignored unless a piece is falling and input
    /// is not held after a lock.
    pub fn apply(&mut self, command: Command) -> bool {
        if self.phase != Phase::Falling || self.input_held {
            return false;
        }
        match command {
            Command::MoveLeft => self.piece.try_move(&self.grid, -1, 0),
            Command::MoveRight => self.piece.try_move(&self.grid, 1, 0),
            Command::SoftDrop => self.piece.try_move(&self.grid, 0, 1),
            Command::Rotate => self.piece.try_rotate_cw(&self.grid),
        }
    }

    #[inline]
    pub fn input_held(&self) -> bool {
        self.input_held
    }

    /// Accept commands again once the input queued before a lock is dealt with.
    pub fn release_input(&mut self) {
        self.input_held = false;
    }

    /// One clock tick: gravity, then (after a lock) settle and match.
    pub fn tick(&mut self) -> TickEvent {
        let ev = self.step();
        if ev.locked() {
            self.input_held = true;
        }
        ev
    }

    fn step(&mut self) -> TickEvent {
        match self.phase {
            Phase::GameOver => TickEvent::GameOver,
            Phase::Falling => match self.piece.gravity_step(&mut self.grid) {
                Fall::Moved => TickEvent::Fell,
                Fall::Idle => TickEvent::Idle,
                Fall::Locked => {
                    self.pieces_locked += 1;
                    self.phase = Phase::Resolving;
                    match self.resolve() {
                        TickEvent::Spawned { .. } => TickEvent::Spawned { locked: true },
                        TickEvent::GameOver => TickEvent::GameOver,
                        _ => TickEvent::Locked,
                    }
                }
            },
            Phase::Resolving => self.resolve(),
        }
    }

    /// Settle then match once. Spawns when the field is stable.
    fn resolve(&mut self) -> TickEvent {
        match self.settle_mode {
            SettleMode::Instant => {
                settle::settle(&mut self.grid);
                debug_assert!(!settle::has_floating(&self.grid));
            }
            SettleMode::Gradual => {
                if settle::settle_step(&mut self.grid) {
                    return TickEvent::Settled;
                }
            }
        }
        let report = self.matcher.clear_groups(&mut self.grid);
        if report.cleared() {
            return self.record(report);
        }
        self.spawn_next()
    }

    fn record(&mut self, report: ClearReport) -> TickEvent {
        self.puyos_popped += report.cells.len() as u32;
        self.groups_popped += report.groups;
        self.last_popped = report.cells;
        TickEvent::Popped
    }

    fn spawn_next(&mut self) -> TickEvent {
        let color = self.colors.next_color(self.rules.palette_size);
        self.piece.spawn(color);
        if self.grid.would_collide(self.piece.pivot(), self.piece.orientation()) {
            self.piece.withdraw();
            self.phase = Phase::GameOver;
            return TickEvent::GameOver;
        }
        self.phase = Phase::Falling;
        TickEvent::Spawned { locked: false }
    }

    /// Grid with the falling piece drawn in; what the renderer consumes.
    pub fn view(&self) -> Grid {
        let mut view = self.grid.clone();
        if self.phase == Phase::Falling {
            for (x, y) in self.piece.cells() {
                if view.in_bounds(x, y) {
                    view.set_cell(x as usize, y as usize, Cell::Puyo(self.piece.color()));
                }
            }
        }
        view
    }
}

//! puyotui — minimal Puyo-Puyo style falling-pair puzzle in the terminal.

mod app;
mod game;
mod grid;
mod input;
mod matcher;
mod piece;
mod settle;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use game::SettleMode;

/// Options derived from CLI that affect game behaviour (tick speed, settling, colours).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub tick_ms: u64,
    pub settle_mode: SettleMode,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            settle_mode: SettleMode::Instant,
            seed: None,
        }
    }
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            tick_ms: args.tick_ms,
            settle_mode: if args.gradual_settle {
                SettleMode::Gradual
            } else {
                SettleMode::Instant
            },
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig::from(&args);
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Puyo-Puyo style puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "puyotui",
    version,
    about = "Minimal Puyo-Puyo style puzzle in the terminal. Connect four of a colour to pop them.",
    long_about = "puyotui drops pairs of coloured puyos into a walled well.\n\n\
        When a pair lands its puyos settle independently. Four or more same-coloured puyos \
        touching edge to edge pop; whatever was above them falls and may pop again.\n\n\
        CONTROLS:\n  a / Left / h    Move left     d / Right / l   Move right\n  \
        s / Down / j    Soft drop     Space / Up / k  Rotate\n  p               Pause         \
        q / Esc         Quit\n  r               Restart after game over"
)]
pub struct Args {
    /// Gravity tick interval in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub tick_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Let puyos fall one row per tick after a lock or pop instead of instantly.
    #[arg(long)]
    pub gradual_settle: bool,

    /// Seed for the colour sequence (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Disable the pop fade animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

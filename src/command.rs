use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fractal::FractalKind;
use crate::session::Direction;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Move { direction: Direction, step: f64 },
    ZoomIn(f64),
    ZoomOut(f64),
    Jump { x: f64, y: f64, zoom: Option<f64> },
    Random,
    Switch(FractalKind),
    Explore,
    Poem { lines: usize },
    Journey { steps: usize },
    Tour,
    Mandala,
    Save(String),
    Load(String),
    Bookmarks,
    History,
    Export(PathBuf),
    Import(PathBuf),
    Art { path: PathBuf, palette: Option<String> },
    Status,
    Help,
    Quit,
}

fn number(token: &str, what: &str) -> Result<f64> {
    let value: f64 = token
        .parse()
        .map_err(|_| Error::invalid(format!("{} must be a number, got '{}'", what, token)))?;
    if !value.is_finite() {
        return Err(Error::invalid(format!("{} must be finite, got '{}'", what, token)));
    }
    Ok(value)
}

fn count(token: &str, what: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| Error::invalid(format!("{} must be a whole number, got '{}'", what, token)))
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    ///
    /// Only the command word is case-insensitive; names and paths keep their case.
    pub fn parse(line: &str, config: &Config) -> Result<Option<Command>> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Ok(None);
        };
        let cmd = first.to_lowercase();
        let arg = |i: usize| parts.get(i).copied();

        let command = match cmd.as_str() {
            "up" | "down" | "left" | "right" => Command::Move {
                direction: cmd.parse()?,
                step: arg(1).map(|t| number(t, "step")).transpose()?.unwrap_or(config.move_step),
            },
            "in" | "out" => {
                let factor = arg(1).map(|t| number(t, "zoom factor")).transpose()?.unwrap_or(config.zoom_factor);
                if factor <= 0.0 {
                    return Err(Error::invalid("zoom factor must be positive"));
                }
                if cmd == "in" { Command::ZoomIn(factor) } else { Command::ZoomOut(factor) }
            }
            "jump" => match (arg(1), arg(2)) {
                (Some(x), Some(y)) => Command::Jump {
                    x: number(x, "x")?,
                    y: number(y, "y")?,
                    zoom: arg(3).map(|t| number(t, "zoom")).transpose()?,
                },
                _ => return Err(Error::Usage("jump <x> <y> [zoom]")),
            },
            "random" => Command::Random,
            "mandelbrot" | "julia" => Command::Switch(cmd.parse()?),
            "explore" => Command::Explore,
            "poem" => Command::Poem {
                lines: arg(1).map(|t| count(t, "lines")).transpose()?.unwrap_or(config.default_poem_lines),
            },
            "journey" => Command::Journey {
                steps: arg(1).map(|t| count(t, "steps")).transpose()?.unwrap_or(config.journey_steps),
            },
            "tour" => Command::Tour,
            "mandala" => Command::Mandala,
            "save" => Command::Save(arg(1).ok_or(Error::Usage("save <name>"))?.to_string()),
            "load" => Command::Load(arg(1).ok_or(Error::Usage("load <name>"))?.to_string()),
            "bookmarks" => Command::Bookmarks,
            "history" => Command::History,
            "export" => Command::Export(arg(1).ok_or(Error::Usage("export <filename>"))?.into()),
            "import" => Command::Import(arg(1).ok_or(Error::Usage("import <filename>"))?.into()),
            "art" => Command::Art {
                path: arg(1).ok_or(Error::Usage("art <filename.png> [palette]"))?.into(),
                palette: arg(2).map(str::to_string),
            },
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

pub const HELP: &str = "
FRACTAL POETRY EXPLORER COMMANDS

Navigation:
  up/down/left/right [step]  - Move through fractal space
  in/out [factor]            - Zoom in/out
  jump <x> <y> [zoom]        - Jump to specific coordinates
  random                     - Jump to random interesting location

Fractals:
  mandelbrot                 - Switch to Mandelbrot set
  julia                      - Switch to Julia set

Exploration:
  explore                    - Explore current location
  poem [lines]               - Generate poetry at current location
  journey [steps]            - Take a guided journey
  tour                       - Full guided tour
  mandala                    - Show fractal mandala
  art <file.png> [palette]   - Render current view to an image

Bookmarks:
  save <name>                - Save current location
  load <name>                - Load saved location
  bookmarks                  - List all bookmarks

Session:
  history                    - Show session history
  export <filename>          - Export session to file
  import <filename>          - Replace session with an exported one
  status                     - Show current status

Utilities:
  help                       - Show this help
  quit/exit                  - Exit the explorer
";

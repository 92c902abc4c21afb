pub mod math;
pub mod error;
pub mod config;
pub mod fractal;
pub mod poetry;
pub mod visualizer;
pub mod art;
pub mod session;
pub mod command;
pub mod explorer;

pub use math::{C, Coordinate};
pub use error::{Error, Result};
pub use config::Config;
pub use fractal::{EscapeParams, FractalKind, FractalResult, evaluate};
pub use poetry::{Poem, PoetryMapper, generate_poem, poem_rng};
pub use session::{Direction, NavigationState, Session};
pub use command::Command;
pub use explorer::{PoetryExplorer, Reply};

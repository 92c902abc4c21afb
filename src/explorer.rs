use std::fmt::Write as _;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::art::{self, Palette};
use crate::command::{Command, HELP};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fractal::{EscapeParams, FractalKind, FractalResult, julia_preset};
use crate::math::Coordinate;
use crate::poetry::{PoetryMapper, Poem, essence, poem_rng};
use crate::session::{Limits, NavigationState, Outcome, Session};
use crate::visualizer::{self, Viewport};

const HISTORY_SHOWN: usize = 10;
const MANDALA_SIZE: usize = 20;
const ASCII_ROWS_SHOWN: usize = 8;
const JOURNEY_SAMPLES_PER_STEP: usize = 2;

/// Stops of the guided tour: kind, Julia preset, center, zoom, caption.
const TOUR: &[(FractalKind, &str, f64, f64, f64, &str)] = &[
    (FractalKind::Mandelbrot, "classic", 0.0, 0.0, 1.0, "The Classic Mandelbrot Set"),
    (FractalKind::Mandelbrot, "classic", -0.7, 0.0, 4.0, "The Seahorse Valley"),
    (FractalKind::Mandelbrot, "classic", -0.16, 1.04, 20.0, "Spiral Patterns"),
    (FractalKind::Julia, "classic", 0.0, 0.0, 1.0, "Julia Set Beauty"),
    (FractalKind::Julia, "spiral", 0.0, 0.0, 1.0, "Alternative Julia"),
];

/// What the caller should do after a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// One interactive session: configuration, navigation state and the seeded
/// generator every randomized command draws from. Nothing here is global, so
/// several explorers can live side by side.
pub struct PoetryExplorer {
    config: Config,
    params: EscapeParams,
    mapper: PoetryMapper,
    session: Session,
    rng: StdRng,
}

impl PoetryExplorer {
    pub fn new(config: Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        let session = Session::new(seed, Limits::from(&config));
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: Session) -> Result<Self> {
        config.validate()?;
        let params = config.escape_params()?;
        info!(seed = session.seed(), "starting fractal poetry session");
        Ok(PoetryExplorer {
            mapper: PoetryMapper::new(config.max_poem_lines),
            rng: StdRng::seed_from_u64(session.seed()),
            config,
            params,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses and runs one line. Blank input gives `None`.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Reply>> {
        match Command::parse(line, &self.config)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!(?command, "executing");
        let text = match command {
            Command::Move { direction, step } => {
                let state = self.session.move_by(direction, step)?;
                format!("🧭 Moved {}. Now at {}", direction, state)
            }
            Command::ZoomIn(factor) => format!("🔍 Zoomed in. {}", self.session.zoom_in(factor)?),
            Command::ZoomOut(factor) => format!("🔭 Zoomed out. {}", self.session.zoom_out(factor)?),
            Command::Jump { x, y, zoom } => format!("🚀 Jumped to {}", self.session.jump(x, y, zoom)?),
            Command::Random => {
                let state = *self.session.random_jump(&self.params, &mut self.rng);
                format!("🎲 Random jump to {}\n{}", state, self.explore())
            }
            Command::Switch(kind) => format!("🔄 Switched to {} fractal", self.session.switch_kind(kind).kind),
            Command::Explore => self.explore(),
            Command::Poem { lines } => self.poem(lines)?.to_string(),
            Command::Journey { steps } => self.journey(steps)?.to_string(),
            Command::Tour => self.tour()?,
            Command::Mandala => format!("\n🕉️  Fractal Mandala:\n{}", visualizer::mandala(MANDALA_SIZE)),
            Command::Save(name) => {
                let state = self.session.save_bookmark(&name)?;
                format!("📍 Bookmark '{}' saved at {}", name, state)
            }
            Command::Load(name) => {
                let state = self.session.load_bookmark(&name)?;
                format!("🚀 Jumped to bookmark '{}': {}", name, state)
            }
            Command::Bookmarks => self.list_bookmarks(),
            Command::History => self.list_history(),
            Command::Export(path) => {
                self.session.export(&path)?;
                format!("💾 Session exported to {}", path.display())
            }
            Command::Import(path) => {
                self.import(&path)?;
                format!("📂 Session imported from {}. Now at {}", path.display(), self.session.state())
            }
            Command::Art { path, palette } => self.art(&path, palette.as_deref())?,
            Command::Status => self.status(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    /// Poem for the current point, reproducible from the session seed.
    pub fn poem(&mut self, lines: usize) -> Result<Poem> {
        let state = *self.session.state();
        let result = self.params.evaluate(state.coordinate, state.kind);
        let mut rng = poem_rng(self.session.seed(), state.coordinate, state.kind);
        let poem = self.mapper.generate_poem(&result, state.coordinate, lines, &mut rng)?;
        self.session.record_poem(format!("poem {}", lines), poem.clone());
        Ok(poem)
    }

    /// Walks inward from the current point, two samples per step, following
    /// the deepest sample and doubling the zoom each time up to the zoom cap.
    /// Steps beyond what the poem line cap can use are dropped.
    pub fn journey(&mut self, steps: usize) -> Result<Poem> {
        if steps == 0 {
            return Err(Error::invalid("journey needs at least one step"));
        }
        let cap = self.mapper.max_lines().div_ceil(JOURNEY_SAMPLES_PER_STEP);
        let requested = steps;
        let steps = if steps > cap {
            warn!(requested, cap, "journey steps capped");
            cap
        } else {
            steps
        };
        let max_zoom = self.session.limits().max_zoom;
        let start = *self.session.state();
        let mut rng = poem_rng(self.session.seed(), start.coordinate, start.kind);
        let mut center = start.coordinate;
        let mut zoom = start.zoom;
        let mut samples: Vec<(Coordinate, FractalResult)> = Vec::with_capacity(steps * JOURNEY_SAMPLES_PER_STEP);

        for _ in 0..steps {
            let size = 2.0 / zoom;
            let step_samples: Vec<_> = (0..JOURNEY_SAMPLES_PER_STEP)
                .map(|_| {
                    let p = center.offset(rng.gen_range(-size..size), rng.gen_range(-size..size));
                    (p, self.params.evaluate(p, start.kind))
                })
                .collect();

            if let Some((deepest, _)) = step_samples.iter().max_by_key(|(_, r)| r.iterations) {
                center = *deepest;
            }
            samples.extend(step_samples);
            zoom = (zoom * 2.0).min(max_zoom);
        }

        let title = format!("Journey Through {}", start.kind.display_name());
        let poem = self.mapper.compose(title, &samples, &mut rng)?;
        self.session.record_poem(format!("journey {}", requested), poem.clone());
        Ok(poem)
    }

    pub fn explore(&mut self) -> String {
        let state = *self.session.state();
        let text = explore_region(&self.config, &self.params, &state, &mut self.rng);
        self.session.record_state("explore");
        text
    }

    pub fn tour(&mut self) -> Result<String> {
        let mut out = String::from("\n🌟 FRACTAL POETRY TOUR 🌟\n");
        out.push_str(&"=".repeat(50));
        out.push('\n');

        for &(kind, preset, x, y, zoom, caption) in TOUR {
            let constant = julia_preset(preset)
                .ok_or_else(|| Error::invalid(format!("unknown julia preset: {}", preset)))?;
            let params = self.params.with_julia_constant(constant);
            let stop = NavigationState { coordinate: Coordinate::new(x, y), zoom, kind };

            let _ = writeln!(out, "\n📍 {}", caption);
            out.push_str(&explore_region(&self.config, &params, &stop, &mut self.rng));
            out.push('\n');
        }

        self.session.record_state("tour");
        Ok(out)
    }

    fn art(&mut self, path: &Path, palette: Option<&str>) -> Result<String> {
        let palette = Palette::by_name(palette.unwrap_or("fire"))?;
        let state = *self.session.state();
        art::export_png(
            path,
            &self.params,
            state.kind,
            Viewport::new(state.coordinate, state.zoom),
            (self.config.art_width, self.config.art_height),
            &palette,
        )?;
        self.session.record_state(format!("art {} {}", path.display(), palette.name));
        Ok(format!("🎨 Rendered {} with the {} palette", path.display(), palette.name))
    }

    fn import(&mut self, path: &Path) -> Result<()> {
        let session = Session::import(path, Limits::from(&self.config))?;
        self.rng = StdRng::seed_from_u64(session.seed());
        self.session = session;
        Ok(())
    }

    fn list_bookmarks(&self) -> String {
        let bookmarks = self.session.bookmarks();
        if bookmarks.is_empty() {
            return "📝 No bookmarks saved yet".to_string();
        }
        let mut out = String::from("📚 Saved Bookmarks:");
        for (name, state) in bookmarks {
            let _ = write!(out, "\n  {}: {}", name, state);
        }
        out
    }

    fn list_history(&self) -> String {
        let history = self.session.history();
        if history.is_empty() {
            return "📝 No history yet".to_string();
        }
        let skip = history.len().saturating_sub(HISTORY_SHOWN);
        let mut out = String::from("📜 Session History:");
        for (i, entry) in history.iter().enumerate().skip(skip) {
            let outcome = match &entry.outcome {
                Outcome::State(state) => state.to_string(),
                Outcome::Poem(poem) => format!("\"{}\" ({} lines)", poem.title(), poem.lines().len()),
            };
            let _ = write!(out, "\n  {}. {} → {}", i + 1, entry.command, outcome);
        }
        out
    }

    fn status(&self) -> String {
        format!(
            "📍 Current: {}\n📚 Bookmarks: {}\n📜 History entries: {}\n🌱 Seed: {}\n🕰️  Started: {}",
            self.session.state(),
            self.session.bookmarks().len(),
            self.session.history().len(),
            self.session.seed(),
            self.session.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// ASCII and ANSI views of a region plus a three-fragment "poetry essence".
pub fn explore_region<R: Rng + ?Sized>(
    config: &Config,
    params: &EscapeParams,
    state: &NavigationState,
    rng: &mut R,
) -> String {
    let viewport = Viewport::new(state.coordinate, state.zoom);
    let half = viewport.half_size() / 2.0;

    let fragments: Vec<&str> = (0..3)
        .map(|_| {
            let p = state.coordinate.offset(rng.gen_range(-half..half), rng.gen_range(-half..half));
            essence(&params.evaluate(p, state.kind))
        })
        .collect();

    let ascii = visualizer::render_ascii(&visualizer::sample_grid(
        params,
        state.kind,
        viewport,
        config.ascii_width,
        config.ascii_height,
    ));
    let colored = visualizer::render_ansi(&visualizer::sample_grid(
        params,
        state.kind,
        viewport,
        config.color_width,
        config.color_height,
    ));

    let rule = "=".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "\n🔍 Exploring {}", state);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Poetry essence: {}\n", fragments.join(" • "));
    out.push_str("ASCII Fractal:\n");
    out.push_str(&ascii.iter().take(ASCII_ROWS_SHOWN).cloned().collect::<Vec<_>>().join("\n"));
    out.push_str("\n\nColored Fractal:\n");
    out.push_str(&colored);
    out.push('\n');
    out.push_str(&rule);
    out
}

/// A small poem drawn over the ASCII art of the current view.
pub fn render_with_poetry(explorer: &mut PoetryExplorer, lines: usize) -> Result<String> {
    let poem = explorer.poem(lines)?;
    let state = *explorer.session().state();
    let config = explorer.config();
    let art = visualizer::render_ascii(&visualizer::sample_grid(
        &explorer.params,
        state.kind,
        Viewport::new(state.coordinate, state.zoom),
        config.ascii_width,
        config.ascii_height,
    ));
    Ok(format!(
        "# {}\n{}",
        poem.title(),
        visualizer::overlay_poem(&art, poem.lines(), config.ascii_width)
    ))
}

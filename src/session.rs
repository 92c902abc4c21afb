use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, Region};
use crate::error::{Error, Result};
use crate::fractal::{EscapeParams, FractalKind, find_nearby_interesting_points};
use crate::math::Coordinate;
use crate::poetry::Poem;

/// How many samples `random` draws before settling for a non-boundary point.
const RANDOM_JUMP_ATTEMPTS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(Error::invalid(format!("unknown direction: {}", other))),
        }
    }
}

/// Where the user is looking. Serialized flat as `{x, y, zoom, kind}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub zoom: f64,
    pub kind: FractalKind,
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState {
            coordinate: Coordinate::ORIGIN,
            zoom: 1.0,
            kind: FractalKind::Mandelbrot,
        }
    }
}

impl NavigationState {
    fn is_valid(&self) -> bool {
        self.coordinate.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({:.3}, {:.3}) zoom {:.1}x",
            self.kind,
            self.coordinate.x(),
            self.coordinate.y(),
            self.zoom
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Positioned,
}

/// What a history entry produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    State(NavigationState),
    Poem(Poem),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub outcome: Outcome,
    pub at: DateTime<Utc>,
}

/// Navigation bounds copied out of the config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub coordinate_limit: f64,
    pub region: Region,
}

impl Default for Limits {
    fn default() -> Self {
        Limits::from(&Config::default())
    }
}

impl Limits {
    /// Rejects states outside the coordinate box or the zoom range.
    pub fn check(&self, state: &NavigationState) -> Result<()> {
        if !state.is_valid() {
            return Err(Error::invalid("non-finite coordinate or non-positive zoom"));
        }
        let limit = self.coordinate_limit;
        if state.coordinate.x().abs() > limit || state.coordinate.y().abs() > limit {
            return Err(Error::invalid(format!("coordinates must lie within ±{}", limit)));
        }
        if state.zoom < self.min_zoom || state.zoom > self.max_zoom {
            return Err(Error::invalid(format!(
                "zoom must lie within [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}

impl From<&Config> for Limits {
    fn from(config: &Config) -> Self {
        Limits {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            coordinate_limit: config.coordinate_limit,
            region: config.interesting_region,
        }
    }
}

/// On-disk form of a session.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    created_at: DateTime<Utc>,
    seed: u64,
    current: NavigationState,
    bookmarks: BTreeMap<String, NavigationState>,
    history: Vec<HistoryEntry>,
}

pub struct Session {
    state: NavigationState,
    phase: Phase,
    bookmarks: BTreeMap<String, NavigationState>,
    history: Vec<HistoryEntry>,
    seed: u64,
    created_at: DateTime<Utc>,
    limits: Limits,
}

impl Session {
    pub fn new(seed: u64, limits: Limits) -> Self {
        Session {
            state: NavigationState::default(),
            phase: Phase::Idle,
            bookmarks: BTreeMap::new(),
            history: Vec::new(),
            seed,
            created_at: Utc::now(),
            limits,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn bookmarks(&self) -> &BTreeMap<String, NavigationState> {
        &self.bookmarks
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn push(&mut self, command: String, outcome: Outcome) {
        debug!(%command, "history entry");
        self.history.push(HistoryEntry { command, outcome, at: Utc::now() });
    }

    fn transition(&mut self, command: String, next: NavigationState) -> &NavigationState {
        self.state = next;
        self.phase = Phase::Positioned;
        self.push(command, Outcome::State(next));
        &self.state
    }

    /// Records an observation of the current state without changing it.
    pub fn record_state(&mut self, command: impl Into<String>) {
        let state = self.state;
        self.push(command.into(), Outcome::State(state));
    }

    pub fn record_poem(&mut self, command: impl Into<String>, poem: Poem) {
        self.push(command.into(), Outcome::Poem(poem));
    }

    /// Shifts by `step / zoom`, so the same step covers the same share of the view.
    pub fn move_by(&mut self, direction: Direction, step: f64) -> Result<&NavigationState> {
        finite("step", step)?;
        let (ux, uy) = direction.unit();
        let delta = step / self.state.zoom;
        let next = NavigationState {
            coordinate: self
                .state
                .coordinate
                .offset(ux * delta, uy * delta)
                .clamp(self.limits.coordinate_limit),
            ..self.state
        };
        Ok(self.transition(format!("{} {}", direction, step), next))
    }

    pub fn zoom_in(&mut self, factor: f64) -> Result<&NavigationState> {
        positive("zoom factor", factor)?;
        self.zoom_by(factor, format!("in {}", factor))
    }

    pub fn zoom_out(&mut self, factor: f64) -> Result<&NavigationState> {
        positive("zoom factor", factor)?;
        self.zoom_by(1.0 / factor, format!("out {}", factor))
    }

    /// Multiplies the zoom by `multiplier`, clamped to the configured bounds.
    fn zoom_by(&mut self, multiplier: f64, command: String) -> Result<&NavigationState> {
        positive("zoom multiplier", multiplier)?;
        let next = NavigationState {
            zoom: (self.state.zoom * multiplier).clamp(self.limits.min_zoom, self.limits.max_zoom),
            ..self.state
        };
        Ok(self.transition(command, next))
    }

    pub fn jump(&mut self, x: f64, y: f64, zoom: Option<f64>) -> Result<&NavigationState> {
        finite("x", x)?;
        finite("y", y)?;
        let zoom = match zoom {
            Some(z) => {
                positive("zoom", z)?;
                z
            }
            None => self.state.zoom,
        };

        let next = NavigationState {
            coordinate: Coordinate::new(x, y),
            zoom,
            ..self.state
        };
        self.limits.check(&next)?;
        Ok(self.transition(format!("jump {} {} {}", x, y, zoom), next))
    }

    pub fn switch_kind(&mut self, kind: FractalKind) -> &NavigationState {
        let next = NavigationState { kind, ..self.state };
        self.transition(kind.to_string(), next)
    }

    /// Samples the interesting region, preferring points near the set boundary.
    pub fn random_jump<R: Rng + ?Sized>(&mut self, params: &EscapeParams, rng: &mut R) -> &NavigationState {
        let region = self.limits.region;
        let kind = self.state.kind;
        let mut candidate = self.state.coordinate;
        let mut found = false;

        for attempt in 0..RANDOM_JUMP_ATTEMPTS {
            candidate = Coordinate::new(
                rng.gen_range(region.x_min..region.x_max),
                rng.gen_range(region.y_min..region.y_max),
            );
            if params.evaluate(candidate, kind).is_interesting() {
                debug!(attempt, "found boundary point");
                found = true;
                break;
            }
        }

        if !found {
            let nearby = find_nearby_interesting_points(params, candidate, kind, 0.25, RANDOM_JUMP_ATTEMPTS);
            if let Some(point) = nearby.into_iter().find(|p| region.contains(*p)) {
                candidate = point;
            }
        }

        let next = NavigationState { coordinate: candidate, ..self.state };
        self.transition("random".to_string(), next)
    }

    /// Overwrites any bookmark already saved under `name`.
    pub fn save_bookmark(&mut self, name: &str) -> Result<&NavigationState> {
        if name.trim().is_empty() {
            return Err(Error::invalid("bookmark name must not be empty"));
        }
        self.bookmarks.insert(name.to_string(), self.state);
        info!(name, "bookmark saved");
        Ok(&self.state)
    }

    pub fn load_bookmark(&mut self, name: &str) -> Result<&NavigationState> {
        let snapshot = *self
            .bookmarks
            .get(name)
            .ok_or_else(|| Error::UnknownBookmark(name.to_string()))?;
        Ok(self.transition(format!("load {}", name), snapshot))
    }

    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = SessionFile {
            created_at: self.created_at,
            seed: self.seed,
            current: self.state,
            bookmarks: self.bookmarks.clone(),
            history: self.history.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        info!(
            path = %path.display(),
            bookmarks = self.bookmarks.len(),
            history = self.history.len(),
            "session exported"
        );
        Ok(())
    }

    pub fn import<P: AsRef<Path>>(path: P, limits: Limits) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file: SessionFile = serde_json::from_str(&text)?;

        limits
            .check(&file.current)
            .map_err(|e| Error::invalid(format!("{}: current position: {}", path.display(), e)))?;
        for (name, state) in &file.bookmarks {
            limits
                .check(state)
                .map_err(|e| Error::invalid(format!("{}: bookmark '{}': {}", path.display(), name, e)))?;
        }

        info!(
            path = %path.display(),
            bookmarks = file.bookmarks.len(),
            history = file.history.len(),
            "session imported"
        );
        Ok(Session {
            state: file.current,
            phase: Phase::Positioned,
            bookmarks: file.bookmarks,
            history: file.history,
            seed: file.seed,
            created_at: file.created_at,
            limits,
        })
    }
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("{} must be a finite number", name)))
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("{} must be a positive number", name)))
    }
}

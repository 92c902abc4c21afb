//! Turns escape-time metrics into short templated poems.
//!
//! Three features are read off a [`FractalResult`] and its coordinate: how
//! fast the point escaped, how large its final modulus was, and which
//! quadrant it sits in. Each feature selects a band in a vocabulary table;
//! the injected RNG then picks a template and one word per slot from the
//! selected bands.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fractal::{FractalKind, FractalResult};
use crate::math::Coordinate;

pub const DEFAULT_MAX_LINES: usize = 50;

/// Upper edges of the magnitude bands; anything above the last is band 4.
const MAGNITUDE_EDGES: [f64; 4] = [0.5, 1.0, 2.0, 4.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedBand {
    /// Never escaped.
    Captive,
    Lingering,
    Restless,
    Fleeting,
}

impl SpeedBand {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features {
    pub escape_ratio: f64,
    pub speed: SpeedBand,
    pub magnitude_band: usize,
    pub quadrant: usize,
}

impl Features {
    pub fn extract(result: &FractalResult, coord: Coordinate) -> Self {
        let escape_ratio = result.stability();
        let speed = if !result.escaped {
            SpeedBand::Captive
        } else if escape_ratio >= 0.5 {
            SpeedBand::Lingering
        } else if escape_ratio >= 0.1 {
            SpeedBand::Restless
        } else {
            SpeedBand::Fleeting
        };

        let magnitude_band = MAGNITUDE_EDGES
            .iter()
            .position(|edge| result.magnitude < *edge)
            .unwrap_or(MAGNITUDE_EDGES.len());

        Features {
            escape_ratio,
            speed,
            magnitude_band,
            quadrant: coord.quadrant(),
        }
    }
}

// Vocabulary, one row per band.

const SUBJECTS: [&[&str]; 4] = [
    &["river", "dawn", "meadow", "spring"],
    &["mountain", "wind", "summit", "sky"],
    &["ocean", "twilight", "harbor", "tide"],
    &["forest", "storm", "root", "ember"],
];

const VERBS: [&[&str]; 5] = [
    &["rests", "lingers", "settles", "sleeps"],
    &["flows", "unfolds", "breathes", "drifts"],
    &["spirals", "emerges", "turns", "trembles"],
    &["cascades", "transforms", "surges", "burns"],
    &["scatters", "shatters", "erupts", "flees"],
];

const ADJECTIVES: [&[&str]; 4] = [
    &["infinite", "eternal", "boundless", "celestial"],
    &["elegant", "intricate", "delicate", "graceful"],
    &["swirling", "turbulent", "spiraling", "dancing"],
    &["chaotic", "writhing", "fleeting", "restless"],
];

const MOODS: [&[&str]; 4] = [
    &["serenity", "wonder", "stillness", "devotion"],
    &["mystery", "yearning", "reverie", "longing"],
    &["passion", "fever", "hunger", "daring"],
    &["melancholy", "farewell", "abandon", "sorrow"],
];

const TIMES: [&[&str]; 5] = [
    &["eternity", "an endless hour"],
    &["every cycle", "the slow years"],
    &["each moment", "the turning hours"],
    &["a single instant", "the rushing seconds"],
    &["one heartbeat", "a broken instant"],
];

const THEMES: [&[&str]; 4] = [
    &["Eternity", "Stillness", "Infinity"],
    &["Reverie", "Filigree", "Mystery"],
    &["Vortex", "Spiral", "Tempest"],
    &["Flight", "Scattering", "Exodus"],
];

#[derive(Clone, Copy, Debug)]
enum Slot {
    Adjective,
    Subject,
    Verb,
    Mood,
    Time,
}

#[derive(Clone, Copy, Debug)]
enum Piece {
    Text(&'static str),
    Slot(Slot),
}

use Piece::{Slot as S, Text as T};

const TEMPLATES: &[&[Piece]] = &[
    &[T("in the "), S(Slot::Adjective), T(" "), S(Slot::Subject), T(", "), S(Slot::Mood), T(" "), S(Slot::Verb)],
    &[T("where "), S(Slot::Adjective), T(" patterns meet, the "), S(Slot::Subject), T(" "), S(Slot::Verb)],
    &[T("through "), S(Slot::Time), T(", the "), S(Slot::Adjective), T(" "), S(Slot::Subject), T(" "), S(Slot::Verb)],
    &[S(Slot::Adjective), T(" "), S(Slot::Mood), T(" "), S(Slot::Verb), T(" within the "), S(Slot::Subject)],
    &[T("as the "), S(Slot::Subject), T(" "), S(Slot::Verb), T(" through "), S(Slot::Time), T(", "), S(Slot::Mood), T(" awakens")],
];

fn pick<R: Rng + ?Sized>(words: &[&'static str], rng: &mut R) -> &'static str {
    words[rng.gen_range(0..words.len())]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A finished poem. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    title: String,
    lines: Vec<String>,
}

impl Poem {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Poem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Derives the generator for a poem from the session seed and the point.
///
/// Same seed, coordinate and kind give the same generator and so the same
/// poem, which is what makes bookmark replay reproducible.
pub fn poem_rng(seed: u64, coord: Coordinate, kind: FractalKind) -> StdRng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    coord.x().to_bits().hash(&mut hasher);
    coord.y().to_bits().hash(&mut hasher);
    kind.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

/// Haiku fragment for a single point, used by the explorer view.
pub fn essence(result: &FractalResult) -> &'static str {
    if !result.escaped {
        "infinite depth"
    } else if result.iterations < 10 {
        "chaos blooms"
    } else if result.iterations < 30 {
        "patterns dance"
    } else {
        "order emerges"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoetryMapper {
    max_lines: usize,
}

impl Default for PoetryMapper {
    fn default() -> Self {
        PoetryMapper { max_lines: DEFAULT_MAX_LINES }
    }
}

impl PoetryMapper {
    pub fn new(max_lines: usize) -> Self {
        PoetryMapper { max_lines: max_lines.max(1) }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    fn checked_line_count(&self, line_count: usize) -> Result<usize> {
        if line_count == 0 {
            return Err(Error::invalid("line count must be at least 1"));
        }
        if line_count > self.max_lines {
            warn!(requested = line_count, cap = self.max_lines, "line count capped");
            return Ok(self.max_lines);
        }
        Ok(line_count)
    }

    pub fn generate_poem<R: Rng + ?Sized>(
        &self,
        result: &FractalResult,
        coord: Coordinate,
        line_count: usize,
        rng: &mut R,
    ) -> Result<Poem> {
        let line_count = self.checked_line_count(line_count)?;
        let features = Features::extract(result, coord);
        debug!(?features, line_count, "generating poem");

        let title = format!(
            "{}: {}",
            result.kind.display_name(),
            pick(THEMES[features.speed.index()], rng)
        );
        let lines = (0..line_count).map(|_| self.line(&features, rng)).collect();

        Ok(Poem { title, lines })
    }

    /// One line per sample, in order. Used for journeys through several points.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        title: impl Into<String>,
        samples: &[(Coordinate, FractalResult)],
        rng: &mut R,
    ) -> Result<Poem> {
        let line_count = self.checked_line_count(samples.len())?;
        let lines = samples
            .iter()
            .take(line_count)
            .map(|(coord, result)| self.line(&Features::extract(result, *coord), rng))
            .collect();

        Ok(Poem { title: title.into(), lines })
    }

    fn line<R: Rng + ?Sized>(&self, features: &Features, rng: &mut R) -> String {
        let template = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        let mut line = String::new();

        for piece in template.iter() {
            match piece {
                Piece::Text(text) => line.push_str(text),
                Piece::Slot(slot) => {
                    let words = match slot {
                        Slot::Adjective => ADJECTIVES[features.speed.index()],
                        Slot::Subject => SUBJECTS[features.quadrant],
                        Slot::Verb => VERBS[features.magnitude_band],
                        Slot::Mood => MOODS[features.speed.index()],
                        Slot::Time => TIMES[features.magnitude_band],
                    };
                    line.push_str(pick(words, rng));
                }
            }
        }

        let mut line = capitalize(&line);
        line.push('.');
        line
    }
}

/// [`PoetryMapper::generate_poem`] with the default line cap.
pub fn generate_poem<R: Rng + ?Sized>(
    result: &FractalResult,
    coord: Coordinate,
    line_count: usize,
    rng: &mut R,
) -> Result<Poem> {
    PoetryMapper::default().generate_poem(result, coord, line_count, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::evaluate;

    fn origin_result() -> FractalResult {
        evaluate(Coordinate::ORIGIN, FractalKind::Mandelbrot, 100, 2.0)
    }

    #[test]
    fn origin_poem_has_title_and_four_lines() {
        let mut rng = poem_rng(7, Coordinate::ORIGIN, FractalKind::Mandelbrot);
        let poem = generate_poem(&origin_result(), Coordinate::ORIGIN, 4, &mut rng).unwrap();

        assert!(poem.title().contains("Mandelbrot"));
        assert_eq!(poem.lines().len(), 4);
        assert!(poem.lines().iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn zero_lines_is_invalid() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_poem(&origin_result(), Coordinate::ORIGIN, 0, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn line_count_is_capped() {
        let mapper = PoetryMapper::new(5);
        let mut rng = StdRng::seed_from_u64(1);
        let poem = mapper.generate_poem(&origin_result(), Coordinate::ORIGIN, 12, &mut rng).unwrap();
        assert_eq!(poem.lines().len(), 5);
    }

    #[test]
    fn same_seed_same_poem() {
        let coord = Coordinate::new(-0.16, 1.04);
        let result = evaluate(coord, FractalKind::Mandelbrot, 100, 2.0);

        let a = generate_poem(&result, coord, 8, &mut poem_rng(42, coord, FractalKind::Mandelbrot)).unwrap();
        let b = generate_poem(&result, coord, 8, &mut poem_rng(42, coord, FractalKind::Mandelbrot)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn seeds_vary_the_poem() {
        let coord = Coordinate::new(-0.7, 0.3);
        let result = evaluate(coord, FractalKind::Mandelbrot, 100, 2.0);
        let first = generate_poem(&result, coord, 8, &mut poem_rng(0, coord, FractalKind::Mandelbrot)).unwrap();

        let any_different = (1..10).any(|seed| {
            let other = generate_poem(&result, coord, 8, &mut poem_rng(seed, coord, FractalKind::Mandelbrot)).unwrap();
            other != first
        });
        assert!(any_different);
    }

    #[test]
    fn lines_are_complete_sentences() {
        let mut rng = StdRng::seed_from_u64(3);
        let poem = generate_poem(&origin_result(), Coordinate::ORIGIN, 20, &mut rng).unwrap();
        for line in poem.lines() {
            assert!(line.chars().next().unwrap().is_uppercase(), "{}", line);
            assert!(line.ends_with('.'), "{}", line);
        }
    }

    #[test]
    fn captive_points_use_captive_vocabulary() {
        let features = Features::extract(&origin_result(), Coordinate::ORIGIN);
        assert_eq!(features.speed, SpeedBand::Captive);
        assert_eq!(features.magnitude_band, 0);
        assert_eq!(features.quadrant, 0);
        assert_eq!(features.escape_ratio, 1.0);
    }

    #[test]
    fn fast_escape_is_fleeting() {
        let coord = Coordinate::new(3.0, 3.0);
        let result = evaluate(coord, FractalKind::Mandelbrot, 100, 2.0);
        let features = Features::extract(&result, coord);
        assert_eq!(features.speed, SpeedBand::Fleeting);
        assert_eq!(features.magnitude_band, 4);
    }

    #[test]
    fn essence_follows_escape_time() {
        assert_eq!(essence(&origin_result()), "infinite depth");
        let far = evaluate(Coordinate::new(3.0, 0.0), FractalKind::Mandelbrot, 100, 2.0);
        assert_eq!(essence(&far), "chaos blooms");
    }

    #[test]
    fn compose_writes_one_line_per_sample() {
        let samples: Vec<_> = [(-0.5, 0.0), (0.3, 0.5), (-1.0, 0.2)]
            .iter()
            .map(|&(x, y)| {
                let c = Coordinate::new(x, y);
                (c, evaluate(c, FractalKind::Mandelbrot, 100, 2.0))
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(9);
        let poem = PoetryMapper::default().compose("Journey", &samples, &mut rng).unwrap();
        assert_eq!(poem.title(), "Journey");
        assert_eq!(poem.lines().len(), 3);
    }

    #[test]
    fn display_puts_title_first() {
        let mut rng = StdRng::seed_from_u64(5);
        let poem = generate_poem(&origin_result(), Coordinate::ORIGIN, 2, &mut rng).unwrap();
        let text = poem.to_string();
        assert!(text.starts_with("# Mandelbrot: "));
        assert_eq!(text.lines().count(), 4);
    }
}

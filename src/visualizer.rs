use crate::fractal::{EscapeParams, FractalKind, FractalResult};
use crate::math::Coordinate;

const GRADIENT: &str = " .'`^\",:;Il!i><~+_-?][}{1)(|\\/*tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

// red, yellow, green, cyan, blue, magenta
const ANSI_HUES: [u8; 6] = [31, 33, 32, 36, 34, 35];
const ANSI_RESET: &str = "\x1b[0m";

/// The square of the plane shown around a center at a given zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Viewport { center, zoom }
    }

    /// Half the side length of the visible square.
    pub fn half_size(&self) -> f64 {
        2.0 / self.zoom
    }

    /// Coordinate at grid cell (col, row), top-left origin, rows growing down in y.
    pub fn point_at(&self, col: usize, row: usize, width: usize, height: usize) -> Coordinate {
        let size = self.half_size();
        let x = self.center.x() - size + 2.0 * size * col as f64 / width.max(1) as f64;
        let y = self.center.y() - size + 2.0 * size * row as f64 / height.max(1) as f64;
        Coordinate::new(x, y)
    }
}

/// Evaluates every cell of a width x height grid over the viewport.
pub fn sample_grid(
    params: &EscapeParams,
    kind: FractalKind,
    viewport: Viewport,
    width: usize,
    height: usize,
) -> Vec<Vec<FractalResult>> {
    (0..height)
        .map(|row| {
            (0..width)
                .map(|col| params.evaluate(viewport.point_at(col, row, width, height), kind))
                .collect()
        })
        .collect()
}

pub fn ascii_char(result: &FractalResult) -> char {
    let ramp = GRADIENT.as_bytes();
    let last = ramp.len() - 1;
    let idx = if result.escaped && result.max_iterations > 0 {
        (result.iterations as usize * ramp.len() / result.max_iterations as usize).min(last)
    } else {
        last
    };
    ramp[idx] as char
}

pub fn render_ascii(grid: &[Vec<FractalResult>]) -> Vec<String> {
    grid.iter()
        .map(|row| row.iter().map(ascii_char).collect())
        .collect()
}

fn ansi_code(result: &FractalResult) -> String {
    let (hue, value) = if result.escaped {
        (result.stability() % 1.0, 0.8)
    } else {
        (result.magnitude % 1.0, 0.3)
    };

    let color = ANSI_HUES[(hue * ANSI_HUES.len() as f64) as usize % ANSI_HUES.len()];
    if value > 0.7 {
        format!("\x1b[1;{}m", color)
    } else {
        format!("\x1b[{}m", color)
    }
}

pub fn render_ansi(grid: &[Vec<FractalResult>]) -> String {
    grid.iter()
        .map(|row| {
            row.iter()
                .map(|result| format!("{}█{}", ansi_code(result), ANSI_RESET))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces evenly spaced rows of the ASCII art with centered poem lines.
pub fn overlay_poem(art: &[String], poem_lines: &[String], width: usize) -> String {
    let stride = (art.len() / poem_lines.len().max(1)).max(1);
    let mut next_line = 0;
    let mut out = Vec::with_capacity(art.len());

    for (i, row) in art.iter().enumerate() {
        if i % stride == 0 && next_line < poem_lines.len() {
            let mut line = poem_lines[next_line].clone();
            if line.chars().count() > width && width > 3 {
                line = line.chars().take(width - 3).collect::<String>() + "...";
            }
            let padding = width.saturating_sub(line.chars().count()) / 2;
            out.push(format!("{}{}", " ".repeat(padding), line));
            next_line += 1;
        } else {
            out.push(row.clone());
        }
    }

    out.join("\n")
}

/// Concentric trigonometric pattern; pure decoration.
pub fn mandala(size: usize) -> String {
    let center = (size / 2) as f64;
    (0..size)
        .map(|row| {
            (0..size)
                .map(|col| {
                    let dx = col as f64 - center;
                    let dy = row as f64 - center;
                    let distance = (dx * dx + dy * dy).sqrt();
                    let angle = dy.atan2(dx);
                    let v = (distance * 0.5).sin()
                        * (angle * 3.0).cos()
                        * (angle * 5.0 + distance * 0.3).sin();

                    if v > 0.3 {
                        '●'
                    } else if v > 0.0 {
                        '○'
                    } else if v > -0.3 {
                        '·'
                    } else {
                        ' '
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

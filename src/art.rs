// Image export: renders a viewport to a PNG using a named color palette.

use std::path::Path;

use image::{Rgb, RgbImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::fractal::{EscapeParams, FractalKind};
use crate::visualizer::Viewport;

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub name: &'static str,
    pub colors: &'static [[u8; 3]],
}

pub const PALETTES: &[Palette] = &[
    Palette {
        name: "fire",
        colors: &[[0, 0, 0], [64, 0, 0], [128, 0, 0], [255, 0, 0], [255, 128, 0], [255, 255, 0], [255, 255, 255]],
    },
    Palette {
        name: "ocean",
        colors: &[[0, 0, 64], [0, 64, 128], [0, 128, 255], [64, 192, 255], [128, 224, 255], [255, 255, 255]],
    },
    Palette {
        name: "cosmic",
        colors: &[[0, 0, 0], [32, 0, 64], [64, 0, 128], [128, 0, 255], [255, 0, 255], [255, 128, 255], [255, 255, 255]],
    },
    Palette {
        name: "forest",
        colors: &[[0, 32, 0], [0, 64, 0], [0, 128, 0], [64, 192, 64], [128, 255, 128], [192, 255, 192], [255, 255, 255]],
    },
    Palette {
        name: "sunset",
        colors: &[[64, 0, 64], [128, 0, 64], [255, 64, 0], [255, 128, 0], [255, 192, 64], [255, 255, 128]],
    },
];

impl Palette {
    pub fn by_name(name: &str) -> Result<Palette> {
        PALETTES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = PALETTES.iter().map(|p| p.name).collect();
                Error::invalid(format!("unknown palette '{}' (try {})", name, names.join(", ")))
            })
    }

    /// Linear interpolation along the palette, `t` clamped to [0, 1].
    pub fn color_at(&self, t: f64) -> [u8; 3] {
        match self.colors {
            [] => [0, 0, 0],
            [only] => *only,
            colors => {
                let scaled = t.clamp(0.0, 1.0) * (colors.len() - 1) as f64;
                let idx = scaled as usize;
                if idx >= colors.len() - 1 {
                    return colors[colors.len() - 1];
                }
                let frac = scaled - idx as f64;
                let (a, b) = (colors[idx], colors[idx + 1]);
                let lerp = |i: usize| (a[i] as f64 + frac * (b[i] as f64 - a[i] as f64)) as u8;
                [lerp(0), lerp(1), lerp(2)]
            }
        }
    }
}

pub fn render_image(
    params: &EscapeParams,
    kind: FractalKind,
    viewport: Viewport,
    width: u32,
    height: u32,
    palette: &Palette,
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let point = viewport.point_at(x as usize, y as usize, width as usize, height as usize);
        let result = params.evaluate(point, kind);
        let t = if result.escaped {
            (result.stability() + result.magnitude * 0.1) % 1.0
        } else {
            0.0
        };
        Rgb(palette.color_at(t))
    })
}

pub fn export_png<P: AsRef<Path>>(
    path: P,
    params: &EscapeParams,
    kind: FractalKind,
    viewport: Viewport,
    (width, height): (u32, u32),
    palette: &Palette,
) -> Result<()> {
    let path = path.as_ref();
    if width == 0 || height == 0 {
        return Err(Error::invalid("image dimensions must be non-zero"));
    }
    let img = render_image(params, kind, viewport, width, height, palette);
    img.save(path)?;
    info!(path = %path.display(), palette = palette.name, width, height, "exported image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Coordinate;

    #[test]
    fn palette_endpoints() {
        let fire = Palette::by_name("fire").unwrap();
        assert_eq!(fire.color_at(0.0), [0, 0, 0]);
        assert_eq!(fire.color_at(1.0), [255, 255, 255]);
        assert_eq!(fire.color_at(7.0), [255, 255, 255]);
    }

    #[test]
    fn palette_interpolates_between_stops() {
        let ocean = Palette::by_name("Ocean").unwrap();
        // halfway between stop 0 and 1 of 6 stops
        let c = ocean.color_at(0.1);
        assert_eq!(c, [0, 32, 96]);
    }

    #[test]
    fn unknown_palette_is_invalid() {
        assert!(matches!(Palette::by_name("neon"), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn interior_pixels_use_first_color() {
        let img = render_image(
            &EscapeParams::default(),
            FractalKind::Mandelbrot,
            Viewport::new(Coordinate::ORIGIN, 1000.0),
            3,
            3,
            &Palette::by_name("sunset").unwrap(),
        );
        assert_eq!(img.get_pixel(1, 1), &Rgb([64, 0, 64]));
    }
}

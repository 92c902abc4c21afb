use proptest::prelude::*;

use fractal_poetry::{Coordinate, FractalKind, evaluate, generate_poem, poem_rng};

fn kind() -> impl Strategy<Value = FractalKind> {
    prop_oneof![Just(FractalKind::Mandelbrot), Just(FractalKind::Julia)]
}

proptest! {
    #[test]
    fn far_mandelbrot_points_escape_at_once(
        angle in 0.0f64..std::f64::consts::TAU,
        r in 2.001f64..50.0,
        max in 2u32..500,
    ) {
        let c = Coordinate::new(r * angle.cos(), r * angle.sin());
        let result = evaluate(c, FractalKind::Mandelbrot, max, 2.0);
        prop_assert!(result.escaped);
        prop_assert!(result.iterations <= 1);
    }

    #[test]
    fn origin_is_a_fixed_point(max in 0u32..2000) {
        let result = evaluate(Coordinate::ORIGIN, FractalKind::Mandelbrot, max, 2.0);
        prop_assert!(!result.escaped);
        prop_assert_eq!(result.iterations, max);
    }

    #[test]
    fn escape_metrics_respect_bailout(
        x in -3.0f64..3.0,
        y in -3.0f64..3.0,
        k in kind(),
        max in 1u32..300,
        bailout in 0.5f64..10.0,
    ) {
        let result = evaluate(Coordinate::new(x, y), k, max, bailout);
        prop_assert!(result.iterations <= max);
        if result.escaped {
            prop_assert!(result.iterations < max);
            prop_assert!(result.magnitude > bailout);
        } else {
            prop_assert_eq!(result.iterations, max);
            prop_assert!(result.magnitude <= bailout);
        }
    }

    #[test]
    fn poems_have_exactly_the_requested_lines(
        x in -2.5f64..1.5,
        y in -1.5f64..1.5,
        k in kind(),
        lines in 1usize..=50,
        seed in any::<u64>(),
    ) {
        let coord = Coordinate::new(x, y);
        let result = evaluate(coord, k, 100, 2.0);
        let poem = generate_poem(&result, coord, lines, &mut poem_rng(seed, coord, k)).unwrap();
        prop_assert_eq!(poem.lines().len(), lines);
        prop_assert!(poem.lines().iter().all(|l| !l.trim().is_empty()));
        prop_assert!(poem.title().starts_with(k.display_name()));
    }

    #[test]
    fn poems_are_deterministic(
        x in -2.5f64..1.5,
        y in -1.5f64..1.5,
        k in kind(),
        seed in any::<u64>(),
    ) {
        let coord = Coordinate::new(x, y);
        let result = evaluate(coord, k, 100, 2.0);
        let a = generate_poem(&result, coord, 6, &mut poem_rng(seed, coord, k)).unwrap();
        let b = generate_poem(&result, coord, 6, &mut poem_rng(seed, coord, k)).unwrap();
        prop_assert_eq!(a.to_string(), b.to_string());
    }
}

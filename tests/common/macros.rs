/// Asserts two floats agree within an absolute tolerance (default `1e-9`).
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-9)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $tol,
            "{} = {} is not within {} of {}",
            stringify!($left),
            l,
            $tol,
            r
        );
    }};
}

/// Asserts every particle lies inside `[0, width] x [0, height]`.
#[macro_export]
macro_rules! assert_in_bounds {
    ($engine:expr) => {{
        let surface = $engine.config().surface;
        for p in $engine.particles() {
            assert!(
                p.x >= 0.0 && p.x <= surface.width && p.y >= 0.0 && p.y <= surface.height,
                "Particle {} at ({}, {}) outside {}x{}",
                p.id,
                p.x,
                p.y,
                surface.width,
                surface.height
            );
        }
    }};
}

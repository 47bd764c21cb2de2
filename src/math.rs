use num::Float;

/// Similar to numpy.interp: piecewise linear interpolation of `x_input`
/// over the sorted `coords`, holding the edge values outside of them.
pub(crate) fn interp<F: Float>(
    x_input: impl IntoIterator<Item = F>,
    coords: impl IntoIterator<Item = (F, F)> + Clone,
) -> Vec<F> {
    x_input
        .into_iter()
        .map(|x| interp_one(x, coords.clone()))
        .collect()
}

fn interp_one<F: Float>(x: F, coords: impl IntoIterator<Item = (F, F)>) -> F {
    let mut iter = coords.into_iter().enumerate().peekable();

    while let Some((i, (x1, y1))) = iter.next() {
        // Sample points come back exactly, without going through the slope
        if x == x1 || (i == 0 && x < x1) {
            return y1;
        }

        match iter.peek() {
            None if x > x1 => return y1,
            Some(&(_, (x2, y2))) if x1 < x && x < x2 => {
                return y1 + (x - x1) * (y2 - y1) / (x2 - x1);
            },
            _ => {},
        }
    }

    // Only reachable for NaN inputs or empty coordinates
    F::nan()
}

/// Trapezoidal membership: 0 below `a`, rising to 1 at `b`, flat until `c`,
/// falling back to 0 at `d`. Degenerate edges (`a == b`, `c == d`) are steps.
pub(crate) fn trapmf<F: Float>(x: F, [a, b, c, d]: [F; 4]) -> F {
    if b <= x && x <= c {
        F::one()
    } else if x <= a || x >= d {
        F::zero()
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}

#[test]
fn test_interp() {
    let x = [0., 1., 1.5, 2.72, 3.24];
    let xs = [1., 2., 3.];
    let ys = [3., 2., 0.];

    assert_eq!(
        interp(x, xs.into_iter().zip(ys)),
        vec![3., 3., 2.5, 0.5599999999999996, 0.]
    );

    let x = [2.5, -1., 7.5];
    let xs = [0., 1., 2., 3., 4.5];
    let ys = [0., 2., 5., 3., 2.];

    assert_eq!(interp(x, xs.into_iter().zip(ys)), vec![4., 0., 2.]);
}

#[test]
fn test_interp_nan() {
    let out = interp(Some(f64::NAN), [(0., 0.), (1., 1.)]);

    assert!(out[0].is_nan());
}

#[test]
fn test_trapmf() {
    let normal = [50., 70., 90., 110.];

    assert_eq!(trapmf(40., normal), 0.);
    assert_eq!(trapmf(50., normal), 0.);
    assert_eq!(trapmf(60., normal), 0.5);
    assert_eq!(trapmf(70., normal), 1.);
    assert_eq!(trapmf(90., normal), 1.);
    assert_eq!(trapmf(105., normal), 0.25);
    assert_eq!(trapmf(110., normal), 0.);

    // Shoulders keep their flat top at the degenerate edge
    let cold = [0., 0., 25., 60.];

    assert_eq!(trapmf(0., cold), 1.);
    assert_eq!(trapmf(-1., cold), 0.);
    let hot = [90., 110., 120., 120.];

    assert_eq!(trapmf(120., hot), 1.);
    assert_eq!(trapmf(121., hot), 0.);
}

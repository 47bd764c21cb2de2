/// Evenly spaced samples over a closed interval, computed like `numpy.linspace`.
pub(crate) struct Linspace {
    start: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub(crate) fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 {
            let num_steps = (n - 1) as f64;
            (max - min) / num_steps
        } else {
            0.
        };
        Linspace {
            start: min,
            step,
            index: 0,
            len: n,
        }
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

#[test]
fn test_linspace_integer_steps() {
    let points: Vec<_> = Linspace::new(0., 120., 121).collect();

    assert_eq!(points.len(), 121);
    assert_eq!(points[0], 0.);
    assert_eq!(points[70], 70.);
    assert_eq!(points[120], 120.);
}

#[test]
fn test_linspace_fractional() {
    let points: Vec<_> = Linspace::new(0., 1., 5).collect();

    assert_eq!(points, vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(Linspace::new(3., 7., 1).collect::<Vec<_>>(), vec![3.]);
    assert_eq!(Linspace::new(3., 7., 0).len(), 0);
}

pub use fixed_map::Key;
use fixed_map::Map as FixedMap;

use crate::math::trapmf;

/// The shape of a fuzzy set: corners `a <= b <= c <= d`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trapezoid {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Trapezoid {
    /// Corners are checked when the owning variable is built, not here.
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn corners(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Degree of membership of `x`, always in `[0, 1]`.
    pub fn membership(&self, x: f64) -> f64 {
        trapmf(x, self.corners())
    }

    pub(crate) fn check(&self, min: f64, max: f64) -> Result<(), String> {
        let corners = self.corners();

        if corners.iter().any(|c| !c.is_finite()) {
            return Err("corners must be finite".into());
        }
        if !(self.a <= self.b && self.b <= self.c && self.c <= self.d) {
            return Err("corners must satisfy a <= b <= c <= d".into());
        }
        if self.a < min || self.d > max {
            return Err(format!("corners must lie within the domain [{min}, {max}]"));
        }

        Ok(())
    }
}

/// Gives each term of a typed variable the name it is registered under.
pub trait TermName: Copy {
    fn name(self) -> &'static str;
}

/// The terms of one variable, keyed by an enum deriving [`Key`].
pub struct Terms<K: Key>(pub(crate) FixedMap<K, Trapezoid>);

impl<K: Key> Default for Terms<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Terms<K> {
    pub fn new() -> Self {
        Self(FixedMap::new())
    }

    pub fn insert(&mut self, key: K, shape: Trapezoid) {
        self.0.insert(key, shape);
    }

    pub fn get(&self, key: K) -> Option<&Trapezoid> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Key + TermName> Terms<K> {
    /// Flattens into the `(name, a, b, c, d)` rows a [`LinguisticVariable`] is built from.
    ///
    /// [`LinguisticVariable`]: crate::LinguisticVariable
    pub(crate) fn rows(&self) -> Vec<(&'static str, f64, f64, f64, f64)> {
        self.0
            .iter()
            .map(|(key, shape)| {
                let [a, b, c, d] = shape.corners();
                (key.name(), a, b, c, d)
            })
            .collect()
    }
}

#[test]
fn test_trapezoid_check() {
    assert!(Trapezoid::new(0., 0., 25., 60.).check(0., 120.).is_ok());
    assert!(Trapezoid::new(90., 110., 120., 120.).check(0., 120.).is_ok());
    assert!(Trapezoid::new(50., 40., 90., 110.).check(0., 120.).is_err());
    assert!(Trapezoid::new(50., 70., 90., 130.).check(0., 120.).is_err());
    assert!(Trapezoid::new(-5., 0., 10., 20.).check(0., 120.).is_err());
    assert!(Trapezoid::new(f64::NAN, 0., 10., 20.).check(0., 120.).is_err());
}

#[test]
fn test_typed_terms_rows() {
    #[derive(Clone, Copy, Debug, Eq, Hash, Key, PartialEq)]
    enum Level {
        Low,
        High,
    }

    impl TermName for Level {
        fn name(self) -> &'static str {
            match self {
                Self::Low => "low",
                Self::High => "high",
            }
        }
    }

    let mut terms = Terms::new();

    terms.insert(Level::High, Trapezoid::new(5., 8., 10., 10.));
    terms.insert(Level::Low, Trapezoid::new(0., 0., 2., 5.));

    assert_eq!(terms.len(), 2);
    assert_eq!(terms.get(Level::Low), Some(&Trapezoid::new(0., 0., 2., 5.)));
    // Rows come out in declaration order of the enum
    assert_eq!(
        terms.rows(),
        vec![("low", 0., 0., 2., 5.), ("high", 5., 8., 10., 10.)]
    );
}

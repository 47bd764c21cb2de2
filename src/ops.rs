use num::Float;

use crate::math::interp;

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if v == F::one() {
                    u
                } else if u == F::one() {
                    v
                } else {
                    F::zero()
                }
            },
        }
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if v == F::zero() {
                    u
                } else if u == F::zero() {
                    v
                } else {
                    F::one()
                }
            },
        }
    }
}

/// How a rule's firing strength shapes its consequent term.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImplicationOp {
    /// Mamdani: clip the term at the firing strength
    #[default]
    Min,
    /// Larsen: scale the term by the firing strength
    Prod,
}

impl ImplicationOp {
    pub fn call<F: Float>(self, strength: F, membership: &[F]) -> Vec<F> {
        membership
            .iter()
            .map(|m| match self {
                Self::Min => F::min(strength, *m),
                Self::Prod => strength * *m,
            })
            .collect()
    }
}

/// Method for aggregating the implied curves of every rule that targets the
/// same variable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AggregationOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl AggregationOp {
    /// Folds `implied` into `aggregated`, point by point.
    pub fn call<F: Float>(self, aggregated: &mut [F], implied: &[F]) {
        debug_assert_eq!(aggregated.len(), implied.len());

        for (acc, v) in aggregated.iter_mut().zip(implied) {
            *acc = match self {
                Self::Max => OrOp::Max.call(*acc, *v),
                Self::ProbOr => OrOp::ProbOr.call(*acc, *v),
                Self::BoundedSum => OrOp::BoundedSum.call(*acc, *v),
            };
        }
    }
}

/// Method for defuzzifcating the resulting membership function.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DefuzzificationOp {
    /// Center of gravity over the sample points: `Σ u·μ(u) / Σ μ(u)`
    #[default]
    Centroid,
    /// Point splitting the area under the piecewise linear curve in half
    Bisector,
    /// Mean of the values for which the membership function is maximum
    MeanOfMax,
    /// Smallest value for which the membership function is maximum
    SmallestOfMax,
    /// Largest value for which the membership function is maximum
    LargestOfMax,
}

impl DefuzzificationOp {
    /// Reduces `membership`, sampled over `universe`, to one crisp value.
    ///
    /// A curve with no area at all (every sample zero) has no center; it
    /// defuzzifies to exactly zero for every method.
    pub fn call<F: Float>(self, universe: &[F], membership: &[F]) -> F {
        debug_assert_eq!(universe.len(), membership.len());

        let total = membership.iter().fold(F::zero(), |acc, m| acc + *m);

        if total == F::zero() {
            return F::zero();
        }

        let samples = universe.iter().copied().zip(membership.iter().copied());

        match self {
            Self::Centroid => {
                let moment = samples.fold(F::zero(), |acc, (u, m)| acc + u * m);

                moment / total
            },
            Self::Bisector => {
                let two = F::one() + F::one();
                let half = universe
                    .windows(2)
                    .zip(membership.windows(2))
                    .fold(F::zero(), |acc, (u, m)| acc + (m[0] + m[1]) * (u[1] - u[0]) / two)
                    / two;
                let mut cum_area = F::zero();

                for (u, m) in universe.windows(2).zip(membership.windows(2)) {
                    let area = (m[0] + m[1]) * (u[1] - u[0]) / two;

                    if area > F::zero() && cum_area + area >= half {
                        let coords = [(cum_area, u[0]), (cum_area + area, u[1])];

                        return interp(Some(half), coords).into_iter().next().unwrap_or(u[1]);
                    }

                    cum_area = cum_area + area;
                }

                // A lone nonzero sample at the very edge has no area around it
                Self::MeanOfMax.call(universe, membership)
            },
            Self::MeanOfMax | Self::SmallestOfMax | Self::LargestOfMax => {
                let maximum = membership.iter().copied().fold(F::zero(), F::max);
                let mut at_max = samples.filter_map(|(u, m)| if m == maximum { Some(u) } else { None });

                match self {
                    Self::SmallestOfMax => at_max.next().unwrap_or_else(F::zero),
                    Self::LargestOfMax => at_max.last().unwrap_or_else(F::zero),
                    _ => {
                        let (count, sum) = at_max.fold((F::zero(), F::zero()), |(count, sum), u| {
                            (count + F::one(), sum + u)
                        });

                        sum / count
                    },
                }
            },
        }
    }
}

#[test]
fn test_norms() {
    assert_eq!(AndOp::Min.call(0.3, 0.8), 0.3);
    assert_eq!(AndOp::Prod.call(0.5, 0.5), 0.25);
    assert_eq!(AndOp::BoundedProd.call(0.3, 0.5), 0.);
    assert_eq!(AndOp::DrasticProd.call(0.3, 1.), 0.3);
    assert_eq!(AndOp::DrasticProd.call(0.3, 0.9), 0.);

    assert_eq!(OrOp::Max.call(0.3, 0.8), 0.8);
    assert_eq!(OrOp::ProbOr.call(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.call(0.7, 0.5), 1.);
    assert_eq!(OrOp::DrasticSum.call(0.3, 0.), 0.3);
    assert_eq!(OrOp::DrasticSum.call(0.3, 0.1), 1.);
}

#[test]
fn test_implication() {
    let term = [0., 0.5, 1., 1., 0.25];

    assert_eq!(ImplicationOp::Min.call(0.6, &term), vec![0., 0.5, 0.6, 0.6, 0.25]);
    assert_eq!(ImplicationOp::Prod.call(0.5, &term), vec![0., 0.25, 0.5, 0.5, 0.125]);
    assert_eq!(ImplicationOp::Min.call(0., &term), vec![0.; 5]);
}

#[test]
fn test_aggregation() {
    let mut agg = vec![0.; 4];

    AggregationOp::Max.call(&mut agg, &[0.2, 0.6, 0., 0.]);
    AggregationOp::Max.call(&mut agg, &[0., 0.4, 0.5, 0.]);

    assert_eq!(agg, vec![0.2, 0.6, 0.5, 0.]);

    // Order of the rules does not matter
    let mut reversed = vec![0.; 4];

    AggregationOp::Max.call(&mut reversed, &[0., 0.4, 0.5, 0.]);
    AggregationOp::Max.call(&mut reversed, &[0.2, 0.6, 0., 0.]);

    assert_eq!(agg, reversed);
}

#[test]
fn test_defuzzification() {
    let universe = [0., 1., 2., 3., 4.];
    let membership = [0., 1., 1., 0., 0.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &membership), 1.5);
    assert_eq!(DefuzzificationOp::Bisector.call(&universe, &membership), 1.5);
    assert_eq!(DefuzzificationOp::MeanOfMax.call(&universe, &membership), 1.5);
    assert_eq!(DefuzzificationOp::SmallestOfMax.call(&universe, &membership), 1.);
    assert_eq!(DefuzzificationOp::LargestOfMax.call(&universe, &membership), 2.);

    let skewed = [0., 0.5, 1., 0., 0.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &skewed), 2.5 / 1.5);
    assert_eq!(DefuzzificationOp::SmallestOfMax.call(&universe, &skewed), 2.);
}

#[test]
fn test_defuzzification_of_empty_curve() {
    let universe = [0., 1., 2., 3.];
    let membership = [0.; 4];

    for op in [
        DefuzzificationOp::Centroid,
        DefuzzificationOp::Bisector,
        DefuzzificationOp::MeanOfMax,
        DefuzzificationOp::SmallestOfMax,
        DefuzzificationOp::LargestOfMax,
    ] {
        let crisp = op.call(&universe, &membership);

        assert_eq!(crisp, 0., "{op:?}");
        assert!(!crisp.is_nan());
    }
}

/// Action spaces for the cart-pole variants.

pub mod space;

use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand_distr::Normal;

pub use space::Space;

/// A discrete space of integers in [0, n).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    n: u32,
}

impl Discrete {
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "Discrete space requires n > 0");
        Self { n }
    }

    pub fn n(&self) -> u32 { self.n }
}

impl Space for Discrete {
    type Element = u32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        if self.n == 1 { return 0; }
        Uniform::from(0..self.n).sample(rng)
    }

    fn contains(&self, elem: &Self::Element) -> bool { *elem < self.n }
}

/// An unbounded real vector space of fixed length whose samples are drawn
/// independently from `Normal(0, std)`.
///
/// Any finite vector of the right length is a member.
#[derive(Clone, Debug)]
pub struct GaussianSpace {
    n: usize,
    normal: Normal<f64>,
}

impl GaussianSpace {
    pub fn new(n: usize, std: f64) -> Self {
        assert!(n > 0, "GaussianSpace requires n > 0");
        let normal = match Normal::new(0.0, std) {
            Ok(normal) => normal,
            Err(e) => panic!("GaussianSpace requires a finite, non-negative std: {e}"),
        };
        Self { n, normal }
    }

    pub fn n(&self) -> usize { self.n }

    pub fn std(&self) -> f64 { self.normal.std_dev() }
}

impl PartialEq for GaussianSpace {
    fn eq(&self, other: &Self) -> bool { self.n == other.n && self.std() == other.std() }
}

impl Space for GaussianSpace {
    type Element = Vec<f64>;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        (0..self.n).map(|_| self.normal.sample(rng)).collect()
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        elem.len() == self.n && elem.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::rng_from_seed;

    #[test]
    fn discrete_samples_both_actions() {
        let d = Discrete::new(2);
        let mut rng = rng_from_seed(42);
        let samples: Vec<u32> = (0..200).map(|_| d.sample(&mut rng)).collect();
        assert!(samples.iter().all(|v| d.contains(v)));
        assert!(samples.contains(&0) && samples.contains(&1));
        assert!(!d.contains(&2));
    }

    #[test]
    fn gaussian_samples_have_expected_spread() {
        let g = GaussianSpace::new(1, 0.5);
        let mut rng = rng_from_seed(5);
        let samples: Vec<f64> = (0..4000).map(|_| g.sample(&mut rng)[0]).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.05);
        assert!((var.sqrt() - 0.5).abs() < 0.05);
    }

    #[test]
    fn gaussian_contains_checks_length_and_finiteness() {
        let g = GaussianSpace::new(2, 0.5);
        assert!(g.contains(&vec![3.0, -7.5]));
        assert!(!g.contains(&vec![0.0]));
        assert!(!g.contains(&vec![0.0, f64::NAN]));
    }
}

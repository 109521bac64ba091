use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random number generator.
///
/// The same seed always yields the same sequence. Range arguments may be
/// given in either order; an empty range returns its bound.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
    seed: u64,
}

impl Randomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seeds from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Restarts the sequence from `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    pub fn randomize_seed(&mut self) {
        self.set_seed(rand::random());
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform `f32` in `[min, max)`.
    pub fn randomf(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = ordered(min, max);
        if !(lo < hi) {
            return lo;
        }
        let t: f32 = self.rng.r#gen();
        let span = hi - lo;
        let v = if span.is_finite() {
            lo + t * span
        } else {
            // Spans wider than f32::MAX overflow; interpolate the bounds instead.
            lo * (1.0 - t) + hi * t
        };
        half_open(v, lo, hi)
    }

    /// Uniform `f64` in `[min, max)`.
    pub fn randomd(&mut self, min: f64, max: f64) -> f64 {
        let (lo, hi) = ordered(min, max);
        if !(lo < hi) {
            return lo;
        }
        let t: f64 = self.rng.r#gen();
        let span = hi - lo;
        let v = if span.is_finite() {
            lo + t * span
        } else {
            lo * (1.0 - t) + hi * t
        };
        half_open(v, lo, hi)
    }

    /// Uniform `i32` in `[min, max]`.
    pub fn randomi(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = ordered(min, max);
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform `u32` in `[min, max]`.
    pub fn randomui(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = ordered(min, max);
        self.rng.gen_range(lo..=hi)
    }

    /// Direct access for distributions not covered above.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::from_entropy()
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if b < a { (b, a) } else { (a, b) }
}

/// Keeps a sampled value in `[lo, hi)`. Rounding can land on `hi` and an
/// infinite bound can produce NaN; both fall back to `lo`.
fn half_open<T: PartialOrd + Copy>(v: T, lo: T, hi: T) -> T {
    if lo <= v && v < hi { v } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Randomizer::new(42);
        let mut b = Randomizer::new(42);
        for _ in 0..32 {
            assert_eq!(a.randomui(0, u32::MAX), b.randomui(0, u32::MAX));
            assert_eq!(a.randomd(0.0, 1.0), b.randomd(0.0, 1.0));
        }
    }

    #[test]
    fn set_seed_restarts_sequence() {
        let mut r = Randomizer::new(7);
        let first: Vec<i32> = (0..8).map(|_| r.randomi(-100, 100)).collect();
        r.set_seed(7);
        let again: Vec<i32> = (0..8).map(|_| r.randomi(-100, 100)).collect();
        assert_eq!(first, again);
        assert_eq!(r.seed(), 7);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Randomizer::new(1);
        let mut b = Randomizer::new(2);
        let xs: Vec<u32> = (0..8).map(|_| a.randomui(0, u32::MAX)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.randomui(0, u32::MAX)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn floats_stay_in_range() {
        let mut r = Randomizer::new(3);
        for _ in 0..1000 {
            let f = r.randomf(-2.0, 5.0);
            assert!((-2.0..5.0).contains(&f));
            let d = r.randomd(10.0, 0.0);
            assert!((0.0..10.0).contains(&d));
        }
    }

    #[test]
    fn integer_bounds_are_inclusive() {
        let mut r = Randomizer::new(9);
        let mut seen = [false; 2];
        for _ in 0..200 {
            let v = r.randomui(3, 4);
            assert!(v == 3 || v == 4);
            seen[(v - 3) as usize] = true;
        }
        assert_eq!(seen, [true, true]);

        for _ in 0..100 {
            assert!((-5..=5).contains(&r.randomi(5, -5)));
        }
    }

    #[test]
    fn full_float_range_does_not_overflow() {
        let mut r = Randomizer::new(1);
        for _ in 0..1000 {
            let f = r.randomf(f32::MIN, f32::MAX);
            assert!(f.is_finite() && f < f32::MAX);
            let d = r.randomd(f64::MAX, f64::MIN);
            assert!(d.is_finite() && d < f64::MAX);
        }
    }

    #[test]
    fn wide_ranges_cover_both_signs() {
        let mut r = Randomizer::new(4);
        let samples: Vec<f32> = (0..200).map(|_| r.randomf(f32::MIN, f32::MAX)).collect();
        assert!(samples.iter().any(|&f| f < 0.0));
        assert!(samples.iter().any(|&f| f > 0.0));
    }

    #[test]
    fn empty_ranges_return_the_bound() {
        let mut r = Randomizer::new(0);
        assert_eq!(r.randomf(1.5, 1.5), 1.5);
        assert_eq!(r.randomd(-3.0, -3.0), -3.0);
        assert_eq!(r.randomi(4, 4), 4);
        assert_eq!(r.randomui(9, 9), 9);
    }
}

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const TABLE_SIZE: usize = 256;
/// Brings 4D output, whose gradients have three unit components, near `[-1, 1]`.
const GRAD4_SCALE: f32 = 0.87;

/// Improved Perlin gradient noise in one to four dimensions.
///
/// Output lies in `[-1, 1]` and is exactly zero at integer lattice points.
/// The permutation table is derived from the seed, so equal seeds produce
/// equal fields.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    /// Permutation of `0..256`, repeated once so lookups never wrap.
    perm: [u8; TABLE_SIZE * 2],
    seed: u64,
}

impl PerlinNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            perm: permutation(seed),
            seed,
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Reseeds from the thread-local entropy source.
    pub fn randomize(&mut self) {
        self.set_seed(rand::random());
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn noise1(&self, x: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let u = fade(xf);

        let a = self.hash(xi);
        let b = self.hash(xi + 1);

        // 1D gradients are +-1, which peak at 0.5.
        let n = lerp(u, grad1(a, xf), grad1(b, xf - 1.0)) * 2.0;
        n.clamp(-1.0, 1.0)
    }

    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let (u, v) = (fade(xf), fade(yf));

        let a = self.hash(xi) + yi;
        let b = self.hash(xi + 1) + yi;

        let n = lerp(
            v,
            lerp(u, grad2(self.hash(a), xf, yf), grad2(self.hash(b), xf - 1.0, yf)),
            lerp(
                u,
                grad2(self.hash(a + 1), xf, yf - 1.0),
                grad2(self.hash(b + 1), xf - 1.0, yf - 1.0),
            ),
        );
        n.clamp(-1.0, 1.0)
    }

    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let (zi, zf) = lattice(z);
        let (u, v, w) = (fade(xf), fade(yf), fade(zf));

        let a = self.hash(xi) + yi;
        let aa = self.hash(a) + zi;
        let ab = self.hash(a + 1) + zi;
        let b = self.hash(xi + 1) + yi;
        let ba = self.hash(b) + zi;
        let bb = self.hash(b + 1) + zi;

        let near = lerp(
            v,
            lerp(u, grad3(self.hash(aa), xf, yf, zf), grad3(self.hash(ba), xf - 1.0, yf, zf)),
            lerp(
                u,
                grad3(self.hash(ab), xf, yf - 1.0, zf),
                grad3(self.hash(bb), xf - 1.0, yf - 1.0, zf),
            ),
        );
        let far = lerp(
            v,
            lerp(
                u,
                grad3(self.hash(aa + 1), xf, yf, zf - 1.0),
                grad3(self.hash(ba + 1), xf - 1.0, yf, zf - 1.0),
            ),
            lerp(
                u,
                grad3(self.hash(ab + 1), xf, yf - 1.0, zf - 1.0),
                grad3(self.hash(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
            ),
        );
        lerp(w, near, far).clamp(-1.0, 1.0)
    }

    pub fn noise4(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        let (xi, xf) = lattice(x);
        let (yi, yf) = lattice(y);
        let (zi, zf) = lattice(z);
        let (wi, wf) = lattice(w);
        let (fx, fy, fz, fw) = (fade(xf), fade(yf), fade(zf), fade(wf));

        let corner = |dx: usize, dy: usize, dz: usize, dw: usize| {
            let h = self.hash(self.hash(self.hash(self.hash(xi + dx) + yi + dy) + zi + dz) + wi + dw);
            grad4(h, xf - dx as f32, yf - dy as f32, zf - dz as f32, wf - dw as f32)
        };
        let along_x = |dy, dz, dw| lerp(fx, corner(0, dy, dz, dw), corner(1, dy, dz, dw));
        let along_y = |dz, dw| lerp(fy, along_x(0, dz, dw), along_x(1, dz, dw));
        let along_z = |dw| lerp(fz, along_y(0, dw), along_y(1, dw));

        (lerp(fw, along_z(0), along_z(1)) * GRAD4_SCALE).clamp(-1.0, 1.0)
    }

    /// `i` stays below `TABLE_SIZE * 2`: a wrapped cell index plus one table
    /// value plus one.
    #[inline]
    fn hash(&self, i: usize) -> usize {
        self.perm[i] as usize
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

fn permutation(seed: u64) -> [u8; TABLE_SIZE * 2] {
    let mut base: Vec<u8> = (0..TABLE_SIZE).map(|i| i as u8).collect();
    base.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut perm = [0u8; TABLE_SIZE * 2];
    for (i, slot) in perm.iter_mut().enumerate() {
        *slot = base[i % TABLE_SIZE];
    }
    perm
}

/// Splits a coordinate into its wrapped lattice cell and the offset inside it.
#[inline]
fn lattice(x: f32) -> (usize, f32) {
    let floor = x.floor();
    let cell = (floor as i64).rem_euclid(TABLE_SIZE as i64) as usize;
    (cell, x - floor)
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad1(hash: usize, x: f32) -> f32 {
    if hash & 1 == 0 { x } else { -x }
}

#[inline]
fn grad2(hash: usize, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

#[inline]
fn grad3(hash: usize, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// 32 gradients: every sign combination of three of the four axes.
#[inline]
fn grad4(hash: usize, x: f32, y: f32, z: f32, w: f32) -> f32 {
    let h = hash & 31;
    let u = if h < 24 { x } else { y };
    let v = if h < 16 { y } else { z };
    let t = if h < 8 { z } else { w };
    (if h & 1 == 0 { u } else { -u })
        + (if h & 2 == 0 { v } else { -v })
        + (if h & 4 == 0 { t } else { -t })
}

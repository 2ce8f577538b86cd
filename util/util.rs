#![allow(dead_code)]

use std::sync::OnceLock;

use color_schemorator::{Bounds, Palette, PixelGrid};
use palette::Srgba;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A gradient with a little noise, so that neighboring pixels are similar but rarely equal.
pub fn noisy_gradient(width: u32, height: u32, seed: u64) -> PixelGrid {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    PixelGrid::from_fn(Bounds::from_size(width, height), |x, y| {
        let r = (x * 255 / width as i32) as u8;
        let g = (y * 255 / height as i32) as u8;
        let b = ((x + y) % 256) as u8;
        let noise: u8 = rng.gen_range(0..8);
        Srgba::new(r.saturating_add(noise), g, b.saturating_sub(noise), 255)
    })
    .unwrap()
}

/// Large flat regions of few colors, similar to a screenshot or a poster.
pub fn flat_regions(width: u32, height: u32, seed: u64) -> PixelGrid {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let colors = (0..12)
        .map(|_| {
            let [r, g, b]: [u8; 3] = rng.gen();
            Srgba::new(r, g, b, 255)
        })
        .collect::<Vec<_>>();

    PixelGrid::from_fn(Bounds::from_size(width, height), |x, y| {
        colors[((x / 97 + y / 61) as usize) % colors.len()]
    })
    .unwrap()
}

/// Generates a palette of `len` distinct random colors.
pub fn random_palette(len: usize, seed: u64) -> Palette {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let mut colors = Vec::with_capacity(len);
    while colors.len() < len {
        let [r, g, b]: [u8; 3] = rng.gen();
        let color = Srgba::new(r, g, b, 255);
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
    Palette::try_from(colors).unwrap()
}

static SYNTHETIC_GRIDS: OnceLock<Vec<(String, PixelGrid)>> = OnceLock::new();

pub fn synthetic_grids() -> &'static [(String, PixelGrid)] {
    SYNTHETIC_GRIDS.get_or_init(|| {
        vec![
            ("gradient_640x480".to_owned(), noisy_gradient(640, 480, 0)),
            ("gradient_1920x1080".to_owned(), noisy_gradient(1920, 1080, 1)),
            ("flat_1920x1080".to_owned(), flat_regions(1920, 1080, 2)),
        ]
    })
}

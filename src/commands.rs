use std::error::Error;
use std::time::{Duration, Instant};

use mcvolume_blocks::{BlockState, VolBlockState};
use mcvolume_geom::{Boundary, IVec3};
use mcvolume_volume::{Volume, VolumeConfig, VolumeError};

const VERIFY_SAMPLES: usize = 10_000;

fn bench_palette(vol: &mut Volume, n: usize) -> Result<Vec<VolBlockState>, VolumeError> {
    (0..n)
        .map(|i| {
            let state = BlockState::new("mcvolume", format!("block_{i}"), [("n", i.to_string())])?;
            vol.ensured_palette_block(&state)
        })
        .collect()
}

fn rate(blocks: i64, dt: Duration) -> f64 {
    blocks as f64 / dt.as_secs_f64().max(f64::EPSILON)
}

fn random_pos(rng: &mut fastrand::Rng, area: &Boundary) -> IVec3 {
    let (lo, hi) = (area.low(), area.high());
    IVec3::new(rng.i32(lo.x..hi.x), rng.i32(lo.y..hi.y), rng.i32(lo.z..hi.z))
}

pub fn bench_set(config: &VolumeConfig, size: i32, palette_size: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let mut vol = Volume::with_config(IVec3::ZERO, IVec3::splat(size), config)?;
    let entries = bench_palette(&mut vol, palette_size)?;
    let mut rng = fastrand::Rng::with_seed(seed);
    let area = vol.target_bound();

    let t0 = Instant::now();
    for p in area.iter_yzx() {
        vol.set_vol_block_state(p, &entries[rng.usize(..entries.len())])?;
    }
    let dt = t0.elapsed();

    log::info!(
        "set {} blocks in {:.1} ms ({:.0} blocks/s), {} chunks allocated",
        area.volume(),
        dt.as_secs_f64() * 1000.0,
        rate(area.volume(), dt),
        vol.allocated_chunk_count()
    );
    println!("bench-set size={size} palette={palette_size} ms={:.1}", dt.as_secs_f64() * 1000.0);
    Ok(())
}

pub fn bench_bulk(config: &VolumeConfig, size: i32, threads: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let mut src = Volume::with_config(IVec3::ZERO, IVec3::splat(size), config)?;
    let entries = bench_palette(&mut src, 64)?;
    let mut rng = fastrand::Rng::with_seed(seed);
    let area = src.target_bound();
    for p in area.iter_yzx() {
        if rng.bool() {
            src.set_vol_block_state(p, &entries[rng.usize(..entries.len())])?;
        }
    }

    let t0 = Instant::now();
    let grid = src.extract_block_grid(area, threads)?;
    let extract = t0.elapsed();

    let mut dst = Volume::with_config(IVec3::ZERO, IVec3::splat(size), config)?;
    let t1 = Instant::now();
    dst.place_block_grid(IVec3::ZERO, &grid, threads)?;
    let place = t1.elapsed();

    for _ in 0..VERIFY_SAMPLES {
        let p = random_pos(&mut rng, &area);
        let (a, b) = (src.get_block_state(p)?, dst.get_block_state(p)?);
        if a != b {
            return Err(format!("mismatch at {p}: source {a}, placed {b}").into());
        }
    }

    log::info!(
        "extract {:.0} blocks/s, place {:.0} blocks/s with {threads} threads",
        rate(area.volume(), extract),
        rate(area.volume(), place)
    );
    println!(
        "bench-bulk size={size} threads={threads} extract_ms={:.1} place_ms={:.1} verified={VERIFY_SAMPLES}",
        extract.as_secs_f64() * 1000.0,
        place.as_secs_f64() * 1000.0
    );
    Ok(())
}

pub fn bounds(config: &VolumeConfig, size: i32, count: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let half = IVec3::splat(size / 2);
    let mut vol = Volume::with_config(-half, IVec3::splat(size) - half, config)?;
    let mut stone = vol.ensured_palette_block_str("minecraft:stone")?;
    if stone.is_default() {
        stone = vol.ensured_palette_block_str("minecraft:glass")?;
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    let area = vol.target_bound();

    let mut expected: Option<(IVec3, IVec3)> = None;
    for _ in 0..count {
        let p = random_pos(&mut rng, &area);
        vol.set_vol_block_state(p, &stone)?;
        expected = Some(match expected {
            Some((lo, hi)) => (lo.min(p), hi.max(p + IVec3::ONE)),
            None => (p, p + IVec3::ONE),
        });
    }

    let t0 = Instant::now();
    let computed = vol.compute_build_bounds();
    let dt = t0.elapsed();
    log::debug!("build bounds scan took {:.3} ms", dt.as_secs_f64() * 1000.0);

    match expected {
        Some((lo, hi)) => {
            let expected = Boundary::new(lo, hi);
            println!("build bounds {computed} (expected {expected})");
            if computed != expected {
                return Err(format!("build bounds {computed} differ from {expected}").into());
            }
        }
        None => println!("build bounds {computed} (empty volume)"),
    }
    Ok(())
}

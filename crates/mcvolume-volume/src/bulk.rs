use std::mem;

use hashbrown::HashSet;
use mcvolume_blocks::palette::check_dense;
use mcvolume_blocks::{BlockPaletteMappings, BlockState, DEFAULT_BLOCK_ID, PaletteError, PaletteId};
use mcvolume_chunk::Chunk;
use mcvolume_geom::{Axis, Boundary, IVec3};

use crate::config::check_thread_count;
use crate::error::VolumeError;
use crate::volume::{Volume, checked_len};
use crate::workers::distribute_range;

/// Dense block ids over a box, Y-major then Z then X, plus the table that
/// resolves them to states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    dims: IVec3,
    ids: Vec<PaletteId>,
    mappings: BlockPaletteMappings,
}

impl BlockGrid {
    pub fn new(
        dims: IVec3,
        ids: Vec<PaletteId>,
        mappings: BlockPaletteMappings,
    ) -> Result<Self, VolumeError> {
        if !dims.all_ge(IVec3::ZERO) {
            return Err(VolumeError::InvalidConfiguration(format!(
                "block grid dims {dims} must not be negative"
            )));
        }
        let len = checked_len(dims.product())?;
        if ids.len() != len {
            return Err(VolumeError::InvalidConfiguration(format!(
                "block grid of dims {dims} needs {len} ids, got {}",
                ids.len()
            )));
        }
        Ok(Self {
            dims,
            ids,
            mappings,
        })
    }

    #[inline]
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    #[inline]
    pub fn ids(&self) -> &[PaletteId] {
        &self.ids
    }

    /// Id to state table. May list ids the grid never uses.
    #[inline]
    pub fn mappings(&self) -> &BlockPaletteMappings {
        &self.mappings
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_at(&self, local: IVec3) -> Option<PaletteId> {
        let b = Boundary::from_origin_dims(IVec3::ZERO, self.dims);
        b.contains(local).then(|| self.ids[b.linearize(local)])
    }

    pub fn state_at(&self, local: IVec3) -> Option<&BlockState> {
        self.mappings.get(&self.id_at(local)?)
    }

    pub fn into_parts(self) -> (IVec3, Vec<PaletteId>, BlockPaletteMappings) {
        (self.dims, self.ids, self.mappings)
    }
}

/// One worker's share: a slab of whole chunks along the partition axis.
#[derive(Clone, Copy, Debug)]
struct Job {
    chunks: Boundary,
    /// `chunks` in block space, clipped to the transfer region.
    blocks: Boundary,
}

/// Output rows owned by one extraction job, one per `(y, z)` of `job.blocks`.
struct RowJob<'a> {
    job: Job,
    rows: Vec<&'a mut [PaletteId]>,
}

/// Destination chunk slots owned by one placement job.
struct SlotJob<'a> {
    job: Job,
    slots: Vec<(IVec3, &'a mut Option<Box<Chunk>>)>,
}

struct PlaceCtx<'a> {
    bounds: Boundary,
    ids: &'a [PaletteId],
    /// Grid id to this volume's id.
    table: &'a [PaletteId],
    blank: &'a Chunk,
    bit_size: u8,
    always_allocate: bool,
}

impl Volume {
    /// Copies the ids inside `bounds` into a [`BlockGrid`].
    ///
    /// The returned mappings are this volume's whole palette, so ids stay
    /// stable across extractions. `thread_count` workers split the region
    /// along its longest axis in chunk units.
    pub fn extract_block_grid(
        &self,
        bounds: Boundary,
        thread_count: usize,
    ) -> Result<BlockGrid, VolumeError> {
        check_thread_count(thread_count)?;
        self.check_region(&bounds)?;
        let len = checked_len(bounds.volume())?;

        let default_id = self.default_block().id();
        let mut ids = vec![default_id; len];
        let mappings = self.palette.to_unlinked_mappings();
        if bounds.is_empty() {
            return Ok(BlockGrid {
                dims: bounds.dims(),
                ids,
                mappings,
            });
        }

        let (axis, jobs) = self.plan_jobs(&bounds, thread_count);
        log::debug!(
            "extract {bounds}: {} job(s) along {axis:?}, {len} blocks",
            jobs.len()
        );
        let row_jobs = split_rows(&bounds, jobs, &mut ids);
        self.workers
            .run(thread_count, row_jobs, |job| self.fill_rows(job))?;

        Ok(BlockGrid {
            dims: bounds.dims(),
            ids,
            mappings,
        })
    }

    pub fn extract_block_grid_default(&self, bounds: Boundary) -> Result<BlockGrid, VolumeError> {
        self.extract_block_grid(bounds, self.bulk_threads())
    }

    /// Writes `grid` with its low corner at `origin`.
    ///
    /// Grid ids are translated once per mapping entry, not per voxel.
    /// Everything is validated before the volume changes. Chunks are only
    /// allocated for rows that hold a non-default block.
    pub fn place_block_grid(
        &mut self,
        origin: IVec3,
        grid: &BlockGrid,
        thread_count: usize,
    ) -> Result<(), VolumeError> {
        check_thread_count(thread_count)?;
        let Some(far) = origin.checked_add(grid.dims()) else {
            return Err(VolumeError::InvalidConfiguration(format!(
                "grid of dims {} placed at {origin} leaves the coordinate range",
                grid.dims()
            )));
        };
        let bounds = Boundary::new(origin, far);
        self.check_region(&bounds)?;
        check_dense(grid.mappings()).map_err(VolumeError::InvalidPalette)?;
        let table_len = grid.mappings().len();
        if let Some(&bad) = grid.ids().iter().find(|&&id| id as usize >= table_len) {
            return Err(VolumeError::IndexOutOfRange {
                index: bad as usize,
                len: table_len,
            });
        }
        let missing: HashSet<&BlockState> = grid
            .mappings()
            .values()
            .filter(|s| self.palette.get(s).is_none())
            .collect();
        if missing.len() > self.palette.remaining_capacity() {
            return Err(PaletteError::Full {
                capacity: self.palette.len() + self.palette.remaining_capacity(),
            }
            .into());
        }

        let mut table = Vec::with_capacity(table_len);
        for state in grid.mappings().values() {
            table.push(self.palette.get_or_add(state)?.id());
        }
        if bounds.is_empty() {
            return Ok(());
        }

        let blank = Chunk::new(self.chunk_bit_size())?;
        let ctx = PlaceCtx {
            bounds,
            ids: grid.ids(),
            always_allocate: !table.contains(&DEFAULT_BLOCK_ID),
            table: &table,
            blank: &blank,
            bit_size: self.chunk_bit_size(),
        };

        let (axis, jobs) = self.plan_jobs(&bounds, thread_count);
        log::debug!(
            "place {bounds}: {} job(s) along {axis:?}, {} palette entries translated",
            jobs.len(),
            table.len()
        );
        let grid_bound = self.chunk_grid_bound();
        let mut slot_jobs: Vec<SlotJob<'_>> = jobs
            .into_iter()
            .map(|job| SlotJob {
                job,
                slots: Vec::new(),
            })
            .collect();
        for (i, slot) in self.chunks.iter_mut().enumerate() {
            let chunk_pos = grid_bound.delinearize(i);
            if let Some(sj) = slot_jobs.iter_mut().find(|sj| sj.job.chunks.contains(chunk_pos)) {
                sj.slots.push((chunk_pos, slot));
            }
        }
        self.workers
            .run(thread_count, slot_jobs, |job| place_slots(job, &ctx))?;
        Ok(())
    }

    pub fn place_block_grid_default(&mut self, origin: IVec3, grid: &BlockGrid) -> Result<(), VolumeError> {
        self.place_block_grid(origin, grid, self.bulk_threads())
    }

    /// Partitions the chunks covering `bounds` into at most `threads` slabs
    /// along the longest chunk-grid axis.
    fn plan_jobs(&self, bounds: &Boundary, threads: usize) -> (Axis, Vec<Job>) {
        let chunk_bounds = self.pos_bounds_to_chunk_bounds(bounds);
        let axis = chunk_bounds.dims().longest_axis();
        let (lo, hi) = (chunk_bounds.low(), chunk_bounds.high());
        let jobs = distribute_range(lo.get(axis), hi.get(axis), threads)
            .into_iter()
            .map(|r| {
                let chunks = Boundary::new(lo.with(axis, r.start), hi.with(axis, r.end));
                let blocks = Boundary::new(
                    self.chunk_pos_to_pos(chunks.low()),
                    self.chunk_pos_to_pos(chunks.high()),
                )
                .clamp_into(bounds);
                Job { chunks, blocks }
            })
            .collect();
        (axis, jobs)
    }

    fn fill_rows(&self, rj: RowJob<'_>) {
        let RowJob { job, mut rows } = rj;
        let jb = job.blocks;
        let row_stride = jb.dims().z as usize;
        for chunk_pos in job.chunks.iter_yzx() {
            let Some(chunk) = self.chunk_at(chunk_pos) else {
                continue;
            };
            let cb = self.chunk_block_bound(chunk_pos).clamp_into(&jb);
            let run = cb.dims().x as usize;
            let dst_x = (cb.low().x - jb.low().x) as usize;
            for y in cb.range(Axis::Y) {
                for z in cb.range(Axis::Z) {
                    let row = (y - jb.low().y) as usize * row_stride + (z - jb.low().z) as usize;
                    let src = chunk.local_to_index(self.pos_to_local(IVec3::new(cb.low().x, y, z)));
                    rows[row][dst_x..dst_x + run].copy_from_slice(&chunk.blocks()[src..src + run]);
                }
            }
        }
    }
}

/// Hands every output row, or row segment when partitioning along X, to the
/// job whose block box contains it. Jobs come ordered along the partition axis.
fn split_rows<'a>(bounds: &Boundary, jobs: Vec<Job>, ids: &'a mut [PaletteId]) -> Vec<RowJob<'a>> {
    let dims = bounds.dims();
    let (dx, dz) = (dims.x as usize, dims.z as usize);
    let mut out: Vec<RowJob<'a>> = jobs
        .into_iter()
        .map(|job| {
            let d = job.blocks.dims();
            RowJob {
                job,
                rows: Vec::with_capacity((d.y as usize) * (d.z as usize)),
            }
        })
        .collect();

    for (r, row) in ids.chunks_mut(dx).enumerate() {
        let y = bounds.low().y + (r / dz) as i32;
        let z = bounds.low().z + (r % dz) as i32;
        let mut rest = row;
        for rj in out.iter_mut().filter(|rj| {
            rj.job.blocks.range(Axis::Y).contains(&y) && rj.job.blocks.range(Axis::Z).contains(&z)
        }) {
            let (seg, tail) = mem::take(&mut rest).split_at_mut(rj.job.blocks.dims().x as usize);
            rj.rows.push(seg);
            rest = tail;
        }
        debug_assert!(rest.is_empty(), "row {r} not fully assigned");
    }
    out
}

fn place_slots(sj: SlotJob<'_>, ctx: &PlaceCtx<'_>) {
    let side = 1i32 << ctx.bit_size;
    let mask = side - 1;
    for (chunk_pos, slot) in sj.slots {
        let cb = Boundary::from_origin_dims(chunk_pos << ctx.bit_size as u32, IVec3::splat(side))
            .clamp_into(&ctx.bounds);
        let run = cb.dims().x as usize;
        for y in cb.range(Axis::Y) {
            for z in cb.range(Axis::Z) {
                let row_start = IVec3::new(cb.low().x, y, z);
                let s = ctx.bounds.linearize(row_start);
                let src = &ctx.ids[s..s + run];
                if slot.is_none() {
                    let has_block = ctx.always_allocate
                        || src.iter().any(|&g| ctx.table[g as usize] != DEFAULT_BLOCK_ID);
                    if !has_block {
                        continue;
                    }
                    *slot = Some(Box::new(ctx.blank.clone()));
                }
                let Some(chunk) = slot.as_deref_mut() else {
                    continue;
                };
                let d = chunk.local_to_index(row_start & mask);
                for (dst, &g) in chunk.blocks_mut()[d..d + run].iter_mut().zip(src) {
                    *dst = ctx.table[g as usize];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vol() -> Volume {
        Volume::new(IVec3::ZERO, IVec3::new(64, 32, 48), "air", 4).unwrap()
    }

    #[test]
    fn jobs_tile_the_region_along_longest_axis() {
        let v = vol();
        let bounds = Boundary::new(IVec3::new(3, 1, 2), IVec3::new(61, 30, 40));
        let (axis, jobs) = v.plan_jobs(&bounds, 3);
        assert_eq!(axis, Axis::X);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].chunks.range(Axis::X), 0..2);
        assert_eq!(jobs[1].chunks.range(Axis::X), 2..3);
        assert_eq!(jobs[2].chunks.range(Axis::X), 3..4);
        assert_eq!(jobs[0].blocks.range(Axis::X), 3..32);
        assert_eq!(jobs[2].blocks.range(Axis::X), 48..61);
        let total: i64 = jobs.iter().map(|j| j.blocks.volume()).sum();
        assert_eq!(total, bounds.volume());
    }

    #[test]
    fn rows_split_into_disjoint_segments() {
        let v = vol();
        let bounds = Boundary::new(IVec3::new(3, 1, 2), IVec3::new(61, 4, 5));
        let (_, jobs) = v.plan_jobs(&bounds, 4);
        let mut ids = vec![0 as PaletteId; bounds.volume() as usize];
        let row_jobs = split_rows(&bounds, jobs, &mut ids);
        for (n, rj) in row_jobs.into_iter().enumerate() {
            assert_eq!(rj.rows.len(), 9);
            for row in rj.rows {
                assert_eq!(row.len(), rj.job.blocks.dims().x as usize);
                row.fill(n as PaletteId + 1);
            }
        }
        assert!(ids.iter().all(|&id| id != 0));
        // Each row walks through jobs in X order
        assert_eq!(&ids[..bounds.dims().x as usize][..13], &[1; 13]);
        assert_eq!(ids[13], 2);
    }

    #[test]
    fn block_grid_checks_length() {
        let m = BlockPaletteMappings::new();
        assert!(BlockGrid::new(IVec3::new(2, 2, 2), vec![0; 8], m.clone()).is_ok());
        assert!(matches!(
            BlockGrid::new(IVec3::new(2, 2, 2), vec![0; 7], m.clone()),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            BlockGrid::new(IVec3::new(-1, 2, 2), vec![], m),
            Err(VolumeError::InvalidConfiguration(_))
        ));
    }
}

//! Row-range partitioning for the parallel render pass.

/// A contiguous run of image rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// First row, inclusive
    pub start: u32,
    /// One past the last row
    pub end: u32,
}

impl RowBand {
    pub fn row_count(&self) -> u32 {
        self.end - self.start
    }
}

/// Split `height` rows into contiguous bands, one per worker.
///
/// Bands are equal-sized except the last, which absorbs the remainder rows.
/// Worker counts outside `1..=height` are clamped, so every returned band is
/// non-empty and the bands cover each row exactly once.
pub fn partition_rows(height: u32, workers: u32) -> Vec<RowBand> {
    if height == 0 {
        return Vec::new();
    }

    let workers = workers.clamp(1, height);
    let rows_per_band = height / workers;

    let mut bands = Vec::with_capacity(workers as usize);
    for i in 0..workers {
        let start = i * rows_per_band;
        let end = if i == workers - 1 {
            height
        } else {
            start + rows_per_band
        };
        bands.push(RowBand { start, end });
    }

    bands
}

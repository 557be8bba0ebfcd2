//! Genomic region set for ploidy correction
//!
//! Uses rust-lapper for O(log n + k) membership queries. A position `pos`
//! is inside region `(chrom, start, end)` when `start < pos <= end`, the
//! same interval a 0-based half-open BED record describes.

use crate::core::error::{ValidationError, ValidationResult};
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

/// A genomic region, exclusive start and inclusive end
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> ValidationResult<Self> {
        let chrom = chrom.into();
        // end + 1 must stay representable for the interval index
        if chrom.is_empty() || start > end || end == u64::MAX {
            return Err(ValidationError::InvalidRegion(format!("{}:{}-{}", chrom, start, end)));
        }
        Ok(Self { chrom, start, end })
    }

    /// Membership test for a single region
    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        chrom == self.chrom && self.start < pos && pos <= self.end
    }

    /// Parse a BED line (`chrom start end ...`), ignoring extra columns
    pub fn from_bed_line(line: &str) -> ValidationResult<Self> {
        let invalid = || ValidationError::InvalidRegion(line.to_string());
        let mut fields = line.split('\t');
        let chrom = fields.next().ok_or_else(invalid)?;
        let start = fields.next().and_then(|s| s.trim().parse().ok()).ok_or_else(invalid)?;
        let end = fields.next().and_then(|s| s.trim().parse().ok()).ok_or_else(invalid)?;
        Self::new(chrom, start, end)
    }
}

impl FromStr for Region {
    type Err = ValidationError;

    /// Parse `chrom:start-end`; thousands separators are allowed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidRegion(s.to_string());
        let (chrom, range) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (start, end) = range.split_once('-').ok_or_else(invalid)?;
        let parse = |v: &str| v.replace(',', "").parse::<u64>().map_err(|_| invalid());
        Self::new(chrom, parse(start)?, parse(end)?)
    }
}

/// Read regions from a BED source; blank, `#`, `track` and `browser` lines are skipped
pub fn read_bed_regions<R: BufRead>(reader: R) -> crate::core::Result<Vec<Region>> {
    let mut regions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
        {
            continue;
        }
        regions.push(Region::from_bed_line(line)?);
    }
    Ok(regions)
}

/// Regions indexed per chromosome
pub struct RegionSet {
    maps: HashMap<String, Lapper<u64, ()>>,
    len: usize,
}

impl RegionSet {
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Self {
        let mut by_chrom: HashMap<String, Vec<Interval<u64, ()>>> = HashMap::new();
        let mut len = 0;

        for region in regions {
            // (start, end] in 1-based positions is [start + 1, end + 1) for lapper
            by_chrom.entry(region.chrom).or_default().push(Interval {
                start: region.start + 1,
                stop: region.end + 1,
                val: (),
            });
            len += 1;
        }

        let maps = by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();

        Self { maps, len }
    }

    /// Read regions from a BED source (see [`read_bed_regions`])
    pub fn from_bed_reader<R: BufRead>(reader: R) -> crate::core::Result<Self> {
        Ok(Self::new(read_bed_regions(reader)?))
    }

    /// True when any region on `chrom` satisfies `start < pos <= end`
    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        // No region ends at u64::MAX, so that position is never inside one
        let Some(stop) = pos.checked_add(1) else {
            return false;
        };
        self.maps
            .get(chrom)
            .map(|lapper| lapper.find(pos, stop).next().is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self::new(iter)
    }
}

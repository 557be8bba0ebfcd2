//! Sex-chromosome ploidy correction
//!
//! Converts diploid genotypes to haploid for male samples at positions
//! inside the supplied regions. The evidence used depends on the FORMAT
//! keys the variant caller emitted:
//!
//! - `PL` present: likelihood-based (short-read callers such as DeepVariant)
//! - `AD` present: allele-depth argmax (pbsv style)
//! - `DR` and `DV` present: reference/variant depth argmax (Sniffles style)
//!
//! Samples are written back one at a time. If a later sample fails
//! (invalid sex token, unsupported evidence), earlier samples of the same
//! record stay converted.

use crate::core::{RegionSet, ValidationError, ValidationResult};
use crate::formats::genotype::{is_no_call, ploidy, NO_CALL};
use crate::formats::record::{FormatFields, TransformState, VariantRecord};
use log::debug;
use std::str::FromStr;

/// Declared sex of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    /// One X copy: hemizygous regions are converted
    Male,
    /// Two X copies: left unmodified
    Female,
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "male" | "xy" => Ok(Sex::Male),
            "f" | "female" | "xx" => Ok(Sex::Female),
            _ => Err(ValidationError::InvalidSex(s.to_string())),
        }
    }
}

/// Number of PL values required for conversion (biallelic diploid)
pub const DIPLOID_PL_COUNT: usize = 3;

/// Index of genotype (j, k), j <= k, in a diploid PL vector
#[inline]
pub fn genotype_index(j: usize, k: usize) -> usize {
    k * (k + 1) / 2 + j
}

/// Result of collapsing diploid likelihoods to a haploid call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaploidCall {
    /// Haploid PLs, shifted so the best call is 0
    pub pls: Vec<u32>,
    /// Lowest allele index with PL 0
    pub allele: usize,
    /// Second-smallest shifted PL
    pub gq: u32,
}

/// Collapse diploid PLs to haploid PLs over `num_alleles` alleles
///
/// The homozygous entries carry the haploid likelihoods. They are converted
/// to probabilities, renormalized to sum to 1 and re-encoded as Phred values.
/// Probabilities are taken relative to the best homozygous entry, so PLs in
/// the thousands neither underflow nor saturate.
/// Returns `None` when `pls` is too short for `num_alleles` or a PL is not finite.
///
/// ```
/// use vcf_anonymizer::formats::ploidy::haploid_from_pls;
///
/// let call = haploid_from_pls(&[0.0, 3.0, 30.0], 2).unwrap();
/// assert_eq!(call.pls, vec![0, 30]);
/// assert_eq!(call.allele, 0);
/// assert_eq!(call.gq, 30);
///
/// let confident = haploid_from_pls(&[3400.0, 0.0, 3500.0], 2).unwrap();
/// assert_eq!(confident.pls, vec![0, 100]);
/// ```
pub fn haploid_from_pls(pls: &[f64], num_alleles: usize) -> Option<HaploidCall> {
    let homozygous: Vec<f64> = (0..num_alleles)
        .map(|i| pls.get(genotype_index(i, i)).copied())
        .collect::<Option<_>>()?;
    if homozygous.is_empty() || homozygous.iter().any(|pl| !pl.is_finite()) {
        return None;
    }

    // Best entry has probability exactly 1, so total lies in [1, num_alleles]
    let best = homozygous.iter().copied().fold(f64::INFINITY, f64::min);
    let total: f64 = homozygous
        .iter()
        .map(|pl| 10f64.powf((best - pl) / 10.0))
        .sum();
    let offset = 10.0 * total.log10();

    let phred: Vec<f64> = homozygous
        .iter()
        .map(|pl| (pl - best + offset).round())
        .collect();
    let min = phred.iter().copied().fold(f64::INFINITY, f64::min);
    let pls: Vec<u32> = phred.iter().map(|pl| (pl - min) as u32).collect();

    let allele = pls.iter().position(|&pl| pl == 0).unwrap_or(0);
    let mut sorted = pls.clone();
    sorted.sort_unstable();
    let gq = sorted.get(1).copied().unwrap_or(0);

    Some(HaploidCall { pls, allele, gq })
}

/// Index of the unique maximum depth; `None` on a tie
pub fn unique_argmax(depths: &[u64]) -> Option<usize> {
    let max = *depths.iter().max()?;
    let mut hits = depths.iter().enumerate().filter(|&(_, &d)| d == max);
    let (index, _) = hits.next()?;
    match hits.next() {
        Some(_) => None,
        None => Some(index),
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> ValidationResult<T> {
    value.parse().map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parse read depths; `Ok(None)` when any value is missing (`.`)
fn parse_depths(field: &str, values: &[&str]) -> ValidationResult<Option<Vec<u64>>> {
    if values.iter().any(|v| *v == NO_CALL) {
        return Ok(None);
    }
    values
        .iter()
        .map(|v| parse_number(field, v))
        .collect::<ValidationResult<Vec<u64>>>()
        .map(Some)
}

/// Evidence value for `key`; `None` when dropped from the sample or missing (`.`)
fn evidence<'a>(fields: &'a FormatFields, key: &str) -> Option<&'a str> {
    fields.get(key).filter(|value| *value != NO_CALL)
}

fn depth_genotype(depths: Option<Vec<u64>>) -> String {
    depths
        .as_deref()
        .and_then(unique_argmax)
        .map(|index| index.to_string())
        .unwrap_or_else(|| NO_CALL.to_string())
}

impl VariantRecord {
    /// Convert male samples to haploid genotypes inside the given regions
    ///
    /// Must run before any shuffle or remap. On success the record is tagged
    /// `PloidyFixed`, so a second call fails. Records outside every region
    /// keep their sample data.
    pub fn fix_ploidy<S: AsRef<str>>(
        &mut self,
        sexes: &[S],
        regions: &RegionSet,
    ) -> ValidationResult<()> {
        if sexes.len() != self.samples.len() {
            return Err(ValidationError::SexCountMismatch {
                expected: self.samples.len(),
                found: sexes.len(),
            });
        }
        if self.state != TransformState::Untouched {
            return Err(ValidationError::AlreadyModified { state: self.state });
        }

        let position = self.position()?;
        if regions.contains(self.chrom(), position) {
            for (index, sex) in sexes.iter().enumerate() {
                match sex.as_ref().parse::<Sex>()? {
                    Sex::Male => {
                        let haploid = self.convert_to_haploid(index)?;
                        self.samples[index] = haploid;
                        self.state = TransformState::PloidyFixed;
                    }
                    Sex::Female => {}
                }
            }
        }

        self.state = TransformState::PloidyFixed;
        Ok(())
    }

    /// Haploid sample string for one sample
    fn convert_to_haploid(&self, index: usize) -> ValidationResult<String> {
        let mut fields = FormatFields::parse(&self.format, &self.samples[index]);
        let has_key = |key: &str| self.format.iter().any(|k| k == key);

        if has_key("PL") {
            debug!("Using PL to fix ploidy at {}:{}", self.chrom(), self.pos());
            match evidence(&fields, "PL").map(str::to_string) {
                Some(raw) => self.haploid_from_pl_field(&mut fields, &raw)?,
                None => {
                    debug!("No PL for sample {} at {}:{}", index, self.chrom(), self.pos());
                    fields.set("GT", NO_CALL);
                }
            }
        } else if has_key("AD") {
            debug!("Using AD to fix ploidy at {}:{}", self.chrom(), self.pos());
            let depths = match evidence(&fields, "AD") {
                Some(ad) => parse_depths("AD", &ad.split(',').collect::<Vec<_>>())?,
                None => None,
            };
            fields.set("GT", depth_genotype(depths));
        } else if has_key("DR") && has_key("DV") {
            debug!("Using DR+DV to fix ploidy at {}:{}", self.chrom(), self.pos());
            let depths = match (evidence(&fields, "DR"), evidence(&fields, "DV")) {
                (Some(dr), Some(dv)) => parse_depths("DR/DV", &[dr, dv])?,
                _ => None,
            };
            fields.set("GT", depth_genotype(depths));
        } else {
            return Err(ValidationError::UnsupportedFormat {
                format: self.format().to_string(),
                chrom: self.chrom().to_string(),
                pos: self.pos().to_string(),
            });
        }

        Ok(fields.to_string())
    }

    fn haploid_from_pl_field(&self, fields: &mut FormatFields, raw: &str) -> ValidationResult<()> {
        let values: Vec<&str> = raw.split(',').collect();
        let gt = fields.get("GT").unwrap_or(NO_CALL).to_string();

        if values.len() == 2 || ploidy(&gt) == 1 {
            debug!("Genotype is already haploid at {}:{}", self.chrom(), self.pos());
        }

        let invalid_count = || ValidationError::InvalidPlCount {
            value: raw.to_string(),
            expected: DIPLOID_PL_COUNT,
            chrom: self.chrom().to_string(),
            pos: self.pos().to_string(),
        };
        if values.len() != DIPLOID_PL_COUNT {
            return Err(invalid_count());
        }

        let pls = values
            .iter()
            .map(|v| match parse_number::<f64>("PL", v)? {
                pl if pl.is_finite() => Ok(pl),
                _ => Err(ValidationError::InvalidNumber {
                    field: "PL".to_string(),
                    value: v.to_string(),
                }),
            })
            .collect::<ValidationResult<Vec<f64>>>()?;
        let call = haploid_from_pls(&pls, self.alt_alleles.len() + 1).ok_or_else(invalid_count)?;

        let new_gt = if is_no_call(&gt) {
            NO_CALL.to_string()
        } else {
            call.allele.to_string()
        };
        let new_pl = call
            .pls
            .iter()
            .map(|pl| pl.to_string())
            .collect::<Vec<_>>()
            .join(",");

        fields.set("PL", new_pl);
        fields.set("GT", new_gt);
        fields.set("GQ", call.gq.to_string());
        Ok(())
    }
}

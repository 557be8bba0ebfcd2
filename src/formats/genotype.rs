//! Genotype remapping between allele lists
//!
//! Each haplotype index is resolved to its allele through the record's
//! current allele list and re-resolved in the target list. The remap is
//! lossless: an allele missing from the target list is an error.

use crate::core::{ValidationError, ValidationResult};
use crate::formats::record::{TransformState, VariantRecord};
use log::debug;

/// Missing haplotype / no-call marker
pub const NO_CALL: &str = ".";

/// True when every haplotype of a genotype is missing (`.`, `./.`, `.|.`)
pub fn is_no_call(genotype: &str) -> bool {
    genotype
        .split(['/', '|'])
        .all(|haplotype| haplotype == NO_CALL)
}

/// Number of haplotypes in a genotype string
pub fn ploidy(genotype: &str) -> usize {
    genotype.split(['/', '|']).count()
}

/// Remap one genotype string, preserving its `/` and `|` separators
///
/// ```
/// use vcf_anonymizer::formats::genotype::remap_genotype;
///
/// let current = vec!["A".to_string(), "G".to_string()];
/// let target = vec!["A".to_string(), "T".to_string(), "G".to_string()];
/// assert_eq!(remap_genotype("0|1", &current, &target).unwrap(), "0|2");
/// ```
pub fn remap_genotype(
    genotype: &str,
    current: &[String],
    target: &[String],
) -> ValidationResult<String> {
    let invalid = || ValidationError::InvalidGenotype {
        genotype: genotype.to_string(),
        alleles: current.len(),
    };

    let mut remapped = String::with_capacity(genotype.len());
    let mut start = 0;
    let bytes = genotype.as_bytes();

    for end in 0..=bytes.len() {
        if end < bytes.len() && bytes[end] != b'/' && bytes[end] != b'|' {
            continue;
        }

        let haplotype = &genotype[start..end];
        if haplotype == NO_CALL {
            remapped.push_str(NO_CALL);
        } else {
            let index: usize = haplotype.parse().map_err(|_| invalid())?;
            let allele = current.get(index).ok_or_else(invalid)?;
            let new_index = target
                .iter()
                .position(|a| a == allele)
                .ok_or_else(|| ValidationError::AlleleNotFound(allele.clone()))?;
            remapped.push_str(&new_index.to_string());
        }

        if end < bytes.len() {
            remapped.push(bytes[end] as char);
        }
        start = end + 1;
    }

    Ok(remapped)
}

impl VariantRecord {
    /// Re-express every sample genotype against a new allele list
    ///
    /// `new_ref` becomes index 0 and `new_alts` fill the following indices.
    /// Only the leading genotype token of each sample changes; the remaining
    /// colon-separated values are kept in order. All samples are remapped
    /// before any is written, so a failure leaves the record unchanged.
    /// The nine leading columns are not rewritten.
    pub fn remap_genotypes<S: AsRef<str>>(
        &mut self,
        new_ref: &str,
        new_alts: &[S],
    ) -> ValidationResult<()> {
        let mut target = Vec::with_capacity(new_alts.len() + 1);
        target.push(new_ref.to_string());
        target.extend(new_alts.iter().map(|a| a.as_ref().to_string()));

        let remapped = self
            .samples
            .iter()
            .map(|sample| {
                let (genotype, rest) = match sample.split_once(':') {
                    Some((genotype, rest)) => (genotype, Some(rest)),
                    None => (sample.as_str(), None),
                };
                let mut updated = remap_genotype(genotype, &self.alleles, &target)?;
                if let Some(rest) = rest {
                    updated.push(':');
                    updated.push_str(rest);
                }
                Ok(updated)
            })
            .collect::<ValidationResult<Vec<String>>>()?;

        debug!(
            "Remapped genotypes at {}:{} from {:?} to {:?}",
            self.chrom(),
            self.pos(),
            self.alleles,
            target
        );

        self.samples = remapped;
        self.alleles = target;
        self.state = TransformState::Remapped;
        Ok(())
    }
}

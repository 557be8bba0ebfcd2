//! Variant record model
//!
//! A record keeps its nine leading columns verbatim and two views of the
//! sample columns: the snapshot taken at parse time and the current,
//! mutable data. Transformations rewrite only the current sample slice.

use crate::core::{MalformedRecordError, ValidationError, ValidationResult};
use memchr::memchr_iter;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Number of fixed leading columns (CHROM .. FORMAT)
pub const FIXED_FIELD_COUNT: usize = 9;

/// Which transformation last rewrote a record's sample data
///
/// Ploidy fixing is only accepted on `Untouched` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformState {
    #[default]
    Untouched,
    PloidyFixed,
    Remapped,
    Shuffled,
}

/// One sample's values keyed by the record's FORMAT keys, in FORMAT order
///
/// Keys without a value (trailing fields dropped from the sample) are absent
/// and are not written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFields {
    entries: Vec<(String, String)>,
}

impl FormatFields {
    pub fn parse(keys: &[String], sample: &str) -> Self {
        let entries = keys
            .iter()
            .zip(sample.split(':'))
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Replace the value of an existing key; returns false when the key is absent
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => {
                *v = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for FormatFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

/// A parsed VCF data line
#[derive(Debug, Clone)]
pub struct VariantRecord {
    /// CHROM..FORMAT, verbatim
    pub(crate) fixed: Vec<String>,
    pub(crate) alt_alleles: Vec<String>,
    /// Allele list that genotype indices currently refer to; index 0 is REF
    pub(crate) alleles: Vec<String>,
    pub(crate) format: Vec<String>,
    pub(crate) original_samples: Vec<String>,
    pub(crate) samples: Vec<String>,
    pub(crate) state: TransformState,
}

/// Split a line on tab characters
fn split_tabs(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(16);
    let mut start = 0;
    for pos in memchr_iter(b'\t', line.as_bytes()) {
        fields.push(&line[start..pos]);
        start = pos + 1;
    }
    fields.push(&line[start..]);
    fields
}

impl VariantRecord {
    /// Parse a data line, requiring exactly `expected_columns` tab-separated fields
    pub fn parse(
        line: &str,
        line_number: usize,
        expected_columns: usize,
    ) -> Result<Self, MalformedRecordError> {
        let fields = split_tabs(line);
        if fields.len() != expected_columns || fields.len() <= FIXED_FIELD_COUNT {
            return Err(MalformedRecordError::new(
                line_number,
                expected_columns,
                fields.len(),
                line,
            ));
        }

        let fixed: Vec<String> = fields[..FIXED_FIELD_COUNT]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let alt_alleles: Vec<String> = fixed[4].split(',').map(str::to_string).collect();
        let mut alleles = Vec::with_capacity(alt_alleles.len() + 1);
        alleles.push(fixed[3].clone());
        alleles.extend(alt_alleles.iter().cloned());
        let format = fixed[8].split(':').map(str::to_string).collect();
        let samples: Vec<String> = fields[FIXED_FIELD_COUNT..]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            fixed,
            alt_alleles,
            alleles,
            format,
            original_samples: samples.clone(),
            samples,
            state: TransformState::Untouched,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.fixed[0]
    }

    /// POS as written in the input
    pub fn pos(&self) -> &str {
        &self.fixed[1]
    }

    /// POS as a number
    pub fn position(&self) -> ValidationResult<u64> {
        self.pos()
            .parse()
            .map_err(|_| ValidationError::InvalidPosition(self.pos().to_string()))
    }

    pub fn id(&self) -> &str {
        &self.fixed[2]
    }

    pub fn ref_allele(&self) -> &str {
        &self.fixed[3]
    }

    pub fn alt_alleles(&self) -> &[String] {
        &self.alt_alleles
    }

    /// Current allele list: REF followed by ALTs, or the last remap target
    pub fn alleles(&self) -> &[String] {
        &self.alleles
    }

    pub fn qual(&self) -> &str {
        &self.fixed[5]
    }

    pub fn filter(&self) -> &str {
        &self.fixed[6]
    }

    pub fn info(&self) -> &str {
        &self.fixed[7]
    }

    /// Raw FORMAT column
    pub fn format(&self) -> &str {
        &self.fixed[8]
    }

    pub fn format_keys(&self) -> &[String] {
        &self.format
    }

    pub fn fixed_fields(&self) -> &[String] {
        &self.fixed
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Sample data as parsed, before any transformation
    pub fn original_samples(&self) -> &[String] {
        &self.original_samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Total number of columns when serialized
    pub fn field_count(&self) -> usize {
        FIXED_FIELD_COUNT + self.samples.len()
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    /// True when the current sample data differs from the parse-time snapshot
    pub fn is_modified(&self) -> bool {
        self.samples != self.original_samples
    }

    /// FORMAT-keyed view of one sample's current data
    pub fn sample_fields(&self, index: usize) -> Option<FormatFields> {
        self.samples
            .get(index)
            .map(|sample| FormatFields::parse(&self.format, sample))
    }

    /// Randomly permute the sample columns
    ///
    /// Header sample names are not touched; keeping names and data aligned
    /// is the caller's responsibility.
    pub fn shuffle_samples(&mut self) {
        self.shuffle_samples_with(&mut rand::rng());
    }

    /// Randomly permute the sample columns using the given generator
    pub fn shuffle_samples_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
        self.state = TransformState::Shuffled;
    }

    /// Serialize as a tab-separated line without a trailing newline
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fixed.iter().chain(self.samples.iter()).enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

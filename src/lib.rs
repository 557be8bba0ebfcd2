//! VcfAnonymizer - streaming VCF anonymization
//!
//! Parses VCF files record by record and rewrites per-sample data:
//! sample renaming, sample column shuffling, genotype remapping and
//! haploid conversion on sex chromosomes.
//!
//! # Features
//!
//! - Single-pass streaming reader over plain, gzip or bzip2 input
//! - Strict header validation and per-line field-count checks
//! - PL, AD or DR/DV based diploid to haploid conversion
//!
//! # Example
//!
//! ```ignore
//! use vcf_anonymizer::{Region, RegionSet, VcfReader};
//!
//! let mut reader = VcfReader::from_path("calls.vcf.gz")?;
//! reader.set_sample_names(&["sample_1", "sample_2"])?;
//! let regions = RegionSet::new(vec![Region::new("chrX", 2781479, 155701383)?]);
//!
//! println!("{}\n{}", reader.metadata(), reader.header());
//! for record in reader {
//!     let mut record = record?;
//!     record.fix_ploidy(&["m", "f"], &regions)?;
//!     record.shuffle_samples();
//!     println!("{}", record);
//! }
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    FormatError, MalformedRecordError, Region, RegionSet, Result, ValidationError, VcfAnonError,
};
pub use formats::{
    FormatFields, HeaderLine, MetadataBlock, Sex, TransformState, VariantRecord, VcfReader,
};

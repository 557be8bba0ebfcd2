//! File format adapters
//!
//! VCF reading, the variant record model and its anonymizing
//! transformations (genotype remapping, sample shuffling, ploidy fixing).

pub mod genotype;
pub mod ploidy;
pub mod record;
pub mod vcf;

pub use genotype::{is_no_call, remap_genotype, NO_CALL};
pub use ploidy::{genotype_index, haploid_from_pls, unique_argmax, HaploidCall, Sex};
pub use record::{FormatFields, TransformState, VariantRecord, FIXED_FIELD_COUNT};
pub use vcf::{HeaderLine, MetadataBlock, VcfReader, HEADER_COLUMNS, RESERVED_METADATA_KEYS};

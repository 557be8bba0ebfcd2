//! Error types for VcfAnonymizer
//!
//! Defines all error types used throughout the library.

use crate::formats::record::TransformState;
use thiserror::Error;

/// Main error type for VcfAnonymizer operations
#[derive(Debug, Error)]
pub enum VcfAnonError {
    /// Metadata/header block errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Data line does not match the header layout
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecordError),

    /// Caller-supplied arguments violate an operation contract
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors (including invalid UTF-8 in the input)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the metadata/header block. Fatal at reader construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Input contains no lines at all
    #[error("Input is empty")]
    EmptyInput,

    /// First line is not a metadata or header line
    #[error("VCF files always have to start with a metadata line")]
    MissingMetadata,

    /// Metadata block ended without a `#CHROM` header line
    #[error("No header line found")]
    MissingHeader,

    /// The fixed leading columns are wrong
    #[error("Header does not contain the correct fixed fields: {found}")]
    InvalidHeaderColumns { found: String },

    /// Header declares no sample columns
    #[error("This VCF file does not contain any samples")]
    NoSamples,

    /// A sample column in the header is empty
    #[error("Header column {column} has an empty sample name")]
    EmptySampleName { column: usize },

    /// A second header line appeared
    #[error("Duplicate header line at line {line_number}")]
    DuplicateHeader { line_number: usize },
}

/// A data line whose field count differs from the header.
/// Terminates the record sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line_number} has {found} fields, expected {expected}: {line}")]
pub struct MalformedRecordError {
    /// Line number in the input (1-based)
    pub line_number: usize,
    /// Column count from the header
    pub expected: usize,
    /// Column count of the offending line
    pub found: usize,
    /// The offending line (first 100 characters)
    pub line: String,
}

impl MalformedRecordError {
    pub fn new(line_number: usize, expected: usize, found: usize, line: &str) -> Self {
        Self {
            line_number,
            expected,
            found,
            line: line.chars().take(100).collect(),
        }
    }
}

/// Contract violations by the caller of a record or header operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Number of sample names ({found}) does not match number of samples ({expected})")]
    SampleCountMismatch { expected: usize, found: usize },

    #[error("Invalid sample name '{0}': only letters, numbers and underscores are allowed")]
    InvalidSampleName(String),

    #[error("Metadata key '{0}' is reserved, please use another key")]
    ReservedMetadataKey(String),

    #[error("Number of sexes ({found}) does not match number of samples ({expected})")]
    SexCountMismatch { expected: usize, found: usize },

    #[error("The specified sex '{0}' is not valid, use m, male or xy for males and f, female or xx for females")]
    InvalidSex(String),

    #[error("Sample data has already been modified ({state:?}), fix ploidy before shuffling samples or updating genotypes")]
    AlreadyModified { state: TransformState },

    #[error("FORMAT '{format}' at {chrom}:{pos} is not supported for fixing ploidy")]
    UnsupportedFormat {
        format: String,
        chrom: String,
        pos: String,
    },

    #[error("PL field '{value}' at {chrom}:{pos} does not have {expected} values as expected")]
    InvalidPlCount {
        value: String,
        expected: usize,
        chrom: String,
        pos: String,
    },

    #[error("Allele '{0}' is not present in the target allele list")]
    AlleleNotFound(String),

    #[error("Genotype '{genotype}' does not index into {alleles} alleles")]
    InvalidGenotype { genotype: String, alleles: usize },

    #[error("Invalid number in field {field}: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid position '{0}'")]
    InvalidPosition(String),

    #[error("Invalid region '{0}'")]
    InvalidRegion(String),
}

/// Result type alias for VcfAnonymizer operations
pub type Result<T> = std::result::Result<T, VcfAnonError>;

/// Result type alias for header parsing
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Result type alias for record and header operations
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

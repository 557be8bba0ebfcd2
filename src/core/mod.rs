//! Core functionality shared by the format adapters
//!
//! This module contains the error taxonomy, input/output source
//! selection and the genomic region index.

mod error;
pub mod io;
pub mod region;

pub use error::{
    FormatError, FormatResult, MalformedRecordError, Result, ValidationError, ValidationResult,
    VcfAnonError,
};
pub use io::{
    create_output, detect_compression, open_input, CompressionFormat, LineIterator, SmartReader,
    DEFAULT_BUFFER_SIZE, LARGE_BUFFER_SIZE, MMAP_THRESHOLD,
};
pub use region::{read_bed_regions, Region, RegionSet};

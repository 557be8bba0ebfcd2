//! VCF streaming reader
//!
//! Reads and validates the metadata block and `#CHROM` header line on
//! construction, then yields one [`VariantRecord`] per data line. The
//! sequence is single-pass and stops at the first malformed line.

use crate::core::{
    open_input, FormatError, FormatResult, LineIterator, Result, ValidationError,
    ValidationResult,
};
use crate::formats::record::{VariantRecord, FIXED_FIELD_COUNT};
use log::{debug, info};
use regex::Regex;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;

/// Fixed leading header columns
pub const HEADER_COLUMNS: [&str; FIXED_FIELD_COUNT] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

/// Metadata keys that may not be appended as free-form lines
pub const RESERVED_METADATA_KEYS: [&str; 5] = ["info", "filter", "format", "contig", "fileformat"];

fn sample_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-zA-Z0-9_]+$").expect("valid sample name pattern"))
}

/// `##` metadata lines in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    lines: Vec<String>,
}

impl MetadataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw metadata line as read from the input
    pub(crate) fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// Append `##key=value`
    ///
    /// Reserved keys are rejected (case-insensitive). An identical existing
    /// line is left as is; returns whether a line was added.
    pub fn add(&mut self, key: &str, value: &str) -> ValidationResult<bool> {
        let lower = key.to_ascii_lowercase();
        if RESERVED_METADATA_KEYS.contains(&lower.as_str()) {
            return Err(ValidationError::ReservedMetadataKey(key.to_string()));
        }

        let line = format!("##{}={}", key, value);
        if self.lines.contains(&line) {
            return Ok(false);
        }
        self.lines.push(line);
        Ok(true)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for MetadataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// The `#CHROM` column header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    columns: Vec<String>,
}

impl HeaderLine {
    /// Parse a header line; the leading `#` is optional
    pub fn parse(line: &str) -> FormatResult<Self> {
        let body = line
            .strip_prefix('#')
            .unwrap_or(line)
            .trim_end_matches(['\r', '\n']);
        let columns: Vec<String> = body.split('\t').map(str::to_string).collect();

        if columns.len() < FIXED_FIELD_COUNT
            || columns[..FIXED_FIELD_COUNT]
                .iter()
                .zip(HEADER_COLUMNS.iter())
                .any(|(found, expected)| found != expected)
        {
            return Err(FormatError::InvalidHeaderColumns {
                found: columns
                    .iter()
                    .take(FIXED_FIELD_COUNT)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
        if columns.len() == FIXED_FIELD_COUNT {
            return Err(FormatError::NoSamples);
        }
        if let Some(column) = columns.iter().position(String::is_empty) {
            return Err(FormatError::EmptySampleName { column: column + 1 });
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn samples(&self) -> &[String] {
        &self.columns[FIXED_FIELD_COUNT..]
    }

    /// Total column count, fixed columns included
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Replace the sample names; the header is unchanged on error
    pub fn set_sample_names<S: AsRef<str>>(&mut self, names: &[S]) -> ValidationResult<()> {
        let expected = self.samples().len();
        if names.len() != expected {
            return Err(ValidationError::SampleCountMismatch {
                expected,
                found: names.len(),
            });
        }
        if let Some(bad) = names
            .iter()
            .find(|name| !sample_name_pattern().is_match(name.as_ref()))
        {
            return Err(ValidationError::InvalidSampleName(bad.as_ref().to_string()));
        }

        self.columns.truncate(FIXED_FIELD_COUNT);
        self.columns
            .extend(names.iter().map(|name| name.as_ref().to_string()));
        Ok(())
    }
}

impl fmt::Display for HeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.columns.join("\t"))
    }
}

fn read_owned<R: BufRead>(lines: &mut LineIterator<R>) -> std::io::Result<Option<String>> {
    match lines.next_line() {
        None => Ok(None),
        Some(line) => Ok(Some(line?.to_string())),
    }
}

/// Streaming VCF reader yielding [`VariantRecord`]s
pub struct VcfReader<R: BufRead> {
    lines: LineIterator<R>,
    metadata: MetadataBlock,
    header: HeaderLine,
    /// First data line, read while scanning the header block
    pending: Option<(usize, String)>,
    finished: bool,
}

impl VcfReader<Box<dyn BufRead>> {
    /// Open a plain, gzip or bzip2 VCF file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Reading vcf from file {:?}", path.as_ref());
        Self::new(open_input(path)?)
    }
}

impl<R: BufRead> VcfReader<R> {
    /// Read the metadata block and header line from `reader`
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = LineIterator::new(reader);
        let mut metadata = MetadataBlock::new();
        let mut header: Option<HeaderLine> = None;
        let mut pending = None;

        let mut current = read_owned(&mut lines)?;
        match current.as_deref() {
            None => return Err(FormatError::EmptyInput.into()),
            Some(line) if !line.starts_with('#') => {
                return Err(FormatError::MissingMetadata.into())
            }
            Some(_) => {}
        }

        while let Some(line) = current.take() {
            let line_number = lines.line_number();

            if line.starts_with("##") {
                metadata.push_line(&line);
            } else if line.starts_with('#') {
                if header.is_some() {
                    return Err(FormatError::DuplicateHeader { line_number }.into());
                }
                header = Some(HeaderLine::parse(&line)?);
            } else if !line.is_empty() {
                pending = Some((line_number, line));
                break;
            }

            current = read_owned(&mut lines)?;
        }

        let header = header.ok_or(FormatError::MissingHeader)?;
        info!(
            "Parsed {} metadata lines and {} samples",
            metadata.len(),
            header.samples().len()
        );

        Ok(Self {
            lines,
            metadata,
            header,
            pending,
            finished: false,
        })
    }

    pub fn metadata(&self) -> &MetadataBlock {
        &self.metadata
    }

    /// Append a `##key=value` metadata line (see [`MetadataBlock::add`])
    pub fn add_meta(&mut self, key: &str, value: &str) -> ValidationResult<bool> {
        self.metadata.add(key, value)
    }

    pub fn header(&self) -> &HeaderLine {
        &self.header
    }

    pub fn samples(&self) -> &[String] {
        self.header.samples()
    }

    /// Rename the header's sample columns; record data is positional and unaffected
    pub fn set_sample_names<S: AsRef<str>>(&mut self, names: &[S]) -> ValidationResult<()> {
        self.header.set_sample_names(names)?;
        info!("Changing sample names to: {:?}", self.header.samples());
        Ok(())
    }
}

fn parse_record(line: &str, line_number: usize, expected: usize) -> Result<VariantRecord> {
    VariantRecord::parse(line, line_number, expected).map_err(|e| {
        debug!("Variant line {} is malformed", line_number);
        e.into()
    })
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let expected = self.header.len();
        let result = match self.pending.take() {
            Some((line_number, line)) => parse_record(&line, line_number, expected),
            None => loop {
                let line_number = self.lines.line_number() + 1;
                match self.lines.next_line() {
                    None => {
                        self.finished = true;
                        return None;
                    }
                    Some(Err(e)) => break Err(e.into()),
                    Some(Ok(line)) if line.is_empty() || line.starts_with('#') => continue,
                    Some(Ok(line)) => break parse_record(line, line_number, expected),
                }
            },
        };

        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

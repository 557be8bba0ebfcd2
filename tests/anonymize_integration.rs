//! End-to-end tests over on-disk VCF files
//!
//! Plain and gzip input, full anonymization pipeline and serialization.

use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tempfile::NamedTempFile;
use vcf_anonymizer::core::{create_output, Region, RegionSet, VcfAnonError};
use vcf_anonymizer::formats::{TransformState, VariantRecord, VcfReader};

const VCF: &str = "##fileformat=VCFv4.2
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=GQ,Number=1,Type=Integer,Description=\"Genotype Quality\">
##FORMAT=<ID=PL,Number=G,Type=Integer,Description=\"Phred-scaled genotype likelihoods\">
##contig=<ID=chr1,length=248956422>
##contig=<ID=chrX,length=156040895>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tHG002\tHG003\tHG004
chr1\t10000\t.\tA\tG\t40\tPASS\t.\tGT:GQ:PL\t0/1:30:30,0,40\t0/0:50:0,50,500\t1/1:40:400,40,0
chrX\t3000000\t.\tC\tT\t40\tPASS\t.\tGT:GQ:PL\t0/1:3:0,3,30\t0/1:20:40,0,30\t./.:0:0,0,0
chrX\t3000100\t.\tG\tA\t40\tPASS\t.\tGT:GQ:PL\t1/1:40:400,40,0\t0/1:20:40,0,30\t0/0:50:0,50,500
";

fn write_plain() -> NamedTempFile {
    let mut temp = tempfile::Builder::new().suffix(".vcf").tempfile().unwrap();
    temp.write_all(VCF.as_bytes()).unwrap();
    temp.flush().unwrap();
    temp
}

fn regions() -> RegionSet {
    RegionSet::new(vec![Region::new("chrX", 2_781_479, 155_701_383).unwrap()])
}

#[test]
fn test_plain_file_pipeline() {
    let temp = write_plain();
    let mut reader = VcfReader::from_path(temp.path()).unwrap();
    assert_eq!(reader.metadata().len(), 6);
    assert_eq!(reader.samples(), ["HG002", "HG003", "HG004"]);

    reader.set_sample_names(&["sample_1", "sample_2", "sample_3"]).unwrap();
    reader.add_meta("anonymized", "true").unwrap();

    let sexes = ["m", "f", "m"];
    let records: Vec<VariantRecord> = reader
        .by_ref()
        .map(|r| {
            let mut record = r.unwrap();
            record.fix_ploidy(&sexes, &regions()).unwrap();
            record
        })
        .collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].samples(), records[0].original_samples());
    assert_eq!(
        records[1].samples(),
        ["0:30:0,30", "0/1:20:40,0,30", ".:0:0,0"]
    );
    assert_eq!(records[2].samples(), ["1:400:400,0", "0/1:20:40,0,30", "0:500:0,500"]);
    assert!(records.iter().all(|r| r.state() == TransformState::PloidyFixed));

    assert!(reader.metadata().to_string().ends_with("##anonymized=true"));
    assert_eq!(
        reader.header().to_string(),
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample_1\tsample_2\tsample_3"
    );
}

#[test]
fn test_gzip_input_matches_plain() {
    let mut temp = tempfile::Builder::new().suffix(".vcf.gz").tempfile().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(VCF.as_bytes()).unwrap();
    temp.write_all(&encoder.finish().unwrap()).unwrap();
    temp.flush().unwrap();

    let plain = write_plain();
    let from_gz: Vec<String> = VcfReader::from_path(temp.path())
        .unwrap()
        .map(|r| r.unwrap().to_line())
        .collect();
    let from_plain: Vec<String> = VcfReader::from_path(plain.path())
        .unwrap()
        .map(|r| r.unwrap().to_line())
        .collect();
    assert_eq!(from_gz, from_plain);
    assert_eq!(from_gz.len(), 3);
}

#[test]
fn test_fix_then_shuffle_then_write() {
    let temp = write_plain();
    let out = tempfile::Builder::new().suffix(".vcf").tempfile().unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let reader = VcfReader::from_path(temp.path()).unwrap();
    {
        let mut output = create_output(out.path()).unwrap();
        writeln!(output, "{}", reader.metadata()).unwrap();
        writeln!(output, "{}", reader.header()).unwrap();
        for record in reader {
            let mut record = record.unwrap();
            record.fix_ploidy(&["f", "f", "f"], &regions()).unwrap();
            record.shuffle_samples_with(&mut rng);
            assert!(record.fix_ploidy(&["f", "f", "f"], &regions()).is_err());
            writeln!(output, "{}", record).unwrap();
        }
        output.flush().unwrap();
    }

    let reread: Vec<VariantRecord> = VcfReader::from_path(out.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let original: Vec<VariantRecord> = VcfReader::new(VCF.as_bytes())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(reread.len(), original.len());
    for (a, b) in reread.iter().zip(&original) {
        let mut left = a.samples().to_vec();
        let mut right = b.samples().to_vec();
        left.sort();
        right.sort();
        assert_eq!(left, right);
        assert_eq!(a.fixed_fields(), b.fixed_fields());
    }
}

#[test]
fn test_malformed_file_stops_iteration() {
    let mut temp = tempfile::Builder::new().suffix(".vcf").tempfile().unwrap();
    let broken = VCF.replace("\t1/1:40:400,40,0\t0/1:20:40,0,30\t0/0:50:0,50,500", "\t1/1:40:400,40,0");
    temp.write_all(broken.as_bytes()).unwrap();
    temp.flush().unwrap();

    let results: Vec<_> = VcfReader::from_path(temp.path()).unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    match &results[2] {
        Err(VcfAnonError::MalformedRecord(err)) => assert_eq!(err.line_number, 10),
        other => panic!("expected malformed record error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        VcfReader::from_path("/nonexistent/input.vcf"),
        Err(VcfAnonError::Io(_))
    ));
}

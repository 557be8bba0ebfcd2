//! Region membership property tests
//!
//! Regions exclude their start and include their end.

use proptest::prelude::*;
use vcf_anonymizer::core::{read_bed_regions, Region, RegionSet};

fn arb_chrom_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("chr1".to_string()),
        Just("chrX".to_string()),
        Just("chrY".to_string()),
        Just("X".to_string()),
    ]
}

fn arb_region() -> impl Strategy<Value = Region> {
    (arb_chrom_name(), 0u64..1_000_000, 0u64..10_000)
        .prop_map(|(chrom, start, len)| Region::new(chrom, start, start + len).unwrap())
}

proptest! {
    /// The indexed set agrees with a linear scan over all regions
    #[test]
    fn prop_set_matches_linear_scan(
        regions in prop::collection::vec(arb_region(), 0..20),
        chrom in arb_chrom_name(),
        pos in 0u64..1_010_000
    ) {
        let set = RegionSet::new(regions.clone());
        let expected = regions.iter().any(|r| r.contains(&chrom, pos));
        prop_assert_eq!(set.contains(&chrom, pos), expected);
    }

    /// start is outside, end is inside
    #[test]
    fn prop_exclusive_start_inclusive_end(region in arb_region()) {
        let set = RegionSet::new(vec![region.clone()]);
        prop_assert!(!set.contains(&region.chrom, region.start));
        prop_assert_eq!(set.contains(&region.chrom, region.end), region.end > region.start);
        prop_assert!(!set.contains(&region.chrom, region.end + 1));
    }

    /// chrom:start-end strings parse back to the same region
    #[test]
    fn prop_region_string_parse(region in arb_region()) {
        let text = format!("{}:{}-{}", region.chrom, region.start, region.end);
        let parsed: Region = text.parse().unwrap();
        prop_assert_eq!(parsed, region);
    }
}

#[test]
fn test_bed_regions_skip_headers() {
    let bed = "browser position chrX\ntrack name=nonpar\n# comment\nchrX\t2781479\t155701383\n";
    let regions = read_bed_regions(bed.as_bytes()).unwrap();
    assert_eq!(regions, vec![Region::new("chrX", 2781479, 155701383).unwrap()]);
}

#[test]
fn test_bed_region_invalid() {
    assert!(read_bed_regions("chrX\tabc\t10\n".as_bytes()).is_err());
    assert!(Region::new("chrX", 10, 5).is_err());
}

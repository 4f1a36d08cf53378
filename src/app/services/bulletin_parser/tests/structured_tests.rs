//! Tests for the structured (CSV-row) extractor

use super::{as_lines, structured_bulletin};
use crate::app::services::bulletin_parser::structured::StructuredExtractor;

#[test]
fn end_to_end_scenario_row_parses_to_canonical_schema() {
    let extractor = StructuredExtractor::new();
    let lines = vec![
        ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
    ];

    let result = extractor.extract(&lines);
    assert_eq!(result.observations.len(), 1);

    let obs = &result.observations[0];
    assert_eq!(obs.date, "1/19/2025");
    assert_eq!(obs.time, "1000 PM");
    assert_eq!(obs.state, "CT");
    assert_eq!(obs.county, "Fairfield");
    assert_eq!(obs.city, "Stamford");
    assert_eq!(obs.latitude, Some(41.02));
    assert_eq!(obs.longitude, Some(-73.56));
    assert_eq!(obs.event_type, "SNOW_24");
    assert_eq!(obs.value, Some(2.0));
    assert_eq!(obs.unit, "Inch");
    assert_eq!(obs.source, "Public");
    assert_eq!(obs.description, "24 hour snowfall");
}

#[test]
fn short_row_is_dropped_without_aborting_extraction() {
    let extractor = StructuredExtractor::new();
    let lines = vec![
        ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
        ":1/19/2025,1000 PM, CT, Fairfield, Stamford, 41.02, -73.56, SNOW_24, 2, Inch",
        ":1/19/2025,945 PM, CT, New Haven, Milford, , , 41.22, -73.06, SNOW_24, 2.5, Inch, Public, 24 hour snowfall",
    ];

    let result = extractor.extract(&lines);

    assert_eq!(result.observations.len(), 2);
    assert_eq!(result.stats.rows_skipped, 1);
    assert_eq!(result.observations[0].city, "Stamford");
    assert_eq!(result.observations[1].city, "Milford");
}

#[test]
fn unparsable_float_skips_only_that_row() {
    let extractor = StructuredExtractor::new();
    let lines = vec![
        ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , not-a-number, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
        ":1/19/2025,945 PM, CT, New Haven, Milford, , , 41.22, -73.06, SNOW_24, 2.5, Inch, Public, 24 hour snowfall",
    ];

    let result = extractor.extract(&lines);

    assert_eq!(result.observations.len(), 1);
    assert_eq!(result.observations[0].city, "Milford");
    assert_eq!(result.stats.rows_skipped, 1);
    assert_eq!(result.stats.errors.len(), 1);
    assert!(result.stats.errors[0].contains("latitude"));
}

#[test]
fn empty_optional_fields_become_defaults() {
    let extractor = StructuredExtractor::new();
    let lines = vec![":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , , , , , , ,"];

    let result = extractor.extract(&lines);
    assert_eq!(result.observations.len(), 1);

    let obs = &result.observations[0];
    assert_eq!(obs.latitude, None);
    assert_eq!(obs.longitude, None);
    assert_eq!(obs.event_type, "UNKNOWN");
    assert_eq!(obs.value, None);
    assert_eq!(obs.unit, "UNKNOWN");
    assert_eq!(obs.source, "UNKNOWN");
    assert_eq!(obs.description, "UNKNOWN");
}

#[test]
fn event_type_is_uppercased_and_trimmed() {
    let extractor = StructuredExtractor::new();
    let lines =
        vec![":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , , , snow_24 , 2, Inch, Public, x"];

    let result = extractor.extract(&lines);

    assert_eq!(result.observations[0].event_type, "SNOW_24");
}

#[test]
fn quoted_fields_may_contain_commas() {
    let extractor = StructuredExtractor::new();
    let lines = vec![
        ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public,\"heavy, wet snowfall\"",
    ];

    let result = extractor.extract(&lines);

    assert_eq!(result.observations.len(), 1);
    assert_eq!(result.observations[0].description, "heavy, wet snowfall");
}

#[test]
fn prose_and_blank_lines_are_not_rows() {
    let extractor = StructuredExtractor::new();
    let lines = vec![
        "Public Information Statement",
        "",
        "...SNOWFALL REPORTS...",
        "The National Weather Service in Upton has received the following reports.",
    ];

    let result = extractor.extract(&lines);

    assert!(result.observations.is_empty());
    // Blank line is not counted; the three prose lines are skipped
    assert_eq!(result.stats.lines_seen, 3);
    assert_eq!(result.stats.rows_skipped, 3);
}

#[test]
fn exact_duplicates_collapse_before_returning() {
    let extractor = StructuredExtractor::new();
    let text = structured_bulletin();

    let result = extractor.extract(&as_lines(&text));

    assert_eq!(result.observations.len(), 2);
    assert_eq!(result.stats.duplicates_removed, 1);
}

use accident_harm::analyzers::analyzer::analyze;
use accident_harm::analyzers::rules::{BICYCLE, Framing, MOTOR_VEHICLE};
use accident_harm::config::RunConfig;
use accident_harm::normalize::MissingValuePolicy;
use accident_harm::output::write_joined_series;
use accident_harm::parser::parse_table;
use accident_harm::schema::{Column, Translations};
use chrono::NaiveDate;
use std::collections::HashMap;

const TRANSLATIONS: &str = include_str!("../data/column_name_translations.json");

/// Builds a semicolon CSV with the source-language headers of every required
/// column. Each row lists only the canonical cells it cares about.
fn source_csv(rows: &[&[(&str, &str)]]) -> String {
    let entries: Vec<serde_json::Value> = serde_json::from_str(TRANSLATIONS).unwrap();
    let to_source: HashMap<&str, &str> = entries
        .iter()
        .map(|e| (e["en"].as_str().unwrap(), e["ee"].as_str().unwrap()))
        .collect();

    let canonical: Vec<&str> = Column::required().into_iter().map(Column::name).collect();
    let mut lines = vec![
        canonical
            .iter()
            .map(|c| to_source[c])
            .collect::<Vec<_>>()
            .join(";"),
    ];

    for row in rows {
        let cells: HashMap<&str, &str> = row.iter().copied().collect();
        let line = canonical
            .iter()
            .map(|c| {
                cells.get(c).copied().unwrap_or(match *c {
                    "within_built_up_area" => "EI",
                    "street_name" | "route_number" | "speed_limit" => "",
                    "route_km_marker" | "gps_x" | "gps_y" => "",
                    _ => "0",
                })
            })
            .collect::<Vec<_>>()
            .join(";");
        lines.push(line);
    }

    lines.join("\n")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_naive_pipeline_end_to_end() {
    let csv = source_csv(&[
        // Inside the box and on route 15 km 19: matched twice, counted once.
        &[
            ("case_number", "A1"),
            ("time", "05.01.2020 08:15"),
            ("n_injured", "2"),
            ("involves_cyclist", "1"),
            ("route_number", "15"),
            ("route_km_marker", "19,2"),
            ("gps_x", "6566000,0"),
            ("gps_y", "543000,0"),
        ],
        // Route match only, by street name.
        &[
            ("case_number", "A2"),
            ("time", "2020-01-05 17:40:00"),
            ("n_diseased", "1"),
            ("involves_motor_vehicle_driver", "1"),
            ("street_name", "TALLINN - RAPLA - TÜRI"),
            ("route_km_marker", "20,0"),
        ],
        // Inside the box on the coincidental route: excluded.
        &[
            ("case_number", "A3"),
            ("time", "06.01.2020 09:00"),
            ("n_injured", "5"),
            ("involves_motor_vehicle_driver", "1"),
            ("route_number", "11154"),
            ("route_km_marker", "1,0"),
            ("gps_x", "6566500"),
            ("gps_y", "543500"),
        ],
        // Elsewhere in Estonia.
        &[
            ("case_number", "A4"),
            ("time", "07/01/2020 10:00"),
            ("n_injured", "1"),
            ("involves_cyclist", "1"),
            ("route_number", "2"),
            ("route_km_marker", "100,5"),
            ("gps_x", "6400000"),
            ("gps_y", "650000"),
        ],
    ]);

    let table = parse_table(csv.as_bytes()).unwrap();
    let translations = Translations::from_json(TRANSLATIONS).unwrap();
    let mut config = RunConfig::default();
    config.framing = Framing::Naive;

    let result = analyze(table, &translations, &config).unwrap();

    assert!(result.translation.untranslated.is_empty());
    assert_eq!(result.normalize.rows_read, 4);
    let cases: Vec<_> = result.filtered.iter().map(|r| r.case_number.as_str()).collect();
    assert_eq!(cases, vec!["A1", "A2"]);

    let joined = &result.joined;
    assert_eq!(joined.rows.len(), 1);
    assert_eq!(joined.harmed_on(day(2020, 1, 5), BICYCLE), Some(2));
    assert_eq!(joined.harmed_on(day(2020, 1, 5), MOTOR_VEHICLE), Some(1));

    let mut buffer = Vec::new();
    write_joined_series(&mut buffer, joined).unwrap();
    let content = String::from_utf8(buffer).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "day,n_harmed_motor_vehicle,n_harmed_bicycle,n_harmed_motor_vehicle_cumulative,n_harmed_bicycle_cumulative",
            "2020-01-05,1,2,1,2",
        ]
    );
}

#[test]
fn test_victim_pipeline_end_to_end() {
    let csv = source_csv(&[
        &[
            ("case_number", "B1"),
            ("time", "12.05.2021 12:00"),
            ("n_injured", "3"),
            ("involves_cyclist", "1"),
            ("route_number", "15"),
            ("route_km_marker", "18,500"),
        ],
        // A lone injured cyclist is the presumed at-fault party: no victims.
        &[
            ("case_number", "B2"),
            ("time", "13.05.2021 12:00"),
            ("n_injured", "1"),
            ("involves_cyclist", "1"),
            ("route_number", "15"),
            ("route_km_marker", "18,7"),
        ],
    ]);

    let table = parse_table(csv.as_bytes()).unwrap();
    let translations = Translations::from_json(TRANSLATIONS).unwrap();
    let mut config = RunConfig::default();
    config.framing = Framing::Victims;

    let result = analyze(table, &translations, &config).unwrap();

    assert_eq!(result.filtered.len(), 2);
    assert_eq!(result.filtered[0].route_km_marker, Some(18.5));
    assert_eq!(result.joined.harmed_on(day(2021, 5, 12), BICYCLE), Some(2));
    assert_eq!(result.joined.harmed_on(day(2021, 5, 13), BICYCLE), None);

    let motor = result.stats.iter().find(|s| s.category == MOTOR_VEHICLE).unwrap();
    assert!(!motor.has_data());
    assert_eq!(motor.harmed_per_accident, None);

    let bicycle = result
        .intervention
        .iter()
        .find(|s| s.category == BICYCLE)
        .unwrap();
    assert_eq!(bicycle.after.accidents, 1);
    assert_eq!(bicycle.before.accidents, 0);
}

#[test]
fn test_drop_policy_keeps_route_match_without_gps() {
    let csv = source_csv(&[
        &[
            ("case_number", "D1"),
            ("time", "14.03.2022 07:30"),
            ("n_injured", "1"),
            ("involves_motor_vehicle_driver", "1"),
            ("route_number", "15"),
            ("route_km_marker", "19,0"),
        ],
        // Inside the box but without chainage: kept by the box alone.
        &[
            ("case_number", "D2"),
            ("time", "15.03.2022 07:30"),
            ("n_injured", "2"),
            ("involves_motor_vehicle_driver", "1"),
            ("gps_x", "6566000"),
            ("gps_y", "543000"),
        ],
        // Half a coordinate and no chainage matches nothing.
        &[
            ("case_number", "D3"),
            ("time", "16.03.2022 07:30"),
            ("n_injured", "4"),
            ("involves_motor_vehicle_driver", "1"),
            ("gps_x", "6566000"),
        ],
    ]);

    let table = parse_table(csv.as_bytes()).unwrap();
    let translations = Translations::from_json(TRANSLATIONS).unwrap();
    let mut config = RunConfig::default();
    config.missing_values = MissingValuePolicy::Drop;

    let result = analyze(table, &translations, &config).unwrap();

    assert_eq!(result.normalize.rows_used, 3);
    let cases: Vec<_> = result.filtered.iter().map(|r| r.case_number.as_str()).collect();
    assert_eq!(cases, vec!["D2", "D1"]);
    assert_eq!(result.joined.totals(), [3, 0]);
}

#[test]
fn test_bad_decimal_stops_the_run() {
    let csv = source_csv(&[&[
        ("case_number", "C1"),
        ("time", "12.05.2021 12:00"),
        ("route_km_marker", "km18"),
    ]]);

    let table = parse_table(csv.as_bytes()).unwrap();
    let translations = Translations::from_json(TRANSLATIONS).unwrap();
    let err = analyze(table, &translations, &RunConfig::default()).unwrap_err();
    assert!(err.to_string().contains("route_km_marker"), "{err}");
}

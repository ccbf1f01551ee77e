use abtest_analysis::Arm;
use abtest_data::{
    generate_experiment, load_csv, save_csv, DataError, GeneratorConfig, DEFAULT_CSV_PATH,
};
use approx::assert_abs_diff_eq;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn generated_data_survives_a_file_round_trip() {
    init_test_logger();
    let end = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
    let data = generate_experiment(&GeneratorConfig::default(), end).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CSV_PATH);
    save_csv(&data, &path).unwrap();
    let loaded = load_csv(&path).unwrap();
    assert_eq!(loaded, data);

    let summary = loaded.summary();
    assert_eq!(summary.total, 2000);
    assert_eq!(summary.arm(Arm::Control).users, 1000);
    assert_eq!(summary.arm(Arm::Treatment).users, 1000);
    let control = summary.arm(Arm::Control).rate().unwrap();
    let treatment = summary.arm(Arm::Treatment).rate().unwrap();
    assert_abs_diff_eq!(control, 0.10, epsilon = 0.04);
    assert_abs_diff_eq!(treatment, 0.12, epsilon = 0.04);
}

#[test]
fn loaded_data_feeds_the_analyzer() {
    let end = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
    let cfg = GeneratorConfig {
        users_per_arm: 500,
        control_rate: 0.2,
        treatment_rate: 0.4,
        ..GeneratorConfig::default()
    };
    let data = generate_experiment(&cfg, end).unwrap();
    let report = data.analyzer().unwrap().report().unwrap();
    assert_eq!(report.control_n, 500);
    assert_eq!(report.treatment_n, 500);
    assert!(report.effect_size > 0.0);
    assert!(report.is_significant());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_csv(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DataError::Io(_)));
}

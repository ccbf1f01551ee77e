use abtest::render::{render_json, render_text};
use abtest::{parse_config, Dashboard};
use abtest_analysis::{AnalysisError, Arm, Metric, SampleSizePlanner};
use abtest_data::{generate_experiment, load_csv, save_csv, GeneratorConfig};
use abtest_stats::ttest_power;
use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tests::{analyzer, dataset, window_end};

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn csv_rows_reproduce_the_direct_analysis() {
    init_test_logger();
    let data = dataset((10, 100), (12, 100));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    save_csv(&data, &path).unwrap();

    let from_csv = load_csv(&path).unwrap().analyzer().unwrap().report().unwrap();
    let direct = analyzer((10, 100), (12, 100)).report().unwrap();
    assert_eq!(from_csv, direct);

    assert_abs_diff_eq!(direct.relative_improvement, 0.2, epsilon = 1e-9);
    assert_eq!(direct.control_n, 100);
    assert_eq!(direct.treatment_n, 100);
    assert_eq!(direct.display(Metric::RelativeImprovement), "20.0%");
}

#[test]
fn generated_experiment_round_trips_and_analyses() {
    let cfg = GeneratorConfig {
        users_per_arm: 2000,
        ..GeneratorConfig::default()
    };
    let data = generate_experiment(&cfg, window_end()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ab_test_data.csv");
    save_csv(&data, &path).unwrap();
    let loaded = load_csv(&path).unwrap();
    assert_eq!(loaded, data);

    let report = loaded.analyzer().unwrap().report().unwrap();
    assert_eq!(report.control_n, 2000);
    assert!((0.0..=1.0).contains(&report.chi2_p_value));
    assert!((0.0..=1.0).contains(&report.z_p_value));
    assert!((0.0..=1.0).contains(&report.power));
    let summary = loaded.summary();
    assert_eq!(summary.total, 4000);
    assert_eq!(summary.arm(Arm::Treatment).users, 2000);
}

#[test]
fn both_arms_without_conversions_cannot_be_reported() {
    let data = dataset((0, 100), (0, 100));
    let err = data.analyzer().unwrap().report().unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateInput(_)));
}

#[test]
fn planner_answer_reaches_requested_power() {
    let planner = SampleSizePlanner::default();
    for (h, power) in [(0.2, 0.8), (0.5, 0.9), (0.8, 0.7)] {
        let n = planner.required_sample_size(h, power).unwrap();
        assert!(ttest_power(h, n as f64, planner.alpha()).unwrap() >= power);
        assert!(ttest_power(h, (n - 1) as f64, planner.alpha()).unwrap() < power);
    }
}

#[test]
fn configured_dashboard_renders_text_and_json() {
    let cfg = parse_config(
        r#"
[experiment]
control_rate = 0.10
treatment_rate = 0.20
sample_size = 2000

[planner]
effect_size = 0.5
power = 0.9
"#,
    )
    .unwrap();
    let dash = Dashboard::build(cfg).unwrap();
    let report = dash.report().unwrap();
    assert!(report.is_significant());
    assert!(report.relative_improvement > 0.0);

    let text = render_text(&dash);
    assert!(text.contains("The test results are statistically significant!"));
    assert!(text.contains("improvement over the control group."));

    let json: serde_json::Value = serde_json::from_str(&render_json(&dash).unwrap()).unwrap();
    assert_eq!(json["significant"], true);
    assert_eq!(
        json["sample_size_calculator"]["required_sample_size"],
        serde_json::json!(SampleSizePlanner::default()
            .required_sample_size(0.5, 0.9)
            .unwrap())
    );
}

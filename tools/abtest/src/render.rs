//! Text, SVG and JSON views of a [`Dashboard`].

use std::fs;
use std::path::{Path, PathBuf};

use abtest_analysis::format::{fixed, percent, thousands};
use abtest_analysis::{Metric, Report, Sample};
use abtest_stats::{
    bar_chart_ascii, bar_chart_svg, gaussian_kde, line_chart_svg, sparkline_ascii, Series,
};
use serde::Serialize;

use crate::config::{ExperimentSection, PlannerSection};
use crate::dashboard::{interpretation, relative_delta, Dashboard};
use crate::error::DashboardError;

pub const RATES_SVG: &str = "conversion_rates.svg";
pub const DISTRIBUTION_SVG: &str = "distribution.svg";

const TITLE: &str = "A/B Test Analysis Dashboard";
const BAR_WIDTH: usize = 40;
const SPARK_WIDTH: usize = 48;
const KDE_GRID: usize = 200;
const KDE_CUT: f64 = 3.0;
const SVG_SIZE: (u32, u32) = (640, 400);

fn percent1(v: f64) -> String {
    percent(v, 1)
}

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.chars().count()));
    out.push('\n');
}

/// Full terminal dashboard.
pub fn render_text(dash: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&"=".repeat(TITLE.len()));
    out.push('\n');
    out.push_str(&parameters_line(&dash.config.experiment));
    out.push('\n');

    heading(&mut out, "Test Results");
    match &dash.analysis {
        Ok(report) => {
            for line in metric_columns(report) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        Err(err) => {
            out.push_str(&format!("Analysis unavailable: {err}\n"));
        }
    }

    heading(&mut out, "Visualizations");
    out.push_str("Conversion Rates\n");
    let rates = [
        ("Control", dash.control.conversion_rate()),
        ("Treatment", dash.treatment.conversion_rate()),
    ];
    for line in bar_chart_ascii(&rates, BAR_WIDTH, percent1) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("\nDistribution of Conversions\n");
    for (label, sample) in [("Control", &dash.control), ("Treatment", &dash.treatment)] {
        out.push_str(&format!("{label:<9} {}\n", density_sparkline(sample)));
    }

    if let Some(report) = dash.report() {
        heading(&mut out, "Interpretation");
        for line in interpretation(report) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    heading(&mut out, "Sample Size Calculator");
    out.push_str(&planner_lines(&dash.config.planner, dash.required_sample_size));
    out
}

fn parameters_line(e: &ExperimentSection) -> String {
    format!(
        "Control rate {}, treatment rate {}, {} users per group, seed {}",
        percent(e.control_rate, 1),
        percent(e.treatment_rate, 1),
        thousands(e.sample_size),
        e.seed
    )
}

/// Two metric columns: rates and sample sizes on the left, test results on
/// the right.
pub fn metric_columns(report: &Report) -> Vec<String> {
    let treatment = format!(
        "{} ({})",
        report.display(Metric::TreatmentRate),
        relative_delta(report)
    );
    let left = [
        (Metric::ControlRate, report.display(Metric::ControlRate)),
        (Metric::TreatmentRate, treatment),
        (Metric::ControlN, report.display(Metric::ControlN)),
        (Metric::TreatmentN, report.display(Metric::TreatmentN)),
    ];
    let right = [
        Metric::Chi2PValue,
        Metric::ZPValue,
        Metric::EffectSize,
        Metric::Power,
    ];
    let lw = left.iter().map(|(m, _)| m.label().len()).max().unwrap_or(0);
    let rw = right.iter().map(|m| m.label().len()).max().unwrap_or(0);
    let vw = left.iter().map(|(_, v)| v.len()).max().unwrap_or(0);

    left.iter()
        .zip(right)
        .map(|((lm, lv), rm)| {
            format!(
                "{:<lw$}  {:<vw$}    {:<rw$}  {}",
                lm.label(),
                lv,
                rm.label(),
                report.display(rm)
            )
        })
        .collect()
}

fn density_sparkline(sample: &Sample) -> String {
    let curve = gaussian_kde(&sample.to_f64(), KDE_GRID, KDE_CUT);
    if curve.is_empty() {
        return "(no variation)".to_string();
    }
    let densities: Vec<f64> = curve.iter().map(|&(_, d)| d).collect();
    sparkline_ascii(&densities, SPARK_WIDTH)
}

fn planner_lines(planner: &PlannerSection, required: usize) -> String {
    format!(
        "Desired Effect Size (Cohen's h): {}\nDesired Statistical Power: {}\nRequired Sample Size per Group: {}\n",
        fixed(planner.effect_size, 2),
        percent(planner.power, 0),
        thousands(required)
    )
}

/// Bar chart of the two conversion rates.
pub fn conversion_rates_svg(control: &Sample, treatment: &Sample) -> String {
    bar_chart_svg(
        &[
            ("Control", control.conversion_rate()),
            ("Treatment", treatment.conversion_rate()),
        ],
        SVG_SIZE.0,
        SVG_SIZE.1,
        "Conversion Rates by Group",
        "Conversion Rate",
        percent1,
    )
}

/// Kernel density curves of both arms' outcomes.
pub fn distribution_svg(control: &Sample, treatment: &Sample) -> String {
    let series = [("Control", control), ("Treatment", treatment)]
        .into_iter()
        .map(|(label, s)| Series::new(label, gaussian_kde(&s.to_f64(), KDE_GRID, KDE_CUT)))
        .collect::<Vec<_>>();
    line_chart_svg(&series, SVG_SIZE.0, SVG_SIZE.1, "Distribution of Conversions")
}

/// Write both charts into `dir`, creating it if needed. Returns the files
/// written; a chart with nothing to draw is skipped.
pub fn write_svgs(dash: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>, DashboardError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (name, svg) in [
        (RATES_SVG, conversion_rates_svg(&dash.control, &dash.treatment)),
        (DISTRIBUTION_SVG, distribution_svg(&dash.control, &dash.treatment)),
    ] {
        if svg.is_empty() {
            log::warn!("skipping {name}: nothing to draw");
            continue;
        }
        let path = dir.join(name);
        fs::write(&path, svg)?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[derive(Serialize)]
struct DashboardJson<'a> {
    parameters: &'a ExperimentSection,
    alpha: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    significant: Option<bool>,
    interpretation: Vec<String>,
    sample_size_calculator: PlannerJson,
}

#[derive(Serialize)]
struct PlannerJson {
    effect_size: f64,
    power: f64,
    required_sample_size: usize,
}

/// Machine-readable dashboard.
pub fn render_json(dash: &Dashboard) -> Result<String, DashboardError> {
    let report = dash.report();
    let view = DashboardJson {
        parameters: &dash.config.experiment,
        alpha: dash.config.analysis.alpha,
        report,
        error: dash.analysis.as_ref().err().map(|e| e.to_string()),
        significant: report.map(Report::is_significant),
        interpretation: report.map(interpretation).unwrap_or_default(),
        sample_size_calculator: PlannerJson {
            effect_size: dash.config.planner.effect_size,
            power: dash.config.planner.power,
            required_sample_size: dash.required_sample_size,
        },
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    fn dashboard() -> Dashboard {
        Dashboard::build(DashboardConfig::default()).unwrap()
    }

    #[test]
    fn text_has_every_section_in_order() {
        let text = render_text(&dashboard());
        let pos = |needle: &str| {
            text.find(needle)
                .unwrap_or_else(|| panic!("missing {needle:?} in\n{text}"))
        };
        let order = [
            TITLE,
            "Test Results",
            "Visualizations",
            "Distribution of Conversions",
            "Interpretation",
            "Sample Size Calculator",
        ];
        for pair in order.windows(2) {
            assert!(pos(pair[0]) < pos(pair[1]), "{} before {}", pair[0], pair[1]);
        }
        assert!(text.contains("Required Sample Size per Group: 199"));
        assert!(text.contains("1,000 users per group"));
        assert!(text.contains("Statistical Power"));
    }

    #[test]
    fn metric_columns_pair_left_and_right() {
        let dash = dashboard();
        let lines = metric_columns(dash.report().unwrap());
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Control Conversion Rate"));
        assert!(lines[0].contains("Chi-square Test p-value"));
        assert!(lines[1].contains('('));
        assert!(lines[3].contains("Statistical Power"));
    }

    #[test]
    fn degenerate_data_renders_a_message() {
        let mut config = DashboardConfig::default();
        config.experiment.control_rate = 0.0;
        config.experiment.treatment_rate = 0.0;
        let dash = Dashboard::build(config).unwrap();
        let text = render_text(&dash);
        assert!(text.contains("Analysis unavailable: degenerate input"));
        assert!(text.contains("(no variation)"));
        assert!(!text.contains("Interpretation"));
        assert!(text.contains("Sample Size Calculator"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&dash).unwrap()).unwrap();
        assert!(json.get("report").is_none());
        assert!(json["error"].as_str().unwrap().starts_with("degenerate input"));
    }

    #[test]
    fn svgs_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let written = write_svgs(&dashboard(), &out).unwrap();
        assert_eq!(written, vec![out.join(RATES_SVG), out.join(DISTRIBUTION_SVG)]);
        let rates = fs::read_to_string(out.join(RATES_SVG)).unwrap();
        assert!(rates.starts_with("<svg"));
        assert!(rates.contains("Conversion Rates by Group"));
        let dist = fs::read_to_string(out.join(DISTRIBUTION_SVG)).unwrap();
        assert!(dist.contains("Treatment"));
        assert!(dist.contains("<polyline"));
    }

    #[test]
    fn json_carries_report_and_planner() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&dashboard()).unwrap()).unwrap();
        assert_eq!(json["report"]["control_n"]["value"], 1000);
        assert_eq!(json["sample_size_calculator"]["required_sample_size"], 199);
        assert_eq!(json["parameters"]["seed"], 42);
        assert!(json["significant"].is_boolean());
        assert_eq!(json["interpretation"].as_array().unwrap().len(), 2);
    }
}

//! Chart primitives: ASCII for terminals, SVG for files.
//!
//! Degenerate input (no data, zero width or height) yields empty output
//! rather than an error; a chart that cannot be drawn is simply absent.

const SVG_PALETTE: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

/// One labelled series of `(x, y)` points for [`line_chart_svg`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Rescale to [0,1]. A constant input maps to all zeros.
pub fn normalize_min_max(xs: &[f64]) -> Vec<f64> {
    let Some((lo, hi)) = xs
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
    else {
        return Vec::new();
    };
    let span = hi - lo;
    if span <= 0.0 {
        return vec![0.0; xs.len()];
    }
    xs.iter().map(|&x| (x - lo) / span).collect()
}

/// One character per column, each column the mean of its share of `xs`.
pub fn sparkline_ascii(xs: &[f64], width: usize) -> String {
    const LEVELS: &[u8] = b" .:-=+*#%@";
    if xs.is_empty() || width == 0 {
        return String::new();
    }
    let n = xs.len();
    let buckets: Vec<f64> = (0..width)
        .map(|col| {
            let from = col * n / width;
            let to = ((col + 1) * n / width).max(from + 1);
            let slice = &xs[from..to];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();
    let top = (LEVELS.len() - 1) as f64;
    normalize_min_max(&buckets)
        .into_iter()
        .map(|z| LEVELS[(z * top).round() as usize] as char)
        .collect()
}

/// Horizontal bar chart, one line per bar, scaled so the largest value
/// spans `max_width` characters. `fmt` renders the value label.
pub fn bar_chart_ascii(bars: &[(&str, f64)], max_width: usize, fmt: fn(f64) -> String) -> Vec<String> {
    if bars.is_empty() || max_width == 0 {
        return Vec::new();
    }
    let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max_value = bars.iter().map(|&(_, v)| v).fold(0.0, f64::max);

    bars.iter()
        .map(|&(label, value)| {
            let bar_len = if max_value > 0.0 && value > 0.0 {
                ((value / max_value) * max_width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{label:<label_width$} |{bar:<max_width$}| {value}",
                bar = "#".repeat(bar_len.min(max_width)),
                value = fmt(value)
            )
        })
        .collect()
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Vertical bar chart with value labels above each bar. The y axis runs
/// from zero to `1.2 x` the largest value.
pub fn bar_chart_svg(
    bars: &[(&str, f64)],
    width: u32,
    height: u32,
    title: &str,
    y_label: &str,
    fmt: fn(f64) -> String,
) -> String {
    if bars.is_empty() || width == 0 || height == 0 {
        return String::new();
    }
    let w = width as f64;
    let h = height as f64;
    let (left, right, top, bottom) = (50.0, 10.0, 30.0, 30.0);
    let plot_w = (w - left - right).max(1.0);
    let plot_h = (h - top - bottom).max(1.0);

    let max_value = bars.iter().map(|&(_, v)| v).fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.2 } else { 1.0 };
    let slot = plot_w / bars.len() as f64;
    let bar_w = slot * 0.6;

    let mut body = String::new();
    for (i, &(label, value)) in bars.iter().enumerate() {
        let bar_h = (value.max(0.0) / y_max) * plot_h;
        let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
        let y = top + plot_h - bar_h;
        let cx = x + bar_w / 2.0;
        let color = SVG_PALETTE[i % SVG_PALETTE.len()];
        body.push_str(&format!(
            "<rect x=\"{x:.3}\" y=\"{y:.3}\" width=\"{bar_w:.3}\" height=\"{bar_h:.3}\" fill=\"{color}\" />"
        ));
        body.push_str(&format!(
            "<text x=\"{cx:.3}\" y=\"{:.3}\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
            y - 4.0,
            svg_escape(&fmt(value))
        ));
        body.push_str(&format!(
            "<text x=\"{cx:.3}\" y=\"{:.3}\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
            top + plot_h + 18.0,
            svg_escape(label)
        ));
    }

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\
<text x=\"{tx:.3}\" y=\"18\" text-anchor=\"middle\" font-size=\"14\">{title}</text>\
<text x=\"12\" y=\"{ly:.3}\" transform=\"rotate(-90 12 {ly:.3})\" text-anchor=\"middle\" font-size=\"12\">{y_label}</text>\
<line x1=\"{left}\" y1=\"{top}\" x2=\"{left}\" y2=\"{base:.3}\" stroke=\"black\" />\
<line x1=\"{left}\" y1=\"{base:.3}\" x2=\"{xr:.3}\" y2=\"{base:.3}\" stroke=\"black\" />\
{body}</svg>",
        tx = w / 2.0,
        ly = top + plot_h / 2.0,
        base = top + plot_h,
        xr = left + plot_w,
        title = svg_escape(title),
        y_label = svg_escape(y_label),
    )
}

/// Line chart of one or more series sharing axes, with a legend.
/// Series without points are skipped; nothing to draw yields "".
pub fn line_chart_svg(series: &[Series], width: u32, height: u32, title: &str) -> String {
    let drawable: Vec<&Series> = series.iter().filter(|s| !s.points.is_empty()).collect();
    if drawable.is_empty() || width == 0 || height == 0 {
        return String::new();
    }
    let w = width as f64;
    let h = height as f64;
    let top = 30.0;
    let plot_h = (h - top).max(1.0);

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in &drawable {
        for &(x, y) in &s.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    let x_range = if x_max > x_min { x_max - x_min } else { 1.0 };
    let y_range = if y_max > y_min { y_max - y_min } else { 1.0 };

    let mut body = String::new();
    for (k, s) in drawable.iter().enumerate() {
        let color = SVG_PALETTE[k % SVG_PALETTE.len()];
        let mut points = String::new();
        for (i, &(x, y)) in s.points.iter().enumerate() {
            let px = (x - x_min) / x_range * w;
            let py = top + plot_h - (y - y_min) / y_range * plot_h;
            if i > 0 {
                points.push(' ');
            }
            points.push_str(&format!("{px:.3},{py:.3}"));
        }
        body.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"1\" points=\"{points}\" />"
        ));
        body.push_str(&format!(
            "<text x=\"{:.3}\" y=\"{}\" fill=\"{color}\" font-size=\"12\" text-anchor=\"end\">{}</text>",
            w - 4.0,
            14 + 14 * k,
            svg_escape(&s.label)
        ));
    }

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\
<text x=\"4\" y=\"18\" font-size=\"14\">{}</text>{body}</svg>",
        svg_escape(title)
    )
}

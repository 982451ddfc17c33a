//! Bar charts rendered as inline SVG.
//!
//! Bars follow the ranked order. Their colour comes from the Viridis scale,
//! normalised over the means of the chart.

use palette::{LinSrgb, Mix, Srgb};

use crate::report::html::escape;
use crate::report::*;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 150.0;
/// Share of the slot of a course taken by its bar.
const BAR_FILL: f64 = 0.8;
const MAX_TICKS: usize = 10;

/// The Viridis colour scale, as evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 10] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

/// The colour at position `t` (clamped to [0, 1]) of the Viridis scale, as `#rrggbb`.
pub fn viridis(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (VIRIDIS.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let factor = (pos - idx as f64) as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(VIRIDIS[idx]).mix(stop(VIRIDIS[idx + 1]), factor);
    let srgb: Srgb<f32> = Srgb::from_linear(mixed);
    let rgb: Srgb<u8> = srgb.into_format();
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}

/// How the y-axis of a chart is laid out.
#[derive(PartialEq, Debug, Clone, Copy)]
enum YAxis {
    /// 0 at the top, growing downwards. Bars hang from the top.
    Inverted { max: f64 },
    /// 0 at the bottom, fixed upper bound.
    Fixed { max: f64 },
}

impl YAxis {
    fn for_classification(classification: Classification, summaries: &[CourseSummary]) -> YAxis {
        match classification {
            Classification::Core => {
                let largest = summaries
                    .iter()
                    .filter_map(|s| s.mean)
                    .filter(|m| m.is_finite())
                    .fold(0.0_f64, f64::max);
                YAxis::Inverted {
                    max: largest.ceil().max(1.0),
                }
            }
            // Ratings are bounded by the survey.
            Classification::Elective => YAxis::Fixed { max: 5.0 },
        }
    }

    fn max(&self) -> f64 {
        match self {
            YAxis::Inverted { max } | YAxis::Fixed { max } => *max,
        }
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    /// Pixel position of a value.
    fn y(&self, value: f64) -> f64 {
        let frac = (value / self.max()).clamp(0.0, 1.0);
        match self {
            YAxis::Inverted { .. } => MARGIN_TOP + frac * Self::plot_height(),
            YAxis::Fixed { .. } => MARGIN_TOP + (1.0 - frac) * Self::plot_height(),
        }
    }

    /// Pixel position of the bar origin.
    fn baseline(&self) -> f64 {
        self.y(0.0)
    }

    /// Grid values from 0 to the axis maximum, at most `MAX_TICKS` + 1 of them.
    fn ticks(&self) -> Vec<f64> {
        let max = self.max();
        if !max.is_finite() || max <= 0.0 {
            return vec![0.0];
        }
        let step = if max <= MAX_TICKS as f64 {
            1.0
        } else {
            (max / MAX_TICKS as f64).ceil()
        };
        let count = ((max / step).floor() as usize).min(MAX_TICKS);
        (0..=count).map(|i| i as f64 * step).collect()
    }
}

pub fn chart_title(classification: Classification) -> &'static str {
    match classification {
        Classification::Core => "Core Course Rankings (Lower is Better)",
        Classification::Elective => "Elective Course Ratings (Scale 1-5)",
    }
}

/// Position of each mean on the colour scale. Core charts use the reversed scale.
fn color_positions(classification: Classification, summaries: &[CourseSummary]) -> Vec<f64> {
    let defined: Vec<f64> = summaries.iter().filter_map(|s| s.mean).collect();
    let lo = defined.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = defined.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    summaries
        .iter()
        .map(|s| {
            let t = match s.mean {
                Some(m) if hi > lo => (m - lo) / (hi - lo),
                _ => 0.5,
            };
            match classification {
                Classification::Core => 1.0 - t,
                Classification::Elective => t,
            }
        })
        .collect()
}

pub fn format_mean(mean: Option<f64>) -> String {
    match mean {
        Some(m) => format!("{:.2}", m),
        None => "n/a".to_string(),
    }
}

/// Renders the bar chart of one classification.
pub fn render_svg(classification: Classification, summaries: &[CourseSummary]) -> String {
    let axis = YAxis::for_classification(classification, summaries);
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_bottom = MARGIN_TOP + YAxis::plot_height();
    let slot = if summaries.is_empty() {
        plot_w
    } else {
        plot_w / summaries.len() as f64
    };
    let colors = color_positions(classification, summaries);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="bar-chart" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="{title}">"#,
        w = WIDTH,
        h = HEIGHT,
        title = escape(chart_title(classification))
    ));
    lines.push(format!(
        r#"<text x="{x}" y="30" text-anchor="middle" font-size="18" font-family="sans-serif">{title}</text>"#,
        x = WIDTH / 2.0,
        title = escape(chart_title(classification))
    ));

    // Y axis, grid and tick labels.
    for tick in axis.ticks() {
        let y = axis.y(tick);
        lines.push(format!(
            r##"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e5e5e5"/>"##,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT,
            y = y
        ));
        lines.push(format!(
            r#"<text x="{x}" y="{y:.1}" text-anchor="end" dominant-baseline="middle" font-size="12" font-family="sans-serif">{tick}</text>"#,
            x = MARGIN_LEFT - 8.0,
            y = y,
            tick = tick
        ));
    }
    lines.push(format!(
        r#"<text transform="translate(18 {y:.1}) rotate(-90)" text-anchor="middle" font-size="14" font-family="sans-serif">{label}</text>"#,
        y = MARGIN_TOP + YAxis::plot_height() / 2.0,
        label = classification.mean_label()
    ));

    // Bars, value labels and course labels.
    let baseline = axis.baseline();
    for (idx, (s, t)) in summaries.iter().zip(colors.iter()).enumerate() {
        let x = MARGIN_LEFT + idx as f64 * slot + slot * (1.0 - BAR_FILL) / 2.0;
        let bar_w = slot * BAR_FILL;
        let center = x + bar_w / 2.0;
        let label = format_mean(s.mean);
        let label_y = match (s.mean, axis) {
            (Some(m), YAxis::Inverted { .. }) => axis.y(m) + 16.0,
            (Some(m), YAxis::Fixed { .. }) => axis.y(m) - 6.0,
            (None, YAxis::Inverted { .. }) => baseline + 16.0,
            (None, YAxis::Fixed { .. }) => baseline - 6.0,
        };
        if let Some(m) = s.mean {
            let end = axis.y(m);
            lines.push(format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{course}: {label}</title></rect>"#,
                x = x,
                y = end.min(baseline),
                w = bar_w,
                h = (end - baseline).abs(),
                fill = viridis(*t),
                course = escape(&s.course),
                label = label
            ));
        }
        lines.push(format!(
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-size="12" font-family="sans-serif">{label}</text>"#,
            x = center,
            y = label_y,
            label = label
        ));
        lines.push(format!(
            r#"<text transform="translate({x:.1} {y:.1}) rotate(-35)" text-anchor="end" font-size="12" font-family="sans-serif">{course}</text>"#,
            x = center,
            y = plot_bottom + 14.0,
            course = escape(&s.course)
        ));
    }
    lines.push(format!(
        r##"<line x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="#444444"/>"##,
        x = MARGIN_LEFT,
        y1 = MARGIN_TOP,
        y2 = plot_bottom
    ));
    lines.push("</svg>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(course: &str, mean: Option<f64>, classification: Classification) -> CourseSummary {
        CourseSummary {
            course: course.to_string(),
            mean,
            classification,
            rank: 0,
            responses: 1,
        }
    }

    #[test]
    fn viridis_endpoints() {
        assert_eq!(viridis(0.0), "#440154");
        assert_eq!(viridis(1.0), "#fde725");
        assert_eq!(viridis(-3.0), "#440154");
        assert_eq!(viridis(7.0), "#fde725");
        assert_eq!(viridis(f64::NAN), "#440154");
    }

    #[test]
    fn core_colors_are_reversed() {
        let core = vec![
            summary("A", Some(1.0), Classification::Core),
            summary("B", Some(3.0), Classification::Core),
        ];
        assert_eq!(color_positions(Classification::Core, &core), vec![1.0, 0.0]);
        let elective = vec![
            summary("A", Some(4.5), Classification::Elective),
            summary("B", Some(2.5), Classification::Elective),
            summary("C", None, Classification::Elective),
        ];
        assert_eq!(
            color_positions(Classification::Elective, &elective),
            vec![1.0, 0.0, 0.5]
        );
    }

    #[test]
    fn core_axis_is_inverted() {
        let core = vec![
            summary("A", Some(1.2), Classification::Core),
            summary("B", Some(3.4), Classification::Core),
        ];
        let axis = YAxis::for_classification(Classification::Core, &core);
        assert_eq!(axis, YAxis::Inverted { max: 4.0 });
        assert!(axis.y(1.2) < axis.y(3.4));
        assert_eq!(axis.baseline(), MARGIN_TOP);
        assert_eq!(axis.ticks(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn elective_axis_is_fixed() {
        let elective = vec![summary("A", Some(2.0), Classification::Elective)];
        let axis = YAxis::for_classification(Classification::Elective, &elective);
        assert_eq!(axis, YAxis::Fixed { max: 5.0 });
        assert!(axis.y(4.0) < axis.y(2.0));
        assert_eq!(axis.y(5.0), MARGIN_TOP);
        assert_eq!(axis.ticks().len(), 6);
    }

    #[test]
    fn huge_means_keep_the_axis_bounded() {
        let core = vec![
            summary("A", Some(1e308), Classification::Core),
            summary("B", Some(f64::INFINITY), Classification::Core),
            summary("C", Some(2.0), Classification::Core),
        ];
        let axis = YAxis::for_classification(Classification::Core, &core);
        assert_eq!(axis, YAxis::Inverted { max: 1e308 });
        let ticks = axis.ticks();
        assert!(ticks.len() <= MAX_TICKS + 1);
        assert_eq!(ticks[0], 0.0);
        assert!(ticks.iter().all(|t| t.is_finite()));

        assert_eq!(YAxis::Inverted { max: f64::INFINITY }.ticks(), vec![0.0]);
        assert_eq!(YAxis::Fixed { max: f64::NAN }.ticks(), vec![0.0]);

        let svg = render_svg(Classification::Core, &core[..1]);
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn labels_and_escaping() {
        let elective = vec![
            summary("Tax & Law <II>", Some(4.0 / 3.0), Classification::Elective),
            summary("Unrated", None, Classification::Elective),
        ];
        let svg = render_svg(Classification::Elective, &elective);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">1.33<"));
        assert!(svg.contains(">n/a<"));
        assert!(svg.contains("Tax &amp; Law &lt;II&gt;"));
        assert!(!svg.contains("<II>"));
        // One bar, the undefined mean has none.
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn empty_chart() {
        let svg = render_svg(Classification::Core, &[]);
        assert!(svg.contains("Core Course Rankings (Lower is Better)"));
        assert_eq!(svg.matches("<rect").count(), 0);
    }
}

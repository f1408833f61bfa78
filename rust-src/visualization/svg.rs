//! SVG drawing for line charts.

use crate::config::{CHART_HEIGHT, CHART_WIDTH};

use super::chart::{date_position, LineChart};


const BACKGROUND: &str = "#FFFFFF";
const TEXT: &str = "#222222";
const AXIS: &str = "#333333";
const GRID: &str = "#E5E5E5";
const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

// Plot area margins
const MARGIN_LEFT: i32 = 100;
const MARGIN_RIGHT: i32 = 40;
const MARGIN_TOP: i32 = 70;
const MARGIN_BOTTOM: i32 = 130;


/// Maps data coordinates into the plot rectangle.
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}


impl Frame {
    fn x(&self, value: f64) -> f64 {
        let span = (self.x_range.1 - self.x_range.0).max(f64::EPSILON);
        self.left + (value - self.x_range.0) / span * self.width
    }

    fn y(&self, value: f64) -> f64 {
        let span = (self.y_range.1 - self.y_range.0).max(f64::EPSILON);
        self.top + self.height - (value - self.y_range.0) / span * self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}


/// Generate SVG content for a chart.
pub fn generate_svg(chart: &LineChart) -> String {
    let width = CHART_WIDTH;
    let height = CHART_HEIGHT;
    let style = chart.style;

    let frame = Frame {
        left: MARGIN_LEFT as f64,
        top: MARGIN_TOP as f64,
        width: (width - MARGIN_LEFT - MARGIN_RIGHT) as f64,
        height: (height - MARGIN_TOP - MARGIN_BOTTOM) as f64,
        x_range: chart.x_range,
        y_range: chart.y_range,
    };

    let mut svg_parts = vec![
        format!(r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">"#, width, height),
        "<style>".to_string(),
        format!("  text {{ font-family: {}; fill: {}; }}", FONT_FAMILY, TEXT),
        format!("  .title {{ font-size: {}px; font-weight: bold; }}", style.title_font),
        format!("  .axis-label {{ font-size: {}px; }}", style.label_font),
        format!("  .tick-label {{ font-size: {}px; }}", style.tick_font),
        format!("  .legend-text {{ font-size: {}px; }}", style.legend_font),
        "</style>".to_string(),
        format!(r#"<rect width="{}" height="{}" fill="{}"/>"#, width, height, BACKGROUND),
    ];

    // Title
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="title" text-anchor="middle">{}</text>"#,
        width / 2,
        MARGIN_TOP / 2 + style.title_font as i32 / 3,
        escape_xml(&chart.title)
    ));

    // Horizontal grid and y tick labels
    for tick in &chart.y_ticks {
        let y = frame.y(tick.value);
        svg_parts.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            frame.left, y, frame.right(), y, GRID
        ));
        svg_parts.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            frame.left - 5.0, y, frame.left, y, AXIS
        ));
        svg_parts.push(format!(
            r#"<text x="{:.1}" y="{:.1}" class="tick-label" text-anchor="end">{}</text>"#,
            frame.left - 8.0,
            y + style.tick_font as f64 / 3.0,
            escape_xml(&tick.label)
        ));
    }

    // X tick marks and labels
    for tick in &chart.x_ticks {
        let x = frame.x(tick.value);
        if x < frame.left - 0.5 || x > frame.right() + 0.5 {
            continue;
        }
        svg_parts.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"#,
            x, frame.bottom(), x, frame.bottom() + 5.0, AXIS
        ));

        let label_y = frame.bottom() + 10.0 + style.tick_font as f64;
        if chart.rotate_x_labels {
            svg_parts.push(format!(
                r#"<text x="{:.1}" y="{:.1}" class="tick-label" text-anchor="end" transform="rotate(-45 {:.1} {:.1})">{}</text>"#,
                x, label_y, x, label_y, escape_xml(&tick.label)
            ));
        } else {
            svg_parts.push(format!(
                r#"<text x="{:.1}" y="{:.1}" class="tick-label" text-anchor="middle">{}</text>"#,
                x, label_y, escape_xml(&tick.label)
            ));
        }
    }

    // Plot frame
    svg_parts.push(format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="{}" stroke-width="1"/>"#,
        frame.left, frame.top, frame.width, frame.height, AXIS
    ));

    // Axis labels
    svg_parts.push(format!(
        r#"<text x="{:.1}" y="{}" class="axis-label" text-anchor="middle">{}</text>"#,
        frame.left + frame.width / 2.0,
        height - 15,
        escape_xml(&chart.x_label)
    ));
    let y_label_x = 25.0;
    let y_label_y = frame.top + frame.height / 2.0;
    svg_parts.push(format!(
        r#"<text x="{:.1}" y="{:.1}" class="axis-label" text-anchor="middle" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
        y_label_x, y_label_y, y_label_x, y_label_y, escape_xml(&chart.y_label)
    ));

    // Lines with circle markers
    for line in &chart.lines {
        for segment in &line.segments {
            let points: Vec<String> = segment
                .iter()
                .map(|(date, value)| {
                    format!("{:.1},{:.1}", frame.x(date_position(*date)), frame.y(*value))
                })
                .collect();

            if points.len() > 1 {
                svg_parts.push(format!(
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round" class="series"/>"#,
                    points.join(" "),
                    line.color,
                    style.line_width
                ));
            }

            for (date, value) in segment {
                svg_parts.push(format!(
                    r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}" class="marker"><title>{}: {}</title></circle>"#,
                    frame.x(date_position(*date)),
                    frame.y(*value),
                    style.marker_radius,
                    line.color,
                    date,
                    format_value(*value)
                ));
            }
        }
    }

    // Legend
    let entries: Vec<(&str, &str)> = if chart.show_legend {
        chart
            .lines
            .iter()
            .filter_map(|l| l.label.as_deref().map(|label| (label, l.color)))
            .collect()
    } else {
        Vec::new()
    };

    if !entries.is_empty() {
        let row_height = style.legend_font as f64 + 8.0;
        let longest = entries.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
        let box_width = 40.0 + longest as f64 * style.legend_font as f64 * 0.6;
        let box_height = row_height * entries.len() as f64 + 8.0;
        let box_x = frame.right() - box_width - 10.0;
        let box_y = frame.top + 10.0;

        svg_parts.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.85" stroke="{}" stroke-width="1" class="legend"/>"#,
            box_x, box_y, box_width, box_height, BACKGROUND, GRID
        ));

        for (idx, (label, color)) in entries.iter().enumerate() {
            let y = box_y + 4.0 + row_height * (idx as f64 + 0.5);
            svg_parts.push(format!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{}"/>"#,
                box_x + 8.0, y, box_x + 30.0, y, color, style.line_width
            ));
            svg_parts.push(format!(
                r#"<text x="{:.1}" y="{:.1}" class="legend-text">{}</text>"#,
                box_x + 36.0,
                y + style.legend_font as f64 / 3.0,
                escape_xml(label)
            ));
        }
    }

    svg_parts.push("</svg>".to_string());

    svg_parts.join("\n")
}


fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}


/// Escape text for use inside SVG elements and attributes.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

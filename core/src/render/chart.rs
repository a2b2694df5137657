use crate::analysis::compare_parameters;
use crate::suite::ResultRecord;
use crate::units::TimeUnit;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const BAR_WIDTH: f64 = 56.0;
const BAR_GAP: f64 = 34.0;
const PLOT_HEIGHT: f64 = 240.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 48.0;
const MARGIN_RIGHT: f64 = 24.0;
const BAR_FILL: &str = "#4e79a7";

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub parameter: String,
    pub nanos: f64,
    /// `nanos` expressed in the chart's unit.
    pub scaled: f64,
    pub label: String,
}

/// One bar per parameter of a group, all in a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub group: String,
    pub unit: TimeUnit,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn for_group(group: &str, params: &BTreeMap<String, ResultRecord>) -> Self {
        let mut records: Vec<&ResultRecord> = params.values().collect();
        records.sort_by(|a, b| compare_parameters(a.parameter(), b.parameter()));

        let largest = records
            .iter()
            .map(|r| r.point_estimate_nanos())
            .fold(0.0_f64, f64::max);
        let unit = TimeUnit::for_magnitude(largest);

        let bars = records
            .into_iter()
            .map(|record| {
                let nanos = record.point_estimate_nanos();
                Bar {
                    parameter: record.parameter().to_string(),
                    nanos,
                    scaled: unit.scale(nanos),
                    label: unit.format(nanos),
                }
            })
            .collect();

        Self {
            group: group.to_string(),
            unit,
            bars,
        }
    }

    pub fn to_svg(&self) -> String {
        let count = self.bars.len().max(1) as f64;
        let width = MARGIN_LEFT + count * (BAR_WIDTH + BAR_GAP) + MARGIN_RIGHT;
        let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + PLOT_HEIGHT;
        let max_scaled = self.bars.iter().map(|b| b.scaled).fold(0.0_f64, f64::max);
        let y_scale = if max_scaled > 0.0 { PLOT_HEIGHT / max_scaled } else { 0.0 };

        let mut out = String::with_capacity(1024 + self.bars.len() * 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif">"#,
            w = width,
            h = height
        );
        let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            out,
            r#"  <text x="{:.1}" y="28" font-size="16" text-anchor="middle">{} mean time</text>"#,
            width / 2.0,
            escape_xml(&self.group)
        );
        let _ = writeln!(
            out,
            r#"  <text x="18" y="{:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 18 {:.1})">time ({})</text>"#,
            MARGIN_TOP + PLOT_HEIGHT / 2.0,
            MARGIN_TOP + PLOT_HEIGHT / 2.0,
            self.unit.suffix()
        );
        let _ = writeln!(
            out,
            r##"  <line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{base:.1}" stroke="#333"/>"##,
            x = MARGIN_LEFT - 8.0,
            top = MARGIN_TOP,
            base = baseline
        );
        let _ = writeln!(
            out,
            r##"  <line x1="{:.1}" y1="{base:.1}" x2="{:.1}" y2="{base:.1}" stroke="#333"/>"##,
            MARGIN_LEFT - 8.0,
            width - MARGIN_RIGHT,
            base = baseline
        );

        for (idx, bar) in self.bars.iter().enumerate() {
            let x = MARGIN_LEFT + idx as f64 * (BAR_WIDTH + BAR_GAP) + BAR_GAP / 2.0;
            let bar_height = bar.scaled * y_scale;
            let y = baseline - bar_height;
            let center = x + BAR_WIDTH / 2.0;
            let _ = writeln!(out, r#"  <g class="bar" data-parameter="{}">"#, escape_xml(&bar.parameter));
            let _ = writeln!(
                out,
                r#"    <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x, y, BAR_WIDTH, bar_height, BAR_FILL
            );
            let _ = writeln!(
                out,
                r#"    <text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
                center,
                y - 6.0,
                escape_xml(&bar.label)
            );
            let _ = writeln!(
                out,
                r#"    <text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
                center,
                baseline + 18.0,
                escape_xml(&bar.parameter)
            );
            let _ = writeln!(out, "  </g>");
        }

        out.push_str("</svg>\n");
        out
    }
}

pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::info;

use crate::aggregate::SampleAbundance;
use crate::report::MicroorganismRecord;

const CLASS_COLORS: [&str; 3] = ["yellow", "cyan", "magenta"];

/// One bar of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// A vertical bar chart rendered as a standalone SVG document
#[derive(Debug, Clone)]
pub struct BarChart {
    /// Each entry is drawn on its own line
    pub title: Vec<String>,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub width: f64,
    pub height: f64,
    /// Draw category labels at an angle for long names
    pub slanted_labels: bool,
    /// Decimal places on y axis tick labels
    pub tick_precision: usize,
}

/// Counts of predicted-present versus not-present microorganisms
pub fn presence_chart(records: &[MicroorganismRecord]) -> BarChart {
    let present = records.iter().filter(|r| r.predicted_present).count();
    let absent = records.len() - present;

    BarChart {
        title: vec!["Predicted Presence of Microorganisms".to_string()],
        y_label: "Quantity".to_string(),
        bars: vec![
            Bar {
                label: "Not present".to_string(),
                value: absent as f64,
                color: "red",
            },
            Bar {
                label: "Present".to_string(),
                value: present as f64,
                color: "green",
            },
        ],
        width: 700.0,
        height: 500.0,
        slanted_labels: false,
        tick_precision: 0,
    }
}

/// Counts of each microorganism class, most frequent first. Records without
/// a class are not counted.
pub fn class_chart(records: &[MicroorganismRecord]) -> BarChart {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for class in records.iter().filter_map(|r| r.class.as_deref()) {
        let count = counts.entry(class).or_insert(0);
        if *count == 0 {
            order.push(class);
        }
        *count += 1;
    }
    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));

    let bars = order
        .into_iter()
        .enumerate()
        .map(|(idx, class)| Bar {
            label: class.to_string(),
            value: counts[class] as f64,
            color: CLASS_COLORS[idx % CLASS_COLORS.len()],
        })
        .collect();

    BarChart {
        title: vec!["Microorganisms Class".to_string()],
        y_label: "Quantity".to_string(),
        bars,
        width: 700.0,
        height: 500.0,
        slanted_labels: false,
        tick_precision: 0,
    }
}

/// Ranked relative abundance of one sample's present organisms
pub fn abundance_chart(abundance: &SampleAbundance) -> BarChart {
    let bars = abundance
        .entries
        .iter()
        .map(|entry| Bar {
            label: entry.name.clone().unwrap_or_default(),
            value: entry.relative_abundance,
            color: "indianred",
        })
        .collect();

    BarChart {
        title: vec![
            "Normalised Relative Abundance".to_string(),
            "of Present Microorganisms".to_string(),
            abundance.sample.clone(),
        ],
        y_label: "Normalised Relative Abundance (%)".to_string(),
        bars,
        width: 700.0,
        height: 1100.0,
        slanted_labels: true,
        tick_precision: 1,
    }
}

/// File name used for a sample's relative abundance chart
pub fn abundance_chart_name(sample: &str) -> String {
    format!("normalised_relativeAbundance_{}.svg", sample)
}

/// Render `chart` and write it to `{dir}/{file_name}`
pub fn write_chart(chart: &BarChart, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let svg = render(chart)?;
    std::fs::write(&path, svg)
        .with_context(|| format!("Failed to write chart {}", path.display()))?;

    info!("Wrote chart {}", path.display());
    Ok(path)
}

/// Render a bar chart as SVG markup
pub fn render(chart: &BarChart) -> Result<String> {
    let (w, h) = (chart.width, chart.height);
    let left = 80.0;
    let right = 20.0;
    let top = 20.0 + 24.0 * chart.title.len() as f64;
    let bottom = if chart.slanted_labels { 280.0 } else { 50.0 };
    let plot_w = w - left - right;
    let plot_h = h - top - bottom;

    let mut out = String::with_capacity(4 * 1024);
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        w, h, w, h
    )?;
    writeln!(out, "<rect width=\"{}\" height=\"{}\" fill=\"#fff\"/>", w, h)?;

    for (line, text) in chart.title.iter().enumerate() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"20\" font-weight=\"bold\">{}</text>",
            w / 2.0,
            26.0 + 24.0 * line as f64,
            escape(text)
        )?;
    }

    let max_y = chart.bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let max_y = if max_y > 0.0 { max_y } else { 1.0 };

    // Axes
    writeln!(
        out,
        "<line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#000\"/>",
        l = left,
        t = top,
        b = top + plot_h
    )?;
    writeln!(
        out,
        "<line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#000\"/>",
        l = left,
        b = top + plot_h,
        r = left + plot_w
    )?;

    let ticks = 4;
    for i in 0..=ticks {
        let value = max_y * i as f64 / ticks as f64;
        let y = top + plot_h - plot_h * i as f64 / ticks as f64;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#000\"/>",
            left - 5.0,
            y,
            left,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"12\">{:.*}</text>",
            left - 8.0,
            y + 4.0,
            chart.tick_precision,
            value
        )?;
    }
    writeln!(
        out,
        "<text x=\"{x}\" y=\"{y}\" transform=\"rotate(-90 {x} {y})\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\">{}</text>",
        escape(&chart.y_label),
        x = 20.0,
        y = top + plot_h / 2.0
    )?;

    let slot = if chart.bars.is_empty() {
        plot_w
    } else {
        plot_w / chart.bars.len() as f64
    };
    for (idx, bar) in chart.bars.iter().enumerate() {
        let bar_h = bar.value / max_y * plot_h;
        let x = left + slot * idx as f64 + slot * 0.1;
        let y = top + plot_h - bar_h;
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"#000\" stroke-width=\"2\"/>",
            x,
            y,
            slot * 0.8,
            bar_h,
            bar.color
        )?;

        let label_x = left + slot * (idx as f64 + 0.5);
        let label_y = top + plot_h + 18.0;
        if chart.slanted_labels {
            writeln!(
                out,
                "<text x=\"{x}\" y=\"{y}\" transform=\"rotate(-75 {x} {y})\" text-anchor=\"end\" font-size=\"13\" font-weight=\"bold\">{}</text>",
                escape(&bar.label),
                x = label_x,
                y = label_y
            )?;
        } else {
            writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\">{}</text>",
                label_x,
                label_y,
                escape(&bar.label)
            )?;
        }
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plot a wing-position scan history CSV (one line per outer iteration)"
)]
struct Cli {
    #[arg(long)]
    input: String,
    #[arg(long, default_value = "artifacts/scan.png")]
    output: PathBuf,
    /// Column to plot against wing position (area, htail, vtail, mass or a column name)
    #[arg(long, default_value = "combined_area_m2")]
    metric: String,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 700)]
    height: u32,
}

#[derive(Debug, Clone, Copy)]
struct Point {
    position: f64,
    value: f64,
    selected: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (series, metric_column) = read_series(&cli.input, &cli.metric)?;

    let points: Vec<&Point> = series.values().flatten().collect();
    if points.is_empty() {
        return Err(anyhow::anyhow!("No scan samples in the provided CSV"));
    }

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in &points {
        x_min = x_min.min(p.position);
        x_max = x_max.max(p.position);
        y_min = y_min.min(p.value);
        y_max = y_max.max(p.value);
    }
    // Single-sample runs still need a non-empty axis.
    if x_max - x_min < 1e-9 {
        x_min -= 0.05;
        x_max += 0.05;
    }
    let y_pad = ((y_max - y_min) * 0.05).max(y_max.abs() * 1e-3).max(1e-6);
    let (y_min, y_max) = (y_min - y_pad, y_max + y_pad);

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Wing position scan".to_string(), caption_font)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Wing position (fraction of fuselage length)")
        .y_desc(metric_axis_label(&metric_column))
        .label_style(label_font.clone())
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|x| format!("{x:.3}"))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .draw()?;

    let last_iteration = series.keys().copied().max().unwrap_or(0);
    for (&iteration, samples) in &series {
        let t = if last_iteration == 0 {
            0.0
        } else {
            iteration as f64 / last_iteration as f64
        };
        let color = jet_color(t);
        let line: Vec<(f64, f64)> = samples.iter().map(|p| (p.position, p.value)).collect();
        chart
            .draw_series(LineSeries::new(line.clone(), color.stroke_width(2)))?
            .label(if iteration == 0 {
                "seed".to_string()
            } else {
                format!("iteration {iteration}")
            })
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            line.iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    let marker_color = RGBColor(210, 100, 20);
    let cross_half_width = (x_max - x_min) * 0.01;
    let cross_half_height = (y_max - y_min) * 0.015;
    for p in points.iter().filter(|p| p.selected) {
        let (x, y) = (p.position, p.value);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cross_half_width, y), (x + cross_half_width, y)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, y - cross_half_height), (x, y + cross_half_height)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
    }

    chart
        .configure_series_labels()
        .label_font(label_font)
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Samples grouped by outer iteration, each group in scan order.
fn read_series(
    path: &str,
    metric_name: &str,
) -> anyhow::Result<(BTreeMap<usize, Vec<Point>>, String)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let iteration_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("iteration"))
        .ok_or_else(|| anyhow::anyhow!("CSV missing 'iteration' column"))?;
    let position_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("position"))
        .ok_or_else(|| anyhow::anyhow!("CSV missing 'position' column"))?;
    let selected_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("selected"));
    let metric_idx = resolve_metric_column(&headers, metric_name)
        .ok_or_else(|| anyhow::anyhow!("CSV missing metric column matching '{}'", metric_name))?;
    let metric_column = headers
        .get(metric_idx)
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid metric column index"))?;

    let mut series: BTreeMap<usize, Vec<Point>> = BTreeMap::new();
    for rec in rdr.records() {
        let r = rec?;
        let Some(iteration) = r.get(iteration_idx).and_then(|v| v.parse::<usize>().ok()) else {
            continue;
        };
        let position: f64 = r.get(position_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let value: f64 = r.get(metric_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let selected = selected_idx
            .and_then(|idx| r.get(idx))
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if position.is_finite() && value.is_finite() {
            series.entry(iteration).or_default().push(Point {
                position,
                value,
                selected,
            });
        }
    }
    for samples in series.values_mut() {
        samples.sort_by(|a, b| a.position.total_cmp(&b.position));
    }
    Ok((series, metric_column))
}

fn jet_color(t_in: f64) -> RGBColor {
    let t = t_in.clamp(0.0, 1.0);
    fn comp(v: f64) -> f64 {
        (1.0 - (v - 1.0).abs()).clamp(0.0, 1.0)
    }
    let r = comp(1.5 - 4.0 * (t - 0.75).abs());
    let g = comp(1.5 - 4.0 * (t - 0.5).abs());
    let b = comp(1.5 - 4.0 * (t - 0.25).abs());
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn resolve_metric_column(headers: &csv::StringRecord, metric_name: &str) -> Option<usize> {
    let direct = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(metric_name));
    if direct.is_some() {
        return direct;
    }
    let metric_lower = metric_name.to_lowercase();
    let fallback = match metric_lower.as_str() {
        "area" => "combined_area_m2",
        "htail" => "horizontal_tail_area_m2",
        "vtail" => "vertical_tail_area_m2",
        "mass" => "resulting_mass_n",
        other => other,
    };
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(fallback))
}

fn metric_axis_label(metric_column: &str) -> String {
    match metric_column.to_lowercase().as_str() {
        "combined_area_m2" => "Combined tail area (m²)".to_string(),
        "horizontal_tail_area_m2" => "Horizontal tail area (m²)".to_string(),
        "vertical_tail_area_m2" => "Vertical tail area (m²)".to_string(),
        "resulting_mass_n" => "Resulting weight (N)".to_string(),
        other => other.to_string(),
    }
}

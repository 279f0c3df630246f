//! Drawing planned plots with plotters.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::prelude::*;
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

use piquant_options::PlotFormat;

use crate::plan::{PlotData, PlotSpec};

const PLOT_SIZE: (u32, u32) = (1024, 768);
const BOX_HALF_WIDTH: f64 = 0.3;

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-9 {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        return (lo - pad, hi + pad);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn x_range(spec: &PlotSpec) -> (f64, f64) {
    match &spec.data {
        PlotData::Lines {
            categories: Some(labels),
            ..
        } => (-0.5, labels.len() as f64 - 0.5),
        PlotData::Lines { series, .. } => {
            let (lo, hi) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
            padded(lo, hi)
        }
        PlotData::Boxes { categories } => (-0.5, categories.len() as f64 - 0.5),
        PlotData::Bars { categories } => (-0.5, categories.len() as f64 - 0.5),
    }
}

fn y_range(spec: &PlotSpec) -> (f64, f64) {
    if let Some((lo, hi)) = spec.y_range {
        return padded(lo, hi);
    }
    let (lo, hi) = match &spec.data {
        PlotData::Lines { series, .. } => {
            bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
        }
        PlotData::Boxes { categories } => {
            bounds(categories.iter().flat_map(|(_, samples)| samples.iter().copied()))
        }
        PlotData::Bars { categories } => {
            let (_, hi) = bounds(categories.iter().map(|(_, v)| *v));
            (0.0, hi)
        }
    };
    padded(lo, hi)
}

fn category_labels(spec: &PlotSpec) -> Option<Vec<String>> {
    match &spec.data {
        PlotData::Lines { categories, .. } => categories.clone(),
        PlotData::Boxes { categories } => Some(categories.iter().map(|(c, _)| c.clone()).collect()),
        PlotData::Bars { categories } => Some(categories.iter().map(|(c, _)| c.clone()).collect()),
    }
}

fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn draw<DB>(root: DrawingArea<DB, Shift>, spec: &PlotSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = x_range(spec);
    let (y_lo, y_hi) = y_range(spec);
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    let labels = category_labels(spec);
    let formatter = |x: &f64| match &labels {
        Some(labels) => category_label(labels, *x),
        None => format!("{}", x),
    };
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_label_formatter(&formatter);
    if let Some(labels) = &labels {
        mesh.x_labels(labels.len() * 2 + 1);
    }
    mesh.draw()?;

    match &spec.data {
        PlotData::Lines { series, .. } => {
            for (i, s) in series.iter().enumerate() {
                let color = Palette99::pick(i).mix(0.9);
                chart
                    .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
                    .label(&s.label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                chart.draw_series(
                    s.points
                        .iter()
                        .map(|&p| Circle::new(p, 3, color.filled())),
                )?;
            }
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        PlotData::Boxes { categories } => {
            for (i, (_, samples)) in categories.iter().enumerate() {
                let x = i as f64;
                let color = Palette99::pick(i);
                let [lower_fence, lower, median, upper, upper_fence] =
                    Quartiles::new(samples.as_slice()).values().map(f64::from);

                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - BOX_HALF_WIDTH, lower), (x + BOX_HALF_WIDTH, upper)],
                    color.mix(0.3).filled(),
                )))?;
                chart.draw_series(
                    [
                        vec![(x - BOX_HALF_WIDTH, median), (x + BOX_HALF_WIDTH, median)],
                        vec![(x, upper), (x, upper_fence)],
                        vec![(x, lower), (x, lower_fence)],
                    ]
                    .into_iter()
                    .map(|path| PathElement::new(path, BLACK)),
                )?;
                // individual runs on top of the box
                chart.draw_series(
                    samples
                        .iter()
                        .map(|&v| Circle::new((x, v), 3, color.filled())),
                )?;
            }
        }
        PlotData::Bars { categories } => {
            chart.draw_series(categories.iter().enumerate().map(|(i, (_, value))| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BOX_HALF_WIDTH, 0.0), (x + BOX_HALF_WIDTH, *value)],
                    Palette99::pick(i).filled(),
                )
            }))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(feature = "ttf")]
fn draw_png(path: &Path, spec: &PlotSpec) -> Result<()> {
    draw(BitMapBackend::new(path, PLOT_SIZE).into_drawing_area(), spec)
}

// text in bitmaps needs a font backend
#[cfg(not(feature = "ttf"))]
fn draw_png(_path: &Path, _spec: &PlotSpec) -> Result<()> {
    anyhow::bail!("PNG plots need piquant built with the `ttf` feature, use svg instead")
}

/// File a plot is written to, creating its directory.
fn plot_path(spec: &PlotSpec, plots_dir: &Path, format: PlotFormat) -> Result<PathBuf> {
    let path = PathBuf::from(format!(
        "{}.{}",
        plots_dir.join(&spec.path).display(),
        format.extension()
    ));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    Ok(path)
}

/// PDF plots are drawn as SVG and converted.
fn draw_pdf(path: &Path, spec: &PlotSpec) -> Result<()> {
    let mut svg = String::new();
    draw(SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area(), spec)?;

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(&svg, &options)?;
    let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow!("Failed to convert plot to PDF: {:?}", e))?;

    std::fs::write(path, pdf)?;
    Ok(())
}

///
/// Draw one plot under `plots_dir` in the requested format.
///
pub fn render_plot(spec: &PlotSpec, plots_dir: &Path, format: PlotFormat) -> Result<PathBuf> {
    let path = plot_path(spec, plots_dir, format)?;
    match format {
        PlotFormat::Pdf => draw_pdf(&path, spec),
        PlotFormat::Svg => draw(SVGBackend::new(&path, PLOT_SIZE).into_drawing_area(), spec),
        PlotFormat::Png => draw_png(&path, spec),
    }
    .with_context(|| format!("Failed to draw {:?}", path))?;
    Ok(path)
}

///
/// Draw every plot, reporting progress.
///
pub fn render_plots(specs: &[PlotSpec], plots_dir: &Path, format: PlotFormat) -> Result<usize> {
    let pb = ProgressBar::new(specs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );
    pb.set_message("Drawing plots");

    for spec in specs {
        render_plot(spec, plots_dir, format)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Drew {} plots in {:?}", specs.len(), plots_dir);
    Ok(specs.len())
}

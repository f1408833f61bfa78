//! Chart output: PNG/SVG files and the interactive viewer.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::chart::LineChart;
use super::svg::generate_svg;


const BACKGROUND_RGB: (u8, u8, u8) = (255, 255, 255);


/// Write a chart to `output_path`, as SVG when the extension is `.svg` and PNG otherwise.
pub fn export_chart(chart: &LineChart, output_path: &Path) -> Result<()> {
    let is_svg = output_path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        export_chart_svg(chart, output_path)
    } else {
        export_chart_png(chart, output_path)
    }
}


/// Export chart as SVG.
pub fn export_chart_svg(chart: &LineChart, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(chart);

    std::fs::write(output_path, svg_content)
        .with_context(|| format!("Failed to write SVG to {}", output_path.display()))?;

    Ok(())
}


/// Export chart as PNG.
pub fn export_chart_png(chart: &LineChart, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(chart);

    // Text needs real fonts; usvg starts with an empty database.
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = resvg::usvg::Tree::from_str(&svg_content, &options)
        .context("Failed to parse SVG")?;

    let size = tree.size();
    let width = size.width() as u32;
    let height = size.height() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    let (r, g, b) = BACKGROUND_RGB;
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .with_context(|| format!("Failed to save PNG to {}", output_path.display()))?;

    Ok(())
}


/// Display a chart and block until the user dismisses it.
///
/// The chart is rendered to a temporary PNG, handed to the platform viewer,
/// and deleted once Enter is pressed, so nothing is left on disk.
pub fn show_chart<R: BufRead, W: Write>(
    chart: &LineChart,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let path = temp_chart_path();
    export_chart_png(chart, &path)?;
    debug!(path = %path.display(), "rendered chart for display");

    let shown = open_file(&path).and_then(|_| {
        write!(out, "Showing \"{}\". Press Enter to close...", chart.title)?;
        out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(())
    });

    if let Err(e) = std::fs::remove_file(&path) {
        warn!(path = %path.display(), error = %e, "failed to remove temporary chart");
    }

    shown
}


fn temp_chart_path() -> PathBuf {
    std::env::temp_dir().join(format!("brushplot-{}.png", std::process::id()))
}


/// Open file with default application.
pub fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .context("Failed to open chart viewer")?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.to_string_lossy()])
            .spawn()
            .context("Failed to open chart viewer")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .context("Failed to open chart viewer")?;
    }

    Ok(())
}

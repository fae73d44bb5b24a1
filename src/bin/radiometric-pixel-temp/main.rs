mod args;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{bail, Context, Result};
use ndarray::Array2;

use args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;
    let grid = load_thermal_csv(&args.csv)?;

    match args.coords.as_slice() {
        [x, y] => {
            let temp = temp_at(&grid, *x, *y)?;
            println!("Temperature at pixel ({}, {}): {:.2} C", x, y, temp);
        }
        [x1, y1, x2, y2] => {
            let temp1 = temp_at(&grid, *x1, *y1)?;
            let temp2 = temp_at(&grid, *x2, *y2)?;
            let diff = temp2 - temp1;
            println!("Pixel 1 ({}, {}): {:.2} C", x1, y1, temp1);
            println!("Pixel 2 ({}, {}): {:.2} C", x2, y2, temp2);
            println!("Temperature difference: {:.2} C", diff);
            println!("Absolute difference: {:.2} C", diff.abs());
        }
        other => bail!("expected 2 or 4 coordinates, got {}", other.len()),
    }
    Ok(())
}

/// Rebuild the temperature grid from an exported CSV.
///
/// Dimensions are the maximum coordinate + 1. Rows for
/// pixels skipped during extraction are absent from the
/// file and read back as NaN.
fn load_thermal_csv(path: &Path) -> Result<Array2<f64>> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("opening `{}`", path.display()))?,
    );

    let mut rows = Vec::new();
    let (mut max_x, mut max_y) = (0usize, 0usize);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            if line.trim() != "x,y,temperature_celsius" {
                bail!("`{}` is not a thermal CSV (unexpected header)", path.display());
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        let (x, y, temp) = match (fields.next(), fields.next(), fields.next()) {
            (Some(x), Some(y), Some(t)) => (
                x.parse::<usize>()
                    .with_context(|| format!("row {}: x `{}`", idx + 1, x))?,
                y.parse::<usize>()
                    .with_context(|| format!("row {}: y `{}`", idx + 1, y))?,
                t.parse::<f64>()
                    .with_context(|| format!("row {}: temperature `{}`", idx + 1, t))?,
            ),
            _ => bail!("malformed row {} in `{}`", idx + 1, path.display()),
        };
        max_x = max_x.max(x);
        max_y = max_y.max(y);
        rows.push((x, y, temp));
    }
    if rows.is_empty() {
        bail!("`{}` holds no pixel rows", path.display());
    }

    let (width, height) = (max_x + 1, max_y + 1);
    let mut grid = Array2::from_elem((height, width), f64::NAN);
    for (x, y, temp) in rows {
        grid[(y, x)] = temp;
    }
    Ok(grid)
}

fn temp_at(grid: &Array2<f64>, x: usize, y: usize) -> Result<f64> {
    let (height, width) = grid.dim();
    if x >= width || y >= height {
        bail!(
            "pixel ({}, {}) out of bounds: x 0-{}, y 0-{}",
            x,
            y,
            width - 1,
            height - 1
        );
    }
    let temp = grid[(y, x)];
    if temp.is_nan() {
        bail!("pixel ({}, {}) has no data (skipped during extraction)", x, y);
    }
    Ok(temp)
}

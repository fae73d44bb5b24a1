mod args;

use std::{
    fs,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use radiometric::cli::{process_paths_par, DecodedInput};
use radiometric::{convert_image, write_summary, RunSummary};

use args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;

    let Args {
        paths,
        output,
        is_json,
    } = args;

    fs::create_dir_all(&output)
        .with_context(|| format!("creating output directory `{}`", output.display()))?;

    let (count, skipped) = process_paths_par(paths, is_json)
        .into_par_iter()
        .map(|try_input| -> Result<RunSummary> {
            let input = try_input?;
            process_one(input, &output)
        })
        .try_fold(
            || (0usize, 0u64),
            |acc, try_summary| -> Result<_> {
                let summary = try_summary?;
                Ok((acc.0 + 1, acc.1 + summary.statistics.skipped))
            },
        )
        .try_reduce(|| (0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))?;

    eprintln!("Processed {} images ({} pixels skipped)", count, skipped);
    Ok(())
}

/// Stream one image to `<stem>_thermal_data.csv`, then write
/// `<stem>_thermal_data.json`. The summary only exists for a
/// completed pass, so an aborted run leaves at most a
/// partial CSV and no JSON.
fn process_one(input: DecodedInput, output: &Path) -> Result<RunSummary> {
    let DecodedInput {
        filename,
        grid,
        calibration,
    } = input;

    let stem = Path::new(&filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let csv_path = output.join(format!("{}_thermal_data.csv", stem));
    let csv = BufWriter::new(
        File::create(&csv_path).with_context(|| format!("creating `{}`", csv_path.display()))?,
    );
    let summary = convert_image(&grid, &calibration, csv)
        .with_context(|| format!("converting `{}`", filename))?;

    let json_path = output.join(format!("{}_thermal_data.json", stem));
    let mut json_out = BufWriter::new(
        File::create(&json_path).with_context(|| format!("creating `{}`", json_path.display()))?,
    );
    write_summary(&summary, &mut json_out)
        .and_then(|_| Ok(json_out.flush()?))
        .with_context(|| format!("writing summary for `{}`", filename))?;

    Ok(summary)
}

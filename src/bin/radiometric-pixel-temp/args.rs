use anyhow::{anyhow, Result};
use radiometric::{arg, args_parser};
use std::path::PathBuf;

pub struct Args {
    pub csv: PathBuf,
    pub coords: Vec<usize>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("radiometric-pixel-temp")
            .about("Read temperatures at pixels from an exported thermal CSV.")
            .arg(
                arg!("csv")
                    .required(true)
                    .help("CSV exported by radiometric-extract"),
            )
            .arg(
                arg!("coords")
                    .required(true)
                    .multiple(true)
                    .help("X Y of one pixel, or X1 Y1 X2 Y2 to compare two pixels"),
            )
            .get_matches();

        let csv = matches.value_of("csv").unwrap().into();
        let coords = matches
            .values_of("coords")
            .unwrap()
            .map(|c| {
                c.parse()
                    .map_err(|e| anyhow!("coordinate `{}`: {}", c, e))
            })
            .collect::<Result<_>>()?;

        Ok(Args { csv, coords })
    }
}

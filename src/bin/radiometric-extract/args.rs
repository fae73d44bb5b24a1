use anyhow::Result;
use clap::value_t_or_exit;
use radiometric::{arg, args_parser, opt};
use std::path::PathBuf;

pub struct Args {
    pub paths: Vec<String>,
    pub output: PathBuf,
    pub is_json: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("radiometric-extract")
            .about("Convert radiometric drone images to per-pixel temperature CSV + JSON summary.")
            .arg(
                opt!("json")
                    .short("j")
                    .takes_value(false)
                    .help("Paths are jsons created using exiftool (default: paths are radiometric images)"),
            )
            .arg(
                opt!("output")
                    .short("o")
                    .help("Output directory.  Default is data/output"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("Image / json paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .unwrap()
            .map(|f| f.into())
            .collect();
        let output = matches
            .is_present("output")
            .then(|| value_t_or_exit!(matches.value_of("output"), PathBuf))
            .unwrap_or_else(|| PathBuf::from("data/output"));
        let is_json = matches.is_present("json");

        Ok(Args {
            paths,
            output,
            is_json,
        })
    }
}

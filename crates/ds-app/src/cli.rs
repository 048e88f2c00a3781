//! Command line arguments

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use ds_sampling::{ChartKind, SampleMethod};

pub const USAGE: &str = "\
Usage: datasift <FILE> [OPTIONS]

Options:
  --config <PATH>       JSON parse options
  --max-rows <N>        Stop after N data rows
  --max-bytes <N>       Stop after N bytes
  --sample-size <N>     Rows used for type inference
  --common-nulls        Also treat -, N/A, NA, null and None as empty
  --chart <KIND>        Reduce rows for a chart (bar, line, area, scatter, pie, heatmap, histogram, table)
  --width <PX>          Screen width used to scale the chart budget
  --method <METHOD>     uniform, random or stratified:<column>
  --keep-ends <N>       Keep the first and last N rows when sampling
  --preview <N>         Print the first N rows as a table
  --out <PATH>          Write rows to a .csv or .json file
  -h, --help            Show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub max_rows: Option<usize>,
    pub max_bytes: Option<u64>,
    pub sample_size: Option<usize>,
    pub common_nulls: bool,
    pub chart: Option<ChartKind>,
    pub width: Option<u32>,
    pub method: SampleMethod,
    pub keep_ends: usize,
    pub preview: usize,
    pub out: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments after the program name. `Ok(None)` means help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut input = None;
        let mut parsed = CliArgs {
            input: PathBuf::new(),
            config: None,
            max_rows: None,
            max_bytes: None,
            sample_size: None,
            common_nulls: false,
            chart: None,
            width: None,
            method: SampleMethod::Uniform,
            keep_ends: 0,
            preview: 0,
            out: None,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))
            };

            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--max-rows" => parsed.max_rows = Some(parse_number(&value("--max-rows")?, "--max-rows")?),
                "--max-bytes" => parsed.max_bytes = Some(parse_number(&value("--max-bytes")?, "--max-bytes")?),
                "--sample-size" => {
                    parsed.sample_size = Some(parse_number(&value("--sample-size")?, "--sample-size")?)
                }
                "--common-nulls" => parsed.common_nulls = true,
                "--chart" => parsed.chart = Some(value("--chart")?.parse()?),
                "--width" => parsed.width = Some(parse_number(&value("--width")?, "--width")?),
                "--method" => parsed.method = parse_method(&value("--method")?)?,
                "--keep-ends" => parsed.keep_ends = parse_number(&value("--keep-ends")?, "--keep-ends")?,
                "--preview" => parsed.preview = parse_number(&value("--preview")?, "--preview")?,
                "--out" => parsed.out = Some(PathBuf::from(value("--out")?)),
                flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
                path => {
                    if input.is_some() {
                        bail!("Unexpected extra argument: {}", path);
                    }
                    input = Some(PathBuf::from(path));
                }
            }
        }

        parsed.input = input.ok_or_else(|| anyhow!("No input file given"))?;
        Ok(Some(parsed))
    }
}

fn parse_number<T>(raw: &str, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("Invalid value for {}: {}", flag, raw))
}

fn parse_method(raw: &str) -> Result<SampleMethod> {
    match raw.split_once(':') {
        Some(("stratified", column)) if !column.is_empty() => Ok(SampleMethod::Stratified {
            column: column.to_string(),
        }),
        None if raw == "uniform" => Ok(SampleMethod::Uniform),
        None if raw == "random" => Ok(SampleMethod::Random),
        _ => bail!("Unknown sampling method: {}", raw),
    }
}

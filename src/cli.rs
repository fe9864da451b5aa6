use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments for sheetsift
#[derive(Parser, Debug)]
#[command(version, about = "Load a scientific workbook and filter its sample points")]
pub struct Args {
    /// Workbook to load (.xlsx, .xlsm, .xlsb, .xls, .ods)
    pub path: PathBuf,

    /// Keep only points where VARIABLE OP CRITERION holds. Repeat to AND
    /// several subsets. VARIABLE is the `name (unit)` label, OP one of
    /// == != > < >= <= (or eq ne gt lt ge le).
    #[arg(
        long = "where",
        num_args = 3,
        value_names = ["VARIABLE", "OP", "CRITERION"],
        action = ArgAction::Append
    )]
    pub filters: Vec<String>,

    /// Print the variable and operator catalogs
    #[arg(long = "catalog", action)]
    pub catalog: bool,

    /// Print the comment block of each sheet
    #[arg(long = "comments", action)]
    pub comments: bool,

    /// Print parallel-coordinates data (JSON) instead of the table.
    /// Restrict the axes with --var.
    #[arg(long = "parcoords", action, conflicts_with = "scatter")]
    pub parcoords: bool,

    /// Variable to show as a parallel-coordinates axis (repeatable, default all)
    #[arg(long = "var", requires = "parcoords")]
    pub vars: Vec<String>,

    /// Print scatter data (JSON) for X against Y, coloured by optional Z
    #[arg(long = "scatter", num_args = 2..=3, value_names = ["X", "Y", "Z"])]
    pub scatter: Option<Vec<String>>,

    /// Write the filtered table to a file (.csv, .json or .parquet)
    #[arg(long = "export")]
    pub export: Option<PathBuf>,
}

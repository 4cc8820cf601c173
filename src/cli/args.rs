use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "geiger-hist",
    version,
    about = "Histogram of counts per interval for each trial in a Geiger counter CSV"
)]
pub struct Cli {
    /// CSV export with `Time (s) <trial>` and `Geiger Counts (counts/sample) <trial>` columns
    pub input: PathBuf,

    /// Program used to open each figure (defaults to the platform opener)
    #[arg(long, env = "GEIGER_VIEWER")]
    pub viewer: Option<String>,

    /// Render every trial but do not open a viewer
    #[arg(long, default_value_t = false)]
    pub no_show: bool,
}

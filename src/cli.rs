use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Electrode labels, comma separated (e.g. "Fpz,Fp1,Fp2")
    #[arg(long, value_delimiter = ',')]
    pub electrodes: Vec<String>,

    /// One value per electrode, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Vec<f64>,

    /// Grid samples per axis (overrides config)
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Path to config TOML
    #[arg(long, default_value = "topomap.toml")]
    pub config: String,

    /// Output image path (overrides config)
    #[arg(long)]
    pub output: Option<String>,

    /// Write a commented default config to the --config path, then exit
    #[arg(long, default_value_t = false)]
    pub write_config: bool,

    /// Print the known electrode labels and their positions, then exit
    #[arg(long, default_value_t = false)]
    pub list_electrodes: bool,
}

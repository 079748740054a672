use clap::Parser;
use std::path::PathBuf;

/// Batch image classification client with CSV reporting
#[derive(Parser, Debug, Clone)]
#[command(
    name = "imgclass",
    about = "Batch image classification client with CSV reporting",
    version,
    author,
    long_about = "imgclass submits every jpg/jpeg/png file in a directory to a remote \
                  classification endpoint and writes the collected results to three CSV \
                  reports. Failed classifications are recorded as placeholder rows and \
                  never abort the batch.\n\n\
                  Examples:\n  \
                  imgclass --file results --dir ./images --url https://classifier.local/classify\n  \
                  imgclass --file results --dir ./images --url https://classifier.local/classify \\\n           \
                  --user alice --passwd secret --normalize"
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "BASE",
        help = "Base name for the output CSV files (<BASE>minimal.csv, <BASE>confidence.csv, <BASE>.csv)"
    )]
    pub file: String,

    #[arg(long, value_name = "DIR", help = "Directory containing the images to classify")]
    pub dir: PathBuf,

    #[arg(long, value_name = "URL", help = "Classifier endpoint URL")]
    pub url: String,

    #[arg(
        long,
        value_name = "USER",
        requires = "passwd",
        help = "Basic-auth user name"
    )]
    pub user: Option<String>,

    #[arg(
        long,
        value_name = "PASSWORD",
        requires = "user",
        help = "Basic-auth password"
    )]
    pub passwd: Option<String>,

    #[arg(
        long,
        help = "Relabel 'negative' classifications as 'unclassified' with zero confidence"
    )]
    pub normalize: bool,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Request timeout in seconds (default: 30, or IMGCLASS_REQUEST_TIMEOUT)"
    )]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

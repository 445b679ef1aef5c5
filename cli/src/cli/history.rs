use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// List recorded samples, newest last (default)
    #[command(alias = "ls")]
    List {
        /// Show only the most recent N records
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Delete records by id
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Show database statistics
    Stats,

    /// Show one metric over time
    Trends {
        /// voltage, temperature, cycles, charge, health
        #[arg(short, long, default_value = "charge")]
        metric: String,

        #[arg(long)]
        json: bool,
    },
}

use clap::Subcommand;

pub mod env_name;
pub mod exec;
pub mod init;
pub mod list;
pub mod refresh;
pub mod watch;

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the configured keys once and report the result
    #[command(visible_alias = "r")]
    Refresh {
        /// Label to resolve under (overrides the settings file)
        #[arg(short, long)]
        label: Option<String>,

        /// Key to resolve; repeat for several (overrides the settings file)
        #[arg(short, long = "key", value_name = "KEY")]
        keys: Vec<String>,

        /// Print `export NAME='value'` lines for `eval`
        #[arg(long)]
        export: bool,
    },

    /// Show resolved keys as a tree with their variable names
    #[command(visible_alias = "ls")]
    List {
        /// Label to resolve under (overrides the settings file)
        #[arg(short, long)]
        label: Option<String>,

        /// Print secret values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Refresh repeatedly until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Resolve the configured keys and run a command with them in its environment
    Exec {
        /// Command to run
        command: String,

        /// Arguments to pass to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the environment variable name each key maps to
    EnvName {
        /// Configuration keys
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Write a settings file
    Init {
        /// Configuration store endpoint
        #[arg(long)]
        endpoint: String,

        /// Label to resolve under
        #[arg(short, long, default_value = "")]
        label: String,

        /// Key to resolve; repeat for several
        #[arg(short, long = "key", value_name = "KEY")]
        keys: Vec<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

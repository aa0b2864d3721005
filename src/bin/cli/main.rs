//! CLI tool for rdasave save container operations.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Save container inspection and item activation tool
#[derive(Parser)]
#[command(name = "rdasave")]
#[command(author, version, about = "Save container inspection and item activation tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Print every pipeline step to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Embedded file holding the game setup tree
    #[arg(long, default_value = rdasave::format::GAME_SETUP_FILE, global = true)]
    target: String,

    /// Encoding of directory entry names
    #[arg(long, value_enum, default_value = "utf16", global = true)]
    names: NameEncodingArg,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files of every directory block (alias: l)
    #[command(alias = "l")]
    List {
        /// Save file to list
        save: PathBuf,
    },

    /// Show the active items of a save (alias: s)
    #[command(alias = "s")]
    Show {
        /// Save file to inspect
        save: PathBuf,
    },

    /// Print the decoded game setup tree
    Dump {
        /// Save file to dump
        save: PathBuf,
    },

    /// Write the game setup payload to a file (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Save file to extract from
        save: PathBuf,

        /// Output file
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Write the stored (compressed) bytes instead of the payload
        #[arg(long)]
        raw: bool,
    },

    /// Activate items in a save (alias: a)
    #[command(alias = "a")]
    Activate {
        /// Save file to patch
        save: PathBuf,

        /// Items to activate: catalogue names or numeric ids (decimal or 0x hex)
        #[arg(required = true)]
        items: Vec<String>,

        /// Output file (default: <stem>_dlc_activated.a7s next to the input)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "9")]
        level: u32,
    },

    /// Print the known item catalogue
    Catalog,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum NameEncodingArg {
    Utf16,
    Utf8,
}

impl From<NameEncodingArg> for rdasave::NameEncoding {
    fn from(arg: NameEncodingArg) -> Self {
        match arg {
            NameEncodingArg::Utf16 => rdasave::NameEncoding::Utf16Le,
            NameEncodingArg::Utf8 => rdasave::NameEncoding::Utf8,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let context = commands::Context {
        format: cli.format,
        verbose: cli.verbose,
        target: cli.target,
        names: cli.names.into(),
    };

    let exit_code = match cli.command {
        Commands::List { save } => commands::list(&context, &save),

        Commands::Show { save } => commands::show(&context, &save),

        Commands::Dump { save } => commands::dump(&context, &save),

        Commands::Extract { save, output, raw } => {
            commands::extract(&context, &save, &output, raw)
        }

        Commands::Activate {
            save,
            items,
            output,
            level,
        } => commands::activate(&commands::ActivateConfig {
            context: &context,
            save_path: &save,
            items: &items,
            output: output.as_deref(),
            level,
        }),

        Commands::Catalog => commands::catalog(&context),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}

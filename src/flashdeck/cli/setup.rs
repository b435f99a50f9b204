use clap::{Parser, Subcommand, ValueEnum};
use flashdeck::generation::GenerationMode;
use flashdeck::model::ReviewMode;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("FLASHDECK_GIT_HASH");
    const COMMIT_DATE: &str = env!("FLASHDECK_COMMIT_DATE");
    const IS_RELEASE: &str = env!("FLASHDECK_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "flashdeck", bin_name = "flashdeck", version = get_version())]
#[command(about = "Study flashcards from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Where card sets are stored
    #[arg(long, global = true, env = "FLASHDECK_HOME", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Set(SetCommands),

    #[command(flatten)]
    Card(CardCommands),

    #[command(flatten)]
    Study(StudyCommands),

    #[command(flatten)]
    Data(DataCommands),
}

/// Review orderings as accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Normal,
    NewOnly,
    TopReview,
    LeastMastered,
}

impl From<ModeArg> for ReviewMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Normal => ReviewMode::Normal,
            ModeArg::NewOnly => ReviewMode::NewOnly,
            ModeArg::TopReview => ReviewMode::TopReview,
            ModeArg::LeastMastered => ReviewMode::LeastMastered,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GenerationModeArg {
    Basic,
    Formula,
    Code,
}

impl From<GenerationModeArg> for GenerationMode {
    fn from(arg: GenerationModeArg) -> Self {
        match arg {
            GenerationModeArg::Basic => GenerationMode::Basic,
            GenerationModeArg::Formula => GenerationMode::Formula,
            GenerationModeArg::Code => GenerationMode::Code,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SetCommands {
    /// List card sets
    #[command(alias = "ls", display_order = 1)]
    Sets,

    /// Create a card set and make it active
    #[command(display_order = 2)]
    New {
        /// Name words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Make a set the active one
    #[command(display_order = 3)]
    Use {
        /// Set position, id or name
        set: String,
    },

    /// Rename a set
    #[command(display_order = 4)]
    Rename {
        /// Set position, id or name
        set: String,

        /// New name words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Change how a set orders its cards for review
    #[command(display_order = 5)]
    Mode {
        /// Set position, id or name
        set: String,

        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Delete a set and its cards
    #[command(name = "rm-set", display_order = 6)]
    RmSet {
        /// Set position, id or name
        set: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// List the cards of a set in review order
    #[command(display_order = 10)]
    Cards {
        /// Set position, id or name (defaults to the active set)
        set: Option<String>,
    },

    /// Add a card to the active set
    #[command(alias = "a", display_order = 11)]
    Add {
        question: String,
        answer: String,

        #[arg(long)]
        hint: Option<String>,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        formula: Option<String>,

        /// Add to this set instead of the active one
        #[arg(long, short = 's', value_name = "SET")]
        set: Option<String>,
    },

    /// Change a card's text (an empty value clears hint, code or formula)
    #[command(alias = "e", display_order = 12)]
    Edit {
        /// Card position or id prefix
        card: String,

        #[arg(long, short = 'q')]
        question: Option<String>,

        #[arg(long, short = 'a')]
        answer: Option<String>,

        #[arg(long)]
        hint: Option<String>,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        formula: Option<String>,
    },

    /// Delete cards
    #[command(display_order = 13)]
    Rm {
        /// Card positions or id prefixes
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },

    /// Add cards to the favorites set
    #[command(display_order = 14)]
    Fav {
        /// Card positions or id prefixes
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },

    /// Remove cards from the favorites set
    #[command(display_order = 15)]
    Unfav {
        /// Card positions or id prefixes
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },

    /// Search every set for matching cards
    #[command(alias = "s", display_order = 16)]
    Search {
        /// Search words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum StudyCommands {
    /// Walk through the active set interactively
    #[command(display_order = 20)]
    Study,

    /// Mark cards as mastered once
    #[command(display_order = 21)]
    Master {
        /// Card positions or id prefixes
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },

    /// Record a review of cards
    #[command(display_order = 22)]
    Review {
        /// Card positions or id prefixes
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },

    /// Show learning statistics
    #[command(display_order = 23)]
    Stats,

    /// Generate cards into the active set
    #[command(alias = "gen", display_order = 24)]
    Generate {
        /// Topic words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// How many cards to ask for
        #[arg(short = 'n', long)]
        count: Option<u32>,

        #[arg(long, value_enum)]
        mode: Option<GenerationModeArg>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Save or remove the generation credential
    #[command(display_order = 30)]
    Key {
        /// Credential (empty string removes it)
        credential: String,
    },

    /// Write a JSON backup of everything
    #[command(display_order = 31)]
    Export {
        /// File or directory (defaults to the current directory)
        path: Option<PathBuf>,
    },

    /// Replace everything with a JSON backup
    #[command(display_order = 32)]
    Import { path: PathBuf },

    /// Delete all sets, cards and the credential
    #[command(display_order = 33)]
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Get or set configuration
    #[command(display_order = 34)]
    Config {
        /// Configuration key (e.g., default-card-count)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_options() {
        let cli = Cli::try_parse_from([
            "flashdeck", "add", "Q?", "A.", "--hint", "think", "-s", "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Card(CardCommands::Add { hint, set, .. })) => {
                assert_eq!(hint.as_deref(), Some("think"));
                assert_eq!(set.as_deref(), Some("2"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_mode_names() {
        let cli = Cli::try_parse_from(["flashdeck", "mode", "1", "least-mastered"]).unwrap();
        match cli.command {
            Some(Commands::Set(SetCommands::Mode { mode, .. })) => {
                assert_eq!(ReviewMode::from(mode), ReviewMode::LeastMastered)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_generate_and_global_flags() {
        let cli = Cli::try_parse_from([
            "flashdeck", "generate", "cell", "biology", "-n", "3", "--mode", "code", "-v",
            "--data-dir", "/tmp/deck",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/deck")));
        match cli.command {
            Some(Commands::Study(StudyCommands::Generate {
                prompt,
                count,
                mode,
            })) => {
                assert_eq!(prompt.join(" "), "cell biology");
                assert_eq!(count, Some(3));
                assert_eq!(mode, Some(GenerationModeArg::Code));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["flashdeck"]).unwrap();
        assert!(cli.command.is_none());
    }
}

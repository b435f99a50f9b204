//! # CLI Layer
//!
//! This module is **one possible UI client** for flashdeck. It is the only place that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Installs the logging subscriber
//! - Resolves where data lives on disk
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Resolve the data directory and open `FlashdeckApi`
//! 3. **API Dispatch**: Call the matching `FlashdeckApi` method
//! 4. **Output Formatting**: Hand the `CmdResult` to the render module
//!
//! Business rules stay in the command layer. Handlers here only translate
//! arguments and print what comes back.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Builds `AppContext` around the API
//! - `handle_*()`: Per-command handlers
//! - `study_loop()`: Interactive session over the active set

use super::render::{
    print_messages, render_card, render_cards, render_config, render_hint, render_messages,
    render_sets, render_stats, render_study_header,
};
use super::setup::{CardCommands, Cli, Commands, DataCommands, SetCommands, StudyCommands};
use clap::Parser;
use directories::ProjectDirs;
use flashdeck::api::{CardEdit, CmdResult, ConfigAction, FlashdeckApi};
use flashdeck::error::{FlashdeckError, Result};
use flashdeck::generation::HttpGenerator;
use flashdeck::mastery::MasteryAction;
use flashdeck::model::NewCard;
use flashdeck::store::fs_backend::FsBackend;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: FlashdeckApi<FsBackend>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Set(cmd)) => match cmd {
            SetCommands::Sets => handle_sets(&ctx),
            SetCommands::New { name } => handle_new(&mut ctx, name),
            SetCommands::Use { set } => handle_use(&mut ctx, &set),
            SetCommands::Rename { set, name } => handle_rename(&mut ctx, &set, name),
            SetCommands::Mode { set, mode } => {
                let result = ctx.api.set_review_mode(&set, mode.into())?;
                print_messages(&result.messages);
                Ok(())
            }
            SetCommands::RmSet { set } => {
                let result = ctx.api.delete_set(&set)?;
                print_messages(&result.messages);
                Ok(())
            }
        },
        Some(Commands::Card(cmd)) => match cmd {
            CardCommands::Cards { set } => handle_cards(&ctx, set.as_deref()),
            CardCommands::Add {
                question,
                answer,
                hint,
                code,
                formula,
                set,
            } => {
                let card = NewCard {
                    question,
                    answer,
                    hint,
                    code,
                    formula,
                };
                handle_add(&mut ctx, card, set.as_deref())
            }
            CardCommands::Edit {
                card,
                question,
                answer,
                hint,
                code,
                formula,
            } => {
                let edit = CardEdit {
                    question,
                    answer,
                    hint,
                    code,
                    formula,
                };
                let result = ctx.api.edit_card(&card, edit)?;
                print_messages(&result.messages);
                Ok(())
            }
            CardCommands::Rm { cards } => {
                let result = ctx.api.delete_cards(cards.as_slice())?;
                print_messages(&result.messages);
                Ok(())
            }
            CardCommands::Fav { cards } => {
                let result = ctx.api.favorite_cards(cards.as_slice())?;
                print_messages(&result.messages);
                Ok(())
            }
            CardCommands::Unfav { cards } => {
                let result = ctx.api.unfavorite_cards(cards.as_slice())?;
                print_messages(&result.messages);
                Ok(())
            }
            CardCommands::Search { query } => handle_search(&ctx, query),
        },
        Some(Commands::Study(cmd)) => match cmd {
            StudyCommands::Study => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                study_loop(&mut ctx.api, stdin.lock(), stdout.lock())
            }
            StudyCommands::Master { cards } => {
                handle_record(&mut ctx, &cards, MasteryAction::Mastered)
            }
            StudyCommands::Review { cards } => {
                handle_record(&mut ctx, &cards, MasteryAction::Reviewed)
            }
            StudyCommands::Stats => handle_stats(&ctx),
            StudyCommands::Generate {
                prompt,
                count,
                mode,
            } => handle_generate(&mut ctx, prompt, count, mode.map(Into::into)),
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Key { credential } => {
                let result = ctx.api.set_credential(&credential);
                print_messages(&result.messages);
                Ok(())
            }
            DataCommands::Export { path } => {
                let target = path.unwrap_or_else(|| PathBuf::from("."));
                let result = ctx.api.export(&target)?;
                print_messages(&result.messages);
                Ok(())
            }
            DataCommands::Import { path } => {
                let result = ctx.api.import(&path)?;
                print_messages(&result.messages);
                Ok(())
            }
            DataCommands::Clear { yes } => handle_clear(&mut ctx, yes),
            DataCommands::Config { key, value } => handle_config(&ctx, key, value),
        },
        None => handle_sets(&ctx),
    }
}

/// Logs go to stderr. `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "flashdeck", "flashdeck")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                FlashdeckError::Store("could not determine a data directory".to_string())
            })?,
    };
    debug!("Using data directory {}", data_dir.display());

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        warn!("Could not create {}: {}", data_dir.display(), e);
    }

    let api = FlashdeckApi::open_dir(data_dir);
    if !api.storage_available() {
        eprintln!(
            "Warning: storage at {} is not available; changes will not be saved",
            api.data_dir().display()
        );
    }
    Ok(AppContext { api })
}

fn handle_sets(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_sets();
    print!("{}", render_sets(&result.listed_sets));
    print_messages(&result.messages);
    Ok(())
}

fn handle_new(ctx: &mut AppContext, name: Vec<String>) -> Result<()> {
    let result = ctx.api.create_set(&name.join(" "))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_use(ctx: &mut AppContext, set: &str) -> Result<()> {
    let result = ctx.api.use_set(set)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rename(ctx: &mut AppContext, set: &str, name: Vec<String>) -> Result<()> {
    let result = ctx.api.rename_set(set, &name.join(" "))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_cards(ctx: &AppContext, set: Option<&str>) -> Result<()> {
    let result = ctx.api.list_cards(set)?;
    print!("{}", render_cards(&result.listed_cards, false));
    print_messages(&result.messages);
    Ok(())
}

fn handle_add(ctx: &mut AppContext, card: NewCard, set: Option<&str>) -> Result<()> {
    let result = ctx.api.add_card(card, set)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(ctx: &AppContext, query: Vec<String>) -> Result<()> {
    let result = ctx.api.search(&query.join(" "));
    print!("{}", render_cards(&result.listed_cards, true));
    print_messages(&result.messages);
    Ok(())
}

fn handle_record(ctx: &mut AppContext, cards: &[String], action: MasteryAction) -> Result<()> {
    let result = ctx.api.record(cards, action)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_stats(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.stats();
    if let Some(stats) = &result.stats {
        print!("{}", render_stats(stats));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_generate(
    ctx: &mut AppContext,
    prompt: Vec<String>,
    count: Option<u32>,
    mode: Option<flashdeck::generation::GenerationMode>,
) -> Result<()> {
    let config = ctx.api.load_config()?;
    let generator = HttpGenerator::new(config.generation_url.clone(), config.request_timeout());
    let result = ctx.api.generate(&prompt.join(" "), count, mode, &generator)?;
    print!("{}", render_cards(&result.affected_cards, false));
    print_messages(&result.messages);
    Ok(())
}

fn handle_clear(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes {
        return Err(FlashdeckError::Api(
            "This deletes every set, card and the credential; rerun with --yes to confirm"
                .to_string(),
        ));
    }
    let result = ctx.api.clear()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print!("{}", render_config(config));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

const STUDY_KEYS: &str = "[a]nswer [h]int [m]astered [r]eviewed [n]ext [p]revious [q]uit";

/// Interactive study session over the active set's review order. Reads one
/// command per line until `q` or end of input.
fn study_loop<R: BufRead, W: Write>(
    api: &mut FlashdeckApi<FsBackend>,
    input: R,
    mut out: W,
) -> Result<()> {
    let mut lines = input.lines();
    let mut shown = None;

    loop {
        let Some(study) = api.study_card() else {
            writeln!(out, "No cards to study in the active set.")?;
            return Ok(());
        };

        let key = (study.card.id.clone(), study.position);
        if shown.as_ref() != Some(&key) {
            write!(out, "\n{}", render_study_header(&study))?;
            write!(out, "{}", render_card(&study.card, false))?;
            shown = Some(key);
        }
        writeln!(out, "{}", STUDY_KEYS)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        match line?.trim() {
            "a" => write!(out, "{}", render_card(&study.card, true))?,
            "h" => match &study.card.hint {
                Some(hint) => write!(out, "{}", render_hint(hint))?,
                None => writeln!(out, "This card has no hint.")?,
            },
            "m" => {
                let result = api.study_act(MasteryAction::Mastered)?;
                write_result(&mut out, &result)?;
            }
            "r" => {
                let result = api.study_act(MasteryAction::Reviewed)?;
                write_result(&mut out, &result)?;
                api.study_next();
            }
            "n" => {
                if !api.study_next() {
                    writeln!(out, "This is the last card.")?;
                }
            }
            "p" => {
                if !api.study_previous() {
                    writeln!(out, "This is the first card.")?;
                }
            }
            "q" => return Ok(()),
            "" => {}
            other => writeln!(out, "Unknown key '{}'", other)?,
        }
    }
}

fn write_result<W: Write>(out: &mut W, result: &CmdResult) -> Result<()> {
    write!(out, "{}", render_messages(&result.messages))?;
    Ok(())
}

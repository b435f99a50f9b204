//! # Rendering Module
//!
//! Turns command results into terminal text. Every `render_*` function returns a
//! `String` so output can be tested without a terminal; the `print_*` wrappers write
//! to stdout.
//!
//! Layout math (width, truncation, padding) is Unicode aware. Lines are never wider
//! than [`LINE_WIDTH`], and shrink to the terminal when it is narrower.

use chrono::{DateTime, Utc};
use colored::Colorize;
use flashdeck::api::{CmdMessage, MessageLevel, StudyCard};
use flashdeck::commands::stats::Stats;
use flashdeck::config::{FlashdeckConfig, KEYS};
use flashdeck::index::{DisplayCard, SetSummary};
use flashdeck::mastery::{state_of, MasteryState, MASTERY_THRESHOLD};
use flashdeck::model::Card;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
pub const ACTIVE_MARKER: &str = "▸";
pub const FAVORITE_MARKER: &str = "★";

fn line_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| usize::from(cols).min(LINE_WIDTH))
        .unwrap_or(LINE_WIDTH)
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let text = match m.level {
                MessageLevel::Info => m.content.dimmed(),
                MessageLevel::Success => m.content.green(),
                MessageLevel::Warning => m.content.yellow(),
                MessageLevel::Error => m.content.red(),
            };
            format!("{}\n", text)
        })
        .collect()
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

pub fn render_sets(sets: &[SetSummary]) -> String {
    render_sets_with_width(sets, line_width())
}

fn render_sets_with_width(sets: &[SetSummary], width: usize) -> String {
    let mut out = String::new();
    for set in sets {
        let marker = if set.is_active { ACTIVE_MARKER } else { " " };
        let idx = format!("{}. ", set.position);
        let counts = format!(
            "{:>4} cards {:>4} mastered  {:<14}",
            set.cards,
            set.mastered,
            set.review_mode.as_str()
        );
        let time_ago = format_time_ago(set.created_at);

        let fixed = 2 + idx.width() + counts.width() + TIME_WIDTH + 1;
        let available = width.saturating_sub(fixed);
        let name = truncate_to_width(&set.name, available);
        let padding = available.saturating_sub(name.width());

        let name = if set.is_favorites {
            name.yellow()
        } else if set.is_active {
            name.bold()
        } else {
            name.normal()
        };
        out.push_str(&format!(
            "{} {}{}{} {}{}\n",
            marker.cyan(),
            idx,
            name,
            " ".repeat(padding),
            counts.dimmed(),
            time_ago.dimmed()
        ));
    }
    out
}

/// One line per card. With `show_set` the owning set is printed after the question.
pub fn render_cards(cards: &[DisplayCard], show_set: bool) -> String {
    render_cards_with_width(cards, show_set, line_width())
}

fn render_cards_with_width(cards: &[DisplayCard], show_set: bool, width: usize) -> String {
    let mut out = String::new();
    for dc in cards {
        let card = &dc.card;
        let idx = format!("{:>3}. ", dc.position);
        let state = state_label(card);
        let fav = if card.is_favorite { FAVORITE_MARKER } else { " " };
        let id = format!("{:<8}", card.id.short());
        let right = format!(" {} {:<9} {}", fav, state, id);

        let text = if show_set {
            format!("{}  ({})", single_line(&card.question), dc.set_name)
        } else {
            single_line(&card.question)
        };
        let available = width.saturating_sub(idx.width() + right.width());
        let text = truncate_to_width(&text, available);
        let padding = available.saturating_sub(text.width());

        out.push_str(&format!(
            "{}{}{}{}\n",
            idx,
            text,
            " ".repeat(padding),
            colored_state(&right, state_of(card))
        ));
    }
    out
}

/// Full card text: question, then hint, answer and extras when `reveal` is set.
pub fn render_card(card: &Card, reveal: bool) -> String {
    let mut out = format!("{}\n", card.question.bold());
    if reveal {
        if let Some(hint) = &card.hint {
            out.push_str(&render_hint(hint));
        }
        out.push_str(&format!("\n{}\n", card.answer.green()));
        if let Some(formula) = &card.formula {
            out.push_str(&format!("\n{}\n{}\n", "formula:".dimmed(), formula));
        }
        if let Some(code) = &card.code {
            out.push_str(&format!("\n{}\n{}\n", "code:".dimmed(), code));
        }
    }
    out
}

pub fn render_hint(hint: &str) -> String {
    format!("{} {}\n", "hint:".dimmed(), hint)
}

pub fn render_study_header(study: &StudyCard) -> String {
    let card = &study.card;
    format!(
        "{} {}/{}  {}  reviewed {}  mastered {}/{}{}\n",
        study.set_name.bold(),
        study.position,
        study.total,
        state_label(card),
        card.reviewed_count,
        card.mastered_count,
        MASTERY_THRESHOLD,
        if card.is_favorite {
            format!("  {}", FAVORITE_MARKER.yellow())
        } else {
            String::new()
        }
    )
}

pub fn render_stats(stats: &Stats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16}{}\n{:<16}{}\n{:<16}{}\n{:<16}{}\n{:<16}{:.1}%\n",
        "Sets",
        stats.total_sets,
        "Cards",
        stats.total_cards,
        "Mastered",
        stats.mastered_cards,
        "Reviews",
        stats.total_reviews,
        "Mastery rate",
        stats.mastery_rate
    ));
    if stats.sets.is_empty() {
        return out;
    }

    out.push('\n');
    for set in &stats.sets {
        let name = truncate_to_width(&set.name, 30);
        let padding = 30usize.saturating_sub(name.width());
        out.push_str(&format!(
            "  {}{} {:>4} cards {:>4} mastered {:>6} reviews {:>6.1}%\n",
            if set.is_favorites {
                name.yellow()
            } else {
                name.normal()
            },
            " ".repeat(padding),
            set.cards,
            set.mastered,
            set.reviews,
            set.mastery_rate
        ));
    }
    out
}

pub fn render_config(config: &FlashdeckConfig) -> String {
    KEYS.iter()
        .map(|key| {
            format!(
                "{:<22}{}\n",
                key,
                config.get(key).unwrap_or_default()
            )
        })
        .collect()
}

fn state_label(card: &Card) -> String {
    state_of(card).to_string()
}

fn colored_state(text: &str, state: MasteryState) -> String {
    match state {
        MasteryState::New => text.cyan().to_string(),
        MasteryState::Learning => text.yellow().to_string(),
        MasteryState::Mastered => text.green().to_string(),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

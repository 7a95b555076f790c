//! UI utilities for the chat front-end

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use mmrag_core::{DocumentOrigin, Result, RetrievalOutcome};
use mmrag_rag::IngestionReport;

const PROMPT: &str = "mmrag>";

/// Display startup banner
pub fn display_banner(model: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "MMRAG - Multimodal RAG Assistant";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.chars().count() + 5)),
        "│".blue()
    );
    println!("{}", empty_line.blue());

    let model_line = format!("Model: {}", model);
    let lines = [
        "Ask about your PDF and image corpus",
        "",
        "/upload <path>   add a document to this session",
        "/image <path>    ask about an image",
        model_line.as_str(),
    ];

    for line in lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let padding = banner_width.saturating_sub(line.chars().count() + 5);
            println!("{}", format!("│  {}{}│", line, " ".repeat(padding)).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!("{}", "Tip: type a question, or 'help' for commands".dimmed());
    println!();
}

/// Handle input with history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input: read a plain line
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();
    result
}

fn read_line_raw(history: &mut Vec<String>) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(&input)?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    redraw(&input)?;
                }
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        redraw(&input)?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        redraw(&input)?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx + 1 < history.len() {
                            history_index = Some(idx + 1);
                            input = history[idx + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw(&input)?;
                    }
                }
                KeyCode::Esc => return Ok(String::new()),
                _ => {}
            }
        }
    }
}

fn redraw(input: &str) -> Result<()> {
    print!(
        "\r\x1b[2K{} {}",
        PROMPT.green().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about the corpus", "<question>".green());
    println!("  {} - Add a PDF or image to this session", "/upload <path>".green());
    println!("  {} - Attach an image to the following questions", "/image <path>".green());
    println!("  {} - Stop sending the attached image", "/clear-image".green());
    println!("  {} - Clear the chat history", "/clear".green());
    println!("  {} - Remove all session uploads", "/clear-uploads".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
}

/// Short label for where a retrieved document came from
pub fn origin_label(origin: DocumentOrigin) -> &'static str {
    match origin {
        DocumentOrigin::Persisted => "corpus",
        DocumentOrigin::EphemeralText => "upload",
        DocumentOrigin::EphemeralImage => "upload image",
    }
}

/// List the documents an answer was grounded on
pub fn print_sources(outcome: &RetrievalOutcome) {
    if outcome.documents.is_empty() {
        println!("{}", "No documents retrieved".dimmed());
        return;
    }
    println!("{}", "Sources:".bold());
    for doc in &outcome.documents {
        println!(
            "  {} {} {}",
            "•".cyan(),
            doc.record.source,
            format!("({}, distance {:.3})", origin_label(doc.origin), doc.distance).dimmed()
        );
    }
}

/// Summarise an ingestion pass
pub fn print_report(report: &IngestionReport) {
    println!(
        "{} Indexed {} text and {} image documents",
        "✅".green(),
        report.text_indexed,
        report.images_indexed
    );
    if !report.skipped.is_empty() {
        println!("{} Skipped: {}", "•".yellow(), report.skipped.join(", "));
    }
    for failure in &report.failures {
        println!("{} {}: {}", "❌".red(), failure.source, failure.reason);
    }
}

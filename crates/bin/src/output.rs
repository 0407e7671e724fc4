//! Output formatting helpers for human-readable and JSON output.

use scholarai::{api::Output, types::QuizQuestion};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    println!("{}", render_row(&widths, headers.iter().copied()));
    for row in rows {
        println!(
            "{}",
            render_row(&widths, row.iter().map(String::as_str).take(col_count))
        );
    }
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let line: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
        .collect();
    line.join("  ").trim_end().to_string()
}

/// Letter label for an option index: 0 -> A.
pub fn option_label(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

pub fn print_question(number: usize, total: usize, question: &QuizQuestion) {
    println!("Question {number}/{total}: {}", question.question);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", option_label(i));
    }
}

/// Print every question with its answer, without running the quiz.
pub fn print_quiz(questions: &[QuizQuestion]) {
    if questions.is_empty() {
        println!("No questions could be generated. Try another topic.");
        return;
    }
    for (i, question) in questions.iter().enumerate() {
        print_question(i + 1, questions.len(), question);
        println!(
            "  Answer: {}. {}",
            option_label(question.correct_answer),
            question.explanation
        );
        println!();
    }
}

/// Print an operation's result in the requested format.
pub fn print_output(output: &Output, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(output)?),
        OutputFormat::Human => match output {
            Output::Text(text) => println!("{text}"),
            Output::Quiz(questions) => print_quiz(questions),
        },
    }
    Ok(())
}

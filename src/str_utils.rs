//! Utility functions for string processing, particularly SQL script splitting

use regex::Regex;

// Regex compiled once as a lazy static for performance
static SELECT_REGEX: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"(?i)^\s*select").unwrap());

static TRANSACTION_CONTROL_REGEX: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"(?i)^\s*(begin|start\s+transaction|commit|end|rollback)\b").unwrap()
});

/// Number of characters of a statement shown in error messages
pub const STATEMENT_PREVIEW_CHARS: usize = 100;

/// Quote tracking state of the statement scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    #[default]
    Normal,
    InSingleQuote,
    InDoubleQuote,
}

impl QuoteState {
    /// True while the scanner is inside a string literal
    pub fn in_string(self) -> bool {
        self != QuoteState::Normal
    }

    fn on_quote(self, ch: char) -> Self {
        match (self, ch) {
            (QuoteState::Normal, '\'') => QuoteState::InSingleQuote,
            (QuoteState::Normal, '"') => QuoteState::InDoubleQuote,
            (QuoteState::InSingleQuote, '\'') | (QuoteState::InDoubleQuote, '"') => {
                QuoteState::Normal
            }
            (state, _) => state,
        }
    }

    /// Scan one line and return the state at its end.
    /// A quote directly preceded by a backslash never changes the state.
    pub fn scan_line(self, line: &str) -> Self {
        let mut state = self;
        let mut prev = None;

        for ch in line.chars() {
            if prev != Some('\\') {
                state = state.on_quote(ch);
            }
            prev = Some(ch);
        }

        state
    }
}

/// Check if a line is a `--` comment line
pub fn is_comment_line(line: &str) -> bool {
    line.trim().starts_with("--")
}

/// Check if a statement is a SELECT (case-insensitive, leading whitespace ignored)
pub fn is_select_statement(statement: &str) -> bool {
    SELECT_REGEX.is_match(statement)
}

/// Explicit transaction control written in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionControl {
    /// `BEGIN` or `START TRANSACTION`
    Begin,
    /// `COMMIT`, `END` or `ROLLBACK`
    Finish,
}

/// Classify a statement that opens or closes a transaction itself
pub fn transaction_control(statement: &str) -> Option<TransactionControl> {
    let caps = TRANSACTION_CONTROL_REGEX.captures(statement)?;
    let keyword = caps.get(1)?.as_str().to_lowercase();
    if keyword == "begin" || keyword.starts_with("start") {
        Some(TransactionControl::Begin)
    } else {
        Some(TransactionControl::Finish)
    }
}

/// Truncated statement text for error reporting
pub fn statement_preview(statement: &str) -> String {
    let head: String = statement.chars().take(STATEMENT_PREVIEW_CHARS).collect();
    format!("{head}...")
}

fn flush_statement(lines: &mut Vec<&str>, statements: &mut Vec<String>) {
    let statement = lines.join("\n");
    let trimmed = statement.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    lines.clear();
}

/// Split a SQL script into individual statements (respects quote boundaries).
///
/// The script is processed line by line. Comment lines outside string literals
/// are dropped, and a statement ends on the first line that contains a `;`
/// while no string literal is open at the end of that line. Anything left over
/// after the last line becomes the final statement.
///
/// Block comments are not recognized, and several statements sharing one line
/// are returned together as a single statement.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current_lines: Vec<&str> = Vec::new();
    let mut state = QuoteState::Normal;

    for line in sql.split('\n') {
        if !state.in_string() && is_comment_line(line) {
            continue;
        }

        state = state.scan_line(line);
        current_lines.push(line);

        if line.contains(';') && !state.in_string() {
            flush_statement(&mut current_lines, &mut statements);
        }
    }

    // Handle final statement without a terminating semicolon
    flush_statement(&mut current_lines, &mut statements);

    statements
}

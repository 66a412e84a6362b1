use crate::error::{LedgerError, Result};
use crate::interfaces::command::Command;
use std::io::{BufRead, BufReader, Lines, Read};

/// Reads commands from a script, one per line.
///
/// Each line is split by its own `csv::Reader` with a space delimiter and no
/// header row, so `transfer bob 200` becomes the tokens `transfer`, `bob`,
/// `200`. Names containing spaces can be double-quoted. Runs of spaces and
/// blank lines are skipped.
pub struct CommandReader<R: Read> {
    lines: Lines<BufReader<R>>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            lines: BufReader::new(source).lines(),
        }
    }

    /// Returns an iterator that lazily reads and parses commands.
    ///
    /// A malformed line yields an error item and reading continues with the
    /// next line.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.lines.filter_map(|line| match line {
            Ok(line) => parse_line(&line).transpose(),
            Err(err) => Some(Err(LedgerError::from(err))),
        })
    }
}

fn parse_line(line: &str) -> Result<Option<Command>> {
    // a quote never spans lines
    if line.matches('"').count() % 2 == 1 {
        return Err(LedgerError::InvalidInput(format!(
            "unterminated quote in '{}'",
            line.trim()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(None);
    }

    let tokens: Vec<&str> = record.iter().filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        Ok(None)
    } else {
        Command::parse(&tokens).map(Some)
    }
}

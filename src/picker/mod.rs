use colored::Colorize;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("No {0} available to choose from")]
    EmptyList(&'static str),

    #[error("Invalid selection {input:?}: enter a number")]
    Parse { input: String },

    #[error("Selection {index} is out of range (expected 1-{max})")]
    OutOfRange { index: i64, max: usize },

    #[error("Failed to read selection: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can appear in a numbered selection list.
pub trait Named {
    fn display_name(&self) -> &str;
}

/// Present `items` as a 1-based numbered list, read one line from `reader`,
/// and return the 0-based index of the selected item.
///
/// The same sequence is used for every level of the hierarchy: fail on an
/// empty list before prompting, print the list, read, trim, parse, bounds
/// check, translate to a 0-based offset.
pub fn choose<T: Named>(
    items: &[T],
    label: &'static str,
    reader: &mut impl BufRead,
) -> Result<usize, PickError> {
    if items.is_empty() {
        return Err(PickError::EmptyList(label));
    }

    println!("{}", format!("Available {label}:").bold());
    for (i, item) in items.iter().enumerate() {
        println!("{}. {}", i + 1, item.display_name());
    }
    print!("Select one (enter number): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim();
    let index: i64 = trimmed.parse().map_err(|_| PickError::Parse {
        input: trimmed.to_string(),
    })?;

    if index < 1 || index as usize > items.len() {
        return Err(PickError::OutOfRange {
            index,
            max: items.len(),
        });
    }

    debug!(label, index, "selection made");
    Ok((index - 1) as usize)
}

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use log::debug;

use crate::error::MonitorError;
use crate::roster::Class;

/// The class list, numbered from 1
pub fn format_menu(classes: &[Class]) -> String {
    classes
        .iter()
        .enumerate()
        .map(|(i, class)| format!("{}: {}\n", i + 1, class.name))
        .collect()
}

/// Pick a class by 1-based number or by name (case-insensitive)
pub fn select_class(classes: &[Class], choice: &str) -> Result<usize, MonitorError> {
    let choice = choice.trim();

    if let Ok(number) = choice.parse::<usize>() {
        if (1..=classes.len()).contains(&number) {
            return Ok(number - 1);
        }
        return Err(MonitorError::InvalidSelection(choice.to_string()));
    }

    classes
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(choice))
        .ok_or_else(|| MonitorError::InvalidSelection(choice.to_string()))
}

/// Ask on `output` which class to monitor, reading answers from `input`
/// until one is valid
pub fn prompt_for_class(
    classes: &[Class],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize> {
    if classes.is_empty() {
        bail!("the roster defines no classes");
    }

    writeln!(output, "Please choose a class:")?;
    write!(output, "{}", format_menu(classes))?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read class selection")?;
        if read == 0 {
            bail!("no class selected");
        }

        match select_class(classes, &line) {
            Ok(index) => {
                debug!("Selected class {}", classes[index].name);
                return Ok(index);
            }
            Err(err) => writeln!(output, "{}", err)?,
        }
    }
}

//! Interactive front end: a terminal prompt that picks the action and rows
//! file before the run starts. Blank answers keep the configured values.
use crate::action::Action;
use crate::config::ConfigOverrides;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub fn prompt_overrides<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    mut overrides: ConfigOverrides,
) -> Result<ConfigOverrides> {
    writeln!(output, "Available actions:").context("write prompt")?;
    for (number, action) in Action::ALL.iter().enumerate() {
        writeln!(
            output,
            "  {}) {:<8} {}",
            number + 1,
            action.as_str(),
            action.description()
        )
        .context("write prompt")?;
    }

    let action = loop {
        let answer = ask(input, output, "Action (number or name, blank for configured): ")?;
        match answer.as_deref().map(parse_action_choice) {
            None => break None,
            Some(Ok(action)) => break Some(action),
            Some(Err(err)) => writeln!(output, "{err}").context("write prompt")?,
        }
    };
    if let Some(action) = action {
        overrides.action = Some(action.as_str().to_string());
    }

    if let Some(rows) = ask(input, output, "Rows file (blank for configured): ")? {
        overrides.rows_file = Some(PathBuf::from(rows));
    }
    Ok(overrides)
}

fn parse_action_choice(answer: &str) -> Result<Action> {
    if let Ok(number) = answer.parse::<usize>() {
        if let Some(action) = number.checked_sub(1).and_then(|index| Action::ALL.get(index)) {
            return Ok(*action);
        }
    }
    answer.parse()
}

/// Read one trimmed answer; `None` for a blank line or end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{prompt}").context("write prompt")?;
    output.flush().context("flush prompt")?;
    let mut line = String::new();
    input.read_line(&mut line).context("read answer")?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_prompt(answers: &str, overrides: ConfigOverrides) -> (ConfigOverrides, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt_overrides(&mut input, &mut output, overrides).expect("prompt");
        (result, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn numbered_choice_and_rows_path_become_overrides() {
        let (overrides, output) = run_prompt("2\n/data/rows.json\n", ConfigOverrides::default());
        assert_eq!(overrides.action.as_deref(), Some("check"));
        assert_eq!(overrides.rows_file, Some(PathBuf::from("/data/rows.json")));
        assert!(output.contains("1) objects"));
        assert!(output.contains("2) check"));
    }

    #[test]
    fn blank_answers_keep_existing_overrides() {
        let existing = ConfigOverrides {
            action: Some("objects".to_string()),
            rows_file: Some(PathBuf::from("rows.json")),
            password: None,
        };
        let (overrides, _) = run_prompt("\n\n", existing.clone());
        assert_eq!(overrides, existing);
    }

    #[test]
    fn invalid_choice_is_asked_again() {
        let (overrides, output) = run_prompt("9\nlineage\nobjects\n\n", ConfigOverrides::default());
        assert_eq!(overrides.action.as_deref(), Some("objects"));
        assert!(output.contains("unknown action \"9\""));
        assert!(output.contains("unknown action \"lineage\""));
    }

    #[test]
    fn end_of_input_keeps_configuration() {
        let (overrides, _) = run_prompt("", ConfigOverrides::default());
        assert_eq!(overrides, ConfigOverrides::default());
    }
}

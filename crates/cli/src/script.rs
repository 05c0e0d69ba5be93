//! Line-based intent scripts for `pixmap paint`.
//!
//! ```text
//! # comments and blank lines are skipped
//! paint
//! color #00ff00
//! color 14
//! click 51.50501 -0.09001
//! space down
//! down 51.5051 -0.0900
//! move 51.5052 -0.0900
//! up
//! space up
//! confirm
//! ```

use pixgrid::color::ColorError;
use pixgrid::{Color, Intent, Key, LatLng};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Intent(Intent),
    /// Read the file and feed it to `Intent::Import`.
    ImportFile(PathBuf),
}

#[derive(Error, Debug, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{word}`")]
    UnknownCommand { line: usize, word: String },
    #[error("line {line}: `{command}` expects {expected}")]
    BadArguments {
        line: usize,
        command: String,
        expected: &'static str,
    },
    #[error("line {line}: `{value}` is not a number")]
    BadNumber { line: usize, value: String },
    #[error("line {line}: {source}")]
    BadColor { line: usize, source: ColorError },
}

pub fn parse(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, text) in source.lines().enumerate() {
        if let Some(step) = parse_line(index + 1, text)? {
            steps.push(step);
        }
    }
    Ok(steps)
}

fn parse_line(line: usize, text: &str) -> Result<Option<Step>, ScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let bad = |expected: &'static str| ScriptError::BadArguments {
        line,
        command: words[0].to_string(),
        expected,
    };

    let intent = match words.as_slice() {
        ["paint"] => Intent::EnterPaintMode,
        ["confirm"] => Intent::ConfirmPaint,
        ["color", choice] => Intent::SelectColor(
            Color::pick(choice).map_err(|source| ScriptError::BadColor { line, source })?,
        ),
        ["color", ..] => return Err(bad("a palette index or a #rrggbb color")),
        ["space" | "key", state] => {
            let key = if words[0] == "space" { Key::Space } else { Key::Other };
            match *state {
                "down" => Intent::KeyDown(key),
                "up" => Intent::KeyUp(key),
                _ => return Err(bad("`down` or `up`")),
            }
        }
        ["space" | "key", ..] => return Err(bad("`down` or `up`")),
        ["down", lat, lng] => Intent::PointerDown(point(line, lat, lng)?),
        ["move", lat, lng] => Intent::PointerMove(point(line, lat, lng)?),
        ["click", lat, lng] => Intent::Click(point(line, lat, lng)?),
        ["down" | "move" | "click", ..] => return Err(bad("a latitude and a longitude")),
        ["up"] => Intent::PointerUp,
        ["wipe"] => Intent::Wipe { confirmed: true },
        ["wipe", "cancel"] => Intent::Wipe { confirmed: false },
        ["export"] => Intent::Export,
        ["import", path] => return Ok(Some(Step::ImportFile(PathBuf::from(path)))),
        ["import", ..] => return Err(bad("a file path")),
        [word, ..] => {
            return Err(ScriptError::UnknownCommand {
                line,
                word: word.to_string(),
            });
        }
        [] => return Ok(None),
    };
    Ok(Some(Step::Intent(intent)))
}

fn point(line: usize, lat: &str, lng: &str) -> Result<LatLng, ScriptError> {
    let number = |value: &str| {
        value.parse::<f64>().map_err(|_| ScriptError::BadNumber {
            line,
            value: value.to_string(),
        })
    };
    Ok(LatLng::new(number(lat)?, number(lng)?))
}

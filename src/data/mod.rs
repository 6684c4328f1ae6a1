//! Patterson instance files and solution files.
//!
//! An instance file holds the task and resource counts, then the capacities,
//! then one record per task: duration, one requirement per resource, the number
//! of successors and the 1-indexed successors. Tokens are read as a stream, so a
//! record may be split over several lines.

mod run;

pub use run::*;

use crate::core::{Instance, InstanceData, TaskData};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Whitespace separated tokens with their 1-based line numbers.
struct Tokens<'a> {
    iter: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text.lines().enumerate();
        let iter = lines.flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)));
        Self {
            iter: Box::new(iter),
            line: 1,
        }
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let Some((line, token)) = self.iter.next() else {
            return Err(Error::Parse {
                line: self.line,
                message: format!("unexpected end of input, expected {what}"),
            });
        };
        self.line = line;
        token.parse().map_err(|_| Error::Parse {
            line,
            message: format!("invalid {what} '{token}'"),
        })
    }

    fn rest<T: FromStr>(self, what: &str) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for (line, token) in self.iter {
            values.push(token.parse().map_err(|_| Error::Parse {
                line,
                message: format!("invalid {what} '{token}'"),
            })?);
        }
        Ok(values)
    }

    fn remaining(&mut self) -> usize {
        self.iter.by_ref().count()
    }
}

/// Reads an instance in Patterson format and validates it.
///
/// # Errors
/// - If the reader fails.
/// - If a token is missing or not an integer.
/// - If a successor id is 0.
/// - If the instance is invalid, see [`Instance::new`].
pub fn deserialize(reader: &mut impl BufRead) -> Result<Instance> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = Tokens::new(&text);

    let tasks: usize = tokens.parse("task count")?;
    let resources: usize = tokens.parse("resource count")?;

    let capacities = (0..resources)
        .map(|_| tokens.parse("capacity"))
        .collect::<Result<Vec<i64>>>()?;

    let mut data = InstanceData {
        capacities,
        tasks: Vec::new(),
    };
    for _ in 0..tasks {
        let duration: i64 = tokens.parse("duration")?;
        let requirements = (0..resources)
            .map(|_| tokens.parse("requirement"))
            .collect::<Result<Vec<i64>>>()?;
        let count: usize = tokens.parse("successor count")?;
        let mut successors = Vec::new();
        for _ in 0..count {
            let id: usize = tokens.parse("successor")?;
            let Some(successor) = id.checked_sub(1) else {
                return Err(Error::Parse {
                    line: tokens.line,
                    message: "successor ids start at 1".into(),
                });
            };
            successors.push(successor);
        }
        data.tasks.push(TaskData {
            duration,
            requirements,
            successors,
        });
    }

    let extra = tokens.remaining();
    if extra > 0 {
        log::warn!("Ignoring {extra} tokens after the last task");
    }

    Ok(Instance::new(data)?)
}

/// Reads an instance in Patterson format from a file.
///
/// # Errors
/// - If the file cannot be opened.
/// - If the content is invalid, see [`deserialize`].
pub fn read_instance(path: impl AsRef<Path>) -> Result<Instance> {
    deserialize(&mut BufReader::new(File::open(path)?))
}

/// Writes an instance in Patterson format, one task per line.
#[must_use]
pub fn to_string(instance: &Instance) -> String {
    let mut lines = Vec::with_capacity(instance.tasks_len() + 2);
    lines.push(format!(
        "{} {}",
        instance.tasks_len(),
        instance.resources_len()
    ));
    let capacities: Vec<_> = instance.capacities().iter().map(u64::to_string).collect();
    lines.push(capacities.join(" "));

    for task in instance.tasks() {
        let mut line = vec![task.duration.to_string()];
        line.extend(task.requirements.iter().map(u64::to_string));
        line.push(task.successors.len().to_string());
        line.extend(task.successors.iter().map(|s| (s + 1).to_string()));
        lines.push(line.join(" "));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Reads whitespace separated start times.
///
/// # Errors
/// - If the reader fails.
/// - If a token is not an integer.
pub fn deserialize_solution(reader: &mut impl BufRead) -> Result<Vec<i64>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Tokens::new(&text).rest("start time")
}

/// Reads start times from a file.
///
/// # Errors
/// - If the file cannot be opened.
/// - If the content is invalid, see [`deserialize_solution`].
pub fn read_solution(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    deserialize_solution(&mut BufReader::new(File::open(path)?))
}

#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;

pub mod core;
pub mod data;
pub mod error;

/// Reads an instance from reader, evaluates the given start times and writes the
/// verdict followed by the score to stdout.
///
/// # Errors
/// - If the instance could not be read or is invalid.
/// - If the start times are malformed.
pub fn run_reader(
    reader: &mut impl BufRead,
    starts: &[i64],
    config: core::EvaluatorConfig,
) -> Result<()> {
    let instance = data::deserialize(reader)?;
    let evaluation = core::Evaluator::new(&instance, config).evaluate(starts)?;

    println!("{evaluation}");
    println!("{}", evaluation.score);

    Ok(())
}

#[cfg(not(target_pointer_width = "64"))]
compile_error!("Must be 64-bit system!");

/// Casts the given value to `u64`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `u64`.
#[must_use]
pub fn cast_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}

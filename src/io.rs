//! Very thin line-oriented readers and writers. Only support batch IO.
use crate::model::Labels;
use crate::{Error, Result, State};
use std::io::{BufRead, BufReader, Write};

fn open<P: AsRef<std::path::Path>>(file: P) -> Result<BufReader<std::fs::File>> {
    Ok(std::fs::File::open(file).map(BufReader::new)?)
}

/// Non-blank lines, trimmed, with their 1-based line numbers.
fn lines<R: BufRead>(rdr: R) -> impl Iterator<Item = Result<(usize, String)>> {
    rdr.lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok((i + 1, line.trim().to_string()))),
            Err(why) => Some(Err(Error::from(why))),
        })
}

/// Parse one integer per line, subtracting `offset` from each,
/// e.g., `offset = 1` turns die faces 1-6 into symbols 0-5.
pub fn parse_observations<R: BufRead>(rdr: R, offset: u64) -> Result<Vec<u64>> {
    lines(rdr)
        .map(|line| {
            let (line, text) = line?;
            let value: u64 = text.parse().map_err(|why| Error::Parse {
                line,
                message: format!("{:?}: {}", text, why),
            })?;
            value.checked_sub(offset).ok_or_else(|| Error::Parse {
                line,
                message: format!("{} is less than {}", value, offset),
            })
        })
        .collect()
}

/// Read a sequence file. See `parse_observations`.
pub fn read_observations<P: AsRef<std::path::Path>>(file: P, offset: u64) -> Result<Vec<u64>> {
    parse_observations(open(file)?, offset)
}

/// Parse one state label per line. If a line has several fields, the last one is the label.
pub fn parse_states<R: BufRead>(rdr: R, labels: &Labels) -> Result<Vec<State>> {
    lines(rdr)
        .map(|line| {
            let (line, text) = line?;
            let label = text.split_whitespace().last().unwrap_or_default();
            labels.parse(label).ok_or_else(|| Error::UnknownLabel {
                line,
                label: label.to_string(),
            })
        })
        .collect()
}

/// Read a state file. See `parse_states`.
pub fn read_states<P: AsRef<std::path::Path>>(file: P, labels: &Labels) -> Result<Vec<State>> {
    parse_states(open(file)?, labels)
}

/// Write the labels of `path`, `width` labels per line. `width = 0` means no wrapping.
pub fn write_wrapped<W: Write>(
    wtr: &mut W,
    path: &[State],
    labels: &Labels,
    width: usize,
) -> std::io::Result<()> {
    let width = if width == 0 { path.len().max(1) } else { width };
    for chunk in path.chunks(width) {
        writeln!(wtr, "{}", labels.render(chunk))?;
    }
    Ok(())
}

/// Write one observation per line, adding `offset` back.
pub fn write_observations<W: Write>(
    wtr: &mut W,
    observations: &[u64],
    offset: u64,
) -> std::io::Result<()> {
    for obs in observations {
        writeln!(wtr, "{}", obs + offset)?;
    }
    Ok(())
}

/// Write one state label per line.
pub fn write_states<W: Write>(wtr: &mut W, states: &[State], labels: &Labels) -> std::io::Result<()> {
    for &state in states {
        writeln!(wtr, "{}", labels.label(state))?;
    }
    Ok(())
}

use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use anyhow::{Result, Context};
use log::{debug, info, warn};

use super::types::SampleSet;

/// Scan `workdir` for sample directories.
///
/// Every sub-directory whose name does not start with `reserved` (the
/// results directory) is a sample. Names are sorted in natural order and the
/// prefix they all share is split off to give each sample its identifier.
/// Returns `None` when no directory qualifies.
///
/// A lone sample directory has nothing to share a prefix with, so its
/// trailing digit run becomes the identifier (`sample7` gives `7`). A lone
/// name without trailing digits keeps the whole name as the identifier.
pub fn discover_samples(workdir: &Path, reserved: &str) -> Result<Option<SampleSet>> {
    let entries = std::fs::read_dir(workdir)
        .with_context(|| format!("Failed to list directory: {}", workdir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", workdir.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!("Skipping directory with non UTF-8 name: {:?}", entry.file_name());
            continue;
        };
        if name.starts_with(reserved) {
            debug!("Skipping reserved directory {}", name);
            continue;
        }
        names.push(name);
    }

    if names.is_empty() {
        return Ok(None);
    }

    names.sort_by(|a, b| natural_cmp(a, b));

    let prefix = match names.as_slice() {
        [only] => {
            let prefix = trailing_id_prefix(only);
            if prefix == only.as_str() {
                warn!("Sample directory {} has no trailing identifier, using the whole name", only);
                String::new()
            } else {
                prefix.to_string()
            }
        }
        _ => common_prefix(&names).to_string(),
    };

    info!("Found {} sample directories (common prefix {:?})", names.len(), prefix);
    Ok(Some(SampleSet::from_sorted_names(names, prefix)))
}

/// Compare two names treating runs of ASCII digits as numbers, so that
/// `sample2` sorts before `sample10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ordering = compare_digit_runs(&l_run, &r_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');

    // Without leading zeros a longer run is a larger number
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Everything before the trailing run of ASCII digits
fn trailing_id_prefix(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Longest leading substring shared by every name
pub fn common_prefix(names: &[String]) -> &str {
    let Some(first) = names.first() else {
        return "";
    };

    let mut end = first.len();
    for name in &names[1..] {
        end = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((idx, a), _)| idx + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}

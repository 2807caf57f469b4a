//! Problem file reader and validation
//!
//! The format is line based:
//!
//! ```text
//! c comment
//! p <name> <nSpins> <nWeights>
//! <i> <j> <coeff>
//! ```
//!
//! A data line with `i == j` is the field of spin `i`; any other data line
//! couples spin `i` to its child `j`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::tree::Adjacency;

const COMMENT: char = 'c';
const PROBLEM: char = 'p';

#[derive(Error, Debug)]
pub enum InputError {
    #[error("could not open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no problem or data lines found")]
    Empty,

    #[error("problem line on line {line} follows data lines")]
    ProblemAfterData { line: usize },

    #[error("expected exactly one problem line `p <name> <nSpins> <nWeights>`, found {0}")]
    ProblemLine(usize),

    #[error("wrong number of weights: expected {expected}, found {found}")]
    WeightCount { expected: usize, found: usize },

    #[error("bad weight on line {line}: `{text}`")]
    BadWeight { line: usize, text: String },
}

/// One data line: coefficient between spins `i` and `j`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weight {
    pub i: usize,
    pub j: usize,
    pub value: i64,
}

/// A validated problem file
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: String,
    /// Declared number of spins
    pub n_spins: usize,
    pub weights: Vec<Weight>,
}

impl Problem {
    /// Read and validate a problem file
    pub fn read(path: &Path) -> Result<Self, InputError> {
        let content = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let problem: Self = content.parse()?;
        info!(
            path = %path.display(),
            name = %problem.name,
            spins = problem.n_spins,
            weights = problem.weights.len(),
            "loaded problem"
        );
        Ok(problem)
    }

    /// Group the weights into the mapping consumed by the tree builder
    ///
    /// With `sorted`, every adjacency list is ordered by neighbor index,
    /// which fixes the order of children in the built tree.
    pub fn adjacency(&self, sorted: bool) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for w in &self.weights {
            adjacency
                .entry(w.i)
                .or_default()
                .push((w.j, w.value as f64));
        }
        if sorted {
            for links in adjacency.values_mut() {
                links.sort_by_key(|&(j, _)| j);
            }
        }
        adjacency
    }
}

impl FromStr for Problem {
    type Err = InputError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        // (line number, whitespace-normalized tokens)
        let lines: Vec<(usize, Vec<&str>)> = content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with(COMMENT))
            .map(|(n, l)| (n + 1, l.split_whitespace().collect()))
            .collect();

        if lines.is_empty() {
            return Err(InputError::Empty);
        }

        let (problems, data): (Vec<_>, Vec<_>) = lines
            .iter()
            .partition(|(_, tokens)| tokens[0].starts_with(PROBLEM));

        if let (Some((last_problem, _)), Some((first_data, _))) = (problems.last(), data.first()) {
            if first_data < last_problem {
                return Err(InputError::ProblemAfterData {
                    line: *last_problem,
                });
            }
        }

        let valid: Vec<(&str, usize, usize)> = problems
            .iter()
            .filter_map(|(_, tokens)| match tokens.as_slice() {
                [p, name, n_spins, n_weights] if *p == "p" => Some((
                    *name,
                    parse_count(n_spins)?,
                    parse_count(n_weights)?,
                )),
                _ => None,
            })
            .collect();

        let [(name, n_spins, n_weights)] = valid.as_slice() else {
            return Err(InputError::ProblemLine(valid.len()));
        };

        if data.len() != *n_weights {
            return Err(InputError::WeightCount {
                expected: *n_weights,
                found: data.len(),
            });
        }

        let weights = data
            .iter()
            .map(|(line, tokens)| {
                parse_weight(tokens).ok_or_else(|| InputError::BadWeight {
                    line: *line,
                    text: tokens.join(" "),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(name, n_spins, n_weights, "parsed problem");

        Ok(Self {
            name: name.to_string(),
            n_spins: *n_spins,
            weights,
        })
    }
}

fn parse_weight(tokens: &[&str]) -> Option<Weight> {
    match tokens {
        [i, j, value] => Some(Weight {
            i: parse_count(i)?,
            j: parse_count(j)?,
            value: value.parse().ok()?,
        }),
        _ => None,
    }
}

/// Unsigned decimal made of ASCII digits only, no sign
fn parse_count(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
c a four spin test
c
p test01 4 6

0 0 -1
0 1 1
1 1 -1
1 3 1
1 2 1
2 2 -1
";

    #[test]
    fn test_parse_sample() {
        let problem: Problem = SAMPLE.parse().unwrap();
        assert_eq!(problem.name, "test01");
        assert_eq!(problem.n_spins, 4);
        assert_eq!(problem.weights.len(), 6);
        assert_eq!(
            problem.weights[3],
            Weight {
                i: 1,
                j: 3,
                value: 1
            }
        );
    }

    #[test]
    fn test_adjacency_sorting() {
        let problem: Problem = SAMPLE.parse().unwrap();

        let sorted = problem.adjacency(true);
        assert_eq!(sorted[&1], vec![(1, -1.0), (2, 1.0), (3, 1.0)]);
        assert_eq!(sorted[&0], vec![(0, -1.0), (1, 1.0)]);

        let unsorted = problem.adjacency(false);
        assert_eq!(unsorted[&1], vec![(1, -1.0), (3, 1.0), (2, 1.0)]);
    }

    #[test]
    fn test_extra_whitespace_is_normalized() {
        let problem: Problem = "p  t   1 1\n  0    0   7  \n".parse().unwrap();
        assert_eq!(problem.weights[0].value, 7);
    }

    #[test]
    fn test_problem_after_data() {
        let err = "0 0 1\np t 1 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemAfterData { line: 2 }));
    }

    #[test]
    fn test_problem_line_count() {
        let err = "0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(0)));

        let err = "p t 1 1\np u 1 1\n0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(2)));

        let err = "p t one 1\n0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(0)));

        let err = "p t -1 1\n0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(0)));

        let err = "p t +1 1\n0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(0)));

        let err = "p t 1 +1\n0 0 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::ProblemLine(0)));
    }

    #[test]
    fn test_empty_file() {
        let err = "".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::Empty));

        let err = "c only\nc comments\n\n   \n".parse::<Problem>().unwrap_err();
        assert!(matches!(err, InputError::Empty));
    }

    #[test]
    fn test_weight_count_mismatch() {
        let err = "p t 2 3\n0 0 1\n0 1 1\n".parse::<Problem>().unwrap_err();
        assert!(matches!(
            err,
            InputError::WeightCount {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_bad_weights() {
        for bad in ["0 1 x", "0 1", "0 1 2 3", "-1 0 2", "+1 0 2", "0 1 1.5"] {
            let text = format!("p t 2 1\n{bad}\n");
            let err = text.parse::<Problem>().unwrap_err();
            assert!(
                matches!(err, InputError::BadWeight { line: 2, .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_read_missing_file() {
        let err = Problem::read(Path::new("/nonexistent/problem.txt")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}

//! Templated string generator.
//!
//! A pattern is compiled once into parts, then expanded any number of times
//! against the run RNG. The alphabet:
//!
//! | Token | Meaning |
//! |---|---|
//! | `#` | one digit `0-9` (consecutive `#`s collapse into one group) |
//! | `X` / `x` | one uppercase letter |
//! | `A` | one uppercase alphanumeric |
//! | `H` | one uppercase hex digit |
//! | `{d:N}` `{l:N}` `{a:N}` `{h:N}` | N repeats of a class |
//! | `[a,b,c]` | one of the listed literal alternatives |
//! | `\c` | literal `c` |
//! | other | literal |
//!
//! Sequential mode renders digit groups as zero-padded ascending integers
//! from a caller-supplied base instead of random draws.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{Result, SeedForgeError};

const DIGITS: &[u8] = b"0123456789";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const HEX: &[u8] = b"0123456789ABCDEF";

#[derive(Debug, Clone, PartialEq)]
enum Part {
    /// A run of digit placeholders; the run length doubles as the
    /// zero-padding width in sequential mode.
    Digits(usize),
    Letters(usize),
    Alnum(usize),
    Hex(usize),
    Choice(Vec<String>),
    Literal(String),
}

/// A compiled pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    parts: Vec<Part>,
}

impl Pattern {
    /// Compile a template, validating matched braces/brackets and the
    /// absence of a trailing escape.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |position: usize, message: &str| SeedForgeError::PatternInvalid {
            pattern: source.to_string(),
            position,
            message: message.to_string(),
        };

        let chars: Vec<char> = source.chars().collect();
        let mut parts: Vec<Part> = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        let flush = |literal: &mut String, parts: &mut Vec<Part>| {
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(literal)));
            }
        };

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    if i + 1 >= chars.len() {
                        return Err(invalid(i, "trailing escape"));
                    }
                    literal.push(chars[i + 1]);
                    i += 2;
                }
                '#' => {
                    flush(&mut literal, &mut parts);
                    let mut run = 0;
                    while i < chars.len() && chars[i] == '#' {
                        run += 1;
                        i += 1;
                    }
                    parts.push(Part::Digits(run));
                }
                'X' | 'x' => {
                    flush(&mut literal, &mut parts);
                    parts.push(Part::Letters(1));
                    i += 1;
                }
                'A' => {
                    flush(&mut literal, &mut parts);
                    parts.push(Part::Alnum(1));
                    i += 1;
                }
                'H' => {
                    flush(&mut literal, &mut parts);
                    parts.push(Part::Hex(1));
                    i += 1;
                }
                '{' => {
                    flush(&mut literal, &mut parts);
                    let start = i;
                    let close = chars[i..]
                        .iter()
                        .position(|&c| c == '}')
                        .map(|p| i + p)
                        .ok_or_else(|| invalid(start, "unclosed brace"))?;
                    let body: String = chars[i + 1..close].iter().collect();
                    let (class, count) = body
                        .split_once(':')
                        .ok_or_else(|| invalid(start, "expected {class:count}"))?;
                    let count: usize = count
                        .trim()
                        .parse()
                        .map_err(|_| invalid(start, "repeat count is not a number"))?;
                    let part = match class.trim() {
                        "d" => Part::Digits(count),
                        "l" => Part::Letters(count),
                        "a" => Part::Alnum(count),
                        "h" => Part::Hex(count),
                        other => {
                            return Err(invalid(
                                start,
                                &format!("unknown class '{}' (expected d, l, a, or h)", other),
                            ))
                        }
                    };
                    parts.push(part);
                    i = close + 1;
                }
                '[' => {
                    flush(&mut literal, &mut parts);
                    let start = i;
                    let close = chars[i..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|p| i + p)
                        .ok_or_else(|| invalid(start, "unclosed bracket"))?;
                    let body: String = chars[i + 1..close].iter().collect();
                    let alternatives: Vec<String> =
                        body.split(',').map(|a| a.trim().to_string()).collect();
                    if alternatives.iter().all(|a| a.is_empty()) {
                        return Err(invalid(start, "empty alternative list"));
                    }
                    parts.push(Part::Choice(alternatives));
                    i = close + 1;
                }
                c => {
                    literal.push(c);
                    i += 1;
                }
            }
        }
        flush(&mut literal, &mut parts);

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expand the pattern with random draws.
    pub fn expand(&self, rng: &mut StdRng) -> String {
        self.render(rng, None)
    }

    /// Expand with digit groups rendered as `base`, zero-padded to the group
    /// width (wrapping at the width's capacity). Non-digit classes still
    /// draw from the RNG.
    pub fn expand_sequential(&self, rng: &mut StdRng, base: u64) -> String {
        self.render(rng, Some(base))
    }

    fn render(&self, rng: &mut StdRng, sequential: Option<u64>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Digits(n) => match sequential {
                    Some(base) => {
                        let capacity = 10u64.saturating_pow(*n as u32);
                        out.push_str(&format!("{:0width$}", base % capacity, width = n));
                    }
                    None => push_random(&mut out, rng, DIGITS, *n),
                },
                Part::Letters(n) => push_random(&mut out, rng, LETTERS, *n),
                Part::Alnum(n) => push_random(&mut out, rng, ALNUM, *n),
                Part::Hex(n) => push_random(&mut out, rng, HEX, *n),
                Part::Choice(alternatives) => {
                    out.push_str(&alternatives[rng.random_range(0..alternatives.len())]);
                }
                Part::Literal(s) => out.push_str(s),
            }
        }
        out
    }
}

fn push_random(out: &mut String, rng: &mut StdRng, alphabet: &[u8], count: usize) {
    for _ in 0..count {
        out.push(alphabet[rng.random_range(0..alphabet.len())] as char);
    }
}

//! Rule sets and generation-by-generation rewriting of symbol strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LsysError, Result};

/// Substitution rules keyed by a single symbol.
///
/// A symbol without a rule rewrites to itself. Replacements are never rescanned
/// within the generation that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<char, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `symbol`, returning the previous replacement.
    pub fn insert(&mut self, symbol: char, replacement: impl Into<String>) -> Option<String> {
        self.rules.insert(symbol, replacement.into())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_rule(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.insert(symbol, replacement);
        self
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.rules.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Merges `other` into this set. Rules in `other` win on conflicting symbols.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Parses a comma-separated list of `SYMBOL=REPLACEMENT` pairs.
    ///
    /// Each pair is split at its first `=`, so replacements may themselves
    /// contain `=`. Blank entries are skipped and later entries override
    /// earlier ones.
    pub fn parse(source: &str) -> Result<Self> {
        let mut rules = Self::new();
        for entry in source.split(',') {
            if entry.trim().is_empty() {
                continue;
            }
            let (symbol, replacement) = parse_rule(entry)?;
            rules.insert(symbol, replacement);
        }
        Ok(rules)
    }

    /// Applies one generation: every symbol of `symbols` is substituted exactly once.
    pub fn rewrite(&self, symbols: &str) -> String {
        let mut next = String::with_capacity(self.rewritten_len(symbols));
        for c in symbols.chars() {
            match self.rules.get(&c) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(c),
            }
        }
        next
    }

    /// Number of symbols [`rewrite`](Self::rewrite) would produce, without building it.
    pub fn rewritten_len(&self, symbols: &str) -> usize {
        symbols.chars().fold(0usize, |acc, c| {
            let n = self.rules.get(&c).map_or(1, |r| r.chars().count());
            acc.saturating_add(n)
        })
    }
}

/// Parses a single `SYMBOL=REPLACEMENT` pair.
pub fn parse_rule(entry: &str) -> Result<(char, String)> {
    let malformed = |reason: &str| LsysError::MalformedRule {
        rule: entry.to_string(),
        reason: reason.to_string(),
    };

    let (symbol, replacement) = entry
        .split_once('=')
        .ok_or_else(|| malformed("expected '='"))?;

    let mut chars = symbol.trim().chars();
    let key = chars.next().ok_or_else(|| malformed("missing symbol before '='"))?;
    if chars.next().is_some() {
        return Err(malformed("the symbol must be a single character"));
    }

    Ok((key, replacement.trim().to_string()))
}

impl FromStr for RuleSet {
    type Err = LsysError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (symbol, replacement)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{symbol}={replacement}")?;
        }
        Ok(())
    }
}

/// An axiom together with the rules that rewrite it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LSystem {
    pub axiom: String,
    pub rules: RuleSet,
}

impl LSystem {
    pub fn new(axiom: impl Into<String>, rules: RuleSet) -> Self {
        Self {
            axiom: axiom.into(),
            rules,
        }
    }

    /// Expands the axiom for `generations` generations with no size limit.
    pub fn expand(&self, generations: u32) -> String {
        expand(&self.axiom, &self.rules, generations)
    }

    /// Expands the axiom, failing before any generation grows past `max_symbols`.
    ///
    /// The length of each generation is computed before its string is
    /// allocated, so an oversized request is rejected without building it.
    pub fn expand_bounded(&self, generations: u32, max_symbols: usize) -> Result<String> {
        let mut current = self.axiom.clone();
        let axiom_len = current.chars().count();
        if axiom_len > max_symbols {
            return Err(LsysError::ExpansionTooLarge {
                generation: 0,
                len: axiom_len,
                limit: max_symbols,
            });
        }

        for generation in 1..=generations {
            let len = self.rules.rewritten_len(&current);
            if len > max_symbols {
                return Err(LsysError::ExpansionTooLarge {
                    generation,
                    len,
                    limit: max_symbols,
                });
            }
            current = self.rules.rewrite(&current);
            log::debug!("generation {generation}: {len} symbols");
        }

        Ok(current)
    }
}

/// Rewrites `axiom` for `generations` generations. Zero generations returns the axiom.
pub fn expand(axiom: &str, rules: &RuleSet, generations: u32) -> String {
    let mut current = axiom.to_string();
    for _ in 0..generations {
        current = rules.rewrite(&current);
    }
    current
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde::Deserialize;

use crate::grammar::{Grammar, GrammarError, Lexicon};

#[derive(Embed)]
#[folder = "assets/grammars/"]
struct GrammarAssets;

pub const DEFAULT_GRAMMAR: &str = "english";

/// On-disk shape of a grammar file.
#[derive(Clone, Debug, Deserialize)]
pub struct GrammarFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_start")]
    pub start: String,
    pub productions: Vec<String>,
    #[serde(default)]
    pub samples: Vec<String>,
    #[serde(default)]
    pub lexicon: BTreeMap<String, Vec<String>>,
}

fn default_start() -> String {
    "S".to_string()
}

impl GrammarFile {
    pub fn into_grammar(self) -> Result<Grammar, GrammarError> {
        let rules = self
            .productions
            .iter()
            .map(|rule| parse_production(rule))
            .collect::<Result<Vec<_>, _>>()?;
        let lexicon = Lexicon::from_entries(self.lexicon)?;
        Ok(Grammar::new(&self.start, rules, lexicon)?
            .with_name(&self.name, &self.description)
            .with_samples(self.samples))
    }
}

/// Parses `HEAD -> A B c` (or `→`). An empty body, or a lone `ε`, is an
/// epsilon production.
pub fn parse_production(rule: &str) -> Result<(String, Vec<String>), GrammarError> {
    let malformed = |reason| GrammarError::MalformedProduction {
        rule: rule.to_string(),
        reason,
    };

    let (head, body) = rule
        .split_once("->")
        .or_else(|| rule.split_once('→'))
        .ok_or_else(|| malformed("missing `->`"))?;

    let head = head.trim();
    if head.is_empty() {
        return Err(malformed("empty head"));
    }
    if head.chars().any(char::is_whitespace) {
        return Err(malformed("head must be a single symbol"));
    }

    let body: Vec<String> = body
        .split_whitespace()
        .filter(|s| *s != "ε")
        .map(str::to_string)
        .collect();
    if body.iter().any(|s| s.contains(['.', ',', '→']) || s.contains("->")) {
        return Err(malformed("symbols may not contain `.`, `,` or arrows"));
    }

    Ok((head.to_string(), body))
}

pub fn parse_grammar(content: &str) -> Result<Grammar, GrammarError> {
    let file: GrammarFile = toml::from_str(content)?;
    file.into_grammar()
}

pub fn load_path(path: &Path) -> Result<Grammar, GrammarError> {
    let content = fs::read_to_string(path)?;
    parse_grammar(&content)
}

/// Loads a grammar by name: the user's grammar directory first, then the
/// bundled grammars.
pub fn load(name: &str) -> Result<Grammar, GrammarError> {
    if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir
            .join("earley-drill")
            .join("grammars")
            .join(format!("{name}.toml"));
        if user_path.exists() {
            return load_path(&user_path);
        }
    }

    load_bundled(name)
}

/// Loads one of the grammars embedded in the binary, ignoring user files.
pub fn load_bundled(name: &str) -> Result<Grammar, GrammarError> {
    let filename = format!("{name}.toml");
    let file = GrammarAssets::get(&filename)
        .ok_or_else(|| GrammarError::NotFound(name.to_string()))?;
    let content = String::from_utf8_lossy(file.data.as_ref());
    parse_grammar(&content)
}

/// Loads `name_or_path` as a file when it looks like a path, by name otherwise.
pub fn resolve(name_or_path: &str) -> Result<Grammar, GrammarError> {
    let path = Path::new(name_or_path);
    if name_or_path.ends_with(".toml") || path.components().count() > 1 {
        load_path(path)
    } else {
        load(name_or_path)
    }
}

pub fn bundled_grammars() -> Vec<String> {
    let mut names: Vec<String> = GrammarAssets::iter()
        .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
        .collect();
    names.sort();
    names
}

/// Bundled grammar names plus those in the user's grammar directory.
pub fn available_grammars() -> Vec<String> {
    let mut names = bundled_grammars();
    if let Some(config_dir) = dirs::config_dir() {
        let user_dir = config_dir.join("earley-drill").join("grammars");
        if let Ok(entries) = fs::read_dir(user_dir) {
            for entry in entries.flatten() {
                let file_name = entry.file_name().to_string_lossy().to_string();
                if let Some(name) = file_name.strip_suffix(".toml") {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    names.dedup();
    names
}

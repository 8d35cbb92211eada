/*
 * A deliberately small gitignore-style matcher. Patterns come from the
 * `.gitignore` file at the project root and are evaluated with shell-glob
 * semantics (`*`, `?`, `[...]`) against root-relative, forward-slash paths.
 *
 * Supported forms:
 *   - `name/`  matches directories only, at any depth.
 *   - `/name`  is anchored to the root.
 *   - `name`   matches at any depth.
 * There is no negation and no precedence between rules; any matching rule
 * excludes the path.
 */
use crate::core::path_utils;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::Path;

pub const IGNORE_FILENAME: &str = ".gitignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleScope {
    DirectoriesOnly,
    Anchored,
    AnyDepth,
}

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    scope: RuleScope,
}

impl IgnoreRule {
    fn compile(raw: &str) -> Option<Self> {
        let (body, scope) = if let Some(stripped) = raw.strip_suffix('/') {
            (stripped.trim_end_matches('/'), RuleScope::DirectoriesOnly)
        } else if let Some(stripped) = raw.strip_prefix('/') {
            (stripped.trim_start_matches('/'), RuleScope::Anchored)
        } else {
            (raw, RuleScope::AnyDepth)
        };
        if body.is_empty() {
            return None;
        }
        let pattern = match Pattern::new(body) {
            Ok(pattern) => pattern,
            Err(e) => {
                log::warn!("IgnoreRules: Pattern '{raw}' is not a valid glob ({e}); matching it literally.");
                Pattern::new(&Pattern::escape(body)).ok()?
            }
        };
        Some(IgnoreRule { pattern, scope })
    }

    fn matches(&self, relative: &str, is_dir: bool) -> bool {
        match self.scope {
            RuleScope::Anchored => self.pattern.matches_with(relative, MATCH_OPTIONS),
            RuleScope::DirectoriesOnly => is_dir && self.matches_any_suffix(relative),
            RuleScope::AnyDepth => self.matches_any_suffix(relative),
        }
    }

    // Tries the full path, then every tail that starts after a `/`.
    fn matches_any_suffix(&self, relative: &str) -> bool {
        if self.pattern.matches_with(relative, MATCH_OPTIONS) {
            return true;
        }
        relative
            .match_indices('/')
            .any(|(idx, _)| self.pattern.matches_with(&relative[idx + 1..], MATCH_OPTIONS))
    }
}

/*
 * The rules loaded for one session. `patterns` keeps the raw lines in file
 * order; the compiled form is what `is_ignored` evaluates.
 */
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = IgnoreRuleSet::default();
        for line in patterns {
            let trimmed = line.as_ref().trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            set.patterns.push(trimmed.to_string());
            if let Some(rule) = IgnoreRule::compile(trimmed) {
                set.rules.push(rule);
            }
        }
        set
    }

    /*
     * Reads `<root>/.gitignore`. A missing or unreadable file yields an empty
     * rule set; this is never an error for the caller.
     */
    pub fn load(root: &Path) -> Self {
        let ignore_path = root.join(IGNORE_FILENAME);
        if !ignore_path.is_file() {
            log::debug!("IgnoreRules: No ignore file at {ignore_path:?}.");
            return IgnoreRuleSet::default();
        }
        match fs::read_to_string(&ignore_path) {
            Ok(contents) => {
                let set = IgnoreRuleSet::from_patterns(contents.lines());
                log::debug!(
                    "IgnoreRules: Loaded {} patterns from {ignore_path:?}.",
                    set.patterns.len()
                );
                set
            }
            Err(e) => {
                log::warn!("IgnoreRules: Could not read {ignore_path:?}: {e}. Using no rules.");
                IgnoreRuleSet::default()
            }
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /*
     * Decides whether `path` (absolute, or at least prefixed by `root`) is
     * excluded. Paths outside the root are never ignored. Directory-only rules
     * consult the file system to learn whether `path` is a directory.
     */
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let Some(relative) = path_utils::to_relative_posix(path, root) else {
            return false;
        };
        self.is_relative_ignored(&relative, path.is_dir())
    }

    /*
     * Same as `is_ignored`, for callers that already hold the relative path and
     * the entry kind (the directory walk does).
     */
    pub fn is_relative_ignored(&self, relative: &str, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| rule.matches(relative, is_dir))
    }
}

//! Topic inclusion filter
//!
//! Pure allow/deny matching over pre-compiled regexes. Patterns are
//! anchored to the full topic name and case-sensitive; compiling them is
//! the only fallible step, so a bad pattern is a configuration error and
//! filtering itself can never fail mid-run.

use crate::streamlens::error::{SourceError, SourceResult};
use regex::Regex;

/// Compiled topic inclusion rules
#[derive(Debug)]
pub struct TopicFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl TopicFilter {
    /// Compile allow/deny pattern sets. An empty allow set matches every
    /// topic.
    pub fn new(allow: &[String], deny: &[String]) -> SourceResult<Self> {
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    /// A topic is included iff it matches at least one allow pattern and
    /// no deny pattern.
    pub fn is_included(&self, topic: &str) -> bool {
        let allowed = self.allow.is_empty() || self.allow.iter().any(|re| re.is_match(topic));
        allowed && !self.deny.iter().any(|re| re.is_match(topic))
    }
}

fn compile(patterns: &[String]) -> SourceResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                SourceError::config(format!("invalid topic pattern {:?}: {}", pattern, e))
            })
        })
        .collect()
}

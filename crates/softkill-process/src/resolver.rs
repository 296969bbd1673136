//! Turning operator tokens into target processes

use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::{ProcessError, Result},
    platform::{ProcessPlatform, ProcessRef},
};

/// How positional targets are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Every live process with a matching name
    #[default]
    Name,
    /// Exactly one process per numeric id
    Pid,
}

/// Deduplicated, immutable set of processes selected for shutdown
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    processes: Vec<ProcessRef>,
}

impl TargetSet {
    /// Build a set, dropping repeated pids (first occurrence wins)
    pub fn new(processes: impl IntoIterator<Item = ProcessRef>) -> Self {
        let mut seen = HashSet::new();
        let processes = processes
            .into_iter()
            .filter(|p| seen.insert(p.pid()))
            .collect();
        Self { processes }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRef> {
        self.processes.iter()
    }

    pub fn contains_pid(&self, pid: u32) -> bool {
        self.processes.iter().any(|p| p.pid() == pid)
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a ProcessRef;
    type IntoIter = std::slice::Iter<'a, ProcessRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.processes.iter()
    }
}

/// Resolves tokens against the process table
pub struct ProcessResolver<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P: ProcessPlatform + ?Sized> ProcessResolver<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Resolve `tokens` into a non-empty [`TargetSet`].
    ///
    /// By id, every token must parse and name an existing process; all ids
    /// are checked before anything is returned. By name, unmatched tokens
    /// are tolerated as long as something matched overall.
    pub fn resolve(&self, tokens: &[String], mode: LookupMode) -> Result<TargetSet> {
        let processes = match mode {
            LookupMode::Name => self.by_name(tokens)?,
            LookupMode::Pid => self.by_pid(tokens)?,
        };

        let targets = TargetSet::new(processes);
        if targets.is_empty() {
            return Err(ProcessError::NoTargets);
        }

        debug!(count = targets.len(), ?mode, "Resolved targets");
        Ok(targets)
    }

    fn by_name(&self, tokens: &[String]) -> Result<Vec<ProcessRef>> {
        let mut found = Vec::new();
        for name in tokens {
            let matches = self.platform.processes_by_name(name)?;
            if matches.is_empty() {
                debug!(name = %name, "No process matches name");
            }
            found.extend(matches);
        }
        Ok(found)
    }

    fn by_pid(&self, tokens: &[String]) -> Result<Vec<ProcessRef>> {
        let pids = tokens
            .iter()
            .map(|token| parse_pid(token))
            .collect::<Result<Vec<_>>>()?;

        pids.into_iter()
            .map(|pid| {
                self.platform
                    .process_by_id(pid)?
                    .ok_or(ProcessError::NotFound { pid })
            })
            .collect()
    }
}

fn parse_pid(token: &str) -> Result<u32> {
    token
        .trim()
        .parse::<u32>()
        .map_err(|_| ProcessError::invalid_argument(format!("'{}' is not a valid process id", token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, MockProcess};

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn platform() -> MockPlatform {
        MockPlatform::new()
            .with(MockProcess::new(10, "chrome"))
            .with(MockProcess::new(11, "chrome"))
            .with(MockProcess::new(20, "vim"))
    }

    #[test]
    fn test_name_expands_to_all_matches() {
        let platform = platform();
        let targets = ProcessResolver::new(&platform)
            .resolve(&tokens(&["chrome"]), LookupMode::Name)
            .unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains_pid(10));
        assert!(targets.contains_pid(11));
    }

    #[test]
    fn test_unmatched_name_tolerated_when_others_match() {
        let platform = platform();
        let targets = ProcessResolver::new(&platform)
            .resolve(&tokens(&["missing", "vim"]), LookupMode::Name)
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets.contains_pid(20));
    }

    #[test]
    fn test_repeated_tokens_are_deduplicated() {
        let platform = platform();
        let targets = ProcessResolver::new(&platform)
            .resolve(&tokens(&["vim", "vim", "chrome"]), LookupMode::Name)
            .unwrap();
        assert_eq!(targets.len(), 3);

        let targets = ProcessResolver::new(&platform)
            .resolve(&tokens(&["20", "20"]), LookupMode::Pid)
            .unwrap();
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_no_matches_is_no_targets() {
        let platform = platform();
        let err = ProcessResolver::new(&platform)
            .resolve(&tokens(&["missing"]), LookupMode::Name)
            .unwrap_err();
        assert!(matches!(err, ProcessError::NoTargets));
    }

    #[test]
    fn test_pid_lookup() {
        let platform = platform();
        let targets = ProcessResolver::new(&platform)
            .resolve(&tokens(&["10", "20"]), LookupMode::Pid)
            .unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_unknown_pid_is_fatal() {
        let platform = platform();
        let err = ProcessResolver::new(&platform)
            .resolve(&tokens(&["10", "99"]), LookupMode::Pid)
            .unwrap_err();
        assert!(matches!(err, ProcessError::NotFound { pid: 99 }));
    }

    #[test]
    fn test_bad_pid_token_is_invalid_argument() {
        let platform = platform();
        let err = ProcessResolver::new(&platform)
            .resolve(&tokens(&["10", "chrome"]), LookupMode::Pid)
            .unwrap_err();
        assert!(err.is_argument_error());
    }
}

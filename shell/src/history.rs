// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::path::Path;

use log::{debug, warn};
use rustyline::history::{DefaultHistory, History};
use rustyline::{Editor, Helper};

/// Commands never written to the history file.
pub const IGNORED_COMMANDS: &[&str] = &["login"];

/// Whether a history line must not be persisted.
pub fn is_ignored(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|cmd| IGNORED_COMMANDS.contains(&cmd))
}

/// Lines of `lines` that may be persisted.
pub fn scrub<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !is_ignored(line))
        .map(str::to_string)
        .collect()
}

/// Load the history file if there is one.
pub fn load<H: Helper>(editor: &mut Editor<H, DefaultHistory>, path: &Path) {
    match editor.load_history(path) {
        Ok(()) => debug!("loaded history from {}", path.display()),
        Err(err) => debug!("no history loaded from {}: {err}", path.display()),
    }
}

/// Write the scrubbed history to `path`.
pub fn save<H: Helper>(editor: &mut Editor<H, DefaultHistory>, path: &Path) -> rustyline::Result<()> {
    let kept = scrub(editor.history().iter().map(String::as_str));
    let dropped = editor.history().len() - kept.len();

    editor.clear_history()?;
    for line in &kept {
        editor.add_history_entry(line.as_str())?;
    }
    editor.save_history(path)?;

    if dropped > 0 {
        debug!("dropped {dropped} history lines carrying credentials");
    }
    Ok(())
}

/// Save the history, logging instead of failing.
pub fn save_or_warn<H: Helper>(editor: &mut Editor<H, DefaultHistory>, path: &Path) {
    if let Err(err) = save(editor, path) {
        warn!("failed to save history to {}: {err}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scrub_drops_login_lines() {
        let lines = [
            "status",
            "login key=abc secret=s3cret",
            "  login key=abc",
            "nodes query=\"login\"",
            "logout",
        ];

        assert_eq!(vec!["status", "nodes query=\"login\"", "logout"], scrub(lines));
    }

    #[test]
    fn test_save_scrubs_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(".cloudkick_history");

        let mut editor = Editor::<(), DefaultHistory>::new()?;
        editor.add_history_entry("tags")?;
        editor.add_history_entry("login key=abc secret=s3cret")?;
        editor.add_history_entry("status")?;
        save(&mut editor, &path)?;

        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("tags"));
        assert!(content.contains("status"));
        assert!(!content.contains("s3cret"));

        let mut reloaded = Editor::<(), DefaultHistory>::new()?;
        load(&mut reloaded, &path);
        assert_eq!(2, reloaded.history().len());
        Ok(())
    }
}

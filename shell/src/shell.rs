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

use std::io::Write;
use std::path::PathBuf;

use cloudkick_api::Client;
use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Editor, Helper};

use crate::args::parse_arguments;
use crate::command::{self, CmdError, CommandTable};
use crate::history;

const PROMPT: &str = "> ";

const BANNER: &str = "Welcome to the Cloudkick API shell!\n\n\
Type \"commands\" for a list all the available commands \
and \"help <command>\" to see help for the specified command";

/// Commands every shell has, besides one per api call.
pub const FIXED_COMMANDS: &[&str] = &[
    "commands", "help", "history", "login", "logout", "q", "quit", "status",
];

/// Whether the loop goes on after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the shell.
    Quit,
}

/// Shell state, independent of the terminal.
///
/// `session` is the authenticated client; `None` means unauthenticated.
#[derive(Debug)]
pub struct Shell {
    base: Client,
    session: Option<Client>,
    commands: CommandTable,
    save_history: bool,
}

impl Shell {
    /// Create an unauthenticated shell over `base`.
    pub fn new(base: Client) -> Self {
        let commands = CommandTable::from_registry(base.registry());
        Self {
            base,
            session: None,
            commands,
            save_history: true,
        }
    }

    /// Authenticate with whatever credentials `base` can resolve.
    pub async fn auto_login(&mut self) {
        match self.base.credential().await {
            Ok(_) => self.session = Some(self.base.clone()),
            Err(err) => debug!("starting unauthenticated: {err}"),
        }
    }

    /// Whether a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether history should be written on exit.
    pub fn saves_history(&self) -> bool {
        self.save_history
    }

    /// Every command name, fixed ones first.
    pub fn command_names(&self) -> Vec<String> {
        FIXED_COMMANDS
            .iter()
            .copied()
            .chain(self.commands.names())
            .map(str::to_string)
            .collect()
    }

    /// Run one input line, writing everything it prints to `out`.
    pub async fn execute(&mut self, line: &str, out: &mut impl Write) -> std::io::Result<Flow> {
        let line = line.trim();
        let (cmd, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match cmd {
            "" => {}
            "quit" | "q" => return Ok(Flow::Quit),
            "status" => self.status(out).await?,
            "history" => self.history(rest, out)?,
            "login" => self.login(rest, out)?,
            "logout" => {
                if self.session.take().is_some() {
                    writeln!(out, "Done.")?;
                } else {
                    writeln!(out, "You are not authenticated.")?;
                }
            }
            "commands" => self.list_commands(out)?,
            "help" => self.help(rest, out)?,
            name => match self.commands.get(name) {
                Some(call) => {
                    let result = command::run(call, self.session.as_ref(), rest).await;
                    match result {
                        Ok(resp) => writeln!(out, "{resp}")?,
                        Err(err) => self.report(err, out)?,
                    }
                }
                None => writeln!(out, "*** Unknown syntax: {line}")?,
            },
        }

        Ok(Flow::Continue)
    }

    fn report(&mut self, err: CmdError, out: &mut impl Write) -> std::io::Result<()> {
        match err {
            CmdError::Api(err) if err.is_auth_failure() => {
                debug!("forcing logout after: {err}");
                self.session = None;
                writeln!(
                    out,
                    "Error: You have provided invalid credentials, please login again."
                )
            }
            err => writeln!(out, "Error: {err}"),
        }
    }

    async fn status(&self, out: &mut impl Write) -> std::io::Result<()> {
        let login = match &self.session {
            None => "not authenticated".to_string(),
            Some(client) => match client.credential().await {
                Ok(cred) => format!("authenticated using the following key: {}.", cred.key),
                Err(err) => format!("authenticated, but credentials are unusable: {err}"),
            },
        };

        writeln!(
            out,
            "History save to a file status: {}",
            if self.save_history { "enabled" } else { "disabled" }
        )?;
        writeln!(out, "Login status: {login}")
    }

    fn history(&mut self, arg: &str, out: &mut impl Write) -> std::io::Result<()> {
        let enable = match arg {
            "on" | "enable" => true,
            "off" | "disable" => false,
            "" => return writeln!(out, "Missing argument."),
            other => return writeln!(out, "Invalid argument: {other}"),
        };

        if self.save_history == enable {
            let state = if enable { "enabled" } else { "disabled" };
            writeln!(out, "History save is already {state}.")
        } else {
            self.save_history = enable;
            writeln!(out, "Done.")
        }
    }

    fn login(&mut self, rest: &str, out: &mut impl Write) -> std::io::Result<()> {
        if self.session.is_some() {
            return writeln!(
                out,
                "You are already authenticated.\n\
                 If you want to change the account first type logout and then login."
            );
        }

        let args = match parse_arguments(rest) {
            Ok(args) => args,
            Err(err) => return writeln!(out, "Error: {err}"),
        };
        let (Some(key), Some(secret)) = (args.get("key"), args.get("secret")) else {
            let missing: Vec<_> = ["key", "secret"]
                .into_iter()
                .filter(|k| !args.contains(k))
                .collect();
            return writeln!(
                out,
                "Error: Missing required argument(s): {}",
                missing.join(", ")
            );
        };

        self.session = Some(self.base.clone().with_credential(key, secret));
        writeln!(out, "Done.")
    }

    fn list_commands(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "Available commands:\n")?;
        for name in self.command_names() {
            writeln!(out, "  {name}")?;
        }
        Ok(())
    }

    fn help(&self, topic: &str, out: &mut impl Write) -> std::io::Result<()> {
        let text = match topic {
            "" | "commands" => return self.list_commands(out),
            "status" => "Shows the login and history save status.".to_string(),
            "history" => {
                "Enable or disable saving of history to a file.\n\nUsage: history on|off".to_string()
            }
            "login" => "Description: Logs you in using the provided credentials.\n\
                        Arguments:\n\nkey - oauth key\nsecret - oauth secret"
                .to_string(),
            "logout" => "Logs you out.".to_string(),
            "help" => "Shows help for a command.\n\nUsage: help <command>".to_string(),
            "quit" | "q" => "Quits the application".to_string(),
            name => match self.commands.get(name) {
                Some(call) => command::help_text(call),
                None => format!("*** No help on {name}"),
            },
        };
        writeln!(out, "{text}")
    }
}

/// Completes command names for the first word and for `help <command>`.
struct CommandHelper {
    names: Vec<String>,
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let start = head.rfind(' ').map_or(0, |i| i + 1);
        let words: Vec<&str> = head.split_whitespace().collect();

        let completes_command = start == 0 || (words.first() == Some(&"help") && words.len() <= 2);
        if !completes_command {
            return Ok((pos, vec![]));
        }

        let prefix = &head[start..];
        let matches = self
            .names
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

/// Interactive loop over a [`Shell`].
pub struct Repl {
    shell: Shell,
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Set up the terminal and load the history file.
    pub fn new(shell: Shell, history_path: Option<PathBuf>) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandHelper {
            names: shell.command_names(),
        }));
        if let Some(path) = &history_path {
            history::load(&mut editor, path);
        }

        Ok(Self {
            shell,
            editor,
            history_path,
        })
    }

    /// Read and run lines until quit or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout();
        println!("{BANNER}");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.as_str())?;
                    }
                    let flow = self.shell.execute(&line, &mut stdout).await?;
                    stdout.flush()?;
                    if flow == Flow::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    warn!("failed to read line: {err}");
                    break;
                }
            }
        }

        if let (true, Some(path)) = (self.shell.saves_history(), &self.history_path) {
            history::save_or_warn(&mut self.editor, path);
        }
        Ok(())
    }
}

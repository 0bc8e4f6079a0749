//! Interactive command shell on top of [`TreeFS`].
//!
//! A line is parsed into a [`Command`], dispatched to the [`FsBackend`] operations and the
//! reply is printed. Failures are printed as `Error: ...` and never end the loop.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::core::{FsBackend, FsError, Result};
use crate::session;
use crate::vfs::TreeFS;

const HELP: &str = "\
commands:
  mkdir <path>                     create a directory and its parents
  ls [path]                        list a directory
  cd [path]                        change the current directory (default: /)
  pwd                              print the current directory
  touch <path>                     create or truncate a file
  echo <text> [> | >>] <path>      write or append text to a file
  echo \"<text>\"                    print text
  cat <path>                       print a file
  rm <path>                        remove a file or a directory tree
  cp <source> <dest>               copy a file or a directory tree
  mv <source> <dest>               move a file or a directory tree
  grep <pattern> <path>            print regex matches found in a file
  save <file>                      save the session to a host file
  load <file>                      replace the session with a host file
  help                             show this text
  exit                             leave the shell";

/// `> path` or `>> path` after `echo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub append: bool,
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Ls(Option<String>),
    Cd(Option<String>),
    Pwd,
    Touch(String),
    Echo {
        content: String,
        redirect: Option<Redirect>,
    },
    Cat(String),
    Rm(String),
    Cp { source: String, dest: String },
    Mv { source: String, dest: String },
    Grep { pattern: String, path: String },
    Save(String),
    Load(String),
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        if verb == "echo" {
            return parse_echo(rest).map(Some);
        }

        let args = split_args(rest)?;
        let command = match verb {
            "mkdir" => {
                let [path] = expect_args::<1>(args, "mkdir <path>")?;
                Command::Mkdir(path)
            }
            "ls" => Command::Ls(optional_arg(args, "ls [path]")?),
            "cd" => Command::Cd(optional_arg(args, "cd [path]")?),
            "pwd" => {
                let [] = expect_args::<0>(args, "pwd")?;
                Command::Pwd
            }
            "touch" => {
                let [path] = expect_args::<1>(args, "touch <path>")?;
                Command::Touch(path)
            }
            "cat" => {
                let [path] = expect_args::<1>(args, "cat <path>")?;
                Command::Cat(path)
            }
            "rm" => {
                let [path] = expect_args::<1>(args, "rm <path>")?;
                Command::Rm(path)
            }
            "cp" => {
                let [source, dest] = expect_args::<2>(args, "cp <source> <dest>")?;
                Command::Cp { source, dest }
            }
            "mv" => {
                let [source, dest] = expect_args::<2>(args, "mv <source> <dest>")?;
                Command::Mv { source, dest }
            }
            "grep" => {
                let [pattern, path] = expect_args::<2>(args, "grep <pattern> <path>")?;
                Command::Grep { pattern, path }
            }
            "save" => {
                let [file] = expect_args::<1>(args, "save <file>")?;
                Command::Save(file)
            }
            "load" => {
                let [file] = expect_args::<1>(args, "load <file>")?;
                Command::Load(file)
            }
            "help" => Command::Help,
            verb if verb.eq_ignore_ascii_case("exit") => Command::Exit,
            verb => {
                return Err(FsError::invalid_argument(format!(
                    "{verb}: command not implemented"
                )));
            }
        };
        Ok(Some(command))
    }
}

fn expect_args<const N: usize>(args: Vec<String>, usage: &str) -> Result<[String; N]> {
    <[String; N]>::try_from(args).map_err(|_| FsError::invalid_argument(format!("usage: {usage}")))
}

fn optional_arg(mut args: Vec<String>, usage: &str) -> Result<Option<String>> {
    if args.len() > 1 {
        return Err(FsError::invalid_argument(format!("usage: {usage}")));
    }
    Ok(args.pop())
}

/// Splits on whitespace, keeping single- or double-quoted runs together (quotes removed).
fn split_args(input: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(FsError::invalid_argument(format!("unterminated quote {q}")));
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

/// Byte offset and length of the first `>` or `>>` outside quotes.
fn find_redirect(input: &str) -> Option<(usize, usize)> {
    let mut quote: Option<char> = None;
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => {
                let len = if matches!(chars.peek(), Some((_, '>'))) { 2 } else { 1 };
                return Some((idx, len));
            }
            None => {}
        }
    }
    None
}

fn unquote(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first @ ('"' | '\'')), Some(last)) if first == last => {
            Some(&text[1..text.len() - 1])
        }
        _ => None,
    }
}

fn parse_echo(rest: &str) -> Result<Command> {
    let (body, redirect) = match find_redirect(rest) {
        Some((idx, len)) => {
            let [path] = expect_args::<1>(split_args(&rest[idx + len..])?, "echo <text> > <path>")?;
            let redirect = Redirect {
                path,
                append: len == 2,
            };
            (rest[..idx].trim(), Some(redirect))
        }
        None => (rest.trim(), None),
    };

    let content = match (unquote(body), &redirect) {
        (Some(content), _) => content.to_string(),
        (None, Some(_)) => body.to_string(),
        (None, None) => {
            return Err(FsError::invalid_argument(
                "echo: expected quoted text or a > / >> redirection",
            ));
        }
    };
    Ok(Command::Echo { content, redirect })
}

/// What the shell should do after a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The interactive shell: one namespace and the loop driving it.
pub struct Shell {
    vfs: TreeFS,
}

impl Shell {
    pub fn new(vfs: TreeFS) -> Self {
        Self { vfs }
    }

    pub fn vfs(&self) -> &TreeFS {
        &self.vfs
    }

    pub fn prompt(&self) -> String {
        format!("${}> ", self.vfs.pwd())
    }

    /// Runs one command and returns the lines to print.
    pub fn execute(&mut self, command: Command) -> anyhow::Result<(Flow, Vec<String>)> {
        debug!(?command, "dispatch");
        let lines = match command {
            Command::Mkdir(path) => {
                self.vfs.mkdir(&path)?;
                vec![]
            }
            Command::Ls(path) => self.vfs.ls(path.as_deref().unwrap_or(""))?,
            Command::Cd(path) => {
                self.vfs.cd(path.as_deref().unwrap_or("~"))?;
                vec![]
            }
            Command::Pwd => vec![self.vfs.pwd().to_string()],
            Command::Touch(path) => {
                self.vfs.touch(&path)?;
                vec![]
            }
            Command::Echo { content, redirect } => match redirect {
                Some(Redirect { path, append }) => {
                    self.vfs.write(&path, &content, append)?;
                    vec![]
                }
                None => vec![content],
            },
            Command::Cat(path) => {
                let content = self.vfs.read(&path)?;
                if content.is_empty() {
                    vec![format!("{path}: file is empty")]
                } else {
                    vec![content]
                }
            }
            Command::Rm(path) => {
                self.vfs.rm(&path)?;
                vec![]
            }
            Command::Cp { source, dest } => {
                self.vfs.cp(&source, &dest)?;
                vec![]
            }
            Command::Mv { source, dest } => {
                self.vfs.mv(&source, &dest)?;
                vec![]
            }
            Command::Grep { pattern, path } => {
                let matches = self.vfs.grep(&pattern, &path)?;
                if matches.is_empty() {
                    vec!["no matches found".to_string()]
                } else {
                    matches
                }
            }
            Command::Save(file) => {
                session::save(&self.vfs, &file)?;
                vec![format!("session saved to {file}")]
            }
            Command::Load(file) => {
                self.vfs = session::load(&file)?;
                vec![format!("session loaded from {file}")]
            }
            Command::Help => vec![HELP.to_string()],
            Command::Exit => return Ok((Flow::Exit, vec![])),
        };
        Ok((Flow::Continue, lines))
    }

    /// Parses and runs one input line, printing its output or its error to `out`.
    ///
    /// Only failures to write to `out` are returned as errors.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<Flow> {
        let result = Command::parse(line)
            .map_err(anyhow::Error::from)
            .and_then(|command| match command {
                Some(command) => self.execute(command),
                None => Ok((Flow::Continue, vec![])),
            });

        match result {
            Ok((flow, lines)) => {
                for line in lines {
                    writeln!(out, "{line}")?;
                }
                Ok(flow)
            }
            Err(err) => {
                writeln!(out, "Error: {err:#}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Reads commands from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            if self.execute_line(&line, out)? == Flow::Exit {
                break;
            }
        }
        writeln!(out, "Exiting...")?;
        Ok(())
    }
}

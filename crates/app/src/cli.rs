//! Command-line parsing.

use std::path::PathBuf;

/// Usage text printed on `help` or a parse error.
pub const USAGE: &str = "\
Usage: parcel [COMMAND]

Commands:
  tree                          Show open collections (default)
  open [PATH]                   Open a folder as a collection (dialog if no PATH)
  close <ID>                    Close a collection
  select <ID>                   Select a collection for context
  new-folder <PARENT> <NAME>    Create a folder
  new-request <PARENT> <NAME>   Create a request file
  rename <PATH> <NAME>          Rename a file or folder in place
  delete <PATH> [--yes]         Delete a file or folder
  send <FILE>                   Send a request file and print the response
  autosave <on|off>             Save after every successful send
  help                          Show this text";

/// One invocation of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every open collection.
    Tree,
    /// Open a folder, asking for one when `None`.
    Open(Option<PathBuf>),
    /// Close by id.
    Close(String),
    /// Select by id.
    Select(String),
    /// Create a folder under `parent`.
    NewFolder {
        /// Parent directory.
        parent: PathBuf,
        /// Folder name.
        name: String,
    },
    /// Create a request file under `parent`.
    NewRequest {
        /// Parent directory.
        parent: PathBuf,
        /// Base name; the extension is added.
        name: String,
    },
    /// Rename a node.
    Rename {
        /// Node to rename.
        path: PathBuf,
        /// New base name.
        name: String,
    },
    /// Delete a node; non-empty folders need `confirmed`.
    Delete {
        /// Node to delete.
        path: PathBuf,
        /// `--yes` was given.
        confirmed: bool,
    },
    /// Send a request file.
    Send(PathBuf),
    /// Toggle autosave.
    Autosave(bool),
    /// Print usage.
    Help,
}

/// Error type for argument parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    /// Unknown command word.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("{command}: missing {argument}")]
    MissingArgument {
        /// Command being parsed.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// Extra or malformed argument.
    #[error("{command}: unexpected argument {value:?}")]
    UnexpectedArgument {
        /// Command being parsed.
        command: &'static str,
        /// Offending value.
        value: String,
    },
}

struct Args<I> {
    command: &'static str,
    rest: I,
}

impl<I: Iterator<Item = String>> Args<I> {
    fn required(&mut self, argument: &'static str) -> Result<String, CliError> {
        self.rest.next().ok_or(CliError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn finish(mut self) -> Result<(), CliError> {
        match self.rest.next() {
            Some(value) => Err(CliError::UnexpectedArgument {
                command: self.command,
                value,
            }),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parses the arguments after the program name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands and missing or extra arguments.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut args = args.into_iter();
        let Some(word) = args.next() else {
            return Ok(Self::Tree);
        };

        let command = match word.as_str() {
            "tree" => "tree",
            "help" | "--help" | "-h" => "help",
            "open" => "open",
            "close" => "close",
            "select" => "select",
            "new-folder" => "new-folder",
            "new-request" => "new-request",
            "rename" => "rename",
            "delete" => "delete",
            "send" => "send",
            "autosave" => "autosave",
            _ => return Err(CliError::UnknownCommand(word)),
        };
        let mut args = Args {
            command,
            rest: args,
        };

        let parsed = match command {
            "tree" => Self::Tree,
            "help" => Self::Help,
            "open" => Self::Open(args.rest.next().map(PathBuf::from)),
            "close" => Self::Close(args.required("ID")?),
            "select" => Self::Select(args.required("ID")?),
            "new-folder" => Self::NewFolder {
                parent: args.required("PARENT")?.into(),
                name: args.required("NAME")?,
            },
            "new-request" => Self::NewRequest {
                parent: args.required("PARENT")?.into(),
                name: args.required("NAME")?,
            },
            "rename" => Self::Rename {
                path: args.required("PATH")?.into(),
                name: args.required("NAME")?,
            },
            "delete" => Self::parse_delete(&mut args)?,
            "send" => Self::Send(args.required("FILE")?.into()),
            _ => match args.required("on|off")?.as_str() {
                "on" => Self::Autosave(true),
                "off" => Self::Autosave(false),
                other => {
                    return Err(CliError::UnexpectedArgument {
                        command,
                        value: other.to_string(),
                    });
                }
            },
        };
        args.finish()?;
        Ok(parsed)
    }

    fn parse_delete<I: Iterator<Item = String>>(args: &mut Args<I>) -> Result<Self, CliError> {
        let mut path = None;
        let mut confirmed = false;
        for value in args.rest.by_ref() {
            match value.as_str() {
                "--yes" | "-y" => confirmed = true,
                _ if path.is_none() => path = Some(PathBuf::from(value)),
                _ => {
                    return Err(CliError::UnexpectedArgument {
                        command: "delete",
                        value,
                    });
                }
            }
        }
        let path = path.ok_or(CliError::MissingArgument {
            command: "delete",
            argument: "PATH",
        })?;
        Ok(Self::Delete { path, confirmed })
    }
}

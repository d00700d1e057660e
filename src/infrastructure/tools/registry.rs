//! # Tool Registry
//!
//! The fixed catalog of file tools and the dispatcher that maps a tool name onto
//! its handler. The catalog is built once and never mutated, so the registry can be
//! shared across server sessions behind an `Arc` without locking.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::traits::ToolGateway;
use crate::domain::types::{
    Arguments, ParamSpec, ParamType, ToolCallRequest, ToolCallResult, ToolDescriptor,
};
use crate::infrastructure::tools::file_ops::FileOps;
use crate::strings::tools as out;

/// The closed set of tools this gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Read,
    Write,
    Append,
    Delete,
    List,
    Mkdir,
    Move,
    Info,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Append,
        ToolKind::Delete,
        ToolKind::List,
        ToolKind::Mkdir,
        ToolKind::Move,
        ToolKind::Info,
    ];

    /// Name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Read => "read_file",
            ToolKind::Write => "write_file",
            ToolKind::Append => "append_file",
            ToolKind::Delete => "delete_file",
            ToolKind::List => "list_directory",
            ToolKind::Mkdir => "create_directory",
            ToolKind::Move => "move_file",
            ToolKind::Info => "get_file_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            ToolKind::Read => "Read contents of a file within the workspace.",
            ToolKind::Write => {
                "Create or overwrite a file with content. Parent directories are created as needed."
            }
            ToolKind::Append => "Append content to an existing file.",
            ToolKind::Delete => "Delete a file.",
            ToolKind::List => {
                "List files and directories. Directories come first, then files, sorted by name."
            }
            ToolKind::Mkdir => "Create a new directory.",
            ToolKind::Move => "Move or rename a file.",
            ToolKind::Info => {
                "Get detailed information about a file: size, timestamps, type and permissions."
            }
        }
    }

    fn params(&self) -> Vec<ParamSpec> {
        use ParamType::{Boolean, String as Text};
        let path = || ParamSpec::required("path", Text, "Relative path within the workspace");
        match self {
            ToolKind::Read | ToolKind::Delete | ToolKind::Info => vec![path()],
            ToolKind::Write => vec![
                path(),
                ParamSpec::required("content", Text, "Content to write to the file"),
            ],
            ToolKind::Append => vec![
                path(),
                ParamSpec::required("content", Text, "Content to append"),
            ],
            ToolKind::List => vec![
                ParamSpec::optional("path", Text, "Relative path to the directory (default: .)"),
                ParamSpec::optional("pattern", Text, "Optional glob pattern, e.g. *.txt"),
            ],
            ToolKind::Mkdir => vec![
                path(),
                ParamSpec::optional("parents", Boolean, "Create missing parent directories (default: true)"),
            ],
            ToolKind::Move => vec![
                ParamSpec::required("source", Text, "Current file path"),
                ParamSpec::required("destination", Text, "New file path"),
            ],
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            params: self.params(),
        }
    }
}

/// Catalog plus dispatcher over one workspace.
#[derive(Debug)]
pub struct ToolRegistry {
    ops: FileOps,
    catalog: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(ops: FileOps) -> Self {
        Self {
            ops,
            catalog: ToolKind::ALL.iter().map(ToolKind::descriptor).collect(),
        }
    }

    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Look up `name`, check its parameters and run the handler.
    pub async fn dispatch(&self, name: &str, arguments: &Arguments) -> ToolCallResult {
        let Some(kind) = ToolKind::from_name(name) else {
            tracing::warn!(tool = name, "unknown tool requested");
            return ToolCallResult::Failure(out::unknown_tool(name));
        };

        if let Err(message) = self.check_arguments(kind, arguments) {
            return ToolCallResult::Failure(message);
        }

        tracing::debug!(tool = name, ?arguments, "dispatching tool");
        let outcome = match kind {
            ToolKind::Read => self.ops.read(str_arg(arguments, "path")).await,
            ToolKind::Write => {
                self.ops
                    .write(str_arg(arguments, "path"), str_arg(arguments, "content"))
                    .await
            }
            ToolKind::Append => {
                self.ops
                    .append(str_arg(arguments, "path"), str_arg(arguments, "content"))
                    .await
            }
            ToolKind::Delete => self.ops.delete(str_arg(arguments, "path")).await,
            ToolKind::List => {
                let path = opt_str_arg(arguments, "path").unwrap_or(".");
                self.ops.list(path, opt_str_arg(arguments, "pattern")).await
            }
            ToolKind::Mkdir => {
                let parents = arguments
                    .get("parents")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                self.ops.mkdir(str_arg(arguments, "path"), parents).await
            }
            ToolKind::Move => {
                self.ops
                    .relocate(str_arg(arguments, "source"), str_arg(arguments, "destination"))
                    .await
            }
            ToolKind::Info => self.ops.info(str_arg(arguments, "path")).await,
        };

        match outcome {
            Ok(text) => ToolCallResult::Success(text),
            Err(err) => {
                tracing::info!(tool = name, error = %err, "tool failed");
                ToolCallResult::Failure(out::failure(&err))
            }
        }
    }

    /// Required parameters must be present; any supplied parameter must have its declared type.
    fn check_arguments(&self, kind: ToolKind, arguments: &Arguments) -> Result<(), String> {
        for param in kind.params() {
            match arguments.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(out::missing_parameter(kind.name(), &param.name));
                }
                None | Some(Value::Null) => {}
                Some(value) if !param.kind.accepts(value) => {
                    return Err(out::wrong_parameter_type(&param.name, param.kind.as_str()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Only called after `check_arguments` has accepted the mapping.
fn str_arg<'a>(arguments: &'a Arguments, name: &str) -> &'a str {
    opt_str_arg(arguments, name).unwrap_or_default()
}

fn opt_str_arg<'a>(arguments: &'a Arguments, name: &str) -> Option<&'a str> {
    arguments.get(name).and_then(Value::as_str)
}

/// The registry doubles as an in-process gateway.
#[async_trait]
impl ToolGateway for ToolRegistry {
    async fn catalog(&self) -> anyhow::Result<Vec<ToolDescriptor>> {
        Ok(self.catalog.clone())
    }

    async fn invoke(&self, call: &ToolCallRequest) -> ToolCallResult {
        self.dispatch(&call.name, &call.arguments).await
    }
}

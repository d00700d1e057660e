//! # Tool Output
//!
//! Text returned by the file tools. The model reads these verbatim.

pub fn file_contents(path: &str, content: &str) -> String {
    format!("✅ File: {path}\n\n{content}")
}

pub fn binary_file(path: &str, bytes: usize) -> String {
    format!("✅ Binary file: {path}\nSize: {bytes} bytes")
}

pub fn file_written(path: &str, chars: usize) -> String {
    format!("✅ File written successfully: {path} ({chars} characters)")
}

pub fn content_appended(path: &str, chars: usize) -> String {
    format!("✅ Content appended to: {path} ({chars} characters added)")
}

pub fn file_deleted(path: &str) -> String {
    format!("✅ File deleted successfully: {path}")
}

pub fn directory_empty(path: &str) -> String {
    format!("📁 Directory '{path}' is empty")
}

pub fn directory_header(path: &str) -> String {
    format!("📁 Directory: {path}\n")
}

pub fn directory_line(name: &str) -> String {
    format!("  📂 {name}/")
}

pub fn file_line(name: &str, size: &str) -> String {
    format!("  📄 {name} ({size})")
}

pub fn directory_created(path: &str) -> String {
    format!("✅ Directory created successfully: {path}")
}

pub fn file_moved(source: &str, destination: &str) -> String {
    format!("✅ File moved: {source} → {destination}")
}

pub fn info_header(path: &str) -> String {
    format!("📋 File Information: {path}\n")
}

pub fn info_line(key: &str, value: &str) -> String {
    format!("  {key}: {value}")
}

pub fn failure(err: &dyn std::fmt::Display) -> String {
    format!("❌ Error: {err}")
}

pub fn unknown_tool(name: &str) -> String {
    format!("❌ Error: unknown tool '{name}'")
}

pub fn missing_parameter(tool: &str, param: &str) -> String {
    format!("❌ Error: missing required parameter '{param}' for {tool}")
}

pub fn wrong_parameter_type(param: &str, expected: &str) -> String {
    format!("❌ Error: parameter '{param}' must be a {expected}")
}

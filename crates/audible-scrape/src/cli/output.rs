// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Global output flags, set once by `main` through environment variables so
//! every command can check them.

pub const JSON_ENV: &str = "AUDIBLE_SCRAPE_JSON";
pub const QUIET_ENV: &str = "AUDIBLE_SCRAPE_QUIET";
pub const NO_COLOR_ENV: &str = "AUDIBLE_SCRAPE_NO_COLOR";

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

/// Machine-readable output only.
pub fn is_json() -> bool {
    flag(JSON_ENV)
}

/// Suppress status output.
pub fn is_quiet() -> bool {
    flag(QUIET_ENV)
}

pub fn use_color() -> bool {
    !flag(NO_COLOR_ENV) && std::env::var_os("NO_COLOR").is_none()
}

/// Render `value` with four-space indentation.
pub fn pretty_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Print a JSON value on stdout, pretty unless in JSON mode.
pub fn print_json(value: &serde_json::Value) {
    let text = if is_json() {
        serde_json::to_string(value)
    } else {
        pretty_json(value)
    };
    match text {
        Ok(t) => println!("{t}"),
        Err(e) => error(&format!("failed to render JSON: {e}")),
    }
}

/// Status line on stderr, dropped in quiet and JSON modes.
pub fn status(msg: &str) {
    if !is_quiet() && !is_json() {
        eprintln!("  {msg}");
    }
}

pub fn warn(msg: &str) {
    if is_json() {
        return;
    }
    if use_color() {
        eprintln!("  \x1b[33mWarning:\x1b[0m {msg}");
    } else {
        eprintln!("  Warning: {msg}");
    }
}

pub fn error(msg: &str) {
    if use_color() && !is_json() {
        eprintln!("  \x1b[31mError:\x1b[0m {msg}");
    } else {
        eprintln!("  Error: {msg}");
    }
}

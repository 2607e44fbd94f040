//! Logger configuration and structured output formatting.
//!
//! Grounded in `kairos-rs::logs::logger::configure_logger` — same
//! timestamp/level/file:line column layout, same `NO_COLOR` override —
//! trimmed down to what a single-binary proxy needs.

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

const LEVEL_FIELD_WIDTH: usize = 8;
const FILE_LINE_FIELD_WIDTH: usize = 22;

/// Visible length of `s`, ignoring `\x1b[...m` ANSI escapes.
fn visible_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut visible = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b {
            i += 1;
            if i < bytes.len() && bytes[i] == b'[' {
                i += 1;
            }
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if b == b'm' {
                    break;
                }
            }
        } else {
            let first = bytes[i];
            let width = if first < 0x80 {
                1
            } else if first >> 5 == 0b110 {
                2
            } else if first >> 4 == 0b1110 {
                3
            } else if first >> 3 == 0b11110 {
                4
            } else {
                1
            };
            visible += 1;
            i += width;
        }
    }
    visible
}

/// Initializes the global logger. `level` sets the filter unless
/// `RUST_LOG` is set, in which case the environment wins.
pub fn configure_logger(level: LevelFilter) {
    let no_color = env::var("NO_COLOR").is_ok();
    let env_override = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.format(move |buf, record| {
        let level = record.level();
        let level_plain = level.to_string();

        let (prefix, colored_level, suffix) = if no_color {
            (String::new(), level_plain.clone(), String::new())
        } else {
            let prefix = "\x1b[1m".to_string();
            let colored = match level {
                log::Level::Error => format!("\x1b[31m{}\x1b[39m", level_plain),
                log::Level::Warn => format!("\x1b[33m{}\x1b[39m", level_plain),
                log::Level::Info => format!("\x1b[32m{}\x1b[39m", level_plain),
                log::Level::Debug => format!("\x1b[34m{}\x1b[39m", level_plain),
                log::Level::Trace => format!("\x1b[35m{}\x1b[39m", level_plain),
            };
            (prefix, colored, "\x1b[0m".to_string())
        };

        let level_display = format!("[{}]", colored_level);
        let level_padding = LEVEL_FIELD_WIDTH.saturating_sub(visible_len(&level_display)).max(1);

        let file = record.file().unwrap_or("unknown");
        let line = record.line().unwrap_or(0);
        let file_line = format!("{}:{}", file, line);
        let file_line_padding = FILE_LINE_FIELD_WIDTH.saturating_sub(visible_len(&file_line)).max(1);

        writeln!(
            buf,
            "{}{} | {}{}| {}{}| {}{}",
            prefix,
            Local::now().format("%b %d %y %I:%M:%S %p"),
            level_display,
            " ".repeat(level_padding),
            file_line,
            " ".repeat(file_line_padding),
            record.args(),
            suffix,
        )
    });

    if let Some(spec) = env_override {
        builder.parse_filters(&spec);
    } else {
        builder.filter_level(level);
    }
    builder.init();
}

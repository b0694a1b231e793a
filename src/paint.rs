//! ANSI escape sequences written around rendered cells.
//!
//! Truecolor escapes (`ESC[38;2;R;G;Bm`, `ESC[48;2;R;G;Bm`) are formatted
//! directly: crossterm's color commands go quiet when `NO_COLOR` is set, and
//! these bytes must not change. Attributes and cursor moves use crossterm.

use crossterm::cursor::{MoveDown, MoveUp};
use crossterm::style::{Attribute, ResetColor, SetAttribute};
use crossterm::Command;
use std::fmt::Write;

/// Reset all colors and attributes
pub const NORMALIZER: &str = "\x1b[0m";

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}

pub fn foreground(r: u8, g: u8, b: u8) -> String {
    let mut out = String::with_capacity(19);
    push_foreground(&mut out, r, g, b);
    out
}

/// Append a foreground escape without allocating a new string
pub fn push_foreground(out: &mut String, r: u8, g: u8, b: u8) {
    let _ = write!(out, "\x1b[38;2;{};{};{}m", r, g, b);
}

pub fn background(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[48;2;{};{};{}m", r, g, b)
}

pub fn bold() -> String {
    ansi(SetAttribute(Attribute::Bold))
}

pub fn reset() -> String {
    ansi(ResetColor)
}

/// Newline followed by a cursor-up of `lines`, returning to the top of a printed frame
pub fn move_cursor_up(lines: usize) -> String {
    let mut out = String::from("\n");
    if lines > 0 {
        out.push_str(&ansi(MoveUp(saturating_u16(lines))));
    }
    out
}

pub fn move_cursor_down(lines: usize) -> String {
    if lines == 0 {
        return String::new();
    }
    ansi(MoveDown(saturating_u16(lines)))
}

fn saturating_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truecolor_escapes() {
        assert_eq!(foreground(255, 0, 0), "\x1b[38;2;255;0;0m");
        assert_eq!(background(1, 22, 133), "\x1b[48;2;1;22;133m");

        let mut line = String::from("x");
        push_foreground(&mut line, 9, 8, 7);
        assert_eq!(line, "x\x1b[38;2;9;8;7m");
    }

    #[test]
    fn test_attribute_escapes() {
        assert_eq!(bold(), "\x1b[1m");
        assert_eq!(reset(), NORMALIZER);
    }

    #[test]
    fn test_cursor_moves() {
        assert_eq!(move_cursor_up(12), "\n\x1b[12A");
        assert_eq!(move_cursor_up(0), "\n");
        assert_eq!(move_cursor_down(3), "\x1b[3B");
        assert_eq!(move_cursor_down(0), "");
    }
}

//! Golden tests for the parser, emulator and screen model
//!
//! Each test feeds a byte stream through an `Emulator` and compares the
//! resulting screen against the expected text, attributes and cursor.

use vtpane::core::{Color, ColorMode, GlyphFlags, Snapshot};
use vtpane::Emulator;

fn run(cols: usize, rows: usize, input: &[u8]) -> Emulator {
    let mut emu = Emulator::new(cols, rows, 100);
    emu.process(input);
    emu
}

fn row_text(emu: &Emulator, row: usize) -> String {
    emu.screen()
        .line(row)
        .map(|line| line.text())
        .unwrap_or_default()
}

#[test]
fn test_basic_echo() {
    let emu = run(80, 24, b"hello world\r\n$ ");

    assert_eq!(row_text(&emu, 0), "hello world");
    assert_eq!(row_text(&emu, 1), "$");
    assert_eq!(emu.screen().cursor().row, 1);
    assert_eq!(emu.screen().cursor().col, 2);
    assert_eq!(emu.snapshot().to_text(), "hello world\n$\n");
}

#[test]
fn test_cursor_movement() {
    let emu = run(80, 24, b"\x1b[5;10H");
    assert_eq!(emu.screen().cursor().row, 4);
    assert_eq!(emu.screen().cursor().col, 9);

    let emu = run(80, 24, b"\x1b[10;20H\x1b[3A\x1b[2D");
    assert_eq!(emu.screen().cursor().row, 6);
    assert_eq!(emu.screen().cursor().col, 17);

    // Out-of-range positions clamp to the grid
    let emu = run(80, 24, b"\x1b[999;999H");
    assert_eq!(emu.screen().cursor().row, 23);
    assert_eq!(emu.screen().cursor().col, 79);
}

#[test]
fn test_basic_colors() {
    let emu = run(80, 24, b"\x1b[31mRed\x1b[0m \x1b[32mGreen\x1b[0m \x1b[1;44mBlue\x1b[0m");

    assert_eq!(row_text(&emu, 0), "Red Green Blue");

    let red = emu.screen().glyph(0, 0).copied().unwrap_or_default();
    assert_eq!(red.fg, Color::Basic(1));
    assert_eq!(red.fg.mode(), ColorMode::Basic);
    assert_eq!(red.bg, Color::Default);

    let space = emu.screen().glyph(3, 0).copied().unwrap_or_default();
    assert_eq!(space.fg, Color::Default);

    let green = emu.screen().glyph(4, 0).copied().unwrap_or_default();
    assert_eq!(green.fg, Color::Basic(2));

    let blue = emu.screen().glyph(10, 0).copied().unwrap_or_default();
    assert_eq!(blue.bg, Color::Basic(4));
    assert!(blue.flags.contains(GlyphFlags::BOLD));
}

#[test]
fn test_256_and_truecolor() {
    let emu = run(
        80,
        24,
        b"\x1b[38;5;196mRed256\x1b[0m \x1b[38;2;0;255;0mTrueGreen\x1b[0m",
    );

    assert_eq!(row_text(&emu, 0), "Red256 TrueGreen");
    let indexed = emu.screen().glyph(0, 0).copied().unwrap_or_default();
    assert_eq!(indexed.fg, Color::Indexed(196));
    assert_eq!(indexed.fg.mode(), ColorMode::Palette256);

    let direct = emu.screen().glyph(7, 0).copied().unwrap_or_default();
    assert_eq!(direct.fg, Color::Rgb(0, 255, 0));
    assert_eq!(direct.fg.mode(), ColorMode::TrueColor);
}

#[test]
fn test_line_wrapping() {
    let line = "A".repeat(85);
    let emu = run(80, 24, line.as_bytes());

    assert_eq!(row_text(&emu, 0).len(), 80);
    assert_eq!(row_text(&emu, 1).len(), 5);
    assert!(emu.screen().line(0).is_some_and(|l| l.is_wrapped()));
    assert!(!emu.screen().line(1).is_some_and(|l| l.is_wrapped()));
}

#[test]
fn test_newline_and_carriage_return() {
    let emu = run(80, 24, b"Line1\r\nLine2\rOverwrite");

    assert_eq!(row_text(&emu, 0), "Line1");
    assert_eq!(row_text(&emu, 1), "Overwrite");
}

#[test]
fn test_erase_to_end_of_line() {
    let emu = run(80, 24, b"AAAAAAAAAA\x1b[1;5H\x1b[K");
    assert_eq!(row_text(&emu, 0), "AAAA");
}

#[test]
fn test_insert_and_delete_chars() {
    let emu = run(80, 24, b"ABCDE\x1b[1;3H\x1b[2@XX");
    assert_eq!(row_text(&emu, 0), "ABXXCDE");

    let emu = run(80, 24, b"ABCDE\x1b[1;2H\x1b[2P");
    assert_eq!(row_text(&emu, 0), "ADE");
}

#[test]
fn test_chunk_boundary_parsing() {
    let mut emu = Emulator::new(80, 24, 100);
    // Escape sequence and a multi-byte rune split across reads
    emu.process(b"\x1b[3");
    emu.process(b"1mRed \xe4\xb8");
    emu.process(b"\xad\x1b[0m");

    assert_eq!(row_text(&emu, 0), "Red 中");
    let glyph = emu.screen().glyph(0, 0).copied().unwrap_or_default();
    assert_eq!(glyph.fg, Color::Basic(1));
}

#[test]
fn test_alternate_screen() {
    let mut emu = run(80, 24, b"MainScreen");

    emu.process(b"\x1b[?1049h\x1b[HAltScreen");
    assert!(emu.screen().is_alt_screen());
    assert_eq!(row_text(&emu, 0), "AltScreen");

    emu.process(b"\x1b[?1049l");
    assert!(!emu.screen().is_alt_screen());
    assert_eq!(row_text(&emu, 0), "MainScreen");
    assert_eq!(emu.screen().cursor().col, 10);
}

#[test]
fn test_alternate_screen_keeps_history_untouched() {
    let mut emu = Emulator::new(10, 2, 100);
    emu.process(b"a\r\nb\r\nc");
    assert_eq!(emu.screen().history_len(), 1);

    emu.process(b"\x1b[?1049h");
    for _ in 0..10 {
        emu.process(b"x\r\n");
    }
    assert_eq!(emu.screen().history_len(), 1);
    emu.process(b"\x1b[?1049l");
    assert_eq!(row_text(&emu, 0), "b");
    assert_eq!(row_text(&emu, 1), "c");
}

#[test]
fn test_scrollback_fifo_eviction() {
    let mut emu = Emulator::new(10, 3, 5);
    for i in 0..10 {
        if i > 0 {
            emu.process(b"\r\n");
        }
        emu.process(format!("L{}", i).as_bytes());
    }

    let history = emu.screen().scrollback();
    assert_eq!(history.len(), 5);
    assert_eq!(history.capacity(), 5);
    assert_eq!(history.get(0).map(|l| l.text()), Some("L2".to_string()));
    assert_eq!(history.get(4).map(|l| l.text()), Some("L6".to_string()));

    assert_eq!(row_text(&emu, 0), "L7");
    assert_eq!(row_text(&emu, 2), "L9");
}

#[test]
fn test_scroll_region() {
    let emu = run(80, 5, b"Line1\r\nLine2\r\nLine3\r\nLine4\r\nLine5\x1b[2;4r\x1b[4;1H\n");

    // Rows 2-4 scrolled inside the region; rows outside are untouched
    assert_eq!(row_text(&emu, 0), "Line1");
    assert_eq!(row_text(&emu, 1), "Line3");
    assert_eq!(row_text(&emu, 2), "Line4");
    assert_eq!(row_text(&emu, 3), "");
    assert_eq!(row_text(&emu, 4), "Line5");
    // A region scroll never feeds history
    assert_eq!(emu.screen().history_len(), 0);
}

#[test]
fn test_save_restore_cursor() {
    let emu = run(80, 24, b"\x1b[5;10H\x1b7\x1b[1;1HMARK\x1b8RESTORED");
    assert_eq!(row_text(&emu, 0), "MARK");
    assert_eq!(row_text(&emu, 4), format!("{}RESTORED", " ".repeat(9)));
}

#[test]
fn test_insert_lines() {
    let emu = run(80, 5, b"Line1\r\nLine2\r\nLine3\x1b[2;1H\x1b[L");
    assert_eq!(row_text(&emu, 0), "Line1");
    assert_eq!(row_text(&emu, 1), "");
    assert_eq!(row_text(&emu, 2), "Line2");
    assert_eq!(row_text(&emu, 3), "Line3");
}

#[test]
fn test_delete_lines() {
    let emu = run(80, 5, b"Line1\r\nLine2\r\nLine3\x1b[2;1H\x1b[M");
    assert_eq!(row_text(&emu, 0), "Line1");
    assert_eq!(row_text(&emu, 1), "Line3");
    assert_eq!(emu.screen().history_len(), 0);
}

#[test]
fn test_wide_chars() {
    let emu = run(10, 3, "中文ab".as_bytes());

    let first = emu.screen().glyph(0, 0).copied().unwrap_or_default();
    assert_eq!(first.rune, '中');
    assert!(first.is_wide());
    assert!(emu.screen().glyph(1, 0).is_some_and(|g| g.is_wide_dummy()));
    assert_eq!(row_text(&emu, 0), "中文ab");
    assert_eq!(emu.screen().cursor().col, 6);
}

#[test]
fn test_wide_char_wraps_at_last_column() {
    let emu = run(5, 3, "abcd中".as_bytes());

    assert_eq!(row_text(&emu, 0), "abcd");
    assert_eq!(row_text(&emu, 1), "中");
    assert_eq!(emu.screen().cursor().row, 1);
    assert_eq!(emu.screen().cursor().col, 2);
}

#[test]
fn test_dec_line_drawing() {
    let emu = run(10, 3, b"\x1b(0lqk\x1b(Bq");
    assert_eq!(row_text(&emu, 0), "┌─┐q");
}

#[test]
fn test_snapshot_json_round_trip() {
    let emu = run(20, 4, b"\x1b[1;31mbold red\x1b[0m\r\nplain\x1b]2;golden\x07");
    let snapshot = emu.snapshot();
    assert_eq!(snapshot.title, "golden");

    let json = snapshot.to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap();
    assert!(snapshot.content_equals(&restored));
    assert_eq!(restored.to_text(), "bold red\nplain\n");
}

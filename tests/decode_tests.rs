//! End-to-end decoding through a session fed with pushed bytes

use std::time::Duration;

use termkey::{
    CanonFlags, Error, ErrorCode, Flags, FormatFlags, Key, KeyCode, KeyResult, KeySym, Modifiers,
    MouseEventKind, TermKey,
};

fn session(flags: Flags) -> TermKey {
    TermKey::new_abstract(flags)
}

fn utf8() -> TermKey {
    session(Flags::UTF8)
}

/// Push `bytes` and force-decode everything
fn decode_all(tk: &mut TermKey, bytes: &[u8]) -> Vec<Key> {
    tk.push_bytes(bytes).unwrap();
    let mut keys = Vec::new();
    while let KeyResult::Key(key) = tk.getkey_force() {
        keys.push(key);
    }
    keys
}

fn vim(tk: &TermKey, key: &Key) -> String {
    tk.strfkey(key, FormatFlags::VIM).unwrap()
}

// ============================================================================
// Ambiguous prefixes
// ============================================================================

#[test]
fn test_lone_escape_needs_force() {
    let mut tk = utf8();
    tk.push_bytes(b"\x1b").unwrap();
    assert_eq!(tk.getkey(), KeyResult::Again);

    let key = tk.getkey_force().key().unwrap();
    assert_eq!(key.keysym(), Some(KeySym::Escape));
    assert_eq!(vim(&tk, &key), "<Escape>");
    assert_eq!(tk.getkey(), KeyResult::None);
}

#[test]
fn test_escape_completed_by_later_bytes() {
    let mut tk = utf8();
    tk.push_bytes(b"\x1b[").unwrap();
    assert_eq!(tk.getkey(), KeyResult::Again);
    tk.push_bytes(b"1;5").unwrap();
    assert_eq!(tk.getkey(), KeyResult::Again);
    tk.push_bytes(b"A").unwrap();
    assert_eq!(
        tk.getkey(),
        KeyResult::Key(Key::sym(KeySym::Up).with_modifiers(Modifiers::CTRL))
    );
}

#[test]
fn test_waitkey_times_out_to_escape() {
    let mut tk = utf8();
    tk.set_wait_time_ms(10);
    tk.push_bytes(b"\x1b").unwrap();
    let key = tk.waitkey().unwrap().key().unwrap();
    assert_eq!(key, Key::sym(KeySym::Escape));
}

#[test]
fn test_escape_prefix_is_alt() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1ba\x1b\x1b[A");
    assert_eq!(keys[0], Key::unicode('a').with_modifiers(Modifiers::ALT));
    assert_eq!(vim(&tk, &keys[0]), "<M-a>");
    assert_eq!(keys[1], Key::sym(KeySym::Up).with_modifiers(Modifiers::ALT));
}

#[test]
fn test_incomplete_csi_forced_is_alt_bracket() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[1;");
    assert_eq!(keys[0], Key::unicode('[').with_modifiers(Modifiers::ALT));
    assert_eq!(keys[1], Key::unicode('1'));
    assert_eq!(keys[2], Key::unicode(';'));
}

// ============================================================================
// Control characters and canonicalisation
// ============================================================================

#[test]
fn test_ctrl_c_as_key() {
    let mut tk = session(Flags::UTF8 | Flags::NOSTART);
    tk.set_flags(tk.flags() | Flags::CTRLC);
    tk.start().unwrap();
    tk.stop().unwrap();
    tk.start().unwrap();

    tk.push_bytes(&[0x03]).unwrap();
    let key = tk.waitkey().unwrap().key().unwrap();
    assert_eq!(vim(&tk, &key), "<C-c>");
}

#[test]
fn test_del_canonicalised_to_backspace() {
    let mut tk = utf8();
    tk.push_bytes(&[0x7f]).unwrap();
    let mut key = tk.getkey().key().unwrap();
    assert_eq!(key.keysym(), Some(KeySym::Del));

    tk.set_canon_flags(CanonFlags::DELBS);
    tk.canonicalise(&mut key);
    assert_eq!(key.keysym(), Some(KeySym::Backspace));
    assert_eq!(vim(&tk, &key), "<Backspace>");

    // Later decodes are canonicalised as they come out
    tk.push_bytes(&[0x7f]).unwrap();
    assert_eq!(tk.getkey(), KeyResult::Key(Key::sym(KeySym::Backspace)));
}

#[test]
fn test_nointerpret_keeps_control_characters() {
    let mut tk = session(Flags::UTF8 | Flags::NOINTERPRET);
    let keys = decode_all(&mut tk, b"\t\r");
    assert_eq!(keys[0], Key::unicode('i').with_modifiers(Modifiers::CTRL));
    assert_eq!(keys[1], Key::unicode('m').with_modifiers(Modifiers::CTRL));
}

#[test]
fn test_space_symbol_both_ways() {
    let mut tk = utf8();
    let mut key = decode_all(&mut tk, b" ").remove(0);
    assert_eq!(key, Key::unicode(' '));

    tk.set_canon_flags(CanonFlags::SPACESYMBOL);
    tk.canonicalise(&mut key);
    assert_eq!(key, Key::sym(KeySym::Space));

    tk.set_canon_flags(CanonFlags::empty());
    tk.canonicalise(&mut key);
    assert_eq!(key, Key::unicode(' '));
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_function_and_cursor_keys() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[A\x1bOP\x1b[15~\x1b[3;2~\x1b[Z");
    let text: Vec<String> = keys.iter().map(|k| vim(&tk, k)).collect();
    assert_eq!(text, ["<Up>", "<F1>", "<F5>", "<S-Delete>", "<S-Tab>"]);
}

#[test]
fn test_mouse_reports() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[<0;10;20M\x1b[<0;10;20m\x1b[M !\"");

    let press = keys[0].mouse().unwrap();
    assert_eq!(press.event, MouseEventKind::Press);
    assert_eq!((press.button, press.line, press.col), (1, 20, 10));
    assert_eq!(keys[1].mouse().unwrap().event, MouseEventKind::Release);

    let x10 = keys[2].mouse().unwrap();
    assert_eq!((x10.line, x10.col), (2, 1));
    assert_eq!(
        tk.strfkey(&keys[0], FormatFlags::MOUSE_POS).unwrap(),
        "MousePress(1) @ (10,20)"
    );
}

#[test]
fn test_reports_and_strings() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[?12;40R\x1b[?2004;1$y\x1b]0;title\x07\x1bP1$r0m\x1b\\");
    assert_eq!(keys[0].position(), Some((12, 40)));

    let mode = keys[1].mode_report().unwrap();
    assert_eq!((mode.mode, mode.value), (2004, 1));

    assert_eq!(keys[2].code, KeyCode::Osc(b"0;title".to_vec()));
    assert_eq!(keys[3].string(), Some(&b"1$r0m"[..]));
    assert_eq!(keys.len(), 4);
}

#[test]
fn test_unknown_csi_is_reported_and_skipped() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[?1;2cx");
    let report = keys[0].csi().unwrap();
    assert_eq!(report.command, Some(b'c'));
    assert_eq!(report.raw, b"\x1b[?1;2c");
    assert_eq!(keys[1], Key::unicode('x'));
}

#[test]
fn test_unknown_csi_keeps_subparameters() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, b"\x1b[4:3;7q");
    let report = keys[0].csi().unwrap();
    assert_eq!(report.command, Some(b'q'));
    assert_eq!(report.params.get(0), Some(4));
    assert_eq!(report.params.subparams(0), Some(&[3][..]));
    assert_eq!(report.params.get(1), Some(7));
}

#[test]
fn test_convertkp() {
    let mut tk = session(Flags::UTF8 | Flags::CONVERTKP);
    let keys = decode_all(&mut tk, b"\x1bOp\x1bOk\x1bOM");
    assert_eq!(keys[0], Key::unicode('0'));
    assert_eq!(keys[1], Key::unicode('+'));
    assert_eq!(keys[2], Key::sym(KeySym::KpEnter));
}

// ============================================================================
// Encodings
// ============================================================================

#[test]
fn test_utf8_split_across_pushes() {
    let mut tk = utf8();
    tk.push_bytes(&[0xe2, 0x82]).unwrap();
    assert_eq!(tk.getkey(), KeyResult::Again);
    tk.push_bytes(&[0xac]).unwrap();
    let key = tk.getkey().key().unwrap();
    assert_eq!(key.codepoint(), Some('€'));
    assert!(key.utf8);
}

#[test]
fn test_invalid_utf8_resynchronises() {
    let mut tk = utf8();
    let keys = decode_all(&mut tk, &[0xff, b'a', 0xc3, b'b']);
    let cps: Vec<_> = keys.iter().map(|k| k.codepoint().unwrap()).collect();
    assert_eq!(cps, ['\u{fffd}', 'a', '\u{fffd}', 'b']);
}

#[test]
fn test_eight_bit_mode() {
    let mut tk = session(Flags::RAW);
    let keys = decode_all(&mut tk, &[0xe9, 0x1b, b'[']);
    assert_eq!(keys[0].codepoint(), Some('é'));
    assert_eq!(keys[1].codepoint(), Some('\x1b'));
    assert_eq!(keys[2].codepoint(), Some('['));
}

// ============================================================================
// Buffer
// ============================================================================

#[test]
fn test_overflow_keeps_prefix() {
    let mut tk = utf8();
    tk.set_buffer_size(4).unwrap();
    let err = tk.push_bytes(b"abcde").unwrap_err();
    assert!(matches!(
        err,
        Error::BufferOverflow {
            accepted: 4,
            requested: 5
        }
    ));
    assert_eq!(tk.last_error(), Some(ErrorCode::BufferOverflow));
    assert_eq!(tk.buffer_remaining(), 0);

    let text: String = std::iter::from_fn(|| tk.getkey().key())
        .map(|k| k.codepoint().unwrap())
        .collect();
    assert_eq!(text, "abcd");
    assert_eq!(tk.buffer_remaining(), 4);
}

#[test]
fn test_grow_buffer_while_in_use() {
    let mut tk = utf8();
    tk.set_buffer_size(2).unwrap();
    tk.push_bytes(b"\x1b[").unwrap();
    tk.set_buffer_size(8).unwrap();
    tk.push_bytes(b"B").unwrap();
    assert_eq!(tk.getkey(), KeyResult::Key(Key::sym(KeySym::Down)));
}

// ============================================================================
// Comparison and parsing
// ============================================================================

#[test]
fn test_keycmp_orders_by_kind_then_payload_then_modifiers() {
    let tk = utf8();
    let a = Key::unicode('a');
    let ctrl_a = Key::unicode('a').with_modifiers(Modifiers::CTRL);
    let f1 = Key::function(1);
    let up = Key::sym(KeySym::Up);

    assert!(tk.keycmp(&a, &ctrl_a).is_lt());
    assert!(tk.keycmp(&ctrl_a, &Key::unicode('b')).is_lt());
    assert!(tk.keycmp(&Key::unicode('z'), &f1).is_lt());
    assert!(tk.keycmp(&f1, &up).is_lt());
    assert!(tk.keycmp(&up, &up).is_eq());
}

#[test]
fn test_strpkey_reads_formatted_keys() {
    let tk = utf8();
    let keys = [
        Key::unicode('x').with_modifiers(Modifiers::CTRL | Modifiers::ALT),
        Key::sym(KeySym::PageUp).with_modifiers(Modifiers::SHIFT),
        Key::function(11),
    ];
    for format in [FormatFlags::VIM, FormatFlags::URWID, FormatFlags::empty()] {
        for key in &keys {
            let text = tk.strfkey(key, format).unwrap();
            assert_eq!(tk.strpkey(&text, format), Some((key.clone(), "")), "{}", text);
        }
    }
}

#[test]
fn test_wait_time_setting() {
    let mut tk = utf8();
    assert_eq!(tk.wait_time_ms(), 50);
    tk.set_wait_time_ms(0);
    tk.push_bytes(b"\x1b").unwrap();
    let started = std::time::Instant::now();
    assert!(tk.waitkey().unwrap().key().is_some());
    assert!(started.elapsed() < Duration::from_millis(50));
}

// Wire framing shared by the emitter (producer side) and the listener.
//
// A frame is `name/pid text\n`, at most MAX_FRAME bytes with the terminator.

use std::borrow::Cow;

use crate::{MAX_FRAME, TRUNCATION_MARKER};

/// Longest line content a frame can carry, terminator excluded.
pub const MAX_LINE: usize = MAX_FRAME - 1;

/// Sender identity as it prefixes every frame.
///
/// Line breaks in `name` become spaces, as they do in message text.
pub fn identity(name: &str, pid: u32) -> String {
    let name: String = name.chars().map(flatten_line_break).collect();
    format!("{name}/{pid}")
}

fn flatten_line_break(c: char) -> char {
    if c == '\n' || c == '\r' {
        ' '
    } else {
        c
    }
}

/// Build the frame for `text` sent under `identity`.
///
/// Line breaks inside `text` become spaces so one message is always one
/// frame. Oversize frames are cut to exactly `MAX_FRAME` bytes ending in the
/// truncation marker, moving the cut back to a character boundary if needed.
pub fn encode(identity: &str, text: &str) -> String {
    let mut line = String::with_capacity(identity.len() + 1 + text.len());
    line.push_str(identity);
    line.push(' ');
    line.extend(text.chars().map(flatten_line_break));

    let mut frame = match truncate_line(&line) {
        Cow::Borrowed(_) => line,
        Cow::Owned(cut) => cut,
    };
    frame.push('\n');
    frame
}

/// Cut a line (no terminator) so that it fits in a frame.
///
/// Lines within `MAX_LINE` bytes come back borrowed and untouched.
pub fn truncate_line(line: &str) -> Cow<'_, str> {
    if line.len() <= MAX_LINE {
        return Cow::Borrowed(line);
    }

    let mut cut = MAX_LINE - TRUNCATION_MARKER.len();
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut out = String::with_capacity(MAX_LINE);
    out.push_str(&line[..cut]);
    out.push_str(TRUNCATION_MARKER);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frame_is_identity_space_text_newline() {
        assert_eq!(encode(&identity("app", 42), "hello"), "app/42 hello\n");
    }

    #[test]
    fn embedded_line_breaks_are_flattened() {
        assert_eq!(encode("a/1", "one\ntwo\r\n"), "a/1 one two  \n");
    }

    #[test]
    fn line_breaks_in_process_name_are_flattened() {
        assert_eq!(identity("evil\nname\r", 42), "evil name /42");
        assert_eq!(encode(&identity("evil\nname", 42), "hello"), "evil name/42 hello\n");
    }

    #[test]
    fn frame_of_exactly_max_size_is_kept() {
        let id = identity("app", 42);
        let text = "x".repeat(MAX_FRAME - id.len() - 2);
        let frame = encode(&id, &text);
        assert_eq!(frame.len(), MAX_FRAME);
        assert!(!frame.ends_with("...\n"));
    }

    #[test]
    fn multibyte_cut_stays_on_char_boundary() {
        let text = "é".repeat(MAX_FRAME);
        let frame = encode("a/1", &text);
        assert!(frame.len() <= MAX_FRAME);
        assert!(frame.ends_with("...\n"));
        assert!(std::str::from_utf8(frame.as_bytes()).is_ok());
    }
}

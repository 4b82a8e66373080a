/// Split text into lines on `\n`.
///
/// The separator is the only thing removed: `\r` stays part of its line, a
/// trailing separator yields a final empty line, and the empty text is one
/// empty line. `join_lines` is the exact inverse.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Split raw bytes into lines, replacing invalid UTF-8 with U+FFFD.
pub fn split_bytes(data: &[u8]) -> Vec<String> {
    split_lines(&String::from_utf8_lossy(data))
}

/// Join lines with `\n`.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn trailing_newline_adds_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn carriage_returns_are_kept() {
        assert_eq!(split_lines("a\r\nb"), vec!["a\r", "b"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(split_bytes(b"ok\n\xffx"), vec!["ok", "\u{fffd}x"]);
    }

    #[test]
    fn join_inverts_split() {
        for text in ["", "\n", "a", "a\n", "a\r\nb\n\nc"] {
            assert_eq!(join_lines(&split_lines(text)), text);
        }
    }
}

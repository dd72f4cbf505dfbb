use crate::dialects::Dialect;

/// Per-line scanner state used while looking for a single-line comment
/// marker. `Escaped` consumes the character after a backslash without
/// letting it open or close a string, then restores the remembered string
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString(char),
    Escaped(Option<char>),
}

impl ScanState {
    fn step(self, c: char, delimiters: &[char]) -> ScanState {
        match self {
            ScanState::Escaped(Some(d)) => ScanState::InString(d),
            ScanState::Escaped(None) => ScanState::Normal,
            ScanState::Normal if c == '\\' => ScanState::Escaped(None),
            ScanState::Normal if delimiters.contains(&c) => ScanState::InString(c),
            ScanState::Normal => ScanState::Normal,
            ScanState::InString(d) if c == '\\' => ScanState::Escaped(Some(d)),
            ScanState::InString(d) if c == d => ScanState::Normal,
            ScanState::InString(d) => ScanState::InString(d),
        }
    }

    fn in_string(self) -> bool {
        matches!(self, ScanState::InString(_) | ScanState::Escaped(Some(_)))
    }
}

/// Remove comments from `text` according to `dialect`'s descriptor.
///
/// Block comments are stripped first, then single-line comments with
/// string-literal awareness, then blank-line runs are collapsed. Never
/// fails: an unterminated block comment swallows the rest of the input, and
/// anything ambiguous degrades toward keeping the original text.
pub fn strip(text: &str, dialect: Dialect) -> String {
    let desc = dialect.descriptor();

    let mut cleaned = match desc.multi_line {
        Some((open, close)) => strip_block_comments(text, open, close),
        None => text.to_string(),
    };

    // A Python file may use either triple-quote style for block comments, so
    // both get their own pass over the already-cleaned text.
    if dialect == Dialect::Python {
        cleaned = strip_block_comments(&cleaned, "'''", "'''");
        cleaned = strip_block_comments(&cleaned, "\"\"\"", "\"\"\"");
    }

    if let Some(marker) = desc.single_line {
        cleaned = strip_line_comments(&cleaned, marker, desc.string_delimiters);
    }

    normalize_blank_lines(&cleaned)
}

/// Greedy leftmost scan: drop everything from each `open` through the next
/// `close`; an unterminated `open` drops the remainder of the text. Nested
/// pairs and openers inside string literals are not recognized.
fn strip_block_comments(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(open) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);

        let body = start + open.len();
        match text[body..].find(close) {
            Some(end) => cursor = body + end + close.len(),
            None => return out,
        }
    }

    out.push_str(&text[cursor..]);
    out
}

fn strip_line_comments(text: &str, marker: &str, delimiters: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(clean_line(line, marker, delimiters));
    }
    out
}

/// Single-line pass for one line. A line that is nothing but a comment
/// becomes an empty line; otherwise the line is truncated at the first valid
/// marker, or kept verbatim when there is none.
fn clean_line<'a>(line: &'a str, marker: &str, delimiters: &[char]) -> &'a str {
    if line.trim().starts_with(marker) {
        return "";
    }

    match find_comment_start(line, marker, delimiters) {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

/// Byte offset of the first marker occurrence that starts a comment: the
/// scanner must not be inside a string literal there, and the preceding
/// character must not be `:` (keeps `http://...` intact). An unbalanced
/// quote leaves the rest of the line "inside string", so nothing after it is
/// treated as a comment.
fn find_comment_start(line: &str, marker: &str, delimiters: &[char]) -> Option<usize> {
    let mut state = ScanState::Normal;

    for (idx, c) in line.char_indices() {
        if !state.in_string()
            && line[idx..].starts_with(marker)
            && !line[..idx].ends_with(':')
        {
            return Some(idx);
        }
        state = state.step(c, delimiters);
    }

    None
}

/// Collapse every run of blank (whitespace-only) lines to a single empty
/// line, trim whitespace from both ends of the text, and terminate with
/// exactly one newline.
fn normalize_blank_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut pending_blank = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            pending_blank = !kept.is_empty();
        } else {
            if pending_blank {
                kept.push("");
                pending_blank = false;
            }
            kept.push(line);
        }
    }

    let mut out = kept.join("\n").trim().to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_style_line_and_block_comments() {
        let src = "// leading comment\n\
                   int main() {\n\
                   \x20   int x = 5; // trailing comment\n\
                   \x20   /* block\n\
                   \x20      comment */\n\
                   \x20   int y = 10;\n\
                   \x20   return 0;\n\
                   }\n";
        let out = strip(src, Dialect::CStyle);

        assert!(!out.contains("leading comment"));
        assert!(!out.contains("trailing comment"));
        assert!(!out.contains("block"));
        assert!(out.contains("int main() {"));
        assert!(out.contains("int x = 5;"));
        assert!(out.contains("int y = 10;"));
        assert!(out.contains("return 0;"));
    }

    #[test]
    fn python_hash_comments_and_both_docstring_styles() {
        let src = "# module comment\n\
                   def main():\n\
                   \x20   x = 5  # trailing\n\
                   \x20   '''single-quoted\n\
                   \x20      docstring'''\n\
                   \x20   \"\"\"double-quoted docstring\"\"\"\n\
                   \x20   return x\n";
        let out = strip(src, Dialect::Python);

        assert!(!out.contains("module comment"));
        assert!(!out.contains("trailing"));
        assert!(!out.contains("docstring"));
        assert!(out.contains("def main():"));
        assert!(out.contains("x = 5"));
        assert!(out.contains("return x"));
    }

    #[test]
    fn markup_block_comments() {
        let src = "<html>\n<!-- a comment -->\n<body>\n<!-- spans\nlines -->\n<h1>Hi</h1>\n</body>\n</html>\n";
        let out = strip(src, Dialect::Markup);

        assert!(!out.contains("a comment"));
        assert!(!out.contains("spans"));
        assert!(out.contains("<html>"));
        assert!(out.contains("<h1>Hi</h1>"));
        assert!(out.contains("</html>"));
    }

    #[test]
    fn sql_dash_and_block_comments() {
        let src = "-- header\nSELECT * FROM users\nWHERE id = 1; -- lookup\n/* multi\n   line */\nUPDATE users SET name = 'John';\n";
        let out = strip(src, Dialect::Sql);

        assert!(!out.contains("header"));
        assert!(!out.contains("lookup"));
        assert!(!out.contains("multi"));
        assert!(out.contains("SELECT * FROM users"));
        assert!(out.contains("WHERE id = 1;"));
        assert!(out.contains("UPDATE users SET name = 'John';"));
    }

    #[test]
    fn url_protocol_is_not_a_comment() {
        let src = "const url = \"http://example.com\"; // trailing\nconst protocol = \"https://\"; // note\n";
        let out = strip(src, Dialect::CStyle);

        assert!(out.contains("const url = \"http://example.com\";"));
        assert!(out.contains("const protocol = \"https://\";"));
        assert!(!out.contains("trailing"));
        assert!(!out.contains("note"));
    }

    #[test]
    fn colon_before_marker_suppresses_comment_even_outside_urls() {
        // The URL guard is a plain preceding-colon check, so a marker glued
        // to a label colon survives too.
        assert_eq!(strip("next://note\n", Dialect::CStyle), "next://note\n");
    }

    #[test]
    fn marker_inside_string_is_kept() {
        let src = "const s = \"contains // not a comment\";\n";
        assert_eq!(strip(src, Dialect::CStyle), src);

        let sql = "SELECT '--' AS sep FROM t;\n";
        assert_eq!(strip(sql, Dialect::Sql), sql);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let src = "s = \"a\\\" // still inside\"; // real\n";
        let out = strip(src, Dialect::CStyle);
        assert_eq!(out, "s = \"a\\\" // still inside\";\n");
    }

    #[test]
    fn unbalanced_quote_suppresses_comment_detection() {
        let src = "x = \"unterminated // kept as is\n";
        assert_eq!(strip(src, Dialect::CStyle), src);
    }

    #[test]
    fn full_line_comment_becomes_blank_line() {
        let src = "a = 1\n   # note\nb = 2\n";
        assert_eq!(strip(src, Dialect::Python), "a = 1\n\nb = 2\n");
    }

    #[test]
    fn unterminated_block_comment_swallows_remainder() {
        assert_eq!(strip("code /* never closes\nmore\n", Dialect::CStyle), "code\n");
    }

    #[test]
    fn blank_line_runs_collapse_to_one() {
        let src = "a = 1\n\n\n\n\nb = 2\n  \n\t\n\nc = 3\n";
        assert_eq!(strip(src, Dialect::Python), "a = 1\n\nb = 2\n\nc = 3\n");
    }

    #[test]
    fn output_ends_with_single_newline_and_is_trimmed() {
        assert_eq!(strip("  x = 1  ", Dialect::Python), "x = 1\n");
        assert_eq!(strip("", Dialect::Python), "\n");
        assert_eq!(strip("   \n\n  \n", Dialect::Python), "\n");
    }

    #[test]
    fn untouched_lines_keep_interior_whitespace() {
        let src = "first\n    indented   trailing  \nlast\n";
        let out = strip(src, Dialect::Shell);
        assert!(out.contains("    indented   trailing  \n"));
    }

    #[test]
    fn batch_rem_comments() {
        let src = "REM setup\necho hi REM note\n";
        assert_eq!(strip(src, Dialect::Batch), "echo hi\n");
    }

    #[test]
    fn lua_block_then_line_comments() {
        let src = "--[[ block\ncomment ]]\nprint(1) -- tail\n";
        assert_eq!(strip(src, Dialect::Lua), "print(1)\n");
    }

    #[test]
    fn other_block_pairs() {
        let rb = "=begin\nnotes\n=end\nputs 1\n";
        assert_eq!(strip(rb, Dialect::Ruby), "puts 1\n");

        let hs = "{- header -}\nmain = return ()\n";
        assert_eq!(strip(hs, Dialect::Haskell), "main = return ()\n");

        let ps = "<# help #>\nWrite-Output 1\n";
        assert_eq!(strip(ps, Dialect::PowerShell), "Write-Output 1\n");
    }

    #[test]
    fn stripping_is_idempotent() {
        let inputs = [
            ("int x = 1; // c\n/* b */\ny();\n", Dialect::CStyle),
            ("x = 1  # c\n'''d'''\n", Dialect::Python),
            ("SELECT 1; -- c\n", Dialect::Sql),
            ("<a>\n<!-- c -->\n</a>\n", Dialect::Markup),
            ("const u = \"http://x.com\"; // t\n", Dialect::CStyle),
        ];
        for (src, dialect) in inputs {
            let once = strip(src, dialect);
            assert_eq!(strip(&once, dialect), once, "{dialect:?}");
        }
    }

    #[test]
    fn comment_free_input_is_preserved_modulo_normalization() {
        let src = "fn main() {\n    let x = 1;\n    let y = x + 1;\n}\n";
        assert_eq!(strip(src, Dialect::CStyle), src);
    }

    #[test]
    fn scan_state_tracks_strings_and_escapes() {
        let delims = ['"', '\''];
        let mut state = ScanState::Normal;
        assert!(!state.in_string());

        state = state.step('"', &delims);
        assert_eq!(state, ScanState::InString('"'));

        // The other delimiter does not close the active string.
        state = state.step('\'', &delims);
        assert_eq!(state, ScanState::InString('"'));

        // An escaped quote is consumed without closing.
        state = state.step('\\', &delims);
        assert_eq!(state, ScanState::Escaped(Some('"')));
        state = state.step('"', &delims);
        assert_eq!(state, ScanState::InString('"'));

        state = state.step('"', &delims);
        assert_eq!(state, ScanState::Normal);

        // A backslash outside a string escapes the next character too.
        state = state.step('\\', &delims);
        assert_eq!(state, ScanState::Escaped(None));
        state = state.step('"', &delims);
        assert_eq!(state, ScanState::Normal);
    }

    #[test]
    fn first_valid_marker_wins() {
        // The first `//` sits inside a string, the second is real.
        let src = "a(\"x // y\", b); // cut here\n";
        assert_eq!(strip(src, Dialect::CStyle), "a(\"x // y\", b);\n");

        // A rejected URL candidate does not block a later real one.
        let src = "u = x:// + 1 // cut\n";
        assert_eq!(strip(src, Dialect::CStyle), "u = x:// + 1\n");
    }
}

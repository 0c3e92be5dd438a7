//! Comment removal ahead of tokenizing.

/// Blank out `/* */` and `//` comments, keeping every newline.
///
/// Comments are replaced by spaces so token positions and line numbers in the
/// result match the input. Quoted strings are left alone. A `//` only opens
/// a line comment at the start of the text or after whitespace, `;`, `{` or
/// `}`, so `file:///x` and `/usr/share//icons` stay intact. An unterminated
/// block comment runs to the end of the text.
pub(crate) fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                let mut last = '\0';
                for n in chars.by_ref() {
                    out.push(if n == '\n' { '\n' } else { ' ' });
                    if last == '*' && n == '/' {
                        break;
                    }
                    last = n;
                }
            }
            '/' if chars.peek() == Some(&'/') && opens_line_comment(prev) => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    out.push(' ');
                    chars.next();
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                out.push_str("//");
                prev = Some('/');
                continue;
            }
            _ => out.push(c),
        }
        prev = Some(c);
    }

    out
}

fn opens_line_comment(prev: Option<char>) -> bool {
    prev.is_none_or(|c| c.is_whitespace() || matches!(c, ';' | '{' | '}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_comments_keep_lines() {
        let text = "a /* one\ntwo */ b";
        let stripped = strip_comments(text);
        assert_eq!(stripped.len(), text.len());
        assert_eq!(stripped.lines().count(), 2);
        assert!(!stripped.contains("one"));
        assert!(stripped.ends_with(" b"));
    }

    #[test]
    fn line_comments() {
        assert_eq!(strip_comments("a: 1; // note\nb"), "a: 1;        \nb");
    }

    #[test]
    fn quotes_and_urls_survive() {
        let text = "icon: \"/* not */\"; path: file:///tmp/x;";
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn slashes_inside_values_are_kept() {
        let text = ".a { icon: /usr/share//icons/x.png; }";
        assert_eq!(strip_comments(text), text);
        assert_eq!(strip_comments(".a { p: 1;// note\n}"), ".a { p: 1;       \n}");
        assert_eq!(strip_comments("// top\nb").trim(), "b");
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        assert_eq!(strip_comments("a /* b").trim(), "a");
    }
}

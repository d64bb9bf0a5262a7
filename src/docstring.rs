//! Turning Python string literals into docstring text.

const TAB_SIZE: usize = 8;

/// Decodes the source text of a single Python string literal.
///
/// Returns `None` for literals that cannot be docstrings: bytes, f-strings,
/// t-strings, or text that is not a well formed literal.
pub fn decode_literal(literal: &str) -> Option<String> {
    let quote_start = literal.find(&['"', '\''][..])?;
    let prefix = literal[..quote_start].to_ascii_lowercase();

    if prefix.chars().any(|c| !matches!(c, 'r' | 'u' | 'b' | 'f' | 't')) {
        return None;
    }
    if prefix.contains(&['b', 'f', 't'][..]) {
        return None;
    }

    let body = &literal[quote_start..];
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| body.len() >= q.len() * 2 && body.starts_with(q) && body.ends_with(q))?;
    let inner = &body[quote.len()..body.len() - quote.len()];

    if prefix.contains('r') {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

/// Processes backslash escapes the way the Python tokenizer does for
/// non-raw `str` literals. Unknown escapes are kept verbatim.
fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                push_code_point(&mut out, value, &format!("\\{next}"));
            }
            'x' => push_hex(&mut out, &mut chars, 'x', 2),
            'u' => push_hex(&mut out, &mut chars, 'u', 4),
            'U' => push_hex(&mut out, &mut chars, 'U', 8),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_hex(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    marker: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }

    let original = format!("\\{marker}{digits}");
    if digits.len() != width {
        out.push_str(&original);
        return;
    }
    match u32::from_str_radix(&digits, 16) {
        Ok(value) => push_code_point(out, value, &original),
        Err(_) => out.push_str(&original),
    }
}

fn push_code_point(out: &mut String, value: u32, original: &str) {
    match char::from_u32(value) {
        Some(c) => out.push(c),
        None => out.push_str(original),
    }
}

/// Normalizes docstring indentation like `inspect.cleandoc`.
///
/// Tabs are expanded, the first line loses its leading whitespace, the
/// common indentation of the remaining lines is removed, and blank lines at
/// either end are dropped.
pub fn clean(doc: &str) -> String {
    let lines: Vec<String> = doc.lines().map(expand_tabs).collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let mut cleaned = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        cleaned.push(line.chars().skip(margin).collect::<String>());
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let first_content = cleaned
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(cleaned.len());

    cleaned[first_content..].join("\n")
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + TAB_SIZE);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

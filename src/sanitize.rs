//! Makes hand-written assembly lines safe for the external assembler:
//! symbol characters it cannot take become `_`, registers, address syntax
//! and labels survive, and `;` comments become `#` comments.

/// A source line split into its parts. `comment` keeps its delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statement<'a> {
    pub label: Option<&'a str>,
    pub mnemonic: Option<&'a str>,
    pub operands: Option<&'a str>,
    pub comment: Option<&'a str>,
}

/// Byte index of the comment delimiter (`#` or `;`) outside string literals.
fn comment_start(line: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

/// Byte index of the first `:` outside parentheses and string literals.
fn label_end(body: &str) -> Option<usize> {
    let mut quoted = false;
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ':' if !quoted && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

pub fn split(line: &str) -> Statement<'_> {
    let (body, comment) = match comment_start(line) {
        Some(i) => (&line[..i], Some(&line[i..])),
        None => (line, None),
    };
    let body = body.trim();
    let mut st = Statement { comment, ..Default::default() };
    if body.is_empty() {
        return st;
    }
    let body = match label_end(body) {
        Some(i) => {
            st.label = Some(body[..i].trim_end());
            body[i + 1..].trim()
        }
        None => body,
    };
    if body.is_empty() {
        return st;
    }
    match body.split_once(char::is_whitespace) {
        Some((m, rest)) => {
            st.mnemonic = Some(m);
            let rest = rest.trim();
            st.operands = (!rest.is_empty()).then_some(rest);
        }
        None => st.mnemonic = Some(body),
    }
    st
}

fn normalize_comment(comment: &str) -> String {
    match comment.strip_prefix(';') {
        Some(rest) => format!("#{rest}"),
        None => comment.to_string(),
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\n' | '@' | '.' | '"' | '\'' | ';' | '#')
}

/// Contains a `c`/`r`/`f` immediately followed by a digit (r3, f12, cr7).
fn is_register(token: &str) -> bool {
    token.as_bytes().windows(2).any(|w| matches!(w[0], b'c' | b'r' | b'f') && w[1].is_ascii_digit())
}

/// Split operands on commas and whitespace. Parenthesized groups and string
/// literals stay inside a single token.
fn tokenize(operands: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, c) in operands.char_indices() {
        let separator = !quoted && depth == 0 && (c == ',' || c.is_whitespace());
        if separator {
            if let Some(s) = start.take() {
                tokens.push(&operands[s..i]);
            }
            continue;
        }
        start.get_or_insert(i);
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted && depth > 0 => depth -= 1,
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(&operands[s..]);
    }
    tokens
}

/// Replace characters the assembler rejects in a symbol expression with
/// `_`. Balanced parentheses and string literals are kept; separators
/// inside a group are replaced as well.
fn sanitize_token(token: &str) -> String {
    let mut depth = 0usize;
    let mut quoted = false;
    token
        .chars()
        .map(|c| match c {
            '"' => {
                quoted = !quoted;
                c
            }
            _ if quoted => c,
            '(' => {
                depth += 1;
                c
            }
            ')' if depth > 0 => {
                depth -= 1;
                c
            }
            c if is_symbol_char(c) => c,
            _ => '_',
        })
        .collect()
}

fn sanitize_operands(operands: &str) -> String {
    tokenize(operands)
        .into_iter()
        .map(|tok| {
            if matches!(tok, "==" | "||" | "&&") || is_register(tok) {
                tok.to_string()
            } else {
                sanitize_token(tok)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Branches and directives take symbol operands; conditionals and `.else`
/// are left to the assembler.
fn takes_symbols(mnemonic: &str) -> bool {
    mnemonic.starts_with(['b', '.']) && mnemonic != ".else" && !mnemonic.contains("if")
}

/// A `(` right after a symbol character reads as an existing label
/// expression, which is left untouched.
fn is_label_expression(operands: &str) -> bool {
    match operands.find('(') {
        Some(0) => true,
        Some(i) => !operands[..i].ends_with(['+', '-', '*', '/', '^', '|', '&', ' ', '\t']),
        None => false,
    }
}

fn symbolic(mnemonic: &str, operands: &str) -> bool {
    takes_symbols(mnemonic) && !is_label_expression(operands)
}

/// Mnemonic and operands, with symbol operands sanitized.
fn statement(mnemonic: &str, operands: Option<&str>) -> String {
    match operands {
        Some(ops) if symbolic(mnemonic, ops) => format!("{mnemonic} {}", sanitize_operands(ops)),
        Some(ops) => format!("{mnemonic} {ops}"),
        None => mnemonic.to_string(),
    }
}

/// Sanitize one line of assembly. Idempotent.
pub fn sanitize(line: &str) -> String {
    let line = line.trim_end();
    let st = split(line);
    let comment = st.comment.map(normalize_comment);
    let indent = &line[..line.len() - line.trim_start().len()];
    let with_comment = |text: String| match &comment {
        Some(c) => format!("{text} {c}"),
        None => text,
    };

    if let Some(label) = st.label {
        let label = format!("{indent}{}:", sanitize_token(label).replace(['(', ')'], "_"));
        return with_comment(match st.mnemonic {
            Some(mnemonic) => format!("{label} {}", statement(mnemonic, st.operands)),
            None => label,
        });
    }
    if let (Some(mnemonic), Some(operands)) = (st.mnemonic, st.operands) {
        if symbolic(mnemonic, operands) {
            return with_comment(format!("{indent}{}", statement(mnemonic, Some(operands))));
        }
    }
    match (comment_start(line), comment) {
        (Some(i), Some(c)) => format!("{}{c}", &line[..i]),
        _ => line.to_string(),
    }
}

/// Sanitize every line of a source text.
pub fn sanitize_source(source: &str) -> String {
    source.lines().map(sanitize).collect::<Vec<_>>().join("\n")
}

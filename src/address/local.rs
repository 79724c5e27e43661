/// Dot-atom: atext ASCII + '.' non initial/terminal, pas de ".."
pub(crate) fn is_dot_atom(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| c == '.' || is_atext(c))
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// Quoted-string spanning the whole local part. Content is printable ASCII
/// (space included); `"` and `\` only appear as quoted-pairs.
pub(crate) fn check_quoted(s: &str) -> Result<(), &'static str> {
    let inner = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| s.len() >= 2)
        .ok_or("quoted local part must start and end with '\"'")?;

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if escaped == ' ' || escaped.is_ascii_graphic() => {}
                _ => return Err("dangling or invalid escape in quoted local part"),
            },
            '"' => return Err("unescaped '\"' inside quoted local part"),
            c if c == ' ' || c == '\t' || c.is_ascii_graphic() => {}
            _ => return Err("quoted local part contains non-printable characters"),
        }
    }
    Ok(())
}

/// Valide la partie locale et pousse les raisons dans `reasons`.
pub(crate) fn check_local(local: &str, reasons: &mut Vec<String>) {
    if local.is_empty() {
        reasons.push("local part is empty".to_string());
        return;
    }
    if local.len() > 64 {
        reasons.push(format!("local part length {} > 64", local.len()));
    }
    if local.starts_with('"') {
        if let Err(reason) = check_quoted(local) {
            reasons.push(reason.to_string());
        }
    } else if local.contains('"') {
        reasons.push("malformed quoting in local part".to_string());
    } else if !is_dot_atom(local) {
        reasons.push("invalid local part".to_string());
    }
}

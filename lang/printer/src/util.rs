/// Whether a label can be printed without quotes.
///
/// Plain labels start with an ASCII alphanumeric character or `_` and continue with
/// alphanumerics, `_`, `?` or `!`.
pub fn is_plain_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '!'))
}

/// The printed form of a field label, quoted with `'` unless it is plain.
///
/// Inside quotes, `\\` and `'` are escaped with a backslash, so distinct labels never
/// print alike.
pub fn label_text(label: &str) -> String {
    if is_plain_label(label) {
        return label.to_owned();
    }
    let mut out = String::with_capacity(label.len() + 2);
    out.push('\'');
    for c in label.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;

use crate::code::{Code, is_builtin};
use crate::minimize::Codes;
use crate::result::{CodeError, CodeResult};

/// The canonical serialization of the code graph reachable from `root`.
///
/// Codes are visited breadth-first from `root`. Every newly discovered non-builtin
/// reference gets the next id `C0, C1, ...`, builtins are written verbatim. Each code
/// becomes one definition `$Ci=...;`, with fields sorted by label:
///
/// ```text
/// $C0=<C1"succ",C2"zero">;$C1=<C1"succ",C2"zero">;...
/// ```
///
/// Unions are written `<...>`, products `{...}` and vectors `[Cj]`. Labels are quoted as
/// JSON strings. The result depends neither on the names in `codes` nor on the order in
/// which fields were declared. A builtin root encodes as its own name.
pub fn encode_code_to_string<'c>(root: &'c str, codes: &'c Codes) -> CodeResult<String> {
    if is_builtin(root) {
        return Ok(root.to_owned());
    }

    let mut ids: BTreeMap<&'c str, usize> = BTreeMap::from([(root, 0)]);
    let mut queue: VecDeque<&'c str> = VecDeque::from([root]);
    let mut out = String::new();

    while let Some(name) = queue.pop_front() {
        let code = codes.get(name).ok_or_else(|| CodeError::unknown(name, None))?;
        let id = ids[name];
        let mut token = |r: &'c str| -> String {
            if is_builtin(r) {
                return r.to_owned();
            }
            let next = ids.len();
            let id = *ids.entry(r).or_insert_with(|| {
                queue.push_back(r);
                next
            });
            format!("C{id}")
        };
        match code {
            Code::Vector(elem) => {
                let elem = token(elem);
                let _ = write!(out, "$C{id}=[{elem}];");
            }
            Code::Product(fields) | Code::Union(fields) => {
                let elems: Vec<String> = fields
                    .iter()
                    .map(|(label, r)| format!("{}{}", token(r), quote(label)))
                    .collect();
                let (open, close) = if matches!(code, Code::Union(_)) { ('<', '>') } else { ('{', '}') };
                let _ = write!(out, "$C{id}={open}{}{close};", elems.join(","));
            }
        }
    }

    Ok(out)
}

fn quote(label: &str) -> String {
    serde_json::Value::String(label.to_owned()).to_string()
}

const MULTIPLIER: u128 = 31;
const MODULUS: u128 = 9_007_199_254_740_881;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Content hash of a canonical string.
///
/// A polynomial rolling hash over the UTF-16 code units of the input, reduced modulo
/// [MODULUS] after every step. Intermediate values stay below 2^60, so the arithmetic is
/// exact. The value is written in base 36 and every digit is passed through [cipher],
/// which makes the result a valid identifier.
///
/// An input of the form `$C0=...;` is reduced to the part between `=` and `;` first.
pub fn hash(input: &str) -> String {
    let content = unwrap_definition(input);
    let value = content
        .encode_utf16()
        .fold(0u128, |acc, unit| (acc * MULTIPLIER + u128::from(unit)) % MODULUS);
    to_base36(value).chars().map(cipher).collect()
}

fn unwrap_definition(input: &str) -> &str {
    input
        .strip_prefix("$C0=")
        .and_then(|rest| rest.strip_suffix(';'))
        .filter(|inner| !inner.contains(['\n', '\r', '\u{2028}', '\u{2029}']))
        .unwrap_or(input)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|d| *d as char).collect()
}

/// `0-9` become `A-J`, `a-p` become `K-Z`, `q-z` stay.
fn cipher(digit: char) -> char {
    match digit {
        '0'..='9' => (b'A' + (digit as u8 - b'0')) as char,
        'a'..='p' => (b'K' + (digit as u8 - b'a')) as char,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::code::Fields;

    fn fields(entries: &[(&str, &str)]) -> Fields {
        entries.iter().map(|(l, r)| (l.to_string(), r.to_string())).collect()
    }

    #[test]
    fn encodes_breadth_first() {
        let codes: Codes = [
            ("nat".to_owned(), Code::Union(fields(&[("zero", "unit"), ("succ", "nat")]))),
            ("unit".to_owned(), Code::unit()),
            ("list".to_owned(), Code::Vector("nat".to_owned())),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            encode_code_to_string("list", &codes).unwrap(),
            r#"$C0=[C1];$C1=<C1"succ",C2"zero">;$C2={};"#
        );
        assert_eq!(encode_code_to_string("@int", &codes).unwrap(), "@int");
    }

    #[test]
    fn encoding_ignores_names() {
        let left: Codes = [
            ("a".to_owned(), Code::Product(fields(&[("x", "@int"), ("y", "b")]))),
            ("b".to_owned(), Code::Vector("a".to_owned())),
        ]
        .into_iter()
        .collect();
        let right: Codes = [
            ("p".to_owned(), Code::Product(fields(&[("y", "q"), ("x", "@int")]))),
            ("q".to_owned(), Code::Vector("p".to_owned())),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            encode_code_to_string("a", &left).unwrap(),
            encode_code_to_string("p", &right).unwrap()
        );
    }

    #[test]
    fn quotes_labels_as_json() {
        let codes: Codes =
            [("a".to_owned(), Code::Product(fields(&[("a \"b\"", "@int")])))].into_iter().collect();
        assert_eq!(encode_code_to_string("a", &codes).unwrap(), r#"$C0={@int"a \"b\""};"#);
    }

    #[test]
    fn hash_alphabet() {
        assert_eq!(hash(""), "A");
        // 'a' is 97 = 2 * 36 + 25
        assert_eq!(hash("a"), "CZ");
        assert!(hash("{}").chars().all(|c| c.is_ascii_uppercase() || ('q'..='z').contains(&c)));
    }

    #[test]
    fn hash_unwraps_single_definition() {
        assert_eq!(hash("$C0={};"), hash("{}"));
        assert_ne!(hash("$C1={};"), hash("{}"));
    }

    #[test]
    fn hash_stays_exact_on_long_inputs() {
        let long = "x".repeat(10_000);
        // Values stay below the modulus, which has 11 digits in base 36
        assert!(hash(&long).len() <= 11);
        assert_ne!(hash(&long), hash(&"x".repeat(10_001)));
    }
}

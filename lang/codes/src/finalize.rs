use std::collections::BTreeMap;

use crate::code::Code;
use crate::encode::{encode_code_to_string, hash};
use crate::minimize::{Codes, Representatives, UNIT, minimize, normalize_all};
use crate::result::{CodeError, CodeResult};

/// A code map keyed by canonical names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    /// Canonical name to code. References are canonical names or builtins.
    pub codes: Codes,
    /// Every input name, and [UNIT], to its canonical name
    pub representatives: Representatives,
}

/// Give every code of `codes` its canonical name.
///
/// The codes are minimized and normalized against the local representatives. Each
/// remaining representative is named by the hash of its canonical encoding, and the
/// codes are rebuilt under these names with all references rewritten to them.
pub fn finalize(codes: &Codes) -> CodeResult<Finalized> {
    let mut codes = codes.clone();
    codes.entry(UNIT.to_owned()).or_insert_with(Code::unit);

    let partition = minimize(&codes)?;
    let local = normalize_all(&codes, &partition.representatives);

    let mut global: BTreeMap<&str, String> = BTreeMap::new();
    let mut owner: BTreeMap<String, &str> = BTreeMap::new();
    for rep in local.keys() {
        let name = hash(&encode_code_to_string(rep, &local)?);
        if let Some(other) = owner.insert(name.clone(), rep) {
            return Err(CodeError::impossible(format!(
                "{other} and {rep} are different codes with the same hash {name}"
            )));
        }
        global.insert(rep, name);
    }

    let to_global = |r: &str| global.get(r).cloned().unwrap_or_else(|| r.to_owned());
    let canonical: Codes =
        local.iter().map(|(rep, code)| (to_global(rep), code.map_refs(to_global))).collect();
    let representatives: Representatives =
        partition.representatives.iter().map(|(name, rep)| (name.clone(), to_global(rep))).collect();

    log::debug!("Finalized {} codes into {} canonical codes", codes.len(), canonical.len());
    Ok(Finalized { codes: canonical, representatives })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::code::Fields;

    fn fields(entries: &[(&str, &str)]) -> Fields {
        entries.iter().map(|(l, r)| (l.to_string(), r.to_string())).collect()
    }

    fn nat() -> Codes {
        [
            ("A".to_owned(), Code::Union(fields(&[("zero", "UNIT"), ("succ", "A")]))),
            ("UNIT".to_owned(), Code::unit()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn finalize_is_idempotent() {
        let once = finalize(&nat()).unwrap();
        let twice = finalize(&once.codes).unwrap();
        assert_eq!(once.codes, twice.codes);
        for name in once.codes.keys() {
            assert_eq!(&twice.representatives[name], name);
        }
    }

    #[test]
    fn unit_hashes_like_its_content() {
        let finalized = finalize(&Codes::new()).unwrap();
        assert_eq!(finalized.representatives[UNIT], hash(UNIT));
        assert_eq!(finalized.codes.len(), 1);
    }

    #[test]
    fn unit_is_stable_when_nested() {
        let alone = finalize(&Codes::new()).unwrap();
        let nested = finalize(&nat()).unwrap();
        assert_eq!(alone.representatives[UNIT], nested.representatives["UNIT"]);
        assert_eq!(nested.representatives[UNIT], nested.representatives["UNIT"]);
    }

    #[test]
    fn references_become_canonical() {
        let finalized = finalize(&nat()).unwrap();
        let a = &finalized.representatives["A"];
        let unit = &finalized.representatives["UNIT"];
        assert_eq!(finalized.codes.len(), 2);
        assert_eq!(finalized.codes[a], Code::Union(fields(&[("zero", unit.as_str()), ("succ", a.as_str())])));
    }
}

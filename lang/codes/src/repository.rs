use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::code::{Code, CodeDecl, Decl, is_builtin};
use crate::encode::hash;
use crate::finalize::finalize;
use crate::minimize::{Codes, Representatives, UNIT};
use crate::result::{CodeError, CodeResult};

/// The answer of [Repository::find]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    Code(Code),
    Builtin(String),
    Undefined,
}

impl CodeLookup {
    pub fn code(self) -> Option<Code> {
        match self {
            CodeLookup::Code(code) => Some(code),
            _ => None,
        }
    }
}

/// The store of canonical codes.
///
/// Entries are keyed by canonical name and never change once added. No two entries are
/// structurally equal. The repository also remembers the canonical name of every local
/// name it has been given.
#[derive(Debug, Clone)]
pub struct Repository {
    codes: Codes,
    aliases: Representatives,
    unit: String,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    /// A repository containing only the unit `{}`.
    pub fn new() -> Self {
        // The unit encodes as `$C0={};`, which hashes like `{}`
        let unit = hash(UNIT);
        Repository {
            codes: Codes::from([(unit.clone(), Code::unit())]),
            aliases: Representatives::from([(UNIT.to_owned(), unit.clone())]),
            unit,
        }
    }

    /// Forget everything except the unit.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The canonical name of `{}`
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The canonical entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Code)> {
        self.codes.iter()
    }

    /// The canonical name of `name`, which may be a builtin, a canonical name or a
    /// previously registered local name.
    pub fn canonical<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if is_builtin(name) || self.codes.contains_key(name) {
            return Some(name);
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Look up a code by canonical or local name. The code is returned by value.
    pub fn find(&self, name: &str) -> CodeLookup {
        match self.canonical(name) {
            Some(canonical) if is_builtin(canonical) => CodeLookup::Builtin(canonical.to_owned()),
            Some(canonical) => {
                self.codes.get(canonical).cloned().map(CodeLookup::Code).unwrap_or(CodeLookup::Undefined)
            }
            None => CodeLookup::Undefined,
        }
    }

    /// Register parsed declarations and return the canonical name of each of them.
    pub fn register(&mut self, decls: &BTreeMap<String, CodeDecl>) -> CodeResult<Representatives> {
        let mut codes = Codes::new();
        let mut builtins = Representatives::new();
        for (name, decl) in decls {
            match decl.check(name)? {
                Decl::Builtin(builtin) => {
                    builtins.insert(name.clone(), builtin);
                }
                Decl::Code(code) => {
                    codes.insert(name.clone(), code);
                }
            }
        }
        self.register_with(codes, builtins)
    }

    /// Register codes whose references are builtins, names in `codes` or names known
    /// to the repository.
    pub fn register_codes(&mut self, codes: Codes) -> CodeResult<Representatives> {
        self.register_with(codes, Representatives::new())
    }

    fn register_with(&mut self, codes: Codes, builtins: Representatives) -> CodeResult<Representatives> {
        let mut merged = self.codes.clone();
        for (name, code) in &codes {
            if self.codes.contains_key(name) || name == UNIT {
                return Err(CodeError::malformed(name, "the name is reserved for a canonical code"));
            }
            let resolve = |r: &str| -> CodeResult<String> {
                if codes.contains_key(r) {
                    return Ok(r.to_owned());
                }
                if let Some(builtin) = builtins.get(r) {
                    return Ok(builtin.clone());
                }
                self.canonical(r).map(ToOwned::to_owned).ok_or_else(|| CodeError::unknown(r, Some(name.as_str())))
            };
            merged.insert(name.clone(), code.try_map_refs(resolve)?);
        }

        let finalized = finalize(&merged)?;
        let mut added = 0;
        for (name, code) in finalized.codes {
            match self.codes.entry(name) {
                Entry::Vacant(entry) => {
                    log::trace!("New canonical code {}", entry.key());
                    entry.insert(code);
                    added += 1;
                }
                Entry::Occupied(entry) if *entry.get() != code => {
                    return Err(CodeError::impossible(format!(
                        "canonical code {} changed its structure",
                        entry.key()
                    )));
                }
                Entry::Occupied(_) => {}
            }
        }

        let mut representatives = builtins;
        for name in codes.keys() {
            let canonical = finalized
                .representatives
                .get(name)
                .ok_or_else(|| CodeError::impossible(format!("{name} lost its representative")))?;
            representatives.insert(name.clone(), canonical.clone());
        }
        self.aliases.extend(representatives.iter().map(|(n, c)| (n.clone(), c.clone())));

        log::debug!("Registered {} names, {} new canonical codes", representatives.len(), added);
        Ok(representatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::code::Fields;

    fn decls(json: &str) -> BTreeMap<String, CodeDecl> {
        serde_json::from_str(json).unwrap()
    }

    fn fields(entries: &[(&str, &str)]) -> Fields {
        entries.iter().map(|(l, r)| (l.to_string(), r.to_string())).collect()
    }

    const NAT: &str = r#"{
        "A": { "code": "union", "union": { "zero": "UNIT", "succ": "A" } },
        "UNIT": { "code": "product", "product": {} }
    }"#;

    #[test]
    fn end_to_end_nat() {
        let mut repo = Repository::new();
        let reps = repo.register(&decls(NAT)).unwrap();

        assert_eq!(repo.len(), 2);
        assert_eq!(reps["UNIT"], repo.unit());
        let a = &reps["A"];
        assert_eq!(
            repo.find(a),
            CodeLookup::Code(Code::Union(fields(&[("zero", repo.unit()), ("succ", a.as_str())])))
        );
        assert_eq!(repo.find("A"), repo.find(a));
    }

    #[test]
    fn renaming_invariance() {
        let renamed = r#"{
            "nat": { "code": "union", "union": { "succ": "nat", "zero": "one" } },
            "one": { "code": "product", "product": {} }
        }"#;
        let mut left = Repository::new();
        let mut right = Repository::new();
        let left_reps = left.register(&decls(NAT)).unwrap();
        let right_reps = right.register(&decls(renamed)).unwrap();

        assert_eq!(left_reps["A"], right_reps["nat"]);
        assert!(left.iter().eq(right.iter()));
    }

    #[test]
    fn structural_collapse() {
        let mut repo = Repository::new();
        let reps = repo
            .register(&decls(
                r#"{
                    "A": { "code": "union", "union": { "x": "U", "y": "A" } },
                    "B": { "code": "union", "union": { "x": "U", "y": "B" } },
                    "U": { "code": "product", "product": {} }
                }"#,
            ))
            .unwrap();
        assert_eq!(reps["A"], reps["B"]);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn registration_is_monotonic_and_stable() {
        let mut repo = Repository::new();
        let unit = repo.unit().to_owned();
        let first = repo.register(&decls(NAT)).unwrap();
        let second = repo
            .register(&decls(
                r#"{
                    "N": { "code": "union", "union": { "zero": "E", "succ": "N" } },
                    "E": { "code": "product", "product": {} },
                    "L": { "code": "vector", "vector": "A" }
                }"#,
            ))
            .unwrap();
        assert_eq!(first["A"], second["N"]);
        assert_eq!(second["E"], unit);
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.find(&second["L"]), CodeLookup::Code(Code::Vector(first["A"].clone())));
        assert_eq!(repo.unit(), unit);
    }

    #[test]
    fn registering_canonical_codes_is_a_no_op() {
        let mut repo = Repository::new();
        repo.register(&decls(NAT)).unwrap();
        let before: Vec<_> = repo.iter().map(|(n, c)| (n.clone(), c.clone())).collect();

        let mut again = Repository::new();
        let err = again.register_codes(before.iter().cloned().collect()).unwrap_err();
        assert!(matches!(*err, CodeError::MalformedCode { .. }));

        let local: Codes = before.iter().map(|(n, c)| (format!("copy of {n}"), c.clone())).collect();
        let reps = repo.register_codes(local).unwrap();
        assert_eq!(repo.iter().count(), before.len());
        for (name, _) in &before {
            assert_eq!(&reps[&format!("copy of {name}")], name);
        }
    }

    #[test]
    fn builtins_bypass_the_repository() {
        let mut repo = Repository::new();
        let reps = repo
            .register(&decls(
                r#"{ "int": "@int", "pair": { "code": "product", "product": { "a": "int", "b": "@int" } } }"#,
            ))
            .unwrap();
        assert_eq!(reps["int"], "@int");
        assert_eq!(repo.find("int"), CodeLookup::Builtin("@int".to_owned()));
        assert_eq!(repo.find("@bits"), CodeLookup::Builtin("@bits".to_owned()));
        assert_eq!(
            repo.find(&reps["pair"]),
            CodeLookup::Code(Code::Product(fields(&[("a", "@int"), ("b", "@int")])))
        );
    }

    #[test]
    fn unknown_references_fail() {
        let mut repo = Repository::new();
        let err = repo
            .register(&decls(r#"{ "L": { "code": "vector", "vector": "missing" } }"#))
            .unwrap_err();
        assert!(matches!(*err, CodeError::UnknownCode { ref name, .. } if name == "missing"));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find("nothing"), CodeLookup::Undefined);
    }

    #[test]
    fn reset_keeps_only_the_unit() {
        let mut repo = Repository::new();
        repo.register(&decls(NAT)).unwrap();
        repo.reset();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find("A"), CodeLookup::Undefined);
        assert_eq!(repo.find("{}"), CodeLookup::Code(Code::unit()));
    }
}

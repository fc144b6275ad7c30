use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::code::{Code, Fields, is_builtin};
use crate::result::{CodeError, CodeResult};

/// Name to code
pub type Codes = BTreeMap<String, Code>;
/// Name to the name standing for its equivalence class
pub type Representatives = BTreeMap<String, String>;

/// The local name of the empty product, which anchors the initial partition.
pub const UNIT: &str = "{}";

/// The result of [minimize]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Anchor to all members of its class, in name order
    pub classes: BTreeMap<String, Vec<String>>,
    /// Every name to the anchor of its class
    pub representatives: Representatives,
}

/// Check that every reference of `codes` is a builtin, [UNIT] or a name in `codes`.
pub fn check_references(codes: &Codes) -> CodeResult {
    for (name, code) in codes {
        if let Some(missing) =
            code.refs().find(|r| !is_builtin(r) && r.as_str() != UNIT && !codes.contains_key(*r))
        {
            return Err(CodeError::unknown(missing, Some(name.as_str())));
        }
    }
    Ok(())
}

/// Partition the names of `codes` into classes of structurally equivalent codes.
///
/// Every name starts out in the class anchored at [UNIT]. A class is refined by
/// comparing each member against its anchor under the current representatives; the
/// members that differ move into a new class anchored at the first of them. Whenever
/// a name changes class, the classes of all names referring to it are scheduled again,
/// so the refinement ends once no scheduled class splits.
///
/// [UNIT] is added to the partition if `codes` lacks it.
pub fn minimize(codes: &Codes) -> CodeResult<Partition> {
    check_references(codes)?;
    let unit = Code::unit();
    let code_of = |name: &str| lookup(codes, &unit, name);

    let mut names: Vec<&str> = codes.keys().map(String::as_str).collect();
    if !codes.contains_key(UNIT) {
        names.push(UNIT);
        names.sort();
    }

    let mut referrers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &name in &names {
        for r in code_of(name).refs() {
            referrers.entry(r.as_str()).or_default().push(name);
        }
    }

    let mut representatives: Representatives =
        names.iter().map(|name| (name.to_string(), UNIT.to_owned())).collect();
    let mut classes: BTreeMap<String, Vec<String>> =
        BTreeMap::from([(UNIT.to_owned(), names.iter().map(|n| n.to_string()).collect())]);
    let mut worklist: VecDeque<String> = VecDeque::from([UNIT.to_owned()]);
    let mut scheduled: BTreeSet<String> = BTreeSet::from([UNIT.to_owned()]);

    while let Some(anchor) = worklist.pop_front() {
        scheduled.remove(&anchor);
        let Some(members) = classes.remove(&anchor) else {
            return Err(CodeError::impossible(format!("class {anchor} vanished")));
        };
        let anchor_code = code_of(&anchor);
        let (same, moved): (Vec<String>, Vec<String>) = members
            .into_iter()
            .partition(|member| !differ(anchor_code, code_of(member.as_str()), &representatives));
        classes.insert(anchor.clone(), same);

        let Some(new_anchor) = moved.first().cloned() else {
            continue;
        };
        log::trace!("Split {} members off class {anchor} into {new_anchor}", moved.len());
        for member in &moved {
            representatives.insert(member.clone(), new_anchor.clone());
        }

        let mut schedule = |class: String| {
            if scheduled.insert(class.clone()) {
                worklist.push_back(class);
            }
        };
        schedule(anchor);
        schedule(new_anchor.clone());
        for member in &moved {
            for referrer in referrers.get(member.as_str()).into_iter().flatten() {
                schedule(representatives[*referrer].clone());
            }
        }
        classes.insert(new_anchor, moved);
    }

    log::debug!("Minimized {} codes into {} classes", names.len(), classes.len());
    Ok(Partition { classes, representatives })
}

fn lookup<'c>(codes: &'c Codes, unit: &'c Code, name: &str) -> &'c Code {
    codes.get(name).unwrap_or(unit)
}

/// Whether two codes differ under the current representatives.
fn differ(lhs: &Code, rhs: &Code, reps: &Representatives) -> bool {
    match (lhs, rhs) {
        (Code::Product(l), Code::Product(r)) | (Code::Union(l), Code::Union(r)) => {
            l.len() != r.len()
                || l.iter().any(|(label, lref)| {
                    r.get(label).is_none_or(|rref| rep(reps, lref) != rep(reps, rref))
                })
        }
        (Code::Vector(l), Code::Vector(r)) => rep(reps, l) != rep(reps, r),
        _ => true,
    }
}

fn rep<'r>(reps: &'r Representatives, name: &'r String) -> &'r String {
    reps.get(name).unwrap_or(name)
}

/// Rewrite the references of `fields` to their representatives.
pub fn normalize(fields: &Fields, reps: &Representatives) -> Fields {
    fields.iter().map(|(label, r)| (label.clone(), reps.get(r).unwrap_or(r).clone())).collect()
}

/// Keep one code per class, keyed by its representative, with all references rewritten
/// to representatives.
pub fn normalize_all(codes: &Codes, reps: &Representatives) -> Codes {
    codes
        .iter()
        .filter(|(name, _)| reps.get(*name).is_none_or(|rep| rep == *name))
        .map(|(name, code)| {
            let code = match code {
                Code::Product(fields) => Code::Product(normalize(fields, reps)),
                Code::Union(fields) => Code::Union(normalize(fields, reps)),
                Code::Vector(elem) => Code::Vector(reps.get(elem).unwrap_or(elem).clone()),
            };
            (name.clone(), code)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entries: &[(&str, &str)]) -> Fields {
        entries.iter().map(|(l, r)| (l.to_string(), r.to_string())).collect()
    }

    fn codes(entries: Vec<(&str, Code)>) -> Codes {
        entries.into_iter().map(|(n, c)| (n.to_owned(), c)).collect()
    }

    #[test]
    fn collapses_isomorphic_recursion() {
        let codes = codes(vec![
            ("A", Code::Union(fields(&[("x", "{}"), ("y", "A")]))),
            ("B", Code::Union(fields(&[("x", "{}"), ("y", "B")]))),
            ("{}", Code::unit()),
        ]);
        let partition = minimize(&codes).unwrap();
        assert_eq!(partition.representatives["A"], partition.representatives["B"]);
        assert_eq!(partition.representatives["{}"], UNIT);
        assert_eq!(partition.classes.len(), 2);
    }

    #[test]
    fn separates_by_shared_field() {
        let codes = codes(vec![
            ("A", Code::Product(fields(&[("x", "@int")]))),
            ("B", Code::Product(fields(&[("x", "@bool")]))),
            ("C", Code::Product(fields(&[("x", "@int")]))),
            ("L", Code::Vector("A".into())),
            ("M", Code::Vector("B".into())),
        ]);
        let partition = minimize(&codes).unwrap();
        let reps = &partition.representatives;
        assert_eq!(reps["A"], reps["C"]);
        assert_ne!(reps["A"], reps["B"]);
        assert_ne!(reps["L"], reps["M"]);
        assert_ne!(reps["A"], UNIT);
    }

    #[test]
    fn distinguishes_constructors_and_arity() {
        let codes = codes(vec![
            ("P", Code::Product(fields(&[("a", "{}"), ("b", "{}")]))),
            ("U", Code::Union(fields(&[("a", "{}"), ("b", "{}")]))),
            ("Q", Code::Product(fields(&[("a", "{}")]))),
            ("E", Code::Union(Fields::new())),
        ]);
        let partition = minimize(&codes).unwrap();
        assert_eq!(partition.classes.len(), 5);
    }

    #[test]
    fn unit_is_always_known() {
        let codes = codes(vec![("A", Code::Vector("{}".into()))]);
        assert!(check_references(&codes).is_ok());
        let partition = minimize(&codes).unwrap();
        assert_ne!(partition.representatives["A"], UNIT);
        assert_eq!(partition.representatives[UNIT], UNIT);
    }

    #[test]
    fn unrolled_streams_are_equivalent() {
        // S = {S next}, T = {T' next}, T' = {T next}
        let codes = codes(vec![
            ("S", Code::Product(fields(&[("next", "S")]))),
            ("T", Code::Product(fields(&[("next", "U")]))),
            ("U", Code::Product(fields(&[("next", "T")]))),
        ]);
        let reps = minimize(&codes).unwrap().representatives;
        assert_eq!(reps["S"], reps["T"]);
        assert_eq!(reps["T"], reps["U"]);
    }

    #[test]
    fn reports_unknown_references() {
        let codes = codes(vec![("A", Code::Vector("B".into()))]);
        let err = minimize(&codes).unwrap_err();
        assert_eq!(*err, CodeError::UnknownCode { name: "B".into(), referenced_by: Some("A".into()) });
    }

    #[test]
    fn normalize_keeps_representatives_only() {
        let codes = codes(vec![
            ("A", Code::Union(fields(&[("x", "{}"), ("y", "A")]))),
            ("B", Code::Union(fields(&[("x", "{}"), ("y", "B")]))),
            ("{}", Code::unit()),
        ]);
        let reps = minimize(&codes).unwrap().representatives;
        let normalized = normalize_all(&codes, &reps);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized["A"], Code::Union(fields(&[("x", "{}"), ("y", "A")])));
    }
}

use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use crate::result::{CodeError, CodeResult};

/// Field label to code reference
pub type Fields = BTreeMap<String, String>;

/// A structural type node.
///
/// References are names: either a builtin (`@int`), a name in the same code map or a
/// canonical name from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Code {
    Product(Fields),
    Union(Fields),
    Vector(String),
}

impl Code {
    /// The empty product `{}`
    pub fn unit() -> Self {
        Code::Product(Fields::new())
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Code::Product(_) => "product",
            Code::Union(_) => "union",
            Code::Vector(_) => "vector",
        }
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Code::Product(fields) | Code::Union(fields) => Some(fields),
            Code::Vector(_) => None,
        }
    }

    /// All references of this code, in label order.
    pub fn refs(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        match self {
            Code::Product(fields) | Code::Union(fields) => Box::new(fields.values()),
            Code::Vector(elem) => Box::new(std::iter::once(elem)),
        }
    }

    /// The code with every reference rewritten by `f`.
    pub fn map_refs<F: FnMut(&str) -> String>(&self, mut f: F) -> Code {
        let map_fields =
            |fields: &Fields, f: &mut F| fields.iter().map(|(l, r)| (l.clone(), f(r))).collect();
        match self {
            Code::Product(fields) => Code::Product(map_fields(fields, &mut f)),
            Code::Union(fields) => Code::Union(map_fields(fields, &mut f)),
            Code::Vector(elem) => Code::Vector(f(elem)),
        }
    }

    pub fn try_map_refs<F: FnMut(&str) -> CodeResult<String>>(&self, mut f: F) -> CodeResult<Code> {
        let mut map_fields = |fields: &Fields| -> CodeResult<Fields> {
            fields.iter().map(|(l, r)| Ok((l.clone(), f(r)?))).collect()
        };
        Ok(match self {
            Code::Product(fields) => Code::Product(map_fields(fields)?),
            Code::Union(fields) => Code::Union(map_fields(fields)?),
            Code::Vector(elem) => Code::Vector(f(elem)?),
        })
    }
}

/// Whether `name` is a builtin code name of the form `@identifier`.
pub fn is_builtin(name: &str) -> bool {
    let Some(ident) = name.strip_prefix('@') else {
        return false;
    };
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A code declaration as produced by a parser.
///
/// ```json
/// { "nat": { "code": "union", "union": { "zero": "unit", "succ": "nat" } },
///   "unit": { "code": "product", "product": {} },
///   "int": "@int" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeDecl {
    Builtin(String),
    Code {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product: Option<Fields>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        union: Option<Fields>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vector: Option<String>,
    },
}

/// A checked declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Builtin(String),
    Code(Code),
}

impl CodeDecl {
    /// Check the declaration of `name`.
    pub fn check(&self, name: &str) -> CodeResult<Decl> {
        match self {
            CodeDecl::Builtin(builtin) if is_builtin(builtin) => Ok(Decl::Builtin(builtin.clone())),
            CodeDecl::Builtin(other) => {
                Err(CodeError::malformed(name, format!("{other} is not a builtin name")))
            }
            CodeDecl::Code { code, product, union, vector } => {
                let missing = || CodeError::malformed(name, format!("missing `{code}` member"));
                match code.as_str() {
                    "product" => Ok(Decl::Code(Code::Product(product.clone().ok_or_else(missing)?))),
                    "union" => Ok(Decl::Code(Code::Union(union.clone().ok_or_else(missing)?))),
                    "vector" => Ok(Decl::Code(Code::Vector(vector.clone().ok_or_else(missing)?))),
                    other => Err(CodeError::malformed(name, format!("unknown constructor {other}"))),
                }
            }
        }
    }
}

impl From<&Code> for CodeDecl {
    fn from(code: &Code) -> Self {
        let mut decl = CodeDecl::Code {
            code: code.tag().to_owned(),
            product: None,
            union: None,
            vector: None,
        };
        if let CodeDecl::Code { product, union, vector, .. } = &mut decl {
            match code {
                Code::Product(fields) => *product = Some(fields.clone()),
                Code::Union(fields) => *union = Some(fields.clone()),
                Code::Vector(elem) => *vector = Some(elem.clone()),
            }
        }
        decl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        assert!(is_builtin("@int"));
        assert!(is_builtin("@bits_8"));
        assert!(!is_builtin("int"));
        assert!(!is_builtin("@"));
        assert!(!is_builtin("@8bit"));
    }

    #[test]
    fn checks_declarations() {
        let decls: BTreeMap<String, CodeDecl> = serde_json::from_str(
            r#"{ "nat": { "code": "union", "union": { "zero": "unit", "succ": "nat" } },
                 "list": { "code": "vector", "vector": "nat" },
                 "int": "@int" }"#,
        )
        .unwrap();

        let nat = decls["nat"].check("nat").unwrap();
        let Decl::Code(Code::Union(fields)) = nat else { panic!("expected a union") };
        assert_eq!(fields["succ"], "nat");
        assert_eq!(decls["list"].check("list").unwrap(), Decl::Code(Code::Vector("nat".into())));
        assert_eq!(decls["int"].check("int").unwrap(), Decl::Builtin("@int".into()));
    }

    #[test]
    fn rejects_unknown_constructor() {
        let decl: CodeDecl = serde_json::from_str(r#"{ "code": "record", "record": {} }"#).unwrap();
        assert!(matches!(*decl.check("r").unwrap_err(), CodeError::MalformedCode { .. }));

        let decl = CodeDecl::Builtin("int".to_owned());
        assert!(matches!(*decl.check("i").unwrap_err(), CodeError::MalformedCode { .. }));
    }

    #[test]
    fn serializes_with_tag() {
        let code = Code::Vector("@int".to_owned());
        let json = serde_json::to_string(&CodeDecl::from(&code)).unwrap();
        assert_eq!(json, r#"{"code":"vector","vector":"@int"}"#);
    }
}

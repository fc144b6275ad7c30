use std::collections::BTreeSet;

use derivative::Derivative;
use k_lang_miette_util::Span;
use k_lang_printer::theme::ThemeExt;
use k_lang_printer::tokens::*;
use k_lang_printer::util::label_text;
use k_lang_printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use pretty::DocAllocator;
use serde_derive::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::traits::HasSpan;

/// Index of a node in a pattern graph
pub type PatternId = usize;

/// The input and output pattern of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ports {
    pub input: PatternId,
    pub output: PatternId,
}

/// A relation expression.
///
/// Serialized as its [RelKind] alone; spans and ports are not part of the data format.
#[derive(Debug, Clone, Derivative, Serialize, Deserialize)]
#[derivative(Eq, PartialEq, Hash)]
#[serde(from = "RelKind", into = "RelKind")]
pub struct Rel {
    /// Source code location
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub span: Option<Span>,
    pub kind: RelKind,
    /// Filled in by pattern inference
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub ports: Option<Ports>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelKind {
    /// `{e1 l1, e2 l2, ...}`; with a single field this constructs a union value
    Product(Vec<Field>),
    /// `<e1, e2, ...>`
    Union(Vec<Rel>),
    /// `[e1, e2, ...]`
    Vector(Vec<Rel>),
    /// `e1 e2 ...`
    Comp(Vec<Rel>),
    /// A named relation
    Ref(String),
    /// `.label`
    Dot(String),
    /// `?filter`
    Filter(Filter),
    /// `$T`
    Code(String),
    /// `()`
    Identity,
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub exp: Rel,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl From<RelKind> for Rel {
    fn from(kind: RelKind) -> Self {
        Rel { span: None, kind, ports: None }
    }
}

impl From<Rel> for RelKind {
    fn from(rel: Rel) -> Self {
        rel.kind
    }
}

impl HasSpan for Rel {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

impl Rel {
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn product<I: IntoIterator<Item = (Rel, S)>, S: Into<String>>(fields: I) -> Self {
        RelKind::Product(
            fields.into_iter().map(|(exp, label)| Field { label: label.into(), exp }).collect(),
        )
        .into()
    }

    pub fn union<I: IntoIterator<Item = Rel>>(alts: I) -> Self {
        RelKind::Union(alts.into_iter().collect()).into()
    }

    pub fn vector<I: IntoIterator<Item = Rel>>(elems: I) -> Self {
        RelKind::Vector(elems.into_iter().collect()).into()
    }

    pub fn comp<I: IntoIterator<Item = Rel>>(rels: I) -> Self {
        RelKind::Comp(rels.into_iter().collect()).into()
    }

    pub fn reference(name: impl Into<String>) -> Self {
        RelKind::Ref(name.into()).into()
    }

    pub fn dot(label: impl Into<String>) -> Self {
        RelKind::Dot(label.into()).into()
    }

    pub fn code(name: impl Into<String>) -> Self {
        RelKind::Code(name.into()).into()
    }

    pub fn filter(filter: Filter) -> Self {
        RelKind::Filter(filter).into()
    }

    pub fn identity() -> Self {
        RelKind::Identity.into()
    }

    pub fn literal(literal: Literal) -> Self {
        RelKind::Literal(literal).into()
    }

    /// The ports assigned by pattern inference
    pub fn ports(&self) -> Option<Ports> {
        self.ports
    }

    /// The direct subexpressions, in source order
    pub fn children(&self) -> Vec<&Rel> {
        match &self.kind {
            RelKind::Product(fields) => fields.iter().map(|field| &field.exp).collect(),
            RelKind::Union(rels) | RelKind::Vector(rels) | RelKind::Comp(rels) => rels.iter().collect(),
            RelKind::Ref(_)
            | RelKind::Dot(_)
            | RelKind::Filter(_)
            | RelKind::Code(_)
            | RelKind::Identity
            | RelKind::Literal(_) => vec![],
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Rel> {
        match &mut self.kind {
            RelKind::Product(fields) => fields.iter_mut().map(|field| &mut field.exp).collect(),
            RelKind::Union(rels) | RelKind::Vector(rels) | RelKind::Comp(rels) => {
                rels.iter_mut().collect()
            }
            RelKind::Ref(_)
            | RelKind::Dot(_)
            | RelKind::Filter(_)
            | RelKind::Code(_)
            | RelKind::Identity
            | RelKind::Literal(_) => vec![],
        }
    }

    /// The names of all relations referenced anywhere in this expression
    pub fn references(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.for_each(|rel| {
            if let RelKind::Ref(name) = &rel.kind {
                names.insert(name.as_str());
            }
        });
        names
    }
}

// Precedences
const PREC_TOP: Precedence = 0;
const PREC_COMP_ITEM: Precedence = 1;

impl Print for Rel {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        self.kind.print_prec(cfg, alloc, prec)
    }
}

impl Print for RelKind {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        let comma_sep = || alloc.text(COMMA).append(alloc.space());
        match self {
            RelKind::Product(fields) => alloc
                .intersperse(
                    fields.iter().map(|Field { label, exp }| {
                        exp.print_prec(cfg, alloc, PREC_TOP)
                            .append(alloc.space())
                            .append(alloc.label(label_text(label)))
                    }),
                    comma_sep(),
                )
                .braces(),
            RelKind::Union(rels) => alloc
                .intersperse(rels.iter().map(|rel| rel.print_prec(cfg, alloc, PREC_TOP)), comma_sep())
                .angles(),
            RelKind::Vector(rels) => alloc
                .intersperse(rels.iter().map(|rel| rel.print_prec(cfg, alloc, PREC_TOP)), comma_sep())
                .brackets(),
            RelKind::Comp(rels) if rels.is_empty() => alloc.text(UNIT),
            RelKind::Comp(rels) => {
                let doc = alloc.intersperse(
                    rels.iter().map(|rel| rel.print_prec(cfg, alloc, PREC_COMP_ITEM)),
                    alloc.space(),
                );
                if prec > PREC_TOP && rels.len() > 1 { doc.parens() } else { doc }
            }
            RelKind::Ref(name) => alloc.text(name.as_str()),
            RelKind::Dot(label) => alloc.text(DOT).append(alloc.label(label_text(label))),
            RelKind::Filter(filter) => filter.print(cfg, alloc),
            RelKind::Code(name) => alloc.text(DOLLAR).append(alloc.typ(name)),
            RelKind::Identity => alloc.text(UNIT),
            RelKind::Literal(literal) => literal.print(cfg, alloc),
        }
    }
}

impl Print for Literal {
    fn print<'a>(&'a self, _cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        match self {
            Literal::Int(n) => alloc.text(n.to_string()),
            Literal::Str(s) => alloc.text(format!("{s:?}")),
            Literal::Bool(true) => alloc.keyword(TRUE),
            Literal::Bool(false) => alloc.keyword(FALSE),
        }
    }
}

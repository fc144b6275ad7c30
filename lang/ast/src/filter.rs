use std::collections::BTreeMap;

use k_lang_printer::theme::ThemeExt;
use k_lang_printer::tokens::*;
use k_lang_printer::util::label_text;
use k_lang_printer::{Alloc, Builder, Print, PrintCfg};
use pretty::DocAllocator;
use serde_derive::{Deserialize, Serialize};

/// A shape test on the value flowing through a relation.
///
/// Named variables are shared within one filter: every occurrence of the same
/// variable must match the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// A variable binding whatever code is found at this position
    Var(String),
    /// A specific code
    Code(String),
    /// A product, union or either, with the given fields
    Fields(FieldsFilter),
    /// A vector whose elements match the filter
    Vector(Box<Filter>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldsFilter {
    pub kind: FieldsKind,
    pub fields: BTreeMap<String, Filter>,
    /// Whether the matched code may have more fields than listed
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldsKind {
    Any,
    Product,
    Union,
}

impl Print for Filter {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        alloc.text(QUESTION_MARK).append(print_filter(self, cfg, alloc))
    }
}

fn print_filter<'a>(filter: &'a Filter, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
    match filter {
        Filter::Var(name) => alloc.text(name.as_str()),
        Filter::Code(name) => alloc.text(DOLLAR).append(alloc.typ(name)),
        Filter::Fields(FieldsFilter { kind, fields, open }) => {
            let mut items: Vec<Builder<'a>> = fields
                .iter()
                .map(|(label, filter)| {
                    print_filter(filter, cfg, alloc)
                        .append(alloc.space())
                        .append(alloc.label(label_text(label)))
                })
                .collect();
            if *open {
                items.push(alloc.text(ELLIPSIS));
            }
            let doc = alloc.intersperse(items, alloc.text(COMMA).append(alloc.space()));
            match kind {
                FieldsKind::Any => doc.parens(),
                FieldsKind::Product => doc.braces(),
                FieldsKind::Union => doc.angles(),
            }
        }
        Filter::Vector(elem) => print_filter(elem, cfg, alloc).brackets(),
    }
}

use k_lang_printer::theme::ThemeExt;
use k_lang_printer::tokens::*;
use k_lang_printer::util::label_text;
use k_lang_printer::{Alloc, Builder, DocAllocator, Print, PrintCfg};

use crate::code::{Code, Fields};
use crate::repository::Repository;

impl Print for Code {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        match self {
            Code::Product(fields) => print_fields(fields, cfg, alloc).braces(),
            Code::Union(fields) => print_fields(fields, cfg, alloc).angles(),
            Code::Vector(elem) => alloc.typ(elem).brackets(),
        }
    }
}

fn print_fields<'a>(fields: &'a Fields, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let sep = alloc.text(COMMA).append(alloc.line());
    alloc
        .intersperse(
            fields.iter().map(|(label, r)| {
                alloc.typ(r).append(alloc.space()).append(alloc.label(label_text(label)))
            }),
            sep,
        )
        .nest(cfg.indent)
        .group()
}

impl Print for Repository {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        let sep = if cfg.omit_decl_sep {
            alloc.hardline()
        } else {
            alloc.hardline().append(alloc.hardline())
        };
        alloc.intersperse(
            self.iter().map(|(name, code)| {
                alloc
                    .text(DOLLAR)
                    .append(alloc.typ(name))
                    .append(alloc.space())
                    .append(EQ)
                    .append(alloc.space())
                    .append(code.print(cfg, alloc))
                    .append(SEMI)
            }),
            sep,
        )
    }
}

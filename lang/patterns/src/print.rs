use k_lang_printer::theme::ThemeExt;
use k_lang_printer::tokens::*;
use k_lang_printer::util::label_text;
use k_lang_printer::{Alloc, Builder, DocAllocator, Print, PrintCfg};

use crate::compress::CompressedGraph;
use crate::graph::Edges;
use crate::kind::{PatternKind, VECTOR_MEMBER};

impl Print for CompressedGraph {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        alloc.intersperse(
            self.nodes.iter().zip(&self.edges).enumerate().map(|(idx, (node, edges))| {
                let line = alloc
                    .text(HASH)
                    .append(idx.to_string())
                    .append(alloc.space())
                    .append(EQ)
                    .append(alloc.space())
                    .append(print_pattern(&node.kind, edges, alloc))
                    .append(SEMI);
                match &node.rule {
                    Some(rule) if cfg.print_rules => {
                        line.append(alloc.space()).append(alloc.comment(format!("-- {rule}")))
                    }
                    _ => line,
                }
            }),
            alloc.hardline(),
        )
    }
}

fn print_pattern<'a>(kind: &'a PatternKind, edges: &'a Edges, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let fields = || {
        alloc.intersperse(
            edges.iter().map(|(label, dst)| {
                alloc.text(format!("{HASH}{dst}")).append(alloc.space()).append(alloc.label(label_text(label)))
            }),
            alloc.text(COMMA).append(alloc.space()),
        )
    };
    let open = || {
        let fields = fields();
        if edges.is_empty() {
            alloc.text(ELLIPSIS)
        } else {
            fields.append(COMMA).append(alloc.space()).append(ELLIPSIS)
        }
    };
    match kind {
        PatternKind::Unconstrained => open().parens(),
        PatternKind::OpenProduct => open().braces(),
        PatternKind::OpenUnion => open().angles(),
        PatternKind::ClosedUntyped => fields().parens(),
        PatternKind::ClosedProduct => fields().braces(),
        PatternKind::ClosedUnion => fields().angles(),
        PatternKind::Vector => match edges.get(VECTOR_MEMBER) {
            Some(member) => alloc.text(format!("{HASH}{member}")).brackets(),
            None => alloc.nil().brackets(),
        },
        PatternKind::Bound(name) => alloc.text(DOLLAR).append(alloc.typ(name)),
    }
}

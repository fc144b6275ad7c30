use k_lang_ast::{Field, HasSpan, Literal, Ports, Rel, RelKind, Relations, Visitor, VisitorMut};
use k_lang_codes::{CodeError, Repository};
use k_lang_miette_util::{Span, ToMiette};

use crate::filter::filter_node;
use crate::graph::PatternGraph;
use crate::kind::{PatternKind, VECTOR_MEMBER};
use crate::promote::{Promotion, promote_singletons};
use crate::result::{PatResult, PatternError};

/// Settings of the inference pass
#[derive(Debug, Clone)]
pub struct InferCfg {
    /// Turn closed patterns that are not entangled with open ones into codes
    pub promote_singletons: bool,
    /// Fail if any expression keeps an open pattern
    pub require_closed: bool,
}

impl Default for InferCfg {
    fn default() -> Self {
        Self { promote_singletons: true, require_closed: false }
    }
}

/// The outcome of [infer]
#[derive(Debug, Clone)]
pub struct Inference {
    pub graph: PatternGraph,
    pub promoted: Vec<Promotion>,
}

/// Infer the patterns of all relations.
///
/// Every expression node gets an input and an output pattern, recorded in its
/// [Rel::ports]. The constraints of all nodes are applied until none of them changes
/// the graph anymore.
pub fn infer(repo: &mut Repository, rels: &mut Relations, cfg: &InferCfg) -> PatResult<Inference> {
    let mut graph = PatternGraph::new();
    for rel in rels.values_mut() {
        rel.walk_mut(&mut PortAssigner { graph: &mut graph });
    }
    let ports_allocated = graph.len();

    let constraints = generate(&mut graph, repo, rels)?;
    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for constraint in &constraints {
            changed |= constraint.apply(&mut graph, repo).map_err(|err| err.at(constraint.span))?;
        }
        if !changed {
            changed = close_loops(&mut graph, repo)?;
        }
        if !changed {
            break;
        }
    }
    log::debug!(
        "Solved {} constraints over {} ports in {} rounds, {} patterns in total",
        constraints.len(),
        ports_allocated,
        rounds,
        graph.len()
    );

    let promoted =
        if cfg.promote_singletons { promote_singletons(&mut graph, repo)? } else { Vec::new() };
    if cfg.require_closed {
        check_closed(&graph, rels)?;
    }
    Ok(Inference { graph, promoted })
}

/// Allocates the input pattern of a node before its children and the output pattern
/// after them.
struct PortAssigner<'g> {
    graph: &'g mut PatternGraph,
}

impl VisitorMut for PortAssigner<'_> {
    fn enter_mut(&mut self, rel: &mut Rel) {
        let input = self.graph.add_node(PatternKind::Unconstrained, []);
        rel.ports = Some(Ports { input, output: input });
    }

    fn leave_mut(&mut self, rel: &mut Rel) {
        let output = self.graph.add_node(PatternKind::Unconstrained, []);
        if let Some(ports) = rel.ports.as_mut() {
            ports.output = output;
        }
    }
}

#[derive(Debug, Clone)]
struct Constraint {
    rule: &'static str,
    kind: ConstraintKind,
    span: Option<Span>,
}

#[derive(Debug, Clone)]
enum ConstraintKind {
    Unify(Vec<usize>),
    Edge { src: usize, label: String, dst: usize },
}

impl Constraint {
    fn apply(&self, graph: &mut PatternGraph, repo: &Repository) -> PatResult<bool> {
        match &self.kind {
            ConstraintKind::Unify(ids) => graph.unify(repo, self.rule, ids),
            ConstraintKind::Edge { src, label, dst } => graph.add_edge(repo, self.rule, *src, label, *dst),
        }
    }
}

fn generate(graph: &mut PatternGraph, repo: &Repository, rels: &Relations) -> PatResult<Vec<Constraint>> {
    let mut generator = Generator { graph, repo, rels, constraints: Vec::new(), error: None };
    for rel in rels.values() {
        rel.walk(&mut generator);
    }
    match generator.error {
        Some(err) => Err(err),
        None => Ok(generator.constraints),
    }
}

/// Collects the constraints of every node. Nodes that need a fixed shape get an
/// anchor pattern, created once here.
struct Generator<'g> {
    graph: &'g mut PatternGraph,
    repo: &'g Repository,
    rels: &'g Relations,
    constraints: Vec<Constraint>,
    error: Option<Box<PatternError>>,
}

impl<'a> Visitor<'a> for Generator<'_> {
    fn enter(&mut self, rel: &'a Rel) {
        if self.error.is_none() {
            if let Err(err) = self.node(rel) {
                self.error = Some(err.at(rel.span()));
            }
        }
    }
}

impl Generator<'_> {
    fn unify<I: IntoIterator<Item = usize>>(&mut self, rule: &'static str, span: Option<Span>, ids: I) {
        let kind = ConstraintKind::Unify(ids.into_iter().collect());
        self.constraints.push(Constraint { rule, kind, span });
    }

    fn anchor<I: IntoIterator<Item = (String, usize)>>(&mut self, kind: PatternKind, edges: I) -> usize {
        self.graph.add_node(kind, edges)
    }

    fn bound(&mut self, name: &str) -> PatResult<usize> {
        self.graph.bound_node(self.repo, name)
    }

    fn node(&mut self, rel: &Rel) -> PatResult {
        let Ports { input, output } = ports(rel)?;
        let span = rel.span();
        match &rel.kind {
            RelKind::Product(fields) if fields.is_empty() => {
                let repo = self.repo;
                let unit = self.bound(repo.unit())?;
                self.unify("unit", span, [output, unit]);
            }
            RelKind::Product(fields) if fields.len() == 1 => {
                let Field { label, exp } = &fields[0];
                let exp = ports(exp)?;
                self.unify("union constructor", span, [input, exp.input]);
                let anchor = self.anchor(PatternKind::OpenUnion, [(label.clone(), exp.output)]);
                self.unify("union constructor", span, [output, anchor]);
            }
            RelKind::Product(fields) => {
                let mut edges: Vec<(String, usize)> = Vec::with_capacity(fields.len());
                for Field { label, exp } in fields {
                    let exp = ports(exp)?;
                    self.unify("product", span, [input, exp.input]);
                    match edges.iter().find(|(l, _)| l == label) {
                        Some((_, first)) => {
                            let first = *first;
                            self.unify("product", span, [first, exp.output]);
                        }
                        None => edges.push((label.clone(), exp.output)),
                    }
                }
                let anchor = self.anchor(PatternKind::ClosedProduct, edges);
                self.unify("product", span, [output, anchor]);
            }
            RelKind::Union(alts) if alts.is_empty() => {
                let anchor = self.anchor(PatternKind::ClosedUnion, []);
                self.unify("empty union", span, [output, anchor]);
            }
            RelKind::Union(alts) => {
                let alts = alts.iter().map(ports).collect::<PatResult<Vec<_>>>()?;
                self.unify("union", span, std::iter::once(input).chain(alts.iter().map(|p| p.input)));
                self.unify("union", span, std::iter::once(output).chain(alts.iter().map(|p| p.output)));
            }
            RelKind::Vector(elems) if elems.is_empty() => {
                let anchor = self.anchor(PatternKind::Vector, []);
                self.unify("empty vector", span, [output, anchor]);
            }
            RelKind::Vector(elems) => {
                let elems = elems.iter().map(ports).collect::<PatResult<Vec<_>>>()?;
                let member = self.anchor(PatternKind::Unconstrained, []);
                let anchor = self.anchor(PatternKind::Vector, [(VECTOR_MEMBER.to_owned(), member)]);
                self.unify("vector", span, [output, anchor]);
                self.unify("vector", span, std::iter::once(input).chain(elems.iter().map(|p| p.input)));
                self.unify("vector", span, std::iter::once(member).chain(elems.iter().map(|p| p.output)));
            }
            RelKind::Comp(rels) if rels.is_empty() => self.unify("identity", span, [input, output]),
            RelKind::Comp(rels) => {
                let mut prev = input;
                for rel in rels {
                    let ports = ports(rel)?;
                    self.unify("composition", span, [prev, ports.input]);
                    prev = ports.output;
                }
                self.unify("composition", span, [prev, output]);
            }
            RelKind::Ref(name) => match self.rels.get(name) {
                Some(def) => {
                    let def = ports(def)?;
                    self.unify("reference", span, [input, def.input]);
                    self.unify("reference", span, [output, def.output]);
                }
                None if name == "true" || name == "false" => {
                    let bool = self.bound("@bool")?;
                    self.unify("boolean", span, [output, bool]);
                }
                None => {
                    return Err(Box::new(PatternError::UnknownRelation {
                        name: name.clone(),
                        span: span.to_miette(),
                    }));
                }
            },
            RelKind::Dot(label) => {
                let kind = ConstraintKind::Edge { src: input, label: label.clone(), dst: output };
                self.constraints.push(Constraint { rule: "dot", kind, span });
            }
            RelKind::Filter(filter) => {
                self.unify("filter", span, [input, output]);
                let anchor = filter_node(self.graph, self.repo, filter)?;
                self.unify("filter", span, [input, anchor]);
            }
            RelKind::Code(name) => {
                let code = self.bound(name)?;
                self.unify("code", span, [input, code]);
                self.unify("code", span, [input, output]);
            }
            RelKind::Identity => self.unify("identity", span, [input, output]),
            RelKind::Literal(literal) => {
                let builtin = match literal {
                    Literal::Int(_) => "@int",
                    Literal::Str(_) => "@string",
                    Literal::Bool(_) => "@bool",
                };
                let builtin = self.bound(builtin)?;
                self.unify("literal", span, [output, builtin]);
            }
        }
        Ok(())
    }
}

fn ports(rel: &Rel) -> PatResult<Ports> {
    rel.ports.ok_or_else(|| CodeError::impossible("expression without ports").into())
}

/// A pattern reaching itself through one of its own edges can only describe a union.
///
/// Unconstrained and untyped patterns on such a loop are turned into unions, products
/// on a loop are rejected. Bound patterns keep their code.
fn close_loops(graph: &mut PatternGraph, repo: &Repository) -> PatResult<bool> {
    let looping: Vec<usize> =
        graph.roots().filter(|root| graph.edges(*root).values().any(|dst| graph.find(*dst) == *root)).collect();
    let mut changed = false;
    for root in looping {
        let root = graph.find(root);
        let shape = graph.shape(root);
        match shape.kind {
            PatternKind::OpenProduct | PatternKind::ClosedProduct => {
                return Err(Box::new(PatternError::LoopInProduct { pattern: shape.to_string() }));
            }
            PatternKind::Unconstrained | PatternKind::ClosedUntyped => {
                log::trace!("Pattern {shape} is on a loop, forcing a union");
                let edges = graph.edges(root).clone();
                let union = graph.add_node(PatternKind::OpenUnion, edges);
                changed |= graph.unify(repo, "loop", &[root, union])?;
            }
            _ => {}
        }
    }
    Ok(changed)
}

fn check_closed(graph: &PatternGraph, rels: &Relations) -> PatResult {
    for (name, rel) in rels {
        let mut open = None;
        rel.for_each(|node| {
            if open.is_some() {
                return;
            }
            let Some(Ports { input, output }) = node.ports else { return };
            if let Some(id) = [input, output].into_iter().find(|id| graph.kind(*id).is_open()) {
                open = Some((graph.shape(id).to_string(), node.span()));
            }
        });
        if let Some((pattern, span)) = open {
            return Err(Box::new(PatternError::UnresolvedPattern {
                relation: name.clone(),
                pattern,
                span: span.to_miette(),
            }));
        }
    }
    Ok(())
}

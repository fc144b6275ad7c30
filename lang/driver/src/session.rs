use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use k_lang_ast::{Ports, Relations};
use k_lang_codes::{CodeDecl, Repository, Representatives};
use k_lang_naming::{Names, assign_canonical_names};
use k_lang_patterns::{CompressedGraph, Inference, PatternGraph, Promotion, infer};
use k_lang_printer::PrintToString;

use crate::config::DriverCfg;
use crate::result::DriverResult;

/// A compilation unit: code declarations and relation definitions.
///
/// ```json
/// { "codes": { "nat": { "code": "union", "union": { "zero": "{}", "succ": "nat" } } },
///   "rels": { "pred": { "comp": [ { "code": "nat" }, { "dot": "succ" } ] } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub codes: BTreeMap<String, CodeDecl>,
    #[serde(default)]
    pub rels: Relations,
}

/// The result of compiling a [Unit]
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The canonical name of every declared code
    pub representatives: Representatives,
    /// The relations, with the ports of every node filled in
    pub rels: Relations,
    pub graph: PatternGraph,
    /// Present if compression is enabled; the ports in [Compiled::rels] then refer to it
    pub compressed: Option<CompressedGraph>,
    pub promoted: Vec<Promotion>,
    /// The canonical name of every relation
    pub names: Names,
}

impl Compiled {
    /// The printed pattern graph, compressed for presentation.
    pub fn print_patterns(&self, cfg: &DriverCfg) -> String {
        match &self.compressed {
            Some(compressed) => compressed.print_to_string(Some(&cfg.print)),
            None => self.graph.compressed().print_to_string(Some(&cfg.print)),
        }
    }

    /// The ports of every expression node in pre-order, per relation
    pub fn annotations(&self) -> BTreeMap<&str, Vec<Ports>> {
        k_lang_patterns::annotations(&self.rels)
    }
}

/// Compiles units against one code repository.
///
/// Codes registered by one unit, including promoted patterns, stay available to the
/// following units.
#[derive(Debug, Clone, Default)]
pub struct Session {
    repo: Repository,
    cfg: DriverCfg,
}

impl Session {
    pub fn new(cfg: DriverCfg) -> Self {
        Session { repo: Repository::new(), cfg }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn cfg(&self) -> &DriverCfg {
        &self.cfg
    }

    /// Forget all registered codes.
    pub fn reset(&mut self) {
        self.repo.reset();
    }

    pub fn compile(&mut self, unit: Unit) -> DriverResult<Compiled> {
        let Unit { codes, mut rels } = unit;

        let representatives = self.repo.register(&codes)?;
        log::debug!("Registered {} codes, repository holds {}", representatives.len(), self.repo.len());

        let Inference { graph, promoted } = infer(&mut self.repo, &mut rels, &self.cfg.infer_cfg())?;

        let compressed = if self.cfg.compress {
            let compressed = graph.compressed();
            compressed.annotate(&mut rels);
            Some(compressed)
        } else {
            None
        };

        let names = assign_canonical_names(&rels);
        log::debug!("Named {} relations", names.len());

        Ok(Compiled { representatives, rels, graph, compressed, promoted, names })
    }

    /// The printed repository
    pub fn print_codes(&self) -> String {
        self.repo.print_to_string(Some(&self.cfg.print))
    }
}

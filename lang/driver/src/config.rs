use k_lang_patterns::InferCfg;
use k_lang_printer::PrintCfg;

/// Settings of a [Session](crate::Session)
#[derive(Debug, Clone)]
pub struct DriverCfg {
    /// Turn closed patterns that no open pattern can change into codes
    pub promote_singletons: bool,
    /// Present the pattern graph with bisimilar patterns merged
    pub compress: bool,
    /// Reject relations that keep an open pattern
    pub require_closed: bool,
    pub print: PrintCfg,
}

impl Default for DriverCfg {
    fn default() -> Self {
        Self { promote_singletons: true, compress: true, require_closed: false, print: PrintCfg::default() }
    }
}

impl DriverCfg {
    pub fn infer_cfg(&self) -> InferCfg {
        InferCfg { promote_singletons: self.promote_singletons, require_closed: self.require_closed }
    }
}

use crate::PrintCfg;

use super::Print;
use super::PrintExt;

pub trait PrintToString {
    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String;
}

impl<T: Print> PrintToString for T {
    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String {
        let mut buf = Vec::new();
        let def = PrintCfg::default();
        let cfg = cfg.unwrap_or(&def);
        <T as PrintExt>::print(self, cfg, &mut buf).expect("Failed to print to string");
        String::from_utf8(buf).expect("Printer produced invalid UTF-8")
    }
}

const FLAT_WIDTH: usize = 1 << 24;

/// Render on a single line, independent of any configured width.
///
/// Used whenever printed text feeds into a content hash.
pub fn print_flat<T: Print>(value: &T) -> String {
    let cfg = PrintCfg { width: FLAT_WIDTH, ..PrintCfg::default() };
    value.print_to_string(Some(&cfg))
}

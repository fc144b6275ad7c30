use miette::Report;

use k_lang_printer::ColorChoice;

use crate::result::DriverError;

/// Terminal width for pretty-printing error messages.
const TERMINAL_WIDTH: usize = 200;

pub fn render_error(err: &DriverError, colorize: ColorChoice) -> String {
    render_reports_to_string(&[Report::new(err.clone())], colorize)
}

pub fn render_reports_to_string(reports: &[Report], colorize: ColorChoice) -> String {
    let mut output = String::new();
    render_reports(&mut output, reports, colorize);
    output
}

/// Render `reports` one after the other, separated by an empty line.
pub fn render_reports<O>(output: &mut O, reports: &[Report], colorize: ColorChoice)
where
    O: std::fmt::Write,
{
    let theme = match colorize {
        ColorChoice::Always | ColorChoice::AlwaysAnsi => miette::GraphicalTheme::unicode(),
        ColorChoice::Auto => miette::GraphicalTheme::default(),
        ColorChoice::Never => miette::GraphicalTheme::unicode_nocolor(),
    };
    let handler = miette::GraphicalReportHandler::new_themed(theme).with_width(TERMINAL_WIDTH);

    let mut reports = reports.iter().peekable();
    while let Some(report) = reports.next() {
        if handler.render_report(output, report.as_ref()).is_err() {
            log::debug!("Failed to render a report");
        }
        if reports.peek().is_some() && writeln!(output).is_err() {
            log::debug!("Failed to separate reports");
        }
    }
}

#[cfg(test)]
mod tests {
    use k_lang_codes::CodeError;

    use super::*;

    #[test]
    fn renders_diagnostic_codes() {
        let err = DriverError::from(CodeError::unknown("nat", Some("list")));
        let rendered = render_error(&err, ColorChoice::Never);
        assert!(rendered.contains("C-001"));
        assert!(rendered.contains("nat"));
    }
}

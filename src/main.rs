use codespan_reporting::term::termcolor::ColorChoice;
use log::error;
use stata_syntax::{check_package, Reporter};
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut reporter = Reporter::stderr(ColorChoice::Auto);

    match check_package(&path, &mut reporter) {
        Ok(report) if report.failed == 0 => (),
        Ok(_) => process::exit(1),
        Err(err) => {
            if let Err(report_err) = reporter.abort(&err) {
                error!("couldn't report {:?}: {}", err, report_err);
            }
            process::exit(2);
        }
    }
}

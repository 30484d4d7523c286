use colored::Colorize;
use log::LevelFilter;
use reql_coerce::cli::CommandLineInterface;

fn main() {
    let command_line_interface = CommandLineInterface::load();

    let level = match command_line_interface.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match command_line_interface.run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            std::process::exit(2);
        }
    }
}

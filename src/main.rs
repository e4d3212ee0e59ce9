#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use {
    clap::{App, AppSettings, Arg, ArgMatches, SubCommand},
    cli::{cmd, logger::{self, Fatal}},
    std::{panic, process},
};

#[macro_use]
mod cli;

fn main() {
    let matches = app().get_matches();

    catch_fatal!(
        {
            logger::init(&matches);
            dispatch(&matches);
        },
        {
            process::exit(1);
        }
    );
}

fn dispatch(matches: &ArgMatches) {
    match matches.subcommand() {
        ("lex", Some(matches)) => cmd::lex(matches),
        ("compile", Some(matches)) => cmd::compile(matches),
        (name, _) => logger::fatal(&format!("Unknown command '{}'", name)),
    }
}

fn app() -> App<'static, 'static> {
    App::new("munch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compiles token descriptions into longest-match lexer tables")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("logfile")
                .long("logfile")
                .value_name("FILE")
                .help("Writes logs to FILE")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("loglevel")
                .long("loglevel")
                .value_name("LEVEL")
                .help("Sets the level of logs written to the log file")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("lex")
                .about("Scans a file with the lexer a description compiles to")
                .arg(description_arg())
                .arg(
                    Arg::with_name("input")
                        .help("The file to scan")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("ignore")
                        .long("ignore")
                        .value_name("REGEX")
                        .help("Ignores every terminal whose name matches REGEX")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("recover")
                        .long("recover")
                        .help("Skips the offending char after a lexical error and keeps scanning"),
                )
                .args(&build_args()),
        )
        .subcommand(
            SubCommand::with_name("compile")
                .about("Compiles a description into a transition table")
                .arg(description_arg())
                .arg(
                    Arg::with_name("emit")
                        .long("emit")
                        .value_name("FORMAT")
                        .help("The output format")
                        .possible_values(&["json", "rust"])
                        .default_value("json"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("Writes the table to FILE instead of stdout")
                        .takes_value(true),
                )
                .args(&build_args()),
        )
}

fn description_arg() -> Arg<'static, 'static> {
    Arg::with_name("description")
        .help("The YAML token description")
        .required(true)
        .index(1)
}

fn build_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("strict")
            .long("strict")
            .help("Rejects strings accepted by more than one terminal"),
        Arg::with_name("no-compress")
            .long("no-compress")
            .help("Keeps one table column per input byte"),
        Arg::with_name("minimize")
            .long("minimize")
            .help("Minimizes the automaton before compiling it"),
    ]
}

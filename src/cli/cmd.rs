use {
    crate::cli::logger,
    clap::ArgMatches,
    colored::Colorize,
    munch::{AmbiguityPolicy, Description, Lexicon, Scanner, TransitionTable, EOF},
    regex::Regex,
    std::{fs, path::Path},
    stopwatch::Stopwatch,
};

pub fn lex(matches: &ArgMatches) {
    let mut sw = Stopwatch::new();
    sw.start();

    let description_path = required(matches, "description");
    let lexicon = load_lexicon(description_path, matches);

    let input_path = required(matches, "input");
    let input = read_file(input_path);

    let mut scanner = match lexicon.scanner(&input) {
        Ok(scanner) => scanner,
        Err(err) => logger::fatal(&format!("Failed to start scanner: {}", err)),
    };

    if let Some(pattern) = matches.value_of("ignore") {
        ignore_matching(&mut scanner, pattern);
    }

    logger::lex(input_path);

    let recover = matches.is_present("recover");
    let mut tokens: usize = 0;
    let mut errors: usize = 0;

    loop {
        match scanner.advance() {
            Ok(token) => {
                logger::token(&format!(
                    "{} @{}",
                    token.describe(lexicon.terminals()),
                    token.location()
                ));
                if token.is_eof() {
                    break;
                }
                tokens += 1;
            }
            Err(err) => {
                logger::lex_err(&format!("{}: {}", input_path, err));
                if !recover {
                    logger::fatal(&format!("Failed to lex {}", input_path));
                }

                errors += 1;
                if scanner.skip().is_none() {
                    break;
                }
            }
        }
    }

    let summary = format!(
        "{} ({} tokens in {}ms)",
        input_path,
        tokens,
        sw.elapsed_ms()
    );
    if errors == 0 {
        logger::lex_ok(&summary);
    } else {
        logger::err(&format!("{} lexical errors in {}", errors, input_path));
        logger::lex_err(&summary);
    }
}

pub fn compile(matches: &ArgMatches) {
    let mut sw = Stopwatch::new();
    sw.start();

    let description_path = required(matches, "description");
    let lexicon = load_lexicon(description_path, matches);

    let artifact = match matches.value_of("emit").unwrap_or("json") {
        "json" => match lexicon.to_json() {
            Ok(json) => json,
            Err(err) => logger::fatal(&format!("Failed to serialize table: {}", err)),
        },
        "rust" => lexicon.to_rust(),
        emit => logger::fatal(&format!("Unknown output format '{}'", emit)),
    };

    match matches.value_of("output") {
        None => println!("{}", artifact),
        Some(output_path) => {
            if let Err(err) = fs::write(output_path, artifact) {
                logger::fatal(&format!("Failed to write {}: {}", output_path, err));
            }
            logger::info(&format!("Wrote {}", output_path.bright_white()));
        }
    }

    let table = lexicon.table();
    let columns = match lexicon.compressed() {
        Some(compressed) => compressed.columns(),
        None => table.columns(),
    };

    logger::info(&format!(
        "Compiled {}: {} states, {} columns, {} terminals in {}ms",
        description_path,
        table.states(),
        columns,
        table.terminals().len() - 1,
        sw.elapsed_ms()
    ));
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.value_of(name) {
        Some(value) => value,
        None => logger::fatal(&format!("Missing required argument <{}>", name)),
    }
}

fn read_file(path: &str) -> String {
    if !Path::new(path).is_file() {
        logger::fatal(&format!("Could not find file {}", path));
    }

    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => logger::fatal(&format!("Could not read file {}: {}", path, err)),
    }
}

fn load_lexicon(path: &str, matches: &ArgMatches) -> Lexicon {
    let text = read_file(path);

    let mut description = match Description::parse(&text) {
        Ok(description) => description,
        Err(err) => logger::fatal(&format!("Error loading description {}: {}", path, err)),
    };

    if matches.is_present("strict") {
        description.options.config.ambiguity = AmbiguityPolicy::Strict;
    }
    if matches.is_present("no-compress") {
        description.options.compress = false;
    }
    if matches.is_present("minimize") {
        description.options.minimize = true;
    }

    match Lexicon::from_description(&description) {
        Ok(lexicon) => {
            debug!(
                "Loaded description {} with {} terminals",
                path,
                lexicon.terminals().len() - 1
            );
            lexicon
        }
        Err(err) => logger::fatal(&format!("Error loading description {}: {}", path, err)),
    }
}

fn ignore_matching<T: TransitionTable, S: Iterator<Item = char>>(
    scanner: &mut Scanner<T, S>,
    pattern: &str,
) {
    let regex = match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(regex) => regex,
        Err(err) => logger::fatal(&format!("Failed to build terminal name regex: {}", err)),
    };

    let ids: Vec<_> = scanner
        .terminal_set()
        .iter()
        .filter(|&(id, name)| id != EOF && regex.is_match(name))
        .map(|(id, _)| id)
        .collect();

    if ids.is_empty() {
        logger::err(&format!("No terminals match '{}'", pattern));
    }

    for id in ids {
        if let Err(err) = scanner.ignore(id) {
            logger::fatal(&format!("Failed to ignore terminal {}: {}", id, err));
        }
    }
}

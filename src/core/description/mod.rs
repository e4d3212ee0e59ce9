use {
    crate::core::{
        automaton::{
            terminal::EOF_NAME, AmbiguityPolicy, Automaton, BuildConfig, ConstructionError,
            Fragment, TerminalId, TerminalRegistry, UnknownTerminalError, EOF,
        },
        lex::{self, alphabet::SymbolRange},
    },
    std::{error, fmt},
    yaml_rust::{Yaml, YamlLoader},
};

pub use self::class::parse_class;

mod class;

/// Options: Build settings carried by a description's `options` mapping.
///
/// # Fields
///
/// * `config` - the automaton build configuration (`strict`, `state_limit`).
/// * `compress` - whether the compiled table should be column-compressed.
/// * `minimize` - whether the deterministic automaton should be minimized before compiling.
#[derive(PartialEq, Clone, Debug)]
pub struct Options {
    pub config: BuildConfig,
    pub compress: bool,
    pub minimize: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            config: BuildConfig::default(),
            compress: true,
            minimize: false,
        }
    }
}

/// Pattern: A token pattern as written in a description, before it is built into fragments.
#[derive(PartialEq, Clone, Debug)]
pub enum Pattern {
    Literal(String),
    Sequence(Vec<Pattern>),
    Class(Vec<SymbolRange>),
    Not(Vec<SymbolRange>),
    Alt(Vec<Pattern>),
    Star(Box<Pattern>),
    Plus(Box<Pattern>),
    Opt(Box<Pattern>),
    Macro(String),
    Repeat {
        pattern: Box<Pattern>,
        min: usize,
        max: Option<usize>,
    },
}

impl Pattern {
    /// Builds this pattern into a fresh fragment of `automaton`.
    pub fn build(&self, automaton: &mut Automaton) -> Result<Fragment, ConstructionError> {
        match self {
            Pattern::Literal(text) => automaton.string(text),
            Pattern::Sequence(parts) => {
                let fragments = Pattern::build_all(parts, automaton)?;
                automaton.sequence(&fragments)
            }
            Pattern::Class(ranges) => automaton.class(ranges),
            Pattern::Not(ranges) => automaton.exclude(ranges),
            Pattern::Alt(parts) => {
                let fragments = Pattern::build_all(parts, automaton)?;
                automaton.alternate(&fragments)
            }
            Pattern::Star(inner) => {
                let fragment = inner.build(automaton)?;
                automaton.star(fragment)
            }
            Pattern::Plus(inner) => {
                let fragment = inner.build(automaton)?;
                automaton.plus(fragment)
            }
            Pattern::Opt(inner) => {
                let fragment = inner.build(automaton)?;
                automaton.optional(fragment)
            }
            Pattern::Macro(name) => automaton.instantiate(name),
            Pattern::Repeat { pattern, min, max } => {
                let fragment = pattern.build(automaton)?;
                automaton.range(fragment, *min, *max)
            }
        }
    }

    fn build_all(
        parts: &[Pattern],
        automaton: &mut Automaton,
    ) -> Result<Vec<Fragment>, ConstructionError> {
        parts.iter().map(|part| part.build(automaton)).collect()
    }
}

/// Description: A parsed token description.
///
/// # Fields
///
/// * `options` - build settings, which callers may override before building.
/// * `macros` - named patterns in declaration order; each may use the macros before it.
/// * `terminals` - terminal patterns in declaration order, which fixes their ids.
/// * `ignore` - the names of terminals the scanner should drop.
#[derive(PartialEq, Clone, Debug)]
pub struct Description {
    pub options: Options,
    macros: Vec<(String, Pattern)>,
    terminals: Vec<(String, Pattern)>,
    ignore: Vec<String>,
}

impl Description {
    pub fn parse(input: &str) -> Result<Description, Error> {
        let mut docs = YamlLoader::load_from_str(input)?;
        if docs.len() != 1 {
            return Err(Error::FormatErr(format!(
                "expected a single YAML document, found {}",
                docs.len()
            )));
        }
        let root = docs.remove(0);

        let entries = match root {
            Yaml::Hash(entries) => entries,
            _ => return Err(format_err("", "expected a mapping")),
        };

        let mut description = Description {
            options: Options::default(),
            macros: vec![],
            terminals: vec![],
            ignore: vec![],
        };
        let mut has_terminals = false;

        for (key, value) in &entries {
            match key.as_str() {
                Some("options") => description.options = parse_options(value)?,
                Some("macros") => description.macros = parse_named(value, "macros")?,
                Some("terminals") => {
                    description.terminals = parse_named(value, "terminals")?;
                    if description.terminals.iter().any(|(name, _)| name == EOF_NAME) {
                        return Err(format_err(
                            &format!("terminals.{}", EOF_NAME),
                            "the name is reserved for the end of input",
                        ));
                    }
                    has_terminals = true;
                }
                Some("ignore") => description.ignore = parse_ignore(value)?,
                Some(other) => return Err(format_err(other, "unknown section")),
                None => return Err(format_err("", "section names must be strings")),
            }
        }

        if !has_terminals {
            return Err(format_err("terminals", "missing section"));
        }

        debug!(
            "Parsed description with {} macros, {} terminals, {} ignored",
            description.macros.len(),
            description.terminals.len(),
            description.ignore.len()
        );
        Ok(description)
    }

    pub fn macros(&self) -> &[(String, Pattern)] {
        &self.macros
    }

    pub fn terminals(&self) -> &[(String, Pattern)] {
        &self.terminals
    }

    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    /// Builds the non-deterministic automaton described, registering every macro and terminal in
    /// declaration order.
    pub fn build(&self) -> Result<Automaton, Error> {
        let mut automaton = Automaton::with_config(self.options.config.clone());

        for (name, pattern) in &self.macros {
            automaton.add_macro(name, |a| pattern.build(a))?;
        }
        for (name, pattern) in &self.terminals {
            automaton.add_terminal(name, |a| pattern.build(a))?;
        }

        Ok(automaton)
    }

    /// Resolves the ignored terminal names against `terminals`.
    pub fn ignored_ids(&self, terminals: &TerminalRegistry) -> Result<Vec<TerminalId>, Error> {
        let mut ids: Vec<TerminalId> = vec![];
        for name in &self.ignore {
            let id = terminals.id(name)?;
            if id == EOF {
                return Err(format_err("ignore", "the end of input cannot be ignored"));
            }
            ids.push(id);
        }
        Ok(ids)
    }
}

fn format_err(path: &str, msg: &str) -> Error {
    if path.is_empty() {
        Error::FormatErr(msg.to_string())
    } else {
        Error::FormatErr(format!("{}: {}", path, msg))
    }
}

fn parse_options(yaml: &Yaml) -> Result<Options, Error> {
    let entries = match yaml {
        Yaml::Hash(entries) => entries,
        Yaml::Null => return Ok(Options::default()),
        _ => return Err(format_err("options", "expected a mapping")),
    };

    let mut options = Options::default();
    for (key, value) in entries {
        let key = key.as_str().unwrap_or("");
        let path = format!("options.{}", key);

        match key {
            "strict" => {
                let strict = value
                    .as_bool()
                    .ok_or_else(|| format_err(&path, "expected a boolean"))?;
                options.config.ambiguity = if strict {
                    AmbiguityPolicy::Strict
                } else {
                    AmbiguityPolicy::FirstDeclared
                };
            }
            "state_limit" => {
                options.config.state_limit = value
                    .as_i64()
                    .filter(|limit| *limit > 0)
                    .ok_or_else(|| format_err(&path, "expected a positive integer"))?
                    as usize;
            }
            "compress" => {
                options.compress = value
                    .as_bool()
                    .ok_or_else(|| format_err(&path, "expected a boolean"))?;
            }
            "minimize" => {
                options.minimize = value
                    .as_bool()
                    .ok_or_else(|| format_err(&path, "expected a boolean"))?;
            }
            _ => return Err(format_err(&path, "unknown option")),
        }
    }
    Ok(options)
}

fn parse_named(yaml: &Yaml, section: &str) -> Result<Vec<(String, Pattern)>, Error> {
    let entries = match yaml {
        Yaml::Hash(entries) => entries,
        Yaml::Null => return Ok(vec![]),
        _ => return Err(format_err(section, "expected a mapping")),
    };

    let mut named: Vec<(String, Pattern)> = vec![];
    for (key, value) in entries {
        let name = match key.as_str() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(format_err(section, "names must be non-empty strings")),
        };

        let path = format!("{}.{}", section, name);
        named.push((name.to_string(), parse_pattern(value, &path)?));
    }
    Ok(named)
}

fn parse_ignore(yaml: &Yaml) -> Result<Vec<String>, Error> {
    match yaml {
        Yaml::String(name) => Ok(vec![name.clone()]),
        Yaml::Array(names) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format_err("ignore", "expected terminal names"))
            })
            .collect(),
        Yaml::Null => Ok(vec![]),
        _ => Err(format_err("ignore", "expected a list of terminal names")),
    }
}

fn parse_pattern(yaml: &Yaml, path: &str) -> Result<Pattern, Error> {
    match yaml {
        Yaml::String(text) => Ok(Pattern::Literal(text.clone())),
        Yaml::Integer(value) => Ok(Pattern::Literal(value.to_string())),
        Yaml::Array(parts) => Ok(Pattern::Sequence(parse_patterns(parts, path)?)),
        Yaml::Hash(entries) if entries.len() == 1 => {
            let (key, value) = match entries.front() {
                Some(entry) => entry,
                None => return Err(format_err(path, "expected a pattern")),
            };
            let key = key.as_str().unwrap_or("");
            let path = format!("{}.{}", path, key);

            match key {
                "class" => Ok(Pattern::Class(parse_class(expect_str(value, &path)?)?)),
                "not" => Ok(Pattern::Not(parse_class(expect_str(value, &path)?)?)),
                "alt" => match value {
                    Yaml::Array(parts) => Ok(Pattern::Alt(parse_patterns(parts, &path)?)),
                    _ => Err(format_err(&path, "expected a list of patterns")),
                },
                "star" => Ok(Pattern::Star(Box::new(parse_pattern(value, &path)?))),
                "plus" => Ok(Pattern::Plus(Box::new(parse_pattern(value, &path)?))),
                "opt" => Ok(Pattern::Opt(Box::new(parse_pattern(value, &path)?))),
                "macro" => Ok(Pattern::Macro(expect_str(value, &path)?.to_string())),
                "repeat" => parse_repeat(value, &path),
                _ => Err(format_err(&path, "unknown pattern operator")),
            }
        }
        _ => Err(format_err(
            path,
            "expected a string, a list or a single-operator mapping",
        )),
    }
}

fn parse_patterns(parts: &[Yaml], path: &str) -> Result<Vec<Pattern>, Error> {
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| parse_pattern(part, &format!("{}[{}]", path, i)))
        .collect()
}

fn parse_repeat(yaml: &Yaml, path: &str) -> Result<Pattern, Error> {
    let pattern = match &yaml["pattern"] {
        Yaml::BadValue => return Err(format_err(path, "missing 'pattern'")),
        pattern => parse_pattern(pattern, &format!("{}.pattern", path))?,
    };

    let min = match &yaml["min"] {
        Yaml::BadValue => 0,
        min => expect_count(min, &format!("{}.min", path))?,
    };
    let max = match &yaml["max"] {
        Yaml::BadValue | Yaml::Null => None,
        max => Some(expect_count(max, &format!("{}.max", path))?),
    };

    Ok(Pattern::Repeat {
        pattern: Box::new(pattern),
        min,
        max,
    })
}

fn expect_str<'y>(yaml: &'y Yaml, path: &str) -> Result<&'y str, Error> {
    yaml.as_str()
        .ok_or_else(|| format_err(path, "expected a string"))
}

fn expect_count(yaml: &Yaml, path: &str) -> Result<usize, Error> {
    yaml.as_i64()
        .filter(|count| *count >= 0)
        .map(|count| count as usize)
        .ok_or_else(|| format_err(path, "expected a non-negative integer"))
}

#[derive(Debug)]
pub enum Error {
    YamlErr(yaml_rust::ScanError),
    FormatErr(String),
    ClassErr(lex::Error),
    ConstructionErr(ConstructionError),
    UnknownTerminalErr(UnknownTerminalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::YamlErr(ref err) => write!(f, "Failed to read YAML: {}", err),
            Error::FormatErr(ref err) => write!(f, "Malformed description: {}", err),
            Error::ClassErr(ref err) => write!(f, "Invalid character class: {}", err),
            Error::ConstructionErr(ref err) => write!(f, "Failed to build automaton: {}", err),
            Error::UnknownTerminalErr(ref err) => write!(f, "Invalid ignore list: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::YamlErr(ref err) => Some(err),
            Error::FormatErr(_) => None,
            Error::ClassErr(ref err) => Some(err),
            Error::ConstructionErr(ref err) => Some(err),
            Error::UnknownTerminalErr(ref err) => Some(err),
        }
    }
}

impl From<yaml_rust::ScanError> for Error {
    fn from(err: yaml_rust::ScanError) -> Error {
        Error::YamlErr(err)
    }
}

impl From<lex::Error> for Error {
    fn from(err: lex::Error) -> Error {
        Error::ClassErr(err)
    }
}

impl From<ConstructionError> for Error {
    fn from(err: ConstructionError) -> Error {
        Error::ConstructionErr(err)
    }
}

impl From<UnknownTerminalError> for Error {
    fn from(err: UnknownTerminalError) -> Error {
        Error::UnknownTerminalErr(err)
    }
}

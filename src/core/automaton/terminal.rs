use {
    serde::{Deserialize, Serialize},
    std::{collections::HashMap, error, fmt},
};

pub type TerminalId = usize;

/// The terminal id reserved for the end of input.
pub const EOF: TerminalId = 0;

pub static EOF_NAME: &str = "EOF";

/// Terminal Registry: Bidirectional mapping between terminal names and terminal ids.
///
/// Ids are handed out densely in registration order, starting after the reserved `EOF` id.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TerminalRegistry {
    encoder: HashMap<String, TerminalId>,
    decoder: Vec<String>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        TerminalRegistry::from(vec![EOF_NAME.to_string()])
    }

    /// Returns the id of `name`, registering it first if it is not yet known.
    pub fn encode(&mut self, name: &str) -> TerminalId {
        if let Some(id) = self.encoder.get(name) {
            return *id;
        }

        let id = self.decoder.len();
        self.decoder.push(name.to_string());
        self.encoder.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Result<TerminalId, UnknownTerminalError> {
        match self.encoder.get(name) {
            Some(id) => Ok(*id),
            None => Err(UnknownTerminalError {
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self, id: TerminalId) -> Option<&str> {
        self.decoder.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: TerminalId) -> bool {
        id < self.decoder.len()
    }

    /// Returns the number of registered terminals, including `EOF`.
    pub fn len(&self) -> usize {
        self.decoder.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerminalId, &str)> {
        self.decoder
            .iter()
            .enumerate()
            .map(|(id, name)| (id, name.as_str()))
    }
}

impl Default for TerminalRegistry {
    fn default() -> Self {
        TerminalRegistry::new()
    }
}

impl From<Vec<String>> for TerminalRegistry {
    fn from(decoder: Vec<String>) -> Self {
        let encoder = decoder
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();

        TerminalRegistry { encoder, decoder }
    }
}

impl From<TerminalRegistry> for Vec<String> {
    fn from(registry: TerminalRegistry) -> Vec<String> {
        registry.decoder
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownTerminalError {
    name: String,
}

impl UnknownTerminalError {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownTerminalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown terminal '{}'", self.name)
    }
}

impl error::Error for UnknownTerminalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// An optional path prefix that scopes every key a provider touches.
///
/// An empty prefix leaves keys untouched. Otherwise keys are joined onto the prefix with
/// lexical `/` path-join semantics:
///
/// * empty segments and `.` segments are dropped
/// * `..` removes the preceding segment when there is one
/// * the result never ends in `/`
///
/// No escaping is performed, so a key with enough `..` segments can climb out of the prefix.
/// Backends that care about that (eg [`super::FilesystemProvider`]) check the result themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPrefix {
    prefix: String,
}

impl KeyPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Computes the effective key for `key`. This is a pure function of the prefix and `key`,
    /// so repeated calls never stack the prefix.
    pub fn apply(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            return key.to_string();
        }
        join(&self.prefix, key)
    }
}

impl From<String> for KeyPrefix {
    fn from(prefix: String) -> KeyPrefix {
        KeyPrefix { prefix }
    }
}

impl From<&str> for KeyPrefix {
    fn from(prefix: &str) -> KeyPrefix {
        KeyPrefix::new(prefix)
    }
}

impl std::fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

fn join(prefix: &str, key: &str) -> String {
    let rooted = prefix.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split('/').chain(key.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    // `/..` is `/`, but relative paths keep their leading `..`
                    segments.push(segment);
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => String::from("."),
        (false, false) => joined,
    }
}

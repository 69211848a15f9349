use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Namespace assumed when a block string has no `namespace:` prefix.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockStateError {
    #[error("block string {0:?} has an empty name")]
    EmptyName(String),
    #[error("block string {0:?} has an empty namespace")]
    EmptyNamespace(String),
    #[error("block string {0:?} opens a property list that is never closed")]
    UnclosedProperties(String),
    #[error("malformed property {prop:?} in block string {input:?}")]
    MalformedProperty { input: String, prop: String },
    #[error("block state properties are unique, but found multiple instances of {0:?}")]
    DuplicateProperty(String),
    #[error("{part} {value:?} contains a reserved character")]
    ReservedCharacter { part: &'static str, value: String },
    #[error("{part} {value:?} has leading or trailing whitespace")]
    SurroundingWhitespace { part: &'static str, value: String },
}

// Characters that would change how the canonical string splits apart.
const NAME_RESERVED: [char; 3] = [':', '[', ']'];
const PROP_RESERVED: [char; 4] = [',', '=', '[', ']'];

struct Inner {
    namespace: String,
    name: String,
    // Sorted by key, keys unique.
    props: Vec<(String, String)>,
    canonical: String,
}

/// Immutable block description: `namespace:name[key=value,...]`.
///
/// Equality, ordering and hashing all go through the canonical string, whose
/// properties are sorted by key, so the order properties were given in never
/// affects identity. Cloning is cheap.
#[derive(Clone)]
pub struct BlockState(Arc<Inner>);

impl BlockState {
    pub fn new<K, V>(
        namespace: impl Into<String>,
        name: impl Into<String>,
        props: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, BlockStateError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (namespace, name) = (namespace.into(), name.into());
        if namespace.is_empty() {
            return Err(BlockStateError::EmptyNamespace(format!(":{name}")));
        }
        if name.is_empty() {
            return Err(BlockStateError::EmptyName(format!("{namespace}:")));
        }
        check_part("namespace", &namespace, &NAME_RESERVED)?;
        check_part("name", &name, &NAME_RESERVED)?;

        let mut list: Vec<(String, String)> = props
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for (k, v) in &list {
            check_prop(&namespace, &name, k, v)?;
        }
        list.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(w) = list.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(BlockStateError::DuplicateProperty(w[0].0.clone()));
        }
        Ok(Self::from_sorted(namespace, name, list))
    }

    /// Parses `namespace:name[key=value,...]`. A missing namespace means `minecraft`.
    pub fn parse(s: &str) -> Result<Self, BlockStateError> {
        let (full_name, props_str) = match s.find('[') {
            None => (s, None),
            Some(open) => {
                let Some(inner) = s[open + 1..].strip_suffix(']') else {
                    return Err(BlockStateError::UnclosedProperties(s.to_string()));
                };
                (&s[..open], Some(inner))
            }
        };

        let (namespace, name) = match full_name.split_once(':') {
            Some((ns, n)) => (ns.trim(), n.trim()),
            None => (DEFAULT_NAMESPACE, full_name.trim()),
        };
        if namespace.is_empty() {
            return Err(BlockStateError::EmptyNamespace(s.to_string()));
        }
        if name.is_empty() {
            return Err(BlockStateError::EmptyName(s.to_string()));
        }

        let mut props = Vec::new();
        if let Some(props_str) = props_str.filter(|p| !p.trim().is_empty()) {
            for prop in props_str.split(',') {
                let malformed = || BlockStateError::MalformedProperty {
                    input: s.to_string(),
                    prop: prop.to_string(),
                };
                let (k, v) = prop.split_once('=').ok_or_else(malformed)?;
                let (k, v) = (k.trim(), v.trim());
                if k.is_empty() || v.contains('=') || prop.contains(['[', ']']) {
                    return Err(malformed());
                }
                props.push((k, v));
            }
        }
        Self::new(namespace, name, props)
    }

    fn from_sorted(namespace: String, name: String, props: Vec<(String, String)>) -> Self {
        let canonical = canonical_string(&namespace, &name, &props);
        BlockState(Arc::new(Inner {
            namespace,
            name,
            props,
            canonical,
        }))
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.0.namespace
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// `namespace:name`, without properties.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.0.canonical[..self.0.namespace.len() + 1 + self.0.name.len()]
    }

    /// Canonical `namespace:name[k=v,...]` form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.canonical
    }

    #[inline]
    pub fn has_props(&self) -> bool {
        !self.0.props.is_empty()
    }

    /// Properties in key order.
    pub fn props(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.0
            .props
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| self.0.props[i].1.as_str())
    }

    pub fn prop_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.prop(key).unwrap_or(default)
    }

    /// Same full name, and every property both states define has the same value.
    pub fn loosely_matches(&self, other: &BlockState) -> bool {
        if self.full_name() != other.full_name() {
            return false;
        }
        self.props()
            .all(|(k, v)| other.prop(k).is_none_or(|ov| ov == v))
    }

    pub fn to_mutable(&self) -> MutBlockState {
        MutBlockState {
            namespace: self.0.namespace.clone(),
            name: self.0.name.clone(),
            props: self.0.props.clone(),
            state_str: OnceCell::new(),
        }
    }
}

impl PartialEq for BlockState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.canonical == other.0.canonical
    }
}

impl Eq for BlockState {}

impl Hash for BlockState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.canonical.hash(state);
    }
}

impl PartialOrd for BlockState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.canonical.cmp(&other.0.canonical)
    }
}

impl fmt::Debug for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockState({})", self.0.canonical)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.canonical)
    }
}

impl FromStr for BlockState {
    type Err = BlockStateError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockState::parse(s)
    }
}

/// Editable block state. The canonical string is rebuilt lazily after edits.
#[derive(Clone, Debug)]
pub struct MutBlockState {
    namespace: String,
    name: String,
    props: Vec<(String, String)>,
    state_str: OnceCell<String>,
}

impl MutBlockState {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.find(key).ok().map(|i| self.props[i].1.as_str())
    }

    /// Overwrites `key` if present, inserts it otherwise.
    pub fn set_prop(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), BlockStateError> {
        let key = key.into();
        let value = value.into();
        check_prop(&self.namespace, &self.name, &key, &value)?;
        match self.find(&key) {
            Ok(i) => self.props[i].1 = value,
            Err(i) => self.props.insert(i, (key, value)),
        }
        self.state_str = OnceCell::new();
        Ok(())
    }

    pub fn remove_prop(&mut self, key: &str) -> Option<String> {
        let i = self.find(key).ok()?;
        self.state_str = OnceCell::new();
        Some(self.props.remove(i).1)
    }

    pub fn state_str(&self) -> &str {
        self.state_str
            .get_or_init(|| canonical_string(&self.namespace, &self.name, &self.props))
    }

    pub fn to_immutable(&self) -> BlockState {
        BlockState::from_sorted(self.namespace.clone(), self.name.clone(), self.props.clone())
    }

    fn find(&self, key: &str) -> Result<usize, usize> {
        self.props.binary_search_by(|(k, _)| k.as_str().cmp(key))
    }
}

impl From<MutBlockState> for BlockState {
    fn from(value: MutBlockState) -> Self {
        BlockState::from_sorted(value.namespace, value.name, value.props)
    }
}

fn check_part(part: &'static str, value: &str, reserved: &[char]) -> Result<(), BlockStateError> {
    if value.trim() != value {
        return Err(BlockStateError::SurroundingWhitespace {
            part,
            value: value.to_string(),
        });
    }
    if value.contains(reserved) {
        return Err(BlockStateError::ReservedCharacter {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_prop(namespace: &str, name: &str, key: &str, value: &str) -> Result<(), BlockStateError> {
    if key.is_empty() {
        return Err(BlockStateError::MalformedProperty {
            input: format!("{namespace}:{name}"),
            prop: format!("={value}"),
        });
    }
    check_part("property key", key, &PROP_RESERVED)?;
    check_part("property value", value, &PROP_RESERVED)
}

fn canonical_string(namespace: &str, name: &str, props: &[(String, String)]) -> String {
    let mut s = String::with_capacity(namespace.len() + name.len() + 1 + props.len() * 12);
    s.push_str(namespace);
    s.push(':');
    s.push_str(name);
    if !props.is_empty() {
        s.push('[');
        for (i, (k, v)) in props.iter().enumerate() {
            if i > 0 {
                s.push(',');
            }
            s.push_str(k);
            s.push('=');
            s.push_str(v);
        }
        s.push(']');
    }
    s
}

//! Cache keys for memoized calls with positional and keyword arguments.
//!
//! [`make_cache_key`] folds a call's arguments into one hashable
//! [`CacheKey`]:
//!
//! - keyword arguments are sorted by name, so call-site order never matters;
//! - with `typed`, the type tag of every argument is appended, so `1` and
//!   `1.0` (or `"1"`) land in different slots;
//! - a lone positional argument of a cheap type (`None`, `Int`, `Str`) with
//!   no keyword arguments is returned unwrapped as [`CacheKey::Single`];
//! - everything else becomes a [`HashedKey`] whose hash is computed once.
//!
//! ```
//! use boundcache::key::{args_key, make_cache_key, CacheKey, KeyArg};
//!
//! let a = make_cache_key([KeyArg::from(1)], [("x", KeyArg::from("a")), ("y", KeyArg::None)], false);
//! let b = make_cache_key([KeyArg::from(1)], [("y", KeyArg::None), ("x", KeyArg::from("a"))], false);
//! assert_eq!(a, b);
//!
//! assert_eq!(args_key([KeyArg::from(7)], false), CacheKey::Single(KeyArg::Int(7)));
//! ```
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// One hashable argument value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyArg {
    None,
    Bool(bool),
    Int(i64),
    /// IEEE-754 bit pattern; build with [`KeyArg::float`].
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<KeyArg>),
}

impl KeyArg {
    /// Float argument keyed by value: `-0.0` folds into `0.0` and every NaN
    /// into one canonical NaN.
    pub fn float(value: f64) -> Self {
        let value = if value == 0.0 {
            0.0
        } else if value.is_nan() {
            f64::NAN
        } else {
            value
        };
        Self::Float(value.to_bits())
    }

    /// Type tag appended to typed keys.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Tuple(_) => "tuple",
        }
    }

    fn is_fast(&self) -> bool {
        matches!(self, Self::None | Self::Int(_) | Self::Str(_))
    }
}

macro_rules! int_key_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyArg {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_key_arg!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for KeyArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for KeyArg {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<&str> for KeyArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for KeyArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&[u8]> for KeyArg {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<KeyArg>> for KeyArg {
    fn from(value: Vec<KeyArg>) -> Self {
        Self::Tuple(value)
    }
}

impl<T: Into<KeyArg>> From<Option<T>> for KeyArg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Composite key with its hash computed at construction.
#[derive(Debug, Clone)]
pub struct HashedKey {
    args: Vec<KeyArg>,
    kwargs: Vec<(String, KeyArg)>,
    types: Vec<&'static str>,
    hash: u64,
}

impl HashedKey {
    fn new(args: Vec<KeyArg>, kwargs: Vec<(String, KeyArg)>, types: Vec<&'static str>) -> Self {
        let mut hasher = FxHasher::default();
        args.hash(&mut hasher);
        kwargs.hash(&mut hasher);
        types.hash(&mut hasher);
        Self {
            args,
            kwargs,
            types,
            hash: hasher.finish(),
        }
    }

    pub fn args(&self) -> &[KeyArg] {
        &self.args
    }

    /// Keyword arguments, sorted by name.
    pub fn kwargs(&self) -> &[(String, KeyArg)] {
        &self.kwargs
    }

    /// Type tags; empty unless the key was built with `typed`.
    pub fn types(&self) -> &[&'static str] {
        &self.types
    }
}

impl PartialEq for HashedKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.args == other.args
            && self.kwargs == other.kwargs
            && self.types == other.types
    }
}

impl Eq for HashedKey {}

impl Hash for HashedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Key produced by [`make_cache_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A lone cheap positional argument, stored as-is.
    Single(KeyArg),
    Composite(HashedKey),
}

/// Builds the cache key for one call.
pub fn make_cache_key<A, W, N>(args: A, kwargs: W, typed: bool) -> CacheKey
where
    A: IntoIterator<Item = KeyArg>,
    W: IntoIterator<Item = (N, KeyArg)>,
    N: Into<String>,
{
    let mut args: Vec<KeyArg> = args.into_iter().collect();
    let mut kwargs: Vec<(String, KeyArg)> = kwargs
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();
    kwargs.sort_by(|a, b| a.0.cmp(&b.0));

    if typed {
        let types = args
            .iter()
            .chain(kwargs.iter().map(|(_, value)| value))
            .map(KeyArg::type_name)
            .collect();
        return CacheKey::Composite(HashedKey::new(args, kwargs, types));
    }

    if kwargs.is_empty() && args.len() == 1 && args[0].is_fast() {
        if let Some(arg) = args.pop() {
            return CacheKey::Single(arg);
        }
    }
    CacheKey::Composite(HashedKey::new(args, kwargs, Vec::new()))
}

/// [`make_cache_key`] for a call without keyword arguments.
pub fn args_key<A>(args: A, typed: bool) -> CacheKey
where
    A: IntoIterator<Item = KeyArg>,
{
    make_cache_key(args, Vec::<(String, KeyArg)>::new(), typed)
}

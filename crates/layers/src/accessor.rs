use std::sync::Arc;

use crate::data::Row;

/// Row extractor shared between the layer, its caches and the renderer.
pub type Accessor<V> = Arc<dyn Fn(&Row) -> V + Send + Sync>;

/// Single-slot cache of a row extractor keyed by a config's shape.
///
/// `resolve` reduces a config to the part the extractor depends on; as long
/// as that key is unchanged `get` hands back the same `Arc`, so edits to
/// unrelated config fields never rebuild the extractor.
pub struct MemoizedAccessor<C, V> {
    extract: fn(&C) -> Accessor<V>,
    resolve: fn(&C) -> String,
    cached: Option<(String, Accessor<V>)>,
}

impl<C, V> MemoizedAccessor<C, V> {
    pub fn new(extract: fn(&C) -> Accessor<V>, resolve: fn(&C) -> String) -> Self {
        Self {
            extract,
            resolve,
            cached: None,
        }
    }

    pub fn get(&mut self, config: &C) -> Accessor<V> {
        let key = (self.resolve)(config);
        if let Some((cached_key, accessor)) = &self.cached
            && *cached_key == key
        {
            return accessor.clone();
        }
        let accessor = (self.extract)(config);
        self.cached = Some((key, accessor.clone()));
        accessor
    }

    /// Key of the live extractor, if one has been built.
    pub fn key(&self) -> Option<&str> {
        self.cached.as_ref().map(|(k, _)| k.as_str())
    }

    pub fn resolve_key(&self, config: &C) -> String {
        (self.resolve)(config)
    }
}

impl<C, V> std::fmt::Debug for MemoizedAccessor<C, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizedAccessor")
            .field("key", &self.key())
            .finish()
    }
}

/// A channel value: either one constant or a pure function of the row.
#[derive(Clone)]
pub enum ChannelAccessor<V> {
    Constant(V),
    Scaled(Accessor<V>),
}

impl<V: Clone> ChannelAccessor<V> {
    pub fn eval(&self, row: &Row) -> V {
        match self {
            ChannelAccessor::Constant(v) => v.clone(),
            ChannelAccessor::Scaled(f) => f(row),
        }
    }

    pub fn constant(&self) -> Option<&V> {
        match self {
            ChannelAccessor::Constant(v) => Some(v),
            ChannelAccessor::Scaled(_) => None,
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for ChannelAccessor<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelAccessor::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            ChannelAccessor::Scaled(_) => f.write_str("Scaled(..)"),
        }
    }
}

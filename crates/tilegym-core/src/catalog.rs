//! The ordered set of tile kinds a problem understands.

use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::grid::TileId;

/// Ordered, named tile kinds with stable indices.
///
/// Insertion order defines each kind's [`TileId`], the one-hot width, and
/// the observation range `[0, len - 1]`. One kind is designated as the
/// border fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileCatalog {
    kinds: IndexMap<String, TileId>,
    border: TileId,
}

impl TileCatalog {
    /// Build a catalog from kind names in index order.
    pub fn new<I, S>(names: I, border: &str) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kinds = IndexMap::new();
        for name in names {
            let name = name.into();
            let count = kinds.len();
            if count > u8::MAX as usize {
                return Err(CatalogError::TooManyKinds { count: count + 1 });
            }
            if kinds.contains_key(&name) {
                return Err(CatalogError::DuplicateName { name });
            }
            kinds.insert(name, TileId(count as u8));
        }
        if kinds.is_empty() {
            return Err(CatalogError::Empty);
        }
        let border = *kinds.get(border).ok_or_else(|| CatalogError::UnknownName {
            name: border.to_string(),
        })?;
        Ok(Self { kinds, border })
    }

    /// Number of kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The kind used to fill borders and padding.
    pub fn border(&self) -> TileId {
        self.border
    }

    /// Id of a named kind.
    pub fn id(&self, name: &str) -> Option<TileId> {
        self.kinds.get(name).copied()
    }

    /// Id of a named kind, or an error naming it.
    pub fn require(&self, name: &str) -> Result<TileId, CatalogError> {
        self.id(name).ok_or_else(|| CatalogError::UnknownName {
            name: name.to_string(),
        })
    }

    /// Name of a kind.
    pub fn name(&self, id: TileId) -> Option<&str> {
        self.kinds.get_index(id.index()).map(|(n, _)| n.as_str())
    }

    /// Whether `id` is a defined kind.
    pub fn contains(&self, id: TileId) -> bool {
        id.index() < self.kinds.len()
    }

    /// Kind names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Kind ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.kinds.values().copied()
    }

    /// Highest defined id.
    pub fn max_id(&self) -> TileId {
        TileId((self.kinds.len() - 1) as u8)
    }
}

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const RESOURCES_FOLDER_NAME: &str = "resources";

/// Opaque handle of an image, sprite sheet or font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RsrcId(pub u32);

impl fmt::Display for RsrcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    /// Horizontal strip of equally wide frames.
    SpriteSheet { frames: u32 },
    Font { size: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDesc {
    pub id: RsrcId,
    pub key: &'static str,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceKeyError {
    #[error("resource key must not be empty")]
    Empty,
    #[error("resource key must not start with '/'")]
    LeadingSlash,
    #[error("resource key must not contain '\\\\'")]
    Backslash,
    #[error("resource key must not contain '..'")]
    ParentTraversal,
    #[error("resource key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceTableError {
    #[error("invalid key for resource {id}: {source}")]
    InvalidKey {
        id: RsrcId,
        #[source]
        source: ResourceKeyError,
    },
    #[error("resource id {id} is registered twice ('{first_key}' and '{second_key}')")]
    DuplicateId {
        id: RsrcId,
        first_key: &'static str,
        second_key: &'static str,
    },
    #[error("sprite sheet '{key}' must have at least one frame")]
    EmptySpriteSheet { key: &'static str },
}

pub(crate) fn validate_resource_key(key: &str) -> Result<(), ResourceKeyError> {
    if key.is_empty() {
        return Err(ResourceKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(ResourceKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(ResourceKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(ResourceKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(ResourceKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// Validated lookup from handles to their descriptors.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    descs: Vec<ResourceDesc>,
    index_by_id: HashMap<RsrcId, usize>,
}

impl ResourceTable {
    pub fn new(descs: &[ResourceDesc]) -> Result<Self, ResourceTableError> {
        let mut index_by_id = HashMap::with_capacity(descs.len());
        for (idx, desc) in descs.iter().enumerate() {
            validate_resource_key(desc.key).map_err(|source| ResourceTableError::InvalidKey {
                id: desc.id,
                source,
            })?;
            if matches!(desc.kind, ResourceKind::SpriteSheet { frames: 0 }) {
                return Err(ResourceTableError::EmptySpriteSheet { key: desc.key });
            }
            if let Some(&first) = index_by_id.get(&desc.id) {
                let first: &ResourceDesc = &descs[first];
                return Err(ResourceTableError::DuplicateId {
                    id: desc.id,
                    first_key: first.key,
                    second_key: desc.key,
                });
            }
            index_by_id.insert(desc.id, idx);
        }
        Ok(Self {
            descs: descs.to_vec(),
            index_by_id,
        })
    }

    pub fn get(&self, id: RsrcId) -> Option<&ResourceDesc> {
        self.index_by_id.get(&id).map(|&idx| &self.descs[idx])
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}

pub(crate) fn resolve_image_path(resources_dir: &Path, key: &str) -> Result<PathBuf, String> {
    validate_resource_key(key).map_err(|error| format!("invalid_key:{error}"))?;
    Ok(resources_dir.join(format!("{key}.png")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["map", "p/entities/player_robot", "a-b/c_d"] {
            assert!(validate_resource_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "A", "a.b"] {
            assert!(validate_resource_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn table_rejects_duplicate_ids() {
        let descs = [
            ResourceDesc {
                id: RsrcId(1),
                key: "map",
                kind: ResourceKind::Image,
            },
            ResourceDesc {
                id: RsrcId(1),
                key: "tile",
                kind: ResourceKind::Image,
            },
        ];

        let error = ResourceTable::new(&descs).expect_err("duplicate id");
        assert_eq!(
            error,
            ResourceTableError::DuplicateId {
                id: RsrcId(1),
                first_key: "map",
                second_key: "tile",
            }
        );
    }

    #[test]
    fn table_rejects_empty_sprite_sheet() {
        let descs = [ResourceDesc {
            id: RsrcId(0),
            key: "coin",
            kind: ResourceKind::SpriteSheet { frames: 0 },
        }];

        assert!(matches!(
            ResourceTable::new(&descs),
            Err(ResourceTableError::EmptySpriteSheet { key: "coin" })
        ));
    }

    #[test]
    fn table_looks_up_by_id() {
        let descs = [
            ResourceDesc {
                id: RsrcId(7),
                key: "font/vinque_rg",
                kind: ResourceKind::Font { size: 30 },
            },
            ResourceDesc {
                id: RsrcId(3),
                key: "map",
                kind: ResourceKind::Image,
            },
        ];

        let table = ResourceTable::new(&descs).expect("table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(RsrcId(3)).map(|desc| desc.key), Some("map"));
        assert!(table.get(RsrcId(4)).is_none());
    }

    #[test]
    fn image_path_is_rooted_in_resources_dir() {
        let path = resolve_image_path(Path::new("/share/resources"), "p/map").expect("path");
        assert_eq!(path, PathBuf::from("/share/resources/p/map.png"));
        assert!(resolve_image_path(Path::new("/share"), "../x").is_err());
    }
}

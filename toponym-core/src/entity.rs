//! Entity model shared by the classifier, checks and corrector.
//!
//! The decoder hands over [`RawEntity`] values; the classifier turns them into
//! [`Entity`] values carrying an explicit [`EntityKind`]. Entities are never
//! mutated: a correction produces a new value through [`Entity::with_tag`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;

/// OpenStreetMap-style key/value tags. Keys are unique.
pub type Tags = HashMap<String, String>;

/// The three OpenStreetMap element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntityKind {
    /// A single point.
    Node,
    /// An ordered list of node references.
    Way,
    /// A group of members of any kind.
    Relation,
}

impl EntityKind {
    /// Every kind, in the order the decoder emits them.
    pub const ALL: [Self; 3] = [Self::Node, Self::Way, Self::Relation];

    /// Lower-case name used in references and OSM API paths.
    ///
    /// # Examples
    /// ```
    /// use toponym_core::EntityKind;
    ///
    /// assert_eq!(EntityKind::Way.as_str(), "way");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }

    /// Single-letter prefix used by editor remote-control object lists.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Node => 'n',
            Self::Way => 'w',
            Self::Relation => 'r',
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`EntityKind`] or [`EntityRef`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEntityError {
    /// The kind name is not `node`, `way` or `relation`.
    #[error("unknown entity kind {0:?}")]
    UnknownKind(String),
    /// The reference is not of the form `kind/id`.
    #[error("malformed entity reference {0:?}")]
    MalformedRef(String),
}

impl FromStr for EntityKind {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(ParseEntityError::UnknownKind(other.to_owned())),
        }
    }
}

/// Stable `kind/id` reference to an entity.
///
/// # Examples
/// ```
/// use toponym_core::{EntityKind, EntityRef};
///
/// let reference = EntityRef::new(EntityKind::Way, 42);
/// assert_eq!(reference.to_string(), "way/42");
/// assert_eq!("way/42".parse::<EntityRef>(), Ok(reference));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    /// Kind of the referenced entity.
    pub kind: EntityKind,
    /// OpenStreetMap identifier.
    pub id: i64,
}

impl EntityRef {
    /// Build a reference from its parts.
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Browse link on openstreetmap.org, appended to every diagnostic.
    #[must_use]
    pub fn browse_url(&self) -> String {
        format!("https://www.openstreetmap.org/{}/{}", self.kind, self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('/')
            .ok_or_else(|| ParseEntityError::MalformedRef(s.to_owned()))?;
        let id = id
            .parse()
            .map_err(|_| ParseEntityError::MalformedRef(s.to_owned()))?;
        Ok(Self::new(kind.parse()?, id))
    }
}

/// A relation member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Reference to the member entity.
    pub target: EntityRef,
    /// Role of the member within the relation (may be empty).
    pub role: String,
}

/// Geometry or membership payload. Opaque to every check.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Node position, WGS84 with `x = longitude` and `y = latitude`.
    Point(Coord<f64>),
    /// Node identifiers of a way.
    NodeRefs(Vec<i64>),
    /// Members of a relation.
    Members(Vec<Member>),
}

/// An entity as yielded by the decoder, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntity {
    /// A node (plain or dense encoding).
    Node {
        /// OpenStreetMap identifier.
        id: i64,
        /// Tags carried by the node.
        tags: Tags,
        /// Node position.
        location: Coord<f64>,
    },
    /// A way.
    Way {
        /// OpenStreetMap identifier.
        id: i64,
        /// Tags carried by the way.
        tags: Tags,
        /// Ordered node identifiers.
        node_refs: Vec<i64>,
    },
    /// A relation.
    Relation {
        /// OpenStreetMap identifier.
        id: i64,
        /// Tags carried by the relation.
        tags: Tags,
        /// Relation members.
        members: Vec<Member>,
    },
}

impl RawEntity {
    /// Shape-derived reference, used by the classifier before conversion.
    #[must_use]
    pub const fn reference(&self) -> EntityRef {
        match self {
            Self::Node { id, .. } => EntityRef::new(EntityKind::Node, *id),
            Self::Way { id, .. } => EntityRef::new(EntityKind::Way, *id),
            Self::Relation { id, .. } => EntityRef::new(EntityKind::Relation, *id),
        }
    }
}

/// A classified entity.
///
/// # Examples
/// ```
/// use toponym_core::{Entity, EntityKind, Tags};
///
/// let entity = Entity::new(EntityKind::Way, 7, Tags::from([("name".into(), "Rue".into())]));
/// let renamed = entity.with_tag("name", "Rue Pasteur");
/// assert_eq!(entity.tag("name"), Some("Rue"));
/// assert_eq!(renamed.tag("name"), Some("Rue Pasteur"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Element kind.
    pub kind: EntityKind,
    /// OpenStreetMap identifier.
    pub id: i64,
    /// Tag map.
    pub tags: Tags,
    /// Geometry or membership, when the decoder supplied it.
    pub geometry: Option<Geometry>,
}

impl Entity {
    /// Construct an entity without geometry.
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64, tags: Tags) -> Self {
        Self {
            kind,
            id,
            tags,
            geometry: None,
        }
    }

    /// Attach a geometry payload.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// The `kind/id` reference of this entity.
    #[must_use]
    pub const fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind, self.id)
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether the entity carries `key` at all.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Whether the entity carries `key` with one of `values`.
    #[must_use]
    pub fn tag_is_any(&self, key: &str, values: &[&str]) -> bool {
        self.tag(key).is_some_and(|value| values.contains(&value))
    }

    /// The label, i.e. the `name` tag.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.tag("name")
    }

    /// Return a copy of this entity with `key` set to `value`.
    #[must_use]
    pub fn with_tag(&self, key: &str, value: &str) -> Self {
        let mut tags = self.tags.clone();
        tags.insert(key.to_owned(), value.to_owned());
        Self {
            tags,
            ..self.clone()
        }
    }
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        match raw {
            RawEntity::Node { id, tags, location } => {
                Self::new(EntityKind::Node, id, tags).with_geometry(Geometry::Point(location))
            }
            RawEntity::Way {
                id,
                tags,
                node_refs,
            } => Self::new(EntityKind::Way, id, tags).with_geometry(Geometry::NodeRefs(node_refs)),
            RawEntity::Relation { id, tags, members } => {
                Self::new(EntityKind::Relation, id, tags).with_geometry(Geometry::Members(members))
            }
        }
    }
}

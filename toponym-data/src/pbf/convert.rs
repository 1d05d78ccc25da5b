//! Conversion of decoded PBF elements into [`RawEntity`] values.

use geo::Coord;
use osmpbf::{Element, PrimitiveBlock, RelMemberType};
use toponym_core::{EntityKind, EntityRef, Member, RawEntity, Tags};

pub(super) fn block_entities(block: &PrimitiveBlock) -> Vec<RawEntity> {
    block.elements().map(raw_entity).collect()
}

fn raw_entity(element: Element<'_>) -> RawEntity {
    match element {
        Element::Node(node) => RawEntity::Node {
            id: node.id(),
            tags: collect_tags(node.tags()),
            location: Coord {
                x: node.lon(),
                y: node.lat(),
            },
        },
        Element::DenseNode(node) => RawEntity::Node {
            id: node.id(),
            tags: collect_tags(node.tags()),
            location: Coord {
                x: node.lon(),
                y: node.lat(),
            },
        },
        Element::Way(way) => RawEntity::Way {
            id: way.id(),
            tags: collect_tags(way.tags()),
            node_refs: way.refs().collect(),
        },
        Element::Relation(relation) => RawEntity::Relation {
            id: relation.id(),
            tags: collect_tags(relation.tags()),
            members: relation
                .members()
                .map(|member| Member {
                    role: member.role().unwrap_or_default().to_owned(),
                    target: EntityRef::new(member_kind(member.member_type), member.member_id),
                })
                .collect(),
        },
    }
}

fn collect_tags<'a, I>(tags: I) -> Tags
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

const fn member_kind(member_type: RelMemberType) -> EntityKind {
    match member_type {
        RelMemberType::Node => EntityKind::Node,
        RelMemberType::Way => EntityKind::Way,
        RelMemberType::Relation => EntityKind::Relation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn collects_tags_into_map() {
        let tags = collect_tags([("name", "Rue Pasteur"), ("highway", "residential")]);
        assert_eq!(tags.get("name").map(String::as_str), Some("Rue Pasteur"));
        assert_eq!(tags.len(), 2);
    }

    #[rstest]
    #[case(RelMemberType::Node, EntityKind::Node)]
    #[case(RelMemberType::Way, EntityKind::Way)]
    #[case(RelMemberType::Relation, EntityKind::Relation)]
    fn maps_member_types(#[case] member_type: RelMemberType, #[case] expected: EntityKind) {
        assert_eq!(member_kind(member_type), expected);
    }
}

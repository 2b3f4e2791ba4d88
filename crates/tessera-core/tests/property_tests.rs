//! Property-based tests for the mapping and block tree laws.

use proptest::prelude::*;
use std::sync::Arc;
use tessera_core::block::{ColumnBlock, TextBlock};
use tessera_core::field::{CheckboxField, HtmlField, NumberField, StringField, TextField};
use tessera_core::{
    Block, ContentFactory, ContentMapper, ContentType, FieldSet, FieldType, FieldValue,
    RegionType, RegionValue, ServiceProvider, TypeRegistry,
};

const KINDS: [&str; 5] = ["String", "Text", "Html", "Number", "Checkbox"];

#[derive(Debug, Clone)]
struct RegionSpec {
    collection: bool,
    kinds: Vec<usize>,
    items: usize,
}

fn region_spec() -> impl Strategy<Value = RegionSpec> {
    (
        any::<bool>(),
        prop::collection::vec(0..KINDS.len(), 1..4),
        0usize..4,
    )
        .prop_map(|(collection, kinds, items)| RegionSpec {
            collection,
            kinds,
            items,
        })
}

fn content_type(specs: &[RegionSpec]) -> ContentType {
    ContentType::new("Generated").with_regions(specs.iter().enumerate().map(|(i, spec)| {
        let id = format!("R{i}");
        let region = if spec.collection {
            RegionType::collection(id)
        } else {
            RegionType::new(id)
        };
        region.with_fields(
            spec.kinds
                .iter()
                .enumerate()
                .map(|(j, kind)| FieldType::new(format!("F{j}"), KINDS[*kind])),
        )
    }))
}

fn value(kind: usize, seed: &str, number: f64, position: usize) -> Box<dyn FieldValue> {
    let text = format!("{seed}-{position}");
    match KINDS[kind] {
        "String" => Box::new(StringField::from(text)),
        "Text" => Box::new(TextField::from(text)),
        "Html" => Box::new(HtmlField::from(format!("<p>{text}</p>"))),
        "Number" => Box::new(NumberField::from(number + position as f64)),
        _ => Box::new(CheckboxField::from(position % 2 == 0)),
    }
}

fn element(spec: &RegionSpec, seed: &str, number: f64, base: usize) -> RegionValue {
    if spec.kinds.len() == 1 {
        return RegionValue::Field(value(spec.kinds[0], seed, number, base));
    }
    let mut record = FieldSet::new();
    for (j, kind) in spec.kinds.iter().enumerate() {
        record.insert(format!("F{j}"), value(*kind, seed, number, base + j));
    }
    RegionValue::Record(record)
}

fn services() -> (ContentFactory, ContentMapper) {
    let registry = Arc::new(TypeRegistry::with_builtin_fields());
    let provider = Arc::new(ServiceProvider::new());
    (
        ContentFactory::new(Arc::clone(&registry), Arc::clone(&provider)),
        ContentMapper::new(registry, provider),
    )
}

#[derive(Debug, Clone)]
enum Shape {
    Text(String),
    Group(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = "[a-z]{0,8}".prop_map(Shape::Text);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape::Group)
    })
}

fn build(shape: &Shape) -> Block {
    match shape {
        Shape::Text(body) => Block::new(TextBlock {
            body: TextField::from(body.as_str()),
        }),
        Shape::Group(items) => items
            .iter()
            .fold(Block::new(ColumnBlock::default()), |group, item| {
                group.with_item(build(item))
            }),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_save_then_load_reproduces_model(
        specs in prop::collection::vec(region_spec(), 1..5),
        seed in "[a-zA-Z0-9]{0,12}",
        number in -1.0e6f64..1.0e6,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (factory, mapper) = services();
            let content_type = content_type(&specs);
            let mut model = factory.create_dynamic(&content_type).await.unwrap();

            for (i, spec) in specs.iter().enumerate() {
                let id = format!("R{i}");
                if spec.collection {
                    for k in 0..spec.items {
                        model.push_item(&id, element(spec, &seed, number, i * 100 + k * 10));
                    }
                } else {
                    model.insert(id, element(spec, &seed, number, i * 100));
                }
            }

            let saved = mapper.to_entity(&model, &content_type, None).unwrap();
            let loaded = mapper.to_dynamic(&saved.entity, &content_type).await.unwrap();
            prop_assert_eq!(loaded, model);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_collection_shrink_leaves_exact_rows(
        fields in 1usize..4,
        before in 1usize..8,
        after in 0usize..8,
    ) {
        prop_assume!(after < before);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (factory, mapper) = services();
            let spec = RegionSpec { collection: true, kinds: vec![0; fields], items: before };
            let content_type = content_type(std::slice::from_ref(&spec));

            let mut model = factory.create_dynamic(&content_type).await.unwrap();
            for k in 0..before {
                model.push_item("R0", element(&spec, "item", 0.0, k));
            }
            let first = mapper.to_entity(&model, &content_type, None).unwrap();

            let mut shrunk = factory.create_dynamic(&content_type).await.unwrap();
            for k in 0..after {
                shrunk.push_item("R0", element(&spec, "item", 0.0, k));
            }
            let second = mapper.to_entity(&shrunk, &content_type, Some(&first.entity)).unwrap();

            prop_assert_eq!(second.entity.region_rows("R0").len(), after * fields);
            prop_assert_eq!(second.removed.len(), (before - after) * fields);
            prop_assert!(second.entity.fields.iter().all(|row| (row.sort_order as usize) < after));
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_unflatten_inverts_flatten(shapes in prop::collection::vec(shape(), 0..4)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (_, mapper) = services();
            let tree: Vec<Block> = shapes.iter().map(build).collect();

            let mut records = mapper.flatten_blocks(&tree).unwrap();
            prop_assert_eq!(records.len(), tree.iter().map(Block::size).sum::<usize>());

            records.reverse();
            let rebuilt = mapper.unflatten_blocks(&records).await.unwrap();
            prop_assert_eq!(rebuilt, tree);
            Ok::<(), TestCaseError>(())
        })?;
    }
}

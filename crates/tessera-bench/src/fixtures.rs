//! Data generation for benchmarks.
//!
//! Generators are seeded so runs are reproducible.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tessera_core::block::{ColumnBlock, GalleryBlock, ImageBlock, QuoteBlock, TextBlock};
use tessera_core::field::{
    CheckboxField, HtmlField, ImageField, NumberField, StringField, TextField,
};
use tessera_core::{
    Block, ContentFactory, ContentMapper, ContentType, DynamicModel, FieldSet, FieldType,
    RegionType, RegionValue, ServiceProvider, TypeRegistry,
};
use uuid::Uuid;

const SEED: u64 = 12345;

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 10 collection items.
    Small,
    /// 100 collection items.
    #[default]
    Medium,
    /// 1,000 collection items.
    Large,
}

impl Scale {
    /// Collection item count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Small => 10,
            Scale::Medium => 100,
            Scale::Large => 1_000,
        }
    }

    pub fn all() -> [Scale; 3] {
        [Scale::Small, Scale::Medium, Scale::Large]
    }
}

fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

fn random_id(rng: &mut StdRng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    Uuid::from_bytes(bytes)
}

/// Landing page schema: a body, a hero record and a teaser collection.
pub fn landing_page_type() -> ContentType {
    ContentType::new("LandingPage")
        .with_region(RegionType::new("Body").with_field(FieldType::new("Default", "Html")))
        .with_region(RegionType::new("Hero").with_fields([
            FieldType::new("Title", "String"),
            FieldType::new("Image", "Image"),
        ]))
        .with_region(RegionType::collection("Teasers").with_fields([
            FieldType::new("Title", "String"),
            FieldType::new("Text", "Text"),
            FieldType::new("Priority", "Number"),
            FieldType::new("Featured", "Checkbox"),
        ]))
}

/// A landing page model with `teasers` collection items.
///
/// The hero image carries no id, so loading needs no media resolver.
pub fn generate_page(teasers: usize) -> DynamicModel {
    let mut rng = StdRng::seed_from_u64(SEED);

    let hero = FieldSet::new()
        .with("Title", StringField::from(random_string(&mut rng, 24)))
        .with("Image", ImageField::default());
    let mut model = DynamicModel::new("LandingPage")
        .with_region(
            "Body",
            RegionValue::Field(Box::new(HtmlField::from(format!(
                "<p>{}</p>",
                random_string(&mut rng, 400)
            )))),
        )
        .with_region("Hero", RegionValue::Record(hero));

    let items = (0..teasers)
        .map(|_| {
            RegionValue::Record(
                FieldSet::new()
                    .with("Title", StringField::from(random_string(&mut rng, 16)))
                    .with("Text", TextField::from(random_string(&mut rng, 120)))
                    .with("Priority", NumberField::from(rng.gen_range(0.0..100.0)))
                    .with("Featured", CheckboxField::from(rng.gen_bool(0.2))),
            )
        })
        .collect();
    model.insert("Teasers", RegionValue::Collection(items));
    model
}

/// A block forest of `groups` groups, each holding `children` leaves.
pub fn generate_blocks(groups: usize, children: usize) -> Vec<Block> {
    let mut rng = StdRng::seed_from_u64(SEED);

    (0..groups)
        .map(|index| {
            let mut group = if index % 2 == 0 {
                Block::new(ColumnBlock::default())
            } else {
                Block::new(GalleryBlock {
                    title: StringField::from(random_string(&mut rng, 12)),
                })
            };
            for child in 0..children {
                let leaf = match child % 3 {
                    0 => Block::new(TextBlock {
                        body: TextField::from(random_string(&mut rng, 80)),
                    }),
                    1 => Block::new(QuoteBlock {
                        quote: TextField::from(random_string(&mut rng, 60)),
                        author: StringField::from(random_string(&mut rng, 10)),
                    }),
                    _ => Block::new(ImageBlock {
                        image: ImageField::default(),
                        caption: StringField::from(random_string(&mut rng, 20)),
                    }),
                };
                group = group.with_item(leaf.with_id(random_id(&mut rng)));
            }
            group.with_id(random_id(&mut rng))
        })
        .collect()
}

/// Factory and mapper over the global registry with no collaborators.
pub fn services() -> (ContentFactory, ContentMapper) {
    let registry = TypeRegistry::global();
    let provider = Arc::new(ServiceProvider::new());
    (
        ContentFactory::new(Arc::clone(&registry), Arc::clone(&provider)),
        ContentMapper::new(registry, provider),
    )
}

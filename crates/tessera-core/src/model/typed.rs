//! Typed content models.
//!
//! A typed model declares, once per Rust type, how each region id maps onto
//! one of its members. The table is built on first use and cached.

use super::{ContentModel, Region, RegionRef, RegionSource, RegionValue};
use crate::error::{Error, Result};
use crate::field::{downcast_field, Field, UnresolvedField};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

/// A statically declared content model.
///
/// ```
/// use tessera_core::field::TextField;
/// use tessera_core::model::{Accessors, TypedModel};
///
/// #[derive(Default)]
/// struct Article {
///     body: TextField,
///     tags: Vec<TextField>,
/// }
///
/// impl TypedModel for Article {
///     const MODEL_TYPE: &'static str = "Article";
///
///     fn accessors() -> Accessors<Self> {
///         Accessors::<Self>::new()
///             .field("Body", |m| &m.body, |m| &mut m.body)
///             .field_collection("Tags", |m| &m.tags, |m| &mut m.tags)
///     }
/// }
/// ```
pub trait TypedModel: Default + Send + Sync + 'static {
    /// Name matched against `ContentType::model_type`.
    const MODEL_TYPE: &'static str;

    /// Build the region accessor table.
    fn accessors() -> Accessors<Self>;
}

/// Type-erased access to one region of a typed model.
pub trait RegionAccessor<M>: Send + Sync {
    /// Borrow the region.
    fn get<'m>(&self, model: &'m M) -> RegionRef<'m>;

    /// Assign the region.
    fn set(&self, model: &mut M, region: &str, value: RegionValue) -> Result<()>;
}

/// Region accessor table of a typed model.
pub struct Accessors<M> {
    regions: Vec<(&'static str, Box<dyn RegionAccessor<M>>)>,
}

impl<M: 'static> Accessors<M> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// Map a single-field region onto a field member.
    pub fn field<T: Field>(
        self,
        id: &'static str,
        get: fn(&M) -> &T,
        get_mut: fn(&mut M) -> &mut T,
    ) -> Self {
        self.with(id, SingleAccessor { get, get_mut })
    }

    /// Map a multi-field region onto a composite member.
    pub fn region<R: Region + Default + 'static>(
        self,
        id: &'static str,
        get: fn(&M) -> &R,
        get_mut: fn(&mut M) -> &mut R,
    ) -> Self {
        self.with(id, RecordAccessor { get, get_mut })
    }

    /// Map a single-field collection region onto a `Vec` of field members.
    pub fn field_collection<T: Field>(
        self,
        id: &'static str,
        get: fn(&M) -> &Vec<T>,
        get_mut: fn(&mut M) -> &mut Vec<T>,
    ) -> Self {
        self.with(id, SingleCollectionAccessor { get, get_mut })
    }

    /// Map a multi-field collection region onto a `Vec` of composites.
    pub fn region_collection<R: Region + Default + 'static>(
        self,
        id: &'static str,
        get: fn(&M) -> &Vec<R>,
        get_mut: fn(&mut M) -> &mut Vec<R>,
    ) -> Self {
        self.with(id, RecordCollectionAccessor { get, get_mut })
    }

    fn with(mut self, id: &'static str, accessor: impl RegionAccessor<M> + 'static) -> Self {
        self.regions.retain(|(existing, _)| *existing != id);
        self.regions.push((id, Box::new(accessor)));
        self
    }

    /// Look up the accessor for a region.
    pub fn get(&self, id: &str) -> Option<&dyn RegionAccessor<M>> {
        self.regions
            .iter()
            .find(|(region, _)| *region == id)
            .map(|(_, accessor)| accessor.as_ref())
    }

    /// Region ids in declaration order.
    pub fn region_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.regions.iter().map(|(id, _)| *id)
    }

    /// Number of mapped regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl<M: 'static> Default for Accessors<M> {
    fn default() -> Self {
        Self::new()
    }
}

static ACCESSOR_CACHE: OnceLock<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = OnceLock::new();

/// The cached accessor table of `M`, built on first use.
pub fn cached_accessors<M: TypedModel>() -> Arc<Accessors<M>> {
    let cache = ACCESSOR_CACHE.get_or_init(DashMap::new);
    let id = TypeId::of::<M>();

    let cached = cache.get(&id).map(|entry| Arc::clone(entry.value()));
    if let Some(accessors) = cached.and_then(|entry| entry.downcast::<Accessors<M>>().ok()) {
        return accessors;
    }

    let accessors = Arc::new(M::accessors());
    tracing::debug!(
        model = M::MODEL_TYPE,
        regions = accessors.len(),
        "built typed model accessors"
    );
    let shared: Arc<dyn Any + Send + Sync> = accessors.clone();
    cache.insert(id, shared);
    accessors
}

impl<M: TypedModel> RegionSource for M {
    fn has_region(&self, id: &str) -> bool {
        cached_accessors::<M>().get(id).is_some()
    }

    fn region(&self, id: &str) -> Option<RegionRef<'_>> {
        cached_accessors::<M>()
            .get(id)
            .map(|accessor| accessor.get(self))
    }
}

impl<M: TypedModel> ContentModel for M {
    fn set_region(&mut self, id: &str, value: RegionValue) -> Result<()> {
        match cached_accessors::<M>().get(id) {
            Some(accessor) => accessor.set(self, id, value),
            None => {
                tracing::debug!(model = M::MODEL_TYPE, region = id, "model has no member for region");
                Ok(())
            }
        }
    }
}

fn expect_field(region: &str, value: RegionValue) -> Result<Box<dyn crate::field::FieldValue>> {
    match value {
        RegionValue::Field(value) => Ok(value),
        _ => Err(Error::RegionShape {
            region: region.to_string(),
            expected: "field",
        }),
    }
}

fn expect_record<R: Region + Default>(region: &str, value: RegionValue) -> Result<R> {
    match value {
        RegionValue::Record(fields) => {
            let mut composite = R::default();
            for (id, value) in fields {
                composite.set_field(&id, value)?;
            }
            Ok(composite)
        }
        _ => Err(Error::RegionShape {
            region: region.to_string(),
            expected: "record",
        }),
    }
}

fn expect_collection(region: &str, value: RegionValue) -> Result<Vec<RegionValue>> {
    match value {
        RegionValue::Collection(items) => Ok(items),
        _ => Err(Error::RegionShape {
            region: region.to_string(),
            expected: "collection",
        }),
    }
}

struct SingleAccessor<M, T> {
    get: fn(&M) -> &T,
    get_mut: fn(&mut M) -> &mut T,
}

impl<M, T: Field> RegionAccessor<M> for SingleAccessor<M, T> {
    fn get<'m>(&self, model: &'m M) -> RegionRef<'m> {
        RegionRef::Field((self.get)(model))
    }

    fn set(&self, model: &mut M, region: &str, value: RegionValue) -> Result<()> {
        let value = downcast_field::<T>(expect_field(region, value)?, region)?;
        *(self.get_mut)(model) = value;
        Ok(())
    }
}

struct RecordAccessor<M, R> {
    get: fn(&M) -> &R,
    get_mut: fn(&mut M) -> &mut R,
}

impl<M, R: Region + Default + 'static> RegionAccessor<M> for RecordAccessor<M, R> {
    fn get<'m>(&self, model: &'m M) -> RegionRef<'m> {
        RegionRef::Record((self.get)(model))
    }

    fn set(&self, model: &mut M, region: &str, value: RegionValue) -> Result<()> {
        *(self.get_mut)(model) = expect_record::<R>(region, value)?;
        Ok(())
    }
}

struct SingleCollectionAccessor<M, T> {
    get: fn(&M) -> &Vec<T>,
    get_mut: fn(&mut M) -> &mut Vec<T>,
}

impl<M, T: Field> RegionAccessor<M> for SingleCollectionAccessor<M, T> {
    fn get<'m>(&self, model: &'m M) -> RegionRef<'m> {
        RegionRef::Collection(
            (self.get)(model)
                .iter()
                .map(|item| RegionRef::Field(item))
                .collect(),
        )
    }

    fn set(&self, model: &mut M, region: &str, value: RegionValue) -> Result<()> {
        let items = expect_collection(region, value)?
            .into_iter()
            .map(|item| {
                let value = expect_field(region, item)?;
                if value.downcast_ref::<UnresolvedField>().is_some() {
                    tracing::debug!(region, "undecoded collection item replaced by a default");
                    return Ok(T::default());
                }
                downcast_field::<T>(value, region)
            })
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(model) = items;
        Ok(())
    }
}

struct RecordCollectionAccessor<M, R> {
    get: fn(&M) -> &Vec<R>,
    get_mut: fn(&mut M) -> &mut Vec<R>,
}

impl<M, R: Region + Default + 'static> RegionAccessor<M> for RecordCollectionAccessor<M, R> {
    fn get<'m>(&self, model: &'m M) -> RegionRef<'m> {
        RegionRef::Collection(
            (self.get)(model)
                .iter()
                .map(|item| RegionRef::Record(item))
                .collect(),
        )
    }

    fn set(&self, model: &mut M, region: &str, value: RegionValue) -> Result<()> {
        let items = expect_collection(region, value)?
            .into_iter()
            .map(|item| expect_record::<R>(region, item))
            .collect::<Result<Vec<_>>>()?;
        *(self.get_mut)(model) = items;
        Ok(())
    }
}

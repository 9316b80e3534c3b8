//! Lowering nominal types to memory layouts.
//!
//! A layout is computed the first time it is asked for and then kept on the
//! datatype for the life of the registry. Fields added after that point do
//! not change an already computed layout.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::datatype::{DatatypeId, Registry, Settle, Style};
use crate::error::DatatypeError;

/// Size of pointers, object headers and supertype slots, in bytes.
pub const POINTER_SIZE: u32 = 8;
/// Size of a slice's length and capacity words, in bytes.
pub const SLICE_WORD_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    Int { bits: u32 },
    Float { bits: u32 },
    /// Opaque pointer to out-of-line data.
    Pointer,
    Struct { name: String, slots: Vec<Slot> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub name: String,
    pub repr: SlotRepr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotRepr {
    /// Runtime object header.
    Header,
    /// Reference to the supertype's representation.
    Supertype { ty: DatatypeId },
    /// A value stored in place.
    Inline { layout: Box<Layout> },
    /// A pointer to an object.
    Ref { ty: DatatypeId },
    Length,
    Capacity,
    /// Pointer to the first element of a slice.
    Elements { ty: DatatypeId },
}

impl Layout {
    /// Size in bytes. Primitives round up to whole bytes; there is no padding.
    pub fn size(&self) -> u32 {
        match self {
            Layout::Int { bits } | Layout::Float { bits } => bits.div_ceil(8),
            Layout::Pointer => POINTER_SIZE,
            Layout::Struct { slots, .. } => slots.iter().map(Slot::size).sum(),
        }
    }
}

impl Slot {
    fn new(name: impl Into<String>, repr: SlotRepr) -> Self {
        Slot {
            name: name.into(),
            repr,
        }
    }

    pub fn size(&self) -> u32 {
        match &self.repr {
            SlotRepr::Inline { layout } => layout.size(),
            SlotRepr::Length | SlotRepr::Capacity => SLICE_WORD_SIZE,
            SlotRepr::Header
            | SlotRepr::Supertype { .. }
            | SlotRepr::Ref { .. }
            | SlotRepr::Elements { .. } => POINTER_SIZE,
        }
    }
}

impl Registry {
    /// The lowered layout of a specialized type, memoized on first use.
    pub fn layout(&self, id: DatatypeId) -> Result<Arc<Layout>, DatatypeError> {
        let dt = self.get(id);
        if let Some(layout) = dt.layout.get() {
            return Ok(Arc::clone(layout));
        }
        if !dt.specialized || dt.wait_settled() == Settle::Failed {
            return Err(DatatypeError::UnspecializedLowering {
                name: self.name(id),
            });
        }

        let layout = Arc::new(self.lower(id)?);
        debug!(ty = %self.display(id), size = layout.size(), "lowered type");
        Ok(Arc::clone(dt.layout.get_or_init(|| layout)))
    }

    fn lower(&self, id: DatatypeId) -> Result<Layout, DatatypeError> {
        let info = self.info_of(id);
        match info.style {
            Style::Integer => Ok(Layout::Int { bits: info.bits }),
            Style::Floating => match info.bits {
                32 | 64 => Ok(Layout::Float { bits: info.bits }),
                bits => Err(DatatypeError::InvalidFloatWidth {
                    name: info.name.clone(),
                    bits,
                }),
            },
            Style::Method | Style::Union => Ok(Layout::Pointer),
            Style::Object => {
                let mut slots = vec![
                    Slot::new("header", SlotRepr::Header),
                    Slot::new("super", SlotRepr::Supertype { ty: info.supertype }),
                ];
                for (name, ty) in self.fields(id)? {
                    slots.push(Slot::new(name, self.member(ty)?));
                }
                Ok(Layout::Struct {
                    name: self.display(id),
                    slots,
                })
            }
            Style::Tuple => {
                let slots = self
                    .params(id)
                    .into_iter()
                    .enumerate()
                    .map(|(i, ty)| Ok(Slot::new(i.to_string(), self.member(ty)?)))
                    .collect::<Result<Vec<_>, DatatypeError>>()?;
                Ok(Layout::Struct {
                    name: self.display(id),
                    slots,
                })
            }
            Style::Slice => {
                let elem = self.params(id)[0];
                Ok(Layout::Struct {
                    name: self.display(id),
                    slots: vec![
                        Slot::new("len", SlotRepr::Length),
                        Slot::new("cap", SlotRepr::Capacity),
                        Slot::new("data", SlotRepr::Elements { ty: elem }),
                    ],
                })
            }
        }
    }

    /// Objects are held by reference, everything else in place.
    fn member(&self, ty: DatatypeId) -> Result<SlotRepr, DatatypeError> {
        if self.style(ty) == Style::Object {
            return Ok(SlotRepr::Ref { ty });
        }
        Ok(SlotRepr::Inline {
            layout: Box::new((*self.layout(ty)?).clone()),
        })
    }
}

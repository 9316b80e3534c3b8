//! The nominal datatype registry.
//!
//! Every nominal type lives in one append-only arena owned by a [`Registry`]
//! and is addressed by a [`DatatypeId`]. Types of the same family (a generic
//! and all of its specializations) share one [`TypeInfo`], addressed by a
//! [`TypeInfoId`]; comparing two datatypes' `info` ids is how "same declared
//! type" is asked.
//!
//! ## Specialization
//!
//! A generic type is created unspecialized. [`Registry::spawn_spec`] produces
//! the specialized instance for a tuple of parameters. Each `TypeInfo` guards
//! its specialization list with its own mutex; the lookup and the insertion
//! of a new entry happen under one acquisition, so concurrent callers asking
//! for the same tuple all receive the same id. Parameter tuples are compared
//! by id, never structurally.
//!
//! A new entry starts out building. Its fields are substituted outside the
//! family lock and the entry is then marked ready. Callers that find a
//! building entry wait until it settles, except lookups made while filling
//! in fields, which take the id as is. That is how a field refers back to
//! the type being built. If filling in fields fails, the entry is removed
//! from the cache before anyone waiting is woken.
//!
//! ## Locking
//!
//! Lock order is: a `TypeInfo` specialization mutex, then the arena locks.
//! Arena locks are held only for the duration of a push or a clone and never
//! across calls back into the registry. A thread never waits on a building
//! entry while it is itself filling in fields.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Condvar, Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

use crate::error::DatatypeError;
use crate::layout::Layout;
use helion_common::Span;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Handle to a datatype in a [`Registry`].
///
/// Only a registry hands out ids. An id is meaningful in the registry that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DatatypeId(pub(crate) u32);

impl DatatypeId {
    /// Position in the registry arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DatatypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a [`TypeInfo`] shared by a generic and its specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfoId(pub(crate) u32);

/// How a family of types is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Integer,
    Floating,
    Object,
    Union,
    Tuple,
    Method,
    Slice,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Style::Integer => "integer",
            Style::Floating => "floating",
            Style::Object => "object",
            Style::Union => "union",
            Style::Tuple => "tuple",
            Style::Method => "method",
            Style::Slice => "slice",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TypeInfo / Datatype
// ---------------------------------------------------------------------------

/// Data shared by every member of a type family.
pub struct TypeInfo {
    pub id: TypeInfoId,
    pub name: String,
    pub style: Style,
    /// Bit width; only meaningful for integer and floating styles.
    pub bits: u32,
    pub supertype: DatatypeId,
    /// Parameter names of the generic. Empty for non-generic types.
    pub param_names: Vec<String>,
    /// Accepts any number of parameters (tuples, unions, methods).
    pub variadic: bool,
    /// The unspecialized template datatype of this family.
    pub template: DatatypeId,
    specializations: Mutex<Vec<(Vec<DatatypeId>, DatatypeId)>>,
}

impl TypeInfo {
    pub fn is_generic(&self) -> bool {
        self.variadic || !self.param_names.is_empty()
    }
}

/// The declared type of a field.
///
/// Fields of a generic object may mention the generic's parameters, either
/// directly or as arguments of another generic. Specialization replaces both
/// forms with concrete ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Concrete(DatatypeId),
    Param(String),
    Apply {
        generic: DatatypeId,
        args: Vec<FieldType>,
    },
}

impl From<DatatypeId> for FieldType {
    fn from(id: DatatypeId) -> Self {
        FieldType::Concrete(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

/// Progress of a datatype through specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settle {
    Building,
    Ready,
    Failed,
}

/// One member of a type family, generic or specialized.
pub struct Datatype {
    pub id: DatatypeId,
    pub info: TypeInfoId,
    pub specialized: bool,
    /// Parameters this instance was specialized with.
    pub params: Vec<DatatypeId>,
    fields: RwLock<Vec<Field>>,
    pub(crate) layout: OnceLock<Arc<Layout>>,
    state: Mutex<Settle>,
    settled: Condvar,
}

impl Datatype {
    fn new(
        id: DatatypeId,
        info: TypeInfoId,
        specialized: bool,
        params: Vec<DatatypeId>,
        state: Settle,
    ) -> Self {
        Datatype {
            id,
            info,
            specialized,
            params,
            fields: RwLock::new(Vec::new()),
            layout: OnceLock::new(),
            state: Mutex::new(state),
            settled: Condvar::new(),
        }
    }

    /// Block until this datatype is no longer being built.
    pub(crate) fn wait_settled(&self) -> Settle {
        let mut state = self.state.lock();
        while *state == Settle::Building {
            self.settled.wait(&mut state);
        }
        *state
    }

    fn settle(&self, outcome: Settle) {
        *self.state.lock() = outcome;
        self.settled.notify_all();
    }
}

/// Ids of the types every registry starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtins {
    pub any: DatatypeId,
    pub bool: DatatypeId,
    pub byte: DatatypeId,
    pub short: DatatypeId,
    pub int: DatatypeId,
    pub long: DatatypeId,
    pub float: DatatypeId,
    pub double: DatatypeId,
    pub tuple: DatatypeId,
    pub union: DatatypeId,
    pub method: DatatypeId,
    pub slice: DatatypeId,
}

/// Everything `register` needs to add a new family.
struct NewType {
    name: String,
    style: Style,
    bits: u32,
    supertype: Option<DatatypeId>,
    param_names: Vec<String>,
    variadic: bool,
}

impl NewType {
    fn new(name: impl Into<String>, style: Style) -> Self {
        NewType {
            name: name.into(),
            style,
            bits: 0,
            supertype: None,
            param_names: Vec::new(),
            variadic: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Append-only arena of every nominal type.
pub struct Registry {
    infos: RwLock<Vec<Arc<TypeInfo>>>,
    types: RwLock<Vec<Arc<Datatype>>>,
    names: RwLock<FxHashMap<String, DatatypeId>>,
    builtins: Builtins,
}

impl Registry {
    /// A registry holding the builtin types.
    pub fn new() -> Self {
        let placeholder = DatatypeId(0);
        let mut reg = Registry {
            infos: RwLock::new(Vec::new()),
            types: RwLock::new(Vec::new()),
            names: RwLock::new(FxHashMap::default()),
            builtins: Builtins {
                any: placeholder,
                bool: placeholder,
                byte: placeholder,
                short: placeholder,
                int: placeholder,
                long: placeholder,
                float: placeholder,
                double: placeholder,
                tuple: placeholder,
                union: placeholder,
                method: placeholder,
                slice: placeholder,
            },
        };

        // Any is its own supertype; `register` defaults to the id being created.
        let any = reg.register(NewType::new("Any", Style::Object));

        let primitive = |name: &str, style, bits, supertype| NewType {
            bits,
            supertype: Some(supertype),
            ..NewType::new(name, style)
        };
        let long = reg.register(primitive("Long", Style::Integer, 64, any));
        let float = reg.register(primitive("Float", Style::Floating, 32, any));
        let bool = reg.register(primitive("Bool", Style::Integer, 1, long));
        let byte = reg.register(primitive("Byte", Style::Integer, 8, long));
        let short = reg.register(primitive("Short", Style::Integer, 16, long));
        let int = reg.register(primitive("Int", Style::Integer, 32, long));
        let double = reg.register(primitive("Double", Style::Floating, 64, float));

        let variadic = |name: &str, style| NewType {
            supertype: Some(any),
            variadic: true,
            ..NewType::new(name, style)
        };
        let tuple = reg.register(variadic("Tuple", Style::Tuple));
        let union = reg.register(variadic("Union", Style::Union));
        let method = reg.register(variadic("Fn", Style::Method));
        let slice = reg.register(NewType {
            supertype: Some(any),
            param_names: vec!["T".to_string()],
            ..NewType::new("Slice", Style::Slice)
        });

        reg.builtins = Builtins {
            any,
            bool,
            byte,
            short,
            int,
            long,
            float,
            double,
            tuple,
            union,
            method,
            slice,
        };
        reg
    }

    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    /// Number of datatypes in the arena, specializations included.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Add a family and its template without checking the name.
    fn register(&self, new: NewType) -> DatatypeId {
        let mut names = self.names.write();
        let mut infos = self.infos.write();
        let mut types = self.types.write();

        let id = DatatypeId(types.len() as u32);
        let info_id = TypeInfoId(infos.len() as u32);
        let info = TypeInfo {
            id: info_id,
            name: new.name.clone(),
            style: new.style,
            bits: new.bits,
            supertype: new.supertype.unwrap_or(id),
            param_names: new.param_names,
            variadic: new.variadic,
            template: id,
            specializations: Mutex::new(Vec::new()),
        };
        let specialized = !info.is_generic();
        infos.push(Arc::new(info));
        types.push(Arc::new(Datatype::new(
            id,
            info_id,
            specialized,
            Vec::new(),
            Settle::Ready,
        )));
        names.insert(new.name.clone(), id);

        debug!(name = %new.name, style = %new.style, id = id.0, "registered type");
        id
    }

    fn register_checked(&self, new: NewType) -> Result<DatatypeId, DatatypeError> {
        if self.names.read().contains_key(&new.name) {
            return Err(DatatypeError::DuplicateType { name: new.name });
        }
        Ok(self.register(new))
    }

    /// Create an object type, generic if `param_names` is non-empty.
    ///
    /// The supertype defaults to `Any`.
    pub fn create(
        &self,
        name: impl Into<String>,
        supertype: Option<DatatypeId>,
        param_names: Vec<String>,
    ) -> Result<DatatypeId, DatatypeError> {
        self.register_checked(NewType {
            supertype: Some(supertype.unwrap_or(self.builtins.any)),
            param_names,
            ..NewType::new(name, Style::Object)
        })
    }

    /// Create a specialized integer type whose supertype is `Long`.
    pub fn create_integer(
        &self,
        name: impl Into<String>,
        bits: u32,
    ) -> Result<DatatypeId, DatatypeError> {
        self.register_checked(NewType {
            bits,
            supertype: Some(self.builtins.long),
            ..NewType::new(name, Style::Integer)
        })
    }

    /// Create a specialized float type whose supertype is `Float`.
    ///
    /// Any width is accepted here; lowering rejects widths other than 32/64.
    pub fn create_float(
        &self,
        name: impl Into<String>,
        bits: u32,
    ) -> Result<DatatypeId, DatatypeError> {
        self.register_checked(NewType {
            bits,
            supertype: Some(self.builtins.float),
            ..NewType::new(name, Style::Floating)
        })
    }

    // ── Access ──────────────────────────────────────────────────────────

    /// The datatype behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different registry and is out of range
    /// here. Use [`Registry::try_get`] for ids of unknown origin.
    pub fn get(&self, id: DatatypeId) -> Arc<Datatype> {
        Arc::clone(&self.types.read()[id.index()])
    }

    pub fn try_get(&self, id: DatatypeId) -> Option<Arc<Datatype>> {
        self.types.read().get(id.index()).map(Arc::clone)
    }

    pub fn contains(&self, id: DatatypeId) -> bool {
        id.index() < self.len()
    }

    pub fn info(&self, id: TypeInfoId) -> Arc<TypeInfo> {
        Arc::clone(&self.infos.read()[id.0 as usize])
    }

    pub fn info_of(&self, id: DatatypeId) -> Arc<TypeInfo> {
        let info = self.get(id).info;
        self.info(info)
    }

    pub fn lookup(&self, name: &str) -> Option<DatatypeId> {
        self.names.read().get(name).copied()
    }

    pub fn name(&self, id: DatatypeId) -> String {
        self.info_of(id).name.clone()
    }

    pub fn style(&self, id: DatatypeId) -> Style {
        self.info_of(id).style
    }

    pub fn bits(&self, id: DatatypeId) -> u32 {
        self.info_of(id).bits
    }

    pub fn supertype(&self, id: DatatypeId) -> DatatypeId {
        self.info_of(id).supertype
    }

    pub fn params(&self, id: DatatypeId) -> Vec<DatatypeId> {
        self.get(id).params.clone()
    }

    pub fn is_specialized(&self, id: DatatypeId) -> bool {
        self.get(id).specialized
    }

    /// Specializations created so far for the family of `generic`.
    pub fn specializations(&self, generic: DatatypeId) -> Vec<DatatypeId> {
        self.info_of(generic)
            .specializations
            .lock()
            .iter()
            .map(|(_, id)| *id)
            .collect()
    }

    // ── Fields ──────────────────────────────────────────────────────────

    /// Declare a field on an object type, replacing the type of an existing
    /// field of the same name.
    pub fn add_field(
        &self,
        id: DatatypeId,
        name: impl Into<String>,
        ty: impl Into<FieldType>,
    ) -> Result<(), DatatypeError> {
        let name = name.into();
        let ty = ty.into();
        let dt = self.get(id);
        let info = self.info(dt.info);
        if info.style != Style::Object {
            return Err(DatatypeError::FieldOnNonObject {
                name: info.name.clone(),
                field: name,
            });
        }
        self.check_field_type(&dt, &info, &ty)?;

        let mut fields = dt.fields.write();
        match fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.ty = ty,
            None => fields.push(Field { name, ty }),
        }
        Ok(())
    }

    /// Parameters may only be mentioned by the generic template itself, and
    /// applied generics must receive the right number of arguments.
    fn check_field_type(
        &self,
        owner: &Datatype,
        info: &TypeInfo,
        ty: &FieldType,
    ) -> Result<(), DatatypeError> {
        match ty {
            FieldType::Concrete(_) => Ok(()),
            FieldType::Param(param) => {
                if owner.specialized || !info.param_names.contains(param) {
                    return Err(DatatypeError::UnknownType {
                        name: param.clone(),
                        span: Span::default(),
                    });
                }
                Ok(())
            }
            FieldType::Apply { generic, args } => {
                let target = self.info_of(*generic);
                if let Some(expected) = expected_arity(&target, args.len()) {
                    return Err(DatatypeError::SpecializationArity {
                        name: target.name.clone(),
                        expected,
                        found: args.len(),
                    });
                }
                args.iter()
                    .try_for_each(|arg| self.check_field_type(owner, info, arg))
            }
        }
    }

    /// Declared fields, parameters unsubstituted.
    pub fn field_templates(&self, id: DatatypeId) -> Vec<Field> {
        self.get(id).fields.read().clone()
    }

    /// Fields of a specialized type in declaration order.
    ///
    /// Waits for a specialization another thread is still building.
    pub fn fields(&self, id: DatatypeId) -> Result<Vec<(String, DatatypeId)>, DatatypeError> {
        let dt = self.get(id);
        let unspecialized = || DatatypeError::UnspecializedFields {
            name: self.name(id),
        };
        if !dt.specialized || dt.wait_settled() == Settle::Failed {
            return Err(unspecialized());
        }
        let fields = dt.fields.read();
        fields
            .iter()
            .map(|f| match f.ty {
                FieldType::Concrete(ty) => Ok((f.name.clone(), ty)),
                _ => Err(unspecialized()),
            })
            .collect()
    }

    // ── Specialization ──────────────────────────────────────────────────

    /// The specialization of `generic` for `params`, created on first use.
    ///
    /// Asking a specialized type for no parameters returns it unchanged. The
    /// returned type always has its fields filled in.
    pub fn spawn_spec(
        &self,
        generic: DatatypeId,
        params: &[DatatypeId],
    ) -> Result<DatatypeId, DatatypeError> {
        self.specialize(generic, params, false)
    }

    /// `nested` is set for lookups made while filling in the fields of
    /// another specialization. Those never wait on a building entry.
    fn specialize(
        &self,
        generic: DatatypeId,
        params: &[DatatypeId],
        nested: bool,
    ) -> Result<DatatypeId, DatatypeError> {
        let template = self.get(generic);
        let info = self.info(template.info);

        if template.specialized {
            if params.is_empty() {
                return Ok(generic);
            }
            return Err(DatatypeError::SpecializationArity {
                name: info.name.clone(),
                expected: 0,
                found: params.len(),
            });
        }
        if let Some(expected) = expected_arity(&info, params.len()) {
            return Err(DatatypeError::SpecializationArity {
                name: info.name.clone(),
                expected,
                found: params.len(),
            });
        }

        loop {
            let (id, fresh) = {
                let mut cache = info.specializations.lock();
                match cache.iter().find(|(key, _)| key.as_slice() == params) {
                    Some((_, existing)) => (*existing, false),
                    None => {
                        let id = self.push_datatype(template.info, params.to_vec());
                        cache.push((params.to_vec(), id));
                        (id, true)
                    }
                }
            };

            if !fresh {
                debug!(name = %info.name, id = id.0, "specialization cache hit");
                if nested || self.get(id).wait_settled() == Settle::Ready {
                    return Ok(id);
                }
                // The builder failed and withdrew the entry; try again.
                continue;
            }

            debug!(name = %info.name, id = id.0, "specialization cache miss");
            let dt = self.get(id);
            match self.substitute_fields(&template, &info, params) {
                Ok(fields) => {
                    *dt.fields.write() = fields;
                    dt.settle(Settle::Ready);
                    return Ok(id);
                }
                Err(err) => {
                    info.specializations.lock().retain(|(_, cached)| *cached != id);
                    dt.settle(Settle::Failed);
                    debug!(name = %info.name, id = id.0, error = %err, "specialization withdrawn");
                    return Err(err);
                }
            }
        }
    }

    fn substitute_fields(
        &self,
        template: &Datatype,
        info: &TypeInfo,
        params: &[DatatypeId],
    ) -> Result<Vec<Field>, DatatypeError> {
        let templates = template.fields.read().clone();
        templates
            .into_iter()
            .map(|field| {
                let ty = self.substitute(info, &field.ty, params)?;
                Ok(Field {
                    name: field.name,
                    ty: FieldType::Concrete(ty),
                })
            })
            .collect()
    }

    fn push_datatype(&self, info: TypeInfoId, params: Vec<DatatypeId>) -> DatatypeId {
        let mut types = self.types.write();
        let id = DatatypeId(types.len() as u32);
        types.push(Arc::new(Datatype::new(id, info, true, params, Settle::Building)));
        id
    }

    fn substitute(
        &self,
        info: &TypeInfo,
        ty: &FieldType,
        params: &[DatatypeId],
    ) -> Result<DatatypeId, DatatypeError> {
        match ty {
            FieldType::Concrete(id) => Ok(*id),
            FieldType::Param(name) => info
                .param_names
                .iter()
                .position(|p| p == name)
                .map(|i| params[i])
                .ok_or_else(|| DatatypeError::UnknownType {
                    name: name.clone(),
                    span: Span::default(),
                }),
            FieldType::Apply { generic, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.substitute(info, arg, params))
                    .collect::<Result<Vec<_>, _>>()?;
                self.specialize(*generic, &args, true)
            }
        }
    }

    pub fn tuple(&self, elems: &[DatatypeId]) -> Result<DatatypeId, DatatypeError> {
        self.spawn_spec(self.builtins.tuple, elems)
    }

    pub fn union(&self, members: &[DatatypeId]) -> Result<DatatypeId, DatatypeError> {
        self.spawn_spec(self.builtins.union, members)
    }

    /// A method type; parameter 0 of the result is the return type.
    pub fn method(&self, ret: DatatypeId, args: &[DatatypeId]) -> Result<DatatypeId, DatatypeError> {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(ret);
        params.extend_from_slice(args);
        self.spawn_spec(self.builtins.method, &params)
    }

    pub fn slice(&self, elem: DatatypeId) -> Result<DatatypeId, DatatypeError> {
        self.spawn_spec(self.builtins.slice, &[elem])
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn display_list(&self, ids: &[DatatypeId]) -> String {
        ids.iter()
            .map(|id| self.display(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Canonical rendering: `Int`, `List{Int}`, `Tuple{Int, Float}`,
    /// `Fn{Int, Int : Bool}`, `Slice{Byte}`.
    pub fn display(&self, id: DatatypeId) -> String {
        let dt = self.get(id);
        let info = self.info(dt.info);

        if !dt.specialized {
            if info.param_names.is_empty() {
                return info.name.clone();
            }
            return format!("{}{{{}}}", info.name, info.param_names.join(", "));
        }

        match info.style {
            Style::Integer | Style::Floating => info.name.clone(),
            Style::Method => {
                let args = self.display_list(&dt.params[1..]);
                if args.is_empty() {
                    format!("Fn{{ : {}}}", self.display(dt.params[0]))
                } else {
                    format!("Fn{{{} : {}}}", args, self.display(dt.params[0]))
                }
            }
            Style::Object | Style::Tuple | Style::Union | Style::Slice => {
                if dt.params.is_empty() {
                    info.name.clone()
                } else {
                    format!("{}{{{}}}", info.name, self.display_list(&dt.params))
                }
            }
        }
    }

    /// Symbol-safe name used for generated code.
    ///
    /// Parameters are appended as `$<len>` followed by `_<n><name>` for each
    /// parameter, where `<n>` is the length of the parameter's own mangled
    /// name and `<len>` the length of the whole suffix after `$<len>`.
    pub fn mangled_name(&self, id: DatatypeId) -> String {
        let dt = self.get(id);
        let info = self.info(dt.info);
        let mut out = match info.style {
            Style::Integer => return format!("i{}", info.bits),
            Style::Floating => {
                return match info.bits {
                    32 => "float".to_string(),
                    64 => "double".to_string(),
                    bits => format!("f{}", bits),
                }
            }
            Style::Object => format!("o.{}", info.name),
            Style::Union => "union.".to_string(),
            Style::Tuple => "tuple.".to_string(),
            Style::Method => "method.".to_string(),
            Style::Slice => "slice.".to_string(),
        };

        if !dt.params.is_empty() {
            let mut suffix = String::new();
            for param in &dt.params {
                let name = self.mangled_name(*param);
                suffix.push('_');
                suffix.push_str(&name.len().to_string());
                suffix.push_str(&name);
            }
            out.push('$');
            out.push_str(&suffix.len().to_string());
            out.push_str(&suffix);
        }
        out
    }
}

/// The parameter count a family requires when `found` is wrong, if any.
fn expected_arity(info: &TypeInfo, found: usize) -> Option<usize> {
    match info.style {
        Style::Method if found == 0 => Some(1),
        _ if !info.variadic && found != info.param_names.len() => Some(info.param_names.len()),
        _ => None,
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Global registry instance
// ---------------------------------------------------------------------------

static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, created with the builtins on first use.
pub fn global_registry() -> &'static Registry {
    GLOBAL_REGISTRY.get_or_init(Registry::new)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

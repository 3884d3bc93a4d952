//! Typed views over raw addresses.
//!
//! Everything in this module that dereferences an address is `unsafe`. A
//! [`TypedReference`] is only an address paired with a layout; building one
//! never touches memory and nothing here can verify that the address holds a
//! live, aligned value of the described type.

use std::{ptr, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, Result},
    value::{FieldLayout, RecordValue, ScalarType, TypeDescriptor, Value, ValueKind},
};

#[derive(Debug, Clone)]
pub struct TypedReference {
    ty: Rc<TypeDescriptor>,
    address: usize,
    unlocked: bool,
}

impl TypedReference {
    pub fn new(ty: Rc<TypeDescriptor>, address: usize) -> Self {
        Self {
            ty,
            address,
            unlocked: false,
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn descriptor(&self) -> &Rc<TypeDescriptor> {
        &self.ty
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Same address and layout with field visibility restrictions lifted.
    pub fn unlocked(&self) -> Self {
        Self {
            unlocked: true,
            ..self.clone()
        }
    }

    /// Copies every described field out of memory into a record value.
    ///
    /// # Safety
    ///
    /// `address` must point to a live, initialized value laid out exactly as
    /// the descriptor says, and every field must hold a valid bit pattern for
    /// its scalar type.
    pub unsafe fn read(&self) -> Value {
        let mut fields = IndexMap::new();
        for layout in &self.ty.fields {
            fields.insert(layout.name.clone(), self.load(layout));
        }
        Value::new(ValueKind::Record(RecordValue {
            ty: Rc::clone(&self.ty),
            fields,
            unlocked: self.unlocked,
        }))
    }

    /// # Safety
    ///
    /// Same contract as [`TypedReference::read`].
    pub unsafe fn read_field(&self, name: &str) -> Result<Value> {
        let layout = self.layout(name)?;
        Ok(self.load(layout))
    }

    fn layout(&self, name: &str) -> Result<&FieldLayout> {
        let layout = self.ty.field(name).ok_or_else(|| {
            Diagnostic::resolution(format!(
                "type `{}` has no field `{name}`",
                self.ty.qualified_name()
            ))
        })?;
        if !layout.exported && !self.unlocked {
            return Err(Diagnostic::argument(format!(
                "field `{name}` of `{}` is not exported",
                self.ty.qualified_name()
            ))
            .into());
        }
        Ok(layout)
    }

    unsafe fn load(&self, layout: &FieldLayout) -> Value {
        let at = self.address + layout.offset;
        match layout.scalar {
            ScalarType::Bool => Value::bool(fetch::<u8>(at) != 0),
            ScalarType::I8 => Value::int(fetch::<i8>(at).into()),
            ScalarType::I16 => Value::int(fetch::<i16>(at).into()),
            ScalarType::I32 => Value::int(fetch::<i32>(at).into()),
            ScalarType::I64 => Value::int(fetch::<i64>(at)),
            ScalarType::U8 => Value::int(fetch::<u8>(at).into()),
            ScalarType::U16 => Value::int(fetch::<u16>(at).into()),
            ScalarType::U32 => Value::int(fetch::<u32>(at).into()),
            ScalarType::F32 => Value::float(fetch::<f32>(at).into()),
            ScalarType::F64 => Value::float(fetch::<f64>(at)),
        }
    }
}

unsafe fn fetch<T: Copy>(address: usize) -> T {
    ptr::read_unaligned(address as *const T)
}

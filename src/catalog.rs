//! Per-result field catalog.
//!
//! Built once per named result, on first row access rather than at execute
//! time. Driver-side introspection may advance the result's read position,
//! so restoring it is an explicit final step of the build contract here, not
//! an incidental fix-up at the call site.

use crate::driver::RawResult;
use crate::error::Error;
use crate::transform::{transform_for, Transform};

/// Immutable description of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Normalized server type tag: the leading `_` array marker is stripped
    /// and recorded in `is_array` instead.
    pub type_tag: String,
    pub is_array: bool,
    pub transform: Transform,
}

/// Introspect every column of `raw` and return the descriptor list, leaving
/// the driver-level read position at `restore_row`.
pub fn build_catalog(
    raw: &mut dyn RawResult,
    restore_row: usize,
) -> Result<Vec<FieldDescriptor>, Error> {
    let mut fields = Vec::with_capacity(raw.field_count());
    for col in 0..raw.field_count() {
        let name = raw.field_name(col).to_string();
        let mut type_tag = raw.field_type_tag(col).to_string();
        let is_array = type_tag.starts_with('_');
        if is_array {
            type_tag.remove(0);
        }
        let transform = transform_for(&type_tag);
        fields.push(FieldDescriptor {
            name,
            type_tag,
            is_array,
            transform,
        });
    }
    raw.seek(restore_row)?;
    Ok(fields)
}

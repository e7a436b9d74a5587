//! Field path resolution against the schema, materializing nested messages on the way down.

#![forbid(unsafe_code)]

use qbind_core::Message;
use qbind_schema::{FieldDescriptor, Registry};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::DecodeError;

/// Outcome of walking a path.
#[derive(Debug)]
pub enum Resolved<'m, 'r> {
    /// Terminal field and the message that owns it.
    Field { owner: &'m mut Message, field: &'r FieldDescriptor },
    /// Some segment names no field; the parameter is not for this schema.
    Skip,
}

/// Walk `path` from `root`. Intermediate segments must be singular, registered message fields.
/// The whole path is checked against the schema before any child message is materialized, so a
/// skipped parameter leaves `root` untouched.
pub fn resolve<'m, 'r, S: AsRef<str>>(
    root: &'m mut Message,
    registry: &'r Registry,
    path: &[S],
) -> Result<Resolved<'m, 'r>, DecodeError> {
    let Some((last, parents)) = path.split_last() else { return Err(DecodeError::EmptyPath) };
    let mut md = registry
        .message(root.type_name())
        .ok_or_else(|| DecodeError::UnknownMessageType(root.type_name().to_string()))?;

    let mut chain: SmallVec<[(&'r FieldDescriptor, &'r str); 4]> = SmallVec::new();
    for seg in parents {
        let seg = seg.as_ref();
        let Some(fd) = md.find_field(seg) else {
            debug!(type_name = %md.name(), path = %joined(path), segment = seg, "field not found; skipping parameter");
            return Ok(Resolved::Skip);
        };
        if !fd.is_singular_message() {
            return Err(unsupported(path, format!("{seg:?} is not a message")));
        }
        let type_name = fd.field_type().type_name().unwrap_or_default();
        if registry.well_known(type_name).is_some() {
            return Err(unsupported(path, format!("{seg:?} is a {type_name} and takes a literal value")));
        }
        let Some(child_md) = registry.message(type_name) else {
            return Err(DecodeError::UnsupportedMessageType { field: joined(path), type_name: type_name.to_string() });
        };
        chain.push((fd, type_name));
        md = child_md;
    }
    let Some(field) = md.find_field(last.as_ref()) else {
        debug!(type_name = %md.name(), path = %joined(path), "field not found; skipping parameter");
        return Ok(Resolved::Skip);
    };

    let mut owner = root;
    for (fd, type_name) in chain {
        if let Some(group) = fd.oneof() {
            match owner.which_oneof(group) {
                Some(existing) if existing != fd.name() => {
                    return Err(DecodeError::OneofConflict {
                        oneof: group.to_string(),
                        field: fd.name().to_string(),
                        existing: existing.to_string(),
                    });
                }
                Some(_) => {}
                None => owner.mark_oneof(group, fd.name()),
            }
        }
        owner = owner
            .child_mut(fd.name(), type_name)
            .ok_or_else(|| unsupported(path, format!("{:?} already holds a non-message value", fd.name())))?;
    }
    Ok(Resolved::Field { owner, field })
}

pub(crate) fn joined<S: AsRef<str>>(path: &[S]) -> String {
    let mut out = String::new();
    for (i, s) in path.iter().enumerate() {
        if i > 0 { out.push('.'); }
        out.push_str(s.as_ref());
    }
    out
}

fn unsupported<S: AsRef<str>>(path: &[S], reason: String) -> DecodeError {
    DecodeError::UnsupportedPath { path: joined(path), reason }
}

//! MIB object registry.
//!
//! The registry is a flat, ordered list of managed objects. Scalar objects
//! answer for exactly one instance OID; tabular objects own an OID subtree
//! and resolve instances through callbacks. Lookup walks the list in
//! registration order and the first match wins, so the list must be kept in
//! ascending OID order for GETNEXT to walk the tree correctly.

use smallvec::SmallVec;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;
use std::cmp::Ordering;

/// Instance suffix for tabular objects (arcs past the registered prefix).
pub type Suffix = SmallVec<[u32; 8]>;

/// Reads the value for an instance. Receives the instance suffix (empty for
/// scalars). Returning `None` means the instance does not exist.
pub type GetFn = Box<dyn FnMut(&[u32]) -> Option<Value> + Send>;

/// Returns the first instance suffix strictly after the given one, or the
/// first instance of the table when the suffix is empty. `None` means the
/// table is exhausted.
pub type NextFn = Box<dyn FnMut(&[u32]) -> Option<Suffix> + Send>;

/// Applies a write. Returning `false` fails the whole SET with genErr.
pub type SetFn = Box<dyn FnMut(&[u32], &Value) -> bool + Send>;

/// A managed object: a registered OID plus the hooks that serve it.
pub struct MibObject {
    oid: Oid,
    value: Value,
    get: Option<GetFn>,
    next_instance: Option<NextFn>,
    set: Option<SetFn>,
}

impl MibObject {
    /// A scalar object serving a stored value at exactly `oid`.
    ///
    /// The OID must include the `.0` instance arc. A SET on a scalar with no
    /// [`with_set`](Self::with_set) callback replaces the stored value in
    /// place.
    pub fn scalar(oid: Oid, value: Value) -> Self {
        Self {
            oid,
            value,
            get: None,
            next_instance: None,
            set: None,
        }
    }

    /// A tabular object owning the subtree under `oid`.
    ///
    /// The stored value's type is what a SET probe checks against; the
    /// callbacks serve the actual instances.
    pub fn table(oid: Oid, value_type: Value, get: GetFn, next_instance: NextFn) -> Self {
        Self {
            oid,
            value: value_type,
            get: Some(get),
            next_instance: Some(next_instance),
            set: None,
        }
    }

    /// Compute the value through a callback instead of the stored value.
    pub fn with_get(mut self, get: GetFn) -> Self {
        self.get = Some(get);
        self
    }

    /// Route writes through a callback instead of replacing the stored
    /// value.
    pub fn with_set(mut self, set: SetFn) -> Self {
        self.set = Some(set);
        self
    }

    /// The registered OID.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    fn is_tabular(&self) -> bool {
        self.next_instance.is_some()
    }

    fn is_settable(&self) -> bool {
        // OBJECT IDENTIFIER values are read-only; everything else accepts
        // writes, through the callback when one is installed
        !matches!(self.value, Value::ObjectIdentifier(_))
    }

    /// Match a request OID against this object, yielding the instance
    /// suffix. Scalars need an exact match; tables need the registered OID
    /// as a strict prefix.
    fn match_oid<'a>(&self, request: &'a Oid) -> Option<&'a [u32]> {
        if self.is_tabular() {
            if request.len() > self.oid.len() && request.starts_with(&self.oid) {
                Some(&request.arcs()[self.oid.len()..])
            } else {
                None
            }
        } else if request == &self.oid {
            Some(&[])
        } else {
            None
        }
    }

    fn read(&mut self, suffix: &[u32]) -> Option<Value> {
        match self.get.as_mut() {
            Some(get) => get(suffix),
            None => Some(self.value.clone()),
        }
    }
}

impl std::fmt::Debug for MibObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MibObject")
            .field("oid", &self.oid)
            .field("value", &self.value)
            .field("tabular", &self.is_tabular())
            .finish()
    }
}

/// Ordered collection of managed objects.
#[derive(Default)]
pub struct MibRegistry {
    objects: Vec<MibObject>,
}

impl MibRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Register an object at the end of the list.
    ///
    /// The list order is the GETNEXT walk order. Registering out of
    /// ascending OID order is not corrected, only reported, because a
    /// deliberate shadowing registration looks the same as a mistake.
    pub fn register(&mut self, object: MibObject) {
        if let Some(last) = self.objects.last() {
            if last.oid.cmp(&object.oid) != Ordering::Less {
                tracing::warn!(
                    target: "microsnmp::mib",
                    { previous = %last.oid, registered = %object.oid },
                    "object registered out of ascending OID order; GETNEXT walks may skip it"
                );
            }
        }
        self.objects.push(object);
    }

    /// Resolve an exact instance for GET. On success the varbind's value is
    /// filled in and `true` is returned.
    pub fn get(&mut self, varbind: &mut VarBind) -> bool {
        for object in &mut self.objects {
            let Some(suffix) = object.match_oid(&varbind.oid) else {
                continue;
            };
            let suffix: Suffix = SmallVec::from_slice(suffix);
            if let Some(value) = object.read(&suffix) {
                varbind.value = value;
                return true;
            }
            return false;
        }
        false
    }

    /// Resolve the lexicographically next instance for GETNEXT. On success
    /// the varbind's OID is rewritten to the found instance and its value
    /// filled in.
    pub fn get_next(&mut self, varbind: &mut VarBind) -> bool {
        let request = varbind.oid.clone();
        for object in &mut self.objects {
            if object.is_tabular() {
                let suffix: Suffix = match request.cmp_shared(&object.oid) {
                    // Request sorts before the whole table: start at the top
                    Ordering::Less => Suffix::new(),
                    Ordering::Equal => {
                        if request.len() > object.oid.len() {
                            SmallVec::from_slice(&request.arcs()[object.oid.len()..])
                        } else {
                            Suffix::new()
                        }
                    }
                    Ordering::Greater => continue,
                };
                let Some(next) = object.next_instance.as_mut().and_then(|f| f(&suffix)) else {
                    // Table exhausted past this suffix; fall through to the
                    // next registered object
                    continue;
                };
                // The table named this instance; a getter that then refuses
                // it ends the walk rather than skipping ahead
                let Some(value) = object.read(&next) else {
                    return false;
                };
                varbind.oid = object.oid.join(&next);
                varbind.value = value;
                return true;
            }

            // Scalar: the object qualifies when it sorts strictly after the
            // request OID
            let after = match request.cmp_shared(&object.oid) {
                Ordering::Less => true,
                Ordering::Equal => request.len() < object.oid.len(),
                Ordering::Greater => false,
            };
            if !after {
                continue;
            }
            let Some(value) = object.read(&[]) else {
                return false;
            };
            varbind.oid = object.oid.clone();
            varbind.value = value;
            return true;
        }
        false
    }

    /// SET phase one: check the target exists and accepts writes, without
    /// touching anything. Returns the BER tag the write must carry.
    pub fn probe(&self, varbind: &VarBind) -> Option<u8> {
        for object in &self.objects {
            if object.match_oid(&varbind.oid).is_none() {
                continue;
            }
            if !object.is_settable() {
                return None;
            }
            return Some(object.value.ber_tag());
        }
        None
    }

    /// SET phase two: apply the write probed in phase one.
    pub fn set(&mut self, varbind: &VarBind) -> bool {
        for object in &mut self.objects {
            let Some(suffix) = object.match_oid(&varbind.oid) else {
                continue;
            };
            if !object.is_settable() {
                return false;
            }
            let suffix: Suffix = SmallVec::from_slice(suffix);
            return match object.set.as_mut() {
                Some(set) => set(&suffix, &varbind.value),
                None => {
                    object.value = varbind.value.clone();
                    true
                }
            };
        }
        false
    }
}

impl std::fmt::Debug for MibRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MibRegistry")
            .field("objects", &self.objects)
            .finish()
    }
}

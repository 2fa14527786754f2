//! Port identities and wiring
//!
//! Defines the value types used to refer to node outputs:
//!
//! - [`PortAddress`]: one output port of one node (the mapping key)
//! - [`PortElement`]: one element of an output port
//! - [`PortRange`]: a contiguous run of elements of one output port
//! - [`PortElements`]: an ordered list of ranges, the wiring of an input

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::error::{TransformError, TransformResult};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of a node
///
/// Identifiers are drawn from a process-wide counter, so a node built in one
/// model never shares its identity with a node of another model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh identifier
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw identifier
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Value type carried by a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    /// Boolean values
    Boolean,
    /// 32-bit integers
    Integer,
    /// 64-bit integers
    BigInt,
    /// Single-precision reals
    SmallReal,
    /// Double-precision reals
    Real,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortType::Boolean => "boolean",
            PortType::Integer => "integer",
            PortType::BigInt => "bigint",
            PortType::SmallReal => "smallreal",
            PortType::Real => "real",
        };
        f.write_str(name)
    }
}

/// Address of one output port: owning node + port index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortAddress {
    /// Owning node
    pub node: NodeId,
    /// Output port index on that node
    pub port: usize,
}

impl PortAddress {
    /// Create a port address
    pub const fn new(node: NodeId, port: usize) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// A single element of an output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortElement {
    /// Port holding the element
    pub address: PortAddress,
    /// Element index within the port
    pub index: usize,
}

impl PortElement {
    /// Create a port element
    pub const fn new(address: PortAddress, index: usize) -> Self {
        Self { address, index }
    }
}

impl fmt::Display for PortElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.address, self.index)
    }
}

/// A contiguous run of elements of one output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    /// Referenced port
    pub address: PortAddress,
    /// First element
    pub start: usize,
    /// Number of elements
    pub len: usize,
}

impl PortRange {
    /// Create a range
    pub const fn new(address: PortAddress, start: usize, len: usize) -> Self {
        Self {
            address,
            start,
            len,
        }
    }

    /// One past the last element
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Element at `offset` within the range
    pub fn element(&self, offset: usize) -> Option<PortElement> {
        (offset < self.len).then(|| PortElement::new(self.address, self.start + offset))
    }

    /// Iterate the elements of the range
    pub fn elements(&self) -> impl Iterator<Item = PortElement> + '_ {
        (self.start..self.end()).map(move |index| PortElement::new(self.address, index))
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.address, self.start, self.end())
    }
}

/// Ordered reference to ranges of one or more output ports
///
/// Adjacent ranges over the same port are always merged, so two wirings that
/// select the same elements in the same order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortElements {
    ranges: SmallVec<[PortRange; 1]>,
    port_type: PortType,
}

impl PortElements {
    /// An empty wiring of the given type
    pub fn empty(port_type: PortType) -> Self {
        Self {
            ranges: SmallVec::new(),
            port_type,
        }
    }

    /// All elements of an output port
    pub fn from_port(port: &OutputPort) -> Self {
        Self::from_range(PortRange::new(port.address, 0, port.size), port.port_type)
    }

    /// A single range
    pub fn from_range(range: PortRange, port_type: PortType) -> Self {
        let mut elements = Self::empty(port_type);
        elements.push_range(range);
        elements
    }

    /// Gather individual elements, merging contiguous runs back into ranges
    pub fn from_elements<I>(elements: I, port_type: PortType) -> Self
    where
        I: IntoIterator<Item = PortElement>,
    {
        let mut result = Self::empty(port_type);
        for element in elements {
            result.push_range(PortRange::new(element.address, element.index, 1));
        }
        result
    }

    /// Concatenate several wirings of the same type
    pub fn concat(parts: &[PortElements]) -> TransformResult<Self> {
        let first = parts
            .first()
            .ok_or_else(|| TransformError::Internal("cannot concatenate zero wirings".into()))?;
        let mut result = Self::empty(first.port_type);
        for part in parts {
            result.append(part)?;
        }
        Ok(result)
    }

    /// Append another wiring of the same type
    pub fn append(&mut self, other: &PortElements) -> TransformResult<()> {
        if other.port_type != self.port_type {
            return Err(TransformError::PortTypeMismatch {
                expected: self.port_type,
                found: other.port_type,
            });
        }
        for range in &other.ranges {
            self.push_range(*range);
        }
        Ok(())
    }

    /// Sub-wiring of `len` elements starting at `start`
    pub fn slice(&self, start: usize, len: usize) -> TransformResult<Self> {
        let end = start.checked_add(len).ok_or(TransformError::SizeMismatch {
            expected: usize::MAX,
            found: self.size(),
        })?;
        if end > self.size() {
            return Err(TransformError::SizeMismatch {
                expected: end,
                found: self.size(),
            });
        }
        Ok(Self::from_elements(
            self.elements().skip(start).take(len),
            self.port_type,
        ))
    }

    /// Total number of elements
    pub fn size(&self) -> usize {
        self.ranges.iter().map(|r| r.len).sum()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Value type
    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    /// Ranges in order
    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// Element at `index`
    pub fn element(&self, mut index: usize) -> Option<PortElement> {
        for range in &self.ranges {
            if index < range.len {
                return range.element(index);
            }
            index -= range.len;
        }
        None
    }

    /// Iterate all elements in order
    pub fn elements(&self) -> impl Iterator<Item = PortElement> + '_ {
        self.ranges.iter().flat_map(|r| r.elements())
    }

    /// Iterate referenced ports (consecutive duplicates collapsed)
    pub fn addresses(&self) -> impl Iterator<Item = PortAddress> + '_ {
        let mut last = None;
        self.ranges.iter().filter_map(move |r| {
            if last == Some(r.address) {
                None
            } else {
                last = Some(r.address);
                Some(r.address)
            }
        })
    }

    /// Check if this wiring is exactly one whole output port
    pub fn is_full_port(&self, port: &OutputPort) -> bool {
        self.ranges.len() == 1
            && self.ranges[0] == PortRange::new(port.address, 0, port.size)
            && self.port_type == port.port_type
    }

    fn push_range(&mut self, range: PortRange) {
        if range.len == 0 {
            return;
        }
        if let Some(last) = self.ranges.last_mut() {
            if last.address == range.address && last.end() == range.start {
                last.len += range.len;
                return;
            }
        }
        self.ranges.push(range);
    }
}

impl fmt::Display for PortElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]:{}", ranges.join(", "), self.port_type)
    }
}

/// An input of a node: a name and the wiring feeding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPort {
    /// Port name
    pub name: &'static str,
    /// Wiring
    pub elements: PortElements,
}

/// An output of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPort {
    /// Address of this port
    pub address: PortAddress,
    /// Port name
    pub name: &'static str,
    /// Value type
    pub port_type: PortType,
    /// Number of elements
    pub size: usize,
}

impl OutputPort {
    /// Port index on the owning node
    pub fn index(&self) -> usize {
        self.address.port
    }

    /// All elements of this port
    pub fn elements(&self) -> PortElements {
        PortElements::from_port(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(node: u64, size: usize) -> OutputPort {
        OutputPort {
            address: PortAddress::new(NodeId::from_raw(node), 0),
            name: "output",
            port_type: PortType::Real,
            size,
        }
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_from_port() {
        let p = port(1, 4);
        let elements = p.elements();
        assert_eq!(elements.size(), 4);
        assert_eq!(elements.ranges().len(), 1);
        assert!(elements.is_full_port(&p));
    }

    #[test]
    fn test_from_elements_consolidates() {
        let p = port(1, 4);
        let elements = PortElements::from_elements(p.elements().elements(), PortType::Real);
        assert_eq!(elements, p.elements());
    }

    #[test]
    fn test_from_elements_keeps_gaps() {
        let address = PortAddress::new(NodeId::from_raw(3), 0);
        let elements = PortElements::from_elements(
            [
                PortElement::new(address, 0),
                PortElement::new(address, 2),
                PortElement::new(address, 3),
            ],
            PortType::Real,
        );
        assert_eq!(elements.ranges().len(), 2);
        assert_eq!(elements.size(), 3);
        assert_eq!(elements.element(1), Some(PortElement::new(address, 2)));
        assert_eq!(elements.element(3), None);
    }

    #[test]
    fn test_concat_spans_nodes() {
        let a = port(1, 2).elements();
        let b = port(2, 3).elements();
        let joined = PortElements::concat(&[a, b]).unwrap();

        assert_eq!(joined.size(), 5);
        let addresses: Vec<_> = joined.addresses().map(|a| a.node.raw()).collect();
        assert_eq!(addresses, vec![1, 2]);
    }

    #[test]
    fn test_append_type_mismatch() {
        let mut a = port(1, 2).elements();
        let b = PortElements::from_range(
            PortRange::new(PortAddress::new(NodeId::from_raw(2), 0), 0, 1),
            PortType::Boolean,
        );
        assert!(matches!(
            a.append(&b),
            Err(TransformError::PortTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_slice() {
        let elements = port(1, 5).elements();
        let middle = elements.slice(1, 3).unwrap();
        assert_eq!(middle.ranges(), &[PortRange::new(PortAddress::new(NodeId::from_raw(1), 0), 1, 3)]);

        assert!(elements.slice(4, 2).is_err());
    }

    #[test]
    fn test_slice_overflowing_bounds() {
        let elements = port(1, 5).elements();
        assert!(matches!(
            elements.slice(usize::MAX, 2),
            Err(TransformError::SizeMismatch { found: 5, .. })
        ));
        assert!(elements.slice(2, usize::MAX).is_err());
    }

    #[test]
    fn test_display() {
        let elements = port(9, 2).elements();
        assert_eq!(elements.to_string(), "[n9.0[0..2]]:real");
    }
}

use std::io::Write;

use smallvec::SmallVec;

use crate::binary::constants::v1_0::{IVM, LENGTH_CODE_VAR_UINT, MAX_INLINE_LENGTH};
use crate::binary::decimal::DecimalBinaryEncoder;
use crate::binary::timestamp::TimestampBinaryEncoder;
use crate::binary::type_code::IonTypeCode;
use crate::binary::uint;
use crate::binary::uint::DecodedUInt;
use crate::binary::var_uint::VarUInt;
use crate::result::{illegal_operation, illegal_operation_raw, IonResult};
use crate::types::integer::{Int, IntData};
use crate::types::{Decimal, IonType, SymbolId, Timestamp};
use num_bigint::Sign as BigSign;
use num_traits::Zero;

/// A buffered sequence of encoding tree nodes whose `length` always equals the sum of its
/// children's total emitted lengths. Keeping the sum up to date on every append is what
/// makes length queries O(1) at flush time.
#[derive(Debug, Default)]
struct Datagram {
    nodes: Vec<Node>,
    length: usize,
}

impl Datagram {
    fn push(&mut self, node: Node) {
        self.length += node.total_length();
        self.nodes.push(node);
    }
}

/// A node in the deferred-length encoding tree.
///
/// Container lengths precede their bodies on the wire and use a variable-length encoding,
/// so nothing can be written to the sink until every open container has been closed.
/// Scalars become [Node::Atom]s (already-encoded bytes emitted verbatim); containers buffer
/// their children and compute lengths bottom-up when they close.
#[derive(Debug)]
enum Node {
    Atom(Vec<u8>),
    Container(ContainerNode),
}

impl Node {
    /// The number of bytes this node will occupy in the output, including (for containers)
    /// the tag byte and any trailing VarUInt length.
    fn total_length(&self) -> usize {
        match self {
            Node::Atom(bytes) => bytes.len(),
            Node::Container(container) => {
                tag_length(container.body.length) + container.body.length
            }
        }
    }
}

#[derive(Debug)]
struct ContainerNode {
    type_code: IonTypeCode,
    body: Datagram,
}

/// A container that has been opened with `step_in` but not yet closed. Its annotations
/// cannot be applied until the container closes, because the wrapper's length depends on
/// the container's.
#[derive(Debug)]
struct OpenContainer {
    container: ContainerNode,
    annotations: SmallVec<[SymbolId; 2]>,
}

/// The number of bytes `write_tag` will produce for a value of the given body length.
fn tag_length(body_length: usize) -> usize {
    if body_length <= MAX_INLINE_LENGTH {
        1
    } else {
        1 + VarUInt::encoded_size_of(body_length as u64)
    }
}

/// Writes binary Ion values to a sink, deferring all output until [RawBinaryWriter::flush].
///
/// This is the symbol-unaware layer: field names, annotations, and symbol values must
/// already be symbol IDs. [crate::binary::BinaryWriter] adds interning on top.
pub struct RawBinaryWriter<W: Write> {
    out: W,
    datagram: Datagram,
    open_containers: Vec<OpenContainer>,
    annotation_ids: SmallVec<[SymbolId; 2]>,
    field_id: Option<SymbolId>,
}

impl<W: Write> RawBinaryWriter<W> {
    pub fn new(out: W) -> RawBinaryWriter<W> {
        RawBinaryWriter {
            out,
            datagram: Datagram::default(),
            open_containers: Vec::new(),
            annotation_ids: SmallVec::new(),
            field_id: None,
        }
    }

    /// The number of containers that have been opened and not yet closed.
    pub fn depth(&self) -> usize {
        self.open_containers.len()
    }

    pub fn parent_type(&self) -> Option<IonType> {
        self.open_containers
            .last()
            .map(|open| match open.container.type_code {
                IonTypeCode::Struct => IonType::Struct,
                IonTypeCode::SExpression => IonType::SExp,
                _ => IonType::List,
            })
    }

    fn is_in_struct(&self) -> bool {
        self.open_containers
            .last()
            .map(|open| open.container.type_code == IonTypeCode::Struct)
            .unwrap_or(false)
    }

    /// Sets the field name (as a symbol ID) for the next value written. Only valid while
    /// the writer is positioned inside a struct.
    pub fn set_field_id(&mut self, field_id: SymbolId) -> IonResult<()> {
        if !self.is_in_struct() {
            return illegal_operation("field names can only be set inside a struct");
        }
        self.field_id = Some(field_id);
        Ok(())
    }

    /// Sets the annotations (as symbol IDs) to attach to the next value written, replacing
    /// any annotations that were already pending.
    pub fn set_annotation_ids<I: IntoIterator<Item = SymbolId>>(&mut self, annotation_ids: I) {
        self.annotation_ids.clear();
        self.annotation_ids.extend(annotation_ids);
    }

    pub fn write_null(&mut self, ion_type: IonType) -> IonResult<()> {
        let byte: u8 = match ion_type {
            IonType::Null => 0x0F,
            IonType::Bool => 0x1F,
            IonType::Int => 0x2F,
            IonType::Float => 0x4F,
            IonType::Decimal => 0x5F,
            IonType::Timestamp => 0x6F,
            IonType::Symbol => 0x7F,
            IonType::String => 0x8F,
            IonType::Clob => 0x9F,
            IonType::Blob => 0xAF,
            IonType::List => 0xBF,
            IonType::SExp => 0xCF,
            IonType::Struct => 0xDF,
        };
        self.push_atom(vec![byte])
    }

    pub fn write_bool(&mut self, value: bool) -> IonResult<()> {
        let byte: u8 = if value { 0x11 } else { 0x10 };
        self.push_atom(vec![byte])
    }

    pub fn write_i64(&mut self, value: i64) -> IonResult<()> {
        let magnitude: u64 = value.unsigned_abs();
        let encoded = uint::encode_u64(magnitude);
        let bytes_to_write = encoded.as_bytes();

        // The magnitude is at most 8 bytes, so the length always fits in the tag byte
        let type_descriptor: u8 = if value >= 0 {
            0x20 | (bytes_to_write.len() as u8)
        } else {
            0x30 | (bytes_to_write.len() as u8)
        };
        let mut encoded_value = Vec::with_capacity(1 + bytes_to_write.len());
        encoded_value.push(type_descriptor);
        encoded_value.extend_from_slice(bytes_to_write);
        self.push_atom(encoded_value)
    }

    pub fn write_int(&mut self, value: &Int) -> IonResult<()> {
        let value = match &value.data {
            IntData::I64(i) => return self.write_i64(*i),
            IntData::BigInt(i) => i,
        };

        if value.is_zero() {
            return self.push_atom(vec![0x20]);
        }

        let (sign, magnitude_be_bytes) = value.to_bytes_be();
        let mut type_descriptor: u8 = match sign {
            BigSign::Plus | BigSign::NoSign => 0x20,
            BigSign::Minus => 0x30,
        };

        let mut encoded_value = Vec::with_capacity(2 + magnitude_be_bytes.len());
        let encoded_length = magnitude_be_bytes.len();
        if encoded_length <= MAX_INLINE_LENGTH {
            type_descriptor |= encoded_length as u8;
            encoded_value.push(type_descriptor);
        } else {
            type_descriptor |= LENGTH_CODE_VAR_UINT;
            encoded_value.push(type_descriptor);
            VarUInt::write_u64(&mut encoded_value, encoded_length as u64)?;
        }
        encoded_value.extend_from_slice(magnitude_be_bytes.as_slice());
        self.push_atom(encoded_value)
    }

    pub fn write_f32(&mut self, value: f32) -> IonResult<()> {
        if value == 0f32 && !value.is_sign_negative() {
            return self.push_atom(vec![0x40]);
        }
        let mut encoded_value = Vec::with_capacity(5);
        encoded_value.push(0x44);
        encoded_value.extend_from_slice(&value.to_be_bytes());
        self.push_atom(encoded_value)
    }

    pub fn write_f64(&mut self, value: f64) -> IonResult<()> {
        if value == 0f64 && !value.is_sign_negative() {
            return self.push_atom(vec![0x40]);
        }
        let mut encoded_value = Vec::with_capacity(9);
        encoded_value.push(0x48);
        encoded_value.extend_from_slice(&value.to_be_bytes());
        self.push_atom(encoded_value)
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        let mut encoded_value = Vec::new();
        encoded_value.encode_decimal_value(value)?;
        self.push_atom(encoded_value)
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        let mut encoded_value = Vec::new();
        encoded_value.encode_timestamp_value(value)?;
        self.push_atom(encoded_value)
    }

    pub fn write_symbol_id(&mut self, symbol_id: SymbolId) -> IonResult<()> {
        // Symbol IDs are UInt-encoded; SID 0 is a zero-length body
        let encoded_length = DecodedUInt::encoded_size_of(symbol_id as u64);
        let mut encoded_value = Vec::with_capacity(1 + encoded_length);
        encoded_value.push(0x70 | encoded_length as u8);
        DecodedUInt::write_u64(&mut encoded_value, symbol_id as u64)?;
        self.push_atom(encoded_value)
    }

    pub fn write_string<A: AsRef<str>>(&mut self, value: A) -> IonResult<()> {
        let text: &str = value.as_ref();
        self.write_lob_or_string(text.as_bytes(), 0x80)
    }

    pub fn write_clob<A: AsRef<[u8]>>(&mut self, value: A) -> IonResult<()> {
        self.write_lob_or_string(value.as_ref(), 0x90)
    }

    pub fn write_blob<A: AsRef<[u8]>>(&mut self, value: A) -> IonResult<()> {
        self.write_lob_or_string(value.as_ref(), 0xA0)
    }

    fn write_lob_or_string(&mut self, bytes: &[u8], type_code: u8) -> IonResult<()> {
        let encoded_length = bytes.len();
        let mut encoded_value = Vec::with_capacity(2 + encoded_length);
        if encoded_length <= MAX_INLINE_LENGTH {
            encoded_value.push(type_code | encoded_length as u8);
        } else {
            encoded_value.push(type_code | LENGTH_CODE_VAR_UINT);
            VarUInt::write_u64(&mut encoded_value, encoded_length as u64)?;
        }
        encoded_value.extend_from_slice(bytes);
        self.push_atom(encoded_value)
    }

    /// Opens a new list, s-expression, or struct. Writes that follow land inside the new
    /// container until a matching [RawBinaryWriter::step_out].
    pub fn step_in(&mut self, ion_type: IonType) -> IonResult<()> {
        let type_code = match ion_type {
            IonType::List => IonTypeCode::List,
            IonType::SExp => IonTypeCode::SExpression,
            IonType::Struct => IonTypeCode::Struct,
            _ => return illegal_operation(format!("cannot step into a {ion_type}")),
        };
        self.append_field_id_to_parent()?;
        let annotations = std::mem::take(&mut self.annotation_ids);
        self.open_containers.push(OpenContainer {
            container: ContainerNode {
                type_code,
                body: Datagram::default(),
            },
            annotations,
        });
        Ok(())
    }

    /// Closes the current container, appending it (and any annotations that were pending
    /// when it was opened) to its parent.
    pub fn step_out(&mut self) -> IonResult<()> {
        let open = self
            .open_containers
            .pop()
            .ok_or_else(|| illegal_operation_raw("cannot step out at the top level"))?;
        if self.field_id.is_some() {
            return illegal_operation("a field name was set but no value was written");
        }
        if !self.annotation_ids.is_empty() {
            return illegal_operation("annotations were set but no value was written");
        }
        let mut node = Node::Container(open.container);
        if !open.annotations.is_empty() {
            node = wrap_in_annotations(node, &open.annotations)?;
        }
        self.current_datagram_mut().push(node);
        Ok(())
    }

    /// Writes the Ion 1.0 binary version marker straight through to the sink, ahead of any
    /// buffered values. Only valid at the top level.
    pub fn write_ion_version_marker(&mut self) -> IonResult<()> {
        if !self.open_containers.is_empty() {
            return illegal_operation("cannot write a version marker inside a container");
        }
        self.out.write_all(&IVM)?;
        Ok(())
    }

    /// Writes all buffered values to the sink in a single depth-first pass and clears the
    /// buffer. Fails if any container is still open.
    pub fn flush(&mut self) -> IonResult<()> {
        if !self.open_containers.is_empty() {
            return illegal_operation("cannot flush while a container is open");
        }
        if !self.annotation_ids.is_empty() {
            return illegal_operation("annotations were set but no value was written");
        }
        let datagram = std::mem::take(&mut self.datagram);
        for node in &datagram.nodes {
            write_node(&mut self.out, node)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// The total size of the buffered (unflushed) datagram in bytes.
    pub fn buffered_size(&self) -> usize {
        self.datagram.length
    }

    pub(crate) fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    // --- helpers -------------------------------------------------------------------

    fn push_atom(&mut self, encoded_value: Vec<u8>) -> IonResult<()> {
        self.append_field_id_to_parent()?;
        let mut node = Node::Atom(encoded_value);
        if !self.annotation_ids.is_empty() {
            let annotations = std::mem::take(&mut self.annotation_ids);
            node = wrap_in_annotations(node, &annotations)?;
        }
        self.current_datagram_mut().push(node);
        Ok(())
    }

    /// If the writer is inside a struct, takes the pending field ID and appends its VarUInt
    /// encoding ahead of the value being written.
    fn append_field_id_to_parent(&mut self) -> IonResult<()> {
        if !self.is_in_struct() {
            return Ok(());
        }
        let field_id = self.field_id.take().ok_or_else(|| {
            illegal_operation_raw("cannot write a value in a struct without setting a field name")
        })?;
        let mut encoded_field_id = Vec::with_capacity(2);
        VarUInt::write_u64(&mut encoded_field_id, field_id as u64)?;
        self.current_datagram_mut().push(Node::Atom(encoded_field_id));
        Ok(())
    }

    fn current_datagram_mut(&mut self) -> &mut Datagram {
        match self.open_containers.last_mut() {
            Some(open) => &mut open.container.body,
            None => &mut self.datagram,
        }
    }
}

/// Wraps `node` in an annotation wrapper holding `annotation_ids`. The wrapper's body is
/// the annotations' VarUInt length prefix, the annotation SIDs, and then the value itself;
/// its total length is deferred just like any other container's.
fn wrap_in_annotations(node: Node, annotation_ids: &[SymbolId]) -> IonResult<Node> {
    let mut ids_bytes = Vec::with_capacity(annotation_ids.len() * 2);
    for annotation_id in annotation_ids {
        VarUInt::write_u64(&mut ids_bytes, *annotation_id as u64)?;
    }
    let mut prefix = Vec::with_capacity(1 + ids_bytes.len());
    VarUInt::write_u64(&mut prefix, ids_bytes.len() as u64)?;
    prefix.extend_from_slice(&ids_bytes);

    let mut body = Datagram::default();
    body.push(Node::Atom(prefix));
    body.push(node);
    Ok(Node::Container(ContainerNode {
        type_code: IonTypeCode::AnnotationOrIvm,
        body,
    }))
}

fn write_node<W: Write>(out: &mut W, node: &Node) -> IonResult<()> {
    match node {
        Node::Atom(bytes) => out.write_all(bytes)?,
        Node::Container(container) => {
            write_tag(out, container.type_code, container.body.length)?;
            for child in &container.body.nodes {
                write_node(out, child)?;
            }
        }
    }
    Ok(())
}

fn write_tag<W: Write>(out: &mut W, type_code: IonTypeCode, body_length: usize) -> IonResult<()> {
    let nibble = type_code.to_nibble();
    if body_length <= MAX_INLINE_LENGTH {
        out.write_all(&[(nibble << 4) | body_length as u8])?;
    } else {
        out.write_all(&[(nibble << 4) | LENGTH_CODE_VAR_UINT])?;
        VarUInt::write_u64(out, body_length as u64)?;
    }
    Ok(())
}

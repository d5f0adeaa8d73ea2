//! Canonical serialized-object codec.
//!
//! A serialized object is a sequence of fields. Each field is a header naming its
//! [`FieldId`](crate::fields::FieldId), followed by a payload whose shape depends on the field
//! type: fixed-width big-endian integers and hashes, length-prefixed byte strings, or nested
//! containers closed by an end marker. Within any object container fields appear in strictly
//! ascending `(type, code)` order, so a given set of fields has exactly one byte rendition.

use alloc::vec::Vec;
use core::ops::Range;

use crate::account::AccountId;
use crate::errors::SerializationError;
use crate::fields::{FieldId, FieldType};
use crate::hash::Hash256;

// CONSTANTS
// ================================================================================================

/// Field code of the marker closing an object or array container.
const END_MARKER_CODE: u8 = 1;

/// Marker closing an object container.
pub const OBJECT_END: FieldId = FieldId::new(FieldType::Object, END_MARKER_CODE);

/// Marker closing an array container.
pub const ARRAY_END: FieldId = FieldId::new(FieldType::Array, END_MARKER_CODE);

/// Largest length representable by the variable-length prefix.
pub const MAX_VL_LEN: usize = 918_744;

// FIELD HEADER
// ================================================================================================

/// Appends the canonical header encoding of `field` to `out`.
///
/// Single byte when both codes fit a nibble, otherwise the nibble that does not fit is zeroed in
/// the lead byte and follows in full.
fn write_header(out: &mut Vec<u8>, field: FieldId) {
    let type_code = field.field_type as u8;
    let field_code = field.code;
    match (type_code < 16, field_code < 16) {
        (true, true) => out.push((type_code << 4) | field_code),
        (true, false) => {
            out.push(type_code << 4);
            out.push(field_code);
        },
        (false, true) => {
            out.push(field_code);
            out.push(type_code);
        },
        (false, false) => {
            out.push(0);
            out.push(type_code);
            out.push(field_code);
        },
    }
}

/// Decodes the field header starting at `offset`, returning the field id and the offset just
/// past the header. Rejects non-minimal encodings.
fn read_header(bytes: &[u8], offset: usize) -> Result<(FieldId, usize), SerializationError> {
    let lead = *bytes.get(offset).ok_or(SerializationError::UnexpectedEof(offset))?;
    let type_nibble = lead >> 4;
    let field_nibble = lead & 0x0f;

    let (type_code, field_code, end) = match (type_nibble, field_nibble) {
        (0, 0) => {
            let type_code =
                *bytes.get(offset + 1).ok_or(SerializationError::UnexpectedEof(offset + 1))?;
            let field_code =
                *bytes.get(offset + 2).ok_or(SerializationError::UnexpectedEof(offset + 2))?;
            if type_code < 16 || field_code < 16 {
                return Err(SerializationError::MalformedHeader(offset));
            }
            (type_code, field_code, offset + 3)
        },
        (0, field) => {
            let type_code =
                *bytes.get(offset + 1).ok_or(SerializationError::UnexpectedEof(offset + 1))?;
            if type_code < 16 {
                return Err(SerializationError::MalformedHeader(offset));
            }
            (type_code, field, offset + 2)
        },
        (_, 0) => {
            let field_code =
                *bytes.get(offset + 1).ok_or(SerializationError::UnexpectedEof(offset + 1))?;
            if field_code < 16 {
                return Err(SerializationError::MalformedHeader(offset));
            }
            (type_nibble, field_code, offset + 2)
        },
        (_, _) => (type_nibble, field_nibble, offset + 1),
    };

    let field_type =
        FieldType::from_code(type_code).ok_or(SerializationError::UnknownType(type_code))?;
    Ok((FieldId::new(field_type, field_code), end))
}

// VARIABLE LENGTH PREFIX
// ================================================================================================

/// Appends the variable-length prefix for `len` to `out`. Callers must keep `len` within
/// [`MAX_VL_LEN`].
fn write_vl_prefix(out: &mut Vec<u8>, len: usize) {
    debug_assert!(len <= MAX_VL_LEN);
    if len <= 192 {
        out.push(len as u8);
    } else if len <= 12_480 {
        let adjusted = len - 193;
        out.push(193 + (adjusted >> 8) as u8);
        out.push((adjusted & 0xff) as u8);
    } else {
        let adjusted = len - 12_481;
        out.push(241 + (adjusted >> 16) as u8);
        out.push(((adjusted >> 8) & 0xff) as u8);
        out.push((adjusted & 0xff) as u8);
    }
}

/// Decodes a variable-length prefix at `offset`, returning the payload length and the offset
/// just past the prefix.
fn read_vl_prefix(bytes: &[u8], offset: usize) -> Result<(usize, usize), SerializationError> {
    let b0 = *bytes.get(offset).ok_or(SerializationError::UnexpectedEof(offset))? as usize;
    match b0 {
        0..=192 => Ok((b0, offset + 1)),
        193..=240 => {
            let b1 = *bytes.get(offset + 1).ok_or(SerializationError::UnexpectedEof(offset + 1))?
                as usize;
            Ok((193 + (b0 - 193) * 256 + b1, offset + 2))
        },
        241..=254 => {
            let b1 = *bytes.get(offset + 1).ok_or(SerializationError::UnexpectedEof(offset + 1))?
                as usize;
            let b2 = *bytes.get(offset + 2).ok_or(SerializationError::UnexpectedEof(offset + 2))?
                as usize;
            Ok((12_481 + (b0 - 241) * 65_536 + b1 * 256 + b2, offset + 3))
        },
        _ => Err(SerializationError::InvalidLengthPrefix(offset)),
    }
}

// FIELD WALKER
// ================================================================================================

/// One decoded field: its id, the span of the whole field (header through end marker), and the
/// span of the payload (length prefix and container markers excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StField {
    pub id: FieldId,
    pub full: Range<usize>,
    pub payload: Range<usize>,
}

/// Skips the payload of `field` whose header ended at `offset`; returns the payload range and
/// the offset just past the field (past the end marker for containers).
fn skip_payload(
    bytes: &[u8],
    field: FieldId,
    offset: usize,
) -> Result<(Range<usize>, usize), SerializationError> {
    match field.field_type {
        FieldType::Object => {
            let end = skip_container_body(bytes, offset, FieldType::Object)?;
            Ok((offset..end - 1, end))
        },
        FieldType::Array => {
            let end = skip_container_body(bytes, offset, FieldType::Array)?;
            Ok((offset..end - 1, end))
        },
        ty if ty.is_vl() => {
            let (len, start) = read_vl_prefix(bytes, offset)?;
            let end = start + len;
            if end > bytes.len() {
                return Err(SerializationError::UnexpectedEof(bytes.len()));
            }
            Ok((start..end, end))
        },
        ty => {
            let len = ty.fixed_len().expect("non-container, non-vl types have a fixed length");
            let end = offset + len;
            if end > bytes.len() {
                return Err(SerializationError::UnexpectedEof(bytes.len()));
            }
            Ok((offset..end, end))
        },
    }
}

/// Walks the body of a container until its end marker; returns the offset just past the marker.
fn skip_container_body(
    bytes: &[u8],
    mut offset: usize,
    container: FieldType,
) -> Result<usize, SerializationError> {
    let opened_at = offset;
    let mut last: Option<FieldId> = None;
    loop {
        if offset >= bytes.len() {
            return Err(SerializationError::UnterminatedContainer(opened_at));
        }
        let (field, body) = read_header(bytes, offset)?;
        if field == OBJECT_END || field == ARRAY_END {
            let expected = if container == FieldType::Object { OBJECT_END } else { ARRAY_END };
            if field != expected {
                return Err(SerializationError::MalformedHeader(offset));
            }
            return Ok(body);
        }
        match container {
            // Object members are strictly ordered and unique.
            FieldType::Object => {
                if let Some(last) = last {
                    if field == last {
                        return Err(SerializationError::DuplicateField(field));
                    }
                    if field < last {
                        return Err(SerializationError::NonCanonicalOrder(offset));
                    }
                }
                last = Some(field);
            },
            // Array elements are object fields in insertion order, repeats allowed.
            FieldType::Array => {
                if field.field_type != FieldType::Object {
                    return Err(SerializationError::MalformedHeader(offset));
                }
            },
            _ => unreachable!("only containers are walked here"),
        }
        let (_, next) = skip_payload(bytes, field, body)?;
        offset = next;
    }
}

// ST READER
// ================================================================================================

/// Zero-copy reader over a serialized field sequence.
#[derive(Debug, Clone, Copy)]
pub struct StReader<'a> {
    bytes: &'a [u8],
}

impl<'a> StReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the underlying bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the payload slice of a decoded field.
    pub fn payload(&self, field: &StField) -> &'a [u8] {
        &self.bytes[field.payload.clone()]
    }

    /// Returns the full slice of a decoded field, header included.
    pub fn full(&self, field: &StField) -> &'a [u8] {
        &self.bytes[field.full.clone()]
    }

    /// Decodes the top-level fields, enforcing canonical order and full consumption of the
    /// input.
    pub fn fields(&self) -> Result<Vec<StField>, SerializationError> {
        let mut out = Vec::new();
        let mut offset = 0;
        let mut last: Option<FieldId> = None;
        while offset < self.bytes.len() {
            let start = offset;
            let (id, body) = read_header(self.bytes, offset)?;
            if id == OBJECT_END || id == ARRAY_END {
                return Err(SerializationError::MalformedHeader(offset));
            }
            if let Some(last) = last {
                if id == last {
                    return Err(SerializationError::DuplicateField(id));
                }
                if id < last {
                    return Err(SerializationError::NonCanonicalOrder(offset));
                }
            }
            last = Some(id);
            let (payload, next) = skip_payload(self.bytes, id, body)?;
            out.push(StField { id, full: start..next, payload });
            offset = next;
        }
        Ok(out)
    }

    /// Returns the top-level field with the given id, or `None`.
    pub fn find(&self, id: FieldId) -> Result<Option<StField>, SerializationError> {
        Ok(self.fields()?.into_iter().find(|field| field.id == id))
    }

    /// Validates the whole input: every field decodes, containers are terminated, order is
    /// canonical at every object level.
    pub fn validate(&self) -> Result<(), SerializationError> {
        self.fields().map(|_| ())
    }
}

// SUB-OBJECT TRAVERSAL
// ================================================================================================

/// Locates `field` inside `bytes` and returns the `(offset, length)` of its full span.
///
/// When the input consists of a single container field, the search descends into that
/// container's payload; otherwise the input is searched as a field sequence.
pub fn subfield(
    bytes: &[u8],
    field: FieldId,
) -> Result<Option<(usize, usize)>, SerializationError> {
    let reader = StReader::new(bytes);
    let top = reader.fields()?;

    let single_container =
        top.len() == 1 && top[0].id.field_type == FieldType::Object;
    let (haystack, base) = if single_container {
        let payload = top[0].payload.clone();
        (StReader::new(&bytes[payload.clone()]).fields()?, payload.start)
    } else {
        (top, 0)
    };

    Ok(haystack
        .iter()
        .find(|f| f.id == field)
        .map(|f| (base + f.full.start, f.full.len())))
}

/// Returns the `(offset, length)` of the `index`-th element of the array in `bytes`.
///
/// When the input consists of a single array field, elements are taken from its payload;
/// otherwise the top-level fields themselves are treated as the element sequence.
pub fn subarray(
    bytes: &[u8],
    index: u32,
) -> Result<Option<(usize, usize)>, SerializationError> {
    let reader = StReader::new(bytes);
    let top = reader.fields()?;

    let single_container = top.len() == 1 && top[0].id.field_type == FieldType::Array;
    let (elements, base) = if single_container {
        let payload = top[0].payload.clone();
        (StReader::new(&bytes[payload.clone()]).fields()?, payload.start)
    } else {
        (top, 0)
    };

    Ok(elements
        .get(index as usize)
        .map(|f| (base + f.full.start, f.full.len())))
}

// VALUE DECODERS
// ================================================================================================

pub fn read_u16(payload: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(payload.try_into().ok()?))
}

pub fn read_u32(payload: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(payload.try_into().ok()?))
}

pub fn read_u64(payload: &[u8]) -> Option<u64> {
    Some(u64::from_be_bytes(payload.try_into().ok()?))
}

pub fn read_hash(payload: &[u8]) -> Option<Hash256> {
    Hash256::from_slice(payload)
}

pub fn read_account(payload: &[u8]) -> Option<AccountId> {
    AccountId::from_slice(payload).ok()
}

// ST BUILDER
// ================================================================================================

/// Canonical writer for serialized objects.
///
/// Fields must be appended in ascending order within each object container; violations are
/// deferred and reported by [`StBuilder::build`].
#[derive(Debug, Default)]
pub struct StBuilder {
    out: Vec<u8>,
    stack: Vec<(FieldType, Option<FieldId>)>,
    last: Option<FieldId>,
    error: Option<SerializationError>,
}

impl StBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(&mut self, field: FieldId, value: u16) -> &mut Self {
        self.fixed(field, FieldType::UInt16, &value.to_be_bytes())
    }

    pub fn u32(&mut self, field: FieldId, value: u32) -> &mut Self {
        self.fixed(field, FieldType::UInt32, &value.to_be_bytes())
    }

    pub fn u64(&mut self, field: FieldId, value: u64) -> &mut Self {
        self.fixed(field, FieldType::UInt64, &value.to_be_bytes())
    }

    pub fn amount(&mut self, field: FieldId, drops: u64) -> &mut Self {
        self.fixed(field, FieldType::Amount, &drops.to_be_bytes())
    }

    pub fn hash(&mut self, field: FieldId, value: Hash256) -> &mut Self {
        self.fixed(field, FieldType::Hash256, value.as_ref())
    }

    pub fn blob(&mut self, field: FieldId, value: &[u8]) -> &mut Self {
        self.vl(field, FieldType::Blob, value)
    }

    pub fn account(&mut self, field: FieldId, value: AccountId) -> &mut Self {
        self.vl(field, FieldType::AccountId, value.as_ref())
    }

    pub fn begin_object(&mut self, field: FieldId) -> &mut Self {
        if self.accept(field, FieldType::Object) {
            write_header(&mut self.out, field);
            self.stack.push((FieldType::Object, self.last));
            self.last = None;
        }
        self
    }

    pub fn end_object(&mut self) -> &mut Self {
        self.close(FieldType::Object, OBJECT_END)
    }

    pub fn begin_array(&mut self, field: FieldId) -> &mut Self {
        if self.accept(field, FieldType::Array) {
            write_header(&mut self.out, field);
            self.stack.push((FieldType::Array, self.last));
            self.last = None;
        }
        self
    }

    pub fn end_array(&mut self) -> &mut Self {
        self.close(FieldType::Array, ARRAY_END)
    }

    /// Finishes the object, returning the canonical bytes.
    pub fn build(&mut self) -> Result<Vec<u8>, SerializationError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if !self.stack.is_empty() {
            return Err(SerializationError::UnterminatedContainer(self.out.len()));
        }
        Ok(core::mem::take(&mut self.out))
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    fn fixed(&mut self, field: FieldId, ty: FieldType, payload: &[u8]) -> &mut Self {
        if self.accept(field, ty) {
            write_header(&mut self.out, field);
            self.out.extend_from_slice(payload);
        }
        self
    }

    fn vl(&mut self, field: FieldId, ty: FieldType, payload: &[u8]) -> &mut Self {
        if payload.len() > MAX_VL_LEN {
            self.fail(SerializationError::InvalidPayloadLength(field, payload.len()));
            return self;
        }
        if self.accept(field, ty) {
            write_header(&mut self.out, field);
            write_vl_prefix(&mut self.out, payload.len());
            self.out.extend_from_slice(payload);
        }
        self
    }

    /// Checks type agreement and canonical placement of `field`; records the first violation.
    fn accept(&mut self, field: FieldId, ty: FieldType) -> bool {
        if self.error.is_some() {
            return false;
        }
        let container = matches!(ty, FieldType::Object | FieldType::Array);
        if field.field_type != ty || (container && field.code == END_MARKER_CODE) {
            self.fail(SerializationError::MalformedHeader(self.out.len()));
            return false;
        }
        let in_array = matches!(self.stack.last(), Some((FieldType::Array, _)));
        if in_array {
            // Array elements must be objects; order is insertion order.
            if ty != FieldType::Object {
                self.fail(SerializationError::MalformedHeader(self.out.len()));
                return false;
            }
        } else if let Some(last) = self.last {
            if field == last {
                self.fail(SerializationError::DuplicateField(field));
                return false;
            }
            if field < last {
                self.fail(SerializationError::NonCanonicalOrder(self.out.len()));
                return false;
            }
        }
        self.last = Some(field);
        true
    }

    fn close(&mut self, expected: FieldType, marker: FieldId) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.stack.pop() {
            Some((ty, outer_last)) if ty == expected => {
                write_header(&mut self.out, marker);
                self.last = outer_last;
            },
            _ => self.fail(SerializationError::UnterminatedContainer(self.out.len())),
        }
        self
    }

    fn fail(&mut self, error: SerializationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

// FIELD INSERTION
// ================================================================================================

/// Splices an already-encoded field (`encoded`, spanning header through end marker) into the
/// canonical position of the top-level sequence in `bytes`.
///
/// # Errors
/// Returns an error if the input is malformed or already contains `id`.
pub fn insert_field(
    bytes: &[u8],
    id: FieldId,
    encoded: &[u8],
) -> Result<Vec<u8>, SerializationError> {
    let fields = StReader::new(bytes).fields()?;
    if fields.iter().any(|f| f.id == id) {
        return Err(SerializationError::DuplicateField(id));
    }

    let insert_at = fields
        .iter()
        .find(|f| f.id > id)
        .map(|f| f.full.start)
        .unwrap_or(bytes.len());

    let mut out = Vec::with_capacity(bytes.len() + encoded.len());
    out.extend_from_slice(&bytes[..insert_at]);
    out.extend_from_slice(encoded);
    out.extend_from_slice(&bytes[insert_at..]);
    Ok(out)
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{insert_field, read_u32, subarray, subfield, StBuilder, StReader};
    use crate::account::AccountId;
    use crate::errors::SerializationError;
    use crate::fields;
    use crate::hash::Hash256;

    fn sample_tx() -> alloc::vec::Vec<u8> {
        StBuilder::new()
            .u16(fields::TRANSACTION_TYPE, 0)
            .u32(fields::SEQUENCE, 7)
            .amount(fields::FEE, 10)
            .blob(fields::SIGNING_PUB_KEY, &[0xaa; 33])
            .account(fields::ACCOUNT, AccountId::new([1; 20]))
            .account(fields::DESTINATION, AccountId::new([2; 20]))
            .build()
            .unwrap()
    }

    #[test]
    fn build_then_read_back() {
        let bytes = sample_tx();
        let reader = StReader::new(&bytes);
        let fields_read = reader.fields().unwrap();
        assert_eq!(fields_read.len(), 6);
        assert_eq!(fields_read[0].id, fields::TRANSACTION_TYPE);
        assert_eq!(reader.payload(&fields_read[0]), [0, 0]);

        let seq = reader.find(fields::SEQUENCE).unwrap().unwrap();
        assert_eq!(read_u32(reader.payload(&seq)), Some(7));

        let dest = reader.find(fields::DESTINATION).unwrap().unwrap();
        assert_eq!(reader.payload(&dest), [2; 20]);
    }

    #[test]
    fn non_canonical_order_is_rejected() {
        // Account (8,1) may not precede Sequence (2,4).
        let mut builder = StBuilder::new();
        builder.account(fields::ACCOUNT, AccountId::new([1; 20])).u32(fields::SEQUENCE, 1);
        assert_matches!(builder.build(), Err(SerializationError::NonCanonicalOrder(_)));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let mut builder = StBuilder::new();
        builder.u32(fields::SEQUENCE, 1).u32(fields::SEQUENCE, 2);
        assert_matches!(builder.build(), Err(SerializationError::DuplicateField(_)));

        let bytes = sample_tx();
        let extra = StBuilder::new().u32(fields::SEQUENCE, 9).build().unwrap();
        assert_matches!(
            insert_field(&bytes, fields::SEQUENCE, &extra),
            Err(SerializationError::DuplicateField(_))
        );
    }

    #[test]
    fn nested_objects_round_trip() {
        let bytes = StBuilder::new()
            .begin_object(fields::HOOK_PARAMETER)
            .blob(fields::HOOK_PARAMETER_NAME, b"name")
            .blob(fields::HOOK_PARAMETER_VALUE, b"value")
            .end_object()
            .build()
            .unwrap();

        let reader = StReader::new(&bytes);
        let outer = reader.fields().unwrap();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].id, fields::HOOK_PARAMETER);

        let inner = StReader::new(reader.payload(&outer[0]));
        assert_eq!(inner.fields().unwrap().len(), 2);
    }

    #[test]
    fn subfield_descends_into_containers() {
        let bytes = StBuilder::new()
            .begin_object(fields::HOOK_DEFINITION)
            .u16(fields::HOOK_API_VERSION, 0)
            .u64(fields::HOOK_ON, 0b1)
            .hash(fields::HOOK_NAMESPACE, Hash256::new([7; 32]))
            .end_object()
            .build()
            .unwrap();

        let (offset, len) = subfield(&bytes, fields::HOOK_ON).unwrap().unwrap();
        // Span covers the header and the payload of HOOK_ON.
        let span = &bytes[offset..offset + len];
        let inner = StReader::new(span);
        let only = inner.fields().unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, fields::HOOK_ON);

        assert_eq!(subfield(&bytes, fields::HOOK_HASH).unwrap(), None);
    }

    #[test]
    fn subarray_indexes_elements() {
        let bytes = StBuilder::new()
            .begin_array(fields::HOOK_PARAMETERS)
            .begin_object(fields::HOOK_PARAMETER)
            .blob(fields::HOOK_PARAMETER_NAME, b"a")
            .end_object()
            .begin_object(fields::HOOK_PARAMETER)
            .blob(fields::HOOK_PARAMETER_NAME, b"b")
            .end_object()
            .end_array()
            .build()
            .unwrap();

        let (off0, len0) = subarray(&bytes, 0).unwrap().unwrap();
        let (off1, len1) = subarray(&bytes, 1).unwrap().unwrap();
        assert!(off1 >= off0 + len0);
        assert_eq!(subarray(&bytes, 2).unwrap(), None);

        let elem = &bytes[off1..off1 + len1];
        let reader = StReader::new(elem);
        assert_eq!(reader.fields().unwrap()[0].id, fields::HOOK_PARAMETER);
    }

    #[test]
    fn truncated_input_is_malformed() {
        let bytes = sample_tx();
        for cut in [1, bytes.len() / 2, bytes.len() - 1] {
            assert!(StReader::new(&bytes[..cut]).validate().is_err());
        }
    }

    #[test]
    fn unterminated_container_is_malformed() {
        let full = StBuilder::new()
            .begin_object(fields::EMIT_DETAILS)
            .u32(fields::EMIT_GENERATION, 1)
            .end_object()
            .build()
            .unwrap();
        // Drop the end marker.
        let cut = &full[..full.len() - 1];
        assert_matches!(
            StReader::new(cut).validate(),
            Err(SerializationError::UnterminatedContainer(_) | SerializationError::UnexpectedEof(_))
        );
    }

    #[test]
    fn insert_field_lands_in_canonical_position() {
        let bytes = sample_tx();
        let details = StBuilder::new()
            .begin_object(fields::EMIT_DETAILS)
            .u32(fields::EMIT_GENERATION, 1)
            .end_object()
            .build()
            .unwrap();

        let stamped = insert_field(&bytes, fields::EMIT_DETAILS, &details).unwrap();
        let reader = StReader::new(&stamped);
        let all = reader.fields().unwrap();
        // EmitDetails sorts after every non-container field.
        assert_eq!(all.last().unwrap().id, fields::EMIT_DETAILS);
        reader.validate().unwrap();
    }

    #[test]
    fn vl_prefix_sizes() {
        for len in [0usize, 1, 192, 193, 300, 12_480, 12_481, 60_000] {
            let value = vec![0x5a; len];
            let bytes = StBuilder::new().blob(fields::CREATE_CODE, &value).build().unwrap();
            let reader = StReader::new(&bytes);
            let field = reader.find(fields::CREATE_CODE).unwrap().unwrap();
            assert_eq!(reader.payload(&field), &value[..]);
        }
    }
}

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::errors::InnerObjectError;
use crate::fields::{self, FieldId};
use crate::hash::Hash256;
use crate::sto::{StBuilder, StReader};

// HOOK DEFINITION
// ================================================================================================

/// An immutable hook program: bytecode plus the metadata governing when and how it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDefinition {
    /// Bitmask over transaction types the hook fires on.
    pub hook_on: u64,
    /// The 256-bit namespace its state entries live under.
    pub namespace: Hash256,
    /// Version of the host API the bytecode was built against.
    pub api_version: u16,
    /// Install-time parameters exposed to the guest.
    pub parameters: Vec<HookParameter>,
    /// The bytecode module.
    pub create_code: Vec<u8>,
}

impl HookDefinition {
    /// Returns the hook hash: the hash of the bytecode module.
    pub fn hash(&self) -> Hash256 {
        crate::hash::sha512h(&self.create_code)
    }

    /// Encodes this definition as a `HookDefinition` object field.
    pub fn to_field_bytes(&self) -> Vec<u8> {
        let mut builder = StBuilder::new();
        builder
            .begin_object(fields::HOOK_DEFINITION)
            .u16(fields::HOOK_API_VERSION, self.api_version)
            .u64(fields::HOOK_ON, self.hook_on)
            .hash(fields::HOOK_NAMESPACE, self.namespace)
            .blob(fields::CREATE_CODE, &self.create_code)
            .begin_array(fields::HOOK_PARAMETERS);
        for parameter in &self.parameters {
            builder
                .begin_object(fields::HOOK_PARAMETER)
                .blob(fields::HOOK_PARAMETER_NAME, &parameter.name)
                .blob(fields::HOOK_PARAMETER_VALUE, &parameter.value)
                .end_object();
        }
        builder.end_array().end_object();
        builder.build().expect("hook definition fields are appended in canonical order")
    }
}

/// One named install-time parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookParameter {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

// INNER OBJECT FORMATS
// ================================================================================================

/// Whether a template field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// The field template of one inner-object format.
#[derive(Debug, Clone, Copy)]
pub struct InnerObjectFormat {
    /// The object field this template applies to.
    pub field: FieldId,
    pub name: &'static str,
    pub template: &'static [(FieldId, Presence)],
}

use Presence::{Optional, Required};

/// Registry of the inner-object templates consumed when validating guest-supplied objects.
pub const INNER_OBJECT_FORMATS: &[InnerObjectFormat] = &[
    InnerObjectFormat {
        field: fields::SIGNER_ENTRY,
        name: "SignerEntry",
        template: &[
            (fields::ACCOUNT, Required),
            (fields::SIGNER_WEIGHT, Required),
        ],
    },
    InnerObjectFormat {
        field: fields::SIGNER,
        name: "Signer",
        template: &[
            (fields::ACCOUNT, Required),
            (fields::SIGNING_PUB_KEY, Required),
            (fields::TXN_SIGNATURE, Required),
        ],
    },
    InnerObjectFormat {
        field: fields::HOOK_SET,
        name: "HookSet",
        template: &[
            (fields::HOOK_SET_OPERATION, Required),
            (fields::HOOK_SEQUENCE, Optional),
            (fields::HOOK_ON, Optional),
            (fields::HOOK_REORDER, Optional),
            (fields::FLAGS, Optional),
            (fields::HOOK_NAMESPACE, Optional),
            (fields::HOOK_HASH, Optional),
            (fields::HOOK_PARAMETERS, Optional),
            (fields::HOOK_DEFINITION, Optional),
        ],
    },
    InnerObjectFormat {
        field: fields::HOOK_DEFINITION,
        name: "HookDefinition",
        template: &[
            (fields::HOOK_ON, Required),
            (fields::HOOK_NAMESPACE, Required),
            (fields::HOOK_PARAMETERS, Required),
            (fields::HOOK_API_VERSION, Required),
            (fields::CREATE_CODE, Required),
        ],
    },
    InnerObjectFormat {
        field: fields::HOOK_PARAMETER,
        name: "HookParameter",
        template: &[
            (fields::HOOK_PARAMETER_NAME, Required),
            (fields::HOOK_PARAMETER_VALUE, Required),
        ],
    },
];

/// Looks up the template registered for an object field.
pub fn format_for(field: FieldId) -> Option<&'static InnerObjectFormat> {
    INNER_OBJECT_FORMATS.iter().find(|format| format.field == field)
}

/// Validates an inner object's payload against its registered template: every required field
/// present, no field outside the template.
pub fn validate_inner_object(
    field: FieldId,
    payload: &[u8],
) -> Result<(), InnerObjectError> {
    let format = format_for(field).ok_or(InnerObjectError::UnknownFormat(field))?;
    let reader = StReader::new(payload);
    let present = reader.fields().map_err(InnerObjectError::Malformed)?;

    for (required, presence) in format.template {
        if *presence == Required && !present.iter().any(|f| f.id == *required) {
            return Err(InnerObjectError::MissingRequiredField {
                format: format.name.to_string(),
                field: *required,
            });
        }
    }
    for decoded in &present {
        if !format.template.iter().any(|(id, _)| *id == decoded.id) {
            return Err(InnerObjectError::UnexpectedField {
                format: format.name.to_string(),
                field: decoded.id,
            });
        }
    }
    Ok(())
}

/// Validates every registered inner object appearing at any depth of a serialized field
/// sequence. Unregistered objects pass through untouched.
pub fn validate_inner_objects(bytes: &[u8]) -> Result<(), InnerObjectError> {
    let reader = StReader::new(bytes);
    let fields_read = reader.fields().map_err(InnerObjectError::Malformed)?;
    for field in &fields_read {
        let payload = reader.payload(field);
        match field.id.field_type {
            crate::fields::FieldType::Object => {
                if format_for(field.id).is_some() {
                    validate_inner_object(field.id, payload)?;
                }
                validate_inner_objects(payload)?;
            },
            crate::fields::FieldType::Array => {
                validate_inner_objects(payload)?;
            },
            _ => {},
        }
    }
    Ok(())
}

// TESTS
// ================================================================================================

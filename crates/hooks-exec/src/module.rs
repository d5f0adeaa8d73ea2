//! Binding a guest bytecode module into the sandbox.
//!
//! A module is accepted only if every import comes from the `env` namespace and names either a
//! whitelisted host function, the one-page linear memory, or the bounded function table. Each
//! invocation instantiates a fresh module: guest-visible state starts zeroed every run.

use wasmi::{Engine, FuncRef, Linker, Memory, MemoryType, Module, Store, Table, TableType, Val};

use crate::errors::BindError;
use crate::host::{self, HostState};

// IMPORT WHITELIST
// ================================================================================================

/// The closed set of importable host function names.
///
/// Host calls outside this list still exist in the API table and are reachable through the
/// trampoline `_` by API number.
pub const IMPORT_WHITELIST: &[&str] = &[
    "_",
    "_g",
    "accept",
    "rollback",
    "util_raddr",
    "util_accid",
    "util_verify",
    "util_verify_sto",
    "util_sha512h",
    "util_subfield",
    "util_subarray",
    "etxn_details",
    "etxn_fee_base",
    "etxn_reserve",
    "emit",
    "hook_account",
    "hook_hash",
    "nonce",
    "slot_clear",
    "slot_set",
    "slot_field_txt",
    "slot_field",
    "slot_id",
    "slot_type",
    "state_set",
    "state",
    "state_foreign",
    "trace_slot",
    "trace",
    "trace_num",
    "otxn_field",
    "otxn_field_txt",
    "otxn_id",
];

/// Function table limits provided to the guest.
const TABLE_MIN: u32 = 10;
const TABLE_MAX: u32 = 20;

// BOUND MODULE
// ================================================================================================

/// A freshly instantiated guest module, ready for one invocation.
pub(crate) struct BoundModule {
    pub store: Store<HostState>,
    pub instance: wasmi::Instance,
}

/// Parses, polices and instantiates `bytecode` over a fresh store holding `state`.
pub(crate) fn bind_module(
    engine: &Engine,
    bytecode: &[u8],
    state: HostState,
) -> Result<BoundModule, BindError> {
    let module = Module::new(engine, bytecode).map_err(BindError::InvalidModule)?;

    // Police the import surface before anything is wired up.
    let mut imports_memory = false;
    for import in module.imports() {
        if import.module() != "env" {
            return Err(BindError::IllegalImport {
                module: import.module().into(),
                name: import.name().into(),
            });
        }
        match import.ty() {
            wasmi::ExternType::Func(_) => {
                if !IMPORT_WHITELIST.contains(&import.name()) {
                    return Err(BindError::IllegalImport {
                        module: import.module().into(),
                        name: import.name().into(),
                    });
                }
            },
            wasmi::ExternType::Memory(memory_type) => {
                if import.name() != "memory" || !is_single_page(memory_type) {
                    return Err(BindError::IllegalMemoryImport);
                }
                imports_memory = true;
            },
            wasmi::ExternType::Table(_) => {
                if import.name() != "table" {
                    return Err(BindError::IllegalTableImport);
                }
            },
            wasmi::ExternType::Global(_) => return Err(BindError::IllegalGlobalImport),
        }
    }

    let mut store = Store::new(engine, state);
    let mut linker = Linker::new(engine);
    host::register(&mut linker).map_err(BindError::Registration)?;

    // The single non-growable page of linear memory and the bounded function table.
    let memory_type = MemoryType::new(1, Some(1)).map_err(wasmi::Error::from).map_err(BindError::Instantiation)?;
    let host_memory =
        Memory::new(&mut store, memory_type).map_err(wasmi::Error::from).map_err(BindError::Instantiation)?;
    linker
        .define("env", "memory", host_memory)
        .map_err(BindError::Registration)?;
    let table = Table::new(
        &mut store,
        TableType::new(wasmi::core::ValType::FuncRef, TABLE_MIN, Some(TABLE_MAX)),
        Val::FuncRef(FuncRef::null()),
    )
    .map_err(wasmi::Error::from)
    .map_err(BindError::Instantiation)?;
    linker.define("env", "table", table).map_err(BindError::Registration)?;

    let instance = linker
        .instantiate(&mut store, &module)
        .map_err(BindError::Instantiation)?
        .ensure_no_start(&mut store)
        .map_err(|_| BindError::StartFunction)?;

    // Resolve the memory host calls will read and write: the guest's export when present,
    // otherwise the imported host page.
    let memory = match instance.get_memory(&store, "memory") {
        Some(exported) => {
            if !is_single_page(&exported.ty(&store)) {
                return Err(BindError::IllegalMemoryImport);
            }
            exported
        },
        None if imports_memory => host_memory,
        None => return Err(BindError::MissingMemory),
    };
    store.data_mut().memory = Some(memory);

    Ok(BoundModule { store, instance })
}

fn is_single_page(memory_type: &MemoryType) -> bool {
    u32::from(memory_type.initial_pages()) == 1
        && memory_type.maximum_pages().map(u32::from) == Some(1)
}

// TESTS
// ================================================================================================

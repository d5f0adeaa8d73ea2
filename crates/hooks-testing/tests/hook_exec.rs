//! End-to-end invocation tests: gate, verdicts, staged-effect handling and resource bounds.

use anyhow::Context;

use hooks_exec::{apply, ApiError, HookOutcome, HookResult, Verdict};
use hooks_objects::hook::HookDefinition;
use hooks_objects::{AccountId, Hash256};
use hooks_testing::{compile_wat, escape_bytes, payment_template, simple_payment, MockLedger};

// HELPERS
// ================================================================================================

fn hook_account() -> AccountId {
    AccountId::new([0x11; 20])
}

fn sender() -> AccountId {
    AccountId::new([0x22; 20])
}

fn definition(wat: &str) -> HookDefinition {
    HookDefinition {
        // Fire on Payment.
        hook_on: 1,
        namespace: Hash256::new([0xaa; 32]),
        api_version: 0,
        parameters: vec![],
        create_code: compile_wat(wat),
    }
}

fn run(wat: &str, ledger: &mut MockLedger) -> HookResult {
    let def = definition(wat);
    apply(def.hash(), &def, ledger, hook_account(), false)
        .executed()
        .expect("gate admits payments")
}

// VERDICT SCENARIOS
// ================================================================================================

#[test]
fn accept_commits_state_write() -> anyhow::Result<()> {
    let wat = r#"
        (module
          (import "env" "state_set" (func $state_set (param i32 i32 i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (data (i32.const 0) "\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01\01")
          (data (i32.const 32) "hello")
          (func (export "hook") (param i32) (result i64)
            (drop (call $state_set (i32.const 32) (i32.const 5) (i32.const 0) (i32.const 32)))
            (call $accept (i32.const 0) (i32.const 0) (i64.const 0))))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Accept);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.ledger_code(), 0);

    let key = Hash256::new([0x01; 32]);
    assert_eq!(
        ledger.state_of(hook_account(), key).context("state entry must exist")?,
        &b"hello"[..]
    );
    assert_eq!(result.committed.state_writes, vec![(key, Some(b"hello".to_vec()))]);
    Ok(())
}

#[test]
fn rollback_discards_state_write() -> anyhow::Result<()> {
    let wat = r#"
        (module
          (import "env" "state_set" (func $state_set (param i32 i32 i32 i32) (result i64)))
          (import "env" "rollback" (func $rollback (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (data (i32.const 0) "\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02\02")
          (data (i32.const 32) "xno")
          (func (export "hook") (param i32) (result i64)
            (drop (call $state_set (i32.const 32) (i32.const 1) (i32.const 0) (i32.const 32)))
            (call $rollback (i32.const 33) (i32.const 2) (i64.const 42))))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let before = ledger.state_snapshot();
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Rollback);
    assert_eq!(result.exit_code, 42);
    assert_eq!(result.exit_reason, b"no");
    assert_ne!(result.ledger_code(), 0);

    // The ledger is byte-identical to its pre-invocation state.
    assert_eq!(ledger.state_snapshot(), before);
    assert!(result.committed.state_writes.is_empty());
    Ok(())
}

#[test]
fn clean_return_without_verdict_rolls_back() {
    let wat = r#"
        (module
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (i64.const 7)))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Rollback);
    assert_eq!(result.guest_return, Some(7));
}

#[test]
fn guest_trap_is_a_wasm_error() {
    let wat = r#"
        (module
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            unreachable))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);
    assert_eq!(result.verdict, Verdict::WasmError);
}

// RESOURCE BOUNDS
// ================================================================================================

#[test]
fn slot_overflow_reports_no_free_slots() {
    // 256 distinct slot_set calls without clears; the 256th must fail.
    let wat = r#"
        (module
          (import "env" "slot_set" (func $slot_set (param i32 i32 i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (local $i i32) (local $last i64)
            (loop $loop
              (i32.store (i32.const 28) (local.get $i))
              (local.set $last
                (call $slot_set (i32.const 0) (i32.const 32) (i32.const 0) (i32.const 0)))
              (local.set $i (i32.add (local.get $i) (i32.const 1)))
              (br_if $loop (i32.lt_u (local.get $i) (i32.const 256))))
            (call $accept (i32.const 0) (i32.const 0) (local.get $last))))
    "#;

    let mut ledger =
        MockLedger::new(simple_payment(sender(), hook_account())).with_wildcard_objects();
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Accept);
    assert_eq!(result.exit_code, ApiError::NoFreeSlots.code());
}

#[test]
fn guard_trip_forces_wasm_error() {
    let wat = r#"
        (module
          (import "env" "_g" (func $g (param i32 i32) (result i32)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (local $i i32)
            (loop $loop
              (drop (call $g (i32.const 1) (i32.const 10)))
              (local.set $i (i32.add (local.get $i) (i32.const 1)))
              (br_if $loop (i32.lt_u (local.get $i) (i32.const 11))))
            (call $accept (i32.const 0) (i32.const 0) (i64.const 0))))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::WasmError);
    assert_eq!(result.exit_code, ApiError::GuardViolation.code());
}

#[test]
fn emission_reserve_bounds_the_queue() {
    let template = payment_template(hook_account(), sender(), 1_000_000);
    let wat = format!(
        r#"
        (module
          (import "env" "etxn_reserve" (func $reserve (param i32) (result i64)))
          (import "env" "emit" (func $emit (param i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (data (i32.const 0) "{data}")
          (func (export "hook") (param i32) (result i64)
            (drop (call $reserve (i32.const 1)))
            (drop (call $emit (i32.const 0) (i32.const {len})))
            (call $accept (i32.const 0) (i32.const 0)
              (call $emit (i32.const 0) (i32.const {len})))))
        "#,
        data = escape_bytes(&template),
        len = template.len(),
    );

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(&wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Accept);
    // The second emit hit the declared bound.
    assert_eq!(result.exit_code, ApiError::TooManyEmittedTxn.code());
    assert_eq!(result.committed.emitted_count, 1);
    assert_eq!(ledger.emitted.len(), 1);

    // The attached transaction carries the emission stamp.
    let details = ledger.emitted[0]
        .emit_details()
        .expect("emitted transactions carry details")
        .expect("details decode");
    assert_eq!(details.generation, 1);
    assert_eq!(details.burden, 1);
    assert_eq!(details.callback, hook_account());
    assert_eq!(details.parent_txn_id, ledger_otxn_id(&ledger));
}

#[test]
fn out_of_bounds_write_is_rejected_bytewise() {
    // hook_account into the last 10 bytes of the page with a declared length of 20.
    let wat = r#"
        (module
          (import "env" "hook_account" (func $hook_account (param i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (call $accept (i32.const 0) (i32.const 0)
              (call $hook_account (i32.const 65526) (i32.const 20)))))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);

    assert_eq!(result.verdict, Verdict::Accept);
    assert_eq!(result.exit_code, ApiError::OutOfBounds.code());
}

// GATE AND BINDING
// ================================================================================================

#[test]
fn hook_on_gate_skips_unselected_types() {
    let wat = r#"
        (module
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64) (i64.const 0)))
    "#;
    let mut def = definition(wat);
    // Mask out Payment.
    def.hook_on = !1u64;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let outcome = apply(def.hash(), &def, &mut ledger, hook_account(), false);
    assert!(matches!(outcome, HookOutcome::Skipped));
}

#[test]
fn non_whitelisted_import_fails_binding() {
    let wat = r#"
        (module
          (import "env" "gettimeofday" (func $t (result i64)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (call $t)))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);
    assert_eq!(result.verdict, Verdict::WasmError);
    assert_eq!(result.exit_reason, b"module binding failed");
}

#[test]
fn foreign_namespace_import_fails_binding() {
    let wat = r#"
        (module
          (import "wasi_snapshot_preview1" "proc_exit" (func $e (param i32)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64) (i64.const 0)))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);
    assert_eq!(result.verdict, Verdict::WasmError);
}

#[test]
fn missing_entry_function_is_a_wasm_error() {
    let wat = r#"
        (module
          (memory (export "memory") 1 1)
          (func (export "not_hook") (param i32) (result i64) (i64.const 0)))
    "#;

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = run(wat, &mut ledger);
    assert_eq!(result.verdict, Verdict::WasmError);
    assert_eq!(result.exit_reason, b"entry function missing");
}

#[test]
fn callback_invocations_use_cbak() {
    let wat = r#"
        (module
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (func (export "hook") (param i32) (result i64)
            (call $accept (i32.const 0) (i32.const 0) (i64.const 1)))
          (func (export "cbak") (param i32) (result i64)
            (call $accept (i32.const 0) (i32.const 0) (i64.const 2))))
    "#;
    let def = definition(wat);

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
    let result = apply(def.hash(), &def, &mut ledger, hook_account(), true)
        .executed()
        .expect("gate admits payments");
    assert_eq!(result.exit_code, 2);
}

// DETERMINISM
// ================================================================================================

#[test]
fn identical_runs_produce_identical_outcomes() {
    let template = payment_template(hook_account(), sender(), 1_000_000);
    let wat = format!(
        r#"
        (module
          (import "env" "etxn_reserve" (func $reserve (param i32) (result i64)))
          (import "env" "emit" (func $emit (param i32 i32) (result i64)))
          (import "env" "state_set" (func $state_set (param i32 i32 i32 i32) (result i64)))
          (import "env" "nonce" (func $nonce (param i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (data (i32.const 0) "{data}")
          (func (export "hook") (param i32) (result i64)
            (drop (call $nonce (i32.const 1024) (i32.const 32)))
            (drop (call $state_set (i32.const 1024) (i32.const 32) (i32.const 1024) (i32.const 32)))
            (drop (call $reserve (i32.const 1)))
            (drop (call $emit (i32.const 0) (i32.const {len})))
            (call $accept (i32.const 0) (i32.const 0) (i64.const 0))))
        "#,
        data = escape_bytes(&template),
        len = template.len(),
    );

    let run_once = || {
        let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()));
        let result = run(&wat, &mut ledger);
        (
            result.verdict,
            result.exit_code,
            result.exit_reason.clone(),
            result.committed.state_writes.clone(),
            ledger.emitted.iter().map(|tx| tx.as_bytes().to_vec()).collect::<Vec<_>>(),
        )
    };

    assert_eq!(run_once(), run_once());
}

#[test]
fn failed_emission_attachment_rolls_the_commit_back() {
    let template = payment_template(hook_account(), sender(), 1_000_000);
    let wat = format!(
        r#"
        (module
          (import "env" "etxn_reserve" (func $reserve (param i32) (result i64)))
          (import "env" "emit" (func $emit (param i32 i32) (result i64)))
          (import "env" "state_set" (func $state_set (param i32 i32 i32 i32) (result i64)))
          (import "env" "accept" (func $accept (param i32 i32 i64) (result i64)))
          (memory (export "memory") 1 1)
          (data (i32.const 0) "{data}")
          (data (i32.const 1024) "\09\09\09\09")
          (func (export "hook") (param i32) (result i64)
            (drop (call $state_set (i32.const 1024) (i32.const 4) (i32.const 1024) (i32.const 4)))
            (drop (call $reserve (i32.const 1)))
            (drop (call $emit (i32.const 0) (i32.const {len})))
            (call $accept (i32.const 0) (i32.const 0) (i64.const 0))))
        "#,
        data = escape_bytes(&template),
        len = template.len(),
    );

    let mut ledger = MockLedger::new(simple_payment(sender(), hook_account()))
        .with_rejected_emissions();
    let before = ledger.state_snapshot();
    let result = run(&wat, &mut ledger);

    // Accept flipped to rollback after the fact; no partial state survives.
    assert_eq!(result.verdict, Verdict::Rollback);
    assert_eq!(ledger.state_snapshot(), before);
    assert!(ledger.emitted.is_empty());
}

// HELPERS
// ================================================================================================

fn ledger_otxn_id(ledger: &MockLedger) -> Hash256 {
    use hooks_exec::ApplyContext;
    ledger.view().otxn().id()
}

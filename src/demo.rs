//! Built-in demonstration suite used by the `phasekit` binary.
//!
//! - `arith`: one implicit phase, short, live vector.
//! - `ledger`: two cumulative phases, long, baseline-driven. Phase 0 opens accounts and checks opening balances;
//!   its teardown closes the day. Phase 1 refuses to start before that and checks transfers against the closed
//!   balances.

use std::collections::BTreeMap;

use phasekit_core::{Array, CaseError, FailureSink, TestCase, check_eq, require};
use serde::{Deserialize, Serialize};

use crate::package::Package;
use crate::suite::Suite;

pub fn demo_suite() -> Suite {
    Suite::new()
        .with(Package::new("arith", Arith))
        .with(Package::new("ledger", Ledger::default()).with_phases(2).with_baseline())
}

// ============================================================================
// arith
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sum {
    pub a: i64,
    pub b: i64,
    pub want: i64,
}

pub struct Arith;

impl TestCase for Arith {
    type Params = Sum;
    type Vector = Array<Sum>;

    fn setup(&mut self, _phase: usize) -> Result<(), CaseError> {
        Ok(())
    }

    fn vector(&self) -> Array<Sum> {
        [(1, 2, 3), (-4, 4, 0), (i64::MAX - 1, 1, i64::MAX)]
            .into_iter()
            .map(|(a, b, want)| Sum { a, b, want })
            .collect()
    }

    fn run(&mut self, sink: &mut dyn FailureSink, params: &Sum) {
        let got = params.a.checked_add(params.b);
        check_eq(sink, &Some(params.want), &got, "sum");
    }
}

// ============================================================================
// ledger
// ============================================================================

/// One ledger case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Entry {
    /// Phase 0: an account's opening balance
    Balance { account: String, want: u64 },
    /// Phase 1: whether a transfer is covered by the closed balance of `from`
    Transfer {
        from: String,
        to: String,
        amount: u64,
        allowed: bool,
    },
}

const OPENING: &[(&str, u64)] = &[("alice", 100), ("bob", 40)];

/// Closing the day adds this flat fee refund to every account.
const CLOSE_OF_DAY_CREDIT: u64 = 5;

#[derive(Debug, Default)]
pub struct Ledger {
    balances: BTreeMap<String, u64>,
    closed: Option<BTreeMap<String, u64>>,
    next_phase: usize,
}

impl TestCase for Ledger {
    type Params = Entry;
    type Vector = Array<Entry>;

    fn setup(&mut self, phase: usize) -> Result<(), CaseError> {
        match phase {
            0 => {
                self.closed = None;
                self.next_phase = 0;
                self.balances = OPENING.iter().map(|(name, amount)| (name.to_string(), *amount)).collect();
                Ok(())
            }
            1 => {
                let closed = self.closed.clone().ok_or("phase 0 has not been closed")?;
                self.balances = closed;
                Ok(())
            }
            _ => Err(format!("ledger has no phase {}", phase).into()),
        }
    }

    fn vector(&self) -> Array<Entry> {
        if self.next_phase == 0 {
            return OPENING
                .iter()
                .map(|(name, amount)| Entry::Balance {
                    account: name.to_string(),
                    want: *amount,
                })
                .collect();
        }
        vec![
            transfer("alice", "bob", 105, true),
            transfer("alice", "bob", 106, false),
            transfer("bob", "alice", 45, true),
            transfer("carol", "alice", 1, false),
        ]
        .into()
    }

    fn run(&mut self, sink: &mut dyn FailureSink, params: &Entry) {
        match params {
            Entry::Balance { account, want } => {
                let got = self.balances.get(account).copied();
                check_eq(sink, &Some(*want), &got, account);
            }
            Entry::Transfer {
                from,
                to,
                amount,
                allowed,
            } => {
                require(sink, from != to, format_args!("transfer from {} to itself", from));
                let covered = self.balances.get(from).is_some_and(|balance| balance >= amount);
                check_eq(sink, allowed, &covered, &format!("{} -> {} ({})", from, to, amount));
            }
        }
    }

    fn teardown(&mut self, phase: usize) -> Result<(), CaseError> {
        if phase == 0 {
            let closed = self
                .balances
                .iter()
                .map(|(name, balance)| (name.clone(), balance + CLOSE_OF_DAY_CREDIT))
                .collect();
            self.closed = Some(closed);
        }
        self.next_phase = phase + 1;
        Ok(())
    }

    fn is_long(&self) -> bool {
        true
    }
}

fn transfer(from: &str, to: &str, amount: u64, allowed: bool) -> Entry {
    Entry::Transfer {
        from: from.to_string(),
        to: to.to_string(),
        amount,
        allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasekit_core::{Recorder, vector_params};

    #[test]
    fn test_demo_suite_order() {
        let suite = demo_suite();
        assert_eq!(suite.len(), 2);
        assert!(!suite.is_empty());
        assert_eq!(suite.names(), vec!["arith", "ledger"]);
    }

    #[test]
    fn test_arith_cases_pass() {
        let mut arith = Arith;
        for case in vector_params(&arith.vector()) {
            let mut r = Recorder::new();
            arith.run(&mut r, &case);
            assert!(!r.failed(), "{:?}: {:?}", case, r.last_message());
        }
    }

    #[test]
    fn test_ledger_phase_one_needs_phase_zero() {
        let mut ledger = Ledger::default();
        let err = ledger.setup(1).unwrap_err();
        assert_eq!(err.to_string(), "phase 0 has not been closed");
    }

    #[test]
    fn test_ledger_vector_follows_phase_context() {
        let mut ledger = Ledger::default();
        assert!(matches!(ledger.vector().as_slice()[0], Entry::Balance { .. }));
        ledger.setup(0).unwrap();
        ledger.teardown(0).unwrap();
        assert!(matches!(ledger.vector().as_slice()[0], Entry::Transfer { .. }));
    }

    #[test]
    fn test_ledger_transfers_use_closed_balances() {
        let mut ledger = Ledger::default();
        ledger.setup(0).unwrap();
        ledger.teardown(0).unwrap();
        ledger.setup(1).unwrap();
        for case in vector_params(&ledger.vector()) {
            let mut r = Recorder::new();
            ledger.run(&mut r, &case);
            assert!(!r.failed(), "{:?}: {:?}", case, r.last_message());
        }
    }

    #[test]
    fn test_entry_encoding_is_tagged() {
        let json = serde_json::to_string(&transfer("a", "b", 1, true)).unwrap();
        assert_eq!(json, r#"{"op":"transfer","from":"a","to":"b","amount":1,"allowed":true}"#);
    }
}

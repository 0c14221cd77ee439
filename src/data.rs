use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

pub type Pin = u32;
pub type Handle = String;

pub const SIGNIFICANT_DIGITS: u32 = 2;

/// Builds the short login handle out of an owner's full name: the lowercased
/// initial of every word, glued together ("Jonas Schmedtmann" gives "js").
pub(crate) fn derive_handle(owner: &str) -> Handle {
    owner
        .to_lowercase()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// This is our `Account` structure. You'll note it has no `balance` field: it's a
/// "virtual" field whose value is always the sum of `movements`, so it's
/// computed each time it's needed instead of being kept in sync by hand.
/// The handle is derived once from the owner's name and movements can only be
/// appended, hence the private fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "AccountSerializer")]
pub(crate) struct Account {
    owner: String,
    handle: Handle,
    pin: Pin,
    interest_rate: Decimal,
    movements: Vec<Decimal>,
}

impl Account {
    pub fn new(owner: &str, movements: Vec<Decimal>, interest_rate: Decimal, pin: Pin) -> Self {
        Self {
            handle: derive_handle(owner),
            owner: owner.to_string(),
            pin,
            interest_rate,
            movements,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn first_name(&self) -> &str {
        self.owner.split_whitespace().next().unwrap_or_default()
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn pin(&self) -> Pin {
        self.pin
    }

    pub fn movements(&self) -> &[Decimal] {
        &self.movements
    }

    /// Appends a movement at the end of the history. Nothing else may touch it.
    /// Callers check `fits` first.
    pub(crate) fn record(&mut self, amount: Decimal) {
        self.movements.push(amount);
    }

    /// Whether balance and summary can still be computed exactly once
    /// `amount` is recorded.
    pub fn fits(&self, amount: Decimal) -> bool {
        self.checked_figures(Some(amount)).is_some()
    }

    /// Balance and summary over the movements plus `extra`, `None` as soon as
    /// one step overflows a `Decimal`.
    fn checked_figures(&self, extra: Option<Decimal>) -> Option<(Decimal, Summary)> {
        let mut balance = Decimal::ZERO;
        let mut summary = Summary::default();
        for &m in self.movements.iter().chain(extra.as_ref()) {
            balance = balance.checked_add(m)?;
            if m > Decimal::ZERO {
                summary.total_in = summary.total_in.checked_add(m)?;
                let interest = m.checked_mul(self.interest_rate)? / dec!(100);
                if interest >= Decimal::ONE {
                    summary.interest = summary.interest.checked_add(interest)?;
                }
            } else if m < Decimal::ZERO {
                summary.total_out = summary.total_out.checked_add(m)?;
            }
        }
        Some((balance, summary))
    }

    /// Saturates rather than panicking; the book never lets an account get
    /// there.
    pub fn balance(&self) -> Decimal {
        self.movements
            .iter()
            .fold(Decimal::ZERO, |acc, m| acc.saturating_add(*m))
    }

    /// Deposits, withdrawals and accrued interest. Interest is earned per
    /// deposit, and a deposit whose interest is under one unit earns nothing:
    /// the threshold is on the interest, not on the deposit itself.
    pub fn summary(&self) -> Summary {
        let deposits = self.movements.iter().filter(|m| **m > Decimal::ZERO);
        Summary {
            total_in: deposits
                .clone()
                .fold(Decimal::ZERO, |acc, m| acc.saturating_add(*m)),
            total_out: self
                .movements
                .iter()
                .filter(|m| **m < Decimal::ZERO)
                .fold(Decimal::ZERO, |acc, m| acc.saturating_add(*m)),
            interest: deposits
                .map(|deposit| deposit.saturating_mul(self.interest_rate) / dec!(100))
                .filter(|interest| *interest >= Decimal::ONE)
                .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i)),
        }
    }

    pub fn sorted_movements(&self, order: MovementOrder) -> Vec<Decimal> {
        let mut movements = self.movements.clone();
        if order == MovementOrder::Ascending {
            movements.sort();
        }
        movements
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total_in: Decimal,
    /// Signed: this is negative (or zero), take `abs()` for display.
    pub total_out: Decimal,
    pub interest: Decimal,
}

/// Display order of a movement list
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MovementOrder {
    #[default]
    Insertion,
    Ascending,
}

/// This is our proxy for serializing `Account`: balance and summary are
/// computed just before serialization. Secrets stay out of it.
#[derive(Serialize)]
pub(crate) struct AccountSerializer {
    pub handle: Handle,
    pub owner: String,
    pub balance: Decimal,
    pub income: Decimal,
    pub out: Decimal,
    pub interest: Decimal,
}

impl From<Account> for AccountSerializer {
    fn from(account: Account) -> Self {
        let summary = account.summary();
        Self {
            balance: account.balance().normalize(),
            income: summary.total_in.normalize(),
            out: summary.total_out.abs().normalize(),
            interest: summary.interest.round_dp(SIGNIFICANT_DIGITS).normalize(),
            handle: account.handle,
            owner: account.owner,
        }
    }
}

/// The accounts every ledger starts with.
pub(crate) fn sample_accounts() -> Vec<Account> {
    vec![
        Account::new(
            "Jonas Schmedtmann",
            vec![
                dec!(200),
                dec!(450),
                dec!(-400),
                dec!(3000),
                dec!(-650),
                dec!(-130),
                dec!(70),
                dec!(1300),
            ],
            dec!(1.2),
            1111,
        ),
        Account::new(
            "Jessica Davis",
            vec![
                dec!(5000),
                dec!(3400),
                dec!(-150),
                dec!(-790),
                dec!(-3210),
                dec!(-1000),
                dec!(8500),
                dec!(-30),
            ],
            dec!(1.5),
            2222,
        ),
        Account::new(
            "Steven Thomas Williams",
            vec![
                dec!(200),
                dec!(-200),
                dec!(340),
                dec!(-300),
                dec!(-20),
                dec!(50),
                dec!(400),
                dec!(-460),
            ],
            dec!(0.7),
            3333,
        ),
        Account::new(
            "Sarah Smith",
            vec![dec!(430), dec!(1000), dec!(700), dec!(50), dec!(90)],
            dec!(1),
            4444,
        ),
    ]
}

/// Ledger rejections. None of them is fatal: the operation just didn't
/// happen and the ledger is left as it was.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("No account is logged in")]
    NotLoggedIn,
    #[error("Wrong handle or PIN")]
    AuthenticationFailed,
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("No account with handle '{0}'")]
    RecipientNotFound(Handle),
    #[error("Can't transfer to the same account")]
    SelfTransfer,
    #[error("Insufficient funds for operation (asked {asked} while {available} available)")]
    InsufficientFunds { asked: Decimal, available: Decimal },
    #[error("Balance must be positive to get a loan")]
    NoPositiveBalance,
    #[error("Loan needs a movement of at least {required}")]
    InsufficientCollateral { required: Decimal },
    #[error("Handle or PIN doesn't match the current account")]
    CloseMismatch,
    #[error("Amount would overflow the account's figures")]
    AmountOverflow,
    #[error("Handle '{0}' is already taken")]
    DuplicateHandle(Handle),
}

#[cfg(test)]
mod tests {
    use super::{derive_handle, sample_accounts, Account, AccountSerializer, MovementOrder};
    use rust_decimal_macros::dec;

    #[test]
    fn test_derive_handle() {
        assert_eq!(derive_handle("Jonas Schmedtmann"), "js");
        assert_eq!(derive_handle("Sarah Smith"), "ss");
        assert_eq!(derive_handle("Steven Thomas Williams"), "stw");
        assert_eq!(derive_handle("  Jessica   Davis "), "jd");
    }
    #[test]
    fn test_first_name() {
        let account = Account::new("Steven Thomas Williams", vec![], dec!(0.7), 3333);
        assert_eq!(account.first_name(), "Steven");
    }
    #[test]
    fn test_balance() {
        let account = Account::new("A B", vec![dec!(200), dec!(-200), dec!(340)], dec!(1), 1);
        assert_eq!(account.balance(), dec!(340));
        let empty = Account::new("A B", vec![], dec!(1), 1);
        assert_eq!(empty.balance(), dec!(0));
    }
    #[test]
    fn test_summary() {
        let account = Account::new("A B", vec![dec!(100), dec!(-30), dec!(1300)], dec!(1.2), 1);
        let summary = account.summary();
        assert_eq!(summary.total_in, dec!(1400));
        assert_eq!(summary.total_out, dec!(-30));
        assert_eq!(summary.interest, dec!(16.8));
    }
    #[test]
    fn test_interest_threshold_is_per_deposit() {
        let small = Account::new("A B", vec![dec!(50)], dec!(1.2), 1);
        assert_eq!(small.summary().interest, dec!(0));
        // 50 alone earns 0.6 and is dropped, 100 earns exactly 1 and counts
        let mixed = Account::new("A B", vec![dec!(50), dec!(100)], dec!(1), 1);
        assert_eq!(mixed.summary().interest, dec!(1));
    }
    #[test]
    fn test_sorted_movements() {
        let account = Account::new("A B", vec![dec!(200), dec!(-400), dec!(70)], dec!(1), 1);
        let sorted = account.sorted_movements(MovementOrder::Ascending);
        assert_eq!(sorted, [dec!(-400), dec!(70), dec!(200)]);
        assert_eq!(account.sorted_movements(MovementOrder::Ascending), sorted);
        assert_eq!(account.movements(), [dec!(200), dec!(-400), dec!(70)]);
        assert_eq!(
            account.sorted_movements(MovementOrder::Insertion),
            account.movements()
        );
    }
    #[test]
    fn test_sample_handles() {
        let handles: Vec<_> = sample_accounts()
            .iter()
            .map(|a| a.handle().to_string())
            .collect();
        assert_eq!(handles, ["js", "jd", "stw", "ss"]);
    }
    #[test]
    fn test_serializer() {
        let account = Account::new("Jonas Schmedtmann", vec![dec!(100), dec!(-30)], dec!(1.2), 1);
        let row = AccountSerializer::from(account);
        assert_eq!(row.handle, "js");
        assert_eq!(row.balance, dec!(70));
        assert_eq!(row.income, dec!(100));
        assert_eq!(row.out, dec!(30));
        assert_eq!(row.interest, dec!(1.20));
    }
}

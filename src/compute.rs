use crate::data::{Account, Error, Handle, MovementOrder, Pin};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

/// Who is currently using the ledger. Every operation that works "on the
/// current account" takes it explicitly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) enum Session {
    #[default]
    LoggedOut,
    LoggedIn(Handle),
}

impl Session {
    pub fn handle(&self) -> Result<&str, Error> {
        match self {
            Session::LoggedIn(handle) => Ok(handle.as_str()),
            Session::LoggedOut => Err(Error::NotLoggedIn),
        }
    }
}

/// This is where accounts are stored, in the order they were opened. The
/// ledger is single-threaded so no protections for MT: every operation runs
/// to completion through `&mut self`.
#[derive(Debug, Default)]
pub(crate) struct AccountBook {
    accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Result<Self, Error> {
        let mut book = Self::new();
        for account in accounts {
            book.open(account)?;
        }
        Ok(book)
    }

    /// Adds an account at the end of the book. Handles are what logins and
    /// transfers look up, so two accounts can't share one.
    pub fn open(&mut self, account: Account) -> Result<(), Error> {
        if self.find(account.handle()).is_some() {
            return Err(Error::DuplicateHandle(account.handle().to_string()));
        }
        // a zero movement counts nowhere, this checks the history alone
        if !account.fits(Decimal::ZERO) {
            return Err(Error::AmountOverflow);
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn find(&self, handle: &str) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.handle() == handle)
    }

    fn position(&self, handle: &str) -> Option<usize> {
        self.accounts.iter().position(|acc| acc.handle() == handle)
    }

    /// The account behind a session; a session pointing to a closed account
    /// is as good as logged out.
    pub fn current(&self, session: &Session) -> Result<&Account, Error> {
        self.find(session.handle()?).ok_or(Error::NotLoggedIn)
    }

    pub fn authenticate(&self, handle: &str, pin: Pin) -> Result<&Account, Error> {
        self.find(handle)
            .filter(|acc| acc.pin() == pin)
            .ok_or(Error::AuthenticationFailed)
    }

    pub fn login(&self, handle: &str, pin: Pin) -> Result<Session, Error> {
        let account = self.authenticate(handle, pin)?;
        info!("Welcome back {}", account.first_name());
        Ok(Session::LoggedIn(account.handle().to_string()))
    }

    /// Moves `amount` from the current account to `to`. Every check is done
    /// before touching anything so that both movements land or neither does.
    pub fn transfer(&mut self, session: &Session, to: &str, amount: Decimal) -> Result<(), Error> {
        let from = self.position(session.handle()?).ok_or(Error::NotLoggedIn)?;
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }
        let to = self
            .position(to)
            .ok_or_else(|| Error::RecipientNotFound(to.to_string()))?;
        let available = self.accounts[from].balance();
        if available < amount {
            return Err(Error::InsufficientFunds {
                asked: amount,
                available,
            });
        }
        if from == to {
            return Err(Error::SelfTransfer);
        }
        if !self.accounts[from].fits(-amount) || !self.accounts[to].fits(amount) {
            return Err(Error::AmountOverflow);
        }
        self.accounts[from].record(-amount);
        self.accounts[to].record(amount);
        info!(
            "Transferred {amount} from {} to {}",
            self.accounts[from].handle(),
            self.accounts[to].handle()
        );
        Ok(())
    }

    /// Grants a loan if some past movement covers at least 10% of it.
    pub fn request_loan(&mut self, session: &Session, amount: Decimal) -> Result<(), Error> {
        let index = self.position(session.handle()?).ok_or(Error::NotLoggedIn)?;
        let account = &mut self.accounts[index];
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }
        if account.balance() <= Decimal::ZERO {
            return Err(Error::NoPositiveBalance);
        }
        let required = amount * dec!(0.1);
        if !account.movements().iter().any(|m| *m >= required) {
            return Err(Error::InsufficientCollateral { required });
        }
        if !account.fits(amount) {
            return Err(Error::AmountOverflow);
        }
        account.record(amount);
        info!("Loan of {amount} granted to {}", account.handle());
        Ok(())
    }

    /// Closes the current account, provided its owner confirms with its
    /// handle and PIN. The account is gone for good and the session ends.
    pub fn close_account(
        &mut self,
        session: &mut Session,
        handle: &str,
        pin: Pin,
    ) -> Result<Account, Error> {
        let current = self.current(session)?;
        if current.handle() != handle || current.pin() != pin {
            return Err(Error::CloseMismatch);
        }
        let index = self.position(handle).ok_or(Error::NotLoggedIn)?;
        let account = self.accounts.remove(index);
        *session = Session::LoggedOut;
        info!("Account {} of {} closed", account.handle(), account.owner());
        Ok(account)
    }

    pub fn sorted_movements(
        &self,
        session: &Session,
        order: MovementOrder,
    ) -> Result<Vec<Decimal>, Error> {
        Ok(self.current(session)?.sorted_movements(order))
    }
}

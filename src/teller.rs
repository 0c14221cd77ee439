use crate::{
    compute::{AccountBook, Session},
    data::{Error, MovementOrder},
    read::{Action::*, Command, CommandUser},
};
use rust_decimal::Decimal;
use tracing::debug;

/// The counter in front of the ledger: it keeps track of who's logged in and
/// of how the movement list is currently displayed. Neither is ledger state.
#[derive(Debug)]
pub(crate) struct Teller {
    book: AccountBook,
    session: Session,
    sorted: bool,
}

impl Teller {
    pub fn new(book: AccountBook) -> Self {
        Self {
            book,
            session: Session::LoggedOut,
            sorted: false,
        }
    }

    pub fn book(&self) -> &AccountBook {
        &self.book
    }

    fn order(&self) -> MovementOrder {
        if self.sorted {
            MovementOrder::Ascending
        } else {
            MovementOrder::Insertion
        }
    }

    /// The current account's movements, as they're shown right now.
    pub fn displayed_movements(&self) -> Result<Vec<Decimal>, Error> {
        self.book.sorted_movements(&self.session, self.order())
    }

    /// The movement list is redrawn in insertion order after every change,
    /// so the sort toggle starts over.
    fn refresh(&mut self) -> Result<(), Error> {
        self.sorted = false;
        let account = self.book.current(&self.session)?;
        let summary = account.summary();
        debug!(
            "{}: balance {}, in {}, out {}, interest {}",
            account.handle(),
            account.balance(),
            summary.total_in,
            summary.total_out.abs(),
            summary.interest,
        );
        Ok(())
    }
}

impl CommandUser for Teller {
    fn use_cmd(&mut self, cmd: Command) -> Result<(), Error> {
        // An empty cell is no different from an empty form field: it simply
        // matches nothing. An unreadable PIN never matches either.
        let user = cmd.user.unwrap_or_default();
        let amount = cmd.amount.unwrap_or_default();
        match cmd.action {
            Login => {
                let pin = cmd.pin.ok_or(Error::AuthenticationFailed)?;
                self.session = self.book.login(&user, pin)?;
                self.refresh()?;
            }
            Transfer => {
                let to = cmd.to.unwrap_or_default();
                self.book.transfer(&self.session, &to, amount)?;
                self.refresh()?;
            }
            Loan => {
                self.book.request_loan(&self.session, amount)?;
                self.refresh()?;
            }
            Close => {
                let Some(pin) = cmd.pin else {
                    self.book.current(&self.session)?;
                    return Err(Error::CloseMismatch);
                };
                self.book.close_account(&mut self.session, &user, pin)?;
                self.sorted = false;
            }
            Sort => {
                self.book.current(&self.session)?;
                self.sorted = !self.sorted;
                debug!("Movements shown in {:?} order", self.order());
            }
        }
        Ok(())
    }
}

use crate::compute::AccountBook;
use rust_decimal::Decimal;
use serde::Serialize;

/// Basic CSV exporter for an `AccountBook`; see `AccountSerializer` for the
/// columns.
pub(crate) fn write_accounts<W: std::io::Write>(
    writer: W,
    book: &AccountBook,
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for account in book.accounts() {
        wtr.serialize(account)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct MovementRow {
    index: usize,
    kind: &'static str,
    amount: Decimal,
}

/// CSV exporter for a movement list, numbered in the order given.
pub(crate) fn write_movements<W: std::io::Write>(
    writer: W,
    movements: &[Decimal],
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, &amount) in movements.iter().enumerate() {
        wtr.serialize(MovementRow {
            index: i + 1,
            kind: if amount > Decimal::ZERO {
                "deposit"
            } else {
                "withdrawal"
            },
            amount,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

use compute::AccountBook;
use read::read_commands;
use teller::Teller;
use write::{write_accounts, write_movements};

mod compute;
mod data;
mod log;
mod read;
mod teller;
mod write;

fn main() -> Result<(), anyhow::Error> {
    let args: Vec<String> = std::env::args().collect();
    if !(2..=3).contains(&args.len()) {
        anyhow::bail!(
            "usage: {} commands.csv [statement.csv] > accounts.csv",
            args[0]
        );
    }
    log::init();
    let mut teller = Teller::new(AccountBook::with_accounts(data::sample_accounts())?);
    read_commands(std::fs::File::open(&args[1])?, &mut teller)?;
    write_accounts(std::io::stdout(), teller.book())?;
    if let Some(path) = args.get(2) {
        match teller.displayed_movements() {
            Ok(movements) => write_movements(std::fs::File::create(path)?, &movements)?,
            Err(e) => tracing::warn!("No statement written: {e}"),
        }
    }
    Ok(())
}

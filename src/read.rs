use crate::data::{Error, Pin, SIGNIFICANT_DIGITS};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// One user action, the way a form submission would carry it. Cells that
/// don't parse as a number end up as `None`, it's up to the user of the
/// command to treat that as a failed precondition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Command {
    pub action: Action,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pin: Option<Pin>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Action {
    Login,
    Transfer,
    Loan,
    Close,
    Sort,
}

/// Trait for doing something with a `Command` read from a CSV file.
/// Used by the teller to drive the ledger, but also used for mock tests to
/// check we get the correct results from reading a CSV stream.
pub(crate) trait CommandUser {
    fn use_cmd(&mut self, cmd: Command) -> Result<(), Error>;
}

/// Simple CSV importer for `Command`s. A rejected command is logged and
/// skipped; only a broken stream stops the import.
pub(crate) fn read_commands<R: std::io::Read, U: CommandUser>(
    reader: R,
    user: &mut U,
) -> Result<(), anyhow::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    for (line, result) in rdr.deserialize().enumerate() {
        let mut cmd: Command = result?;
        if let Some(mut amount) = cmd.amount {
            amount.rescale(SIGNIFICANT_DIGITS);
            cmd.amount = Some(amount);
        }
        let action = cmd.action;
        if let Err(e) = user.use_cmd(cmd) {
            warn!("Command #{} ({action:?}) rejected: {e}", line + 1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        data::Error,
        read::{read_commands, Action::*, Command, CommandUser},
    };
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct CmdStorage {
        cmds: Vec<Command>,
    }
    impl CommandUser for CmdStorage {
        fn use_cmd(&mut self, cmd: Command) -> Result<(), Error> {
            self.cmds.push(cmd);
            Ok(())
        }
    }

    #[test]
    fn read_cmd() {
        let mut storage = CmdStorage::default();
        let commands_csv = b"\
action,   user, pin,  to, amount
login,    js,   1111, ,
transfer, ,     ,     jd, 40.5
loan,     ,     ,     ,   1000
sort,     ,     ,     ,
close,    js,   1111, ,
";
        read_commands(&commands_csv[..], &mut storage).unwrap();
        assert_eq!(
            storage.cmds,
            [
                Command {
                    action: Login,
                    user: Some("js".into()),
                    pin: Some(1111),
                    to: None,
                    amount: None
                },
                Command {
                    action: Transfer,
                    user: None,
                    pin: None,
                    to: Some("jd".into()),
                    amount: Some(dec!(40.50))
                },
                Command {
                    action: Loan,
                    user: None,
                    pin: None,
                    to: None,
                    amount: Some(dec!(1000))
                },
                Command {
                    action: Sort,
                    user: None,
                    pin: None,
                    to: None,
                    amount: None
                },
                Command {
                    action: Close,
                    user: Some("js".into()),
                    pin: Some(1111),
                    to: None,
                    amount: None
                },
            ]
        )
    }
    #[test]
    fn read_garbage_numbers() {
        let mut storage = CmdStorage::default();
        let commands_csv = b"\
action,   user, pin,  to, amount
login,    js,   abcd, ,
loan,     ,     ,     ,   lots
";
        read_commands(&commands_csv[..], &mut storage).unwrap();
        assert_eq!(storage.cmds[0].pin, None);
        assert_eq!(storage.cmds[1].amount, None);
    }
    #[test]
    fn read_rescales_amounts() {
        let mut storage = CmdStorage::default();
        let commands_csv = b"\
action, user, pin, to, amount
loan,   ,     ,    ,   0.004
";
        read_commands(&commands_csv[..], &mut storage).unwrap();
        assert_eq!(storage.cmds[0].amount, Some(dec!(0)));
    }
    #[test]
    fn rejected_commands_dont_stop_reading() {
        #[derive(Default)]
        struct Grumpy {
            seen: usize,
        }
        impl CommandUser for Grumpy {
            fn use_cmd(&mut self, _cmd: Command) -> Result<(), Error> {
                self.seen += 1;
                Err(Error::NotLoggedIn)
            }
        }
        let mut grumpy = Grumpy::default();
        let commands_csv = b"\
action, user, pin, to, amount
sort,   ,     ,    ,
sort,   ,     ,    ,
";
        read_commands(&commands_csv[..], &mut grumpy).unwrap();
        assert_eq!(grumpy.seen, 2);
    }
    #[test]
    fn unknown_action_is_an_error() {
        let mut storage = CmdStorage::default();
        let commands_csv = b"\
action,   user, pin, to, amount
withdraw, ,     ,    ,   10
";
        assert!(read_commands(&commands_csv[..], &mut storage).is_err());
    }
}

//! Chat command parsing.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::CommandError;
use crate::exchange::{resolve_exchange, ExchangeId};

/// Usage hint for `/setthreshold`.
pub const THRESHOLD_USAGE: &str =
    "❌ Usage: /setthreshold 0.1  (for 0.1%) or /setthreshold 0.001 (decimal)";
/// Usage hint for `/setfee`.
pub const FEE_USAGE: &str = "❌ Usage: /setfee <exchange> <percent>  e.g. /setfee binance 0.1";
/// Usage hint for `/setinterval`.
pub const INTERVAL_USAGE: &str = "❌ Usage: /setinterval <seconds>";

/// A parsed control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting and command list.
    Start,
    /// Same as `Start`.
    Help,
    /// Stop polling.
    Stop,
    /// Resume polling.
    Resume,
    /// Loop state and counts.
    Status,
    /// Tracked pairs.
    Pairs,
    /// New threshold, already converted to a fraction.
    SetThreshold(Decimal),
    /// Fee override in percent.
    SetFee {
        /// Venue, with legacy aliases resolved to the canonical id.
        exchange: ExchangeId,
        /// Percent.
        percent: Decimal,
    },
    /// Poll interval in seconds, not yet range-checked.
    SetInterval(u64),
    /// Current fee overrides.
    Fees,
}

/// Parse a chat message into a [`Command`].
///
/// Bot-name suffixes (`/status@mybot`) are accepted and command names are
/// case-insensitive.
pub fn parse_command(text: &str) -> Result<Command, CommandError> {
    let mut parts = text.split_whitespace();
    let head = parts.next().ok_or(CommandError::NotACommand)?;
    let name = head.strip_prefix('/').ok_or(CommandError::NotACommand)?;
    let name = name.split('@').next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    match name.as_str() {
        "start" => Ok(Command::Start),
        "help" => Ok(Command::Help),
        "stop" => Ok(Command::Stop),
        "resume" => Ok(Command::Resume),
        "status" => Ok(Command::Status),
        "pairs" => Ok(Command::Pairs),
        "fees" => Ok(Command::Fees),
        "setthreshold" => {
            let value = args
                .first()
                .and_then(|s| parse_number(s))
                .ok_or(CommandError::Usage(THRESHOLD_USAGE))?;
            Ok(Command::SetThreshold(threshold_fraction(value)))
        }
        "setfee" => match args.as_slice() {
            [exchange, percent, ..] => {
                let percent = parse_number(percent).ok_or(CommandError::Usage(FEE_USAGE))?;
                let exchange =
                    resolve_exchange(exchange).unwrap_or_else(|| ExchangeId::new(exchange));
                Ok(Command::SetFee { exchange, percent })
            }
            _ => Err(CommandError::Usage(FEE_USAGE)),
        },
        "setinterval" => args
            .first()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Command::SetInterval)
            .ok_or(CommandError::Usage(INTERVAL_USAGE)),
        _ => Err(CommandError::Unknown(head.to_string())),
    }
}

/// Values above 1 are percents, anything else is already a fraction.
pub fn threshold_fraction(value: Decimal) -> Decimal {
    if value > Decimal::ONE {
        value / Decimal::ONE_HUNDRED
    } else {
        value
    }
}

fn parse_number(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn simple_commands() {
        assert_eq!(parse_command("/start"), Ok(Command::Start));
        assert_eq!(parse_command("  /STOP  "), Ok(Command::Stop));
        assert_eq!(parse_command("/status@spread_bot"), Ok(Command::Status));
        assert_eq!(parse_command("/pairs extra words"), Ok(Command::Pairs));
        assert_eq!(parse_command("/fees"), Ok(Command::Fees));
    }

    #[test]
    fn threshold_percent_or_fraction() {
        assert_eq!(
            parse_command("/setthreshold 0.5"),
            Ok(Command::SetThreshold(dec!(0.5)))
        );
        assert_eq!(
            parse_command("/setthreshold 2"),
            Ok(Command::SetThreshold(dec!(0.02)))
        );
        assert_eq!(
            parse_command("/setthreshold 1e-3"),
            Ok(Command::SetThreshold(dec!(0.001)))
        );
        assert_eq!(
            parse_command("/setthreshold abc"),
            Err(CommandError::Usage(THRESHOLD_USAGE))
        );
        assert_eq!(
            parse_command("/setthreshold"),
            Err(CommandError::Usage(THRESHOLD_USAGE))
        );
    }

    #[test]
    fn setfee_arguments() {
        assert_eq!(
            parse_command("/setfee OKX 0.2"),
            Ok(Command::SetFee {
                exchange: ExchangeId::new("okx"),
                percent: dec!(0.2),
            })
        );
        assert_eq!(
            parse_command("/setfee huobipro 0.2"),
            Ok(Command::SetFee {
                exchange: ExchangeId::new("htx"),
                percent: dec!(0.2),
            })
        );
        assert_eq!(
            parse_command("/setfee coinbasepro 0.5"),
            Ok(Command::SetFee {
                exchange: ExchangeId::new("coinbase"),
                percent: dec!(0.5),
            })
        );
        assert_eq!(parse_command("/setfee okx"), Err(CommandError::Usage(FEE_USAGE)));
        assert_eq!(
            parse_command("/setfee okx lots"),
            Err(CommandError::Usage(FEE_USAGE))
        );
    }

    #[test]
    fn setinterval_requires_integer() {
        assert_eq!(parse_command("/setinterval 3"), Ok(Command::SetInterval(3)));
        assert_eq!(
            parse_command("/setinterval 2.5"),
            Err(CommandError::Usage(INTERVAL_USAGE))
        );
        assert_eq!(
            parse_command("/setinterval -10"),
            Err(CommandError::Usage(INTERVAL_USAGE))
        );
    }

    #[test]
    fn non_commands_and_unknown() {
        assert_eq!(parse_command("hello"), Err(CommandError::NotACommand));
        assert_eq!(parse_command(""), Err(CommandError::NotACommand));
        assert_eq!(
            parse_command("/frobnicate 1"),
            Err(CommandError::Unknown("/frobnicate".to_string()))
        );
    }
}

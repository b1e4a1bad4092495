//! Executes parsed commands and produces the chat replies.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{CommandError, SettingsError};
use crate::exchange::{ExchangeId, TradingPair};
use crate::scanner::{LoopState, ScanLoopHandle};

use super::command::{parse_command, Command};
use super::settings::{SettingsClient, SettingsUpdate, MIN_POLL_INTERVAL_SECS};

const MENU: &str = "👋 Bot running. Commands: /status /pairs /setthreshold /setfee /setinterval /fees /stop /resume";

/// Applies chat commands to the scan loop and runtime settings.
#[derive(Clone)]
pub struct ControlSurface {
    settings: SettingsClient,
    scan: ScanLoopHandle,
    pairs: Vec<TradingPair>,
    exchanges: Vec<ExchangeId>,
}

impl ControlSurface {
    /// Create a control surface over the given loop and settings.
    ///
    /// `exchanges` are the monitored venue ids; fee overrides for any other
    /// venue are refused.
    pub fn new(
        settings: SettingsClient,
        scan: ScanLoopHandle,
        pairs: Vec<TradingPair>,
        exchanges: Vec<ExchangeId>,
    ) -> Self {
        Self {
            settings,
            scan,
            pairs,
            exchanges,
        }
    }

    /// Loop control handle.
    pub fn scan(&self) -> &ScanLoopHandle {
        &self.scan
    }

    /// Settings client.
    pub fn settings(&self) -> &SettingsClient {
        &self.settings
    }

    /// Handle one chat message. Returns the replies to send, in order;
    /// empty for plain text that is not a command.
    pub async fn handle(&self, text: &str) -> Vec<String> {
        match parse_command(text) {
            Ok(command) => {
                info!(command = ?command, "Control command");
                self.execute(command).await
            }
            Err(CommandError::NotACommand) => Vec::new(),
            Err(CommandError::Unknown(name)) => {
                vec![format!("❓ Unknown command {name}. Send /help for the list.")]
            }
            Err(e @ CommandError::Usage(_)) => vec![e.to_string()],
        }
    }

    async fn execute(&self, command: Command) -> Vec<String> {
        match command {
            Command::Start | Command::Help => vec![MENU.to_string()],
            Command::Stop => {
                self.scan.stop();
                vec!["🛑 Bot stopped. Send /resume to continue.".to_string()]
            }
            Command::Resume => {
                if self.scan.resume() {
                    vec!["▶️ Bot resumed.".to_string()]
                } else {
                    vec!["✅ Bot is already running".to_string()]
                }
            }
            Command::Status => {
                let state = match self.scan.state() {
                    LoopState::Running => "✅ Bot is running",
                    LoopState::Stopped => "❌ Bot stopped",
                };
                let settings = self.settings.settings();
                vec![
                    state.to_string(),
                    format!(
                        "Monitoring {} exchanges, {} pairs. Poll every {}s. Threshold {}%.",
                        self.exchanges.len(),
                        self.pairs.len(),
                        settings.poll_interval().as_secs(),
                        percent(settings.threshold()),
                    ),
                ]
            }
            Command::Pairs => {
                let list: Vec<String> = self.pairs.iter().map(ToString::to_string).collect();
                vec![format!("Tracked pairs:\n{}", list.join(", "))]
            }
            Command::Fees => {
                let fees = self.settings.settings().fees();
                if fees.is_empty() {
                    return vec!["No fee overrides set; all exchanges use 0%.".to_string()];
                }
                let lines: Vec<String> = fees
                    .iter()
                    .map(|(exchange, fee)| format!("{exchange}: {}%", fee.normalize()))
                    .collect();
                vec![format!("Fees:\n{}", lines.join("\n"))]
            }
            Command::SetThreshold(value) => {
                match self.settings.update(SettingsUpdate::Threshold(value)).await {
                    Ok(()) => vec![format!(
                        "✅ New spread threshold: {:.6}%",
                        value * Decimal::ONE_HUNDRED
                    )],
                    Err(e) => vec![rejection(&e)],
                }
            }
            Command::SetFee { exchange, percent } => {
                if !self.exchanges.contains(&exchange) {
                    warn!(exchange = %exchange, "Fee override for unmonitored exchange");
                    let monitored: Vec<&str> =
                        self.exchanges.iter().map(ExchangeId::as_str).collect();
                    return vec![format!(
                        "❌ Unknown exchange {exchange}. Monitored: {}",
                        monitored.join(", ")
                    )];
                }
                let update = SettingsUpdate::Fee {
                    exchange: exchange.clone(),
                    percent,
                };
                match self.settings.update(update).await {
                    Ok(()) => vec![format!(
                        "✅ Fee for {exchange} set to {}%",
                        percent.normalize()
                    )],
                    Err(e) => vec![rejection(&e)],
                }
            }
            Command::SetInterval(secs) => {
                match self.settings.update(SettingsUpdate::PollInterval(secs)).await {
                    Ok(()) => vec![format!("✅ Poll interval set to {secs}s")],
                    Err(SettingsError::IntervalTooSmall { .. }) => vec![format!(
                        "❌ Interval too small; choose >={MIN_POLL_INTERVAL_SECS}s"
                    )],
                    Err(e) => vec![rejection(&e)],
                }
            }
        }
    }
}

fn percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).normalize()
}

fn rejection(error: &SettingsError) -> String {
    warn!(error = %error, "Command rejected");
    format!("❌ {error}")
}

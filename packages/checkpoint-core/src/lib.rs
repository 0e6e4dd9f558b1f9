#![cfg_attr(not(test), no_std)]

pub mod alarm;
pub mod config;
pub mod connectivity;
pub mod console;
pub mod credentials;
pub mod delivery;
pub mod display;
pub mod inbound;
pub mod main_loop;
pub mod payload;
pub mod ports;
pub mod scan;
pub mod shared;
pub mod topics;
pub mod types;

pub use alarm::{AlarmCoordinator, SirenPattern, SirenUpdate};
pub use config::CheckpointIdentity;
pub use connectivity::{
    ConnectivityAction, ConnectivityApplyResult, ConnectivityEvent, ConnectivityManager,
    ConnectivitySnapshot,
};
pub use console::{parse_console_command, ConsoleCommand, LineReadEvent, LineReader};
pub use credentials::{
    BrokerCredentials, BrokerForm, BrokerHost, CredentialsError, FormParseError, WifiCredentials,
};
pub use display::Screen;
pub use inbound::{InboundOutcome, InboundRouter};
pub use main_loop::{MainLoop, TickOutcome};
pub use ports::{CardReaderPort, CardUid, ClockPort, DisplayPort, PublishError, Publisher, SirenPort};
pub use scan::{format_card_id, ScanDispatcher, ScanEvent, ScanOutcome};
pub use shared::{AlarmSnapshot, SharedState};
pub use types::{AlarmReason, ConnectionState, Qos, RestartReason, SessionState, ShiftStatus};

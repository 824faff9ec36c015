//! Command dispatcher
//!
//! Executes parsed commands against the radio and the active configuration.

use crate::commands::types::{Command, CommandId, Response, ResponseStatus};
use crate::config::protocol;
use crate::lora::traits::{LoraError, LoraRadio};
use crate::radio::{ActiveConfig, RadioConfig, RawRadioConfig, ValidatedConfig};

/// Command dispatcher
pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch a command and return the response
    pub async fn dispatch<R: LoraRadio>(
        &self,
        radio: &mut R,
        active: &mut ActiveConfig,
        command: Command,
    ) -> Response {
        match command {
            Command::GetVersion => self.handle_get_version(),
            Command::GetConfig => config_response(active.current()),
            Command::SetConfig { config } => self.handle_set_config(radio, active, config).await,
        }
    }

    fn handle_get_version(&self) -> Response {
        Response::Version {
            major: protocol::VERSION_MAJOR,
            minor: protocol::VERSION_MINOR,
            patch: protocol::VERSION_PATCH,
        }
    }

    /// Validate, apply to the radio, then commit
    ///
    /// The active configuration only changes once the radio has accepted the
    /// new one. If the radio fails part way, the previous configuration is
    /// written back.
    async fn handle_set_config<R: LoraRadio>(
        &self,
        radio: &mut R,
        active: &mut ActiveConfig,
        raw: RawRadioConfig,
    ) -> Response {
        let staged = match RadioConfig::try_from(raw).and_then(|c| active.stage(&c)) {
            Ok(staged) => staged,
            Err(err) => {
                log::debug!("dispatch: SetConfig rejected: {err}");
                return Response::error(ResponseStatus::from(err), CommandId::SetConfig);
            }
        };

        if let Err(err) = radio.configure(&staged).await {
            log::error!("dispatch: radio refused new configuration: {:?}", err);
            // An uninitialised radio gets the active configuration from its next init
            if err == LoraError::NotInitialised {
                return lora_error_response(err, CommandId::SetConfig);
            }
            if let Err(restore_err) = radio.configure(active.current()).await {
                log::error!("dispatch: restoring previous configuration failed: {:?}", restore_err);
            }
            return lora_error_response(err, CommandId::SetConfig);
        }

        active.commit(staged);
        config_response(active.current())
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// `Config` response describing a validated configuration
pub fn config_response(config: &ValidatedConfig) -> Response {
    Response::Config {
        config: RawRadioConfig::from(*config.requested()),
        ldro_enabled: config.low_data_rate_optimize(),
        symbol_us: config.symbol_duration_us(),
    }
}

fn lora_error_response(error: LoraError, command_id: CommandId) -> Response {
    let status = match error {
        LoraError::Timeout | LoraError::BusyTimeout => ResponseStatus::Timeout,
        _ => ResponseStatus::LoraError,
    };
    Response::error(status, command_id)
}

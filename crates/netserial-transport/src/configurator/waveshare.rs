//! Waveshare-style HTTP remote configuration
//!
//! Bridge devices in this family expose three HTTP endpoints: a
//! `config.cgi` query carrying the full parameter set, a `login.cgi`
//! request that reboots the device to apply it, and the root page, which
//! serves as a reachability probe once the device is back up. Success is
//! judged purely by HTTP status, never by parsing a response body.

use crate::configurator::RemoteConfigurator;
use crate::settings::TcpSerialSettings;
use async_trait::async_trait;
use netserial_core::error::{ConfigError, Result};
use netserial_core::{Handshake, Parity};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry behavior for one HTTP configuration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per request
    pub attempts: u32,
    /// Delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Device-family constants pushed alongside the user parameters
///
/// Field names match the firmware's query keys verbatim. They cover the
/// serial working mode, heartbeat behavior, socket limits, httpd
/// parameters, and the secondary socket. The defaults match the shipping
/// firmware; override individual fields for other firmware revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveshareDefaults {
    /// Serial flow working mode
    pub flow: u32,
    /// Serial-side heartbeat packet
    pub hebt: String,
    pub srm: u32,
    pub srz: u32,
    /// Socket A working mode (3 = TCP server)
    pub tnmode: u32,
    /// Modbus gateway type
    pub mbtp: u32,
    /// Maximum simultaneous TCP clients
    pub tcpstx: u32,
    pub ticken: u32,
    pub urh: u32,
    pub urf: u32,
    /// Httpd request path, pre-encoded
    pub url: String,
    /// Httpd header block, pre-encoded
    pub hhr: String,
    pub srh: u32,
    pub srq: u32,
    pub ura: u32,
    /// Network-side heartbeat packet
    pub hebn: String,
    pub srp: u32,
    pub srr: u32,
    pub sru: u32,
    /// Registration packet
    pub regt: String,
    pub srt: u32,
    /// Cloud device id
    pub lde0: String,
    /// Cloud password
    pub lpa0: String,
    /// Socket B working mode
    pub tnbode: u32,
    /// Socket B remote address
    pub urb1: String,
    /// Socket B remote port
    pub trb: u32,
}

impl Default for WaveshareDefaults {
    fn default() -> Self {
        Self {
            flow: 1,
            hebt: "0123456789".to_string(),
            srm: 1,
            srz: 30,
            tnmode: 3,
            mbtp: 0,
            tcpstx: 9,
            ticken: 0,
            urh: 16,
            urf: 1,
            url: "%2F1.php%3F".to_string(),
            hhr: "User_Agent%3A+Mozilla%2F4.0%0D%0A".to_string(),
            srh: 86400,
            srq: 3,
            ura: 10,
            hebn: "0123456789".to_string(),
            srp: 1,
            srr: 30,
            sru: 0,
            regt: "0123456789".to_string(),
            srt: 1,
            lde0: String::new(),
            lpa0: String::new(),
            tnbode: 7,
            urb1: "192.168.0.201".to_string(),
            trb: 20105,
        }
    }
}

impl WaveshareDefaults {
    /// Render the constant block in the order the firmware expects
    ///
    /// `local_port` is the port the bridge's data socket listens on.
    fn query_pairs(&self, local_port: u16) -> Vec<String> {
        vec![
            format!("flow={}", self.flow),
            format!("hebt={}", self.hebt),
            format!("srm={}", self.srm),
            format!("srz={}", self.srz),
            format!("tnmode={}", self.tnmode),
            format!("mbtp={}", self.mbtp),
            format!("tcpstx={}", self.tcpstx),
            format!("ticken={}", self.ticken),
            format!("urh={}", self.urh),
            format!("urf={}", self.urf),
            format!("url={}", self.url),
            format!("hhr={}", self.hhr),
            format!("tlp={}", local_port),
            format!("srh={}", self.srh),
            format!("srq={}", self.srq),
            format!("ura={}", self.ura),
            format!("hebn={}", self.hebn),
            format!("srp={}", self.srp),
            format!("srr={}", self.srr),
            format!("sru={}", self.sru),
            format!("regt={}", self.regt),
            format!("srt={}", self.srt),
            format!("lde0={}", self.lde0),
            format!("lpa0={}", self.lpa0),
            format!("tnbode={}", self.tnbode),
            format!("urb1={}", self.urb1),
            format!("trb={}", self.trb),
        ]
    }
}

/// Parity code understood by the bridge firmware (1-based)
pub fn parity_code(parity: Parity) -> u32 {
    match parity {
        Parity::None => 1,
        Parity::Odd => 2,
        Parity::Even => 3,
        Parity::Mark => 4,
        Parity::Space => 5,
    }
}

/// Flow-control code understood by the bridge firmware
///
/// The combined RTS/CTS + XON/XOFF discipline has no firmware
/// counterpart and falls back to none.
pub fn flow_mode(handshake: Handshake) -> u32 {
    match handshake {
        Handshake::None => 0,
        Handshake::XOnXOff => 3,
        Handshake::RequestToSend => 32,
        _ => 0,
    }
}

/// Remote configurator for Waveshare-style TCP-to-serial bridges
///
/// Pushes the serial parameters over the device's HTTP configuration
/// interface with Basic authentication, triggers the reboot that applies
/// them, and verifies the device is reachable again afterwards.
pub struct WaveshareConfigurator {
    host: String,
    username: String,
    password: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    reboot_wait: Duration,
    defaults: WaveshareDefaults,
}

impl WaveshareConfigurator {
    /// Create a configurator for the device's HTTP interface
    ///
    /// `host` names the configuration interface and may carry a port
    /// when the device serves HTTP off 80, e.g. `10.0.0.7` or
    /// `10.0.0.7:8080`.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        // The config interface lives on the local segment; never route
        // it through a proxy.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .no_proxy()
            .build()
            .map_err(|e| ConfigError::Other {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            client,
            retry: RetryPolicy::default(),
            reboot_wait: Duration::from_millis(1000),
            defaults: WaveshareDefaults::default(),
        })
    }

    /// Override the per-request retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the pause between the reboot request and the probe
    pub fn with_reboot_wait(mut self, wait: Duration) -> Self {
        self.reboot_wait = wait;
        self
    }

    /// Override the device-family constants
    pub fn with_defaults(mut self, defaults: WaveshareDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build the full `config.cgi` query string
    ///
    /// Derived parameters come first, followed by the constant block.
    fn build_config_query(&self, settings: &TcpSerialSettings) -> String {
        let serial = &settings.serial;
        let mut pairs = vec![
            format!("br={}", serial.baud_rate),
            format!("bc={}", serial.data_bits),
            format!("parity={}", parity_code(serial.parity)),
            format!("stop={}", serial.stop_bits),
            format!("xon={}", flow_mode(serial.handshake)),
            format!("tim={}", settings.uart_packet_time),
            format!("num={}", settings.uart_packet_length),
            format!("srf={}", u32::from(settings.sync_baud_rate)),
        ];
        pairs.extend(self.defaults.query_pairs(settings.remote_port));
        pairs.join("&")
    }

    /// Issue one GET with bounded retries
    ///
    /// A 404 terminates the step as success: the firmware's config pages
    /// legitimately return it for some requests. Any other error status
    /// or a transport-level failure waits out the backoff and retries.
    async fn get_with_retries(&self, step: &str, url: &str) -> Result<()> {
        for attempt in 1..=self.retry.attempts {
            match self
                .client
                .get(url)
                .basic_auth(&self.username, Some(&self.password))
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        debug!("{}: {} returned 404, treating as applied", self.host, step);
                        return Ok(());
                    }
                    if status.is_success() || status.is_redirection() {
                        return Ok(());
                    }
                    warn!(
                        "{}: {} returned {} (attempt {}/{})",
                        self.host, step, status, attempt, self.retry.attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "{}: {} failed: {} (attempt {}/{})",
                        self.host, step, e, attempt, self.retry.attempts
                    );
                }
            }
            if attempt < self.retry.attempts {
                tokio::time::sleep(self.retry.backoff).await;
            }
        }
        Err(ConfigError::StepFailed {
            step: step.to_string(),
            attempts: self.retry.attempts,
        }
        .into())
    }
}

#[async_trait]
impl RemoteConfigurator for WaveshareConfigurator {
    async fn push(&self, settings: &TcpSerialSettings) -> Result<()> {
        let query = self.build_config_query(settings);
        debug!("{}: pushing serial configuration: {}", self.host, query);
        let config_url = format!("http://{}/config.cgi?{}", self.host, query);
        self.get_with_retries("config.cgi", &config_url).await?;

        let login_url = format!("http://{}/login.cgi", self.host);
        self.get_with_retries("login.cgi", &login_url).await?;

        // The device drops off the network while it reboots.
        tokio::time::sleep(self.reboot_wait).await;

        let probe_url = format!("http://{}/", self.host);
        self.get_with_retries("probe", &probe_url).await?;
        debug!("{}: device back online, configuration applied", self.host);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TcpSerialSettings;
    use netserial_core::{SerialSettings, StopBits};

    fn configurator() -> WaveshareConfigurator {
        WaveshareConfigurator::new("192.168.1.50", "admin", "admin").expect("client build")
    }

    #[test]
    fn test_parity_codes_are_one_based() {
        assert_eq!(parity_code(Parity::None), 1);
        assert_eq!(parity_code(Parity::Odd), 2);
        assert_eq!(parity_code(Parity::Even), 3);
        assert_eq!(parity_code(Parity::Mark), 4);
        assert_eq!(parity_code(Parity::Space), 5);
    }

    #[test]
    fn test_flow_mode_mapping() {
        assert_eq!(flow_mode(Handshake::None), 0);
        assert_eq!(flow_mode(Handshake::XOnXOff), 3);
        assert_eq!(flow_mode(Handshake::RequestToSend), 32);
        assert_eq!(flow_mode(Handshake::RequestToSendXOnXOff), 0);
    }

    #[test]
    fn test_config_query_derived_parameters() {
        let mut settings = TcpSerialSettings::from_serial(
            &SerialSettings::with_baud_rate(9600),
            "192.168.1.50:8000",
        )
        .expect("address parses");
        settings.uart_packet_time = 10;
        settings.uart_packet_length = 64;

        let query = configurator().build_config_query(&settings);
        assert!(
            query.starts_with("br=9600&bc=8&parity=1&stop=One&xon=0&tim=10&num=64&srf=1"),
            "unexpected query prefix: {}",
            query
        );
        assert!(query.contains("flow=1"));
        assert!(query.contains("tnmode=3"));
        assert!(query.contains("tlp=8000"));
        assert!(query.contains("trb=20105"));
    }

    #[test]
    fn test_config_query_stop_bits_use_names() {
        let mut settings =
            TcpSerialSettings::from_address("10.0.0.7:23").expect("address parses");
        settings.serial.stop_bits = StopBits::Two;
        let query = configurator().build_config_query(&settings);
        assert!(query.contains("stop=Two"));
    }

    #[test]
    fn test_defaults_override() {
        let mut defaults = WaveshareDefaults::default();
        defaults.tnmode = 1;
        defaults.urb1 = "10.1.1.1".to_string();
        let configurator = configurator().with_defaults(defaults);

        let settings = TcpSerialSettings::from_address("10.0.0.7:23").expect("address parses");
        let query = configurator.build_config_query(&settings);
        assert!(query.contains("tnmode=1"));
        assert!(query.contains("urb1=10.1.1.1"));
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(500));
    }
}
